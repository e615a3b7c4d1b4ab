//! Shared response types.

mod response;

pub use response::{NoContent, TokenValidity};
