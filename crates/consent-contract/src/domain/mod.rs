//! Consent domain: the document shape and its errors.

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
