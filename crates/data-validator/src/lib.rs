//! Data Validation
//!
//! Parses raw form values into severity scores and checks them against the
//! allowed range.

mod error;
mod validator;

pub use error::ValidationError;
pub use validator::{ValidationConfig, Validator};
