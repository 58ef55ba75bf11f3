//! # Store Errors

use jst_core::{AddressError, CoercionError};
use jst_schema::SchemaValidationError;
use thiserror::Error;

/// Failure of a store read or write. Each variant forwards the underlying
/// error's message unchanged.
#[derive(Error, Debug, Clone)]
pub enum StoreError {
    #[error(transparent)]
    Address(#[from] AddressError),

    #[error(transparent)]
    Validation(#[from] SchemaValidationError),

    #[error(transparent)]
    Coercion(#[from] CoercionError),
}

impl StoreError {
    /// The validation violations, if this is a schema rejection.
    pub fn violations(&self) -> Option<&jst_schema::ValidationViolations> {
        match self {
            Self::Validation(err) => err.violations(),
            Self::Address(_) | Self::Coercion(_) => None,
        }
    }
}
