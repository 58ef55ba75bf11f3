//! # Document Errors

use jst_core::{Address, AddressError};
use jst_store::StoreError;
use thiserror::Error;

/// Failure of a document or fragment operation.
///
/// `UnknownField`, `MissingKey` and `Decode` are raised here; everything else comes
/// from the store unchanged.
#[derive(Error, Debug, Clone)]
pub enum DocumentError {
    /// The name is not registered as a field of the document type.
    #[error("'{name}' is not a field of document type '{document}'")]
    UnknownField {
        /// Name of the document type.
        document: String,
        /// The unregistered name.
        name: String,
    },

    /// Delete of a key or index that is not present.
    #[error("cannot delete '{key}' at '{address}': no such key")]
    MissingKey {
        /// Address of the region the delete targeted.
        address: Address,
        /// The absent key, or the index rendered as a string.
        key: String,
    },

    /// A typed read could not deserialize the stored value.
    #[error("cannot decode value at '{address}': {reason}")]
    Decode { address: Address, reason: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<AddressError> for DocumentError {
    fn from(err: AddressError) -> Self {
        Self::Store(StoreError::Address(err))
    }
}
