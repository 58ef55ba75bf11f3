//! # jst-document — Live Schema-Bound Documents
//!
//! Binds a JSON value to a document type and exposes its fields by name.
//!
//! ## Document Types (`definition`)
//!
//! A document type is registered once: [`DocumentType`] supplies metadata
//! and a registration function, and [`document_type!`] generates both plus
//! a memoized [`DocumentDefinition`]. Declaration files loaded with
//! [`jst_schema::loader`] convert into the same definition.
//!
//! ```
//! use jst_document::{document_type, DocumentMeta, DocumentType, FieldDeclaration};
//! use serde_json::json;
//!
//! document_type! {
//!     /// The answer to everything.
//!     pub struct Simple;
//!     meta = DocumentMeta::new("simple").with_title("simple");
//!     fields = {
//!         "answer" => FieldDeclaration::integer(),
//!     };
//! }
//!
//! let doc = Simple::open_validated(json!({"answer": 42})).unwrap();
//! assert_eq!(doc.read_as::<i64>("answer").unwrap(), 42);
//! doc.write("answer", 43).unwrap();
//! assert_eq!(doc.revision(), 1);
//! ```
//!
//! ## Documents (`model`) and Fragments (`proxy`)
//!
//! [`Document`] reads, writes and deletes fields through a
//! [`ValueStore`](jst_store::ValueStore). Object and array fields come back
//! as [`FragmentProxy`] views that navigate further by key or index.
//!
//! ## Crate Policy
//!
//! - Every mutation, deletes included, is a store write.
//! - Only `UnknownField`, `MissingKey` and `Decode` originate here; store
//!   errors pass through unchanged.

pub mod definition;
pub mod error;
pub mod model;
pub mod proxy;

pub use definition::{DocumentDefinition, DocumentType, FieldRegistry};
pub use error::DocumentError;
pub use model::Document;
pub use proxy::{Entry, FragmentProxy};

pub use jst_core::{Address, FieldValue, Segment};
pub use jst_schema::{DocumentMeta, FieldDeclaration};

/// Declare a unit type and register it as a [`DocumentType`].
///
/// The definition is built on first use and shared by every document of
/// the type afterwards.
#[macro_export]
macro_rules! document_type {
    (
        $(#[$attr:meta])*
        $vis:vis struct $name:ident;
        meta = $meta:expr;
        fields = { $($field:literal => $decl:expr),* $(,)? };
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, Copy, Default)]
        $vis struct $name;

        impl $crate::DocumentType for $name {
            fn meta() -> $crate::DocumentMeta {
                $meta
            }

            #[allow(unused_variables)]
            fn register(fields: &mut $crate::FieldRegistry) {
                $( fields.register($field, $decl); )*
            }

            fn definition() -> ::std::sync::Arc<$crate::DocumentDefinition> {
                static DEFINITION: ::std::sync::OnceLock<::std::sync::Arc<$crate::DocumentDefinition>> =
                    ::std::sync::OnceLock::new();
                ::std::sync::Arc::clone(DEFINITION.get_or_init(|| {
                    ::std::sync::Arc::new($crate::DocumentDefinition::of::<Self>())
                }))
            }
        }
    };
}
