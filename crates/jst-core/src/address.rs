//! # Fragment Addressing
//!
//! An [`Address`] identifies one fragment of a document's value tree as a
//! sequence of object keys and array indices, starting at the root. The
//! empty address is the root itself.
//!
//! Addresses render as RFC 6901 JSON Pointers (`/events/0/title`), which is
//! also the form used for `instance_path` in validation violations, so
//! errors from the store and from the validator line up.

use std::fmt;

use serde_json::Value;

use crate::error::AddressError;
use crate::kind::json_type_name;

/// One step of an [`Address`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Segment {
    /// Object member name.
    Key(String),
    /// Array position.
    Index(usize),
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => f.write_str(&key.replace('~', "~0").replace('/', "~1")),
            Self::Index(index) => write!(f, "{index}"),
        }
    }
}

impl From<&str> for Segment {
    fn from(key: &str) -> Self {
        Self::Key(key.to_string())
    }
}

impl From<String> for Segment {
    fn from(key: String) -> Self {
        Self::Key(key)
    }
}

impl From<&String> for Segment {
    fn from(key: &String) -> Self {
        Self::Key(key.clone())
    }
}

impl From<usize> for Segment {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

/// Path from the document root to a fragment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Address(Vec<Segment>);

impl Address {
    /// The root address.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Whether this is the root address.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// The segments from the root down.
    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    /// A new address one level below this one.
    pub fn child(&self, segment: impl Into<Segment>) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        Self(segments)
    }

    /// The parent address and the final segment, or `None` at the root.
    pub fn split_last(&self) -> Option<(Address, &Segment)> {
        self.0
            .split_last()
            .map(|(last, parent)| (Address(parent.to_vec()), last))
    }

    /// Resolve this address against a value tree.
    ///
    /// # Errors
    ///
    /// Returns an [`AddressError`] naming the deepest address that could be
    /// reached when a key is missing, an index is out of range, or a segment
    /// is applied to a value of the wrong shape.
    pub fn resolve<'v>(&self, root: &'v Value) -> Result<&'v Value, AddressError> {
        let mut current = root;
        for (depth, segment) in self.0.iter().enumerate() {
            let here = || Address(self.0[..depth].to_vec());
            current = match (current, segment) {
                (Value::Object(map), Segment::Key(key)) => {
                    map.get(key).ok_or_else(|| AddressError::NoSuchKey {
                        address: here(),
                        key: key.clone(),
                    })?
                }
                (Value::Array(items), Segment::Index(index)) => {
                    items.get(*index).ok_or_else(|| AddressError::IndexOutOfRange {
                        address: here(),
                        index: *index,
                        len: items.len(),
                    })?
                }
                (Value::Array(_), Segment::Key(key)) => {
                    return Err(AddressError::KeyOnArray {
                        address: here(),
                        key: key.clone(),
                    })
                }
                (Value::Object(_), Segment::Index(index)) => {
                    return Err(AddressError::IndexOnObject {
                        address: here(),
                        index: *index,
                    })
                }
                (scalar, _) => {
                    return Err(AddressError::NotAContainer {
                        address: here(),
                        found: json_type_name(scalar),
                    })
                }
            };
        }
        Ok(current)
    }

    /// Mutable counterpart of [`resolve`](Self::resolve).
    pub fn resolve_mut<'v>(&self, root: &'v mut Value) -> Result<&'v mut Value, AddressError> {
        let mut current = root;
        for (depth, segment) in self.0.iter().enumerate() {
            let here = || Address(self.0[..depth].to_vec());
            current = match (current, segment) {
                (Value::Object(map), Segment::Key(key)) => {
                    map.get_mut(key).ok_or_else(|| AddressError::NoSuchKey {
                        address: here(),
                        key: key.clone(),
                    })?
                }
                (Value::Array(items), Segment::Index(index)) => {
                    let len = items.len();
                    items.get_mut(*index).ok_or_else(|| AddressError::IndexOutOfRange {
                        address: here(),
                        index: *index,
                        len,
                    })?
                }
                (Value::Array(_), Segment::Key(key)) => {
                    return Err(AddressError::KeyOnArray {
                        address: here(),
                        key: key.clone(),
                    })
                }
                (Value::Object(_), Segment::Index(index)) => {
                    return Err(AddressError::IndexOnObject {
                        address: here(),
                        index: *index,
                    })
                }
                (scalar, _) => {
                    return Err(AddressError::NotAContainer {
                        address: here(),
                        found: json_type_name(scalar),
                    })
                }
            };
        }
        Ok(current)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.0 {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}

impl<S: Into<Segment>> FromIterator<S> for Address {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}
