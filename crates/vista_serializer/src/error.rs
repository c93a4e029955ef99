use alloc::string::String;
use alloc::vec::Vec;

use thiserror::Error;

use crate::model::Model;

// -----------------------------------------------------------------------------
// DefinitionError

/// Errors raised while a schema is being declared.
///
/// These surface from [`SchemaRegistry::define`] and friends, before any
/// object is serialized.
///
/// [`SchemaRegistry::define`]: crate::registry::SchemaRegistry::define
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DefinitionError {
    #[error("attribute `{key}` is declared twice in schema `{schema}`")]
    DuplicateAttribute { schema: String, key: String },

    #[error("association `{name}` is declared twice in schema `{schema}`")]
    DuplicateAssociation { schema: String, name: String },

    #[error("schema `{schema}` declares a group without a name")]
    EmptyGroupName { schema: String },

    #[error("group `{group}` in schema `{schema}` declares nothing")]
    EmptyGroup { schema: String, group: String },

    #[error("registering `{child}` under `{parent}` makes the type hierarchy cyclic")]
    CyclicHierarchy {
        child: &'static str,
        parent: &'static str,
    },
}

// -----------------------------------------------------------------------------
// SerializeError

/// Errors raised by a single serialization call.
///
/// None of them are recoverable inside the call; the partially built
/// document is dropped.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SerializeError {
    #[error("unknown adapter `{name}`, valid adapters are: {}", .valid.join(", "))]
    UnknownAdapter { name: String, valid: Vec<String> },

    #[error("association depth limit {limit} exceeded at `{path}`")]
    DepthExceeded { limit: usize, path: String },

    #[error("`{type_name}` has no id, linked resources require one")]
    MissingId { type_name: String },

    #[error("adapter `{adapter}` failed: {message}")]
    Adapter { adapter: String, message: String },

    #[error("reader declared for `{expected}` cannot read a `{found}`")]
    ReaderMismatch {
        expected: &'static str,
        found: String,
    },
}

impl SerializeError {
    pub(crate) fn reader_mismatch(expected: &'static str, object: &dyn Model) -> Self {
        Self::ReaderMismatch {
            expected,
            found: object.type_name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;
    use alloc::vec;

    use super::SerializeError;

    #[test]
    fn unknown_adapter_lists_valid_names() {
        let err = SerializeError::UnknownAdapter {
            name: "xml".into(),
            valid: vec!["json_api".into(), "plain".into()],
        };
        assert_eq!(
            err.to_string(),
            "unknown adapter `xml`, valid adapters are: json_api, plain"
        );
    }
}
