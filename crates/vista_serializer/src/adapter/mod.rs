//! Output strategies.
//!
//! ## Menu
//!
//! - [`Adapter`]: turns a [`SerializerInstance`] tree into a document.
//! - [`PlainAdapter`]: attributes with inline nested associations.
//! - [`JsonApiAdapter`]: attributes with links, associated payloads flattened
//!   into a deduplicated `linked` side table.
//! - [`AdapterKind`] / [`AdapterSelector`]: how a call picks its adapter.
//! - [`AdapterTable`]: adapters addressable by name.

// -----------------------------------------------------------------------------
// Modules

mod json_api;
mod plain;

// -----------------------------------------------------------------------------
// Exports

pub use json_api::{JsonApiAdapter, LinkedResourceStore};
pub use plain::PlainAdapter;

use alloc::borrow::ToOwned;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use vista_utils::hash::HashMap;

use crate::error::SerializeError;
use crate::instance::SerializerInstance;

// -----------------------------------------------------------------------------
// Adapter

/// A pluggable output format.
///
/// Adapters are stateless and shared. Any state of one call (such as the
/// linked-resource side table) lives on the stack of that call.
///
/// # Examples
///
/// ```
/// use serde_json::{Value, json};
/// use vista_serializer::SerializeError;
/// use vista_serializer::adapter::Adapter;
/// use vista_serializer::instance::SerializerInstance;
///
/// /// Emits only the ids.
/// struct IdsOnly;
///
/// impl Adapter for IdsOnly {
///     fn name(&self) -> &str {
///         "ids"
///     }
///
///     fn serializable_hash(
///         &self,
///         instance: &SerializerInstance<'_>,
///     ) -> Result<Value, SerializeError> {
///         if instance.is_sequence() {
///             Ok(instance.elements().iter().map(|e| e.id()).collect())
///         } else {
///             Ok(instance.id())
///         }
///     }
/// }
/// ```
pub trait Adapter: Send + Sync {
    /// Name used in [`SerializeError::UnknownAdapter`] listings and lookups.
    fn name(&self) -> &str;

    /// Produces the document of `instance`, honoring `instance.options()`.
    fn serializable_hash(&self, instance: &SerializerInstance<'_>) -> Result<Value, SerializeError>;
}

// -----------------------------------------------------------------------------
// AdapterKind

/// The built-in adapters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdapterKind {
    /// Inline nesting. Also accepted as `json`.
    #[default]
    #[serde(alias = "json")]
    Plain,
    /// Linked resources.
    JsonApi,
}

impl AdapterKind {
    /// The canonical name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::JsonApi => "json_api",
        }
    }

    /// Parses a built-in name or alias.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "plain" | "json" => Some(Self::Plain),
            "json_api" => Some(Self::JsonApi),
            _ => None,
        }
    }

    pub(crate) fn instantiate(self) -> Arc<dyn Adapter> {
        match self {
            Self::Plain => Arc::new(PlainAdapter),
            Self::JsonApi => Arc::new(JsonApiAdapter),
        }
    }
}

// -----------------------------------------------------------------------------
// AdapterSelector

/// The `adapter` option of one call.
#[derive(Clone)]
pub enum AdapterSelector {
    /// A built-in adapter.
    Kind(AdapterKind),
    /// An adapter looked up by name at call time.
    Named(String),
    /// An adapter instance.
    Custom(Arc<dyn Adapter>),
    /// No adapter: the raw attribute set(s) are returned.
    Disabled,
}

impl From<AdapterKind> for AdapterSelector {
    #[inline]
    fn from(kind: AdapterKind) -> Self {
        Self::Kind(kind)
    }
}

impl From<&str> for AdapterSelector {
    #[inline]
    fn from(name: &str) -> Self {
        Self::Named(name.to_owned())
    }
}

impl From<String> for AdapterSelector {
    #[inline]
    fn from(name: String) -> Self {
        Self::Named(name)
    }
}

impl From<Arc<dyn Adapter>> for AdapterSelector {
    #[inline]
    fn from(adapter: Arc<dyn Adapter>) -> Self {
        Self::Custom(adapter)
    }
}

impl core::fmt::Debug for AdapterSelector {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Kind(kind) => f.debug_tuple("Kind").field(kind).finish(),
            Self::Named(name) => f.debug_tuple("Named").field(name).finish(),
            Self::Custom(adapter) => f.debug_tuple("Custom").field(&adapter.name()).finish(),
            Self::Disabled => f.write_str("Disabled"),
        }
    }
}

// -----------------------------------------------------------------------------
// AdapterTable

/// Adapters addressable by name.
#[derive(Clone)]
pub struct AdapterTable {
    adapters: HashMap<String, Arc<dyn Adapter>>,
}

impl Default for AdapterTable {
    /// See [`AdapterTable::builtin`].
    #[inline]
    fn default() -> Self {
        Self::builtin()
    }
}

impl AdapterTable {
    /// A table holding `plain` (alias `json`) and `json_api`.
    pub fn builtin() -> Self {
        let mut table = Self {
            adapters: HashMap::default(),
        };
        let plain = AdapterKind::Plain.instantiate();
        table.adapters.insert("json".to_owned(), plain.clone());
        table.adapters.insert("plain".to_owned(), plain);
        table
            .adapters
            .insert("json_api".to_owned(), AdapterKind::JsonApi.instantiate());
        table
    }

    /// Registers `adapter` under its own name, replacing a previous one.
    pub fn register(&mut self, adapter: Arc<dyn Adapter>) -> Option<Arc<dyn Adapter>> {
        self.adapters.insert(adapter.name().to_owned(), adapter)
    }

    /// Looks up an adapter by name.
    pub fn lookup(&self, name: &str) -> Result<Arc<dyn Adapter>, SerializeError> {
        match self.adapters.get(name) {
            Some(adapter) => Ok(adapter.clone()),
            None => Err(SerializeError::UnknownAdapter {
                name: name.to_owned(),
                valid: self.names(),
            }),
        }
    }

    /// Every registered name, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.adapters.keys().cloned().collect();
        names.sort_unstable();
        names
    }
}

impl core::fmt::Debug for AdapterTable {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}
