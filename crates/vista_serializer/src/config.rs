use serde::{Deserialize, Serialize};

use crate::adapter::AdapterKind;
use crate::options::Embed;

/// Default association depth limit of [`SerializerConfig`].
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Process-wide defaults of a [`Serializer`].
///
/// Every field has a default, so partial documents deserialize:
///
/// ```
/// use vista_serializer::{AdapterKind, SerializerConfig};
///
/// let config: SerializerConfig = serde_json::from_str(r#"{ "adapter": "json_api" }"#).unwrap();
/// assert_eq!(config.adapter, AdapterKind::JsonApi);
/// assert_eq!(config.max_depth, 64);
/// ```
///
/// [`Serializer`]: crate::Serializer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerializerConfig {
    /// Adapter used when a call does not pick one.
    pub adapter: AdapterKind,
    /// Deepest association level a call may reach.
    pub max_depth: usize,
    /// Embedding mode used when a call does not pick one.
    pub embed: Embed,
}

impl Default for SerializerConfig {
    fn default() -> Self {
        Self {
            adapter: AdapterKind::Plain,
            max_depth: DEFAULT_MAX_DEPTH,
            embed: Embed::Objects,
        }
    }
}

impl SerializerConfig {
    #[inline]
    pub fn with_adapter(mut self, adapter: AdapterKind) -> Self {
        self.adapter = adapter;
        self
    }

    #[inline]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[inline]
    pub fn with_embed(mut self, embed: Embed) -> Self {
        self.embed = embed;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::SerializerConfig;
    use crate::adapter::AdapterKind;
    use crate::options::Embed;

    #[test]
    fn missing_fields_take_defaults() {
        let config: SerializerConfig = serde_json::from_str(r#"{ "embed": "ids" }"#).unwrap();
        assert_eq!(
            config,
            SerializerConfig::default().with_embed(Embed::Ids)
        );

        let config: SerializerConfig =
            serde_json::from_str(r#"{ "adapter": "json", "max_depth": 3 }"#).unwrap();
        assert_eq!(config.adapter, AdapterKind::Plain);
        assert_eq!(config.max_depth, 3);
    }
}
