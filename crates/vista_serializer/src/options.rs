//! Per-call serialization options.

use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use crate::adapter::AdapterSelector;
use crate::schema::{AssociationDecl, Schema};

/// The wildcard accepted by `include`: every field, every association path.
pub const ALL: &str = "all";

// -----------------------------------------------------------------------------
// Root

/// The `root` option.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Root {
    /// Defer to the schema's root flag.
    #[default]
    Default,
    /// Never wrap (`root: false`).
    Disabled,
    /// Wrap under the schema's root name (`root: true`).
    Enabled,
    /// Wrap under this key.
    Named(String),
}

impl From<bool> for Root {
    #[inline]
    fn from(value: bool) -> Self {
        if value { Self::Enabled } else { Self::Disabled }
    }
}

impl From<&str> for Root {
    #[inline]
    fn from(value: &str) -> Self {
        Self::Named(value.into())
    }
}

impl From<String> for Root {
    #[inline]
    fn from(value: String) -> Self {
        Self::Named(value)
    }
}

// -----------------------------------------------------------------------------
// Embed

/// How associated resources are embedded by the linked-resource adapter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Embed {
    /// Links plus full payloads in the `linked` side table.
    #[default]
    Objects,
    /// Links only, the side table is never populated.
    Ids,
}

// -----------------------------------------------------------------------------
// Options

/// Options of one serialization call.
///
/// Child instances inherit the structural lists (`include`, `exclude`,
/// `including`, `excluding`) verbatim unless the association overrides them.
///
/// # Examples
///
/// ```
/// use vista_serializer::{AdapterKind, Options};
///
/// let options = Options::new()
///     .adapter(AdapterKind::JsonApi)
///     .include(["comments", "comments.author"])
///     .excluding(["secret"]);
///
/// assert!(options.includes_field("comments"));
/// assert!(options.excludes_group("secret"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Field names or dotted association paths, or [`ALL`].
    pub include: Vec<String>,
    /// Field names to hide.
    pub exclude: Vec<String>,
    /// Group names to show.
    pub including: Vec<String>,
    /// Group names to hide unconditionally.
    pub excluding: Vec<String>,
    /// Root wrapping.
    pub root: Root,
    /// Adapter for this call, the configured default when `None`.
    pub adapter: Option<AdapterSelector>,
    /// Schema for the root object of this call.
    pub serializer: Option<Arc<Schema>>,
    /// Schema for every element of a sequence.
    pub each_serializer: Option<Arc<Schema>>,
    /// Embedding mode, the configured default when `None`.
    pub embed: Option<Embed>,
}

fn collect(items: impl IntoIterator<Item = impl Into<String>>) -> Vec<String> {
    items.into_iter().map(Into::into).collect()
}

impl Options {
    /// Empty options.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn include(mut self, fields: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.include = collect(fields);
        self
    }

    /// Sets `include` to [`ALL`].
    pub fn include_all(mut self) -> Self {
        self.include = alloc::vec![String::from(ALL)];
        self
    }

    pub fn exclude(mut self, fields: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.exclude = collect(fields);
        self
    }

    pub fn including(mut self, groups: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.including = collect(groups);
        self
    }

    pub fn excluding(mut self, groups: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.excluding = collect(groups);
        self
    }

    pub fn root(mut self, root: impl Into<Root>) -> Self {
        self.root = root.into();
        self
    }

    pub fn adapter(mut self, adapter: impl Into<AdapterSelector>) -> Self {
        self.adapter = Some(adapter.into());
        self
    }

    pub fn serializer(mut self, schema: Arc<Schema>) -> Self {
        self.serializer = Some(schema);
        self
    }

    pub fn each_serializer(mut self, schema: Arc<Schema>) -> Self {
        self.each_serializer = Some(schema);
        self
    }

    pub fn embed(mut self, embed: Embed) -> Self {
        self.embed = Some(embed);
        self
    }

    // -------------------------------------------------------------------------
    // Queries

    /// `include` names the field or contains [`ALL`].
    pub fn includes_field(&self, name: &str) -> bool {
        self.include.iter().any(|s| s == name || s == ALL)
    }

    /// `include` contains [`ALL`].
    #[inline]
    pub fn includes_all(&self) -> bool {
        self.include.iter().any(|s| s == ALL)
    }

    /// `exclude` names the field.
    #[inline]
    pub fn excludes_field(&self, name: &str) -> bool {
        self.exclude.iter().any(|s| s == name)
    }

    /// `including` names the group.
    #[inline]
    pub fn includes_group(&self, group: &str) -> bool {
        self.including.iter().any(|s| s == group)
    }

    /// `excluding` names the group.
    #[inline]
    pub fn excludes_group(&self, group: &str) -> bool {
        self.excluding.iter().any(|s| s == group)
    }

    /// `embed` resolved to [`Embed::Ids`].
    #[inline]
    pub fn embeds_ids(&self) -> bool {
        self.embed == Some(Embed::Ids)
    }

    /// Options handed to the child instance of `association`.
    ///
    /// Structural lists are inherited unless the declaration overrides them.
    /// Call-scoped overrides (`root`, `serializer`) never reach children.
    pub(crate) fn for_association(&self, association: &AssociationDecl) -> Options {
        let overrides = association.overrides();
        let pick = |own: &Option<Vec<String>>, inherited: &Vec<String>| match own {
            Some(list) => list.clone(),
            None => inherited.clone(),
        };

        Options {
            include: pick(&overrides.include, &self.include),
            exclude: pick(&overrides.exclude, &self.exclude),
            including: pick(&overrides.including, &self.including),
            excluding: pick(&overrides.excluding, &self.excluding),
            root: Root::Disabled,
            adapter: self.adapter.clone(),
            serializer: None,
            each_serializer: association.each_serializer().cloned(),
            embed: self.embed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ALL, Embed, Options, Root};

    #[test]
    fn wildcard_includes_every_field() {
        let options = Options::new().include([ALL]);
        assert!(options.includes_field("anything"));
        assert!(options.includes_all());
        assert!(!options.excludes_field("anything"));
    }

    #[test]
    fn root_conversions() {
        assert_eq!(Root::from(false), Root::Disabled);
        assert_eq!(Root::from(true), Root::Enabled);
        assert_eq!(Root::from("items"), Root::Named("items".into()));
    }

    #[test]
    fn embed_defaults_to_objects() {
        assert!(!Options::new().embeds_ids());
        assert!(Options::new().embed(Embed::Ids).embeds_ids());
        assert_eq!(Embed::default(), Embed::Objects);
    }
}
