//! The linked-resource (JSON:API style) adapter.
//!
//! A document looks like
//!
//! ```text
//! { <pluralized root>: resource | [resource, ..],
//!   linked: { <pluralized type>: [resource, ..], .. } }
//! ```
//!
//! where every resource is `{ id: string, ..attributes, links: { .. } }`.
//!
//! ## Include paths
//!
//! The `include` option holds dotted association paths. For a path `p`:
//!
//! - the resources at `p` are flattened into `linked` when an entry equals
//!   `p` or extends it (`p.something`).
//! - the associations below `p` are walked when an entry extends `p`.
//!
//! Matching is anchored at segment boundaries: `comments` never matches
//! `comments_count`. The wildcard `all` matches every path at every depth.
//!
//! Links of a flattened resource are always emitted, its own associations
//! are only flattened when an include path reaches them.

// -----------------------------------------------------------------------------
// Modules

mod store;

// -----------------------------------------------------------------------------
// Exports

pub use store::LinkedResourceStore;

use alloc::borrow::ToOwned;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use serde_json::{Map, Value};
use vista_utils::inflect::pluralize;

use crate::adapter::Adapter;
use crate::error::SerializeError;
use crate::instance::{EMPTY_SEQUENCE_ROOT, SerializerInstance};
use crate::options::{Options, Root};

// -----------------------------------------------------------------------------
// JsonApiAdapter

/// Attributes plus links, associated payloads flattened into `linked`.
///
/// The root key is the pluralized root name unless `root` names one
/// explicitly. `root: false` does not disable it.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonApiAdapter;

impl Adapter for JsonApiAdapter {
    fn name(&self) -> &str {
        "json_api"
    }

    fn serializable_hash(
        &self,
        instance: &SerializerInstance<'_>,
    ) -> Result<Value, SerializeError> {
        let options = instance.options();
        let root = match &options.root {
            Root::Named(name) => name.clone(),
            _ => instance
                .root_name()
                .map_or_else(|| EMPTY_SEQUENCE_ROOT.to_owned(), |name| pluralize(&name)),
        };

        let mut walk = LinkedWalk::new(options);
        let primary = if instance.is_sequence() {
            instance
                .elements()
                .iter()
                .map(|element| walk.primary(element))
                .collect::<Result<Value, _>>()?
        } else {
            walk.primary(instance)?
        };

        let mut document = Map::with_capacity(2);
        document.insert(root, primary);
        if let Some(linked) = walk.store.into_value() {
            document.insert("linked".to_owned(), linked);
        }
        Ok(Value::Object(document))
    }
}

// -----------------------------------------------------------------------------
// LinkedWalk

/// State of one call: the top-level options and the side table.
struct LinkedWalk<'o> {
    options: &'o Options,
    store: LinkedResourceStore,
}

/// `entry` addresses an association strictly below `path`.
#[inline]
fn extends(entry: &str, path: &str) -> bool {
    entry
        .strip_prefix(path)
        .is_some_and(|rest| rest.starts_with('.'))
}

impl<'o> LinkedWalk<'o> {
    fn new(options: &'o Options) -> Self {
        Self {
            options,
            store: LinkedResourceStore::new(),
        }
    }

    fn include_assoc(&self, path: &str) -> bool {
        self.options.includes_all()
            || self
                .options
                .include
                .iter()
                .any(|entry| entry == path || extends(entry, path))
    }

    fn include_nested(&self, path: &str) -> bool {
        self.options.includes_all() || self.options.include.iter().any(|entry| extends(entry, path))
    }

    fn primary(&mut self, instance: &SerializerInstance<'_>) -> Result<Value, SerializeError> {
        let mut resource = resource_attributes(instance)?;
        self.add_resource_links(&mut resource, instance, true)?;
        Ok(Value::Object(resource))
    }

    fn add_resource_links(
        &mut self,
        resource: &mut Map<String, Value>,
        instance: &SerializerInstance<'_>,
        add_linked: bool,
    ) -> Result<(), SerializeError> {
        let flatten = add_linked && !self.options.embeds_ids();
        let mut links = Map::new();

        instance.visit_associations(|association, child| {
            let key = association.key();
            let link = match &child {
                None => Value::Null,
                Some(child) if child.is_sequence() => many_link(key, child)?,
                Some(child) => one_link(key, child)?,
            };
            links.insert(key.to_owned(), link);

            if flatten && let Some(child) = &child {
                self.add_linked(child)?;
            }
            Ok(())
        })?;

        if !links.is_empty() {
            resource.insert("links".to_owned(), Value::Object(links));
        }
        Ok(())
    }

    fn add_linked(&mut self, child: &SerializerInstance<'_>) -> Result<(), SerializeError> {
        let path = child.path().unwrap_or_default();
        let resources = if child.is_sequence() {
            child.elements()
        } else {
            core::slice::from_ref(child)
        };

        if self.include_assoc(path) {
            for resource in resources {
                let Some(object_type) = resource.serialized_object_type() else {
                    continue;
                };
                let plural = pluralize(&object_type);

                let mut attributes = resource_attributes(resource)?;
                self.add_resource_links(&mut attributes, resource, false)?;
                self.store.upsert(&plural, attributes);
            }
        }

        if self.include_nested(path) {
            for resource in resources {
                resource.each_association(|_, grandchild, _| self.add_linked(grandchild))?;
            }
        }
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// Resources

/// The id of a resource in string form.
fn resource_id(instance: &SerializerInstance<'_>) -> Result<String, SerializeError> {
    match instance.id() {
        Value::Null => Err(SerializeError::MissingId {
            type_name: instance
                .object()
                .map_or_else(|| instance.root_name_or_default(), |o| o.type_name()),
        }),
        Value::String(id) => Ok(id),
        other => Ok(other.to_string()),
    }
}

/// The attribute map with the string id first.
fn resource_attributes(
    instance: &SerializerInstance<'_>,
) -> Result<Map<String, Value>, SerializeError> {
    let mut resource = Map::new();
    resource.insert("id".to_owned(), Value::String(resource_id(instance)?));
    for (key, value) in instance.attributes()? {
        if key != "id" {
            resource.insert(key, value);
        }
    }
    Ok(resource)
}

/// `[ids]` when the type matches the key, `{ type, ids }` otherwise.
fn many_link(key: &str, child: &SerializerInstance<'_>) -> Result<Value, SerializeError> {
    let ids = child
        .elements()
        .iter()
        .map(|element| resource_id(element).map(Value::String))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(match child.serialized_object_type() {
        Some(object_type) if object_type != key => {
            let mut link = Map::with_capacity(2);
            link.insert("type".to_owned(), Value::String(object_type));
            link.insert("ids".to_owned(), Value::Array(ids));
            Value::Object(link)
        }
        _ => Value::Array(ids),
    })
}

/// `{ type?, id, href? }`, the type only when it differs from the key.
fn one_link(key: &str, child: &SerializerInstance<'_>) -> Result<Value, SerializeError> {
    let mut link = Map::with_capacity(3);
    if let Some(object_type) = child.serialized_object_type()
        && object_type != key
    {
        link.insert("type".to_owned(), Value::String(object_type));
    }
    link.insert("id".to_owned(), Value::String(resource_id(child)?));
    if let Some(href) = child.href()? {
        link.insert("href".to_owned(), Value::String(href));
    }
    Ok(Value::Object(link))
}
