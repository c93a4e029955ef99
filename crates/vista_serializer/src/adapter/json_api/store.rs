use alloc::string::String;
use alloc::vec::Vec;

use serde_json::{Map, Value};

// -----------------------------------------------------------------------------
// LinkedResourceStore

struct Table {
    name: String,
    resources: Vec<Map<String, Value>>,
}

/// The `linked` side table of one JSON:API call.
///
/// Resources are grouped by pluralized type and deduplicated by `id`. A
/// resource seen again is deep-merged into the stored one, so fields reached
/// through different include paths are never lost.
#[derive(Default)]
pub struct LinkedResourceStore {
    tables: Vec<Table>,
}

impl LinkedResourceStore {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&mut self, name: &str) -> &mut Table {
        let index = match self.tables.iter().position(|t| t.name == name) {
            Some(index) => index,
            None => {
                self.tables.push(Table {
                    name: name.into(),
                    resources: Vec::new(),
                });
                self.tables.len() - 1
            }
        };
        &mut self.tables[index]
    }

    /// Stores `resource` under `name`, merging it into a stored resource with
    /// the same `id`.
    pub fn upsert(&mut self, name: &str, resource: Map<String, Value>) {
        let table = self.table(name);
        let id = resource.get("id");
        let existing = id.and_then(|id| {
            table
                .resources
                .iter_mut()
                .find(|stored| stored.get("id") == Some(id))
        });

        match existing {
            Some(stored) => {
                log::trace!("merging linked `{name}` resource {:?}", stored.get("id"));
                deep_merge(stored, resource);
            }
            None => {
                if !table.resources.contains(&resource) {
                    log::trace!("linking `{name}` resource {:?}", resource.get("id"));
                    table.resources.push(resource);
                }
            }
        }
    }

    /// The stored resources of `name`.
    pub fn get(&self, name: &str) -> Option<&[Map<String, Value>]> {
        self.tables
            .iter()
            .find(|t| t.name == name)
            .map(|t| t.resources.as_slice())
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// The `linked` object, `None` if nothing was ever stored.
    pub fn into_value(self) -> Option<Value> {
        if self.tables.is_empty() {
            return None;
        }
        let linked = self
            .tables
            .into_iter()
            .map(|t| {
                let resources = t.resources.into_iter().map(Value::Object).collect::<Value>();
                (t.name, resources)
            })
            .collect::<Map<String, Value>>();
        Some(Value::Object(linked))
    }
}

impl core::fmt::Debug for LinkedResourceStore {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_map()
            .entries(self.tables.iter().map(|t| (&t.name, t.resources.len())))
            .finish()
    }
}

/// Merges `source` into `target`: nested objects merge recursively, any
/// other value of `source` replaces the one in `target`.
pub(crate) fn deep_merge(target: &mut Map<String, Value>, source: Map<String, Value>) {
    for (key, value) in source {
        match (target.get_mut(&key), value) {
            (Some(Value::Object(inner)), Value::Object(value)) => deep_merge(inner, value),
            (_, value) => {
                target.insert(key, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Map, Value, json};

    use super::{LinkedResourceStore, deep_merge};

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn deep_merge_unions_nested_objects() {
        let mut target = object(json!({ "id": "1", "links": { "post": { "id": "3" } }, "a": 1 }));
        deep_merge(
            &mut target,
            object(json!({ "links": { "likes": ["4"] }, "a": 2, "b": true })),
        );

        assert_eq!(
            Value::Object(target),
            json!({
                "id": "1",
                "links": { "post": { "id": "3" }, "likes": ["4"] },
                "a": 2,
                "b": true
            })
        );
    }

    #[test]
    fn same_id_is_merged_not_appended() {
        let mut store = LinkedResourceStore::new();
        store.upsert("authors", object(json!({ "id": "1", "name": "Ann" })));
        store.upsert("authors", object(json!({ "id": "1", "email": "ann@example.com" })));
        store.upsert("authors", object(json!({ "id": "2", "name": "Bob" })));

        assert_eq!(
            store.into_value(),
            Some(json!({
                "authors": [
                    { "id": "1", "name": "Ann", "email": "ann@example.com" },
                    { "id": "2", "name": "Bob" }
                ]
            }))
        );
    }

    #[test]
    fn empty_store_has_no_linked_object() {
        let store = LinkedResourceStore::new();
        assert!(store.is_empty());
        assert!(store.get("likes").is_none());
        assert_eq!(store.into_value(), None);
    }
}
