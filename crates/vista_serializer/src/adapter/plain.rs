use alloc::borrow::ToOwned;

use serde_json::{Map, Value};

use crate::adapter::Adapter;
use crate::error::SerializeError;
use crate::instance::SerializerInstance;

/// Attributes plus inline nested associations, wrapped under the root key.
///
/// A to-many association becomes an array of inline objects and a to-one
/// association a single inline object. Absent targets are left out. Only the
/// top level is ever wrapped.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainAdapter;

impl PlainAdapter {
    fn body(&self, instance: &SerializerInstance<'_>) -> Result<Value, SerializeError> {
        if instance.is_sequence() {
            return instance
                .elements()
                .iter()
                .map(|element| self.body(element))
                .collect();
        }

        let mut map: Map<String, Value> = instance.attributes()?;
        instance.each_association(|key, child, _| {
            map.insert(key.to_owned(), self.body(child)?);
            Ok(())
        })?;
        Ok(Value::Object(map))
    }
}

impl Adapter for PlainAdapter {
    fn name(&self) -> &str {
        "plain"
    }

    fn serializable_hash(
        &self,
        instance: &SerializerInstance<'_>,
    ) -> Result<Value, SerializeError> {
        let body = self.body(instance)?;

        Ok(match instance.json_key() {
            Some(key) => {
                let mut wrapped = Map::with_capacity(1);
                wrapped.insert(key, body);
                Value::Object(wrapped)
            }
            None => body,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::PlainAdapter;
    use crate::adapter::Adapter;
    use crate::instance::{Context, SerializerInstance};
    use crate::options::Options;
    use crate::serializer::Target;
    use crate::test_models::{Author, Comment, Post, blog_registry};

    fn render(target: Target<'_>, options: Options) -> serde_json::Value {
        let registry = blog_registry();
        let instance = SerializerInstance::new(Context::new(&registry, 16), target, options);
        PlainAdapter.serializable_hash(&instance).unwrap()
    }

    #[test]
    fn nests_associations_inline() {
        let post = Post::new(1, "Hi")
            .with_comments([Comment::new(5, "nice")])
            .with_author(Author::new(9, "Ann", "ann@example.com"));

        assert_eq!(
            render(Target::one(&post), Options::new()),
            json!({
                "post": {
                    "id": 1,
                    "title": "Hi",
                    "comments": [{ "id": 5, "body": "nice" }],
                    "author": { "id": 9, "name": "Ann" }
                }
            })
        );
    }

    #[test]
    fn root_false_returns_the_bare_attribute_map() {
        let comment = Comment::new(5, "nice");
        assert_eq!(
            render(Target::one(&comment), Options::new().root(false)),
            json!({ "id": 5, "body": "nice" })
        );
    }

    #[test]
    fn sequences_are_not_wrapped_per_element() {
        let comments = [Comment::new(1, "a"), Comment::new(2, "b")];
        assert_eq!(
            render(Target::many(comments.iter()), Options::new().root("comments")),
            json!({ "comments": [{ "id": 1, "body": "a" }, { "id": 2, "body": "b" }] })
        );
        assert_eq!(
            render(Target::many(comments.iter()), Options::new()),
            json!([{ "id": 1, "body": "a" }, { "id": 2, "body": "b" }])
        );
    }

    #[test]
    fn absent_association_is_omitted() {
        let post = Post::new(1, "Hi");
        assert_eq!(
            render(Target::one(&post), Options::new().root(false)),
            json!({ "id": 1, "title": "Hi", "comments": [] })
        );
    }
}
