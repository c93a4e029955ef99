//! The per-call binding of objects to schemas.

use alloc::borrow::ToOwned;
use alloc::format;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::TypeId;

use serde_json::{Map, Value};
use vista_utils::inflect::pluralize;

use crate::error::SerializeError;
use crate::filter::visible;
use crate::model::{Associated, Model};
use crate::options::{Options, Root};
use crate::registry::SchemaRegistry;
use crate::schema::{AssociationDecl, Schema};
use crate::serializer::Target;

/// Root key of an empty sequence without an explicit root.
pub const EMPTY_SEQUENCE_ROOT: &str = "data";

// -----------------------------------------------------------------------------
// Context

/// Call-wide, read-only state shared by every instance of one call.
#[derive(Debug, Clone, Copy)]
pub struct Context<'a> {
    registry: &'a SchemaRegistry,
    max_depth: usize,
}

impl<'a> Context<'a> {
    #[inline]
    pub fn new(registry: &'a SchemaRegistry, max_depth: usize) -> Self {
        Self {
            registry,
            max_depth,
        }
    }

    #[inline]
    pub fn registry(&self) -> &'a SchemaRegistry {
        self.registry
    }

    #[inline]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }
}

// -----------------------------------------------------------------------------
// SerializerInstance

enum Bound<'a> {
    One {
        object: &'a dyn Model,
        schema: Option<Arc<Schema>>,
    },
    Many(Vec<SerializerInstance<'a>>),
}

/// One object (or sequence) bound to its schema and options.
///
/// Instances are built fresh for every call. A child knows the dotted path
/// of association keys leading to it, never its parent.
pub struct SerializerInstance<'a> {
    bound: Bound<'a>,
    options: Options,
    path: Option<String>,
    depth: usize,
    context: Context<'a>,
}

impl<'a> SerializerInstance<'a> {
    /// Builds the root instance of a call.
    ///
    /// The call-level `serializer` names the schema of a single object. For a
    /// sequence, elements use `each_serializer`, then `serializer`, then the
    /// registry.
    pub fn new(context: Context<'a>, target: Target<'a>, options: Options) -> Self {
        match target {
            Target::One(object) => {
                let schema = options
                    .serializer
                    .clone()
                    .or_else(|| context.registry.resolve(object));
                Self::one(context, object, schema, options, None, 0)
            }
            Target::Many(objects) => {
                let explicit = options
                    .each_serializer
                    .clone()
                    .or_else(|| options.serializer.clone());
                Self::many(context, objects, explicit, options, None, 0)
            }
        }
    }

    fn one(
        context: Context<'a>,
        object: &'a dyn Model,
        schema: Option<Arc<Schema>>,
        options: Options,
        path: Option<String>,
        depth: usize,
    ) -> Self {
        Self {
            bound: Bound::One { object, schema },
            options,
            path,
            depth,
            context,
        }
    }

    fn many(
        context: Context<'a>,
        objects: Vec<&'a dyn Model>,
        explicit: Option<Arc<Schema>>,
        options: Options,
        path: Option<String>,
        depth: usize,
    ) -> Self {
        let schemas = match &explicit {
            Some(schema) => objects.iter().map(|_| Some(schema.clone())).collect(),
            None => context.registry.resolve_for_sequence(&objects).into_inner(),
        };

        let mut element_options = options.clone();
        element_options.root = Root::Disabled;
        element_options.serializer = None;
        element_options.each_serializer = None;

        let elements = objects
            .into_iter()
            .zip(schemas)
            .map(|(object, schema)| {
                Self::one(
                    context,
                    object,
                    schema,
                    element_options.clone(),
                    path.clone(),
                    depth,
                )
            })
            .collect();

        Self {
            bound: Bound::Many(elements),
            options,
            path,
            depth,
            context,
        }
    }

    // -------------------------------------------------------------------------
    // Accessors

    /// Returns `true` if this instance binds a sequence.
    #[inline]
    pub fn is_sequence(&self) -> bool {
        matches!(self.bound, Bound::Many(_))
    }

    /// Element instances of a sequence, empty for a single object.
    #[inline]
    pub fn elements(&self) -> &[SerializerInstance<'a>] {
        match &self.bound {
            Bound::Many(elements) => elements,
            Bound::One { .. } => &[],
        }
    }

    /// The bound object, `None` for a sequence.
    #[inline]
    pub fn object(&self) -> Option<&'a dyn Model> {
        match &self.bound {
            Bound::One { object, .. } => Some(*object),
            Bound::Many(_) => None,
        }
    }

    /// The resolved schema, `None` for a sequence or an unregistered type.
    #[inline]
    pub fn schema(&self) -> Option<&Arc<Schema>> {
        match &self.bound {
            Bound::One { schema, .. } => schema.as_ref(),
            Bound::Many(_) => None,
        }
    }

    #[inline]
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Dotted association path from the root, `None` at the root.
    #[inline]
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    #[inline]
    pub fn context(&self) -> Context<'a> {
        self.context
    }

    // -------------------------------------------------------------------------
    // Reads

    /// The filtered attribute map, in declaration order.
    ///
    /// Without a schema the raw [`Model::attributes`] are returned unfiltered.
    /// A sequence has no attribute map of its own and yields an empty map.
    pub fn attributes(&self) -> Result<Map<String, Value>, SerializeError> {
        let Bound::One { object, schema } = &self.bound else {
            return Ok(Map::new());
        };
        let object = *object;

        let Some(schema) = schema else {
            log::debug!(
                "no schema for `{}`, serializing raw attributes",
                object.type_name()
            );
            return Ok(object.attributes());
        };

        let mut map = Map::with_capacity(schema.attributes().len());
        for attribute in schema.attributes() {
            if self.is_visible(schema, attribute.key(), attribute.group(), object)? {
                let value = attribute.read(self.view(object, attribute.reader_type()))?;
                map.insert(attribute.key().to_owned(), value);
            }
        }
        Ok(map)
    }

    fn is_visible(
        &self,
        schema: &Schema,
        field: &str,
        group: Option<&str>,
        object: &dyn Model,
    ) -> Result<bool, SerializeError> {
        if !visible(field, group, &self.options, None) {
            return Ok(false);
        }
        match schema.predicate(field) {
            Some(predicate) => {
                let view = self.view(object, Some(predicate.model_type()));
                predicate.test(view, &self.options)
            }
            None => Ok(true),
        }
    }

    /// `object` as seen by a reader declared for `ty`.
    ///
    /// An inherited reader gets the supertype view. If the registry knows no
    /// such view the object is passed as is and the reader reports the
    /// mismatch.
    fn view<'o>(&self, object: &'o dyn Model, ty: Option<TypeId>) -> &'o dyn Model {
        ty.and_then(|ty| self.context.registry.view_as(object, ty))
            .unwrap_or(object)
    }

    /// The object's identifier, `Null` for a sequence.
    #[inline]
    pub fn id(&self) -> Value {
        self.object().map_or(Value::Null, |object| object.id())
    }

    /// The href declared by the schema, if any.
    pub fn href(&self) -> Result<Option<String>, SerializeError> {
        let Bound::One {
            object,
            schema: Some(schema),
        } = &self.bound
        else {
            return Ok(None);
        };
        schema.href_for(self.view(*object, schema.href_type()))
    }

    /// Schema name, or the object's type name without a schema.
    ///
    /// A sequence is named after its first element.
    pub fn root_name(&self) -> Option<String> {
        match &self.bound {
            Bound::One { object, schema } => Some(match schema {
                Some(schema) => schema.root_name().to_owned(),
                None => object.type_name(),
            }),
            Bound::Many(elements) => elements.first().and_then(Self::root_name),
        }
    }

    /// Whether the schema asks for root wrapping by default.
    fn schema_root(&self) -> bool {
        match &self.bound {
            Bound::One { schema, .. } => schema.as_ref().is_some_and(|s| s.root()),
            Bound::Many(elements) => elements.first().is_some_and(Self::schema_root),
        }
    }

    /// The key this instance is wrapped under, `None` for no wrapping.
    pub fn json_key(&self) -> Option<String> {
        match &self.options.root {
            Root::Named(name) => Some(name.clone()),
            Root::Disabled => None,
            Root::Enabled => Some(self.root_name_or_default()),
            Root::Default => self.schema_root().then(|| self.root_name_or_default()),
        }
    }

    pub(crate) fn root_name_or_default(&self) -> String {
        self.root_name()
            .unwrap_or_else(|| EMPTY_SEQUENCE_ROOT.to_owned())
    }

    /// The type name used in links and side-table keys.
    ///
    /// An explicit `object_type` on the schema wins. Otherwise the object's
    /// type name is used, pluralized for a sequence. An empty sequence has
    /// no type.
    pub fn serialized_object_type(&self) -> Option<String> {
        match &self.bound {
            Bound::One { object, schema } => Some(
                schema
                    .as_ref()
                    .and_then(|s| s.object_type())
                    .map_or_else(|| object.type_name(), str::to_owned),
            ),
            Bound::Many(elements) => {
                let first = elements.first()?;
                let explicit = first.schema().and_then(|s| s.object_type());
                match (explicit, first.object()) {
                    (Some(explicit), _) => Some(explicit.to_owned()),
                    (None, Some(object)) => Some(pluralize(&object.type_name())),
                    (None, None) => None,
                }
            }
        }
    }

    // -------------------------------------------------------------------------
    // Traversal

    /// Visits every visible association in declaration order.
    ///
    /// `None` is passed for an absent target. The child carries the options
    /// derived for this association and sits one level deeper.
    pub fn visit_associations<F>(&self, mut visitor: F) -> Result<(), SerializeError>
    where
        F: FnMut(&AssociationDecl, Option<SerializerInstance<'a>>) -> Result<(), SerializeError>,
    {
        let Bound::One {
            object,
            schema: Some(schema),
        } = &self.bound
        else {
            return Ok(());
        };
        let object = *object;

        for association in schema.associations() {
            if !self.is_visible(schema, association.name(), association.group(), object)? {
                continue;
            }
            let view = self.view(object, association.reader_type());
            let child = match association.read(view)? {
                Some(target) => Some(self.child(association, target)?),
                None => None,
            };
            visitor(association, child)?;
        }
        Ok(())
    }

    /// Visits every visible, present association as
    /// `(output key, child, child options)`.
    pub fn each_association<F>(&self, mut visitor: F) -> Result<(), SerializeError>
    where
        F: FnMut(&str, &SerializerInstance<'a>, &Options) -> Result<(), SerializeError>,
    {
        self.visit_associations(|association, child| match child {
            Some(child) => visitor(association.key(), &child, child.options()),
            None => Ok(()),
        })
    }

    fn child(
        &self,
        association: &AssociationDecl,
        target: Associated<'a>,
    ) -> Result<SerializerInstance<'a>, SerializeError> {
        let path = match &self.path {
            Some(parent) => format!("{parent}.{}", association.key()),
            None => association.key().to_owned(),
        };
        let depth = self.depth + 1;
        if depth > self.context.max_depth {
            return Err(SerializeError::DepthExceeded {
                limit: self.context.max_depth,
                path,
            });
        }

        let options = self.options.for_association(association);
        let context = self.context;

        Ok(match target {
            Associated::One(object) => {
                let schema = association
                    .serializer()
                    .cloned()
                    .or_else(|| context.registry.resolve(object));
                Self::one(context, object, schema, options, Some(path), depth)
            }
            Associated::Many(objects) => {
                let explicit = options
                    .each_serializer
                    .clone()
                    .or_else(|| association.serializer().cloned());
                Self::many(context, objects, explicit, options, Some(path), depth)
            }
        })
    }
}

impl core::fmt::Debug for SerializerInstance<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut debug = f.debug_struct("SerializerInstance");
        match &self.bound {
            Bound::One { object, schema } => {
                debug
                    .field("object", object)
                    .field("schema", &schema.as_ref().map(|s| s.name()));
            }
            Bound::Many(elements) => {
                debug.field("elements", elements);
            }
        }
        debug
            .field("path", &self.path)
            .field("depth", &self.depth)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{Context, SerializerInstance};
    use crate::error::SerializeError;
    use crate::model::Model;
    use crate::options::Options;
    use crate::serializer::Target;
    use crate::test_models::{Comment, Post, User, blog_registry};

    #[test]
    fn attributes_follow_declaration_order_and_filter() {
        let registry = blog_registry();
        let user = User::new(1, "Ann").with_email("ann@example.com");
        let context = Context::new(&registry, 8);

        let instance = SerializerInstance::new(context, Target::one(&user), Options::new());
        assert_eq!(
            serde_json::Value::Object(instance.attributes().unwrap()),
            json!({ "id": 1, "name": "Ann" })
        );

        let options = Options::new().including(["private"]);
        let instance = SerializerInstance::new(context, Target::one(&user), options);
        let keys: Vec<_> = instance.attributes().unwrap().keys().cloned().collect();
        assert_eq!(keys, ["id", "name", "email"]);
    }

    #[test]
    fn raw_attributes_without_schema() {
        let registry = crate::registry::SchemaRegistry::new();
        let post = Post::new(1, "Hi");
        let instance = SerializerInstance::new(
            Context::new(&registry, 8),
            Target::one(&post),
            Options::new(),
        );

        assert!(instance.schema().is_none());
        assert_eq!(
            serde_json::Value::Object(instance.attributes().unwrap()),
            json!({ "id": 1, "title": "Hi" })
        );
        assert_eq!(instance.root_name().as_deref(), Some("post"));
    }

    #[test]
    fn children_carry_paths_and_skip_absent_targets() {
        let registry = blog_registry();
        let post = Post::new(1, "Hi").with_comments([Comment::new(5, "nice")]);
        let instance = SerializerInstance::new(
            Context::new(&registry, 8),
            Target::one(&post),
            Options::new(),
        );

        let mut seen = Vec::new();
        instance
            .each_association(|key, child, _| {
                seen.push((key.to_owned(), child.path().map(str::to_owned), child.is_sequence()));
                Ok(())
            })
            .unwrap();

        // the post has no author, so only comments are visited
        assert_eq!(seen, [("comments".to_owned(), Some("comments".to_owned()), true)]);
    }

    #[test]
    fn object_type_is_pluralized_for_sequences() {
        let registry = blog_registry();
        let comments = [Comment::new(1, "a"), Comment::new(2, "b")];
        let instance = SerializerInstance::new(
            Context::new(&registry, 8),
            Target::many(comments.iter()),
            Options::new(),
        );

        assert_eq!(instance.serialized_object_type().as_deref(), Some("comments"));
        assert_eq!(instance.elements().len(), 2);
        assert_eq!(instance.elements()[1].id(), json!(2));
        assert_eq!(instance.elements()[0].serialized_object_type().as_deref(), Some("comment"));
    }

    #[test]
    fn depth_guard_names_the_path() {
        let registry = blog_registry();
        let post = Post::new(1, "Hi").with_comments([Comment::new(5, "nice")]);
        let instance = SerializerInstance::new(
            Context::new(&registry, 0),
            Target::one(&post),
            Options::new(),
        );

        let err = instance.each_association(|_, _, _| Ok(())).unwrap_err();
        assert_eq!(
            err,
            SerializeError::DepthExceeded {
                limit: 0,
                path: "comments".into()
            }
        );
    }

    #[test]
    fn json_key_follows_root_option() {
        let registry = blog_registry();
        let user = User::new(1, "Ann");
        let context = Context::new(&registry, 8);
        let key = |options: Options| {
            SerializerInstance::new(context, Target::one(&user), options).json_key()
        };

        assert_eq!(key(Options::new()), None);
        assert_eq!(key(Options::new().root(true)).as_deref(), Some("user"));
        assert_eq!(key(Options::new().root("person")).as_deref(), Some("person"));
        assert_eq!(key(Options::new().root(false)), None);
        assert_eq!(user.type_name(), "user");
    }
}
