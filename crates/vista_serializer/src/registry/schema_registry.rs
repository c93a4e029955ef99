use alloc::string::String;
use alloc::sync::Arc;
use core::any::TypeId;

use vista_utils::TypeIdMap;
use vista_utils::hash::HashMap;

use crate::error::DefinitionError;
use crate::model::Model;
use crate::registry::SequenceSchema;
use crate::schema::{Schema, SchemaBuilder};

// -----------------------------------------------------------------------------
// SchemaRegistry

/// Projects a subtype object onto its supertype.
type Upcast = fn(&dyn Model) -> Option<&dyn Model>;

fn upcast<T, P>(object: &dyn Model) -> Option<&dyn Model>
where
    T: Model + AsRef<P>,
    P: Model,
{
    let child = object.downcast_ref::<T>()?;
    Some(AsRef::<P>::as_ref(child))
}

/// The explicit supertype of a registered model type.
#[derive(Clone, Copy)]
struct Supertype {
    id: TypeId,
    path: &'static str,
    upcast: Upcast,
}

/// A table from model type to [`Schema`].
///
/// The registry is filled once at startup and then shared read-only, usually
/// as `Arc<SchemaRegistry>`. Lookups never mutate it.
///
/// # Examples
///
/// ```
/// use serde_json::{Value, json};
/// use vista_serializer::{Model, SchemaRegistry};
///
/// struct Post { id: u64 }
/// struct Article { post: Post }
///
/// impl Model for Post {
///     fn read_attribute_for_serialization(&self, name: &str) -> Value {
///         if name == "id" { json!(self.id) } else { Value::Null }
///     }
/// }
/// impl Model for Article {
///     fn read_attribute_for_serialization(&self, name: &str) -> Value {
///         self.post.read_attribute_for_serialization(name)
///     }
/// }
/// impl AsRef<Post> for Article {
///     fn as_ref(&self) -> &Post {
///         &self.post
///     }
/// }
///
/// let mut registry = SchemaRegistry::new();
/// registry.define::<Post>(|s| {
///     s.href(|p: &Post| format!("/posts/{}", p.id));
/// })
/// .unwrap();
/// registry.register_supertype::<Article, Post>().unwrap();
///
/// // Article has no schema of its own and falls back to Post's.
/// let article = Article { post: Post { id: 3 } };
/// let schema = registry.resolve(&article).unwrap();
/// assert_eq!(schema.name(), "post");
///
/// // Post's typed rules read the article through its `AsRef<Post>` view.
/// let view = registry.view_as(&article, schema.href_type().unwrap()).unwrap();
/// assert_eq!(schema.href_for(view).unwrap().as_deref(), Some("/posts/3"));
/// ```
#[derive(Default)]
pub struct SchemaRegistry {
    schemas: TypeIdMap<Arc<Schema>>,
    supertypes: TypeIdMap<Supertype>,
    names: HashMap<String, TypeId>,
}

impl SchemaRegistry {
    /// Creates an empty registry.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    // -------------------------------------------------------------------------
    // Registration

    /// Declares and registers the schema of `T`.
    ///
    /// Replaces any schema previously registered for `T`.
    pub fn define<T: Model>(
        &mut self,
        block: impl FnOnce(&mut SchemaBuilder<T>),
    ) -> Result<Arc<Schema>, DefinitionError> {
        let schema = Schema::define::<T>(block)?;
        self.insert(schema.clone());
        Ok(schema)
    }

    /// Declares `T` as a subtype of `P` and registers its schema.
    ///
    /// The schema starts from a copy of the schema resolved for `P`, if any.
    /// Changing the subtype's declarations never affects the parent's.
    /// Inherited typed readers see a `T` through its `AsRef<P>` view.
    pub fn define_subtype<T: Model + AsRef<P>, P: Model>(
        &mut self,
        block: impl FnOnce(&mut SchemaBuilder<T>),
    ) -> Result<Arc<Schema>, DefinitionError> {
        self.register_supertype::<T, P>()?;
        let parent = self.resolve_type(TypeId::of::<P>());

        let schema = Schema::define::<T>(|s| {
            if let Some(parent) = &parent {
                s.inherit(parent);
            }
            block(s);
        })?;
        self.insert(schema.clone());
        Ok(schema)
    }

    /// Declares `P` as the supertype of `T` for lookups.
    ///
    /// A `T` is handed to `P`'s typed readers as `AsRef::<P>::as_ref`.
    /// Fails if `P` already is (transitively) a subtype of `T`.
    pub fn register_supertype<T, P>(&mut self) -> Result<(), DefinitionError>
    where
        T: Model + AsRef<P>,
        P: Model,
    {
        let child = TypeId::of::<T>();
        let cyclic = || DefinitionError::CyclicHierarchy {
            child: core::any::type_name::<T>(),
            parent: core::any::type_name::<P>(),
        };

        let mut cursor = Some(TypeId::of::<P>());
        while let Some(id) = cursor {
            if id == child {
                return Err(cyclic());
            }
            cursor = self.supertypes.get(&id).map(|s| s.id);
        }

        self.supertypes.insert(
            child,
            Supertype {
                id: TypeId::of::<P>(),
                path: core::any::type_name::<P>(),
                upcast: upcast::<T, P>,
            },
        );
        Ok(())
    }

    /// Registers a schema built elsewhere under its model type.
    ///
    /// Returns the schema it replaces.
    pub fn insert(&mut self, schema: Arc<Schema>) -> Option<Arc<Schema>> {
        let ty = schema.model_type();
        self.names.insert(schema.name().into(), ty);
        self.schemas.insert(ty, schema)
    }

    /// Installs every [`SchemaRegistration`] submitted with `inventory`.
    ///
    /// Returns the number of registrations applied. Calling it again
    /// re-applies them, replacing the same schemas.
    ///
    /// [`SchemaRegistration`]: crate::registry::SchemaRegistration
    #[cfg(feature = "auto_register")]
    pub fn auto_register(&mut self) -> Result<usize, DefinitionError> {
        let mut count = 0;
        for registration in super::auto_register::registrations() {
            registration.apply(self)?;
            count += 1;
        }
        log::debug!("auto registered {count} schema definitions");
        Ok(count)
    }

    // -------------------------------------------------------------------------
    // Lookup

    /// Resolves the schema of `object`, most-derived type first.
    #[inline]
    pub fn resolve(&self, object: &dyn Model) -> Option<Arc<Schema>> {
        self.resolve_type(object.model_type())
    }

    /// Resolves the schema of a type id, walking its supertype chain.
    pub fn resolve_type(&self, ty: TypeId) -> Option<Arc<Schema>> {
        let mut cursor = Some(ty);
        while let Some(id) = cursor {
            if let Some(schema) = self.schemas.get(&id) {
                return Some(schema.clone());
            }
            cursor = self.supertypes.get(&id).map(|s| s.id);
        }
        None
    }

    /// Resolves every element of a sequence on its own.
    pub fn resolve_for_sequence(&self, objects: &[&dyn Model]) -> SequenceSchema {
        SequenceSchema::new(objects.iter().map(|o| self.resolve(*o)).collect())
    }

    /// Looks up a registered schema by its name.
    pub fn get_with_name(&self, name: &str) -> Option<&Arc<Schema>> {
        let ty = self.names.get(name)?;
        self.schemas.get(ty)
    }

    /// Views `object` as the model type `ty`, following supertype edges.
    ///
    /// Returns `None` if `ty` is neither the object's type nor one of its
    /// registered supertypes.
    pub fn view_as<'o>(&self, object: &'o dyn Model, ty: TypeId) -> Option<&'o dyn Model> {
        let mut current = object;
        while current.model_type() != ty {
            let supertype = self.supertypes.get(&current.model_type())?;
            current = (supertype.upcast)(current)?;
        }
        Some(current)
    }

    /// The registered supertype of `ty`, as a type path.
    pub fn supertype_of(&self, ty: TypeId) -> Option<&'static str> {
        self.supertypes.get(&ty).map(|s| s.path)
    }

    /// Returns `true` if a schema is registered for exactly `T`.
    #[inline]
    pub fn contains<T: Model>(&self) -> bool {
        self.schemas.contains_type::<T>()
    }

    /// Number of registered schemas.
    #[inline]
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

impl core::fmt::Debug for SchemaRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_set()
            .entries(self.schemas.values().map(|s| s.name()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use core::any::TypeId;

    use serde_json::Value;

    use crate::error::DefinitionError;
    use crate::model::Model;
    use crate::registry::SchemaRegistry;
    use crate::schema::AssociationOptions;
    use crate::test_models::{Admin, Author, Comment, Post, User};

    #[test]
    fn resolve_walks_supertypes() {
        let mut registry = SchemaRegistry::new();
        registry
            .define::<User>(|s| {
                s.attributes(["id", "name"]);
            })
            .unwrap();
        registry.register_supertype::<Admin, User>().unwrap();

        let admin = Admin::new(7, "root");
        let schema = registry.resolve(&admin).unwrap();
        assert_eq!(schema.name(), "user");
        assert_eq!(
            registry.supertype_of(TypeId::of::<Admin>()),
            Some(core::any::type_name::<User>())
        );

        assert!(registry.resolve(&Post::new(1, "Hi")).is_none());
    }

    #[test]
    fn subtype_copies_parent_declarations() {
        let mut registry = SchemaRegistry::new();
        let user = registry
            .define::<User>(|s| {
                s.attributes(["id", "name"]);
            })
            .unwrap();
        let admin = registry
            .define_subtype::<Admin, User>(|s| {
                s.attribute("name");
                s.attribute("level");
            })
            .unwrap();

        let keys: Vec<_> = admin.attributes().iter().map(|a| a.key()).collect();
        assert_eq!(keys, ["id", "name", "level"]);
        assert_eq!(user.attributes().len(), 2);
        assert_eq!(admin.name(), "admin");
    }

    #[test]
    fn subtype_redeclares_inherited_association_in_place() {
        let mut registry = SchemaRegistry::new();
        registry
            .define::<User>(|s| {
                s.attribute("id");
                s.has_many("posts");
                s.belongs_to("team");
            })
            .unwrap();
        let admin = registry
            .define_subtype::<Admin, User>(|s| {
                s.has_many_with("posts", AssociationOptions::new().key("articles"));
            })
            .unwrap();

        let names: Vec<_> = admin.associations().iter().map(|a| a.name()).collect();
        assert_eq!(names, ["posts", "team"]);
        assert_eq!(admin.association("posts").unwrap().key(), "articles");

        let err = registry
            .define_subtype::<Admin, User>(|s| {
                s.has_many("posts");
                s.has_many("posts");
            })
            .unwrap_err();
        assert!(matches!(err, DefinitionError::DuplicateAssociation { .. }));
    }

    #[test]
    fn view_as_follows_supertype_edges() {
        let mut registry = SchemaRegistry::new();
        let admin = Admin::new(7, "root");
        assert!(registry.view_as(&admin, TypeId::of::<User>()).is_none());

        registry.register_supertype::<Admin, User>().unwrap();
        let view = registry.view_as(&admin, TypeId::of::<User>()).unwrap();
        assert_eq!(view.downcast_ref::<User>().map(|u| u.name.as_str()), Some("root"));

        let same = registry.view_as(&admin, TypeId::of::<Admin>()).unwrap();
        assert!(same.is::<Admin>());
        assert!(registry.view_as(&admin, TypeId::of::<Post>()).is_none());
    }

    struct Left;
    struct Right;

    static LEFT: Left = Left;
    static RIGHT: Right = Right;

    impl Model for Left {
        fn read_attribute_for_serialization(&self, _: &str) -> Value {
            Value::Null
        }
    }

    impl Model for Right {
        fn read_attribute_for_serialization(&self, _: &str) -> Value {
            Value::Null
        }
    }

    impl AsRef<Right> for Left {
        fn as_ref(&self) -> &Right {
            &RIGHT
        }
    }

    impl AsRef<Left> for Right {
        fn as_ref(&self) -> &Left {
            &LEFT
        }
    }

    impl AsRef<Left> for Left {
        fn as_ref(&self) -> &Left {
            self
        }
    }

    #[test]
    fn cyclic_supertypes_are_rejected() {
        let mut registry = SchemaRegistry::new();
        registry.register_supertype::<Left, Right>().unwrap();

        let err = registry.register_supertype::<Right, Left>().unwrap_err();
        assert!(matches!(err, DefinitionError::CyclicHierarchy { .. }));
        assert!(registry.register_supertype::<Left, Left>().is_err());
    }

    #[test]
    fn sequences_resolve_per_element() {
        let mut registry = SchemaRegistry::new();
        registry
            .define::<Comment>(|s| {
                s.attribute("body");
            })
            .unwrap();

        let comment = Comment::new(1, "a");
        let author = Author::new(2, "Ann", "ann@example.com");
        let objects: [&dyn Model; 2] = [&comment, &author];

        let sequence = registry.resolve_for_sequence(&objects);
        assert_eq!(sequence.len(), 2);
        assert_eq!(sequence.first().map(|s| s.name()), Some("comment"));
        assert!(sequence.get(1).is_none());
        assert!(!sequence.is_homogeneous());
    }

    #[test]
    fn lookup_by_name() {
        let mut registry = SchemaRegistry::new();
        registry
            .define::<Author>(|s| {
                s.name("writer");
                s.attribute("name");
            })
            .unwrap();

        assert!(registry.get_with_name("writer").is_some());
        assert!(registry.get_with_name("author").is_none());
        assert!(registry.contains::<Author>());
        assert_eq!(registry.len(), 1);
    }
}
