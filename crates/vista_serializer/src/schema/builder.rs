use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::TypeId;
use core::marker::PhantomData;

use serde_json::Value;
use vista_utils::hash::{HashMap, HashSet};
use vista_utils::inflect::{demodulize, underscore};

use super::association::AssociationOptionsErased;
use super::attribute::AttributeOptionsErased;
use super::{AssociationDecl, AssociationKind, AssociationOptions, AttributeDecl};
use super::{AttributeOptions, FieldPredicate, HrefRule, Predicate, Schema};
use crate::error::{DefinitionError, SerializeError};
use crate::model::Model;
use crate::options::Options;

// -----------------------------------------------------------------------------
// SchemaBuilder

/// Declaration surface of a [`Schema`] for model type `T`.
///
/// Declarations are recorded in order. The first invalid declaration is
/// remembered and returned by [`Schema::define`] (or the registry's
/// `define`), every later declaration is still recorded but ignored.
///
/// # Examples
///
/// ```
/// use serde_json::{Value, json};
/// use vista_serializer::{AttributeOptions, Model, Schema};
///
/// struct User { id: u64, name: String, ssn: String }
///
/// impl Model for User {
///     fn read_attribute_for_serialization(&self, name: &str) -> Value {
///         match name {
///             "id" => json!(self.id),
///             "name" => json!(self.name),
///             "ssn" => json!(self.ssn),
///             _ => Value::Null,
///         }
///     }
/// }
///
/// let schema = Schema::define::<User>(|s| {
///     s.attribute("id");
///     s.attribute_with(
///         "name",
///         AttributeOptions::new().read(|u: &User| json!(u.name.to_uppercase())),
///     );
///     s.group("secret", |s| {
///         s.attribute("ssn");
///     });
///     s.href(|u: &User| format!("/users/{}", u.id));
/// })
/// .unwrap();
///
/// assert_eq!(schema.attribute("ssn").unwrap().group(), Some("secret"));
/// assert!(schema.has_href());
/// ```
pub struct SchemaBuilder<T: Model> {
    name: String,
    attributes: Vec<AttributeDecl>,
    associations: Vec<AssociationDecl>,
    groups: Vec<String>,
    predicates: HashMap<String, FieldPredicate>,
    href: Option<(TypeId, HrefRule)>,
    object_type: Option<String>,
    root: bool,
    // keys declared by this definition, inherited keys may be redeclared once
    declared_attributes: HashSet<String>,
    declared_associations: HashSet<String>,
    current_group: Option<String>,
    declarations: usize,
    error: Option<DefinitionError>,
    _marker: PhantomData<fn(&T)>,
}

impl<T: Model> SchemaBuilder<T> {
    pub(crate) fn new() -> Self {
        Self {
            name: underscore(demodulize(core::any::type_name::<T>())),
            attributes: Vec::new(),
            associations: Vec::new(),
            groups: Vec::new(),
            predicates: HashMap::default(),
            href: None,
            object_type: None,
            root: false,
            declared_attributes: HashSet::default(),
            declared_associations: HashSet::default(),
            current_group: None,
            declarations: 0,
            error: None,
            _marker: PhantomData,
        }
    }

    /// Starts from a copy of every declaration of `parent` except its name.
    ///
    /// Call this before any other declaration, an inherited key may then be
    /// redeclared once.
    pub fn inherit(&mut self, parent: &Schema) -> &mut Self {
        self.attributes = parent.attributes.clone();
        self.associations = parent.associations.clone();
        self.groups = parent.groups.clone();
        self.predicates = parent.predicates.clone();
        self.href = parent.href.clone();
        self.object_type = parent.object_type.clone();
        self.root = parent.root;
        self
    }

    fn fail(&mut self, error: DefinitionError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    fn effective_group(&self, explicit: Option<String>) -> Option<String> {
        explicit.or_else(|| self.current_group.clone())
    }

    fn note_group(&mut self, group: Option<&str>) {
        if let Some(group) = group
            && !self.groups.iter().any(|g| g == group)
        {
            self.groups.push(group.into());
        }
    }

    // -------------------------------------------------------------------------
    // Naming

    /// Overrides the schema name (and so the root name).
    pub fn name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = name.into();
        self
    }

    /// Wraps objects under the root name by default.
    pub fn root(&mut self, root: bool) -> &mut Self {
        self.root = root;
        self
    }

    /// Declares the `serialized_object_type` used by linked-resource links.
    pub fn object_type(&mut self, object_type: impl Into<String>) -> &mut Self {
        self.object_type = Some(object_type.into());
        self
    }

    // -------------------------------------------------------------------------
    // Attributes

    /// Declares an attribute read through the model's default indirection.
    pub fn attribute(&mut self, name: &str) -> &mut Self {
        self.attribute_with(name, AttributeOptions::new())
    }

    /// Declares several attributes at once.
    pub fn attributes<'n>(&mut self, names: impl IntoIterator<Item = &'n str>) -> &mut Self {
        for name in names {
            self.attribute(name);
        }
        self
    }

    /// Declares an attribute with a key, a group or a custom reader.
    pub fn attribute_with(&mut self, name: &str, options: AttributeOptions<T>) -> &mut Self {
        let mut options: AttributeOptionsErased = options.erase();
        options.group = self.effective_group(options.group);
        let decl = AttributeDecl::new(name, options);
        self.declarations += 1;

        let key = String::from(decl.key());
        if !self.declared_attributes.insert(key.clone()) {
            self.fail(DefinitionError::DuplicateAttribute {
                schema: self.name.clone(),
                key,
            });
            return self;
        }

        self.note_group(decl.group());
        match self.attributes.iter_mut().find(|a| a.key() == key) {
            Some(inherited) => *inherited = decl,
            None => self.attributes.push(decl),
        }
        self
    }

    // -------------------------------------------------------------------------
    // Associations

    /// Declares a to-many association.
    pub fn has_many(&mut self, name: &str) -> &mut Self {
        self.associate(name, AssociationKind::Many, AssociationOptions::new())
    }

    pub fn has_many_with(&mut self, name: &str, options: AssociationOptions<T>) -> &mut Self {
        self.associate(name, AssociationKind::Many, options)
    }

    /// Declares a to-one association.
    pub fn belongs_to(&mut self, name: &str) -> &mut Self {
        self.associate(name, AssociationKind::One, AssociationOptions::new())
    }

    pub fn belongs_to_with(&mut self, name: &str, options: AssociationOptions<T>) -> &mut Self {
        self.associate(name, AssociationKind::One, options)
    }

    fn associate(
        &mut self,
        name: &str,
        kind: AssociationKind,
        options: AssociationOptions<T>,
    ) -> &mut Self {
        let mut options: AssociationOptionsErased = options.erase();
        options.group = self.effective_group(options.group);
        let decl = AssociationDecl::new(name, kind, options);
        self.declarations += 1;

        if !self.declared_associations.insert(String::from(name)) {
            self.fail(DefinitionError::DuplicateAssociation {
                schema: self.name.clone(),
                name: name.into(),
            });
            return self;
        }

        self.note_group(decl.group());
        match self.associations.iter_mut().find(|a| a.name() == name) {
            Some(inherited) => *inherited = decl,
            None => self.associations.push(decl),
        }
        self
    }

    // -------------------------------------------------------------------------
    // Blocks

    /// Puts every declaration made inside `block` into `name`.
    ///
    /// An explicit `group` option on a declaration wins over the block.
    /// A group without a name, or a block that declares nothing, is a
    /// definition error.
    pub fn group(&mut self, name: &str, block: impl FnOnce(&mut Self)) -> &mut Self {
        if name.is_empty() {
            self.fail(DefinitionError::EmptyGroupName {
                schema: self.name.clone(),
            });
            return self;
        }

        let before = self.declarations;
        let outer = self.current_group.replace(name.into());
        block(self);
        self.current_group = outer;

        if self.declarations == before {
            self.fail(DefinitionError::EmptyGroup {
                schema: self.name.clone(),
                group: name.into(),
            });
        }
        self
    }

    /// Declares the href rule used by linked-resource links.
    pub fn href<F>(&mut self, rule: F) -> &mut Self
    where
        F: Fn(&T) -> String + Send + Sync + 'static,
    {
        let rule: HrefRule = Arc::new(move |object: &dyn Model| {
            match object.downcast_ref::<T>() {
                Some(model) => Ok(rule(model)),
                None => Err(SerializeError::reader_mismatch(
                    core::any::type_name::<T>(),
                    object,
                )),
            }
        });
        self.href = Some((TypeId::of::<T>(), rule));
        self
    }

    /// Declares the `include_<field>?` predicate for an attribute key or an
    /// association name.
    pub fn include_if<F>(&mut self, field: &str, predicate: F) -> &mut Self
    where
        F: Fn(&T, &Options) -> bool + Send + Sync + 'static,
    {
        let predicate: Predicate = Arc::new(move |object: &dyn Model, options: &Options| {
            match object.downcast_ref::<T>() {
                Some(model) => Ok(predicate(model, options)),
                None => Err(SerializeError::reader_mismatch(
                    core::any::type_name::<T>(),
                    object,
                )),
            }
        });
        self.predicates
            .insert(field.into(), FieldPredicate::new::<T>(predicate));
        self
    }

    /// Convenience for a computed attribute: `attribute_with(name, read(f))`.
    pub fn computed<F>(&mut self, name: &str, f: F) -> &mut Self
    where
        F: Fn(&T) -> Value + Send + Sync + 'static,
    {
        self.attribute_with(name, AttributeOptions::new().read(f))
    }

    // -------------------------------------------------------------------------
    // Build

    pub(crate) fn build(self) -> Result<Schema, DefinitionError> {
        if let Some(error) = self.error {
            return Err(error);
        }

        Ok(Schema {
            name: self.name,
            model_type: TypeId::of::<T>(),
            model_type_path: core::any::type_name::<T>(),
            attributes: self.attributes,
            associations: self.associations,
            groups: self.groups,
            predicates: self.predicates,
            href: self.href,
            object_type: self.object_type,
            root: self.root,
        })
    }
}

#[cfg(test)]
mod tests {
    use alloc::format;
    use alloc::string::ToString;
    use core::any::TypeId;

    use serde_json::json;

    use crate::error::{DefinitionError, SerializeError};
    use crate::schema::{AssociationKind, AssociationOptions, AttributeOptions, Schema};
    use crate::test_models::{Comment, Post, User};

    #[test]
    fn declaration_order_is_kept() {
        let schema = Schema::define::<User>(|s| {
            s.attributes(["name", "id"]);
            s.attribute_with("email", AttributeOptions::new().key("mail"));
        })
        .unwrap();

        let keys: Vec<_> = schema.attributes().iter().map(|a| a.key()).collect();
        assert_eq!(keys, ["name", "id", "mail"]);
        assert_eq!(schema.attribute("mail").unwrap().source(), "email");
    }

    #[test]
    fn duplicate_attribute_is_rejected() {
        let err = Schema::define::<User>(|s| {
            s.attribute("name");
            s.attribute("name");
        })
        .unwrap_err();

        assert_eq!(
            err,
            DefinitionError::DuplicateAttribute {
                schema: "user".into(),
                key: "name".into()
            }
        );
    }

    #[test]
    fn duplicate_association_is_rejected() {
        let err = Schema::define::<Post>(|s| {
            s.has_many("comments");
            s.belongs_to("author");
            s.has_many("comments");
        })
        .unwrap_err();

        assert_eq!(
            err,
            DefinitionError::DuplicateAssociation {
                schema: "post".into(),
                name: "comments".into()
            }
        );
    }

    #[test]
    fn attribute_and_association_namespaces_are_independent() {
        let schema = Schema::define::<Post>(|s| {
            s.attribute("author");
            s.belongs_to("author");
        })
        .unwrap();

        assert!(schema.attribute("author").is_some());
        assert_eq!(
            schema.association("author").unwrap().kind(),
            AssociationKind::One
        );
    }

    #[test]
    fn group_block_assigns_group_unless_explicit() {
        let schema = Schema::define::<User>(|s| {
            s.group("private", |s| {
                s.attribute("email");
                s.attribute_with("ssn", AttributeOptions::new().group("secret"));
            });
            s.attribute("name");
        })
        .unwrap();

        assert_eq!(schema.attribute("email").unwrap().group(), Some("private"));
        assert_eq!(schema.attribute("ssn").unwrap().group(), Some("secret"));
        assert_eq!(schema.attribute("name").unwrap().group(), None);
        assert_eq!(schema.groups(), ["private", "secret"]);
    }

    #[test]
    fn empty_group_fails_fast() {
        let err = Schema::define::<User>(|s| {
            s.group("private", |_| {});
        })
        .unwrap_err();
        assert!(err.to_string().contains("declares nothing"));

        let err = Schema::define::<User>(|s| {
            s.group("", |s| {
                s.attribute("ssn");
            });
        })
        .unwrap_err();
        assert!(matches!(err, DefinitionError::EmptyGroupName { .. }));
    }

    #[test]
    fn custom_readers_are_dispatched() {
        let schema = Schema::define::<Comment>(|s| {
            s.computed("shout", |c: &Comment| json!(c.body.to_uppercase()));
            s.has_many_with(
                "likes",
                AssociationOptions::new()
                    .read(|c: &Comment| Some(crate::Associated::many(&c.likes))),
            );
        })
        .unwrap();

        let comment = Comment::new(1, "hey").with_likes([7, 8]);
        let shout = schema.attribute("shout").unwrap();
        assert_eq!(shout.reader_type(), Some(TypeId::of::<Comment>()));
        assert_eq!(shout.read(&comment).unwrap(), json!("HEY"));

        let likes = schema.association("likes").unwrap().read(&comment).unwrap();
        assert!(likes.is_some_and(|likes| likes.is_many()));
    }

    #[test]
    fn typed_readers_reject_other_models() {
        let schema = Schema::define::<Comment>(|s| {
            s.computed("shout", |c: &Comment| json!(c.body.to_uppercase()));
            s.href(|c: &Comment| format!("/comments/{}", c.id));
        })
        .unwrap();

        let post = Post::new(1, "Hi");
        let err = schema.attribute("shout").unwrap().read(&post).unwrap_err();
        assert!(matches!(
            err,
            SerializeError::ReaderMismatch { ref found, .. } if found == "post"
        ));
        assert!(schema.href_for(&post).is_err());

        let comment = Comment::new(3, "hey");
        assert_eq!(
            schema.href_for(&comment).unwrap().as_deref(),
            Some("/comments/3")
        );
    }

    #[test]
    fn predicate_is_typed() {
        let schema = Schema::define::<User>(|s| {
            s.attribute("email");
            s.include_if("email", |u: &User, _| u.admin);
        })
        .unwrap();

        let predicate = schema.predicate("email").unwrap();
        let admin = User::new(1, "root").admin();
        let user = User::new(2, "joe");
        let options = crate::Options::new();
        assert_eq!(predicate.model_type(), TypeId::of::<User>());
        assert!(predicate.test(&admin, &options).unwrap());
        assert!(!predicate.test(&user, &options).unwrap());
        assert!(predicate.test(&Post::new(1, "Hi"), &options).is_err());
    }
}
