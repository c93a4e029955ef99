//! Per-type schemas: declared attributes, associations and groups.
//!
//! A [`Schema`] is built once by a [`SchemaBuilder`] and never changes
//! afterwards. It is shared as `Arc<Schema>` by the registry, by association
//! overrides and by per-call options.
//!
//! ## Menu
//!
//! - [`Schema`]: the immutable declaration.
//! - [`SchemaBuilder`]: the declaration surface (`attribute`, `has_many`,
//!   `belongs_to`, `group`, `href`, `include_if`, ...).
//! - [`AttributeDecl`] / [`AssociationDecl`]: one declared field each, carrying
//!   its read strategy.

// -----------------------------------------------------------------------------
// Modules

mod association;
mod attribute;
mod builder;

// -----------------------------------------------------------------------------
// Exports

pub use association::{
    AssociationDecl, AssociationKind, AssociationOptions, AssociationReader, OptionOverrides,
};
pub use attribute::{AttributeDecl, AttributeOptions, AttributeReader};
pub use builder::SchemaBuilder;

use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::TypeId;

use vista_utils::hash::HashMap;

use crate::error::{DefinitionError, SerializeError};
use crate::model::Model;
use crate::options::Options;

/// Computes the href of an object.
pub type HrefRule = Arc<dyn Fn(&dyn Model) -> Result<String, SerializeError> + Send + Sync>;

/// The `include_<field>?` hook: a last veto on a visible field.
pub type Predicate =
    Arc<dyn Fn(&dyn Model, &Options) -> Result<bool, SerializeError> + Send + Sync>;

// -----------------------------------------------------------------------------
// FieldPredicate

/// A [`Predicate`] and the model type it was declared for.
///
/// A subtype schema inherits its parent's predicates unchanged, so the
/// declaring type may differ from [`Schema::model_type`].
#[derive(Clone)]
pub struct FieldPredicate {
    model_type: TypeId,
    test: Predicate,
}

impl FieldPredicate {
    pub(crate) fn new<T: Model>(test: Predicate) -> Self {
        Self {
            model_type: TypeId::of::<T>(),
            test,
        }
    }

    #[inline]
    pub fn model_type(&self) -> TypeId {
        self.model_type
    }

    /// Runs the hook. `object` must be of [`model_type`](Self::model_type).
    #[inline]
    pub fn test(&self, object: &dyn Model, options: &Options) -> Result<bool, SerializeError> {
        (self.test)(object, options)
    }
}

// -----------------------------------------------------------------------------
// Schema

/// Static serialization metadata of one model type.
///
/// Attribute keys and association names live in separate namespaces and are
/// unique within their own.
///
/// # Examples
///
/// ```
/// use serde_json::{Value, json};
/// use vista_serializer::{Model, Schema};
///
/// struct Post { id: u64, title: String }
///
/// impl Model for Post {
///     fn read_attribute_for_serialization(&self, name: &str) -> Value {
///         match name {
///             "id" => json!(self.id),
///             "title" => json!(self.title),
///             _ => Value::Null,
///         }
///     }
/// }
///
/// let schema = Schema::define::<Post>(|s| {
///     s.attributes(["id", "title"]);
///     s.has_many("comments");
/// })
/// .unwrap();
///
/// assert_eq!(schema.name(), "post");
/// assert_eq!(schema.attributes().len(), 2);
/// assert!(schema.association("comments").is_some());
/// ```
pub struct Schema {
    name: String,
    model_type: TypeId,
    model_type_path: &'static str,
    attributes: Vec<AttributeDecl>,
    associations: Vec<AssociationDecl>,
    groups: Vec<String>,
    predicates: HashMap<String, FieldPredicate>,
    href: Option<(TypeId, HrefRule)>,
    object_type: Option<String>,
    root: bool,
}

impl Schema {
    /// Declares a standalone schema for `T`.
    ///
    /// Use this for association or per-call overrides. Schemas looked up by
    /// type are declared through [`SchemaRegistry::define`].
    ///
    /// [`SchemaRegistry::define`]: crate::registry::SchemaRegistry::define
    pub fn define<T: Model>(
        block: impl FnOnce(&mut SchemaBuilder<T>),
    ) -> Result<Arc<Schema>, DefinitionError> {
        let mut builder = SchemaBuilder::new();
        block(&mut builder);
        builder.build().map(Arc::new)
    }

    /// Schema name, also the root name (`post` for `Post`).
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Same as [`name`](Self::name).
    #[inline]
    pub fn root_name(&self) -> &str {
        &self.name
    }

    /// The model type this schema was declared for.
    #[inline]
    pub fn model_type(&self) -> TypeId {
        self.model_type
    }

    #[inline]
    pub fn model_type_path(&self) -> &'static str {
        self.model_type_path
    }

    /// Whether objects are wrapped under [`root_name`](Self::root_name) by default.
    #[inline]
    pub fn root(&self) -> bool {
        self.root
    }

    /// Attributes in declaration order.
    #[inline]
    pub fn attributes(&self) -> &[AttributeDecl] {
        &self.attributes
    }

    /// Looks up an attribute by output key.
    pub fn attribute(&self, key: &str) -> Option<&AttributeDecl> {
        self.attributes.iter().find(|a| a.key() == key)
    }

    /// Associations in declaration order.
    #[inline]
    pub fn associations(&self) -> &[AssociationDecl] {
        &self.associations
    }

    /// Looks up an association by declared name.
    pub fn association(&self, name: &str) -> Option<&AssociationDecl> {
        self.associations.iter().find(|a| a.name() == name)
    }

    /// Group names in first-declaration order.
    #[inline]
    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    /// The `include_if` hook of `field`.
    #[inline]
    pub fn predicate(&self, field: &str) -> Option<&FieldPredicate> {
        self.predicates.get(field)
    }

    /// The explicit `serialized_object_type`, if declared.
    #[inline]
    pub fn object_type(&self) -> Option<&str> {
        self.object_type.as_deref()
    }

    /// The model type the href rule was declared for.
    #[inline]
    pub fn href_type(&self) -> Option<TypeId> {
        self.href.as_ref().map(|(ty, _)| *ty)
    }

    /// Applies the href rule, if declared.
    ///
    /// `object` must be of [`href_type`](Self::href_type).
    pub fn href_for(&self, object: &dyn Model) -> Result<Option<String>, SerializeError> {
        self.href.as_ref().map(|(_, rule)| rule(object)).transpose()
    }

    #[inline]
    pub fn has_href(&self) -> bool {
        self.href.is_some()
    }
}

impl core::fmt::Debug for Schema {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Schema")
            .field("name", &self.name)
            .field("model", &self.model_type_path)
            .field("attributes", &self.attributes)
            .field("associations", &self.associations)
            .field("groups", &self.groups)
            .field("root", &self.root)
            .field("object_type", &self.object_type)
            .finish_non_exhaustive()
    }
}
