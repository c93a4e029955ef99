use alloc::string::String;
use alloc::vec::Vec;
use core::any::{Any, TypeId};

use serde::Serialize;
use serde_json::{Map, Value};
use vista_utils::inflect::{demodulize, underscore};

// -----------------------------------------------------------------------------
// Model

/// A domain object that can be projected into a document.
///
/// Serialization is read only: schemas never mutate a model, they only read
/// it through [`read_attribute_for_serialization`] and [`read_association`].
///
/// Only [`read_attribute_for_serialization`] is required. Objects without a
/// registered schema are serialized from [`attributes`], which defaults to an
/// empty map.
///
/// # Examples
///
/// ```
/// use serde_json::{Value, json};
/// use vista_serializer::Model;
///
/// struct Post {
///     id: u64,
///     title: String,
/// }
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
/// let post = Post { id: 1, title: "Hi".into() };
/// assert_eq!(post.type_name(), "post");
/// assert_eq!(post.id(), json!(1));
/// ```
///
/// [`read_attribute_for_serialization`]: Model::read_attribute_for_serialization
/// [`read_association`]: Model::read_association
/// [`attributes`]: Model::attributes
pub trait Model: Any + 'static {
    /// Reads one attribute. Unknown names should yield [`Value::Null`].
    fn read_attribute_for_serialization(&self, name: &str) -> Value;

    /// Reads one association. `None` means the association is absent.
    fn read_association(&self, name: &str) -> Option<Associated<'_>> {
        let _ = name;
        None
    }

    /// The raw attribute set, used when no schema is registered for the type.
    fn attributes(&self) -> Map<String, Value> {
        Map::new()
    }

    /// The stable identifier of this object.
    fn id(&self) -> Value {
        self.read_attribute_for_serialization("id")
    }

    /// Underscored short type name, e.g. `blog_post` for `app::BlogPost`.
    fn type_name(&self) -> String {
        underscore(demodulize(core::any::type_name::<Self>()))
    }
}

impl dyn Model {
    /// The [`TypeId`] of the concrete model type.
    #[inline]
    pub fn model_type(&self) -> TypeId {
        let any: &dyn Any = self;
        any.type_id()
    }

    /// Returns `true` if the concrete type is `T`.
    #[inline]
    pub fn is<T: Model>(&self) -> bool {
        self.model_type() == TypeId::of::<T>()
    }

    /// Downcasts to the concrete model type.
    #[inline]
    pub fn downcast_ref<T: Model>(&self) -> Option<&T> {
        let any: &dyn Any = self;
        any.downcast_ref::<T>()
    }
}

impl core::fmt::Debug for dyn Model {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Model")
            .field("type", &self.type_name())
            .field("id", &self.id())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Associated

/// The value of an association read from a [`Model`].
pub enum Associated<'a> {
    /// A to-one target.
    One(&'a dyn Model),
    /// A to-many target, possibly empty, possibly heterogeneous.
    Many(Vec<&'a dyn Model>),
}

impl<'a> Associated<'a> {
    /// A to-one target.
    #[inline]
    pub fn one<M: Model>(model: &'a M) -> Self {
        Self::One(model)
    }

    /// A to-one target that may be missing.
    #[inline]
    pub fn optional<M: Model>(model: Option<&'a M>) -> Option<Self> {
        model.map(Self::one)
    }

    /// A to-many target.
    pub fn many<M: Model>(models: impl IntoIterator<Item = &'a M>) -> Self {
        Self::Many(models.into_iter().map(|m| m as &dyn Model).collect())
    }

    /// Returns `true` for [`Associated::Many`].
    #[inline]
    pub fn is_many(&self) -> bool {
        matches!(self, Self::Many(_))
    }
}

// -----------------------------------------------------------------------------
// Helpers

/// Builds an attribute map from any `serde` serializable value.
///
/// Values that do not serialize to a JSON object yield an empty map.
/// Handy for implementing [`Model::attributes`].
pub fn attributes_of<T: Serialize + ?Sized>(value: &T) -> Map<String, Value> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::Model;
    use crate::test_models::{Author, Comment};

    #[test]
    fn type_name_is_underscored() {
        let author = Author::new(1, "Ann", "ann@example.com");
        assert_eq!(author.type_name(), "author");
    }

    #[test]
    fn downcast_through_dyn_model() {
        let comment = Comment::new(5, "nice");
        let model: &dyn Model = &comment;

        assert!(model.is::<Comment>());
        assert!(!model.is::<Author>());
        assert_eq!(model.downcast_ref::<Comment>().map(|c| c.id), Some(5));
        assert_eq!(model.id(), json!(5));
    }
}
