use crate::error::DefinitionError;
use crate::registry::SchemaRegistry;

/// A schema definition submitted at compile time.
///
/// Collected by [`SchemaRegistry::auto_register`].
///
/// # Examples
///
/// ```no_run
/// use serde_json::{Value, json};
/// use vista_serializer::{DefinitionError, Model, SchemaRegistry};
/// use vista_serializer::registry::SchemaRegistration;
///
/// struct Tag { name: String }
///
/// impl Model for Tag {
///     fn read_attribute_for_serialization(&self, name: &str) -> Value {
///         match name {
///             "name" => json!(self.name),
///             _ => Value::Null,
///         }
///     }
/// }
///
/// fn tag_schema(registry: &mut SchemaRegistry) -> Result<(), DefinitionError> {
///     registry.define::<Tag>(|s| {
///         s.attribute("name");
///     })?;
///     Ok(())
/// }
///
/// inventory::submit! { SchemaRegistration::new(tag_schema) }
///
/// let mut registry = SchemaRegistry::new();
/// assert_eq!(registry.auto_register().unwrap(), 1);
/// ```
pub struct SchemaRegistration {
    register: fn(&mut SchemaRegistry) -> Result<(), DefinitionError>,
}

impl SchemaRegistration {
    #[inline]
    pub const fn new(register: fn(&mut SchemaRegistry) -> Result<(), DefinitionError>) -> Self {
        Self { register }
    }

    #[inline]
    pub(crate) fn apply(&self, registry: &mut SchemaRegistry) -> Result<(), DefinitionError> {
        (self.register)(registry)
    }
}

inventory::collect!(SchemaRegistration);

pub(crate) fn registrations() -> impl Iterator<Item = &'static SchemaRegistration> {
    inventory::iter::<SchemaRegistration>.into_iter()
}
