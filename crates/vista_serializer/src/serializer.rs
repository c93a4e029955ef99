//! The serialization entry point.

use alloc::sync::Arc;
use alloc::vec::Vec;

use serde_json::Value;

use crate::adapter::{Adapter, AdapterSelector, AdapterTable};
use crate::config::SerializerConfig;
use crate::error::SerializeError;
use crate::instance::{Context, SerializerInstance};
use crate::model::{Associated, Model};
use crate::options::Options;
use crate::registry::SchemaRegistry;

// -----------------------------------------------------------------------------
// Target

/// What one call serializes.
#[derive(Debug)]
pub enum Target<'a> {
    /// A single object.
    One(&'a dyn Model),
    /// An ordered sequence, possibly mixing model types.
    Many(Vec<&'a dyn Model>),
}

impl<'a> Target<'a> {
    #[inline]
    pub fn one<M: Model>(object: &'a M) -> Self {
        Self::One(object)
    }

    pub fn many<M: Model>(objects: impl IntoIterator<Item = &'a M>) -> Self {
        Self::Many(objects.into_iter().map(|o| o as &dyn Model).collect())
    }

    #[inline]
    pub fn is_many(&self) -> bool {
        matches!(self, Self::Many(_))
    }
}

impl<'a> From<&'a dyn Model> for Target<'a> {
    #[inline]
    fn from(object: &'a dyn Model) -> Self {
        Self::One(object)
    }
}

impl<'a> From<Vec<&'a dyn Model>> for Target<'a> {
    #[inline]
    fn from(objects: Vec<&'a dyn Model>) -> Self {
        Self::Many(objects)
    }
}

impl<'a> From<Associated<'a>> for Target<'a> {
    #[inline]
    fn from(associated: Associated<'a>) -> Self {
        match associated {
            Associated::One(object) => Self::One(object),
            Associated::Many(objects) => Self::Many(objects),
        }
    }
}

// -----------------------------------------------------------------------------
// Serializer

/// A configured serializer over a shared [`SchemaRegistry`].
///
/// Cheap to share between threads: the registry is read-only and every call
/// owns its own state.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use serde_json::{Value, json};
/// use vista_serializer::{AdapterKind, Model, Options, SchemaRegistry, Serializer, Target};
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
/// let mut registry = SchemaRegistry::new();
/// registry.define::<Post>(|s| { s.attributes(["id", "title"]); }).unwrap();
///
/// let serializer = Serializer::new(Arc::new(registry));
/// let post = Post { id: 1, title: "Hi".into() };
///
/// let plain = serializer.serialize(Target::one(&post), &Options::new().root(true)).unwrap();
/// assert_eq!(plain, json!({ "post": { "id": 1, "title": "Hi" } }));
///
/// let options = Options::new().adapter(AdapterKind::JsonApi);
/// let document = serializer.serialize(Target::one(&post), &options).unwrap();
/// assert_eq!(document, json!({ "posts": { "id": "1", "title": "Hi" } }));
/// ```
#[derive(Debug, Clone)]
pub struct Serializer {
    registry: Arc<SchemaRegistry>,
    config: SerializerConfig,
    adapters: AdapterTable,
}

impl Serializer {
    /// A serializer with the default configuration.
    #[inline]
    pub fn new(registry: Arc<SchemaRegistry>) -> Self {
        Self::with_config(registry, SerializerConfig::default())
    }

    pub fn with_config(registry: Arc<SchemaRegistry>, config: SerializerConfig) -> Self {
        Self {
            registry,
            config,
            adapters: AdapterTable::builtin(),
        }
    }

    /// Makes `adapter` selectable by its name.
    pub fn register_adapter(&mut self, adapter: Arc<dyn Adapter>) -> &mut Self {
        self.adapters.register(adapter);
        self
    }

    #[inline]
    pub fn registry(&self) -> &Arc<SchemaRegistry> {
        &self.registry
    }

    #[inline]
    pub fn config(&self) -> &SerializerConfig {
        &self.config
    }

    #[inline]
    pub fn adapters(&self) -> &AdapterTable {
        &self.adapters
    }

    /// Serializes `target` into one document.
    pub fn serialize(
        &self,
        target: Target<'_>,
        options: &Options,
    ) -> Result<Value, SerializeError> {
        run(&self.registry, &self.config, &self.adapters, target, options)
    }
}

/// Serializes `target` with the default configuration and built-in adapters.
pub fn serialize(
    registry: &SchemaRegistry,
    target: Target<'_>,
    options: &Options,
) -> Result<Value, SerializeError> {
    let config = SerializerConfig::default();
    run(registry, &config, &AdapterTable::builtin(), target, options)
}

fn run(
    registry: &SchemaRegistry,
    config: &SerializerConfig,
    adapters: &AdapterTable,
    target: Target<'_>,
    options: &Options,
) -> Result<Value, SerializeError> {
    let adapter = select_adapter(config, adapters, options)?;

    let mut options = options.clone();
    if options.embed.is_none() {
        options.embed = Some(config.embed);
    }

    let context = Context::new(registry, config.max_depth);
    let instance = SerializerInstance::new(context, target, options);

    match adapter {
        Some(adapter) => adapter.serializable_hash(&instance),
        None => Ok(raw(&instance)),
    }
}

fn select_adapter(
    config: &SerializerConfig,
    adapters: &AdapterTable,
    options: &Options,
) -> Result<Option<Arc<dyn Adapter>>, SerializeError> {
    let adapter = match &options.adapter {
        None => adapters.lookup(config.adapter.name())?,
        Some(AdapterSelector::Kind(kind)) => adapters.lookup(kind.name())?,
        Some(AdapterSelector::Named(name)) => adapters.lookup(name)?,
        Some(AdapterSelector::Custom(adapter)) => adapter.clone(),
        Some(AdapterSelector::Disabled) => {
            log::debug!("adapter disabled, serializing raw attributes");
            return Ok(None);
        }
    };
    log::debug!("serializing with adapter `{}`", adapter.name());
    Ok(Some(adapter))
}

/// The objects' own attribute sets, bypassing schemas.
fn raw(instance: &SerializerInstance<'_>) -> Value {
    match instance.object() {
        Some(object) => Value::Object(object.attributes()),
        None => instance.elements().iter().map(raw).collect(),
    }
}
