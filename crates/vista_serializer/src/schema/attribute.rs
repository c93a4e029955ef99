use alloc::string::String;
use alloc::sync::Arc;
use core::any::TypeId;
use core::marker::PhantomData;

use serde_json::Value;

use crate::error::SerializeError;
use crate::model::Model;

// -----------------------------------------------------------------------------
// AttributeReader

/// A type-erased attribute read strategy.
///
/// Fails with [`SerializeError::ReaderMismatch`] when handed an object of
/// another type than the one it was declared for.
pub type AttributeReader = Arc<dyn Fn(&dyn Model) -> Result<Value, SerializeError> + Send + Sync>;

pub(crate) fn erase_attribute<T, F>(f: F) -> AttributeReader
where
    T: Model,
    F: Fn(&T) -> Value + Send + Sync + 'static,
{
    Arc::new(move |object: &dyn Model| match object.downcast_ref::<T>() {
        Some(model) => Ok(f(model)),
        None => Err(SerializeError::reader_mismatch(
            core::any::type_name::<T>(),
            object,
        )),
    })
}

// -----------------------------------------------------------------------------
// AttributeDecl

/// One declared attribute.
#[derive(Clone)]
pub struct AttributeDecl {
    key: String,
    source: String,
    group: Option<String>,
    reader: Option<AttributeReader>,
    reader_type: Option<TypeId>,
}

impl AttributeDecl {
    pub(crate) fn new(source: &str, options: AttributeOptionsErased) -> Self {
        Self {
            key: options.key.unwrap_or_else(|| source.into()),
            source: source.into(),
            group: options.group,
            reader: options.reader,
            reader_type: options.reader_type,
        }
    }

    /// Output key.
    #[inline]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Name passed to [`Model::read_attribute_for_serialization`].
    #[inline]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[inline]
    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    /// `true` if a custom read strategy replaces the default one.
    #[inline]
    pub fn has_reader(&self) -> bool {
        self.reader.is_some()
    }

    /// The model type the custom reader downcasts to.
    ///
    /// Differs from the schema's own type for an inherited declaration.
    #[inline]
    pub fn reader_type(&self) -> Option<TypeId> {
        self.reader_type
    }

    /// Reads the attribute from `object`.
    ///
    /// This is the single dispatch point: a reader declared with
    /// [`AttributeOptions::read`] wins, otherwise the value comes from
    /// [`Model::read_attribute_for_serialization`] with the source name.
    /// A custom reader must be handed an object of its [`reader_type`].
    ///
    /// [`reader_type`]: Self::reader_type
    pub fn read(&self, object: &dyn Model) -> Result<Value, SerializeError> {
        match &self.reader {
            Some(reader) => reader(object),
            None => Ok(object.read_attribute_for_serialization(&self.source)),
        }
    }
}

impl core::fmt::Debug for AttributeDecl {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AttributeDecl")
            .field("key", &self.key)
            .field("source", &self.source)
            .field("group", &self.group)
            .field("custom_reader", &self.reader.is_some())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// AttributeOptions

/// Options of [`SchemaBuilder::attribute_with`].
///
/// [`SchemaBuilder::attribute_with`]: crate::schema::SchemaBuilder::attribute_with
pub struct AttributeOptions<T: Model> {
    key: Option<String>,
    group: Option<String>,
    reader: Option<AttributeReader>,
    _marker: PhantomData<fn(&T)>,
}

pub(crate) struct AttributeOptionsErased {
    pub key: Option<String>,
    pub group: Option<String>,
    pub reader: Option<AttributeReader>,
    pub reader_type: Option<TypeId>,
}

impl<T: Model> Default for AttributeOptions<T> {
    fn default() -> Self {
        Self {
            key: None,
            group: None,
            reader: None,
            _marker: PhantomData,
        }
    }
}

impl<T: Model> AttributeOptions<T> {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Output under `key` instead of the attribute name.
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Put the attribute in `group`, overriding an enclosing group block.
    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Read the attribute with `f` instead of
    /// [`Model::read_attribute_for_serialization`].
    pub fn read<F>(mut self, f: F) -> Self
    where
        F: Fn(&T) -> Value + Send + Sync + 'static,
    {
        self.reader = Some(erase_attribute::<T, F>(f));
        self
    }

    pub(crate) fn erase(self) -> AttributeOptionsErased {
        AttributeOptionsErased {
            key: self.key,
            group: self.group,
            reader_type: self.reader.is_some().then(TypeId::of::<T>),
            reader: self.reader,
        }
    }
}
