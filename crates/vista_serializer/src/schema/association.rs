use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::TypeId;
use core::marker::PhantomData;

use crate::error::SerializeError;
use crate::model::{Associated, Model};
use crate::schema::Schema;

// -----------------------------------------------------------------------------
// AssociationKind

/// Cardinality of an association.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssociationKind {
    /// Declared with `has_many`.
    Many,
    /// Declared with `belongs_to`.
    One,
}

// -----------------------------------------------------------------------------
// AssociationReader

/// A type-erased association read strategy.
pub type AssociationReader = Arc<
    dyn for<'o> Fn(&'o dyn Model) -> Result<Option<Associated<'o>>, SerializeError> + Send + Sync,
>;

// Pins the higher-ranked signature so the closure's output borrows its input.
#[inline(always)]
fn constrain<F>(f: F) -> F
where
    F: for<'o> Fn(&'o dyn Model) -> Result<Option<Associated<'o>>, SerializeError>,
{
    f
}

pub(crate) fn erase_association<T, F>(f: F) -> AssociationReader
where
    T: Model,
    F: for<'o> Fn(&'o T) -> Option<Associated<'o>> + Send + Sync + 'static,
{
    Arc::new(constrain(move |object| match object.downcast_ref::<T>() {
        Some(model) => Ok(f(model)),
        None => Err(SerializeError::reader_mismatch(
            core::any::type_name::<T>(),
            object,
        )),
    }))
}

// -----------------------------------------------------------------------------
// OptionOverrides

/// Structural options an association imposes on its children.
///
/// `None` inherits the parent's list.
#[derive(Debug, Clone, Default)]
pub struct OptionOverrides {
    pub include: Option<Vec<String>>,
    pub exclude: Option<Vec<String>>,
    pub including: Option<Vec<String>>,
    pub excluding: Option<Vec<String>>,
}

// -----------------------------------------------------------------------------
// AssociationDecl

/// One declared association.
#[derive(Clone)]
pub struct AssociationDecl {
    name: String,
    key: String,
    kind: AssociationKind,
    group: Option<String>,
    serializer: Option<Arc<Schema>>,
    each_serializer: Option<Arc<Schema>>,
    reader: Option<AssociationReader>,
    reader_type: Option<TypeId>,
    overrides: OptionOverrides,
}

impl AssociationDecl {
    pub(crate) fn new(
        name: &str,
        kind: AssociationKind,
        options: AssociationOptionsErased,
    ) -> Self {
        Self {
            name: name.into(),
            key: options.key.unwrap_or_else(|| name.into()),
            kind,
            group: options.group,
            serializer: options.serializer,
            each_serializer: options.each_serializer,
            reader: options.reader,
            reader_type: options.reader_type,
            overrides: options.overrides,
        }
    }

    /// Declared name, the one the inclusion filter sees.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Output key (`as`), also the name read from the model.
    #[inline]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[inline]
    pub fn kind(&self) -> AssociationKind {
        self.kind
    }

    #[inline]
    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    /// Explicit schema for the target.
    #[inline]
    pub fn serializer(&self) -> Option<&Arc<Schema>> {
        self.serializer.as_ref()
    }

    /// Explicit schema for every element of a to-many target.
    #[inline]
    pub fn each_serializer(&self) -> Option<&Arc<Schema>> {
        self.each_serializer.as_ref()
    }

    #[inline]
    pub fn overrides(&self) -> &OptionOverrides {
        &self.overrides
    }

    /// The model type the custom reader downcasts to.
    #[inline]
    pub fn reader_type(&self) -> Option<TypeId> {
        self.reader_type
    }

    /// Reads the association from `object`.
    ///
    /// A reader declared with [`AssociationOptions::read`] wins, otherwise
    /// [`Model::read_association`] is asked for the output key.
    pub fn read<'o>(
        &self,
        object: &'o dyn Model,
    ) -> Result<Option<Associated<'o>>, SerializeError> {
        match &self.reader {
            Some(reader) => reader(object),
            None => Ok(object.read_association(&self.key)),
        }
    }
}

impl core::fmt::Debug for AssociationDecl {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AssociationDecl")
            .field("name", &self.name)
            .field("key", &self.key)
            .field("kind", &self.kind)
            .field("group", &self.group)
            .field("serializer", &self.serializer.as_ref().map(|s| s.name()))
            .field(
                "each_serializer",
                &self.each_serializer.as_ref().map(|s| s.name()),
            )
            .field("custom_reader", &self.reader.is_some())
            .field("overrides", &self.overrides)
            .finish()
    }
}

// -----------------------------------------------------------------------------
// AssociationOptions

/// Options of [`SchemaBuilder::has_many_with`] and
/// [`SchemaBuilder::belongs_to_with`].
///
/// [`SchemaBuilder::has_many_with`]: crate::schema::SchemaBuilder::has_many_with
/// [`SchemaBuilder::belongs_to_with`]: crate::schema::SchemaBuilder::belongs_to_with
pub struct AssociationOptions<T: Model> {
    key: Option<String>,
    group: Option<String>,
    serializer: Option<Arc<Schema>>,
    each_serializer: Option<Arc<Schema>>,
    reader: Option<AssociationReader>,
    overrides: OptionOverrides,
    _marker: PhantomData<fn(&T)>,
}

pub(crate) struct AssociationOptionsErased {
    pub key: Option<String>,
    pub group: Option<String>,
    pub serializer: Option<Arc<Schema>>,
    pub each_serializer: Option<Arc<Schema>>,
    pub reader: Option<AssociationReader>,
    pub reader_type: Option<TypeId>,
    pub overrides: OptionOverrides,
}

impl<T: Model> Default for AssociationOptions<T> {
    fn default() -> Self {
        Self {
            key: None,
            group: None,
            serializer: None,
            each_serializer: None,
            reader: None,
            overrides: OptionOverrides::default(),
            _marker: PhantomData,
        }
    }
}

fn list(items: impl IntoIterator<Item = impl Into<String>>) -> Option<Vec<String>> {
    Some(items.into_iter().map(Into::into).collect())
}

impl<T: Model> AssociationOptions<T> {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Output under `key` (the `as` option). The model is read with this key.
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Serialize the target with `schema` instead of the registered one.
    pub fn serializer(mut self, schema: Arc<Schema>) -> Self {
        self.serializer = Some(schema);
        self
    }

    /// Serialize every element of a to-many target with `schema`.
    pub fn each_serializer(mut self, schema: Arc<Schema>) -> Self {
        self.each_serializer = Some(schema);
        self
    }

    /// Read the association with `f` instead of [`Model::read_association`].
    pub fn read<F>(mut self, f: F) -> Self
    where
        F: for<'o> Fn(&'o T) -> Option<Associated<'o>> + Send + Sync + 'static,
    {
        self.reader = Some(erase_association::<T, F>(f));
        self
    }

    pub fn include(mut self, fields: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.overrides.include = list(fields);
        self
    }

    pub fn exclude(mut self, fields: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.overrides.exclude = list(fields);
        self
    }

    pub fn including(mut self, groups: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.overrides.including = list(groups);
        self
    }

    pub fn excluding(mut self, groups: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.overrides.excluding = list(groups);
        self
    }

    pub(crate) fn erase(self) -> AssociationOptionsErased {
        AssociationOptionsErased {
            key: self.key,
            group: self.group,
            serializer: self.serializer,
            each_serializer: self.each_serializer,
            reader_type: self.reader.is_some().then(TypeId::of::<T>),
            reader: self.reader,
            overrides: self.overrides,
        }
    }
}
