#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

// -----------------------------------------------------------------------------
// Alloc

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod config;
mod error;
mod model;
mod options;
mod serializer;

pub mod adapter;
pub mod filter;
pub mod instance;
pub mod registry;
pub mod schema;

#[cfg(test)]
mod test_models;

// -----------------------------------------------------------------------------
// Top-Level exports

pub use adapter::{Adapter, AdapterKind, AdapterSelector};
pub use config::{DEFAULT_MAX_DEPTH, SerializerConfig};
pub use error::{DefinitionError, SerializeError};
pub use model::{Associated, Model, attributes_of};
pub use options::{ALL, Embed, Options, Root};
pub use registry::SchemaRegistry;
pub use schema::{AssociationOptions, AttributeOptions, Schema, SchemaBuilder};
pub use serializer::{Serializer, Target, serialize};

// Re-exported for `inventory::submit!` users.
#[cfg(feature = "auto_register")]
pub use inventory;
