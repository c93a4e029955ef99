//! Type-keyed schema lookup.
//!
//! ## Menu
//!
//! - [`SchemaRegistry`]: maps model types to their [`Schema`], with an
//!   explicit supertype chain walked on lookup.
//! - [`SequenceSchema`]: per-element schemas of a (possibly heterogeneous)
//!   sequence.
//! - [`SchemaRegistration`]: a static registration collected by
//!   [`SchemaRegistry::auto_register`] (`auto_register` feature).
//!
//! ## Lookup
//!
//! [`SchemaRegistry::resolve`] tries the concrete type first, then follows
//! the supertypes declared with [`SchemaRegistry::register_supertype`] (or
//! [`SchemaRegistry::define_subtype`]) until a schema is found. Running out of
//! supertypes is not an error: the caller serializes the raw attribute set.
//!
//! [`Schema`]: crate::schema::Schema

// -----------------------------------------------------------------------------
// Modules

#[cfg(feature = "auto_register")]
mod auto_register;
mod schema_registry;
mod sequence_schema;

// -----------------------------------------------------------------------------
// Exports

#[cfg(feature = "auto_register")]
pub use auto_register::SchemaRegistration;
pub use schema_registry::SchemaRegistry;
pub use sequence_schema::SequenceSchema;
