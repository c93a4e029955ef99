#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

pub use vista_serializer as serializer;
pub use vista_utils as utils;

pub use vista_serializer::{
    Adapter, AdapterKind, Associated, DefinitionError, Model, Options, Schema, SchemaRegistry,
    SerializeError, Serializer, SerializerConfig, Target, serialize,
};
