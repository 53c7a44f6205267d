//! Schema descriptors for protome.
//!
//! Features:
//!
//! - Runtime `.proto` compilation: parse `.proto` files with `protobuf-parse`,
//!   no code generation step
//! - Explicit descriptor data: messages, fields, enums and oneof groups as plain
//!   structs that downstream code can walk without reflection
//! - Name resolution: look up message types by fully-qualified or short name

pub mod error;
pub mod parser;
pub mod types;

pub use error::{Error, Result};
pub use types::{
    short_name, to_json_name, Cardinality, EnumDescriptor, EnumValue, FieldDescriptor, FieldKind,
    MessageDescriptor, Schema, MAP_KEY_FIELD, MAP_VALUE_FIELD,
};
