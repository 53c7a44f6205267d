//! Explicit descriptor data for messages, fields and enums.
//!
//! These types are plain data: they are produced once by the parser (or built
//! by hand in tests) and never mutated while a sample is being synthesized.

use crate::error::{Error, Result};
use std::collections::BTreeMap;

/// Protobuf field kinds.
///
/// `Message` and `Enum` carry the fully-qualified name of the referenced type
/// without the leading dot (e.g. `"shop.v1.Order"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Double,
    Float,
    Int32,
    Int64,
    Uint32,
    Uint64,
    Sint32,
    Sint64,
    Fixed32,
    Fixed64,
    Sfixed32,
    Sfixed64,
    Bool,
    String,
    Bytes,
    Message(String),
    Enum(String),
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.type_name())
    }
}

impl FieldKind {
    pub fn type_name(&self) -> String {
        match self {
            FieldKind::Double => "double".to_string(),
            FieldKind::Float => "float".to_string(),
            FieldKind::Int32 => "int32".to_string(),
            FieldKind::Int64 => "int64".to_string(),
            FieldKind::Uint32 => "uint32".to_string(),
            FieldKind::Uint64 => "uint64".to_string(),
            FieldKind::Sint32 => "sint32".to_string(),
            FieldKind::Sint64 => "sint64".to_string(),
            FieldKind::Fixed32 => "fixed32".to_string(),
            FieldKind::Fixed64 => "fixed64".to_string(),
            FieldKind::Sfixed32 => "sfixed32".to_string(),
            FieldKind::Sfixed64 => "sfixed64".to_string(),
            FieldKind::Bool => "bool".to_string(),
            FieldKind::String => "string".to_string(),
            FieldKind::Bytes => "bytes".to_string(),
            FieldKind::Message(name) => format!("message:{name}"),
            FieldKind::Enum(name) => format!("enum:{name}"),
        }
    }

    /// The referenced type name for message and enum fields.
    pub fn referenced_type(&self) -> Option<&str> {
        match self {
            FieldKind::Message(name) | FieldKind::Enum(name) => Some(name),
            _ => None,
        }
    }

    /// Whether a repeated field of this kind uses packed encoding in proto3.
    pub fn is_packable(&self) -> bool {
        !matches!(
            self,
            FieldKind::String | FieldKind::Bytes | FieldKind::Message(_)
        )
    }
}

/// Whether a field holds one value or an ordered sequence of values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cardinality {
    Singular,
    Repeated,
}

/// Describes a single field in a message.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    /// Field name as written in the schema
    pub name: String,
    /// lowerCamelCase name used by the proto3 JSON mapping
    pub json_name: String,
    /// Field number (tag)
    pub number: u32,
    pub kind: FieldKind,
    pub cardinality: Cardinality,
    /// Name of the oneof this field belongs to, if any
    pub oneof_group: Option<String>,
}

impl FieldDescriptor {
    pub fn singular(name: impl Into<String>, number: u32, kind: FieldKind) -> Self {
        Self::new(name.into(), number, kind, Cardinality::Singular)
    }

    pub fn repeated(name: impl Into<String>, number: u32, kind: FieldKind) -> Self {
        Self::new(name.into(), number, kind, Cardinality::Repeated)
    }

    fn new(name: String, number: u32, kind: FieldKind, cardinality: Cardinality) -> Self {
        Self {
            json_name: to_json_name(&name),
            name,
            number,
            kind,
            cardinality,
            oneof_group: None,
        }
    }

    /// Place the field into a oneof group.
    pub fn in_oneof(mut self, group: impl Into<String>) -> Self {
        self.oneof_group = Some(group.into());
        self
    }

    pub fn is_repeated(&self) -> bool {
        self.cardinality == Cardinality::Repeated
    }
}

pub const MAP_KEY_FIELD: &str = "key";
pub const MAP_VALUE_FIELD: &str = "value";

/// Describes a protobuf message type.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageDescriptor {
    /// Fully qualified message name (e.g., "mypackage.MyMessage")
    pub full_name: String,
    /// Last segment of the full name
    pub name: String,
    /// Fields in declaration order
    pub fields: Vec<FieldDescriptor>,
    /// Synthetic `*Entry` type backing a `map<K, V>` field
    pub is_map_entry: bool,
}

impl MessageDescriptor {
    pub fn new(full_name: impl Into<String>) -> Self {
        let full_name = full_name.into();
        Self {
            name: short_name(&full_name).to_string(),
            full_name,
            fields: Vec::new(),
            is_map_entry: false,
        }
    }

    pub fn with_field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    pub fn as_map_entry(mut self) -> Self {
        self.is_map_entry = true;
        self
    }

    /// The `key` and `value` fields of a map entry type.
    pub fn map_entry_fields(&self) -> Option<(&FieldDescriptor, &FieldDescriptor)> {
        if !self.is_map_entry {
            return None;
        }
        Some((self.get_field(MAP_KEY_FIELD)?, self.get_field(MAP_VALUE_FIELD)?))
    }

    /// Get a field descriptor by its schema name.
    pub fn get_field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Get a field descriptor by schema name or by proto3 JSON name.
    pub fn get_field_by_json_key(&self, key: &str) -> Option<&FieldDescriptor> {
        self.get_field(key)
            .or_else(|| self.fields.iter().find(|f| f.json_name == key))
    }

    /// List all field names in declaration order.
    pub fn list_fields(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }
}

/// A symbolic name and integer code declared in an enum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValue {
    pub name: String,
    pub number: i32,
}

/// Describes a protobuf enum type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDescriptor {
    pub full_name: String,
    /// Values in declaration order
    pub values: Vec<EnumValue>,
}

impl EnumDescriptor {
    pub fn new(full_name: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            values: Vec::new(),
        }
    }

    pub fn with_value(mut self, name: impl Into<String>, number: i32) -> Self {
        self.values.push(EnumValue {
            name: name.into(),
            number,
        });
        self
    }

    pub fn value_by_name(&self, name: &str) -> Option<&EnumValue> {
        self.values.iter().find(|v| v.name == name)
    }
}

/// Every message and enum type of a compiled schema.
///
/// Types are keyed by fully-qualified name. Messages can also be looked up by
/// their short name as long as no two messages share it.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    messages: BTreeMap<String, MessageDescriptor>,
    enums: BTreeMap<String, EnumDescriptor>,
    short_names: BTreeMap<String, Vec<String>>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_message(&mut self, message: MessageDescriptor) {
        let candidates = self.short_names.entry(message.name.clone()).or_default();
        if !candidates.contains(&message.full_name) {
            candidates.push(message.full_name.clone());
        }
        self.messages.insert(message.full_name.clone(), message);
    }

    pub fn add_enum(&mut self, descriptor: EnumDescriptor) {
        self.enums.insert(descriptor.full_name.clone(), descriptor);
    }

    pub fn with_message(mut self, message: MessageDescriptor) -> Self {
        self.add_message(message);
        self
    }

    pub fn with_enum(mut self, descriptor: EnumDescriptor) -> Self {
        self.add_enum(descriptor);
        self
    }

    /// Resolve a user-supplied message type name.
    ///
    /// Tries the fully-qualified name first, then the short name.
    pub fn get_message(&self, name: &str) -> Result<&MessageDescriptor> {
        if let Some(message) = self.message(name) {
            return Ok(message);
        }

        match self.short_names.get(name).map(Vec::as_slice) {
            Some([full_name]) => self.message(full_name).ok_or_else(|| self.not_found(name)),
            Some(candidates) if candidates.len() > 1 => Err(Error::AmbiguousTypeName {
                name: name.to_string(),
                candidates: candidates.to_vec(),
            }),
            _ => Err(self.not_found(name)),
        }
    }

    /// Look up a message by its fully-qualified name. A leading dot is ignored.
    pub fn message(&self, full_name: &str) -> Option<&MessageDescriptor> {
        self.messages.get(full_name.trim_start_matches('.'))
    }

    /// Look up an enum by its fully-qualified name. A leading dot is ignored.
    pub fn get_enum(&self, full_name: &str) -> Option<&EnumDescriptor> {
        self.enums.get(full_name.trim_start_matches('.'))
    }

    /// List all message type names in the schema, sorted.
    pub fn list_messages(&self) -> Vec<String> {
        self.messages.keys().cloned().collect()
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    pub fn enum_count(&self) -> usize {
        self.enums.len()
    }

    fn not_found(&self, name: &str) -> Error {
        Error::MessageTypeNotFound {
            name: name.to_string(),
            available: self.list_messages(),
        }
    }
}

/// Last dot-separated segment of a type name.
pub fn short_name(full_name: &str) -> &str {
    full_name.rsplit('.').next().unwrap_or(full_name)
}

/// Derive the proto3 JSON name: underscores are dropped and the following
/// letter is upper-cased.
pub fn to_json_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;
    for c in name.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}
