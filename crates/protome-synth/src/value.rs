//! Populated message instances.
//!
//! A [`SampleMessage`] mirrors one message descriptor: it records which fields
//! hold a value, in the order they were set. Unset fields are simply absent.

use protome_schema::FieldDescriptor;

/// A single field value.
#[derive(Debug, Clone, PartialEq)]
pub enum SampleValue {
    Bool(bool),
    Int32(i32),
    Int64(i64),
    Uint32(u32),
    Uint64(u64),
    Float(f32),
    Double(f64),
    String(String),
    Bytes(Vec<u8>),
    /// Integer code of an enum value
    Enum(i32),
    Message(Box<SampleMessage>),
    Repeated(Vec<SampleValue>),
    /// Entries of a `map<K, V>` field as (key, value) pairs, in insertion order
    Map(Vec<(SampleValue, SampleValue)>),
}

impl SampleValue {
    pub fn kind_name(&self) -> &'static str {
        match self {
            SampleValue::Bool(_) => "bool",
            SampleValue::Int32(_) => "int32",
            SampleValue::Int64(_) => "int64",
            SampleValue::Uint32(_) => "uint32",
            SampleValue::Uint64(_) => "uint64",
            SampleValue::Float(_) => "float",
            SampleValue::Double(_) => "double",
            SampleValue::String(_) => "string",
            SampleValue::Bytes(_) => "bytes",
            SampleValue::Enum(_) => "enum",
            SampleValue::Message(_) => "message",
            SampleValue::Repeated(_) => "repeated",
            SampleValue::Map(_) => "map",
        }
    }
}

/// A value bound to a field of the owning message.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleField {
    pub name: String,
    pub number: u32,
    pub value: SampleValue,
}

/// A populated instance of a message type.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SampleMessage {
    /// Fully qualified message type name
    pub type_name: String,
    fields: Vec<SampleField>,
}

impl SampleMessage {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: Vec::new(),
        }
    }

    /// Set a singular field, replacing any previous value.
    pub fn set(&mut self, field: &FieldDescriptor, value: SampleValue) {
        match self.fields.iter_mut().find(|f| f.number == field.number) {
            Some(existing) => existing.value = value,
            None => self.fields.push(SampleField {
                name: field.name.clone(),
                number: field.number,
                value,
            }),
        }
    }

    /// Append one element to a repeated field, creating the list on first use.
    pub fn push_repeated(&mut self, field: &FieldDescriptor, value: SampleValue) {
        match self.fields.iter_mut().find(|f| f.number == field.number) {
            Some(SampleField {
                value: SampleValue::Repeated(items),
                ..
            }) => items.push(value),
            Some(existing) => existing.value = SampleValue::Repeated(vec![value]),
            None => self.fields.push(SampleField {
                name: field.name.clone(),
                number: field.number,
                value: SampleValue::Repeated(vec![value]),
            }),
        }
    }

    /// Insert one entry into a map field. An existing entry with an equal key
    /// is replaced in place.
    pub fn insert_map_entry(
        &mut self,
        field: &FieldDescriptor,
        key: SampleValue,
        value: SampleValue,
    ) {
        match self.fields.iter_mut().find(|f| f.number == field.number) {
            Some(SampleField {
                value: SampleValue::Map(entries),
                ..
            }) => match entries.iter_mut().find(|(k, _)| *k == key) {
                Some(entry) => entry.1 = value,
                None => entries.push((key, value)),
            },
            Some(existing) => existing.value = SampleValue::Map(vec![(key, value)]),
            None => self.fields.push(SampleField {
                name: field.name.clone(),
                number: field.number,
                value: SampleValue::Map(vec![(key, value)]),
            }),
        }
    }

    pub fn get(&self, name: &str) -> Option<&SampleValue> {
        self.fields.iter().find(|f| f.name == name).map(|f| &f.value)
    }

    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Set fields in the order they were populated.
    pub fn fields(&self) -> &[SampleField] {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
