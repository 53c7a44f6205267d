//! `.proto` compilation into [`Schema`].
//!
//! Parsing is delegated to `protobuf_parse`; this module only flattens the
//! resulting `FileDescriptorProto`s into explicit descriptor data.

use crate::error::{Error, Result};
use crate::types::{
    to_json_name, Cardinality, EnumDescriptor, FieldDescriptor, FieldKind, MessageDescriptor,
    Schema,
};
use protobuf::descriptor::field_descriptor_proto::{Label, Type};
use protobuf::descriptor::{DescriptorProto, EnumDescriptorProto, FieldDescriptorProto};
use protobuf_parse::Parser;
use std::path::{Path, PathBuf};

impl Schema {
    /// Parse a .proto file and create a schema.
    ///
    /// The file's parent directory is used as the import root.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_file_with_includes(path, &[])
    }

    /// Parse a .proto file, resolving imports against the file's parent
    /// directory followed by `includes`.
    pub fn from_file_with_includes<P: AsRef<Path>>(path: P, includes: &[PathBuf]) -> Result<Self> {
        let p = path.as_ref();
        if !p.is_file() {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("proto file {} not found", p.display()),
            )));
        }

        let mut parser = Parser::new();
        parser.input(p);
        match p.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parser.include(parent),
            _ => parser.include("."),
        };
        for dir in includes {
            parser.include(dir);
        }

        let parsed = parser
            .parse_and_typecheck()
            .map_err(|e| Error::ProtobufParse(format!("{e:#}")))?;

        let mut schema = Schema::new();
        for file_descriptor in &parsed.file_descriptors {
            let package = file_descriptor.package.clone().unwrap_or_default();
            tracing::debug!(
                "Registering types from {}",
                file_descriptor.name.as_deref().unwrap_or("<unnamed>")
            );

            for message in &file_descriptor.message_type {
                register_message(&mut schema, &package, message)?;
            }
            for enum_type in &file_descriptor.enum_type {
                register_enum(&mut schema, &package, enum_type);
            }
        }

        tracing::debug!(
            "Loaded {} message types and {} enum types",
            schema.message_count(),
            schema.enum_count()
        );
        Ok(schema)
    }

    /// Parse a .proto file content from string
    pub fn from_string(content: &str) -> Result<Self> {
        let temp_dir = tempfile::tempdir()
            .map_err(|e| Error::ProtobufParse(format!("Failed to create temp dir: {e}")))?;
        let temp_path = temp_dir.path().join("schema.proto");
        std::fs::write(&temp_path, content)
            .map_err(|e| Error::ProtobufParse(format!("Failed to write temp file: {e}")))?;

        Self::from_file(&temp_path)
    }
}

fn qualify(scope: &str, name: &str) -> String {
    if scope.is_empty() {
        name.to_string()
    } else {
        format!("{scope}.{name}")
    }
}

fn register_message(schema: &mut Schema, scope: &str, message: &DescriptorProto) -> Result<()> {
    let full_name = qualify(scope, message.name.as_deref().unwrap_or_default());

    // proto3 `optional` fields sit in a synthetic oneof of their own
    let oneof_names: Vec<Option<String>> = message
        .oneof_decl
        .iter()
        .enumerate()
        .map(|(index, decl)| {
            let synthetic = message.field.iter().any(|f| {
                f.oneof_index == Some(index as i32) && f.proto3_optional.unwrap_or(false)
            });
            if synthetic {
                None
            } else {
                decl.name.clone()
            }
        })
        .collect();

    let mut descriptor = MessageDescriptor::new(full_name.clone());
    descriptor.is_map_entry = message
        .options
        .as_ref()
        .and_then(|options| options.map_entry)
        .unwrap_or(false);
    for field in &message.field {
        let field_name = field.name.clone().unwrap_or_default();
        if field_name.is_empty() {
            continue;
        }

        let number = u32::try_from(field.number.unwrap_or(0)).map_err(|_| {
            Error::ProtobufParse(format!("Invalid field number for {full_name}.{field_name}"))
        })?;

        let oneof_group = field
            .oneof_index
            .and_then(|index| usize::try_from(index).ok())
            .and_then(|index| oneof_names.get(index).cloned().flatten());

        descriptor.fields.push(FieldDescriptor {
            json_name: field
                .json_name
                .clone()
                .unwrap_or_else(|| to_json_name(&field_name)),
            number,
            kind: parse_field_kind(field)?,
            cardinality: if field.label == Some(Label::LABEL_REPEATED.into()) {
                Cardinality::Repeated
            } else {
                Cardinality::Singular
            },
            oneof_group,
            name: field_name,
        });
    }

    tracing::debug!("Registered message {full_name}");
    schema.add_message(descriptor);

    for nested in &message.nested_type {
        register_message(schema, &full_name, nested)?;
    }
    for enum_type in &message.enum_type {
        register_enum(schema, &full_name, enum_type);
    }
    Ok(())
}

fn register_enum(schema: &mut Schema, scope: &str, enum_type: &EnumDescriptorProto) {
    let full_name = qualify(scope, enum_type.name.as_deref().unwrap_or_default());
    let descriptor = enum_type
        .value
        .iter()
        .fold(EnumDescriptor::new(full_name), |acc, value| {
            acc.with_value(
                value.name.clone().unwrap_or_default(),
                value.number.unwrap_or(0),
            )
        });
    tracing::debug!("Registered enum {}", descriptor.full_name);
    schema.add_enum(descriptor);
}

fn parse_field_kind(field: &FieldDescriptorProto) -> Result<FieldKind> {
    let field_type_enum_or_unknown = field
        .type_
        .ok_or_else(|| Error::ProtobufParse("Field missing type".to_string()))?;

    // Referenced names come back fully qualified with a leading dot
    let referenced = || {
        field
            .type_name
            .as_deref()
            .unwrap_or_default()
            .trim_start_matches('.')
            .to_string()
    };

    Ok(match field_type_enum_or_unknown.enum_value_or_default() {
        Type::TYPE_DOUBLE => FieldKind::Double,
        Type::TYPE_FLOAT => FieldKind::Float,
        Type::TYPE_INT64 => FieldKind::Int64,
        Type::TYPE_UINT64 => FieldKind::Uint64,
        Type::TYPE_INT32 => FieldKind::Int32,
        Type::TYPE_FIXED64 => FieldKind::Fixed64,
        Type::TYPE_FIXED32 => FieldKind::Fixed32,
        Type::TYPE_BOOL => FieldKind::Bool,
        Type::TYPE_STRING => FieldKind::String,
        Type::TYPE_MESSAGE => FieldKind::Message(referenced()),
        Type::TYPE_BYTES => FieldKind::Bytes,
        Type::TYPE_UINT32 => FieldKind::Uint32,
        Type::TYPE_ENUM => FieldKind::Enum(referenced()),
        Type::TYPE_SFIXED32 => FieldKind::Sfixed32,
        Type::TYPE_SFIXED64 => FieldKind::Sfixed64,
        Type::TYPE_SINT32 => FieldKind::Sint32,
        Type::TYPE_SINT64 => FieldKind::Sint64,
        Type::TYPE_GROUP => {
            return Err(Error::UnsupportedFieldType(
                "TYPE_GROUP is Proto2 syntax only and deprecated hence not supported".to_string(),
            ))
        }
    })
}
