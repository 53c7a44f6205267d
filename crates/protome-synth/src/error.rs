//! Error types for protome-synth.

use thiserror::Error;

/// Errors raised while synthesizing, reading or encoding a message.
///
/// The `Unresolved*` and `EmptyEnum` variants mean the descriptor tree is
/// internally inconsistent; synthesis of the whole instance is aborted.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Schema(#[from] protome_schema::Error),

    #[error("Field '{field}' of {message} references message type '{type_name}' which is not in the schema")]
    UnresolvedMessageType {
        message: String,
        field: String,
        type_name: String,
    },

    #[error("Field '{field}' of {message} references enum type '{type_name}' which is not in the schema")]
    UnresolvedEnumType {
        message: String,
        field: String,
        type_name: String,
    },

    #[error("Field '{field}' of {message} references enum '{type_name}' which declares no values")]
    EmptyEnum {
        message: String,
        field: String,
        type_name: String,
    },

    #[error("Invalid JSON at {path}: {message}")]
    JsonShape { path: String, message: String },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Protobuf encoding error: {0}")]
    ProtobufEncode(String),

    #[error("Payload of {0} bytes does not fit in a gRPC frame")]
    FrameTooLarge(usize),
}

pub type Result<T> = std::result::Result<T, Error>;
