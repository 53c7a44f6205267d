use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Protobuf parse error: {0}")]
    ProtobufParse(String),

    #[error("Message type not found: {name}. Available: [{}]", .available.join(", "))]
    MessageTypeNotFound {
        name: String,
        available: Vec<String>,
    },

    #[error("Message type name '{name}' is ambiguous, candidates: [{}]", .candidates.join(", "))]
    AmbiguousTypeName {
        name: String,
        candidates: Vec<String>,
    },

    #[error("Unsupported field type: {0}")]
    UnsupportedFieldType(String),
}

pub type Result<T> = std::result::Result<T, Error>;
