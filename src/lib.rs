//! protome library
//!
//! Generates a deterministic sample instance of any message type defined in a
//! `.proto` schema and renders it as canonical JSON or protobuf bytes.
//!
//! # Crates
//!
//! - `protome_schema` - `.proto` compilation into explicit descriptors
//! - `protome_synth` - sample synthesis, JSON emission, wire encoding
//!
//! # CLI Usage
//!
//! ```bash
//! # Print a sample of shop.v1.Order as JSON
//! protome protos/shop.proto Order
//!
//! # Encode a hand-written payload as a gRPC-framed hex string
//! protome protos/shop.proto shop.v1.Order --from-json order.json --format hex --grpc
//! ```

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

pub mod driver;

pub use protome_schema as schema;
pub use protome_synth as synth;

/// Output rendering.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Pretty-printed canonical JSON
    Json,
    /// Single-line canonical JSON
    Compact,
    /// Raw protobuf bytes
    Binary,
    /// Protobuf bytes as lowercase hex
    Hex,
}

impl OutputFormat {
    pub fn is_wire(self) -> bool {
        matches!(self, OutputFormat::Binary | OutputFormat::Hex)
    }
}

#[derive(Parser, Clone, Debug)]
pub struct RenderOpts {
    /// Output format
    #[arg(long, value_enum, default_value = "json", env = "PROTOME_FORMAT")]
    pub format: OutputFormat,

    /// Prefix binary/hex output with the 5-byte gRPC message header
    #[arg(long)]
    pub grpc: bool,

    /// Write output to this file instead of stdout
    #[arg(long, short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(Parser, Clone, Debug)]
#[command(name = "protome")]
#[command(about = "Generate a sample payload for a protobuf message type")]
#[command(long_about = None)]
pub struct Cli {
    /// Path to the .proto file
    pub proto_file: PathBuf,

    /// Message type name (fully qualified, or short if unambiguous)
    pub message_type: String,

    /// Additional import directories (the proto file's directory is always searched)
    #[arg(
        long = "include",
        short = 'I',
        value_name = "DIR",
        value_delimiter = ',',
        env = "PROTOME_INCLUDE"
    )]
    pub includes: Vec<PathBuf>,

    /// Encode this JSON payload instead of a synthesized sample
    #[arg(long, value_name = "FILE")]
    pub from_json: Option<PathBuf>,

    #[command(flatten)]
    pub render: RenderOpts,
}
