//! Deterministic sample synthesis for protobuf message types.
//!
//! # Architecture
//!
//! ```text
//! Schema ──► Synthesizer::synthesize ──► SampleMessage ──┬──► emit (canonical JSON)
//!                                                        └──► wire (protobuf bytes, gRPC frame)
//! JSON payload ──► json::from_json ──► SampleMessage ────┘
//! ```
//!
//! # Modules
//!
//! - [`synthesizer`] - recursive, cycle-safe population of a message instance
//! - [`policy`] - the fixed kind → placeholder table
//! - [`value`] - populated instance model
//! - [`emit`] - canonical JSON rendering
//! - [`json`] - JSON payload reader
//! - [`wire`] - protobuf binary encoder and gRPC framing
//!
//! # Example
//!
//! ```ignore
//! use protome_schema::Schema;
//! use protome_synth::{emit, Synthesizer};
//!
//! let schema = Schema::from_file("user.proto")?;
//! let sample = Synthesizer::new(&schema).synthesize("User")?;
//! println!("{}", emit::to_canonical_string(&sample)?);
//! ```

pub mod emit;
pub mod error;
pub mod json;
pub mod policy;
pub mod synthesizer;
pub mod value;
pub mod wire;

pub use error::{Error, Result};
pub use policy::Policy;
pub use synthesizer::{Synthesizer, VisitedPath};
pub use value::{SampleField, SampleMessage, SampleValue};
