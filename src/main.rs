//! Command-line interface for protome
//!
//! # Usage Examples
//!
//! ```bash
//! # Sample of a message as pretty JSON
//! protome protos/user.proto User
//!
//! # Same sample, protobuf-encoded and written to a file
//! protome protos/user.proto User --format binary -o user.bin
//!
//! # Encode your own payload, gRPC-framed, as hex
//! protome protos/user.proto User --from-json user.json --format hex --grpc
//!
//! # Extra import roots
//! protome -I third_party,vendor/protos protos/api.proto api.v1.Request
//! ```
//!
//! Set `RUST_LOG=debug` to see type registration and skipped fields on stderr.

use clap::Parser;
use protome::driver;
use protome::Cli;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    // Initialize tracing; stdout is reserved for the rendered output
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    driver::run(cli)
}
