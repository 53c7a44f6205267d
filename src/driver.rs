//! Resolve, synthesize (or read), render and write.

use crate::{Cli, OutputFormat, RenderOpts};
use anyhow::Context;
use protome_schema::Schema;
use protome_synth::{emit, json, wire, SampleMessage, Synthesizer};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Run one CLI invocation end to end.
pub fn run(cli: Cli) -> anyhow::Result<()> {
    tracing::info!("Loading schema from {:?}", cli.proto_file);
    let schema = load_schema(&cli.proto_file, &cli.includes)?;

    let message = match &cli.from_json {
        Some(path) => read_payload(&schema, &cli.message_type, path)?,
        None => synthesize(&schema, &cli.message_type)?,
    };

    let rendered = render(&schema, &message, &cli.render)?;
    write_output(&rendered, cli.render.output.as_deref())?;

    tracing::info!("Rendered {} as {:?}", message.type_name, cli.render.format);
    Ok(())
}

pub fn load_schema(proto_file: &Path, includes: &[PathBuf]) -> anyhow::Result<Schema> {
    if !proto_file.exists() {
        anyhow::bail!("File {} not found", proto_file.display());
    }

    let schema = Schema::from_file_with_includes(proto_file, includes)
        .with_context(|| format!("Failed to compile {}", proto_file.display()))?;
    tracing::info!("Total message types loaded: {}", schema.message_count());
    Ok(schema)
}

/// Build a sample of `message_type`. The root type is on the visited path from
/// the start, so self-referencing roots are guarded too.
pub fn synthesize(schema: &Schema, message_type: &str) -> anyhow::Result<SampleMessage> {
    let sample = Synthesizer::new(schema)
        .synthesize(message_type)
        .with_context(|| format!("Failed to synthesize a sample of '{message_type}'"))?;
    tracing::info!("Synthesized sample of {}", sample.type_name);
    Ok(sample)
}

/// Read a user-supplied JSON payload for `message_type`.
pub fn read_payload(
    schema: &Schema,
    message_type: &str,
    path: &Path,
) -> anyhow::Result<SampleMessage> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read JSON payload {}", path.display()))?;
    json::from_json_str(schema, message_type, &text)
        .with_context(|| format!("Failed to convert {} to '{message_type}'", path.display()))
}

/// Render `message` in the requested format.
pub fn render(
    schema: &Schema,
    message: &SampleMessage,
    opts: &RenderOpts,
) -> anyhow::Result<Vec<u8>> {
    if opts.grpc && !opts.format.is_wire() {
        tracing::warn!("--grpc only applies to binary and hex output, ignoring it");
    }

    let text = match opts.format {
        OutputFormat::Json => emit::to_canonical_string(message)?,
        OutputFormat::Compact => emit::to_compact_string(message)?,
        OutputFormat::Binary | OutputFormat::Hex => {
            let mut bytes = wire::encode(schema, message)
                .with_context(|| format!("Failed to encode {}", message.type_name))?;
            tracing::info!("Converted '{}'. Raw size: {} bytes", message.type_name, bytes.len());

            if bytes.is_empty() {
                tracing::warn!(
                    "Encoded {} is empty (0 bytes). Check that JSON keys match the .proto field names",
                    message.type_name
                );
            }

            if opts.grpc {
                bytes = wire::grpc_frame(&bytes)?;
                tracing::info!("Applied gRPC framing. New size: {} bytes", bytes.len());
            }

            if opts.format == OutputFormat::Binary {
                return Ok(bytes);
            }
            to_hex(&bytes)
        }
    };

    let mut out = text.into_bytes();
    out.push(b'\n');
    Ok(out)
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

pub fn write_output(bytes: &[u8], output: Option<&Path>) -> anyhow::Result<()> {
    match output {
        Some(path) => std::fs::write(path, bytes)
            .with_context(|| format!("Failed to write output to {}", path.display())),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(bytes).context("Failed to write to stdout")?;
            stdout.flush().context("Failed to flush stdout")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_hex() {
        assert_eq!(to_hex(&[0x00, 0x0f, 0xab]), "000fab");
        assert_eq!(to_hex(&[]), "");
    }

    #[test]
    fn test_missing_proto_file() {
        let err = load_schema(Path::new("/no/such/file.proto"), &[]).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
