use clap::Parser;
use protobuf::CodedInputStream;
use protome::driver;
use protome::{Cli, OutputFormat};
use serde_json::json;
use std::path::PathBuf;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn cli(args: &[&str]) -> Cli {
    let proto = fixture("shop.proto");
    let mut argv = vec!["protome", proto.to_str().unwrap()];
    argv.extend_from_slice(args);
    Cli::try_parse_from(argv).expect("arguments should parse")
}

#[test]
fn test_cli_defaults() {
    let cli = cli(&["Order"]);

    assert_eq!(cli.message_type, "Order");
    assert_eq!(cli.render.format, OutputFormat::Json);
    assert!(!cli.render.grpc);
    assert!(cli.render.output.is_none());
    assert!(cli.from_json.is_none());
}

#[test]
fn test_cli_requires_message_type() {
    assert!(Cli::try_parse_from(["protome", "shop.proto"]).is_err());
}

#[test]
fn test_cli_options() {
    let cli = cli(&[
        "shop.v1.Order",
        "--format",
        "hex",
        "--grpc",
        "-I",
        "a,b",
        "-o",
        "out.hex",
    ]);

    assert_eq!(cli.render.format, OutputFormat::Hex);
    assert!(cli.render.grpc);
    assert_eq!(cli.includes, vec![PathBuf::from("a"), PathBuf::from("b")]);
    assert_eq!(cli.render.output, Some(PathBuf::from("out.hex")));
}

#[test]
fn test_run_writes_order_sample() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("order.json");

    driver::run(cli(&["Order", "-o", output.to_str().unwrap()])).unwrap();

    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(
        written,
        json!({
            "order_id": "12345",
            "customer": {"name": "name_value", "verified": true},
            "lines": [{
                "sku": "sku_value",
                "quantity": 12345,
                "price": {"currency": "currency_value", "units": "12345", "nanos": 12345}
            }],
            "status": 1,
            "tags": ["sample_string"],
            "discount": 12.34,
            "pickup_store": "pickup_store_value"
        })
    );
}

#[test]
fn test_run_unknown_type_lists_available() {
    let err = driver::run(cli(&["Invoice"])).unwrap_err();
    let text = format!("{err:#}");

    assert!(text.contains("Message type not found: Invoice"));
    assert!(text.contains("shop.v1.Order"));
    assert!(text.contains("shop.v1.Customer"));
    assert!(text.contains("common.Money"));
}

#[test]
fn test_run_encodes_json_payload_with_grpc_frame() {
    let dir = tempfile::tempdir().unwrap();
    let payload = dir.path().join("customer.json");
    let output = dir.path().join("customer.bin");
    std::fs::write(
        &payload,
        r#"{"name": "Ada", "verified": true, "unknownKey": 1}"#,
    )
    .unwrap();

    driver::run(cli(&[
        "Customer",
        "--from-json",
        payload.to_str().unwrap(),
        "--format",
        "binary",
        "--grpc",
        "-o",
        output.to_str().unwrap(),
    ]))
    .unwrap();

    let framed = std::fs::read(&output).unwrap();
    assert_eq!(framed[0], 0);
    let len = u32::from_be_bytes([framed[1], framed[2], framed[3], framed[4]]) as usize;
    assert_eq!(len, framed.len() - 5);

    let mut stream = CodedInputStream::from_bytes(&framed[5..]);
    assert_eq!(stream.read_raw_varint32().unwrap(), (1 << 3) | 2);
    assert_eq!(stream.read_string().unwrap(), "Ada");
    assert_eq!(stream.read_raw_varint32().unwrap(), 2 << 3);
    assert!(stream.read_bool().unwrap());
    assert!(stream.eof().unwrap());
}

#[test]
fn test_run_hex_output() {
    let dir = tempfile::tempdir().unwrap();
    let payload = dir.path().join("money.json");
    let output = dir.path().join("money.hex");
    std::fs::write(&payload, r#"{"units": "1"}"#).unwrap();

    driver::run(cli(&[
        "common.Money",
        "--from-json",
        payload.to_str().unwrap(),
        "--format",
        "hex",
        "-o",
        output.to_str().unwrap(),
    ]))
    .unwrap();

    assert_eq!(std::fs::read_to_string(&output).unwrap(), "1001\n");
}

#[test]
fn test_run_missing_proto_file() {
    let cli = Cli::try_parse_from(["protome", "/no/such/dir/missing.proto", "Order"]).unwrap();
    let err = driver::run(cli).unwrap_err();
    assert!(err.to_string().contains("not found"));
}
