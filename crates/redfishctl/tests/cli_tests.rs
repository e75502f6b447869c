//! CLI tests for redfishctl
//!
//! Commands run against an in-memory transport:
//! - redfishctl sensors URI            text blocks, failures on stderr
//! - redfishctl sensors URI --json     source documents + failure list
//! - redfishctl get URI                one sensor
//! - redfishctl config                 effective TOML

use clap::Parser;
use serde_json::json;

use redfish_common::{FakeTransport, RedfishConfig, SensorKind};
use redfishctl::cli::{Cli, Commands};
use redfishctl::commands::{self, Outcome, SensorsOptions};

const COLLECTION: &str = "/redfish/v1/Chassis/1/Sensors";

fn transport() -> FakeTransport {
    FakeTransport::new()
        .with_json(
            COLLECTION,
            &json!({
                "Members": [
                    {"@odata.id": "/redfish/v1/Chassis/1/Sensors/fan0"},
                    {"@odata.id": "/redfish/v1/Chassis/1/Sensors/fan1"},
                    {"@odata.id": "/redfish/v1/Chassis/1/Sensors/fan2"}
                ],
                "Members@odata.count": 3
            }),
        )
        .with_json(
            "/redfish/v1/Chassis/1/Sensors/fan0",
            &json!({"Id": "fan0", "Name": "Front", "Fans": [{"FanName": "F0", "Reading": 4100, "ReadingUnits": "RPM"}]}),
        )
        .with_status("/redfish/v1/Chassis/1/Sensors/fan1", 500)
        .with_json(
            "/redfish/v1/Chassis/1/Sensors/fan2",
            &json!({"Id": "fan2", "Name": "Rear", "Fans": [{"FanName": "F2", "Reading": 3900, "ReadingUnits": "RPM"}]}),
        )
}

fn options(uri: &str, json: bool) -> SensorsOptions {
    SensorsOptions {
        uri: uri.to_string(),
        kind: SensorKind::Fans,
        concurrency: 1,
        json,
    }
}

fn run_sensors(transport: &FakeTransport, options: &SensorsOptions) -> (Outcome, String, String) {
    let mut out = Vec::new();
    let mut err = Vec::new();
    let outcome = commands::sensors(transport, options, &mut out, &mut err).unwrap();
    (
        outcome,
        String::from_utf8(out).unwrap(),
        String::from_utf8(err).unwrap(),
    )
}

#[test]
fn test_parse_sensors_command() {
    let cli = Cli::try_parse_from([
        "redfishctl",
        "--endpoint",
        "https://10.0.0.9",
        "sensors",
        COLLECTION,
        "--kind",
        "channels",
        "--concurrency",
        "4",
    ])
    .unwrap();

    assert_eq!(cli.endpoint.as_deref(), Some("https://10.0.0.9"));
    match cli.command {
        Commands::Sensors {
            uri,
            kind,
            concurrency,
            json,
        } => {
            assert_eq!(uri, COLLECTION);
            assert_eq!(kind, SensorKind::Channels);
            assert_eq!(concurrency, Some(4));
            assert!(!json);
        }
        other => panic!("unexpected command: {:?}", other),
    }
}

#[test]
fn test_parse_rejects_unknown_kind() {
    let result = Cli::try_parse_from(["redfishctl", "get", "/x", "--kind", "thermal"]);
    assert!(result.is_err());
}

#[test]
fn test_sensors_partial_text() {
    let transport = transport();
    let (outcome, out, err) = run_sensors(&transport, &options(COLLECTION, false));

    assert_eq!(outcome, Outcome::Partial);
    assert_eq!(outcome.exit_code(), 1);

    let front = out.find("fan0  Front").unwrap();
    let rear = out.find("fan2  Rear").unwrap();
    assert!(front < rear);
    assert!(out.contains("4100 RPM"));

    assert!(err.contains("1 member(s) could not be retrieved"));
    assert!(err.contains("/redfish/v1/Chassis/1/Sensors/fan1: HTTP 500"));
}

#[test]
fn test_sensors_partial_json() {
    let transport = transport();
    let (outcome, out, _) = run_sensors(&transport, &options(COLLECTION, true));
    assert_eq!(outcome, Outcome::Partial);

    let report: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(report["collection"], COLLECTION);
    assert_eq!(report["members"].as_array().unwrap().len(), 2);
    assert_eq!(report["members"][1]["Id"], "fan2");
    assert_eq!(
        report["failures"][0]["link"],
        "/redfish/v1/Chassis/1/Sensors/fan1"
    );
}

#[test]
fn test_sensors_collection_failure() {
    let transport = FakeTransport::new().with_status(COLLECTION, 500);
    let (outcome, out, err) = run_sensors(&transport, &options(COLLECTION, false));

    assert_eq!(outcome, Outcome::CollectionFailed);
    assert_eq!(outcome.exit_code(), 2);
    assert!(out.is_empty());
    assert!(err.contains("failed to fetch collection"));
    assert_eq!(transport.request_count(), 1);
}

#[test]
fn test_sensors_empty_reference() {
    let transport = FakeTransport::new();
    let (outcome, out, err) = run_sensors(&transport, &options("", false));

    assert_eq!(outcome, Outcome::Complete);
    assert_eq!(outcome.exit_code(), 0);
    assert!(out.starts_with("No sensors"));
    assert!(err.is_empty());
}

#[test]
fn test_sensors_parallel_matches_sequential() {
    let transport = transport();
    let (_, sequential, _) = run_sensors(&transport, &options(COLLECTION, false));

    let mut parallel_options = options(COLLECTION, false);
    parallel_options.concurrency = 3;
    let (outcome, parallel, _) = run_sensors(&transport, &parallel_options);

    assert_eq!(outcome, Outcome::Partial);
    assert_eq!(parallel, sequential);
}

#[test]
fn test_get_single_sensor() {
    let transport = transport();
    let mut out = Vec::new();
    commands::get(
        &transport,
        "/redfish/v1/Chassis/1/Sensors/fan0",
        SensorKind::Fans,
        false,
        &mut out,
    )
    .unwrap();

    assert!(String::from_utf8(out).unwrap().contains("F0"));
}

#[test]
fn test_get_failure_has_context() {
    let transport = transport();
    let mut out = Vec::new();
    let err = commands::get(
        &transport,
        "/redfish/v1/Chassis/1/Sensors/fan1",
        SensorKind::Fans,
        true,
        &mut out,
    )
    .unwrap_err();

    let message = format!("{:#}", err);
    assert!(message.contains("Failed to get /redfish/v1/Chassis/1/Sensors/fan1"));
    assert!(message.contains("HTTP 500"));
}

#[test]
fn test_show_config() {
    let mut out = Vec::new();
    commands::show_config(&RedfishConfig::default(), &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();

    assert!(text.contains("[client]"));
    assert!(text.contains("endpoint = \"https://localhost\""));
    assert!(text.contains("[walk]"));
}
