//! Command implementations
//!
//! Commands take the transport and output streams as parameters so they can
//! run against a [`redfish_common::FakeTransport`] in tests.

use std::io::Write;

use anyhow::{Context, Result};
use tracing::info;

use redfish_common::{
    fetch_resource, ChannelSensor, CollectionWalker, FanSensor, RedfishConfig, Resource,
    ResolveError, SensorKind, Transport,
};

use crate::output::{json_report, json_resource, render_failures, SensorView};

/// How a `sensors` run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Every member resolved
    Complete,
    /// Some members failed; the rest were printed
    Partial,
    /// The collection document could not be fetched
    CollectionFailed,
}

impl Outcome {
    pub fn exit_code(self) -> i32 {
        match self {
            Outcome::Complete => 0,
            Outcome::Partial => 1,
            Outcome::CollectionFailed => 2,
        }
    }
}

/// Options for the `sensors` command
#[derive(Debug, Clone)]
pub struct SensorsOptions {
    pub uri: String,
    pub kind: SensorKind,
    pub concurrency: usize,
    pub json: bool,
}

/// Resolve a sensor collection and print what was obtained
pub fn sensors(
    transport: &dyn Transport,
    options: &SensorsOptions,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<Outcome> {
    match options.kind {
        SensorKind::Fans => sensors_of::<FanSensor>(transport, options, out, err),
        SensorKind::Channels => sensors_of::<ChannelSensor>(transport, options, out, err),
    }
}

fn sensors_of<R: Resource + SensorView + Send>(
    transport: &dyn Transport,
    options: &SensorsOptions,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<Outcome> {
    let walker = CollectionWalker::new(transport).with_concurrency(options.concurrency);

    let (resolved, failures) = match walker.resolve::<R>(&options.uri) {
        Ok(resolved) => (resolved, None),
        Err(ResolveError::Fetch(e)) => {
            writeln!(err, "error: {}", e)?;
            return Ok(Outcome::CollectionFailed);
        }
        Err(ResolveError::Partial(e)) => (e.resolved, Some(e.failures)),
    };

    info!(
        "Resolved {} {} sensor(s) from {}",
        resolved.len(),
        options.kind,
        options.uri
    );

    if options.json {
        writeln!(out, "{}", json_report(&options.uri, &resolved, failures.as_ref())?)?;
    } else {
        if resolved.is_empty() && failures.is_none() {
            writeln!(out, "No sensors in {}", options.uri)?;
        }
        for sensor in &resolved {
            sensor.render_text(out)?;
        }
    }

    match failures {
        None => Ok(Outcome::Complete),
        Some(failures) => {
            render_failures(&failures, err)?;
            Ok(Outcome::Partial)
        }
    }
}

/// Fetch and print a single sensor
pub fn get(
    transport: &dyn Transport,
    uri: &str,
    kind: SensorKind,
    json: bool,
    out: &mut dyn Write,
) -> Result<()> {
    match kind {
        SensorKind::Fans => get_of::<FanSensor>(transport, uri, json, out),
        SensorKind::Channels => get_of::<ChannelSensor>(transport, uri, json, out),
    }
}

fn get_of<R: Resource + SensorView>(
    transport: &dyn Transport,
    uri: &str,
    json: bool,
    out: &mut dyn Write,
) -> Result<()> {
    let resource: R =
        fetch_resource(transport, uri).with_context(|| format!("Failed to get {}", uri))?;

    if json {
        writeln!(out, "{}", json_resource(&resource)?)?;
    } else {
        resource.render_text(out)?;
    }
    Ok(())
}

/// Print the effective configuration as TOML
pub fn show_config(config: &RedfishConfig, out: &mut dyn Write) -> Result<()> {
    let text = toml::to_string_pretty(config).context("Failed to serialize configuration")?;
    write!(out, "{}", text)?;
    Ok(())
}
