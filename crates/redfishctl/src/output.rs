//! Rendering of resolved sensors
//!
//! Text output is one block per sensor; JSON output re-emits each member's
//! retained source document untouched.

use std::io::{self, Write};

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::value::RawValue;

use redfish_common::{ChannelSensor, FailureSet, FanSensor, Resource, ThresholdTier};

/// Text rendering of one resource
pub trait SensorView {
    fn render_text(&self, out: &mut dyn Write) -> io::Result<()>;
}

fn tier_label(tier: Option<ThresholdTier>) -> String {
    tier.map(|t| t.to_string()).unwrap_or_else(|| "-".to_string())
}

fn reading_label(reading: Option<f64>, units: Option<&str>) -> String {
    match (reading, units) {
        (Some(r), Some(u)) => format!("{} {}", r, u),
        (Some(r), None) => r.to_string(),
        (None, _) => "n/a".to_string(),
    }
}

fn header(resource: &impl Resource, out: &mut dyn Write) -> io::Result<()> {
    writeln!(
        out,
        "{}  {}  [{}]",
        resource.id(),
        resource.name(),
        resource.status()
    )
}

impl SensorView for FanSensor {
    fn render_text(&self, out: &mut dyn Write) -> io::Result<()> {
        header(self, out)?;
        for fan in &self.fans {
            writeln!(
                out,
                "  fan   {:<24} {:>12}  {:<12} {}",
                fan.display_name(),
                reading_label(fan.reading, fan.reading_units.as_deref()),
                tier_label(fan.tier()),
                fan.status
            )?;
        }
        for temp in &self.temperatures {
            writeln!(
                out,
                "  temp  {:<24} {:>12}  {:<12} {}",
                temp.display_name(),
                reading_label(temp.reading_celsius, Some("Cel")),
                tier_label(temp.tier()),
                temp.status
            )?;
        }
        Ok(())
    }
}

impl SensorView for ChannelSensor {
    fn render_text(&self, out: &mut dyn Write) -> io::Result<()> {
        header(self, out)?;
        for (name, channel) in &self.members {
            writeln!(
                out,
                "  {:<30} {:>12}  {:<12} {}",
                name,
                reading_label(channel.reading, channel.reading_units.as_deref()),
                tier_label(channel.tier()),
                channel.status
            )?;
        }
        Ok(())
    }
}

/// Failed links, one per line
pub fn render_failures(failures: &FailureSet, out: &mut dyn Write) -> io::Result<()> {
    writeln!(out, "{} member(s) could not be retrieved:", failures.len())?;
    for failure in failures {
        writeln!(out, "  {}: {}", failure.link, failure.error)?;
    }
    Ok(())
}

#[derive(Serialize)]
struct JsonFailure<'a> {
    link: &'a str,
    error: String,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    collection: &'a str,
    members: Vec<Box<RawValue>>,
    failures: Vec<JsonFailure<'a>>,
}

fn raw_member(resource: &impl Resource) -> Result<Box<RawValue>> {
    serde_json::from_slice(resource.snapshot().as_bytes())
        .with_context(|| format!("Snapshot of {} is not valid JSON", resource.id()))
}

/// `{collection, members: [...source documents], failures: [{link, error}]}`
pub fn json_report<R: Resource>(
    collection: &str,
    resolved: &[R],
    failures: Option<&FailureSet>,
) -> Result<String> {
    let members = resolved.iter().map(raw_member).collect::<Result<Vec<_>>>()?;
    let failures = failures
        .map(|set| {
            set.iter()
                .map(|f| JsonFailure {
                    link: &f.link,
                    error: f.error.to_string(),
                })
                .collect()
        })
        .unwrap_or_default();

    let report = JsonReport {
        collection,
        members,
        failures,
    };
    serde_json::to_string_pretty(&report).context("Failed to serialize report")
}

/// A single resource's source document
pub fn json_resource<R: Resource>(resource: &R) -> Result<String> {
    let raw = raw_member(resource)?;
    Ok(raw.get().to_string())
}
