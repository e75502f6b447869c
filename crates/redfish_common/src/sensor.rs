//! Fan/temperature-array sensor resource
//!
//! The OEM variant of the "Sensor" resource: open arrays of `Fans` and
//! `Temperatures`, each entry carrying its own reading, range, threshold
//! tiers and status. The fixed named-channel variant lives in
//! [`crate::channel`]; the two shapes are never merged.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::common::{Entity, Link, ODataMeta, Oem, RawSnapshot, Status};
use crate::resource::Resource;

/// Which "Sensor" schema shape a caller expects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorKind {
    /// `Fans` / `Temperatures` arrays ([`FanSensor`])
    Fans,
    /// Fixed named channels under `Members` ([`crate::ChannelSensor`])
    Channels,
}

impl FromStr for SensorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fans" | "fan" | "array" => Ok(SensorKind::Fans),
            "channels" | "channel" | "slots" => Ok(SensorKind::Channels),
            _ => Err(format!(
                "Invalid sensor kind: '{}'. Valid values: fans, channels",
                s
            )),
        }
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorKind::Fans => f.write_str("fans"),
            SensorKind::Channels => f.write_str("channels"),
        }
    }
}

/// Severity band a reading falls in, ordered from best to worst
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ThresholdTier {
    Normal,
    NonCritical,
    Critical,
    Fatal,
}

impl fmt::Display for ThresholdTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ThresholdTier::Normal => "normal",
            ThresholdTier::NonCritical => "non-critical",
            ThresholdTier::Critical => "critical",
            ThresholdTier::Fatal => "fatal",
        };
        f.write_str(s)
    }
}

/// Lower/upper × non-critical/critical/fatal limits
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct Thresholds {
    #[serde(rename = "LowerThresholdNonCritical", default)]
    pub lower_non_critical: Option<f64>,
    #[serde(rename = "LowerThresholdCritical", default)]
    pub lower_critical: Option<f64>,
    #[serde(rename = "LowerThresholdFatal", default)]
    pub lower_fatal: Option<f64>,
    #[serde(rename = "UpperThresholdNonCritical", default)]
    pub upper_non_critical: Option<f64>,
    #[serde(rename = "UpperThresholdCritical", default)]
    pub upper_critical: Option<f64>,
    #[serde(rename = "UpperThresholdFatal", default)]
    pub upper_fatal: Option<f64>,
}

impl Thresholds {
    /// Worst tier whose limit the reading is strictly beyond
    pub fn classify(&self, reading: f64) -> ThresholdTier {
        let beyond = |lower: Option<f64>, upper: Option<f64>| {
            lower.map_or(false, |l| reading < l) || upper.map_or(false, |u| reading > u)
        };

        if beyond(self.lower_fatal, self.upper_fatal) {
            ThresholdTier::Fatal
        } else if beyond(self.lower_critical, self.upper_critical) {
            ThresholdTier::Critical
        } else if beyond(self.lower_non_critical, self.upper_non_critical) {
            ThresholdTier::NonCritical
        } else {
            ThresholdTier::Normal
        }
    }
}

/// One entry of the `Fans` array
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Fan {
    #[serde(rename = "@odata.id")]
    pub odata_id: Option<String>,
    pub id: Option<String>,
    pub member_id: Option<String>,
    pub fan_name: Option<String>,
    pub name: Option<String>,
    pub assembly: Option<Link>,
    pub hot_pluggable: Option<bool>,
    #[serde(rename = "IndicatorLED")]
    pub indicator_led: Option<String>,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub part_number: Option<String>,
    pub serial_number: Option<String>,
    pub spare_part_number: Option<String>,
    pub physical_context: Option<String>,
    pub reading: Option<f64>,
    pub reading_units: Option<String>,
    pub sensor_number: Option<u32>,
    pub min_reading_range: Option<f64>,
    pub max_reading_range: Option<f64>,
    #[serde(flatten)]
    pub thresholds: Thresholds,
    pub status: Status,
    pub related_item: Vec<Link>,
    pub redundancy: Vec<Link>,
}

impl Fan {
    /// `FanName` when present, otherwise `Name`, then the member id
    pub fn display_name(&self) -> &str {
        self.fan_name
            .as_deref()
            .or(self.name.as_deref())
            .or(self.member_id.as_deref())
            .or(self.id.as_deref())
            .unwrap_or("")
    }

    pub fn tier(&self) -> Option<ThresholdTier> {
        self.reading.map(|r| self.thresholds.classify(r))
    }
}

/// One entry of the `Temperatures` array
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Temperature {
    #[serde(rename = "@odata.id")]
    pub odata_id: Option<String>,
    pub id: Option<String>,
    pub member_id: Option<String>,
    pub name: Option<String>,
    pub reading_celsius: Option<f64>,
    pub delta_reading_celsius: Option<f64>,
    pub delta_physical_context: Option<String>,
    pub physical_context: Option<String>,
    pub sensor_number: Option<u32>,
    pub min_reading_range_temp: Option<f64>,
    pub max_reading_range_temp: Option<f64>,
    pub min_allowable_operating_value: Option<f64>,
    pub max_allowable_operating_value: Option<f64>,
    pub adjusted_min_allowable_operating_value: Option<f64>,
    pub adjusted_max_allowable_operating_value: Option<f64>,
    #[serde(flatten)]
    pub thresholds: Thresholds,
    pub status: Status,
    pub related_item: Vec<Link>,
}

impl Temperature {
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.member_id.as_deref())
            .or(self.id.as_deref())
            .unwrap_or("")
    }

    pub fn tier(&self) -> Option<ThresholdTier> {
        self.reading_celsius.map(|r| self.thresholds.classify(r))
    }
}

#[derive(Deserialize)]
struct FanSensorWire {
    #[serde(rename = "@odata.context", default)]
    odata_context: Option<String>,
    #[serde(rename = "@odata.type", default)]
    odata_type: Option<String>,
    #[serde(rename = "@odata.id", default)]
    odata_id: Option<String>,
    #[serde(rename = "Id")]
    id: String,
    #[serde(rename = "Name", default)]
    name: Option<String>,
    #[serde(rename = "Description", default)]
    description: Option<String>,
    #[serde(rename = "Fans", default)]
    fans: Vec<Fan>,
    #[serde(rename = "Fans@odata.count", alias = "Fan@odata.count", default)]
    fans_count: Option<u64>,
    #[serde(rename = "Temperatures", default)]
    temperatures: Vec<Temperature>,
    #[serde(rename = "Temperatures@odata.count", default)]
    temperatures_count: Option<u64>,
    #[serde(rename = "Redundancy", default)]
    redundancy: Vec<Link>,
    #[serde(rename = "Redundancy@odata.count", default)]
    redundancy_count: Option<u64>,
    #[serde(rename = "Status", default)]
    status: Status,
    #[serde(rename = "Oem", default)]
    oem: Option<Oem>,
}

/// Sensor resource with open `Fans` and `Temperatures` arrays
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "FanSensorWire")]
pub struct FanSensor {
    odata: ODataMeta,
    entity: Entity,
    status: Status,
    pub fans: Vec<Fan>,
    pub fans_count: Option<u64>,
    pub temperatures: Vec<Temperature>,
    pub temperatures_count: Option<u64>,
    pub redundancy: Vec<Link>,
    pub redundancy_count: Option<u64>,
    /// Vendor extensions, verbatim
    pub oem: Option<Oem>,
    raw: RawSnapshot,
}

impl From<FanSensorWire> for FanSensor {
    fn from(wire: FanSensorWire) -> Self {
        Self {
            odata: ODataMeta {
                context: wire.odata_context,
                odata_type: wire.odata_type,
                id: wire.odata_id,
            },
            entity: Entity {
                id: wire.id,
                name: wire.name.unwrap_or_default(),
                description: wire.description,
            },
            status: wire.status,
            fans: wire.fans,
            fans_count: wire.fans_count,
            temperatures: wire.temperatures,
            temperatures_count: wire.temperatures_count,
            redundancy: wire.redundancy,
            redundancy_count: wire.redundancy_count,
            oem: wire.oem,
            raw: RawSnapshot::default(),
        }
    }
}

impl Resource for FanSensor {
    const KIND: &'static str = "FanSensor";

    fn odata(&self) -> &ODataMeta {
        &self.odata
    }

    fn entity(&self) -> &Entity {
        &self.entity
    }

    fn status(&self) -> &Status {
        &self.status
    }

    fn snapshot(&self) -> &RawSnapshot {
        &self.raw
    }

    fn attach_snapshot(&mut self, raw: RawSnapshot) {
        self.raw = raw;
    }
}

impl FanSensor {
    pub fn description(&self) -> Option<&str> {
        self.entity.description.as_deref()
    }

    pub fn fan(&self, member_id: &str) -> Option<&Fan> {
        self.fans.iter().find(|f| {
            f.member_id.as_deref() == Some(member_id) || f.id.as_deref() == Some(member_id)
        })
    }

    /// Worst threshold tier across all fan and temperature readings
    pub fn worst_tier(&self) -> ThresholdTier {
        self.fans
            .iter()
            .filter_map(Fan::tier)
            .chain(self.temperatures.iter().filter_map(Temperature::tier))
            .max()
            .unwrap_or(ThresholdTier::Normal)
    }
}
