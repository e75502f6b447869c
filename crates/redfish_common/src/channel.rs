//! Named-channel sensor resource
//!
//! The fixed-slot variant of the "Sensor" resource used by PMC + PSU
//! controllers: `Members` is an object keyed by channel name (`CPU`,
//! `chassis_input_power`, `p3_vout`, ...), each value a single reading with
//! caution/critical thresholds.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::common::{Entity, ODataMeta, Oem, RawSnapshot, Status};
use crate::resource::Resource;
use crate::sensor::ThresholdTier;

/// Board-level channels
pub const BOARD_CHANNELS: [&str; 12] = [
    "CPU",
    "Memory",
    "Storage_Internal",
    "Storage_RW",
    "chassis_efficiency",
    "chassis_input_current",
    "chassis_input_power",
    "chassis_input_voltage",
    "chassis_output_current",
    "chassis_output_power",
    "chassis_output_voltage",
    "chassis_temperature",
];

/// Per-supply channel suffixes; the full name is `p{index}_{suffix}`
pub const SUPPLY_CHANNELS: [&str; 10] = [
    "ambient", "exhaust", "fan1", "hotspot", "iin", "iout", "pin", "pout", "vin", "vout",
];

/// Power supplies p0..p5
pub const SUPPLY_COUNT: usize = 6;

/// Every named slot the controller publishes
pub fn known_channels() -> Vec<String> {
    let mut names: Vec<String> = BOARD_CHANNELS.iter().map(|s| s.to_string()).collect();
    for index in 0..SUPPLY_COUNT {
        for suffix in SUPPLY_CHANNELS {
            names.push(format!("p{}_{}", index, suffix));
        }
    }
    names
}

/// Split `p3_vout` into `(3, "vout")`
pub fn parse_supply_channel(name: &str) -> Option<(usize, &str)> {
    let rest = name.strip_prefix('p')?;
    let (digit, suffix) = rest.split_once('_')?;
    let index = match digit.as_bytes() {
        [d] if d.is_ascii_digit() => usize::from(d - b'0'),
        _ => return None,
    };
    if index < SUPPLY_COUNT && SUPPLY_CHANNELS.contains(&suffix) {
        Some((index, suffix))
    } else {
        None
    }
}

pub fn is_known_channel(name: &str) -> bool {
    BOARD_CHANNELS.contains(&name) || parse_supply_channel(name).is_some()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ThresholdReading {
    pub reading: Option<f64>,
}

/// Caution/critical limits of one channel
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ChannelThresholds {
    pub lower_caution: Option<ThresholdReading>,
    pub lower_critical: Option<ThresholdReading>,
    pub upper_caution: Option<ThresholdReading>,
    pub upper_critical: Option<ThresholdReading>,
}

impl ChannelThresholds {
    /// Caution maps to [`ThresholdTier::NonCritical`]; there is no fatal tier
    pub fn classify(&self, reading: f64) -> ThresholdTier {
        let limit = |t: Option<ThresholdReading>| t.and_then(|t| t.reading);
        let beyond = |lower: Option<f64>, upper: Option<f64>| {
            lower.map_or(false, |l| reading < l) || upper.map_or(false, |u| reading > u)
        };

        if beyond(limit(self.lower_critical), limit(self.upper_critical)) {
            ThresholdTier::Critical
        } else if beyond(limit(self.lower_caution), limit(self.upper_caution)) {
            ThresholdTier::NonCritical
        } else {
            ThresholdTier::Normal
        }
    }
}

/// One named channel
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ChannelReading {
    #[serde(rename = "@odata.id")]
    pub odata_id: Option<String>,
    pub id: Option<String>,
    pub name: Option<String>,
    pub reading: Option<f64>,
    pub reading_range_max: Option<f64>,
    pub reading_range_min: Option<f64>,
    pub reading_type: Option<String>,
    pub reading_units: Option<String>,
    pub status: Status,
    pub thresholds: ChannelThresholds,
}

impl ChannelReading {
    pub fn tier(&self) -> Option<ThresholdTier> {
        self.reading.map(|r| self.thresholds.classify(r))
    }
}

#[derive(Deserialize)]
struct ChannelSensorWire {
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
    #[serde(rename = "Members", default)]
    members: BTreeMap<String, ChannelReading>,
    #[serde(rename = "Status", default)]
    status: Status,
    #[serde(rename = "Oem", default)]
    oem: Option<Oem>,
}

/// Sensor resource with a fixed set of named channels
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "ChannelSensorWire")]
pub struct ChannelSensor {
    odata: ODataMeta,
    entity: Entity,
    status: Status,
    /// Channels by name, unknown names included
    pub members: BTreeMap<String, ChannelReading>,
    pub oem: Option<Oem>,
    raw: RawSnapshot,
}

impl From<ChannelSensorWire> for ChannelSensor {
    fn from(wire: ChannelSensorWire) -> Self {
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
            members: wire.members,
            oem: wire.oem,
            raw: RawSnapshot::default(),
        }
    }
}

impl Resource for ChannelSensor {
    const KIND: &'static str = "ChannelSensor";

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

impl ChannelSensor {
    pub fn description(&self) -> Option<&str> {
        self.entity.description.as_deref()
    }

    pub fn channel(&self, name: &str) -> Option<&ChannelReading> {
        self.members.get(name)
    }

    /// Channels of power supply `index`, in suffix order
    pub fn supply(&self, index: usize) -> Vec<(&'static str, &ChannelReading)> {
        SUPPLY_CHANNELS
            .iter()
            .filter_map(|suffix| {
                self.members
                    .get(&format!("p{}_{}", index, suffix))
                    .map(|reading| (*suffix, reading))
            })
            .collect()
    }

    /// Channel names outside the published slot list
    pub fn unknown_channels(&self) -> impl Iterator<Item = &str> {
        self.members
            .keys()
            .map(String::as_str)
            .filter(|name| !is_known_channel(name))
    }

    pub fn worst_tier(&self) -> ThresholdTier {
        self.members
            .values()
            .filter_map(ChannelReading::tier)
            .max()
            .unwrap_or(ThresholdTier::Normal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"{
        "@odata.id": "/redfish/v1/Chassis/PMC/Sensors",
        "Id": "PMC",
        "Name": "PMC Sensors",
        "Members": {
            "CPU": {
                "Id": "CPU",
                "Name": "CPU Temp",
                "Reading": 51.5,
                "ReadingUnits": "Cel",
                "ReadingType": "Temperature",
                "Status": {"State": "Enabled", "Health": "OK"},
                "Thresholds": {
                    "UpperCaution": {"Reading": 80},
                    "UpperCritical": {"Reading": 95}
                }
            },
            "p2_vout": {"Reading": 12.1, "ReadingUnits": "V"},
            "p2_iout": {"Reading": 30.5, "ReadingUnits": "A"},
            "vendor_debug": {"Reading": 1}
        },
        "Oem": {"Liteon": {"Build": 7}}
    }"#;

    #[test]
    fn test_known_channels() {
        let names = known_channels();
        assert_eq!(names.len(), 12 + 6 * 10);
        assert!(names.contains(&"p5_vout".to_string()));
        assert!(is_known_channel("chassis_input_power"));
        assert!(is_known_channel("p0_fan1"));
        assert!(!is_known_channel("p6_fan1"));
        assert!(!is_known_channel("p1_fan2"));
        assert_eq!(parse_supply_channel("p3_hotspot"), Some((3, "hotspot")));
    }

    #[test]
    fn test_decode_channels() {
        let sensor = ChannelSensor::decode(BODY.as_bytes()).unwrap();
        assert_eq!(sensor.id(), "PMC");
        assert_eq!(sensor.members.len(), 4);

        let cpu = sensor.channel("CPU").unwrap();
        assert_eq!(cpu.reading, Some(51.5));
        assert_eq!(cpu.tier(), Some(ThresholdTier::Normal));
        assert_eq!(
            cpu.thresholds.upper_critical.and_then(|t| t.reading),
            Some(95.0)
        );

        let supply: Vec<&str> = sensor.supply(2).into_iter().map(|(s, _)| s).collect();
        assert_eq!(supply, vec!["iout", "vout"]);
        assert!(sensor.supply(0).is_empty());
    }

    #[test]
    fn test_unknown_channels_are_kept() {
        let sensor = ChannelSensor::decode(BODY.as_bytes()).unwrap();
        let unknown: Vec<&str> = sensor.unknown_channels().collect();
        assert_eq!(unknown, vec!["vendor_debug"]);
    }

    #[test]
    fn test_supply_index_is_a_single_digit() {
        assert_eq!(parse_supply_channel("p01_vout"), None);
        assert_eq!(parse_supply_channel("p+1_vout"), None);
        assert_eq!(parse_supply_channel("p_vout"), None);
        assert_eq!(parse_supply_channel("p1_vout"), Some((1, "vout")));

        let body = br#"{"Id": "PMC", "Members": {"p01_vout": {}, "p1_vout": {}}}"#;
        let sensor = ChannelSensor::decode(body).unwrap();
        let unknown: Vec<&str> = sensor.unknown_channels().collect();
        assert_eq!(unknown, vec!["p01_vout"]);
    }

    #[test]
    fn test_oem_preserved() {
        let sensor = ChannelSensor::decode(BODY.as_bytes()).unwrap();
        assert_eq!(sensor.oem.unwrap().get(), r#"{"Liteon": {"Build": 7}}"#);
    }

    #[test]
    fn test_channel_thresholds() {
        let thresholds = ChannelThresholds {
            lower_caution: Some(ThresholdReading { reading: Some(11.4) }),
            lower_critical: Some(ThresholdReading { reading: Some(10.8) }),
            upper_caution: Some(ThresholdReading { reading: Some(12.6) }),
            upper_critical: None,
        };
        assert_eq!(thresholds.classify(12.0), ThresholdTier::Normal);
        assert_eq!(thresholds.classify(11.0), ThresholdTier::NonCritical);
        assert_eq!(thresholds.classify(10.0), ThresholdTier::Critical);
        assert_eq!(thresholds.classify(13.0), ThresholdTier::NonCritical);
    }
}
