//! Building blocks shared by every Redfish resource
//!
//! Resources hold these by composition (an `ODataMeta`, an `Entity`, a
//! `Status`) and forward the accessors they need.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

use crate::error::DecodeError;

/// Top-level OData annotations
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ODataMeta {
    #[serde(rename = "@odata.context", default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(rename = "@odata.type", default, skip_serializing_if = "Option::is_none")]
    pub odata_type: Option<String>,
    #[serde(rename = "@odata.id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// Identity of a resource
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entity {
    /// Opaque resource id (required on the wire)
    pub id: String,
    /// Display name
    pub name: String,
    pub description: Option<String>,
}

/// Reference to another resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    #[serde(rename = "@odata.id")]
    pub odata_id: String,
}

/// Lifecycle state of a resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum State {
    Enabled,
    Disabled,
    StandbyOffline,
    StandbySpare,
    InTest,
    Starting,
    Absent,
    UnavailableOffline,
    Deferring,
    Quiesced,
    Updating,
    /// Value outside the published enumeration, kept verbatim
    Other(String),
}

impl From<String> for State {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Enabled" => State::Enabled,
            "Disabled" => State::Disabled,
            "StandbyOffline" => State::StandbyOffline,
            "StandbySpare" => State::StandbySpare,
            "InTest" => State::InTest,
            "Starting" => State::Starting,
            "Absent" => State::Absent,
            "UnavailableOffline" => State::UnavailableOffline,
            "Deferring" => State::Deferring,
            "Quiesced" => State::Quiesced,
            "Updating" => State::Updating,
            _ => State::Other(s),
        }
    }
}

impl State {
    pub fn as_str(&self) -> &str {
        match self {
            State::Enabled => "Enabled",
            State::Disabled => "Disabled",
            State::StandbyOffline => "StandbyOffline",
            State::StandbySpare => "StandbySpare",
            State::InTest => "InTest",
            State::Starting => "Starting",
            State::Absent => "Absent",
            State::UnavailableOffline => "UnavailableOffline",
            State::Deferring => "Deferring",
            State::Quiesced => "Quiesced",
            State::Updating => "Updating",
            State::Other(s) => s,
        }
    }
}

impl From<State> for String {
    fn from(state: State) -> Self {
        state.as_str().to_string()
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Health of a resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Health {
    Ok,
    Warning,
    Critical,
    Other(String),
}

impl From<String> for Health {
    fn from(s: String) -> Self {
        match s.as_str() {
            "OK" => Health::Ok,
            "Warning" => Health::Warning,
            "Critical" => Health::Critical,
            _ => Health::Other(s),
        }
    }
}

impl Health {
    pub fn as_str(&self) -> &str {
        match self {
            Health::Ok => "OK",
            Health::Warning => "Warning",
            Health::Critical => "Critical",
            Health::Other(s) => s,
        }
    }
}

impl From<Health> for String {
    fn from(health: Health) -> Self {
        health.as_str().to_string()
    }
}

impl fmt::Display for Health {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `Status { State, Health }` pair
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Status {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<State>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health: Option<Health>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_rollup: Option<Health>,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.as_ref().map(State::as_str).unwrap_or("-");
        let health = self.health.as_ref().map(Health::as_str).unwrap_or("-");
        write!(f, "{}/{}", state, health)
    }
}

/// Vendor extension payload, kept as the exact JSON text it arrived as
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Oem(Box<RawValue>);

impl Oem {
    /// Verbatim JSON text
    pub fn get(&self) -> &str {
        self.0.get()
    }

    /// Parse the blob on demand
    pub fn to_value(&self) -> Result<serde_json::Value, DecodeError> {
        serde_json::from_str(self.0.get()).map_err(|e| DecodeError::from_json("Oem", e))
    }
}

impl PartialEq for Oem {
    fn eq(&self, other: &Self) -> bool {
        self.get() == other.get()
    }
}

/// The exact bytes a resource was decoded from
#[derive(Clone, Default, PartialEq, Eq)]
pub struct RawSnapshot(Vec<u8>);

impl RawSnapshot {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.0).ok()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&[u8]> for RawSnapshot {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl From<Vec<u8>> for RawSnapshot {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl fmt::Debug for RawSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RawSnapshot({} bytes)", self.0.len())
    }
}
