//! Redfish Common - client-side data access for BMC sensor resources
//!
//! Decodes Redfish sensor documents into typed values (keeping the source
//! bytes), and resolves sensor collections link by link, reporting failed
//! members alongside the ones that resolved.

pub mod aggregate;
pub mod channel;
pub mod collection;
pub mod common;
pub mod config;
pub mod error;
pub mod resource;
pub mod sensor;
pub mod transport;

pub use aggregate::{CollectionError, Failure, FailureSet, ResolveError};
pub use channel::{ChannelReading, ChannelSensor, ChannelThresholds};
pub use collection::{get_collection, list_referenced, CollectionDocument, CollectionWalker};
pub use common::{Entity, Health, Link, ODataMeta, Oem, RawSnapshot, State, Status};
pub use config::{ClientConfig, RedfishConfig, WalkConfig};
pub use error::{CollectionFetchError, DecodeError, DecodeErrorKind, MemberError, TransportError};
pub use resource::{fetch_resource, Resource};
pub use sensor::{Fan, FanSensor, SensorKind, Temperature, ThresholdTier, Thresholds};
pub use transport::{FakeTransport, HttpTransport, Response, Transport};
