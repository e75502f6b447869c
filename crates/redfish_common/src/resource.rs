//! Resource decoding
//!
//! Every resource keeps the exact bytes it was decoded from, so decoding the
//! retained snapshot again yields an identical value.

use serde::de::DeserializeOwned;

use crate::common::{Entity, ODataMeta, RawSnapshot, Status};
use crate::error::{DecodeError, MemberError};
use crate::transport::{get_bytes, Transport};

/// A decodable Redfish resource
pub trait Resource: DeserializeOwned + Sized {
    /// Kind name used in errors and logs
    const KIND: &'static str;

    fn odata(&self) -> &ODataMeta;
    fn entity(&self) -> &Entity;
    fn status(&self) -> &Status;
    fn snapshot(&self) -> &RawSnapshot;

    /// Attach the source bytes after the typed fields are decoded
    fn attach_snapshot(&mut self, raw: RawSnapshot);

    /// Decode one JSON document, retaining `bytes` verbatim
    fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut resource: Self =
            serde_json::from_slice(bytes).map_err(|e| DecodeError::from_json(Self::KIND, e))?;
        resource.attach_snapshot(RawSnapshot::from(bytes));
        Ok(resource)
    }

    /// Decode a fresh copy from the retained snapshot
    fn redecode(&self) -> Result<Self, DecodeError> {
        Self::decode(self.snapshot().as_bytes())
    }

    fn id(&self) -> &str {
        &self.entity().id
    }

    fn name(&self) -> &str {
        &self.entity().name
    }

    fn odata_id(&self) -> Option<&str> {
        self.odata().id.as_deref()
    }
}

/// GET one resource and decode it
pub fn fetch_resource<R: Resource>(transport: &dyn Transport, uri: &str) -> Result<R, MemberError> {
    let bytes = get_bytes(transport, uri)?;
    let resource = R::decode(&bytes)?;
    Ok(resource)
}
