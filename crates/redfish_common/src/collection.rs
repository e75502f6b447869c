//! Collection resolution
//!
//! Fetches a collection document, extracts its ordered member links and
//! fetches each member. A failing member is recorded and skipped; the walk
//! always continues. Only a failure of the collection document itself
//! aborts the call.

use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::aggregate::{CollectionError, FailureSet, ResolveError};
use crate::error::{CollectionFetchError, DecodeError, MemberError};
use crate::resource::{fetch_resource, Resource};
use crate::transport::{get_bytes, Transport};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
struct MemberRef {
    #[serde(rename = "@odata.id", default)]
    odata_id: Option<String>,
}

/// A collection document: ordered member links plus a count
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CollectionDocument {
    #[serde(rename = "@odata.id", default)]
    pub odata_id: Option<String>,
    #[serde(rename = "@odata.type", default)]
    pub odata_type: Option<String>,
    #[serde(rename = "Name", default)]
    pub name: Option<String>,
    #[serde(rename = "Members", default)]
    members: Vec<MemberRef>,
    #[serde(rename = "Members@odata.count", alias = "@odata.count", default)]
    pub count: Option<u64>,
}

impl CollectionDocument {
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        serde_json::from_slice(bytes).map_err(|e| DecodeError::from_json("Collection", e))
    }

    /// Member links in document order; members without a link are skipped
    pub fn item_links(&self) -> Vec<String> {
        self.members
            .iter()
            .filter_map(|m| m.odata_id.clone())
            .collect()
    }
}

/// Fetch and decode a collection document
pub fn get_collection(
    transport: &dyn Transport,
    uri: &str,
) -> Result<CollectionDocument, CollectionFetchError> {
    let bytes = get_bytes(transport, uri).map_err(|e| CollectionFetchError::new(uri, e))?;
    CollectionDocument::decode(&bytes).map_err(|e| CollectionFetchError::new(uri, e))
}

/// Resolve every member of the collection at `link`, one at a time.
///
/// An empty `link` is an empty collection, not an error. On partial failure
/// the error carries the members that did resolve, in link order.
pub fn list_referenced<R: Resource>(
    transport: &dyn Transport,
    link: &str,
) -> Result<Vec<R>, ResolveError<R>> {
    debug!("list_referenced: kind = {}, link = {}", R::KIND, link);
    if link.is_empty() {
        return Ok(Vec::new());
    }

    let collection = get_collection(transport, link)?;
    let links = collection.item_links();
    debug!("list_referenced: {} has {} member link(s)", link, links.len());

    let outcomes = links.into_iter().map(|member| {
        let outcome = fetch_resource::<R>(transport, &member);
        (member, outcome)
    });
    fold_outcomes(link, outcomes)
}

/// Collect per-link outcomes in the order given
fn fold_outcomes<R>(
    collection: &str,
    outcomes: impl IntoIterator<Item = (String, Result<R, MemberError>)>,
) -> Result<Vec<R>, ResolveError<R>> {
    let mut resolved = Vec::new();
    let mut failures = FailureSet::new();

    for (link, outcome) in outcomes {
        match outcome {
            Ok(resource) => resolved.push(resource),
            Err(e) => {
                warn!("Skipping collection member {}: {}", link, e);
                failures.record(link, e);
            }
        }
    }

    match failures.into_error() {
        None => Ok(resolved),
        Some(failures) => Err(ResolveError::Partial(CollectionError {
            collection: collection.to_string(),
            resolved,
            failures,
        })),
    }
}

/// Collection resolver with optional parallel member fetches
///
/// With `concurrency > 1` members are fetched on a rayon pool of that size.
/// The indexed collect keeps link order, and outcomes are folded into the
/// failure set on the calling thread only.
pub struct CollectionWalker<'a> {
    transport: &'a dyn Transport,
    concurrency: usize,
}

impl<'a> CollectionWalker<'a> {
    pub fn new(transport: &'a dyn Transport) -> Self {
        Self {
            transport,
            concurrency: 1,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub fn resolve<R: Resource + Send>(&self, link: &str) -> Result<Vec<R>, ResolveError<R>> {
        if self.concurrency == 1 {
            return list_referenced(self.transport, link);
        }

        debug!(
            "resolve: kind = {}, link = {}, concurrency = {}",
            R::KIND,
            link,
            self.concurrency
        );
        if link.is_empty() {
            return Ok(Vec::new());
        }

        let collection = get_collection(self.transport, link)?;
        let links = collection.item_links();
        let outcomes = self.fetch_all::<R>(&links);

        fold_outcomes(link, links.into_iter().zip(outcomes))
    }

    /// Fetch every link; the returned vector is indexed like `links`
    fn fetch_all<R: Resource + Send>(&self, links: &[String]) -> Vec<Result<R, MemberError>> {
        let transport = self.transport;
        let threads = self.concurrency.min(links.len()).max(1);

        match ThreadPoolBuilder::new().num_threads(threads).build() {
            Ok(pool) => pool.install(|| {
                links
                    .par_iter()
                    .map(|link| fetch_resource::<R>(transport, link))
                    .collect()
            }),
            Err(e) => {
                warn!("resolve: worker pool unavailable ({}), fetching sequentially", e);
                links
                    .iter()
                    .map(|link| fetch_resource::<R>(transport, link))
                    .collect()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_links_in_order() {
        let doc = CollectionDocument::decode(
            br#"{
                "@odata.id": "/redfish/v1/Chassis/1/Sensors",
                "Members": [
                    {"@odata.id": "/s/b"},
                    {"@odata.id": "/s/a"},
                    {},
                    {"@odata.id": "/s/c"}
                ],
                "Members@odata.count": 4
            }"#,
        )
        .unwrap();

        assert_eq!(doc.item_links(), vec!["/s/b", "/s/a", "/s/c"]);
        assert_eq!(doc.count, Some(4));
    }

    #[test]
    fn test_bare_odata_count_accepted() {
        let doc = CollectionDocument::decode(br#"{"Members": [], "@odata.count": 0}"#).unwrap();
        assert!(doc.item_links().is_empty());
        assert_eq!(doc.count, Some(0));
    }

    #[test]
    fn test_members_wrong_shape_rejected() {
        let err = CollectionDocument::decode(br#"{"Members": {"a": 1}}"#).unwrap_err();
        assert_eq!(err.what, "Collection");
    }

    #[test]
    fn test_walker_concurrency_floor() {
        let transport = crate::transport::FakeTransport::new();
        let walker = CollectionWalker::new(&transport).with_concurrency(0);
        assert_eq!(walker.concurrency(), 1);
    }
}
