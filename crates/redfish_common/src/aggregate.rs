//! Partial-failure aggregation for collection walks
//!
//! A [`FailureSet`] records every member link that could not be resolved,
//! in the order the failures were recorded. An empty set means no error.

use std::fmt;

use crate::error::{CollectionFetchError, MemberError};

/// One failed member link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub link: String,
    pub error: MemberError,
}

/// Failing links and their causes, in insertion order
///
/// Every recorded failure is kept, so a link listed twice that fails twice
/// counts twice; `len()` always equals the number of skipped links.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FailureSet {
    entries: Vec<Failure>,
}

impl FailureSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, link: impl Into<String>, error: impl Into<MemberError>) {
        self.entries.push(Failure {
            link: link.into(),
            error: error.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// First recorded cause for `link`
    pub fn get(&self, link: &str) -> Option<&MemberError> {
        self.entries
            .iter()
            .find(|f| f.link == link)
            .map(|f| &f.error)
    }

    pub fn contains(&self, link: &str) -> bool {
        self.get(link).is_some()
    }

    pub fn links(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|f| f.link.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Failure> {
        self.entries.iter()
    }

    /// `None` when nothing failed, otherwise the set as an error value
    pub fn into_error(self) -> Option<FailureSet> {
        if self.is_empty() {
            None
        } else {
            Some(self)
        }
    }
}

impl<'a> IntoIterator for &'a FailureSet {
    type Item = &'a Failure;
    type IntoIter = std::slice::Iter<'a, Failure>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl fmt::Display for FailureSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to retrieve {} member(s)", self.entries.len())?;
        for (i, failure) in self.entries.iter().enumerate() {
            let sep = if i == 0 { ": " } else { "; " };
            write!(f, "{}{}: {}", sep, failure.link, failure.error)?;
        }
        Ok(())
    }
}

impl std::error::Error for FailureSet {}

/// Some members of a collection failed; the rest were resolved
#[derive(Debug)]
pub struct CollectionError<R> {
    /// URI of the collection document
    pub collection: String,
    /// Members that decoded, in link order
    pub resolved: Vec<R>,
    pub failures: FailureSet,
}

impl<R> fmt::Display for CollectionError<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "collection {}: {}", self.collection, self.failures)
    }
}

impl<R: fmt::Debug> std::error::Error for CollectionError<R> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.failures)
    }
}

/// Outcome of resolving a collection that did not fully succeed
#[derive(Debug)]
pub enum ResolveError<R> {
    /// The collection document itself failed; nothing was resolved
    Fetch(CollectionFetchError),
    /// Some members failed
    Partial(CollectionError<R>),
}

impl<R> ResolveError<R> {
    /// Members resolved despite the error (empty for `Fetch`)
    pub fn resolved(&self) -> &[R] {
        match self {
            ResolveError::Fetch(_) => &[],
            ResolveError::Partial(e) => &e.resolved,
        }
    }

    pub fn failures(&self) -> Option<&FailureSet> {
        match self {
            ResolveError::Fetch(_) => None,
            ResolveError::Partial(e) => Some(&e.failures),
        }
    }

    pub fn is_partial(&self) -> bool {
        matches!(self, ResolveError::Partial(_))
    }

    /// Split a partial outcome into `(resolved, failures)`; a collection
    /// fetch failure stays an error
    pub fn into_partial(self) -> Result<(Vec<R>, FailureSet), CollectionFetchError> {
        match self {
            ResolveError::Fetch(e) => Err(e),
            ResolveError::Partial(e) => Ok((e.resolved, e.failures)),
        }
    }
}

impl<R> From<CollectionFetchError> for ResolveError<R> {
    fn from(err: CollectionFetchError) -> Self {
        ResolveError::Fetch(err)
    }
}

impl<R> fmt::Display for ResolveError<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::Fetch(e) => fmt::Display::fmt(e, f),
            ResolveError::Partial(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl<R: fmt::Debug> std::error::Error for ResolveError<R> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ResolveError::Fetch(e) => Some(e),
            ResolveError::Partial(e) => Some(&e.failures),
        }
    }
}
