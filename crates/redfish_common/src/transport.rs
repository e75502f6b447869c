//! Transport abstraction
//!
//! The only request the data-access layer issues is a GET. A [`Response`]
//! owns its body stream; dropping the response releases the body, so every
//! exit path of the fetch helpers releases it.

use std::collections::HashMap;
use std::fmt;
use std::io::{self, Cursor, Read};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use anyhow::Result;
use reqwest::header::ACCEPT;

use crate::config::ClientConfig;
use crate::error::TransportError;

/// Something that can GET a URI
pub trait Transport: Send + Sync {
    fn get(&self, uri: &str) -> Result<Response, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn get(&self, uri: &str) -> Result<Response, TransportError> {
        (**self).get(uri)
    }
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn get(&self, uri: &str) -> Result<Response, TransportError> {
        (**self).get(uri)
    }
}

/// A response with an unread body stream
pub struct Response {
    uri: String,
    status: u16,
    body: Box<dyn Read + Send>,
}

impl Response {
    pub fn new(uri: impl Into<String>, status: u16, body: impl Read + Send + 'static) -> Self {
        Self {
            uri: uri.into(),
            status,
            body: Box::new(body),
        }
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Read the whole body, consuming (and releasing) the response.
    ///
    /// A non-2xx status is reported as [`TransportError::Status`] without
    /// reading the body.
    pub fn into_bytes(mut self) -> Result<Vec<u8>, TransportError> {
        if !self.is_success() {
            return Err(TransportError::Status {
                uri: self.uri,
                status: self.status,
            });
        }

        let mut bytes = Vec::new();
        self.body
            .read_to_end(&mut bytes)
            .map_err(|e| TransportError::Body {
                uri: self.uri.clone(),
                reason: e.to_string(),
            })?;
        Ok(bytes)
    }
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Response")
            .field("uri", &self.uri)
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

/// GET `uri` and read the full body
pub fn get_bytes(transport: &dyn Transport, uri: &str) -> Result<Vec<u8>, TransportError> {
    transport.get(uri)?.into_bytes()
}

/// Blocking HTTP transport backed by reqwest
pub struct HttpTransport {
    endpoint: String,
    timeout_secs: u64,
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))?;

        Ok(Self {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            timeout_secs: config.timeout_secs,
            client,
        })
    }

    /// Absolute URL for a resource URI; absolute URIs pass through
    pub fn url_for(&self, uri: &str) -> String {
        if uri.starts_with("http://") || uri.starts_with("https://") {
            uri.to_string()
        } else {
            format!("{}/{}", self.endpoint, uri.trim_start_matches('/'))
        }
    }
}

impl Transport for HttpTransport {
    fn get(&self, uri: &str) -> Result<Response, TransportError> {
        let url = self.url_for(uri);
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .header(ACCEPT, "application/json")
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    TransportError::Timeout {
                        uri: uri.to_string(),
                        secs: self.timeout_secs,
                    }
                } else {
                    TransportError::Request {
                        uri: uri.to_string(),
                        reason: e.to_string(),
                    }
                }
            })?;

        let status = response.status().as_u16();
        Ok(Response::new(uri, status, response))
    }
}

#[derive(Debug, Clone)]
enum Route {
    Document(Vec<u8>),
    Status(u16),
    Fail(TransportError),
    BrokenBody(Vec<u8>),
}

/// Body handed out by [`FakeTransport`]; counts itself open until dropped
struct TrackedBody {
    inner: Cursor<Vec<u8>>,
    fail_after_prefix: bool,
    open: Arc<AtomicUsize>,
}

impl Read for TrackedBody {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        if n == 0 && self.fail_after_prefix {
            return Err(io::Error::new(
                io::ErrorKind::ConnectionReset,
                "connection reset by peer",
            ));
        }
        Ok(n)
    }
}

impl Drop for TrackedBody {
    fn drop(&mut self) {
        self.open.fetch_sub(1, Ordering::SeqCst);
    }
}

/// In-memory transport for testing
///
/// Unrouted URIs answer HTTP 404.
#[derive(Default)]
pub struct FakeTransport {
    routes: HashMap<String, Route>,
    requests: Mutex<Vec<String>>,
    open_bodies: Arc<AtomicUsize>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` with HTTP 200
    pub fn with_document(mut self, uri: &str, body: impl Into<Vec<u8>>) -> Self {
        self.routes.insert(uri.to_string(), Route::Document(body.into()));
        self
    }

    /// Serve a JSON value with HTTP 200
    pub fn with_json(self, uri: &str, value: &serde_json::Value) -> Self {
        let body = value.to_string();
        self.with_document(uri, body)
    }

    /// Answer with an HTTP error status
    pub fn with_status(mut self, uri: &str, status: u16) -> Self {
        self.routes.insert(uri.to_string(), Route::Status(status));
        self
    }

    /// Fail before any response arrives
    pub fn with_error(mut self, uri: &str, error: TransportError) -> Self {
        self.routes.insert(uri.to_string(), Route::Fail(error));
        self
    }

    /// HTTP 200 whose body breaks after `prefix`
    pub fn with_broken_body(mut self, uri: &str, prefix: impl Into<Vec<u8>>) -> Self {
        self.routes.insert(uri.to_string(), Route::BrokenBody(prefix.into()));
        self
    }

    /// URIs requested so far, in request order
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Bodies handed out and not yet released
    pub fn open_bodies(&self) -> usize {
        self.open_bodies.load(Ordering::SeqCst)
    }

    fn body(&self, bytes: Vec<u8>, fail_after_prefix: bool) -> TrackedBody {
        self.open_bodies.fetch_add(1, Ordering::SeqCst);
        TrackedBody {
            inner: Cursor::new(bytes),
            fail_after_prefix,
            open: Arc::clone(&self.open_bodies),
        }
    }
}

impl Transport for FakeTransport {
    fn get(&self, uri: &str) -> Result<Response, TransportError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(uri.to_string());

        match self.routes.get(uri) {
            Some(Route::Document(bytes)) => {
                Ok(Response::new(uri, 200, self.body(bytes.clone(), false)))
            }
            Some(Route::BrokenBody(prefix)) => {
                Ok(Response::new(uri, 200, self.body(prefix.clone(), true)))
            }
            Some(Route::Status(status)) => {
                let body = format!("{{\"error\": {{\"code\": \"HTTP {}\"}}}}", status);
                Ok(Response::new(uri, *status, self.body(body.into_bytes(), false)))
            }
            Some(Route::Fail(error)) => Err(error.clone()),
            None => Ok(Response::new(uri, 404, self.body(Vec::new(), false))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_bytes_success() {
        let transport = FakeTransport::new().with_document("/a", "{\"Id\": \"a\"}");
        let bytes = get_bytes(&transport, "/a").unwrap();
        assert_eq!(bytes, b"{\"Id\": \"a\"}");
        assert_eq!(transport.open_bodies(), 0);
        assert_eq!(transport.requests(), vec!["/a".to_string()]);
    }

    #[test]
    fn test_status_error_releases_body() {
        let transport = FakeTransport::new().with_status("/a", 500);
        let err = get_bytes(&transport, "/a").unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert_eq!(transport.open_bodies(), 0);
    }

    #[test]
    fn test_broken_body_releases_body() {
        let transport = FakeTransport::new().with_broken_body("/a", "{\"Id\"");
        let err = get_bytes(&transport, "/a").unwrap_err();
        assert!(matches!(err, TransportError::Body { .. }));
        assert_eq!(transport.open_bodies(), 0);
    }

    #[test]
    fn test_unrouted_uri_is_404() {
        let transport = FakeTransport::new();
        let err = get_bytes(&transport, "/missing").unwrap_err();
        assert_eq!(
            err,
            TransportError::Status {
                uri: "/missing".to_string(),
                status: 404
            }
        );
    }

    #[test]
    fn test_transport_error_passes_through() {
        let transport = FakeTransport::new().with_error(
            "/a",
            TransportError::Request {
                uri: "/a".to_string(),
                reason: "connection refused".to_string(),
            },
        );
        let err = get_bytes(&transport, "/a").unwrap_err();
        assert!(err.to_string().contains("connection refused"));
        assert_eq!(transport.request_count(), 1);
    }

    #[test]
    fn test_open_body_counted_until_dropped() {
        let transport = FakeTransport::new().with_document("/a", "{}");
        let response = transport.get("/a").unwrap();
        assert_eq!(transport.open_bodies(), 1);
        drop(response);
        assert_eq!(transport.open_bodies(), 0);
    }

    #[test]
    fn test_http_transport_joins_relative_uris() {
        let config = ClientConfig {
            endpoint: "https://bmc.example/".to_string(),
            ..ClientConfig::default()
        };
        let transport = HttpTransport::new(&config).unwrap();
        assert_eq!(
            transport.url_for("/redfish/v1/Chassis"),
            "https://bmc.example/redfish/v1/Chassis"
        );
        assert_eq!(
            transport.url_for("https://other/redfish/v1"),
            "https://other/redfish/v1"
        );
    }
}
