//! Transport abstraction over the HTTP layer

pub mod reqwest;

pub use self::reqwest::ReqwestTransport;

use std::time::Duration;

use bytes::Bytes;
use futures_util::future::BoxFuture;
use http::{HeaderMap, StatusCode};
use tokio::sync::mpsc;

use crate::Result;
use crate::body::MultipartBody;
use crate::request::Method;

/// Configuration applied when the client builds its own transport
#[derive(Clone, Debug, Default)]
pub struct TransportConfig {
    /// Request timeout
    pub timeout: Option<Duration>,
    /// User agent string
    pub user_agent: Option<String>,
    /// Default headers added to every request
    pub default_headers: Option<HeaderMap>,
}

/// A prepared request carrying a multipart body
pub struct TransportRequest {
    /// HTTP method for the request
    pub method: Method,
    /// Target URL; not validated until execution
    pub url: String,
    /// Extra headers for this request
    pub headers: HeaderMap,
    /// The multipart payload
    pub body: MultipartBody,
}

impl TransportRequest {
    /// Pair a method and URL with a body
    pub fn new(method: Method, url: impl Into<String>, body: MultipartBody) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            body,
        }
    }
}

/// Status line plus body stream, as obtained from the HTTP layer
pub struct TransportResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Body chunks; `None` when the response carries no entity
    pub body: Option<mpsc::Receiver<Result<Bytes>>>,
}

/// Capability to execute one upload request against an HTTP stack.
///
/// Implementations must be safe to share across concurrent uploads: the
/// client hands the same instance to every background task it spawns. The
/// request's body is consumed exactly once per call, and the file part is
/// read during that call, not before.
pub trait Transport: Send + Sync + 'static {
    /// Send the request, returning the status line and body stream
    fn execute(&self, request: TransportRequest) -> BoxFuture<'static, Result<TransportResponse>>;
}
