//! Upload request description

use std::path::PathBuf;

use crate::Result;
use crate::body::MultipartBody;
use crate::transport::TransportRequest;

/// HTTP methods that can carry an upload body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// POST method
    POST,
    /// PUT method
    PUT,
}

impl Method {
    /// Wire name of the method
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::POST => "POST",
            Method::PUT => "PUT",
        }
    }
}

/// Everything that describes one upload: method, target URL, file and fields.
///
/// Built with [`UploadRequest::new`] plus chained setters, then consumed by
/// [`Client::upload`](crate::Client::upload). Each value drives exactly one
/// attempt.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub(crate) method: Method,
    pub(crate) url: String,
    pub(crate) file: PathBuf,
    pub(crate) file_key: Option<String>,
    pub(crate) content_type: Option<String>,
    pub(crate) params: Vec<(String, String)>,
}

impl UploadRequest {
    /// Describe an upload of `file` to `url`.
    ///
    /// The URL is not validated here; a malformed URL surfaces as a
    /// transport failure when the request is executed.
    pub fn new(method: Method, url: impl Into<String>, file: impl Into<PathBuf>) -> Self {
        Self {
            method,
            url: url.into(),
            file: file.into(),
            file_key: None,
            content_type: None,
            params: Vec::new(),
        }
    }

    /// Override the part name used for the file. Defaults to `"file"`.
    pub fn file_key(mut self, key: impl Into<String>) -> Self {
        self.file_key = Some(key.into());
        self
    }

    /// Declare the file's media type instead of letting the transport infer one
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Append a text field. Setting the same name twice keeps the last value.
    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.params.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = value,
            None => self.params.push((name, value)),
        }
        self
    }

    /// Append many text fields at once
    pub fn params<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (name, value) in params {
            self = self.param(name, value);
        }
        self
    }

    /// Method the upload will use
    pub fn method(&self) -> Method {
        self.method
    }

    /// Target URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Build the multipart body and attach it to a transport request
    pub(crate) fn into_transport_request(self) -> Result<TransportRequest> {
        let body = MultipartBody::build(
            self.file_key.as_deref(),
            &self.file,
            self.content_type.as_deref(),
            &self.params,
        )?;
        Ok(TransportRequest::new(self.method, self.url, body))
    }
}
