//! Per-upload builder surface

use crate::callback::UploadCallback;
use crate::client::Client;
use crate::request::UploadRequest;
use crate::{Error, Result};

/// Builder for one upload attempt.
///
/// Obtained from [`Client::post`] or [`Client::put`]; collects the optional
/// pieces of the request and dispatches it on a background task.
///
/// # Examples
///
/// ```no_run
/// use opplast::{Client, callback};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let client = Client::new()?;
/// client
///     .post("https://example.com/upload", "./report.pdf")
///     .file_key("document")
///     .content_type("application/pdf")
///     .param("title", "Quarterly report")
///     .callback(callback::handlers(
///         |status, body| println!("uploaded: {status} {body:?}"),
///         |status, _body, error| eprintln!("upload failed ({status}): {error}"),
///     ))
///     .dispatch()?;
/// # Ok(())
/// # }
/// ```
pub struct UploadBuilder {
    client: Client,
    request: UploadRequest,
    callback: Option<Box<dyn UploadCallback>>,
}

impl UploadBuilder {
    pub(crate) fn new(client: Client, request: UploadRequest) -> Self {
        Self {
            client,
            request,
            callback: None,
        }
    }

    /// Override the part name used for the file. Defaults to `"file"`.
    pub fn file_key(mut self, key: impl Into<String>) -> Self {
        self.request = self.request.file_key(key);
        self
    }

    /// Declare the file's media type instead of letting the transport infer one
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.request = self.request.content_type(content_type);
        self
    }

    /// Add a text field sent alongside the file
    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.request = self.request.param(name, value);
        self
    }

    /// Add many text fields at once
    pub fn params<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.request = self.request.params(params);
        self
    }

    /// Set the completion callback
    pub fn callback(mut self, callback: Box<dyn UploadCallback>) -> Self {
        self.callback = Some(callback);
        self
    }

    /// Schedule the upload on a background task.
    ///
    /// Fails synchronously with [`Error::InvalidArgument`] when no callback
    /// was set; nothing is scheduled or sent in that case. All later
    /// failures arrive through the callback.
    pub fn dispatch(self) -> Result<()> {
        let callback = self
            .callback
            .ok_or(Error::InvalidArgument("a callback is required before dispatch"))?;
        self.client.upload(self.request, callback);
        Ok(())
    }
}
