//! Reqwest-backed transport

use bytes::Bytes;
use futures_util::StreamExt;
use futures_util::future::BoxFuture;
use tokio::io::AsyncReadExt;
use tokio::sync::mpsc;
use url::Url;

use super::{Transport, TransportConfig, TransportRequest, TransportResponse};
use crate::body::MultipartPart;
use crate::request::Method;
use crate::{Error, Result};

const FILE_CHUNK_SIZE: usize = 64 * 1024;

/// [`Transport`] implementation on top of a shared [`reqwest::Client`]
#[derive(Clone)]
pub struct ReqwestTransport {
    client: ::reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport with default configuration
    pub fn new() -> Result<Self> {
        let client = ::reqwest::Client::builder()
            .build()
            .map_err(|e| Error::Internal(format!("failed to create reqwest client: {e}")))?;
        Ok(Self { client })
    }

    /// Create a transport with configuration
    pub fn with_config(config: TransportConfig) -> Result<Self> {
        let mut builder = ::reqwest::Client::builder();

        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        if let Some(user_agent) = config.user_agent {
            builder = builder.user_agent(user_agent);
        }

        if let Some(default_headers) = config.default_headers {
            builder = builder.default_headers(default_headers);
        }

        let client = builder
            .build()
            .map_err(|e| Error::Internal(format!("failed to create reqwest client: {e}")))?;
        Ok(Self { client })
    }

    /// Wrap an already configured [`reqwest::Client`]
    pub fn from_client(client: ::reqwest::Client) -> Self {
        Self { client }
    }

    async fn send(client: ::reqwest::Client, request: TransportRequest) -> Result<TransportResponse> {
        let url = Url::parse(&request.url)
            .map_err(|e| Error::Network(format!("invalid URL {}: {e}", request.url)))?;

        let method = match request.method {
            Method::POST => ::reqwest::Method::POST,
            Method::PUT => ::reqwest::Method::PUT,
        };

        let mut builder = client.request(method, url);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }

        let mut form = ::reqwest::multipart::Form::new();
        for part in request.body.into_parts() {
            match part {
                MultipartPart::File {
                    name,
                    path,
                    content_type,
                    file_name,
                } => {
                    let file = tokio::fs::File::open(&path).await?;
                    let length = file.metadata().await?.len();

                    let body = ::reqwest::Body::wrap_stream(file_stream(file));
                    let mut file_part = ::reqwest::multipart::Part::stream_with_length(body, length)
                        .file_name(file_name);
                    if let Some(content_type) = content_type {
                        file_part = file_part.mime_str(&content_type).map_err(|e| {
                            Error::Encoding(format!("invalid media type: {e}"))
                        })?;
                    }
                    form = form.part(name, file_part);
                }
                MultipartPart::Field { name, value } => {
                    form = form.text(name, value);
                }
            }
        }

        let response = builder.multipart(form).send().await.map_err(|e| {
            if e.is_timeout() {
                Error::Timeout
            } else {
                Error::Network(format!("request failed: {e}"))
            }
        })?;

        let status = response.status();
        let headers = response.headers().clone();

        // Forward the body chunk by chunk; a stream error ends the forward
        // after it has been reported downstream.
        let (tx, rx) = mpsc::channel(32);
        tokio::spawn(async move {
            let mut stream = response.bytes_stream();
            while let Some(chunk) = stream.next().await {
                let message =
                    chunk.map_err(|e| Error::Network(format!("body read failed: {e}")));
                let failed = message.is_err();
                if tx.send(message).await.is_err() || failed {
                    break;
                }
            }
        });

        Ok(TransportResponse {
            status,
            headers,
            body: Some(rx),
        })
    }
}

impl Transport for ReqwestTransport {
    fn execute(&self, request: TransportRequest) -> BoxFuture<'static, Result<TransportResponse>> {
        let client = self.client.clone();
        Box::pin(Self::send(client, request))
    }
}

fn file_stream(
    file: tokio::fs::File,
) -> impl futures_util::Stream<Item = std::io::Result<Bytes>> + Send + 'static {
    futures_util::stream::try_unfold(file, |mut file| async move {
        let mut buf = vec![0u8; FILE_CHUNK_SIZE];
        let read = file.read(&mut buf).await?;
        if read == 0 {
            Ok(None)
        } else {
            buf.truncate(read);
            Ok(Some((Bytes::from(buf), file)))
        }
    })
}
