//! Upload client and orchestration

pub mod upload;

pub use upload::UploadBuilder;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use http::{HeaderMap, HeaderName, HeaderValue};
use tokio::runtime::Handle;

use crate::callback::UploadCallback;
use crate::dispatch::{Dispatcher, RuntimeDispatcher};
use crate::outcome::UploadOutcome;
use crate::request::{Method, UploadRequest};
use crate::transport::{ReqwestTransport, Transport, TransportConfig};
use crate::{Error, Result};

/// Client for dispatching background file uploads.
///
/// Cloning is cheap; clones share the transport, the dispatcher and the
/// runtime handle background tasks are spawned on.
#[derive(Clone)]
pub struct Client {
    transport: Arc<dyn Transport>,
    dispatcher: Arc<dyn Dispatcher>,
    handle: Handle,
}

impl Client {
    /// Create a client with default configuration.
    ///
    /// Must be called from within a tokio runtime; outcome callbacks are
    /// posted back onto that runtime.
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    /// Create a client builder
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Start building a POST upload of `file` to `url`
    pub fn post(&self, url: impl Into<String>, file: impl Into<PathBuf>) -> UploadBuilder {
        UploadBuilder::new(self.clone(), UploadRequest::new(Method::POST, url, file))
    }

    /// Start building a PUT upload of `file` to `url`
    pub fn put(&self, url: impl Into<String>, file: impl Into<PathBuf>) -> UploadBuilder {
        UploadBuilder::new(self.clone(), UploadRequest::new(Method::PUT, url, file))
    }

    /// Run `request` on a background task and deliver the outcome to
    /// `callback` through the client's dispatcher.
    ///
    /// Returns as soon as the task is scheduled. Every failure after that —
    /// body encoding, transport, status classification — arrives through
    /// `on_failure`; nothing is thrown across the context boundary. Each
    /// call gets its own independent task; concurrent uploads share no
    /// mutable state.
    pub fn upload(&self, request: UploadRequest, callback: Box<dyn UploadCallback>) {
        let transport = self.transport.clone();
        let dispatcher = self.dispatcher.clone();
        self.handle.spawn(async move {
            let outcome = run(transport.as_ref(), request).await;
            dispatcher.post(Box::new(move || outcome.deliver(callback)));
        });
    }
}

async fn run(transport: &dyn Transport, request: UploadRequest) -> UploadOutcome {
    tracing::debug!("{} {} upload starting", request.method.as_str(), request.url);

    let transport_request = match request.into_transport_request() {
        Ok(transport_request) => transport_request,
        Err(e) => {
            return UploadOutcome::Failure {
                status: -1,
                body: None,
                error: e,
            };
        }
    };

    match transport.execute(transport_request).await {
        Ok(response) => UploadOutcome::classify(response).await,
        Err(e) => {
            tracing::debug!("upload transport failed: {}", e);
            UploadOutcome::Failure {
                status: -1,
                body: None,
                error: e,
            }
        }
    }
}

/// Builder for creating upload clients
pub struct ClientBuilder {
    config: TransportConfig,
    transport: Option<Arc<dyn Transport>>,
    dispatcher: Option<Arc<dyn Dispatcher>>,
}

impl ClientBuilder {
    /// Create a new client builder
    pub fn new() -> Self {
        Self {
            config: TransportConfig::default(),
            transport: None,
            dispatcher: None,
        }
    }

    /// Set the request timeout for the built-in transport
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = Some(timeout);
        self
    }

    /// Set the user agent for the built-in transport
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = Some(user_agent.into());
        self
    }

    /// Add a default header to every request sent by the built-in
    /// transport. Unparsable names or values are skipped.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let headers = self.config.default_headers.get_or_insert_with(HeaderMap::new);
        if let Ok(name) = HeaderName::from_bytes(name.into().as_bytes()) {
            if let Ok(value) = HeaderValue::from_str(&value.into()) {
                headers.insert(name, value);
            }
        }
        self
    }

    /// Use a pre-configured transport instead of the built-in reqwest one.
    ///
    /// The transport-related builder options (`timeout`, `user_agent`,
    /// `header`) only apply to the built-in transport and are ignored when
    /// one is injected here.
    pub fn transport(mut self, transport: impl Transport) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Deliver callbacks through `dispatcher` instead of posting them onto
    /// the runtime the client was built on
    pub fn dispatcher(mut self, dispatcher: impl Dispatcher) -> Self {
        self.dispatcher = Some(Arc::new(dispatcher));
        self
    }

    /// Build the client.
    ///
    /// Fails when called outside a tokio runtime, or when the built-in
    /// transport cannot be constructed.
    pub fn build(self) -> Result<Client> {
        let handle = Handle::try_current().map_err(|_| {
            Error::Internal("Client::build requires a running tokio runtime".to_string())
        })?;

        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::with_config(self.config)?),
        };

        let dispatcher = match self.dispatcher {
            Some(dispatcher) => dispatcher,
            None => Arc::new(RuntimeDispatcher::new(handle.clone())),
        };

        Ok(Client {
            transport,
            dispatcher,
            handle,
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
