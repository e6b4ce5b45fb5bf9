//! Callback-driven background multipart file uploads
//!
//! This crate uploads a local file (plus optional text fields) to an HTTP
//! endpoint as `multipart/form-data` without blocking the caller: each
//! upload runs on its own background task, and the single terminal outcome
//! is posted back onto the caller's context through a two-method callback.
//!
//! ```no_run
//! use opplast::{Client, callback};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::new()?;
//!     client
//!         .post("https://example.com/upload", "./photo.jpg")
//!         .param("caption", "from the train")
//!         .callback(callback::handlers(
//!             |status, body| println!("done: {status} {body:?}"),
//!             |status, _body, error| eprintln!("failed ({status}): {error}"),
//!         ))
//!         .dispatch()?;
//!     Ok(())
//! }
//! ```

#![deny(missing_docs)]

pub use body::{DEFAULT_FILE_KEY, MultipartBody, MultipartPart};
pub use callback::UploadCallback;
pub use client::{Client, ClientBuilder, UploadBuilder};
pub use dispatch::{Dispatcher, InlineDispatcher, RuntimeDispatcher};
pub use error::{Error, Result};
pub use outcome::UploadOutcome;
pub use request::{Method, UploadRequest};
pub use transport::{
    ReqwestTransport, Transport, TransportConfig, TransportRequest, TransportResponse,
};

mod body;
pub mod callback;
mod client;
mod dispatch;
mod error;
mod outcome;
mod request;
mod transport;
