//! Response classification

use bytes::Bytes;
use tokio::sync::mpsc;

use crate::callback::UploadCallback;
use crate::transport::TransportResponse;
use crate::{Error, Result};

/// Terminal result of one upload attempt.
///
/// Produced exactly once per attempt and handed to the callback. A status
/// below 300 counts as success; everything else, and any failure before a
/// status line was obtained, is a failure.
#[derive(Debug)]
pub enum UploadOutcome {
    /// The server accepted the upload
    Success {
        /// Status code from the response
        status: u16,
        /// Response body, absent when the entity was missing or empty
        body: Option<String>,
    },
    /// The upload did not complete, or the server rejected it
    Failure {
        /// Status code, `-1` when no status line was obtained
        status: i32,
        /// Whatever body was read before the failure, if any
        body: Option<String>,
        /// What went wrong
        error: Error,
    },
}

impl UploadOutcome {
    /// Read the response body and classify the status line
    pub(crate) async fn classify(response: TransportResponse) -> Self {
        let status = response.status;
        match drain(response.body).await {
            Ok(body) => {
                if status.as_u16() >= 300 {
                    let reason = status
                        .canonical_reason()
                        .unwrap_or("unknown status")
                        .to_string();
                    UploadOutcome::Failure {
                        status: i32::from(status.as_u16()),
                        body,
                        error: Error::HttpStatus {
                            status: status.as_u16(),
                            reason,
                        },
                    }
                } else {
                    UploadOutcome::Success {
                        status: status.as_u16(),
                        body,
                    }
                }
            }
            Err((partial, error)) => UploadOutcome::Failure {
                status: i32::from(status.as_u16()),
                body: partial,
                error,
            },
        }
    }

    /// Invoke the callback matching this outcome
    pub(crate) fn deliver(self, callback: Box<dyn UploadCallback>) {
        match self {
            UploadOutcome::Success { status, body } => callback.on_success(status, body),
            UploadOutcome::Failure {
                status,
                body,
                error,
            } => callback.on_failure(status, body, error),
        }
    }
}

/// Collect the body stream into a string.
///
/// A missing entity and a zero-byte body are both reported as absent. A
/// stream error keeps whatever text was read before it.
async fn drain(
    body: Option<mpsc::Receiver<Result<Bytes>>>,
) -> std::result::Result<Option<String>, (Option<String>, Error)> {
    let Some(mut receiver) = body else {
        return Ok(None);
    };

    let mut collected = Vec::new();
    while let Some(chunk) = receiver.recv().await {
        match chunk {
            Ok(bytes) => collected.extend_from_slice(&bytes),
            Err(error) => return Err((partial_text(&collected), error)),
        }
    }

    if collected.is_empty() {
        return Ok(None);
    }

    match String::from_utf8(collected) {
        Ok(text) => Ok(Some(text)),
        Err(error) => Err((None, Error::from(error))),
    }
}

fn partial_text(collected: &[u8]) -> Option<String> {
    if collected.is_empty() {
        None
    } else {
        Some(String::from_utf8_lossy(collected).into_owned())
    }
}
