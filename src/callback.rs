//! Upload completion callbacks

use crate::Error;

/// Two-outcome completion notification for one upload attempt.
///
/// Exactly one of the two methods runs, exactly once, after the attempt
/// reaches its terminal state. Both take `self` by value, so a second
/// invocation is unrepresentable. Delivery happens on the dispatcher the
/// client was built with, never directly on the background task.
pub trait UploadCallback: Send + 'static {
    /// The server accepted the upload with a success status
    fn on_success(self: Box<Self>, status: u16, body: Option<String>);

    /// The upload did not complete, or the server rejected it.
    ///
    /// `status` is `-1` when no status line was ever obtained.
    fn on_failure(self: Box<Self>, status: i32, body: Option<String>, error: Error);
}

/// Adapt a pair of closures into an [`UploadCallback`]
pub fn handlers<S, F>(on_success: S, on_failure: F) -> Box<dyn UploadCallback>
where
    S: FnOnce(u16, Option<String>) + Send + 'static,
    F: FnOnce(i32, Option<String>, Error) + Send + 'static,
{
    Box::new(FnCallback {
        on_success,
        on_failure,
    })
}

struct FnCallback<S, F> {
    on_success: S,
    on_failure: F,
}

impl<S, F> UploadCallback for FnCallback<S, F>
where
    S: FnOnce(u16, Option<String>) + Send + 'static,
    F: FnOnce(i32, Option<String>, Error) + Send + 'static,
{
    fn on_success(self: Box<Self>, status: u16, body: Option<String>) {
        (self.on_success)(status, body)
    }

    fn on_failure(self: Box<Self>, status: i32, body: Option<String>, error: Error) {
        (self.on_failure)(status, body, error)
    }
}
