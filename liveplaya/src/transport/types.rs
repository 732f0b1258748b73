//! Transport trait and error types.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::query::QueryModel;
use crate::view::View;

/// Boxed future type for dyn-compatible async methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Errors that can occur while fetching a view.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The cancellation token fired before the request completed.
    ///
    /// This is the expected outcome for superseded requests and is never
    /// shown to the user.
    #[error("request cancelled")]
    Cancelled,

    /// The backend answered with a non-success status code.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The request could not be sent or the response could not be read.
    #[error("network error: {0}")]
    Network(String),

    /// No response arrived within the configured timeout.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The response body was not a valid view.
    #[error("malformed response: {0}")]
    Decode(String),

    /// The transport could not be built for the configured endpoint.
    #[error("invalid endpoint URL '{url}': {reason}")]
    InvalidEndpoint { url: String, reason: String },
}

impl TransportError {
    /// Whether this error only signals supersession.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, TransportError::Cancelled)
    }
}

/// One request/response cycle against the backend.
///
/// Implementations must observe `cancel` and resolve promptly with
/// [`TransportError::Cancelled`] once it fires. The session controller
/// ignores the outcome of cancelled requests regardless, so an
/// implementation that finishes late is still correct, just wasteful.
///
/// # Dyn Compatibility
///
/// `fetch_view` returns a [`BoxFuture`] so the controller can hold an
/// `Arc<dyn Transport>` and tests can inject scripted fakes.
pub trait Transport: Send + Sync {
    /// Fetch the view for `query`.
    fn fetch_view<'a>(
        &'a self,
        query: &'a QueryModel,
        cancel: CancellationToken,
    ) -> BoxFuture<'a, Result<View, TransportError>>;

    /// Short name for logs.
    fn name(&self) -> &str;
}
