//! Session error types.

use thiserror::Error;

/// Errors returned by session operations.
///
/// Fetch failures never appear here: they are converted into an
/// [`Alert`](super::Alert) on the session state instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The controller was used after [`dispose`](super::SessionController::dispose).
    #[error("session controller has been disposed")]
    Disposed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disposed_display() {
        assert_eq!(
            SessionError::Disposed.to_string(),
            "session controller has been disposed"
        );
    }
}
