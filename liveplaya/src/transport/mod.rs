//! Backend transport abstraction.
//!
//! A [`Transport`] performs one request/response cycle: given a
//! [`QueryModel`](crate::query::QueryModel) it returns a decoded
//! [`View`](crate::view::View) or a typed [`TransportError`]. Every call
//! carries a [`CancellationToken`](tokio_util::sync::CancellationToken)
//! that implementations must observe.
//!
//! # Implementations
//!
//! - [`HttpTransport`] - reqwest client against the backend's `v0` endpoint
//! - [`SyntheticTransport`] - offline generator for running without a backend
//!
//! ```ignore
//! use liveplaya::transport::{HttpTransport, Transport};
//! use tokio_util::sync::CancellationToken;
//!
//! let transport = HttpTransport::new("http://localhost:8000/api")?;
//! let view = transport.fetch_view(&query, CancellationToken::new()).await?;
//! ```

mod http;
mod synthetic;
mod types;

pub use http::{HttpTransport, DEFAULT_ENDPOINT, DEFAULT_TIMEOUT_SECS, VIEW_PATH};
pub use synthetic::{SyntheticTransport, DEFAULT_LATENCY};
pub use types::{BoxFuture, Transport, TransportError};
