//! Session controller and state.
//!
//! This module keeps a local [`SessionState`] synchronized with the backend
//! and exposes it to a UI layer through subscriptions.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                        SessionController                          │
//! │                                                                   │
//! │  start / set_query / timer ──► fetch cycle ──► Transport          │
//! │                                    │                              │
//! │                                    ▼                              │
//! │                        Arc<SessionState> (replaced, never edited) │
//! │                                    │                              │
//! │                                    ▼                              │
//! │                        SubscriberRegistry ──► listeners           │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! - [`SessionController`] - owns the state, the timer and the in-flight fetch
//! - [`SessionHandle`] - cloneable read/query access for UI code
//! - [`SubscriberRegistry`] - listener list with snapshot iteration
//! - [`SessionState`], [`Alert`] - immutable snapshots handed to readers
//!
//! Fetch failures never escape the controller: they become an [`Alert`] on
//! the state while the last good view stays in place.

mod config;
mod controller;
mod error;
mod state;
mod subscribers;

pub use config::{SessionConfig, DEFAULT_REFRESH_INTERVAL_MS};
pub use controller::{SessionController, SessionHandle};
pub use error::SessionError;
pub use state::{Alert, AlertLevel, SessionState};
pub use subscribers::{Listener, ListenerId, SubscriberRegistry, Subscription};
