//! LivePlaya - live map and log client
//!
//! This library keeps a local view of a tracking backend's state (map
//! snapshot plus recent log) synchronized by polling, and exposes it to a
//! front end through subscriptions.
//!
//! # Modules
//!
//! - [`session`] - the session controller, its state and subscriber registry
//! - [`transport`] - how views are fetched (HTTP or synthetic)
//! - [`query`] - what view is wanted
//! - [`view`] - what the backend returns
//! - [`config`] - INI configuration file
//! - [`logging`] - tracing setup

pub mod config;
pub mod logging;
pub mod query;
pub mod session;
pub mod transport;
pub mod view;

/// Library version, as reported by the CLI.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
