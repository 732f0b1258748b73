//! The session controller.
//!
//! Owns the current [`SessionState`], turns query changes and timer ticks
//! into fetch cycles, and notifies subscribers after every state
//! replacement.
//!
//! # Fetch Cycle
//!
//! ```text
//! trigger (start | set_query | timer | refresh)
//!    │
//!    ├─► cancel previous token ──► its result will be discarded
//!    ├─► new child token, state.is_loading = true, notify
//!    └─► spawn: transport.fetch_view(query, token)
//!             │
//!             ├─ token cancelled ─────► discard, no transition
//!             ├─ Ok(view) ────────────► is_loading = false, view, alert cleared, notify
//!             ├─ Err(Cancelled) ──────► discard, no transition
//!             └─ Err(other) ──────────► is_loading = false, alert = error, view kept, notify
//! ```
//!
//! Only the most recently started cycle holds a live token, so at most one
//! result is ever applied per trigger and an older cycle can never
//! overwrite state produced by a newer one.
//!
//! # Lifecycle
//!
//! The controller is created once with [`SessionController::start`] and
//! torn down with [`SessionController::dispose`] (or by dropping it), which
//! stops the refresh timer, cancels the in-flight fetch and drops all
//! listeners. Lightweight [`SessionHandle`]s can be cloned out of the
//! controller for UI code and listeners.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::config::SessionConfig;
use super::error::SessionError;
use super::state::{Alert, SessionState};
use super::subscribers::{Listener, SubscriberRegistry, Subscription};
use crate::query::QueryModel;
use crate::transport::{Transport, TransportError};
use crate::view::View;

/// What started a fetch cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trigger {
    Start,
    Query,
    Timer,
    Manual,
}

/// Mutable state guarded by the controller's lock.
struct Inner {
    state: Arc<SessionState>,
    /// Token of the newest fetch cycle, until it completes.
    in_flight: Option<CancellationToken>,
    /// Sequence number of the newest fetch cycle.
    cycle: u64,
    disposed: bool,
}

impl Inner {
    fn ensure_live(&self) -> Result<(), SessionError> {
        if self.disposed {
            Err(SessionError::Disposed)
        } else {
            Ok(())
        }
    }
}

/// State shared between the controller, its handles and its tasks.
struct Shared {
    inner: Mutex<Inner>,
    subscribers: Arc<SubscriberRegistry>,
    transport: Arc<dyn Transport>,
    runtime: Handle,
    /// Parent of every fetch token; cancelled on dispose.
    shutdown: CancellationToken,
}

impl Shared {
    fn state(&self) -> Arc<SessionState> {
        Arc::clone(&self.inner.lock().state)
    }

    /// Start a fetch cycle, optionally for a new query.
    fn begin_cycle(
        self: &Arc<Self>,
        query: Option<QueryModel>,
        trigger: Trigger,
    ) -> Result<(), SessionError> {
        let (token, query, cycle) = {
            let mut inner = self.inner.lock();
            inner.ensure_live()?;

            if let Some(previous) = inner.in_flight.take() {
                previous.cancel();
                debug!(cycle = inner.cycle, "Superseded in-flight fetch");
            }

            let token = self.shutdown.child_token();
            inner.cycle += 1;
            inner.in_flight = Some(token.clone());
            inner.state = Arc::new(match query {
                Some(query) => inner.state.loading_query(query),
                None => inner.state.loading(),
            });

            (token, inner.state.query.clone(), inner.cycle)
        };

        debug!(cycle, trigger = ?trigger, query = %query, "Fetch cycle started");
        self.subscribers.notify();

        let shared = Arc::clone(self);
        self.runtime.spawn(async move {
            let result = shared.transport.fetch_view(&query, token.clone()).await;
            shared.complete_cycle(cycle, &token, result);
        });

        Ok(())
    }

    /// Apply the outcome of a fetch cycle, unless it has been superseded.
    fn complete_cycle(
        &self,
        cycle: u64,
        token: &CancellationToken,
        result: Result<View, TransportError>,
    ) {
        {
            let mut inner = self.inner.lock();

            // The cycle that cancelled this one owns the next transition
            if token.is_cancelled() {
                debug!(cycle, "Discarded result of superseded fetch");
                return;
            }

            match result {
                Ok(view) => {
                    debug!(cycle, name = %view.name, "Fetch cycle completed");
                    inner.state = Arc::new(inner.state.loaded(Arc::new(view)));
                }
                Err(TransportError::Cancelled) => {
                    warn!(
                        cycle,
                        transport = self.transport.name(),
                        "Transport reported cancellation for a live fetch, ignoring"
                    );
                    return;
                }
                Err(e) => {
                    warn!(cycle, error = %e, "Fetch cycle failed");
                    inner.state = Arc::new(inner.state.failed(Alert::fetch_failed(&e)));
                }
            }
            inner.in_flight = None;
        }

        self.subscribers.notify();
    }

    fn dismiss_alert(&self) -> Result<(), SessionError> {
        {
            let mut inner = self.inner.lock();
            inner.ensure_live()?;
            inner.state = Arc::new(inner.state.without_alert());
        }
        self.subscribers.notify();
        Ok(())
    }

    fn subscribe(&self, listener: Listener) -> Result<Subscription, SessionError> {
        self.inner.lock().ensure_live()?;
        let id = self.subscribers.add(listener);
        Ok(Subscription::new(id, &self.subscribers))
    }

    /// Driver task: the initial fetch, then one cycle per timer tick.
    async fn drive(self: Arc<Self>, refresh_interval: Option<Duration>) {
        if self.begin_cycle(None, Trigger::Start).is_err() {
            return;
        }

        let Some(period) = refresh_interval else {
            return;
        };

        // Wall-clock periodic: ticks do not wait for fetches to finish
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;

                _ = self.shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    if self.begin_cycle(None, Trigger::Timer).is_err() {
                        break;
                    }
                }
            }
        }

        debug!("Refresh timer stopped");
    }
}

/// Cloneable access to a running session.
///
/// Handles can read state, issue queries and subscribe, but cannot dispose
/// the session; that is reserved for the owning [`SessionController`].
/// Every operation except [`state`](Self::state) fails with
/// [`SessionError::Disposed`] once the controller has been disposed.
#[derive(Clone)]
pub struct SessionHandle {
    shared: Arc<Shared>,
}

impl SessionHandle {
    /// The current state snapshot.
    ///
    /// Inside a notification this already reflects the transition being
    /// announced.
    pub fn state(&self) -> Arc<SessionState> {
        self.shared.state()
    }

    /// Replace the query and immediately start a fetch for it.
    pub fn set_query(&self, query: QueryModel) -> Result<(), SessionError> {
        self.shared.begin_cycle(Some(query), Trigger::Query)
    }

    /// Re-fetch the current query now.
    pub fn refresh(&self) -> Result<(), SessionError> {
        self.shared.begin_cycle(None, Trigger::Manual)
    }

    /// Remove the current alert, if any. Always notifies.
    pub fn dismiss_alert(&self) -> Result<(), SessionError> {
        self.shared.dismiss_alert()
    }

    /// Register a listener invoked after every state replacement.
    pub fn subscribe<F>(&self, listener: F) -> Result<Subscription, SessionError>
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.shared.subscribe(Arc::new(listener))
    }

    /// Whether the owning controller has been disposed.
    pub fn is_disposed(&self) -> bool {
        self.shared.inner.lock().disposed
    }
}

impl fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionHandle")
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

/// Keeps a [`SessionState`] in sync with the backend.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use liveplaya::query::QueryModel;
/// use liveplaya::session::{SessionConfig, SessionController};
/// use liveplaya::transport::HttpTransport;
///
/// let transport = Arc::new(HttpTransport::new("http://localhost:8000/api")?);
/// let controller = SessionController::start(
///     QueryModel::new().with_zoom(12.0),
///     SessionConfig::default(),
///     transport,
///     &tokio::runtime::Handle::current(),
/// );
///
/// let handle = controller.handle();
/// let _subscription = controller.subscribe(move || {
///     let state = handle.state();
///     println!("loading={} alert={:?}", state.is_loading, state.alert);
/// })?;
///
/// // Later
/// controller.dispose();
/// ```
pub struct SessionController {
    handle: SessionHandle,
}

impl SessionController {
    /// Create the controller and start fetching.
    ///
    /// The initial fetch and the recurring refresh run on a driver task
    /// spawned on `runtime`, so listeners subscribed right after `start`
    /// returns observe the first cycle from its beginning.
    pub fn start(
        initial_query: QueryModel,
        config: SessionConfig,
        transport: Arc<dyn Transport>,
        runtime: &Handle,
    ) -> Self {
        info!(
            query = %initial_query,
            transport = transport.name(),
            refresh_interval = ?config.refresh_interval(),
            "Starting session controller"
        );

        let shared = Arc::new(Shared {
            inner: Mutex::new(Inner {
                state: Arc::new(SessionState::new(initial_query)),
                in_flight: None,
                cycle: 0,
                disposed: false,
            }),
            subscribers: Arc::new(SubscriberRegistry::new()),
            transport,
            runtime: runtime.clone(),
            shutdown: CancellationToken::new(),
        });

        runtime.spawn(Arc::clone(&shared).drive(config.refresh_interval()));

        Self {
            handle: SessionHandle { shared },
        }
    }

    /// A cloneable handle for UI code and listeners.
    pub fn handle(&self) -> SessionHandle {
        self.handle.clone()
    }

    /// The current state snapshot.
    pub fn state(&self) -> Arc<SessionState> {
        self.handle.state()
    }

    /// Replace the query and immediately start a fetch for it.
    pub fn set_query(&self, query: QueryModel) -> Result<(), SessionError> {
        self.handle.set_query(query)
    }

    /// Re-fetch the current query now.
    pub fn refresh(&self) -> Result<(), SessionError> {
        self.handle.refresh()
    }

    /// Remove the current alert, if any. Always notifies.
    pub fn dismiss_alert(&self) -> Result<(), SessionError> {
        self.handle.dismiss_alert()
    }

    /// Register a listener invoked after every state replacement.
    pub fn subscribe<F>(&self, listener: F) -> Result<Subscription, SessionError>
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.handle.subscribe(listener)
    }

    /// Whether [`dispose`](Self::dispose) has run.
    pub fn is_disposed(&self) -> bool {
        self.handle.is_disposed()
    }

    /// Stop the timer, cancel the in-flight fetch and drop all listeners.
    ///
    /// Idempotent. The last state stays readable afterwards.
    pub fn dispose(&self) {
        let shared = &self.handle.shared;
        let in_flight = {
            let mut inner = shared.inner.lock();
            if inner.disposed {
                return;
            }
            inner.disposed = true;
            inner.in_flight.take()
        };

        if let Some(token) = in_flight {
            token.cancel();
        }
        shared.shutdown.cancel();
        shared.subscribers.clear();

        info!("Session controller disposed");
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl fmt::Debug for SessionController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.handle.shared.inner.lock();
        f.debug_struct("SessionController")
            .field("state", &inner.state)
            .field("cycle", &inner.cycle)
            .field("disposed", &inner.disposed)
            .field("subscribers", &self.handle.shared.subscribers.len())
            .finish()
    }
}
