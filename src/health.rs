//! Connection health: run-once engine setup and the restoration signal.
//!
//! When the engine's backing service crashes, in-flight requests fail with
//! a connection-interrupted error and the engine restarts the service in
//! the background. Once it is back, the engine emits a non-error
//! notification. [`RestoreSignal`] carries that event from the engine's
//! notification thread to a sender blocked in
//! [`Session::send_failable`](crate::session::Session::send_failable).
//!
//! The signal holds at most one pending event: several restorations that
//! happen before anyone waits collapse into a single "restored" state,
//! which the next waiter consumes.
//!
//! Setup and signal belong to the engine, not to a session. Every session
//! over the same engine shares one [`EngineHealth`], obtained through
//! [`EngineHealth::for_engine`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Once, OnceLock, PoisonError, Weak};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TrySendError};
use tracing::{debug, info};

use crate::engine::{Engine, EngineResponse, NotificationHandler};

pub struct RestoreSignal {
    tx: Sender<()>,
    rx: Receiver<()>,
}

impl RestoreSignal {
    pub fn new() -> Self {
        let (tx, rx) = crossbeam_channel::bounded(1);
        Self { tx, rx }
    }

    /// Publish a restoration. Coalesces with an event already pending.
    pub fn notify(&self) {
        match self.tx.try_send(()) {
            Ok(()) => {}
            Err(TrySendError::Full(())) => debug!("restoration already pending"),
            Err(TrySendError::Disconnected(())) => {}
        }
    }

    /// Block for at most `timeout` waiting for a restoration. Returns
    /// `true` if one was observed.
    pub fn wait(&self, timeout: Duration) -> bool {
        match self.rx.recv_timeout(timeout) {
            Ok(()) => true,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => false,
        }
    }

    /// Notification callback that publishes every non-error notification.
    pub fn handler(self: &Arc<Self>) -> NotificationHandler {
        let signal = Arc::clone(self);
        Arc::new(move |notification: EngineResponse| {
            if !notification.is_error() {
                info!("connection to the analysis service restored");
                signal.notify();
            }
        })
    }
}

impl Default for RestoreSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Two independent run-once steps against one engine: session
/// initialization and notification-handler registration.
///
/// Both are safe to request from any number of threads concurrently; the
/// underlying engine call runs exactly once.
pub struct EngineSetup {
    initialized: Once,
    handler_registered: Once,
}

impl EngineSetup {
    pub fn new() -> Self {
        Self {
            initialized: Once::new(),
            handler_registered: Once::new(),
        }
    }

    pub fn initialize(&self, engine: &dyn Engine) {
        self.initialized.call_once(|| {
            debug!("initializing analysis engine");
            engine.initialize();
        });
    }

    pub fn register_restore_handler(&self, engine: &dyn Engine, signal: &Arc<RestoreSignal>) {
        self.handler_registered.call_once(|| {
            debug!("registering engine notification handler");
            engine.set_notification_handler(signal.handler());
        });
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.is_completed()
    }
}

impl Default for EngineSetup {
    fn default() -> Self {
        Self::new()
    }
}

/// Run-once setup and restoration signal for one engine.
pub struct EngineHealth {
    setup: EngineSetup,
    restore: Arc<RestoreSignal>,
}

/// Live health records, keyed by engine address. A record is alive only
/// while some session holds it, and a session also holds its engine, so a
/// live key never refers to a freed engine.
static REGISTRY: OnceLock<Mutex<HashMap<usize, Weak<EngineHealth>>>> = OnceLock::new();

impl EngineHealth {
    pub fn new() -> Self {
        Self {
            setup: EngineSetup::new(),
            restore: Arc::new(RestoreSignal::new()),
        }
    }

    /// The health record shared by every session over `engine`.
    pub fn for_engine(engine: &Arc<dyn Engine>) -> Arc<EngineHealth> {
        let key = Arc::as_ptr(engine) as *const () as usize;
        let mut registry = REGISTRY
            .get_or_init(|| Mutex::new(HashMap::new()))
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(health) = registry.get(&key).and_then(Weak::upgrade) {
            return health;
        }
        registry.retain(|_, health| health.strong_count() > 0);
        let health = Arc::new(EngineHealth::new());
        registry.insert(key, Arc::downgrade(&health));
        health
    }

    /// Initialize `engine` and register the restoration handler, each at
    /// most once.
    pub fn ensure_ready(&self, engine: &dyn Engine) {
        self.setup.initialize(engine);
        self.setup.register_restore_handler(engine, &self.restore);
    }

    pub fn restore_signal(&self) -> &RestoreSignal {
        &self.restore
    }

    pub fn is_initialized(&self) -> bool {
        self.setup.is_initialized()
    }
}

impl Default for EngineHealth {
    fn default() -> Self {
        Self::new()
    }
}
