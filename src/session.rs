//! The send protocol.
//!
//! A [`Session`] drives one request through the full pipeline:
//!
//! ```text
//! Request ──build──▶ WireObject ──Engine::send_request_sync──▶ EngineResponse
//!                                                                 │
//!                    Value ◀──decode (UID cache)── Variant ◀──────┤ ok
//!                    RequestError ◀──classify─────────────────────┘ error
//! ```
//!
//! Two entry points are offered:
//!
//! | Method | On engine error |
//! |--------|-----------------|
//! | [`send`](Session::send) | Panics. For call sites that already validated their request |
//! | [`send_failable`](Session::send_failable) | Returns a [`RequestError`]; waits for restoration first if the connection was interrupted |
//!
//! Every call blocks the calling thread for the whole round trip. Requests
//! from one thread are strictly sequential; requests from different
//! threads reach the engine in whatever order it accepts them.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use sourcekit_bridge_core::decode::{Decoder, DropObserver, DropReason};
use sourcekit_bridge_core::error::{DecodeError, ErrorKind, RequestError};
use sourcekit_bridge_core::request::{Request, RequestBuilder};
use sourcekit_bridge_core::uid::UidCache;
use sourcekit_bridge_core::value::Value;
use sourcekit_bridge_core::variant::Variant;
use tracing::{debug, info, trace, warn};

use crate::config::Config;
use crate::engine::{Engine, EngineResponse, EngineUids};
use crate::health::EngineHealth;

pub struct Session {
    engine: Arc<dyn Engine>,
    builder: RequestBuilder,
    uids: Arc<UidCache>,
    health: Arc<EngineHealth>,
    restore_wait: Duration,
}

static SHARED: OnceLock<Session> = OnceLock::new();

/// Install the process-wide session. The first call wins; later calls
/// return the existing session and drop their engine.
pub fn install(engine: Arc<dyn Engine>, config: &Config) -> &'static Session {
    SHARED.get_or_init(|| Session::new(engine, config))
}

/// The process-wide session, if [`install`] has run.
pub fn shared() -> Option<&'static Session> {
    SHARED.get()
}

impl Session {
    /// Create a session over `engine`, initializing the engine and
    /// registering the restoration handler unless an earlier session over
    /// the same engine already did.
    ///
    /// Decoded UIDs are interned in the process-wide [`UidCache`].
    pub fn new(engine: Arc<dyn Engine>, config: &Config) -> Self {
        Self::with_uid_cache(engine, config, UidCache::global())
    }

    /// Like [`Session::new`], interning UIDs in `uids` instead of the
    /// process-wide cache.
    pub fn with_uid_cache(engine: Arc<dyn Engine>, config: &Config, uids: Arc<UidCache>) -> Self {
        let session = Self {
            health: EngineHealth::for_engine(&engine),
            engine,
            builder: RequestBuilder::new(config.interface.sdk_path.clone()),
            uids,
            restore_wait: config.engine.restore_wait(),
        };
        session.ensure_ready();
        session
    }

    /// Run the one-time engine setup steps. Idempotent and thread-safe,
    /// and shared with every other session over the same engine.
    pub fn ensure_ready(&self) {
        self.health.ensure_ready(self.engine.as_ref());
    }

    pub fn restore_wait(&self) -> Duration {
        self.restore_wait
    }

    pub fn uid_cache(&self) -> &Arc<UidCache> {
        &self.uids
    }

    /// Best-effort send.
    ///
    /// # Panics
    ///
    /// Panics if the engine reports an error, or if the response holds a
    /// value type the decoder does not support.
    pub fn send(&self, request: &Request) -> Value {
        match self.call(request) {
            EngineResponse::Value(payload) => match self.decode(&payload) {
                Ok(value) => value,
                Err(e) => panic!("{} returned an undecodable response: {}", request.kind(), e),
            },
            EngineResponse::Error { kind, description } => {
                panic!("{}: {}", request.kind(), RequestError::new(kind, description))
            }
        }
    }

    /// Failable send.
    ///
    /// On a connection-interrupted error, blocks for at most the configured
    /// restore wait so the engine can bring its service back before the
    /// caller's next request. The request itself is not retried and the
    /// error is returned whether or not restoration happened.
    ///
    /// A response holding an unsupported value type is reported as
    /// [`RequestError::Unknown`] carrying the decoder's message.
    pub fn send_failable(&self, request: &Request) -> Result<Value, RequestError> {
        match self.call(request) {
            EngineResponse::Value(payload) => self
                .decode(&payload)
                .map_err(|e| RequestError::Unknown(Some(e.to_string()))),
            EngineResponse::Error { kind, description } => {
                let error = RequestError::new(kind, description);
                if kind == ErrorKind::ConnectionInterrupted {
                    self.wait_for_restore(request, &error);
                } else {
                    debug!(kind = request.kind(), %error, "request failed");
                }
                Err(error)
            }
        }
    }

    fn call(&self, request: &Request) -> EngineResponse {
        let object = self.builder.build(request);
        debug!(kind = request.kind(), "sending request");
        self.engine.send_request_sync(&object)
    }

    fn decode(&self, payload: &Variant) -> Result<Value, DecodeError> {
        let source = EngineUids(self.engine.as_ref());
        let decoder = Decoder::new(&self.uids, &source).with_observer(&TraceDrops);
        Ok(decoder.decode(payload)?.unwrap_or(Value::Null))
    }

    fn wait_for_restore(&self, request: &Request, error: &RequestError) {
        warn!(
            kind = request.kind(),
            %error,
            "connection to the analysis service interrupted, waiting up to {:?} for it to come back",
            self.restore_wait
        );
        if self.health.restore_signal().wait(self.restore_wait) {
            info!("analysis service is back; the interrupted request was not retried");
        } else {
            warn!(
                "analysis service not restored within {:?}",
                self.restore_wait
            );
        }
    }
}

struct TraceDrops;

impl DropObserver for TraceDrops {
    fn dropped(&self, reason: DropReason) {
        trace!(?reason, "dropped undecodable response node");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sourcekit_bridge_core::uid::Uid;
    use sourcekit_bridge_core::wire::WireObject;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct FixedEngine {
        response: EngineResponse,
        inits: AtomicUsize,
        handlers: AtomicUsize,
        last: Mutex<Option<WireObject>>,
    }

    impl FixedEngine {
        fn new(response: EngineResponse) -> Arc<Self> {
            Arc::new(Self {
                response,
                inits: AtomicUsize::new(0),
                handlers: AtomicUsize::new(0),
                last: Mutex::new(None),
            })
        }
    }

    impl Engine for FixedEngine {
        fn initialize(&self) {
            self.inits.fetch_add(1, Ordering::SeqCst);
        }

        fn send_request_sync(&self, request: &WireObject) -> EngineResponse {
            *self.last.lock().unwrap() = Some(request.clone());
            self.response.clone()
        }

        fn set_notification_handler(&self, _handler: crate::engine::NotificationHandler) {
            self.handlers.fetch_add(1, Ordering::SeqCst);
        }

        fn uid_bytes(&self, uid: Uid) -> Option<Vec<u8>> {
            match uid.0 {
                1 => Some(b"key.offset".to_vec()),
                _ => None,
            }
        }
    }

    fn quick_config() -> Config {
        let mut cfg = Config::default();
        cfg.engine.restore_wait_secs = 0.05;
        cfg
    }

    fn index_request() -> Request {
        Request::Index {
            file: "/a.swift".to_string(),
            arguments: vec![],
        }
    }

    #[test]
    fn test_setup_runs_once() {
        let engine = FixedEngine::new(EngineResponse::Value(Variant::Null));
        let session = Session::with_uid_cache(
            engine.clone(),
            &quick_config(),
            Arc::new(UidCache::new()),
        );
        session.ensure_ready();
        session.ensure_ready();
        assert_eq!(engine.inits.load(Ordering::SeqCst), 1);
        assert_eq!(engine.handlers.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_send_decodes_payload() {
        let engine = FixedEngine::new(EngineResponse::Value(Variant::Dictionary(vec![(
            Uid(1),
            Variant::Int64(5),
        )])));
        let session =
            Session::with_uid_cache(engine.clone(), &quick_config(), Arc::new(UidCache::new()));
        let value = session.send(&index_request());
        assert_eq!(value.get("key.offset"), Some(&Value::Int64(5)));
        let sent = engine.last.lock().unwrap().clone().unwrap();
        assert_eq!(
            sent.get("key.request"),
            Some(&WireObject::uid("source.request.indexsource"))
        );
    }

    #[test]
    fn test_null_payload_decodes_to_null() {
        let engine = FixedEngine::new(EngineResponse::Value(Variant::Null));
        let session = Session::with_uid_cache(engine, &quick_config(), Arc::new(UidCache::new()));
        assert_eq!(session.send_failable(&index_request()), Ok(Value::Null));
    }

    #[test]
    #[should_panic(expected = "request failed: no such file")]
    fn test_best_effort_send_panics_on_error() {
        let engine = FixedEngine::new(EngineResponse::error(ErrorKind::Failed, "no such file"));
        let session = Session::with_uid_cache(engine, &quick_config(), Arc::new(UidCache::new()));
        session.send(&index_request());
    }

    #[test]
    fn test_failable_send_classifies_errors() {
        for kind in [ErrorKind::Invalid, ErrorKind::Failed, ErrorKind::Cancelled, ErrorKind::Unknown] {
            let engine = FixedEngine::new(EngineResponse::error(kind, "boom"));
            let session =
                Session::with_uid_cache(engine, &quick_config(), Arc::new(UidCache::new()));
            let err = session.send_failable(&index_request()).unwrap_err();
            assert_eq!(err.kind(), kind);
            assert_eq!(err.description(), Some("boom"));
        }
    }

    #[test]
    fn test_unsupported_payload_is_unknown_error() {
        let engine = FixedEngine::new(EngineResponse::Value(Variant::Double(2.5)));
        let session = Session::with_uid_cache(engine, &quick_config(), Arc::new(UidCache::new()));
        let err = session.send_failable(&index_request()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unknown);
        assert!(err.description().unwrap().contains("double"));
    }
}
