use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use sourcekit_bridge::config::Config;
use sourcekit_bridge::engine::{Engine, EngineResponse, NotificationHandler};
use sourcekit_bridge::replay::ReplayEngine;
use sourcekit_bridge::request::{Request, WireObject};
use sourcekit_bridge::session::{self, Session};
use sourcekit_bridge::value::Value;
use sourcekit_bridge::{ErrorKind, RequestError};
use sourcekit_bridge_core::uid::{Uid, UidCache};
use sourcekit_bridge_core::variant::Variant;

/// Engine double with a fixed answer and a fixed UID registry. Optionally
/// announces a restoration from another thread after each answer.
struct ScriptedEngine {
    response: EngineResponse,
    names: HashMap<u64, &'static str>,
    restore_after: Option<Duration>,
    handler: Mutex<Option<NotificationHandler>>,
    initializations: AtomicUsize,
    registrations: AtomicUsize,
    lookups: AtomicUsize,
}

impl ScriptedEngine {
    fn new(response: EngineResponse) -> Self {
        Self {
            response,
            names: HashMap::from([
                (1, "key.kind"),
                (2, "key.name"),
                (3, "key.offset"),
                (4, "source.lang.swift.decl.function.free"),
            ]),
            restore_after: None,
            handler: Mutex::new(None),
            initializations: AtomicUsize::new(0),
            registrations: AtomicUsize::new(0),
            lookups: AtomicUsize::new(0),
        }
    }

    fn restoring_after(mut self, delay: Duration) -> Self {
        self.restore_after = Some(delay);
        self
    }
}

impl Engine for ScriptedEngine {
    fn initialize(&self) {
        self.initializations.fetch_add(1, Ordering::SeqCst);
    }

    fn send_request_sync(&self, _request: &WireObject) -> EngineResponse {
        if let Some(delay) = self.restore_after {
            if let Some(handler) = self.handler.lock().unwrap().clone() {
                std::thread::spawn(move || {
                    std::thread::sleep(delay);
                    handler(EngineResponse::Value(Variant::Null));
                });
            }
        }
        self.response.clone()
    }

    fn set_notification_handler(&self, handler: NotificationHandler) {
        self.registrations.fetch_add(1, Ordering::SeqCst);
        *self.handler.lock().unwrap() = Some(handler);
    }

    fn uid_bytes(&self, uid: Uid) -> Option<Vec<u8>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.names.get(&uid.0).map(|name| name.as_bytes().to_vec())
    }
}

fn config_with_wait(secs: f64) -> Config {
    let mut cfg = Config::default();
    cfg.engine.restore_wait_secs = secs;
    cfg
}

fn session_over(engine: Arc<ScriptedEngine>, wait_secs: f64) -> Session {
    Session::with_uid_cache(engine, &config_with_wait(wait_secs), Arc::new(UidCache::new()))
}

fn cursor_info() -> Request {
    Request::CursorInfo {
        file: "/tmp/main.swift".to_string(),
        offset: 5,
        arguments: vec!["-sdk".to_string(), "/sdk".to_string()],
    }
}

fn cursor_info_payload() -> Variant {
    Variant::Dictionary(vec![
        (Uid(1), Variant::Uid(Uid(4))),
        (Uid(2), Variant::string("foo")),
        (Uid(3), Variant::Int64(5)),
    ])
}

#[test]
fn test_cursor_info_round_trip() {
    let engine = Arc::new(ScriptedEngine::new(EngineResponse::Value(
        cursor_info_payload(),
    )));
    let session = session_over(engine, 10.0);

    let value = session.send_failable(&cursor_info()).unwrap();
    let expected = Value::from_iter([
        ("key.kind", Value::from("source.lang.swift.decl.function.free")),
        ("key.name", Value::from("foo")),
        ("key.offset", Value::Int64(5)),
    ]);
    assert_eq!(value, expected);
    assert!(Value::from_iter([("key.offset", Value::Int64(5))]).structurally_equals(&value));
    assert!(!value.structurally_equals(&Value::from_iter([("key.offset", Value::Int64(5))])));
}

#[test]
fn test_interruption_without_restoration_waits_for_the_ceiling() {
    let engine = Arc::new(ScriptedEngine::new(EngineResponse::error(
        ErrorKind::ConnectionInterrupted,
        "service crashed",
    )));
    let session = session_over(engine, 0.3);

    let start = Instant::now();
    let err = session.send_failable(&cursor_info()).unwrap_err();
    assert!(start.elapsed() >= Duration::from_millis(300));
    assert_eq!(
        err,
        RequestError::ConnectionInterrupted(Some("service crashed".to_string()))
    );
}

#[test]
fn test_interruption_with_restoration_returns_early() {
    let engine = Arc::new(
        ScriptedEngine::new(EngineResponse::error(ErrorKind::ConnectionInterrupted, "down"))
            .restoring_after(Duration::from_millis(50)),
    );
    let session = session_over(engine, 10.0);

    let start = Instant::now();
    let err = session.send_failable(&cursor_info()).unwrap_err();
    let elapsed = start.elapsed();
    assert_eq!(err.kind(), ErrorKind::ConnectionInterrupted);
    assert!(elapsed >= Duration::from_millis(50));
    assert!(elapsed < Duration::from_secs(5), "waited {:?}", elapsed);
}

#[test]
fn test_other_errors_do_not_wait() {
    let engine = Arc::new(ScriptedEngine::new(EngineResponse::error(
        ErrorKind::Cancelled,
        "cancelled by user",
    )));
    let session = session_over(engine, 10.0);

    let start = Instant::now();
    let err = session.send_failable(&cursor_info()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Cancelled);
    assert!(start.elapsed() < Duration::from_secs(5));
}

#[test]
fn test_concurrent_sends_share_the_uid_cache() {
    let engine = Arc::new(ScriptedEngine::new(EngineResponse::Value(
        cursor_info_payload(),
    )));
    let session = session_over(engine.clone(), 10.0);
    let first = session.send(&cursor_info());

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(|| session.send(&cursor_info())))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), first);
        }
    });

    // Four distinct UIDs were named once, before the threads started.
    assert_eq!(session.uid_cache().len(), 4);
    assert_eq!(engine.lookups.load(Ordering::SeqCst), 4);
}

#[test]
fn test_concurrent_setup_runs_once() {
    let engine = Arc::new(ScriptedEngine::new(EngineResponse::Value(Variant::Null)));
    let session = session_over(engine.clone(), 10.0);

    std::thread::scope(|scope| {
        for _ in 0..8 {
            scope.spawn(|| session.ensure_ready());
        }
    });

    assert_eq!(engine.initializations.load(Ordering::SeqCst), 1);
    assert_eq!(engine.registrations.load(Ordering::SeqCst), 1);
}

#[test]
fn test_sessions_over_one_engine_share_setup_and_restoration() {
    let engine = Arc::new(
        ScriptedEngine::new(EngineResponse::error(ErrorKind::ConnectionInterrupted, "down"))
            .restoring_after(Duration::from_millis(50)),
    );
    let first = session_over(engine.clone(), 10.0);
    let second = session_over(engine.clone(), 10.0);
    second.ensure_ready();

    assert_eq!(engine.initializations.load(Ordering::SeqCst), 1);
    assert_eq!(engine.registrations.load(Ordering::SeqCst), 1);

    for session in [&first, &second] {
        let start = Instant::now();
        let err = session.send_failable(&cursor_info()).unwrap_err();
        let elapsed = start.elapsed();
        assert_eq!(err.kind(), ErrorKind::ConnectionInterrupted);
        assert!(elapsed < Duration::from_secs(5), "waited {:?}", elapsed);
    }
}

#[test]
fn test_oversized_restore_wait_does_not_panic() {
    let engine = Arc::new(ScriptedEngine::new(EngineResponse::Value(Variant::Null)));
    let session = session_over(engine, 1e30);
    assert_eq!(session.restore_wait(), Duration::MAX);
    assert_eq!(session.send_failable(&cursor_info()), Ok(Value::Null));
}

#[test]
#[should_panic(expected = "undecodable response")]
fn test_best_effort_send_panics_on_unsupported_payload() {
    let engine = Arc::new(ScriptedEngine::new(EngineResponse::Value(
        Variant::Dictionary(vec![(Uid(3), Variant::Data(vec![1, 2]))]),
    )));
    let session = session_over(engine, 10.0);
    session.send(&cursor_info());
}

#[test]
fn test_replayed_interruption_then_result() {
    let engine = Arc::new(
        ReplayEngine::from_json_str(
            r#"{"responses": [
                {"error": {"kind": "connection_interrupted", "description": "crashed"}, "restore": true},
                {"result": {"key.kind": {"$uid": "source.lang.swift.decl.class"}}}
            ]}"#,
        )
        .unwrap(),
    );
    let session = Session::with_uid_cache(
        engine.clone(),
        &config_with_wait(10.0),
        Arc::new(UidCache::new()),
    );

    let start = Instant::now();
    let err = session.send_failable(&cursor_info()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConnectionInterrupted);
    assert!(start.elapsed() < Duration::from_secs(5));

    let value = session.send_failable(&cursor_info()).unwrap();
    assert_eq!(
        value.get("key.kind").and_then(Value::as_str),
        Some("source.lang.swift.decl.class")
    );
    assert_eq!(engine.requests().len(), 2);
    assert_eq!(engine.initializations(), 1);
}

#[test]
fn test_installed_session_is_process_wide() {
    let engine: Arc<dyn Engine> = Arc::new(ReplayEngine::new());
    let installed = session::install(engine, &Config::default());
    let again = session::install(Arc::new(ReplayEngine::new()), &Config::default());
    assert!(std::ptr::eq(installed, again));
    assert!(session::shared().is_some_and(|s| std::ptr::eq(s, installed)));

    let err = installed
        .send_failable(&Request::Index {
            file: "/a.swift".to_string(),
            arguments: vec![],
        })
        .unwrap_err();
    assert_eq!(
        err,
        RequestError::Failed(Some("replay fixture exhausted".to_string()))
    );
}
