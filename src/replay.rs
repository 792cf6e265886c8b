//! An [`Engine`] that answers from a recorded script.
//!
//! A fixture file lists the engine's answers in order. Each step is either a
//! result or an error, and may ask the engine to announce a restoration
//! right after answering:
//!
//! ```json
//! {
//!   "responses": [
//!     { "error": { "kind": "connection_interrupted" }, "restore": true },
//!     { "result": { "key.kind": { "$uid": "source.lang.swift.decl.class" } } }
//!   ]
//! }
//! ```
//!
//! Result bodies use the encoding described in [`crate::fixture`]. Every
//! request sent is recorded and can be inspected with
//! [`ReplayEngine::requests`].

use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use sourcekit_bridge_core::error::ErrorKind;
use sourcekit_bridge_core::uid::Uid;
use sourcekit_bridge_core::variant::Variant;
use sourcekit_bridge_core::wire::WireObject;
use tracing::debug;

use crate::engine::{Engine, EngineResponse, NotificationHandler};
use crate::fixture::{variant_from_json, UidTable};

#[derive(Debug, Deserialize)]
struct FixtureFile {
    #[serde(default)]
    responses: Vec<FixtureStep>,
}

#[derive(Debug, Deserialize)]
struct FixtureStep {
    #[serde(default)]
    result: serde_json::Value,
    #[serde(default)]
    error: Option<FixtureError>,
    #[serde(default)]
    restore: bool,
}

#[derive(Debug, Deserialize)]
struct FixtureError {
    kind: String,
    #[serde(default)]
    description: Option<String>,
}

struct Step {
    response: EngineResponse,
    restore: bool,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Default)]
pub struct ReplayEngine {
    steps: Mutex<VecDeque<Step>>,
    uids: Mutex<UidTable>,
    requests: Mutex<Vec<WireObject>>,
    handler: Mutex<Option<NotificationHandler>>,
    initializations: AtomicUsize,
}

impl std::fmt::Debug for ReplayEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReplayEngine")
            .field("remaining", &self.remaining())
            .field("requests", &lock(&self.requests).len())
            .field("handler_registered", &lock(&self.handler).is_some())
            .field("initializations", &self.initializations())
            .finish()
    }
}

impl ReplayEngine {
    /// An engine with an empty script. Every request fails until responses
    /// are pushed.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read fixture: {}", path.display()))?;
        Self::from_json_str(&content)
            .with_context(|| format!("Invalid fixture: {}", path.display()))
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let file: FixtureFile =
            serde_json::from_str(content).with_context(|| "Failed to parse fixture JSON")?;
        let engine = Self::new();
        for (index, step) in file.responses.into_iter().enumerate() {
            if step.error.is_some() && !step.result.is_null() {
                bail!("responses[{}]: a step has either a result or an error, not both", index);
            }
            let response = match step.error {
                Some(error) => EngineResponse::Error {
                    kind: ErrorKind::from_tag(&error.kind),
                    description: error.description,
                },
                None => {
                    let variant = variant_from_json(&step.result, &mut lock(&engine.uids))
                        .with_context(|| format!("responses[{}]", index))?;
                    EngineResponse::Value(variant)
                }
            };
            engine.push(response, step.restore);
        }
        Ok(engine)
    }

    /// Queue a result, encoded as in [`crate::fixture`].
    pub fn push_response(&self, result: &serde_json::Value) -> Result<()> {
        let variant = variant_from_json(result, &mut lock(&self.uids))?;
        self.push(EngineResponse::Value(variant), false);
        Ok(())
    }

    /// Queue an error. With `restore`, the engine announces a restoration
    /// after returning it.
    pub fn push_error(&self, kind: ErrorKind, description: Option<&str>, restore: bool) {
        let response = EngineResponse::Error {
            kind,
            description: description.map(str::to_string),
        };
        self.push(response, restore);
    }

    /// Queue a pre-built response.
    pub fn push(&self, response: EngineResponse, restore: bool) {
        lock(&self.steps).push_back(Step { response, restore });
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<WireObject> {
        lock(&self.requests).clone()
    }

    pub fn remaining(&self) -> usize {
        lock(&self.steps).len()
    }

    pub fn initializations(&self) -> usize {
        self.initializations.load(Ordering::SeqCst)
    }

    /// Announce a restoration from a separate thread, as the real engine
    /// does.
    pub fn restore(&self) {
        let Some(handler) = lock(&self.handler).clone() else {
            debug!("restoration announced with no handler registered");
            return;
        };
        std::thread::spawn(move || handler(EngineResponse::Value(Variant::Null)));
    }
}

impl Engine for ReplayEngine {
    fn initialize(&self) {
        self.initializations.fetch_add(1, Ordering::SeqCst);
    }

    fn send_request_sync(&self, request: &WireObject) -> EngineResponse {
        lock(&self.requests).push(request.clone());
        let Some(step) = lock(&self.steps).pop_front() else {
            return EngineResponse::error(ErrorKind::Failed, "replay fixture exhausted");
        };
        if step.restore {
            self.restore();
        }
        step.response
    }

    fn set_notification_handler(&self, handler: NotificationHandler) {
        *lock(&self.handler) = Some(handler);
    }

    fn uid_bytes(&self, uid: Uid) -> Option<Vec<u8>> {
        lock(&self.uids).name(uid).map(|name| name.as_bytes().to_vec())
    }
}
