//! The synchronous call boundary to the analysis engine.
//!
//! [`Engine`] is the seam between this crate and the engine process. An
//! implementation wraps the engine's native entry points (loaded by an
//! external collaborator); [`crate::replay::ReplayEngine`] implements it
//! over recorded fixtures.
//!
//! # Contract
//!
//! | Method | Engine behavior |
//! |--------|-----------------|
//! | [`initialize`](Engine::initialize) | Establish the engine session. Called once per [`Session`](crate::session::Session) |
//! | [`send_request_sync`](Engine::send_request_sync) | One blocking round trip. No pipelining, no cancellation |
//! | [`set_notification_handler`](Engine::set_notification_handler) | Register a callback invoked on an engine-owned thread |
//! | [`uid_bytes`](UidSource::uid_bytes) | Name a UID that appeared in a response |

use std::sync::Arc;

use sourcekit_bridge_core::error::{ErrorKind, RequestError};
use sourcekit_bridge_core::uid::{Uid, UidSource};
use sourcekit_bridge_core::variant::Variant;
use sourcekit_bridge_core::wire::WireObject;

/// Response envelope: either a payload or an engine-reported error.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineResponse {
    Value(Variant),
    Error {
        kind: ErrorKind,
        description: Option<String>,
    },
}

impl EngineResponse {
    pub fn error(kind: ErrorKind, description: impl Into<String>) -> Self {
        EngineResponse::Error {
            kind,
            description: Some(description.into()),
        }
    }

    /// The envelope's error flag.
    pub fn is_error(&self) -> bool {
        matches!(self, EngineResponse::Error { .. })
    }

    pub fn into_result(self) -> Result<Variant, RequestError> {
        match self {
            EngineResponse::Value(v) => Ok(v),
            EngineResponse::Error { kind, description } => {
                Err(RequestError::new(kind, description))
            }
        }
    }
}

/// Callback the engine invokes with each notification it emits.
///
/// Runs on a thread owned by the engine, never on the caller's thread.
pub type NotificationHandler = Arc<dyn Fn(EngineResponse) + Send + Sync>;

/// A source-analysis engine reachable through blocking calls.
pub trait Engine: Send + Sync {
    /// Establish the engine session.
    fn initialize(&self);

    /// Submit one request and block until the engine answers.
    fn send_request_sync(&self, request: &WireObject) -> EngineResponse;

    /// Install the notification callback, replacing any previous one.
    fn set_notification_handler(&self, handler: NotificationHandler);

    /// Raw name bytes for `uid`, or `None` if the engine cannot name it.
    fn uid_bytes(&self, uid: Uid) -> Option<Vec<u8>>;
}

/// Exposes an [`Engine`]'s UID lookup to the decoder.
pub(crate) struct EngineUids<'a>(pub &'a dyn Engine);

impl UidSource for EngineUids<'_> {
    fn uid_bytes(&self, uid: Uid) -> Option<Vec<u8>> {
        self.0.uid_bytes(uid)
    }
}
