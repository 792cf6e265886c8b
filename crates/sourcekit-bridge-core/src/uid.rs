//! UID interning.
//!
//! The engine identifies keys, declaration kinds, and syntax kinds with
//! opaque UIDs. Resolving a UID to its name costs an engine call plus a
//! string decode, and the same handful of UIDs appear in every response,
//! so resolutions are memoized in a [`UidCache`].
//!
//! The cache is shared, read-mostly, write-once-per-key state: a UID is
//! only ever introduced by a single engine session, so an entry is never
//! invalidated or evicted once written. Lookups take a read lock; a miss
//! resolves outside the lock and then inserts under a write lock, keeping
//! whichever entry landed first if two threads raced on the same UID.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use crate::known::canonicalize;

/// Opaque engine-assigned identifier. Valid for the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Uid(pub u64);

impl std::fmt::Display for Uid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "uid#{}", self.0)
    }
}

/// Engine-side lookup of the raw name behind a UID.
pub trait UidSource {
    /// Returns the name's bytes, or `None` if the engine cannot name `uid`.
    fn uid_bytes(&self, uid: Uid) -> Option<Vec<u8>>;
}

impl<F> UidSource for F
where
    F: Fn(Uid) -> Option<Vec<u8>>,
{
    fn uid_bytes(&self, uid: Uid) -> Option<Vec<u8>> {
        self(uid)
    }
}

/// Memoized `Uid → canonical name` map.
pub struct UidCache {
    entries: RwLock<HashMap<Uid, Arc<str>>>,
}

static GLOBAL: OnceLock<Arc<UidCache>> = OnceLock::new();

impl UidCache {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// The process-wide cache used by sessions that don't supply their own.
    pub fn global() -> Arc<UidCache> {
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(UidCache::new())))
    }

    /// Resolve `uid` to its canonical name.
    ///
    /// On a miss the raw bytes are fetched from `source` and decoded as
    /// UTF-8. Names listed in [`crate::known`] are replaced by their
    /// enumeration string. Returns `None` when the engine has no name for
    /// the UID or the bytes are not valid UTF-8; nothing is cached then.
    pub fn resolve(&self, uid: Uid, source: &dyn UidSource) -> Option<Arc<str>> {
        if let Some(hit) = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&uid)
        {
            return Some(Arc::clone(hit));
        }

        let bytes = source.uid_bytes(uid)?;
        let raw = std::str::from_utf8(&bytes).ok()?;
        let name: Arc<str> = Arc::from(canonicalize(raw).unwrap_or(raw));

        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        Some(Arc::clone(entries.entry(uid).or_insert(name)))
    }

    /// Cached name for `uid`, without consulting the engine.
    pub fn cached(&self, uid: Uid) -> Option<Arc<str>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&uid)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for UidCache {
    fn default() -> Self {
        Self::new()
    }
}
