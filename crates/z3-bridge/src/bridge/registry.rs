//! Host-side registry of contexts whose error handler is installed.
//!
//! libz3's handler type carries no user-data pointer, so the adapter finds the
//! host state for a context by looking up the context handle itself.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;
use z3_sys::Z3_context;

use crate::error::NativeError;

/// Host callback invoked synchronously for every native error on a context.
pub type ErrorObserver = Arc<dyn Fn(&NativeError) + Send + Sync + 'static>;

/// Identity of a native context, derived from its handle address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextId(usize);

impl ContextId {
    /// Identity of a raw context handle.
    #[must_use]
    pub fn of(raw: Z3_context) -> Self {
        Self(raw as usize)
    }

    /// Build an identity from a bare address.
    #[must_use]
    pub const fn from_addr(addr: usize) -> Self {
        Self(addr)
    }

    /// Handle address.
    #[must_use]
    pub const fn addr(self) -> usize {
        self.0
    }

    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ctx@{:#x}", self.0)
    }
}

/// Registry entry for one installed context.
#[derive(Default)]
struct HandlerEntry {
    /// Number of times installation was requested (re-installs are no-ops).
    installs: u32,
    observer: Option<ErrorObserver>,
}

/// Concurrent map from context identity to its host-side error state.
#[derive(Default)]
pub struct HandlerRegistry {
    entries: RwLock<HashMap<ContextId, HandlerEntry>>,
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("contexts", &self.len())
            .finish()
    }
}

impl HandlerRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an installation. Returns true if the context was not yet present.
    pub fn register(&self, id: ContextId) -> bool {
        let mut entries = self.entries.write();
        let entry = entries.entry(id).or_default();
        entry.installs = entry.installs.saturating_add(1);
        entry.installs == 1
    }

    /// Drop a context's entry. Returns true if an entry was removed.
    pub fn unregister(&self, id: ContextId) -> bool {
        self.entries.write().remove(&id).is_some()
    }

    #[must_use]
    pub fn is_installed(&self, id: ContextId) -> bool {
        self.entries.read().contains_key(&id)
    }

    /// How many times installation was requested for `id` (0 if absent).
    #[must_use]
    pub fn install_count(&self, id: ContextId) -> u32 {
        self.entries.read().get(&id).map_or(0, |entry| entry.installs)
    }

    /// Attach an observer. Returns false if the context is not installed.
    pub fn set_observer(&self, id: ContextId, observer: ErrorObserver) -> bool {
        match self.entries.write().get_mut(&id) {
            Some(entry) => {
                entry.observer = Some(observer);
                true
            }
            None => false,
        }
    }

    /// Detach the observer, keeping the installation.
    pub fn clear_observer(&self, id: ContextId) {
        if let Some(entry) = self.entries.write().get_mut(&id) {
            entry.observer = None;
        }
    }

    /// Look up the entry for `id`.
    ///
    /// The outer `Option` is `None` when the context is unknown; the inner one
    /// is the observer. The observer is cloned out so callers run it without
    /// holding the lock.
    #[must_use]
    pub fn lookup(&self, id: ContextId) -> Option<Option<ErrorObserver>> {
        self.entries
            .read()
            .get(&id)
            .map(|entry| entry.observer.clone())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

static GLOBAL_REGISTRY: OnceLock<HandlerRegistry> = OnceLock::new();

/// Process-wide handler registry consulted by the adapter.
#[must_use]
pub fn global_registry() -> &'static HandlerRegistry {
    GLOBAL_REGISTRY.get_or_init(HandlerRegistry::new)
}
