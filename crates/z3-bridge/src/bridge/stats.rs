//! Lock-free delivery counters for the error adapter.

use std::sync::atomic::{AtomicU64, Ordering};

/// Global atomic counters updated from inside the adapter.
pub struct BridgeStats {
    /// Signals recorded into a pending slot.
    pub delivered: AtomicU64,
    /// Signals for a context with no registry entry.
    pub unrouted: AtomicU64,
    /// Signals dropped because the slot already held an error from the same call.
    pub coalesced: AtomicU64,
    /// Observer callbacks that panicked and were contained.
    pub observer_panics: AtomicU64,
}

/// Point-in-time copy of [`BridgeStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BridgeStatsSnapshot {
    pub delivered: u64,
    pub unrouted: u64,
    pub coalesced: u64,
    pub observer_panics: u64,
}

impl BridgeStats {
    pub const fn new() -> Self {
        Self {
            delivered: AtomicU64::new(0),
            unrouted: AtomicU64::new(0),
            coalesced: AtomicU64::new(0),
            observer_panics: AtomicU64::new(0),
        }
    }

    pub(crate) fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    #[must_use]
    pub fn snapshot(&self) -> BridgeStatsSnapshot {
        BridgeStatsSnapshot {
            delivered: self.delivered.load(Ordering::Relaxed),
            unrouted: self.unrouted.load(Ordering::Relaxed),
            coalesced: self.coalesced.load(Ordering::Relaxed),
            observer_panics: self.observer_panics.load(Ordering::Relaxed),
        }
    }
}

impl Default for BridgeStats {
    fn default() -> Self {
        Self::new()
    }
}

impl BridgeStatsSnapshot {
    /// Counter growth since an earlier snapshot.
    #[must_use]
    pub fn since(self, earlier: Self) -> Self {
        Self {
            delivered: self.delivered.saturating_sub(earlier.delivered),
            unrouted: self.unrouted.saturating_sub(earlier.unrouted),
            coalesced: self.coalesced.saturating_sub(earlier.coalesced),
            observer_panics: self.observer_panics.saturating_sub(earlier.observer_panics),
        }
    }
}

/// Global bridge counters.
pub static BRIDGE_STATS: BridgeStats = BridgeStats::new();
