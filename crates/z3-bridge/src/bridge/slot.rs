//! Per-thread pending-error slot.
//!
//! The adapter runs on whichever thread issued the failing native call, so the
//! error is parked in that thread's slot and picked up by the same thread's
//! guard once the native call returns. No global mutable cell is shared.

use std::cell::RefCell;

use crate::error::NativeError;

thread_local! {
    static PENDING: RefCell<Option<NativeError>> = const { RefCell::new(None) };
}

/// Park an error for the current thread.
///
/// The first error of a call is kept. Returns false if the slot was already
/// occupied and `err` was discarded.
pub(crate) fn record(err: NativeError) -> bool {
    PENDING.with(|slot| {
        let mut slot = slot.borrow_mut();
        if slot.is_some() {
            return false;
        }
        *slot = Some(err);
        true
    })
}

/// Remove and return the parked error, if any.
pub(crate) fn take() -> Option<NativeError> {
    PENDING.with(|slot| slot.borrow_mut().take())
}

pub(crate) fn clear() {
    PENDING.with(|slot| {
        slot.borrow_mut().take();
    });
}

/// True if the current thread has an error parked.
#[must_use]
pub fn has_pending() -> bool {
    PENDING.with(|slot| slot.borrow().is_some())
}
