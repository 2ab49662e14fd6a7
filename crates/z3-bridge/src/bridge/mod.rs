//! Error bridge between libz3 and host error handling.
//!
//! libz3 has no error return channel: a failing API call invokes the
//! context's error handler and then returns a placeholder value. The bridge
//! installs [`error_adapter`] as that handler. The adapter parks a
//! [`NativeError`] in the calling thread's pending slot, and [`guard`] turns
//! the parked error into `Err` as soon as the native call returns.
//!
//! ```text
//! wrapper -> guard(clear slot) -> Z3_* call -> error_adapter -> slot
//!                              <- placeholder <-
//! wrapper <- guard(take slot) = Err(SolverError::Native)
//! ```

mod registry;
mod slot;
mod stats;

use std::panic::{AssertUnwindSafe, catch_unwind};

use z3_sys::{Z3_context, Z3_get_error_msg, Z3_set_error_handler};

use crate::error::{NativeError, SolverError};
use crate::util::z3_string;

pub use registry::{ContextId, ErrorObserver, HandlerRegistry, global_registry};
pub use slot::has_pending;
pub use stats::{BRIDGE_STATS, BridgeStats, BridgeStatsSnapshot};

/// The function registered with `Z3_set_error_handler`.
///
/// The signature is fixed by `Z3_error_handler`. The adapter must not unwind
/// into libz3's frames and must not issue operations on `raw` other than the
/// read-only message accessor.
///
/// # Safety
///
/// Only libz3 should call this, passing the context that raised the error.
pub unsafe extern "C" fn error_adapter(raw: Z3_context, code: z3_sys::ErrorCode) {
    let context = ContextId::of(raw);
    let message = if context.is_null() {
        String::new()
    } else {
        // SAFETY: libz3 hands us the live context that raised the error; the
        // message text is only valid for the duration of this callback.
        unsafe { z3_string(Z3_get_error_msg(raw, code)) }
    };
    let err = NativeError {
        context,
        code: code.into(),
        message,
    };

    match global_registry().lookup(context) {
        Some(Some(observer)) => notify(&observer, &err),
        Some(None) => {}
        None => {
            BridgeStats::bump(&BRIDGE_STATS.unrouted);
            tracing::warn!(context = %err.context, code = %err.code, "z3 error on unregistered context");
        }
    }

    let code = err.code;
    if slot::record(err) {
        BridgeStats::bump(&BRIDGE_STATS.delivered);
        tracing::debug!(%context, %code, "z3 error parked");
    } else {
        BridgeStats::bump(&BRIDGE_STATS.coalesced);
        tracing::debug!(%context, %code, "z3 error coalesced into pending error");
    }
}

fn notify(observer: &ErrorObserver, err: &NativeError) {
    if catch_unwind(AssertUnwindSafe(|| observer(err))).is_err() {
        BridgeStats::bump(&BRIDGE_STATS.observer_panics);
        tracing::warn!(context = %err.context, code = %err.code, "error observer panicked");
    }
}

/// Register [`error_adapter`] as `raw`'s error handler.
///
/// Installing twice is harmless: libz3 stores a single handler per context
/// and the registry keeps a single entry, so one native error is delivered
/// once.
///
/// # Errors
///
/// [`SolverError::Registration`] if `raw` is null. This is a setup failure;
/// the context must not be used.
///
/// # Safety
///
/// `raw` must be null or a live context that has not been deleted.
pub unsafe fn install_error_handler(raw: Z3_context) -> Result<ContextId, SolverError> {
    let id = ContextId::of(raw);
    if id.is_null() {
        return Err(SolverError::Registration(
            "cannot install an error handler on a null context".to_string(),
        ));
    }
    // SAFETY: caller guarantees `raw` is live.
    unsafe { Z3_set_error_handler(raw, Some(error_adapter)) };
    if global_registry().register(id) {
        tracing::debug!(context = %id, "error handler installed");
    } else {
        tracing::debug!(context = %id, "error handler re-installed");
    }
    Ok(id)
}

/// Forget a context's registry entry. Called just before the native context
/// is deleted, while its address is still unique.
pub(crate) fn forget(id: ContextId) {
    if global_registry().unregister(id) {
        tracing::debug!(context = %id, "error handler entry dropped");
    }
}

/// Drop any entry already keyed by a freshly created context's address.
///
/// No live context can own that address, so such an entry belongs to a
/// deleted context and must not route the new context's errors.
pub(crate) fn discard_stale(id: ContextId) {
    if global_registry().unregister(id) {
        tracing::warn!(context = %id, "discarded stale error handler entry");
    }
}

/// True if [`install_error_handler`] has run for `id` and it is still live.
#[must_use]
pub fn is_installed(id: ContextId) -> bool {
    global_registry().is_installed(id)
}

/// Run one native call and convert any error delivered during it into `Err`.
///
/// The slot is cleared first, so a stale error left by an unguarded call is
/// never attributed to this one. When the adapter fired, the native return
/// value is discarded.
///
/// # Errors
///
/// [`SolverError::Native`] carrying the code and originating context.
pub fn guard<T>(call: impl FnOnce() -> T) -> Result<T, SolverError> {
    slot::clear();
    let value = call();
    match slot::take() {
        Some(err) => Err(SolverError::Native(err)),
        None => Ok(value),
    }
}
