//! Solver contexts.

use std::sync::Arc;

use z3_sys::{Z3_context, Z3_del_context, Z3_get_error_msg, Z3_mk_context};

use crate::bridge::{self, ContextId, global_registry};
use crate::config::Config;
use crate::error::{ErrorCode, NativeError, SolverError};
use crate::util::z3_string;

/// Owned `Z3_context` with the error bridge installed.
///
/// Every value created from a context (symbols, sorts, ASTs, solvers,
/// models) borrows it, so the context outlives them. The raw handle makes the
/// type `!Send` and `!Sync`: a context is driven from one thread.
#[derive(Debug)]
pub struct Context {
    raw: Z3_context,
    id: ContextId,
}

impl Context {
    /// Create a context and install the error handler on it.
    ///
    /// # Errors
    ///
    /// [`SolverError::NullHandle`] if libz3 cannot allocate the context,
    /// [`SolverError::Registration`] if the handler cannot be installed.
    pub fn new(config: &Config) -> Result<Self, SolverError> {
        let ctx = Self::new_without_error_handler(config)?;
        // SAFETY: `ctx.raw` was just created and is live.
        unsafe { bridge::install_error_handler(ctx.raw) }?;
        Ok(ctx)
    }

    /// Create a context from an empty configuration.
    pub fn with_default_config() -> Result<Self, SolverError> {
        Self::new(&Config::new()?)
    }

    /// Create a context WITHOUT installing the error handler.
    ///
    /// Native errors on such a context go to libz3's default handler, which
    /// prints the message and terminates the process. Behaviour after an
    /// error is outside the binding's contract. This exists so that default
    /// can be observed in a child process; call
    /// [`Context::install_error_handler`] before using it for anything else.
    #[doc(hidden)]
    pub fn new_without_error_handler(config: &Config) -> Result<Self, SolverError> {
        // SAFETY: `config.raw()` is live for the duration of the call.
        let raw = unsafe { Z3_mk_context(config.raw()) };
        if raw.is_null() {
            return Err(SolverError::NullHandle {
                what: "Z3_mk_context",
            });
        }
        let id = ContextId::of(raw);
        bridge::discard_stale(id);
        Ok(Self { raw, id })
    }

    /// Install (or re-install) the error handler. Idempotent.
    pub fn install_error_handler(&self) -> Result<(), SolverError> {
        // SAFETY: `raw` is live for `self`.
        unsafe { bridge::install_error_handler(self.raw) }.map(|_| ())
    }

    #[must_use]
    pub fn has_error_handler(&self) -> bool {
        bridge::is_installed(self.id)
    }

    /// Attach a host callback that sees each native error on this context
    /// at the moment libz3 reports it.
    ///
    /// The callback runs inside the native call, so it must be quick and
    /// must not touch the context. The error is also returned as `Err` by the
    /// wrapper that triggered it. A panicking observer is contained.
    ///
    /// # Errors
    ///
    /// [`SolverError::Registration`] if the handler is not installed.
    pub fn set_error_observer<F>(&self, observer: F) -> Result<(), SolverError>
    where
        F: Fn(&NativeError) + Send + Sync + 'static,
    {
        if global_registry().set_observer(self.id, Arc::new(observer)) {
            Ok(())
        } else {
            Err(SolverError::Registration(format!(
                "no error handler installed on {}",
                self.id
            )))
        }
    }

    pub fn clear_error_observer(&self) {
        global_registry().clear_observer(self.id);
    }

    /// Message libz3 associates with `code` on this context.
    ///
    /// Like the native accessor, this is only meaningful while an error is
    /// being handled; use the message carried by [`NativeError`] otherwise.
    pub fn error_message(&self, code: ErrorCode) -> Option<String> {
        let native = native_code(code)?;
        // SAFETY: `raw` is live; the accessor is read-only.
        let ptr = unsafe { Z3_get_error_msg(self.raw, native) };
        // SAFETY: libz3 returns a NUL-terminated static or context-owned string.
        Some(unsafe { z3_string(ptr) })
    }

    #[must_use]
    pub fn id(&self) -> ContextId {
        self.id
    }

    /// Raw handle. Invalid once `self` is dropped.
    #[must_use]
    pub fn raw(&self) -> Z3_context {
        self.raw
    }

    /// Run one native call against this context through the error bridge.
    pub(crate) fn guard<T>(&self, call: impl FnOnce(Z3_context) -> T) -> Result<T, SolverError> {
        let raw = self.raw;
        bridge::guard(|| call(raw))
    }

    /// Reject operands from another context before calling into libz3.
    pub(crate) fn check_same(&self, other: &Context) -> Result<(), SolverError> {
        if self.id == other.id {
            Ok(())
        } else {
            Err(SolverError::ContextMismatch {
                left: self.id,
                right: other.id,
            })
        }
    }
}

impl Drop for Context {
    fn drop(&mut self) {
        // Unregister while the address still belongs to this context.
        bridge::forget(self.id);
        // SAFETY: `raw` was created by Z3_mk_context and is deleted once; all
        // borrowing values are gone by now.
        unsafe { Z3_del_context(self.raw) };
    }
}

fn native_code(code: ErrorCode) -> Option<z3_sys::ErrorCode> {
    use z3_sys::ErrorCode as N;
    Some(match code.value() {
        0 => N::OK,
        1 => N::SortError,
        2 => N::IOB,
        3 => N::InvalidArg,
        4 => N::ParserError,
        5 => N::NoParser,
        6 => N::InvalidPattern,
        7 => N::MemoutFail,
        8 => N::FileAccessError,
        9 => N::InternalFatal,
        10 => N::InvalidUsage,
        11 => N::DecRefError,
        12 => N::Exception,
        _ => return None,
    })
}
