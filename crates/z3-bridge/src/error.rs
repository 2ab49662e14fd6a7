//! Error values produced at the native boundary.
//!
//! libz3 reports failure only through its error-handler callback. The bridge
//! captures each callback as a [`NativeError`] and the wrapper that issued the
//! native call returns it as [`SolverError::Native`].

use std::ffi::NulError;
use std::fmt;

use thiserror::Error;

use crate::bridge::ContextId;

/// Numeric error code reported by libz3.
///
/// The value is opaque to the bridge. The associated constants mirror the
/// numbering of `Z3_error_code` so codes can be compared and printed, but no
/// host-side classification is derived from them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ErrorCode(pub u32);

impl ErrorCode {
    pub const OK: Self = Self(0);
    pub const SORT_ERROR: Self = Self(1);
    pub const IOB: Self = Self(2);
    pub const INVALID_ARG: Self = Self(3);
    pub const PARSER_ERROR: Self = Self(4);
    pub const NO_PARSER: Self = Self(5);
    pub const INVALID_PATTERN: Self = Self(6);
    pub const MEMOUT_FAIL: Self = Self(7);
    pub const FILE_ACCESS_ERROR: Self = Self(8);
    pub const INTERNAL_FATAL: Self = Self(9);
    pub const INVALID_USAGE: Self = Self(10);
    pub const DEC_REF_ERROR: Self = Self(11);
    pub const EXCEPTION: Self = Self(12);

    /// Raw numeric value.
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }

    /// libz3's name for this code, if it is one the library defines.
    #[must_use]
    pub const fn name(self) -> Option<&'static str> {
        match self.0 {
            0 => Some("Z3_OK"),
            1 => Some("Z3_SORT_ERROR"),
            2 => Some("Z3_IOB"),
            3 => Some("Z3_INVALID_ARG"),
            4 => Some("Z3_PARSER_ERROR"),
            5 => Some("Z3_NO_PARSER"),
            6 => Some("Z3_INVALID_PATTERN"),
            7 => Some("Z3_MEMOUT_FAIL"),
            8 => Some("Z3_FILE_ACCESS_ERROR"),
            9 => Some("Z3_INTERNAL_FATAL"),
            10 => Some("Z3_INVALID_USAGE"),
            11 => Some("Z3_DEC_REF_ERROR"),
            12 => Some("Z3_EXCEPTION"),
            _ => None,
        }
    }
}

impl From<z3_sys::ErrorCode> for ErrorCode {
    fn from(code: z3_sys::ErrorCode) -> Self {
        Self(code as u32)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{name} ({})", self.0),
            None => write!(f, "code {}", self.0),
        }
    }
}

/// One error signal delivered by libz3 through the error handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeError {
    /// Context the error originated from.
    pub context: ContextId,
    /// Code passed to the handler.
    pub code: ErrorCode,
    /// Message text captured while the handler was running.
    pub message: String,
}

impl fmt::Display for NativeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "z3 error {} on {}", self.code, self.context)
        } else {
            write!(
                f,
                "z3 error {} on {}: {}",
                self.code, self.context, self.message
            )
        }
    }
}

impl std::error::Error for NativeError {}

/// Errors returned by every fallible binding operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolverError {
    /// libz3 invoked the error handler during the call.
    #[error(transparent)]
    Native(#[from] NativeError),
    /// The error handler could not be installed; the context is unusable.
    #[error("error handler registration failed: {0}")]
    Registration(String),
    /// A native constructor returned a null handle.
    #[error("{what} returned a null handle")]
    NullHandle { what: &'static str },
    /// A string argument could not be passed as a C string.
    #[error("string argument contains an interior NUL byte")]
    InteriorNul(#[from] NulError),
    /// Operands belong to different contexts.
    #[error("operands belong to different contexts ({left} and {right})")]
    ContextMismatch { left: ContextId, right: ContextId },
    /// A numeric accessor was applied to a term that is not a numeral.
    #[error("term {0} is not a numeral")]
    NotANumeral(String),
    /// A numeral does not fit the requested machine integer.
    #[error("numeral {0} does not fit in a machine integer")]
    NumeralOutOfRange(String),
}

impl SolverError {
    /// The native error carried by this value, if any.
    #[must_use]
    pub fn native(&self) -> Option<&NativeError> {
        match self {
            Self::Native(err) => Some(err),
            _ => None,
        }
    }

    /// The native error code carried by this value, if any.
    #[must_use]
    pub fn code(&self) -> Option<ErrorCode> {
        self.native().map(|err| err.code)
    }
}
