//! Shared internal utilities for string marshaling across the boundary.

use std::ffi::{CStr, CString};

use z3_sys::Z3_string;

use crate::error::SolverError;

/// Copy a libz3-owned C string into an owned `String`.
///
/// libz3 reuses the buffers behind returned strings, so the text is copied
/// before any further native call. A null pointer yields an empty string and
/// invalid UTF-8 is replaced.
///
/// # Safety
///
/// `ptr` must be null or point to a NUL-terminated string valid for reads.
pub(crate) unsafe fn z3_string(ptr: Z3_string) -> String {
    if ptr.is_null() {
        return String::new();
    }
    // SAFETY: non-null and NUL-terminated per the caller's contract.
    unsafe { CStr::from_ptr(ptr) }
        .to_string_lossy()
        .into_owned()
}

/// Convert a host string into a C string for a native call.
pub(crate) fn c_string(s: &str) -> Result<CString, SolverError> {
    Ok(CString::new(s)?)
}
