//! Version of the linked libz3.

use std::ffi::c_uint;
use std::fmt;

use z3_sys::Z3_get_version;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub build: u32,
    pub revision: u32,
}

/// Query the linked library. Needs no context.
#[must_use]
pub fn version() -> Version {
    let (mut major, mut minor, mut build, mut revision): (c_uint, c_uint, c_uint, c_uint) =
        (0, 0, 0, 0);
    // SAFETY: all four out-pointers are valid for writes.
    unsafe { Z3_get_version(&mut major, &mut minor, &mut build, &mut revision) };
    Version {
        major,
        minor,
        build,
        revision,
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major, self.minor, self.build, self.revision
        )
    }
}
