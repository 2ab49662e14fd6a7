//! Lifted Boolean returned by satisfiability checks.

use std::fmt;

use z3_sys::{Z3_L_FALSE, Z3_L_TRUE, Z3_lbool};

/// `false`, undefined, or `true`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LBool {
    /// Unsatisfiable.
    False,
    /// Unknown (timeout, incompleteness, cancellation).
    Undef,
    /// Satisfiable.
    True,
}

/// Anything other than `Z3_L_FALSE` or `Z3_L_TRUE` reads as undefined.
impl From<Z3_lbool> for LBool {
    fn from(value: Z3_lbool) -> Self {
        match value {
            Z3_L_FALSE => Self::False,
            Z3_L_TRUE => Self::True,
            _ => Self::Undef,
        }
    }
}

impl fmt::Display for LBool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::False => "false",
            Self::Undef => "undef",
            Self::True => "true",
        })
    }
}
