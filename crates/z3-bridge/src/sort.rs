//! Sorts (types) of terms.

use z3_sys::{Z3_mk_bool_sort, Z3_mk_int_sort, Z3_sort};

use crate::context::Context;
use crate::error::SolverError;

/// A sort owned by its context.
#[derive(Debug, Clone, Copy)]
pub struct Sort<'ctx> {
    pub(crate) ctx: &'ctx Context,
    pub(crate) raw: Z3_sort,
}

impl Context {
    /// The Boolean sort.
    pub fn bool_sort(&self) -> Result<Sort<'_>, SolverError> {
        // SAFETY: `ctx` is live for the call.
        let raw = self.guard(|ctx| unsafe { Z3_mk_bool_sort(ctx) })?;
        Ok(Sort { ctx: self, raw })
    }

    /// The mathematical integer sort.
    pub fn int_sort(&self) -> Result<Sort<'_>, SolverError> {
        // SAFETY: `ctx` is live for the call.
        let raw = self.guard(|ctx| unsafe { Z3_mk_int_sort(ctx) })?;
        Ok(Sort { ctx: self, raw })
    }
}

impl<'ctx> Sort<'ctx> {
    #[must_use]
    pub fn context(&self) -> &'ctx Context {
        self.ctx
    }
}
