//! Optimization (MaxSMT / objective) solving.

use std::ffi::c_uint;

use z3_sys::{
    Z3_mk_optimize, Z3_optimize, Z3_optimize_assert, Z3_optimize_check, Z3_optimize_dec_ref,
    Z3_optimize_get_lower, Z3_optimize_get_model, Z3_optimize_get_upper, Z3_optimize_inc_ref,
    Z3_optimize_maximize, Z3_optimize_minimize,
};

use crate::ast::Ast;
use crate::context::Context;
use crate::error::SolverError;
use crate::lbool::LBool;
use crate::model::Model;

/// Index of an objective registered with [`Optimize::maximize`] or
/// [`Optimize::minimize`]. Only meaningful for the optimizer that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectiveHandle(pub u32);

#[derive(Debug)]
pub struct Optimize<'ctx> {
    ctx: &'ctx Context,
    raw: Z3_optimize,
}

impl Context {
    pub fn optimize(&self) -> Result<Optimize<'_>, SolverError> {
        // SAFETY: `c` is live for the call.
        let raw = self.guard(|c| unsafe { Z3_mk_optimize(c) })?;
        if raw.is_null() {
            return Err(SolverError::NullHandle {
                what: "Z3_mk_optimize",
            });
        }
        // SAFETY: `raw` was just created in this context.
        self.guard(|c| unsafe { Z3_optimize_inc_ref(c, raw) })?;
        Ok(Optimize { ctx: self, raw })
    }
}

impl<'ctx> Optimize<'ctx> {
    pub fn assert(&self, constraint: &Ast<'ctx>) -> Result<(), SolverError> {
        self.ctx.check_same(constraint.ctx)?;
        let (o, a) = (self.raw, constraint.raw);
        // SAFETY: optimizer and term belong to the live context.
        self.ctx.guard(|c| unsafe { Z3_optimize_assert(c, o, a) })
    }

    pub fn maximize(&self, objective: &Ast<'ctx>) -> Result<ObjectiveHandle, SolverError> {
        self.ctx.check_same(objective.ctx)?;
        let (o, a) = (self.raw, objective.raw);
        // SAFETY: as in `assert`.
        let idx = self.ctx.guard(|c| unsafe { Z3_optimize_maximize(c, o, a) })?;
        Ok(ObjectiveHandle(idx))
    }

    pub fn minimize(&self, objective: &Ast<'ctx>) -> Result<ObjectiveHandle, SolverError> {
        self.ctx.check_same(objective.ctx)?;
        let (o, a) = (self.raw, objective.raw);
        // SAFETY: as in `assert`.
        let idx = self.ctx.guard(|c| unsafe { Z3_optimize_minimize(c, o, a) })?;
        Ok(ObjectiveHandle(idx))
    }

    /// Run the optimizer over the asserted constraints and objectives.
    pub fn check(&self) -> Result<LBool, SolverError> {
        let o = self.raw;
        // SAFETY: no assumptions are passed, so the null array is never read.
        let result = self
            .ctx
            .guard(|c| unsafe { Z3_optimize_check(c, o, 0, std::ptr::null()) })?;
        let result = LBool::from(result);
        tracing::debug!(context = %self.ctx.id(), %result, "optimize check");
        Ok(result)
    }

    /// Lower bound (or current approximation) of an objective.
    pub fn lower(&self, handle: ObjectiveHandle) -> Result<Ast<'ctx>, SolverError> {
        let o = self.raw;
        let idx = handle.0 as c_uint;
        // SAFETY: libz3 validates the index and reports IOB through the handler.
        let raw = self
            .ctx
            .guard(|c| unsafe { Z3_optimize_get_lower(c, o, idx) })?;
        Ast::from_raw(self.ctx, raw, "Z3_optimize_get_lower")
    }

    /// Upper bound (or current approximation) of an objective.
    pub fn upper(&self, handle: ObjectiveHandle) -> Result<Ast<'ctx>, SolverError> {
        let o = self.raw;
        let idx = handle.0 as c_uint;
        // SAFETY: as in `lower`.
        let raw = self
            .ctx
            .guard(|c| unsafe { Z3_optimize_get_upper(c, o, idx) })?;
        Ast::from_raw(self.ctx, raw, "Z3_optimize_get_upper")
    }

    pub fn model(&self) -> Result<Model<'ctx>, SolverError> {
        let o = self.raw;
        // SAFETY: optimizer belongs to the live context.
        let raw = self.ctx.guard(|c| unsafe { Z3_optimize_get_model(c, o) })?;
        Model::acquire(self.ctx, raw)
    }
}

impl Drop for Optimize<'_> {
    fn drop(&mut self) {
        let o = self.raw;
        // SAFETY: releases the reference taken in `Context::optimize`.
        if let Err(err) = self.ctx.guard(|c| unsafe { Z3_optimize_dec_ref(c, o) }) {
            tracing::warn!(%err, "optimizer release failed");
        }
    }
}
