//! Incremental solvers.

use z3_sys::{
    Z3_mk_solver, Z3_solver, Z3_solver_assert, Z3_solver_check, Z3_solver_dec_ref,
    Z3_solver_get_model, Z3_solver_inc_ref,
};

use crate::ast::Ast;
use crate::context::Context;
use crate::error::SolverError;
use crate::lbool::LBool;
use crate::model::Model;

/// A solver tied to one context. Released on drop.
#[derive(Debug)]
pub struct Solver<'ctx> {
    ctx: &'ctx Context,
    raw: Z3_solver,
}

impl Context {
    /// Create a general-purpose solver.
    pub fn solver(&self) -> Result<Solver<'_>, SolverError> {
        // SAFETY: `c` is live for the call.
        let raw = self.guard(|c| unsafe { Z3_mk_solver(c) })?;
        if raw.is_null() {
            return Err(SolverError::NullHandle {
                what: "Z3_mk_solver",
            });
        }
        // SAFETY: `raw` was just created in this context.
        self.guard(|c| unsafe { Z3_solver_inc_ref(c, raw) })?;
        Ok(Solver { ctx: self, raw })
    }
}

impl<'ctx> Solver<'ctx> {
    /// Add a Boolean constraint.
    pub fn assert(&self, constraint: &Ast<'ctx>) -> Result<(), SolverError> {
        self.ctx.check_same(constraint.ctx)?;
        let (s, a) = (self.raw, constraint.raw);
        // SAFETY: solver and term belong to the live context.
        self.ctx.guard(|c| unsafe { Z3_solver_assert(c, s, a) })
    }

    /// Check satisfiability of the asserted constraints.
    pub fn check(&self) -> Result<LBool, SolverError> {
        let s = self.raw;
        // SAFETY: solver belongs to the live context.
        let result = self.ctx.guard(|c| unsafe { Z3_solver_check(c, s) })?;
        let result = LBool::from(result);
        tracing::debug!(context = %self.ctx.id(), %result, "solver check");
        Ok(result)
    }

    /// Model from the last satisfiable [`Solver::check`].
    ///
    /// libz3 reports an error if the last check was not satisfiable.
    pub fn model(&self) -> Result<Model<'ctx>, SolverError> {
        let s = self.raw;
        // SAFETY: solver belongs to the live context.
        let raw = self.ctx.guard(|c| unsafe { Z3_solver_get_model(c, s) })?;
        Model::acquire(self.ctx, raw)
    }
}

impl Drop for Solver<'_> {
    fn drop(&mut self) {
        let s = self.raw;
        // SAFETY: releases the reference taken in `Context::solver`.
        if let Err(err) = self.ctx.guard(|c| unsafe { Z3_solver_dec_ref(c, s) }) {
            tracing::warn!(%err, "solver release failed");
        }
    }
}
