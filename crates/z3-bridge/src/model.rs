//! Models produced by satisfiability checks.
//!
//! A model is reference counted natively. [`Model`] holds one reference and
//! releases it on drop; cloning takes another.

use std::collections::BTreeMap;
use std::fmt;

use z3_sys::{
    Z3_ast, Z3_get_decl_name, Z3_model, Z3_model_dec_ref, Z3_model_eval, Z3_model_get_const_decl,
    Z3_model_get_const_interp, Z3_model_get_num_consts, Z3_model_inc_ref, Z3_model_to_string,
};

use crate::ast::Ast;
use crate::context::Context;
use crate::error::SolverError;
use crate::symbol::Symbol;
use crate::util::z3_string;

pub struct Model<'ctx> {
    ctx: &'ctx Context,
    raw: Z3_model,
}

impl<'ctx> Model<'ctx> {
    /// Take a reference on a model handed out by libz3.
    pub(crate) fn acquire(ctx: &'ctx Context, raw: Z3_model) -> Result<Self, SolverError> {
        if raw.is_null() {
            return Err(SolverError::NullHandle {
                what: "model accessor",
            });
        }
        // SAFETY: `raw` is a live model of `ctx`.
        ctx.guard(|c| unsafe { Z3_model_inc_ref(c, raw) })?;
        Ok(Self { ctx, raw })
    }

    /// SMT-LIB style listing of the model.
    pub fn to_smt_string(&self) -> Result<String, SolverError> {
        let raw = self.raw;
        // SAFETY: model and context are live; the buffer is copied immediately.
        self.ctx
            .guard(|c| unsafe { z3_string(Z3_model_to_string(c, raw)) })
    }

    /// Evaluate `term` in this model.
    ///
    /// With `completion`, constants without an interpretation get a default
    /// value. Returns `None` when libz3 cannot evaluate the term.
    pub fn eval(&self, term: &Ast<'ctx>, completion: bool) -> Result<Option<Ast<'ctx>>, SolverError> {
        self.ctx.check_same(term.ctx)?;
        let (m, t) = (self.raw, term.raw);
        let mut out: Z3_ast = std::ptr::null_mut();
        // SAFETY: model and term belong to the live context; `out` is a valid out-pointer.
        let ok = self
            .ctx
            .guard(|c| unsafe { Z3_model_eval(c, m, t, completion, &mut out) })?;
        if !ok || out.is_null() {
            return Ok(None);
        }
        Ast::from_raw(self.ctx, out, "Z3_model_eval").map(Some)
    }

    /// Interpretation of every constant in the model, keyed by name.
    pub fn assignments(&self) -> Result<BTreeMap<String, Ast<'ctx>>, SolverError> {
        let m = self.raw;
        // SAFETY: model and context are live.
        let count = self.ctx.guard(|c| unsafe { Z3_model_get_num_consts(c, m) })?;
        let mut out = BTreeMap::new();
        for i in 0..count {
            // SAFETY: `i` is below the constant count.
            let decl = self
                .ctx
                .guard(|c| unsafe { Z3_model_get_const_decl(c, m, i) })?;
            // SAFETY: `decl` belongs to this model's context.
            let name = self.ctx.guard(|c| unsafe { Z3_get_decl_name(c, decl) })?;
            let name = Symbol {
                ctx: self.ctx,
                raw: name,
            }
            .name()?
            .to_string();
            // SAFETY: as above.
            let interp = self
                .ctx
                .guard(|c| unsafe { Z3_model_get_const_interp(c, m, decl) })?;
            if interp.is_null() {
                continue;
            }
            out.insert(name, Ast::from_raw(self.ctx, interp, "Z3_model_get_const_interp")?);
        }
        Ok(out)
    }

    #[must_use]
    pub fn context(&self) -> &'ctx Context {
        self.ctx
    }
}

impl Clone for Model<'_> {
    fn clone(&self) -> Self {
        let raw = self.raw;
        // SAFETY: model and context are live.
        if let Err(err) = self.ctx.guard(|c| unsafe { Z3_model_inc_ref(c, raw) }) {
            tracing::warn!(%err, "model retain failed");
        }
        Self { ctx: self.ctx, raw }
    }
}

impl Drop for Model<'_> {
    fn drop(&mut self) {
        let raw = self.raw;
        // SAFETY: releases the reference taken in `acquire`/`clone`.
        if let Err(err) = self.ctx.guard(|c| unsafe { Z3_model_dec_ref(c, raw) }) {
            tracing::warn!(%err, "model release failed");
        }
    }
}

impl fmt::Debug for Model<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("context", &self.ctx.id())
            .field("raw", &self.raw)
            .finish()
    }
}

impl fmt::Display for Model<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_smt_string() {
            Ok(text) => f.write_str(&text),
            Err(err) => write!(f, "<{err}>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::context::Context;
    use crate::lbool::LBool;

    #[test]
    fn assignments_and_eval() {
        let ctx = Context::with_default_config().unwrap();
        let int = ctx.int_sort().unwrap();
        let x = ctx.constant(&ctx.symbol("x").unwrap(), &int).unwrap();
        let four = ctx.int(4, &int).unwrap();
        let sixteen = ctx.int(16, &int).unwrap();
        // x + 4 = 16
        let goal = x.add(&[&four]).unwrap().eq(&sixteen).unwrap();

        let solver = ctx.solver().unwrap();
        solver.assert(&goal).unwrap();
        assert_eq!(solver.check().unwrap(), LBool::True);

        let model = solver.model().unwrap();
        let assigned = model.assignments().unwrap();
        assert_eq!(assigned["x"].as_i64().unwrap(), 12);

        let value = model.eval(&x, true).unwrap().unwrap();
        assert_eq!(value.as_i64().unwrap(), 12);

        let copy = model.clone();
        drop(model);
        assert!(copy.to_smt_string().unwrap().contains("12"));
    }

    #[test]
    fn clones_retain_and_release_without_native_errors() {
        let ctx = Context::with_default_config().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        ctx.set_error_observer(move |_| {
            counter.fetch_add(1, Ordering::Relaxed);
        })
        .unwrap();

        let b = ctx.bool_sort().unwrap();
        let p = ctx.constant(&ctx.symbol("p").unwrap(), &b).unwrap();
        let solver = ctx.solver().unwrap();
        solver.assert(&p).unwrap();
        assert_eq!(solver.check().unwrap(), LBool::True);

        let model = solver.model().unwrap();
        let clones: Vec<_> = (0..4).map(|_| model.clone()).collect();
        drop(model);
        let last = clones.last().unwrap().clone();
        drop(clones);

        assert!(last.assignments().unwrap().contains_key("p"));
        drop(last);
        assert_eq!(hits.load(Ordering::Relaxed), 0);
    }
}
