//! Boolean connectives and equality.
//!
//! Variadic forms take `self` as the first operand, so `x.and(&[&y, &z])`
//! builds `(and x y z)`. All operands must be Boolean unless noted; libz3
//! reports a sort error otherwise.

use z3_sys::{
    Z3_mk_and, Z3_mk_distinct, Z3_mk_eq, Z3_mk_iff, Z3_mk_implies, Z3_mk_ite, Z3_mk_not,
    Z3_mk_or, Z3_mk_xor,
};

use super::Ast;
use crate::error::SolverError;

impl<'ctx> Ast<'ctx> {
    /// `(distinct self others...)`. Operands may be of any one sort.
    pub fn distinct(&self, others: &[&Ast<'ctx>]) -> Result<Self, SolverError> {
        self.nary(others, Z3_mk_distinct, "Z3_mk_distinct")
    }

    /// `(not self)`.
    pub fn not(&self) -> Result<Self, SolverError> {
        self.unary(Z3_mk_not, "Z3_mk_not")
    }

    /// `(= self other)`. Operands must share a sort.
    pub fn eq(&self, other: &Ast<'ctx>) -> Result<Self, SolverError> {
        self.binary(other, Z3_mk_eq, "Z3_mk_eq")
    }

    /// `(ite self then otherwise)`.
    pub fn ite(&self, then: &Ast<'ctx>, otherwise: &Ast<'ctx>) -> Result<Self, SolverError> {
        self.ctx.check_same(then.ctx)?;
        self.ctx.check_same(otherwise.ctx)?;
        let (c, t, e) = (self.raw, then.raw, otherwise.raw);
        // SAFETY: all three terms belong to the live context.
        let raw = self.ctx.guard(|ctx| unsafe { Z3_mk_ite(ctx, c, t, e) })?;
        Self::from_raw(self.ctx, raw, "Z3_mk_ite")
    }

    /// `self` iff `other`.
    pub fn iff(&self, other: &Ast<'ctx>) -> Result<Self, SolverError> {
        self.binary(other, Z3_mk_iff, "Z3_mk_iff")
    }

    /// `(=> self other)`.
    pub fn implies(&self, other: &Ast<'ctx>) -> Result<Self, SolverError> {
        self.binary(other, Z3_mk_implies, "Z3_mk_implies")
    }

    /// `(xor self other)`.
    pub fn xor(&self, other: &Ast<'ctx>) -> Result<Self, SolverError> {
        self.binary(other, Z3_mk_xor, "Z3_mk_xor")
    }

    /// `(and self others...)`.
    pub fn and(&self, others: &[&Ast<'ctx>]) -> Result<Self, SolverError> {
        self.nary(others, Z3_mk_and, "Z3_mk_and")
    }

    /// `(or self others...)`.
    pub fn or(&self, others: &[&Ast<'ctx>]) -> Result<Self, SolverError> {
        self.nary(others, Z3_mk_or, "Z3_mk_or")
    }
}

#[cfg(test)]
mod tests {
    use crate::context::Context;
    use crate::error::SolverError;

    fn render(f: impl FnOnce(&Context) -> Result<String, SolverError>) -> String {
        let ctx = Context::with_default_config().unwrap();
        f(&ctx).unwrap()
    }

    #[test]
    fn distinct() {
        let out = render(|ctx| {
            let int = ctx.int_sort()?;
            let x = ctx.constant(&ctx.symbol("x")?, &int)?;
            let y = ctx.constant(&ctx.symbol("y")?, &int)?;
            let z = ctx.constant(&ctx.symbol("z")?, &int)?;
            x.distinct(&[&y, &z])?.to_smt_string()
        });
        assert_eq!(out, "(distinct x y z)");
    }

    #[test]
    fn connectives() {
        let ctx = Context::with_default_config().unwrap();
        let b = ctx.bool_sort().unwrap();
        let x = ctx.constant(&ctx.symbol("x").unwrap(), &b).unwrap();
        let y = ctx.constant(&ctx.symbol("y").unwrap(), &b).unwrap();
        let z = ctx.constant(&ctx.symbol("z").unwrap(), &b).unwrap();

        assert_eq!(x.not().unwrap().to_string(), "(not x)");
        assert_eq!(x.eq(&y).unwrap().to_string(), "(= x y)");
        assert_eq!(x.ite(&y, &z).unwrap().to_string(), "(ite x y z)");
        assert_eq!(x.iff(&y).unwrap().to_string(), "(= x y)");
        assert_eq!(x.implies(&y).unwrap().to_string(), "(=> x y)");
        assert_eq!(x.xor(&y).unwrap().to_string(), "(xor x y)");
        assert_eq!(x.and(&[&y]).unwrap().to_string(), "(and x y)");
        assert_eq!(x.or(&[&y]).unwrap().to_string(), "(or x y)");
    }

    #[test]
    fn not_on_integer_is_rejected_natively() {
        let ctx = Context::with_default_config().unwrap();
        let int = ctx.int_sort().unwrap();
        let n = ctx.int(1, &int).unwrap();
        assert!(n.not().unwrap_err().native().is_some());
    }

    #[test]
    fn and_rejects_foreign_operand() {
        let a = Context::with_default_config().unwrap();
        let b = Context::with_default_config().unwrap();
        let x = a.bool_val(true).unwrap();
        let y = b.bool_val(false).unwrap();
        assert!(matches!(
            x.and(&[&y]),
            Err(SolverError::ContextMismatch { .. })
        ));
    }
}
