//! Terms.
//!
//! ASTs created in a context are owned by it and freed with it. Operations
//! that combine terms require them to share a context; this is checked on the
//! host side before any native call.

mod arith;
mod logic;

use std::ffi::c_uint;
use std::fmt;

use z3_sys::{
    Z3_ast, Z3_ast_to_string, Z3_context, Z3_get_app_decl, Z3_get_decl_name,
    Z3_get_numeral_int64, Z3_get_numeral_string, Z3_is_numeral_ast, Z3_mk_const, Z3_mk_false,
    Z3_mk_int64, Z3_mk_true, Z3_to_app,
};

use crate::context::Context;
use crate::error::SolverError;
use crate::sort::Sort;
use crate::symbol::Symbol;
use crate::util::z3_string;

type NaryFn = unsafe extern "C" fn(Z3_context, c_uint, *const Z3_ast) -> Z3_ast;
type UnaryFn = unsafe extern "C" fn(Z3_context, Z3_ast) -> Z3_ast;
type BinaryFn = unsafe extern "C" fn(Z3_context, Z3_ast, Z3_ast) -> Z3_ast;

/// A term owned by its context.
#[derive(Debug, Clone, Copy)]
pub struct Ast<'ctx> {
    pub(crate) ctx: &'ctx Context,
    pub(crate) raw: Z3_ast,
}

impl Context {
    /// Declare a constant named `symbol` of sort `sort`.
    pub fn constant<'ctx>(
        &'ctx self,
        symbol: &Symbol<'ctx>,
        sort: &Sort<'ctx>,
    ) -> Result<Ast<'ctx>, SolverError> {
        self.check_same(symbol.ctx)?;
        self.check_same(sort.ctx)?;
        let (s, ty) = (symbol.raw, sort.raw);
        // SAFETY: symbol and sort belong to this live context.
        let raw = self.guard(|ctx| unsafe { Z3_mk_const(ctx, s, ty) })?;
        Ast::from_raw(self, raw, "Z3_mk_const")
    }

    /// Integer numeral `value` of sort `sort`.
    pub fn int<'ctx>(&'ctx self, value: i64, sort: &Sort<'ctx>) -> Result<Ast<'ctx>, SolverError> {
        self.check_same(sort.ctx)?;
        let ty = sort.raw;
        // SAFETY: sort belongs to this live context.
        let raw = self.guard(|ctx| unsafe { Z3_mk_int64(ctx, value, ty) })?;
        Ast::from_raw(self, raw, "Z3_mk_int64")
    }

    /// The Boolean literal `value`.
    pub fn bool_val(&self, value: bool) -> Result<Ast<'_>, SolverError> {
        // SAFETY: `ctx` is live for the call.
        let raw = self.guard(|ctx| unsafe {
            if value { Z3_mk_true(ctx) } else { Z3_mk_false(ctx) }
        })?;
        Ast::from_raw(self, raw, if value { "Z3_mk_true" } else { "Z3_mk_false" })
    }
}

impl<'ctx> Ast<'ctx> {
    pub(crate) fn from_raw(
        ctx: &'ctx Context,
        raw: Z3_ast,
        what: &'static str,
    ) -> Result<Self, SolverError> {
        if raw.is_null() {
            return Err(SolverError::NullHandle { what });
        }
        Ok(Self { ctx, raw })
    }

    /// SMT-LIB rendering of this term.
    pub fn to_smt_string(&self) -> Result<String, SolverError> {
        let raw = self.raw;
        // SAFETY: `raw` belongs to the live context; the buffer is copied
        // before the next native call.
        self.ctx
            .guard(|ctx| unsafe { z3_string(Z3_ast_to_string(ctx, raw)) })
    }

    /// Name of the declaration this application term applies.
    ///
    /// For a constant this is the constant's name. Terms that are not
    /// applications (quantifiers, bound variables) are rejected by libz3.
    pub fn decl_name(&self) -> Result<Symbol<'ctx>, SolverError> {
        let raw = self.raw;
        // SAFETY: `raw` belongs to the live context.
        let app = self.ctx.guard(|ctx| unsafe { Z3_to_app(ctx, raw) })?;
        // SAFETY: `app` was produced by the guarded call above.
        let decl = self.ctx.guard(|ctx| unsafe { Z3_get_app_decl(ctx, app) })?;
        // SAFETY: `decl` belongs to the live context.
        let sym = self.ctx.guard(|ctx| unsafe { Z3_get_decl_name(ctx, decl) })?;
        Ok(Symbol { ctx: self.ctx, raw: sym })
    }

    /// Value of an integer numeral.
    ///
    /// # Errors
    ///
    /// [`SolverError::NotANumeral`] if the term is not a numeral,
    /// [`SolverError::NumeralOutOfRange`] if it does not fit in `i64`.
    pub fn as_i64(&self) -> Result<i64, SolverError> {
        let raw = self.raw;
        // SAFETY: `raw` belongs to the live context.
        let numeral = self.ctx.guard(|ctx| unsafe { Z3_is_numeral_ast(ctx, raw) })?;
        if !numeral {
            return Err(SolverError::NotANumeral(self.to_smt_string()?));
        }
        let mut value = 0_i64;
        // SAFETY: `raw` belongs to the live context; `value` is a valid out-pointer.
        let fits = self
            .ctx
            .guard(|ctx| unsafe { Z3_get_numeral_int64(ctx, raw, &mut value) })?;
        if fits {
            return Ok(value);
        }
        // SAFETY: as above.
        let text = self
            .ctx
            .guard(|ctx| unsafe { z3_string(Z3_get_numeral_string(ctx, raw)) })?;
        Err(SolverError::NumeralOutOfRange(text))
    }

    #[must_use]
    pub fn context(&self) -> &'ctx Context {
        self.ctx
    }

    /// Raw handle. Invalid once the context is dropped.
    #[must_use]
    pub fn raw(&self) -> Z3_ast {
        self.raw
    }

    fn check_operands(&self, others: &[&Ast<'ctx>]) -> Result<(), SolverError> {
        others
            .iter()
            .try_for_each(|other| self.ctx.check_same(other.ctx))
    }

    /// Apply an n-ary native constructor to `self` followed by `others`.
    pub(crate) fn nary(
        &self,
        others: &[&Ast<'ctx>],
        op: NaryFn,
        what: &'static str,
    ) -> Result<Self, SolverError> {
        self.check_operands(others)?;
        let args: Vec<Z3_ast> = std::iter::once(self.raw)
            .chain(others.iter().map(|a| a.raw))
            .collect();
        let len = args.len() as c_uint;
        // SAFETY: `args` holds `len` terms of this live context and outlives the call.
        let raw = self.ctx.guard(|ctx| unsafe { op(ctx, len, args.as_ptr()) })?;
        Self::from_raw(self.ctx, raw, what)
    }

    pub(crate) fn unary(&self, op: UnaryFn, what: &'static str) -> Result<Self, SolverError> {
        let a = self.raw;
        // SAFETY: `a` belongs to the live context.
        let raw = self.ctx.guard(|ctx| unsafe { op(ctx, a) })?;
        Self::from_raw(self.ctx, raw, what)
    }

    pub(crate) fn binary(
        &self,
        other: &Ast<'ctx>,
        op: BinaryFn,
        what: &'static str,
    ) -> Result<Self, SolverError> {
        self.ctx.check_same(other.ctx)?;
        let (a, b) = (self.raw, other.raw);
        // SAFETY: both terms belong to the live context.
        let raw = self.ctx.guard(|ctx| unsafe { op(ctx, a, b) })?;
        Self::from_raw(self.ctx, raw, what)
    }
}

impl fmt::Display for Ast<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_smt_string() {
            Ok(text) => f.write_str(&text),
            Err(err) => write!(f, "<{err}>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn numerals_read_back() {
        let ctx = Context::with_default_config().unwrap();
        let int = ctx.int_sort().unwrap();
        let v = ctx.int(12, &int).unwrap();
        assert_eq!(v.as_i64().unwrap(), 12);
        assert_eq!(v.to_string(), "12");
        let neg = ctx.int(-3, &int).unwrap();
        assert_eq!(neg.as_i64().unwrap(), -3);
    }

    #[test]
    fn as_i64_on_non_numeral_is_rejected() {
        let ctx = Context::with_default_config().unwrap();
        let int = ctx.int_sort().unwrap();
        let x = ctx.constant(&ctx.symbol("x").unwrap(), &int).unwrap();
        assert_eq!(
            x.as_i64().unwrap_err(),
            SolverError::NotANumeral("x".to_string())
        );
    }

    #[test]
    fn bool_literals() {
        let ctx = Context::with_default_config().unwrap();
        assert_eq!(ctx.bool_val(true).unwrap().to_string(), "true");
        assert_eq!(ctx.bool_val(false).unwrap().to_string(), "false");
    }

    #[test]
    fn decl_name_of_constant() {
        let ctx = Context::with_default_config().unwrap();
        let x = ctx
            .constant(&ctx.symbol("x").unwrap(), &ctx.bool_sort().unwrap())
            .unwrap();
        assert_eq!(x.decl_name().unwrap().to_string(), "x");
    }

    #[test]
    fn constant_rejects_sort_from_other_context() {
        let a = Context::with_default_config().unwrap();
        let b = Context::with_default_config().unwrap();
        let sym = a.symbol("x").unwrap();
        let foreign = b.int_sort().unwrap();
        assert!(matches!(
            a.constant(&sym, &foreign),
            Err(SolverError::ContextMismatch { .. })
        ));
    }

    #[test]
    fn sort_mismatch_surfaces_as_native_error() {
        let ctx = Context::with_default_config().unwrap();
        let b = ctx.bool_sort().unwrap();
        let x = ctx.constant(&ctx.symbol("x").unwrap(), &b).unwrap();
        let y = ctx.constant(&ctx.symbol("y").unwrap(), &b).unwrap();
        let err = x.ge(&y).unwrap_err();
        let native = err.native().unwrap();
        assert_eq!(native.context, ctx.id());
        assert_ne!(native.code, ErrorCode::OK);
        assert!(native.message.contains("Sort mismatch"), "{native}");
    }
}
