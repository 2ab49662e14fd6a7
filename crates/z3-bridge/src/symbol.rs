//! Symbols name constants and declarations.

use std::fmt;

use z3_sys::{
    SymbolKind, Z3_get_symbol_int, Z3_get_symbol_kind, Z3_get_symbol_string,
    Z3_mk_int_symbol, Z3_mk_string_symbol, Z3_symbol,
};

use crate::context::Context;
use crate::error::SolverError;
use crate::util::{c_string, z3_string};

/// A symbol owned by its context. Freed together with the context.
#[derive(Debug, Clone, Copy)]
pub struct Symbol<'ctx> {
    pub(crate) ctx: &'ctx Context,
    pub(crate) raw: Z3_symbol,
}

/// Symbol value, read back from libz3.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolName {
    Int(i32),
    String(String),
}

impl Context {
    /// Symbol named by a string.
    pub fn symbol(&self, name: &str) -> Result<Symbol<'_>, SolverError> {
        let cname = c_string(name)?;
        // SAFETY: the string outlives the call; libz3 interns it.
        let raw = self.guard(|ctx| unsafe { Z3_mk_string_symbol(ctx, cname.as_ptr()) })?;
        Ok(Symbol { ctx: self, raw })
    }

    /// Symbol named by an integer.
    pub fn symbol_int(&self, name: i32) -> Result<Symbol<'_>, SolverError> {
        // SAFETY: `ctx` is live for the call.
        let raw = self.guard(|ctx| unsafe { Z3_mk_int_symbol(ctx, name) })?;
        Ok(Symbol { ctx: self, raw })
    }
}

impl<'ctx> Symbol<'ctx> {
    /// Read the symbol back.
    pub fn name(&self) -> Result<SymbolName, SolverError> {
        let raw = self.raw;
        // SAFETY: `raw` belongs to the live context.
        let kind = self.ctx.guard(|ctx| unsafe { Z3_get_symbol_kind(ctx, raw) })?;
        match kind {
            SymbolKind::Int => {
                // SAFETY: as above; the symbol is an int symbol.
                let value = self.ctx.guard(|ctx| unsafe { Z3_get_symbol_int(ctx, raw) })?;
                Ok(SymbolName::Int(value))
            }
            SymbolKind::String => {
                // SAFETY: as above. The returned buffer is reused by libz3, so it is
                // copied before the guard returns.
                let text = self
                    .ctx
                    .guard(|ctx| unsafe { z3_string(Z3_get_symbol_string(ctx, raw)) })?;
                Ok(SymbolName::String(text))
            }
        }
    }

    #[must_use]
    pub fn context(&self) -> &'ctx Context {
        self.ctx
    }
}

impl fmt::Display for SymbolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::String(s) => f.write_str(s),
        }
    }
}

impl fmt::Display for Symbol<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Ok(name) => write!(f, "{name}"),
            Err(err) => write!(f, "<{err}>"),
        }
    }
}
