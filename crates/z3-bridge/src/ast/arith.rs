//! Integer arithmetic and comparisons.

use z3_sys::{Z3_mk_add, Z3_mk_ge, Z3_mk_gt, Z3_mk_le, Z3_mk_lt, Z3_mk_mul, Z3_mk_sub};

use super::Ast;
use crate::error::SolverError;

impl<'ctx> Ast<'ctx> {
    /// `(+ self others...)`.
    pub fn add(&self, others: &[&Ast<'ctx>]) -> Result<Self, SolverError> {
        self.nary(others, Z3_mk_add, "Z3_mk_add")
    }

    /// `(- self others...)`.
    pub fn sub(&self, others: &[&Ast<'ctx>]) -> Result<Self, SolverError> {
        self.nary(others, Z3_mk_sub, "Z3_mk_sub")
    }

    /// `(* self others...)`.
    pub fn mul(&self, others: &[&Ast<'ctx>]) -> Result<Self, SolverError> {
        self.nary(others, Z3_mk_mul, "Z3_mk_mul")
    }

    /// `(>= self other)`.
    pub fn ge(&self, other: &Ast<'ctx>) -> Result<Self, SolverError> {
        self.binary(other, Z3_mk_ge, "Z3_mk_ge")
    }

    /// `(> self other)`.
    pub fn gt(&self, other: &Ast<'ctx>) -> Result<Self, SolverError> {
        self.binary(other, Z3_mk_gt, "Z3_mk_gt")
    }

    /// `(<= self other)`.
    pub fn le(&self, other: &Ast<'ctx>) -> Result<Self, SolverError> {
        self.binary(other, Z3_mk_le, "Z3_mk_le")
    }

    /// `(< self other)`.
    pub fn lt(&self, other: &Ast<'ctx>) -> Result<Self, SolverError> {
        self.binary(other, Z3_mk_lt, "Z3_mk_lt")
    }
}
