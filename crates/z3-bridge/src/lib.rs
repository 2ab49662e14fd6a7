//! z3-bridge: Z3 C API bindings with a synchronous native-error bridge.
//!
//! libz3 signals failure by calling a per-context error handler from inside
//! the failing API call. This crate installs a handler on every [`Context`]
//! it creates and turns each signal into an ordinary `Err` returned by the
//! wrapper that issued the call. Errors are never dropped and never reach
//! libz3's default handler, which would terminate the process.
//!
//! ```no_run
//! use z3_bridge::{Context, LBool};
//!
//! # fn main() -> Result<(), z3_bridge::SolverError> {
//! let ctx = Context::with_default_config()?;
//! let int = ctx.int_sort()?;
//! let x = ctx.constant(&ctx.symbol("x")?, &int)?;
//! let goal = x.add(&[&ctx.int(4, &int)?])?.eq(&ctx.int(16, &int)?)?;
//!
//! let solver = ctx.solver()?;
//! solver.assert(&goal)?;
//! assert_eq!(solver.check()?, LBool::True);
//! assert_eq!(solver.model()?.assignments()?["x"].as_i64()?, 12);
//!
//! // A Boolean is not an integer: libz3 reports it, the wrapper returns it.
//! let b = ctx.constant(&ctx.symbol("b")?, &ctx.bool_sort()?)?;
//! assert!(b.ge(&x).is_err());
//! # Ok(())
//! # }
//! ```

pub mod ast;
pub mod bridge;
pub mod config;
pub mod context;
pub mod error;
pub mod lbool;
pub mod model;
pub mod optimize;
pub mod solver;
pub mod sort;
pub mod symbol;
mod util;
pub mod version;

pub use ast::Ast;
pub use bridge::{
    BRIDGE_STATS, BridgeStatsSnapshot, ContextId, error_adapter, global_registry, guard,
    install_error_handler,
};
pub use config::{Config, PARAMS_ENV};
pub use context::Context;
pub use error::{ErrorCode, NativeError, SolverError};
pub use lbool::LBool;
pub use model::Model;
pub use optimize::{ObjectiveHandle, Optimize};
pub use solver::Solver;
pub use sort::Sort;
pub use symbol::{Symbol, SymbolName};
pub use version::{Version, version};
