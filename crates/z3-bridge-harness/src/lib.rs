//! Conformance harness for the z3-bridge native error bridge.
//!
//! This crate provides:
//! - Scenario runners: drive each error-delivery scenario against libz3
//! - Unhandled-error probe: observe libz3's default handler in a child process
//! - Structured logging: JSONL records for every scenario step
//! - Report generation: machine-readable run report with artifact hashes

#![forbid(unsafe_code)]

pub mod error;
pub mod probe;
pub mod report;
pub mod scenarios;
pub mod structured_log;

pub use error::HarnessError;
pub use probe::{ProbeExit, ProbeReport};
pub use report::HarnessReport;
pub use scenarios::{Scenario, ScenarioResult};
