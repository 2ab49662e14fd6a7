//! Unhandled-error probe.
//!
//! A context with no error handler falls back to libz3's default handler,
//! which terminates the process. The probe therefore triggers the error in a
//! child process (`harness probe-unhandled`) and classifies how the child
//! ended.

use std::path::Path;
use std::process::{Command, ExitStatus};
use std::time::Instant;

use serde::{Deserialize, Serialize};
use z3_bridge::{Config, Context};

use crate::error::HarnessError;

/// Subcommand the parent passes to the child.
pub const PROBE_SUBCOMMAND: &str = "probe-unhandled";

/// How the probe child ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProbeExit {
    /// Control came back from libz3 and the child finished normally.
    Returned,
    /// The process exited with a non-zero status.
    Exited { code: i32 },
    /// The process was killed by a signal.
    Signaled { signal: i32, name: String },
    /// Neither an exit code nor a signal was reported.
    Unknown,
}

impl ProbeExit {
    #[must_use]
    pub fn classify(status: ExitStatus) -> Self {
        if status.success() {
            return Self::Returned;
        }
        if let Some(code) = status.code() {
            return Self::Exited { code };
        }
        signal_of(status).map_or(Self::Unknown, |signal| Self::Signaled {
            signal,
            name: signal_name(signal),
        })
    }

    /// True if libz3 took the process down instead of returning.
    #[must_use]
    pub fn terminated(&self) -> bool {
        !matches!(self, Self::Returned)
    }
}

#[cfg(unix)]
fn signal_of(status: ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn signal_of(_status: ExitStatus) -> Option<i32> {
    None
}

#[must_use]
pub fn signal_name(signal: i32) -> String {
    match signal {
        libc::SIGABRT => "SIGABRT".to_string(),
        libc::SIGSEGV => "SIGSEGV".to_string(),
        libc::SIGKILL => "SIGKILL".to_string(),
        libc::SIGTERM => "SIGTERM".to_string(),
        libc::SIGBUS => "SIGBUS".to_string(),
        other => format!("signal {other}"),
    }
}

/// What the parent observed about the probe child.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeReport {
    pub exit: ProbeExit,
    /// First non-empty line the child wrote to stdout or stderr.
    pub first_output_line: Option<String>,
    pub duration_us: u64,
}

/// Child side: make an unhandled native error happen in this process.
///
/// Returns only if libz3's default handler returned control.
pub fn trigger_unhandled_error() -> Result<(), HarnessError> {
    let config = Config::new()?;
    let ctx = Context::new_without_error_handler(&config)?;
    let b = ctx.bool_sort()?;
    let x = ctx.constant(&ctx.symbol("x")?, &b)?;
    // Booleans are not ordered; libz3 raises a sort mismatch here.
    let _ = x.ge(&x);
    Ok(())
}

/// Parent side: run `exe probe-unhandled` and classify the result.
pub fn run_probe(exe: &Path) -> Result<ProbeReport, HarnessError> {
    let started = Instant::now();
    let output = Command::new(exe).arg(PROBE_SUBCOMMAND).output()?;
    let duration_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);

    let first_output_line = [&output.stdout, &output.stderr]
        .into_iter()
        .flat_map(|bytes| {
            String::from_utf8_lossy(bytes)
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .next();

    Ok(ProbeReport {
        exit: ProbeExit::classify(output.status),
        first_output_line,
        duration_us,
    })
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::process::ExitStatusExt;

    #[test]
    fn classify_exit_statuses() {
        assert_eq!(ProbeExit::classify(ExitStatus::from_raw(0)), ProbeExit::Returned);
        assert_eq!(
            ProbeExit::classify(ExitStatus::from_raw(1 << 8)),
            ProbeExit::Exited { code: 1 }
        );
        assert_eq!(
            ProbeExit::classify(ExitStatus::from_raw(libc::SIGABRT)),
            ProbeExit::Signaled {
                signal: libc::SIGABRT,
                name: "SIGABRT".to_string()
            }
        );
    }

    #[test]
    fn only_returned_counts_as_not_terminated() {
        assert!(!ProbeExit::Returned.terminated());
        assert!(ProbeExit::Exited { code: 1 }.terminated());
        assert!(ProbeExit::Unknown.terminated());
    }

    #[test]
    fn probe_exit_serializes_tagged() {
        let json = serde_json::to_value(ProbeExit::Exited { code: 1 }).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "exited", "code": 1}));
        assert_eq!(signal_name(999), "signal 999");
    }
}
