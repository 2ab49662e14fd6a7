//! Error-delivery scenarios run against the linked libz3.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use z3_bridge::{Context, LBool, NativeError, SolverError};

use crate::error::HarnessError;
use crate::probe::{self, ProbeReport};
use crate::structured_log::{LogEntry, LogLevel, Outcome, SCENARIO_RESULT_EVENT};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    /// Well-formed operation on a handled context: nothing is delivered.
    WellFormed,
    /// Invalid operation on a handled context: one delivery, surfaced as `Err`.
    InvalidOperation,
    /// Error on one of two handled contexts: only that context is named.
    ContextIsolation,
    /// Invalid operation with no handler: libz3's default handler runs.
    Unhandled,
}

impl Scenario {
    pub const ALL: [Self; 4] = [
        Self::WellFormed,
        Self::InvalidOperation,
        Self::ContextIsolation,
        Self::Unhandled,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::WellFormed => "well_formed",
            Self::InvalidOperation => "invalid_operation",
            Self::ContextIsolation => "context_isolation",
            Self::Unhandled => "unhandled",
        }
    }

    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            Self::WellFormed => 1,
            Self::InvalidOperation => 2,
            Self::ContextIsolation => 3,
            Self::Unhandled => 4,
        }
    }

    /// Run the scenario. Failed expectations become [`Outcome::Fail`],
    /// anything else that goes wrong becomes [`Outcome::Error`].
    ///
    /// `probe_exe` is the binary that implements the probe subcommand; only
    /// [`Scenario::Unhandled`] uses it.
    #[must_use]
    pub fn run(self, probe_exe: &Path) -> ScenarioResult {
        let started = Instant::now();
        let result = match self {
            Self::WellFormed => well_formed(),
            Self::InvalidOperation => invalid_operation(),
            Self::ContextIsolation => context_isolation(),
            Self::Unhandled => unhandled(probe_exe),
        };
        let mut result = result.unwrap_or_else(|err| {
            let outcome = match err {
                HarnessError::Scenario { .. } => Outcome::Fail,
                _ => Outcome::Error,
            };
            ScenarioResult::new(self, outcome, err.to_string())
        });
        result.duration_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        result
    }
}

/// Outcome of one scenario run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario: Scenario,
    pub outcome: Outcome,
    pub detail: String,
    /// Context the delivered error named.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Observer invocations across all contexts the scenario created.
    pub deliveries: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probe: Option<ProbeReport>,
    pub duration_us: u64,
}

impl ScenarioResult {
    pub(crate) fn new(scenario: Scenario, outcome: Outcome, detail: impl Into<String>) -> Self {
        Self {
            scenario,
            outcome,
            detail: detail.into(),
            context: None,
            error_code: None,
            error_name: None,
            message: None,
            deliveries: 0,
            probe: None,
            duration_us: 0,
        }
    }

    fn with_error(mut self, err: &NativeError) -> Self {
        self.context = Some(err.context.to_string());
        self.error_code = Some(err.code.value());
        self.error_name = err.code.name().map(str::to_string);
        self.message = Some(err.message.clone());
        self
    }

    #[must_use]
    pub fn passed(&self) -> bool {
        self.outcome == Outcome::Pass
    }

    /// The `scenario_result` log record for this run.
    #[must_use]
    pub fn to_log_entry(&self) -> LogEntry {
        let level = if self.passed() {
            LogLevel::Info
        } else {
            LogLevel::Error
        };
        let mut entry = LogEntry::new(String::new(), level, SCENARIO_RESULT_EVENT)
            .with_scenario(self.scenario.name())
            .with_outcome(self.outcome)
            .with_message(self.message.clone().unwrap_or_else(|| self.detail.clone()))
            .with_duration_us(self.duration_us)
            .with_details(serde_json::json!({
                "number": self.scenario.number(),
                "detail": self.detail,
                "deliveries": self.deliveries,
            }));
        if let Some(context) = &self.context {
            entry = entry.with_context(context.clone());
        }
        if let Some(code) = self.error_code {
            entry = entry.with_error_code(code, self.error_name.as_deref());
        }
        if let Some(probe) = &self.probe {
            match &probe.exit {
                probe::ProbeExit::Exited { code } => entry = entry.with_exit_code(*code),
                probe::ProbeExit::Signaled { signal, .. } => entry = entry.with_signal(*signal),
                probe::ProbeExit::Returned => entry = entry.with_exit_code(0),
                probe::ProbeExit::Unknown => {}
            }
        }
        entry
    }
}

/// Run every scenario in order.
#[must_use]
pub fn run_all(probe_exe: &Path) -> Vec<ScenarioResult> {
    Scenario::ALL
        .iter()
        .map(|scenario| scenario.run(probe_exe))
        .collect()
}

type Seen = Arc<Mutex<Vec<NativeError>>>;

fn record_errors(ctx: &Context) -> Result<Seen, HarnessError> {
    let seen: Seen = Arc::default();
    let sink = Arc::clone(&seen);
    ctx.set_error_observer(move |err| sink.lock().push(err.clone()))?;
    Ok(seen)
}

fn expect(scenario: Scenario, cond: bool, message: impl FnOnce() -> String) -> Result<(), HarnessError> {
    if cond {
        Ok(())
    } else {
        Err(HarnessError::scenario(scenario.name(), message()))
    }
}

/// `x >= y` over Booleans, which libz3 rejects.
fn sort_mismatch(ctx: &Context) -> Result<Result<(), SolverError>, HarnessError> {
    let b = ctx.bool_sort()?;
    let x = ctx.constant(&ctx.symbol("x")?, &b)?;
    let y = ctx.constant(&ctx.symbol("y")?, &b)?;
    Ok(x.ge(&y).map(|_| ()))
}

/// `x + 1 > x` over integers: satisfiable, raises nothing.
fn satisfiable_check(ctx: &Context) -> Result<LBool, SolverError> {
    let int = ctx.int_sort()?;
    let x = ctx.constant(&ctx.symbol("x")?, &int)?;
    let one = ctx.int(1, &int)?;
    let solver = ctx.solver()?;
    solver.assert(&x.add(&[&one])?.gt(&x)?)?;
    solver.check()
}

fn well_formed() -> Result<ScenarioResult, HarnessError> {
    let scenario = Scenario::WellFormed;
    let ctx = Context::with_default_config()?;
    let seen = record_errors(&ctx)?;

    let result = satisfiable_check(&ctx);
    let deliveries = seen.lock().len();
    expect(scenario, deliveries == 0, || {
        format!("{deliveries} error(s) delivered for a well-formed operation")
    })?;
    let verdict = result?;
    expect(scenario, verdict == LBool::True, || format!("check returned {verdict}"))?;

    let mut out = ScenarioResult::new(scenario, Outcome::Pass, "no error delivered; check returned true");
    out.context = Some(ctx.id().to_string());
    Ok(out)
}

fn invalid_operation() -> Result<ScenarioResult, HarnessError> {
    let scenario = Scenario::InvalidOperation;
    let ctx = Context::with_default_config()?;
    let seen = record_errors(&ctx)?;

    let Err(err) = sort_mismatch(&ctx)? else {
        return Err(HarnessError::scenario(scenario.name(), "invalid operation returned Ok"));
    };
    let native = err.native().cloned().ok_or_else(|| {
        HarnessError::scenario(scenario.name(), format!("expected a native error, got: {err}"))
    })?;
    let seen = seen.lock().clone();

    expect(scenario, seen.len() == 1, || {
        format!("expected exactly one delivery, got {}", seen.len())
    })?;
    expect(scenario, seen[0] == native, || {
        format!("observer saw {} but the wrapper returned {native}", seen[0])
    })?;
    expect(scenario, native.context == ctx.id(), || {
        format!("error names {} instead of {}", native.context, ctx.id())
    })?;

    let mut out = ScenarioResult::new(
        scenario,
        Outcome::Pass,
        "one delivery; wrapper returned the delivered code",
    )
    .with_error(&native);
    out.deliveries = seen.len();
    Ok(out)
}

fn context_isolation() -> Result<ScenarioResult, HarnessError> {
    let scenario = Scenario::ContextIsolation;
    let c1 = Context::with_default_config()?;
    let c2 = Context::with_default_config()?;
    let seen1 = record_errors(&c1)?;
    let seen2 = record_errors(&c2)?;

    let Err(err) = sort_mismatch(&c1)? else {
        return Err(HarnessError::scenario(scenario.name(), "invalid operation on C1 returned Ok"));
    };
    let native = err.native().cloned().ok_or_else(|| {
        HarnessError::scenario(scenario.name(), format!("expected a native error, got: {err}"))
    })?;
    expect(scenario, native.context == c1.id(), || {
        format!("error names {} instead of C1 {}", native.context, c1.id())
    })?;

    let verdict = satisfiable_check(&c2)?;
    expect(scenario, verdict == LBool::True, || {
        format!("C2 check returned {verdict} after C1 failed")
    })?;

    let (n1, n2) = (seen1.lock().len(), seen2.lock().len());
    expect(scenario, n1 == 1 && n2 == 0, || {
        format!("deliveries C1={n1} C2={n2}, expected 1 and 0")
    })?;

    let mut out = ScenarioResult::new(
        scenario,
        Outcome::Pass,
        format!("error named C1 {}; C2 {} unaffected", c1.id(), c2.id()),
    )
    .with_error(&native);
    out.deliveries = n1 + n2;
    Ok(out)
}

fn unhandled(probe_exe: &Path) -> Result<ScenarioResult, HarnessError> {
    let scenario = Scenario::Unhandled;
    let report = probe::run_probe(probe_exe)?;
    let outcome = if report.exit.terminated() {
        Outcome::Pass
    } else {
        Outcome::Fail
    };
    let detail = match &report.exit {
        probe::ProbeExit::Returned => "default handler returned control to the caller".to_string(),
        probe::ProbeExit::Exited { code } => format!("default handler exited the process with status {code}"),
        probe::ProbeExit::Signaled { name, .. } => format!("default handler killed the process with {name}"),
        probe::ProbeExit::Unknown => "process ended without exit status or signal".to_string(),
    };
    let mut out = ScenarioResult::new(scenario, outcome, detail);
    out.message = report.first_output_line.clone();
    out.probe = Some(report);
    Ok(out)
}
