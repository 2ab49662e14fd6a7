//! CLI entrypoint for the z3-bridge conformance harness.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use z3_bridge::BRIDGE_STATS;
use z3_bridge_harness::report::HarnessReport;
use z3_bridge_harness::structured_log::{
    LogEmitter, LogEntry, LogLevel, RUN_END_EVENT, validate_log_file,
};
use z3_bridge_harness::{HarnessError, probe, scenarios};

/// Conformance tooling for the z3-bridge error bridge.
#[derive(Debug, Parser)]
#[command(name = "z3-bridge-harness")]
#[command(about = "Runs the native error-delivery scenarios against libz3")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run every scenario and write a JSONL log and a JSON report.
    Run {
        /// Structured JSONL log output path.
        #[arg(long)]
        log: PathBuf,
        /// JSON report output path (if omitted, prints to stdout).
        #[arg(long)]
        report: Option<PathBuf>,
        /// Suite name used in trace ids.
        #[arg(long, default_value = "z3-bridge")]
        suite: String,
        /// Run id used in trace ids (defaults to the process id).
        #[arg(long)]
        run_id: Option<String>,
    },
    /// Child mode: trigger a native error on a context with no handler.
    #[command(name = "probe-unhandled", hide = true)]
    ProbeUnhandled,
    /// Validate a structured JSONL log.
    ValidateLog {
        #[arg(long)]
        log: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Run {
            log,
            report,
            suite,
            run_id,
        } => {
            let run_id = run_id.unwrap_or_else(|| format!("run-{}", std::process::id()));
            let exe = std::env::current_exe()?;
            let before = BRIDGE_STATS.snapshot();

            let mut emitter = LogEmitter::to_file(&log, &suite, &run_id)?;
            emitter.emit(LogLevel::Info, "run_start")?;
            let results = scenarios::run_all(&exe);
            for result in &results {
                emitter.emit_entry(result.to_log_entry())?;
            }
            let mut produced = vec![log.display().to_string()];
            produced.extend(report.iter().map(|path| path.display().to_string()));
            emitter.emit_entry(
                LogEntry::new(String::new(), LogLevel::Info, RUN_END_EVENT).with_artifacts(produced),
            )?;
            emitter.flush()?;
            drop(emitter);

            let counters = BRIDGE_STATS.snapshot().since(before).into();
            let mut harness_report = HarnessReport::new(&suite, &run_id, results, counters);
            harness_report.attach_log(&log)?;

            match report {
                Some(path) => {
                    harness_report.write(&path)?;
                    eprintln!("Report written to {}", path.display());
                }
                None => println!("{}", harness_report.to_json()?),
            }
            eprint!("{}", harness_report.render_summary());

            if !harness_report.all_passed() {
                return Err(format!(
                    "{} of {} scenarios did not pass",
                    harness_report.summary.total - harness_report.summary.passed,
                    harness_report.summary.total
                )
                .into());
            }
        }
        Command::ProbeUnhandled => {
            probe::trigger_unhandled_error()?;
            eprintln!("libz3 returned control after an unhandled error");
        }
        Command::ValidateLog { log } => {
            let (lines, errors) = validate_log_file(&log)?;
            for err in &errors {
                eprintln!("{err}");
            }
            if !errors.is_empty() {
                return Err(HarnessError::InvalidLog {
                    path: log,
                    errors: errors.len(),
                }
                .into());
            }
            println!("{}: {lines} valid record(s)", log.display());
        }
    }

    Ok(())
}
