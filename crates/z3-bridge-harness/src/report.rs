//! Machine-readable run report.

use std::path::Path;

use serde::{Deserialize, Serialize};
use z3_bridge::BridgeStatsSnapshot;

use crate::scenarios::ScenarioResult;
use crate::structured_log::{ArtifactIndex, Outcome, now_utc};

/// Adapter counters accumulated over the run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryCounters {
    pub delivered: u64,
    pub unrouted: u64,
    pub coalesced: u64,
    pub observer_panics: u64,
}

impl From<BridgeStatsSnapshot> for DeliveryCounters {
    fn from(s: BridgeStatsSnapshot) -> Self {
        Self {
            delivered: s.delivered,
            unrouted: s.unrouted,
            coalesced: s.coalesced,
            observer_panics: s.observer_panics,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub errored: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarnessReport {
    pub suite: String,
    pub run_id: String,
    pub generated_utc: String,
    pub z3_version: String,
    pub summary: ReportSummary,
    pub counters: DeliveryCounters,
    pub scenarios: Vec<ScenarioResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifacts: Option<ArtifactIndex>,
}

impl HarnessReport {
    #[must_use]
    pub fn new(
        suite: impl Into<String>,
        run_id: impl Into<String>,
        scenarios: Vec<ScenarioResult>,
        counters: DeliveryCounters,
    ) -> Self {
        let mut summary = ReportSummary {
            total: scenarios.len(),
            ..ReportSummary::default()
        };
        for result in &scenarios {
            match result.outcome {
                Outcome::Pass => summary.passed += 1,
                Outcome::Fail => summary.failed += 1,
                Outcome::Error => summary.errored += 1,
                Outcome::Skip => summary.skipped += 1,
            }
        }
        Self {
            suite: suite.into(),
            run_id: run_id.into(),
            generated_utc: now_utc(),
            z3_version: z3_bridge::version().to_string(),
            summary,
            counters,
            scenarios,
            artifacts: None,
        }
    }

    /// Hash the run's log into the report's artifact index.
    pub fn attach_log(&mut self, log_path: &Path) -> std::io::Result<()> {
        let index = self
            .artifacts
            .get_or_insert_with(|| ArtifactIndex::new(self.run_id.clone()));
        index.add_file(log_path, "log")?;
        Ok(())
    }

    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.summary.passed == self.summary.total
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn write(&self, path: &Path) -> Result<(), crate::HarnessError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// One line per scenario for terminal output.
    #[must_use]
    pub fn render_summary(&self) -> String {
        let mut out = String::new();
        for result in &self.scenarios {
            out.push_str(&format!(
                "[{:?}] scenario {} {}: {}\n",
                result.outcome,
                result.scenario.number(),
                result.scenario.name(),
                result.detail
            ));
        }
        out.push_str(&format!(
            "{}/{} passed (z3 {})\n",
            self.summary.passed, self.summary.total, self.z3_version
        ));
        out
    }
}
