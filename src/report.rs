//! Run results.
//!
//! [`ResultReporter`] only ever appends. The summary it produces is the single
//! externally visible output of a run: plain text by default, JSON on request.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Result of one scenario as seen by the reporter
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutcomeRecord {
    pub label: String,
    pub passed: bool,
    pub message: Option<String>,
}

/// Running tally of a run
#[derive(Debug, Clone, Default, Serialize)]
pub struct TestOutcome {
    /// Scenarios finished so far
    pub completed: usize,
    pub records: Vec<OutcomeRecord>,
}

/// Accumulates outcomes and produces the final summary
#[derive(Debug)]
pub struct ResultReporter {
    outcome: TestOutcome,
    started_at: DateTime<Utc>,
}

impl ResultReporter {
    pub fn new() -> Self {
        Self {
            outcome: TestOutcome::default(),
            started_at: Utc::now(),
        }
    }

    pub fn record_outcome(&mut self, label: &str, passed: bool, message: Option<String>) {
        self.outcome.completed += 1;
        tracing::debug!(label, passed, "Recorded outcome {}", self.outcome.completed);
        self.outcome.records.push(OutcomeRecord {
            label: label.to_string(),
            passed,
            message,
        });
    }

    pub fn outcome(&self) -> &TestOutcome {
        &self.outcome
    }

    /// Close the run. Consumes the reporter, so it happens once.
    pub fn summarize(self) -> RunSummary {
        let passed = self.outcome.records.iter().filter(|r| r.passed).count();
        RunSummary {
            completed: self.outcome.completed,
            passed,
            failed: self.outcome.completed - passed,
            started_at: self.started_at,
            finished_at: Utc::now(),
            records: self.outcome.records,
        }
    }
}

impl Default for ResultReporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Final counts plus every record
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub completed: usize,
    pub passed: usize,
    pub failed: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub records: Vec<OutcomeRecord>,
}

impl RunSummary {
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for record in &self.records {
            let status = if record.passed { "PASS" } else { "FAIL" };
            match &record.message {
                Some(message) => writeln!(f, "{} {} - {}", status, record.label, message)?,
                None => writeln!(f, "{} {}", status, record.label)?,
            }
        }
        let seconds = (self.finished_at - self.started_at).num_milliseconds() as f64 / 1000.0;
        write!(
            f,
            "{} scenarios completed: {} passed, {} failed ({:.1}s)",
            self.completed, self.passed, self.failed, seconds
        )
    }
}
