//! Report structure and serialization
//!
//! [`AiReport`] is what gets persisted: run metadata, result totals and the
//! finalized failures in the order they were captured.

pub mod json;
pub mod text;
pub mod writer;

use crate::models::{PreviousException, ScenarioStep, Status, TraceFrame};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiReport {
    pub run: RunInfo,
    pub summary: SummaryInfo,
    pub failures: Vec<Failure>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunInfo {
    /// RFC 3339 timestamp
    pub generated_at: String,
    pub duration_seconds: f64,
    pub project_root: String,
    pub output_dir: String,
}

/// Totals reported by the host runner
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryInfo {
    pub tests: u64,
    pub successful: u64,
    pub failures: u64,
    pub errors: u64,
    pub warnings: u64,
    pub skipped: u64,
    pub incomplete: u64,
    pub useless: u64,
    pub assertions: u64,
    pub successful_run: bool,
}

impl SummaryInfo {
    /// Derive totals from captured failures when the runner provides none
    pub fn from_failures(failures: &[Failure]) -> Self {
        let mut summary = SummaryInfo::default();

        for failure in failures {
            summary.tests += 1;
            match failure.status {
                Status::Failure => summary.failures += 1,
                Status::Error => summary.errors += 1,
                Status::Warning => summary.warnings += 1,
                Status::Incomplete => summary.incomplete += 1,
                Status::Skipped => summary.skipped += 1,
                Status::Useless => summary.useless += 1,
            }
        }
        summary.successful_run = summary.failures == 0 && summary.errors == 0;

        summary
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestInfo {
    pub display_name: String,
    pub signature: String,
    pub full_name: String,
    pub file: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExceptionInfo {
    pub class: String,
    pub message: String,
    pub previous: Vec<PreviousException>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub comparison_expected: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub comparison_actual: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub comparison_diff: Option<String>,
}

/// One finalized failure record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Failure {
    pub status: Status,
    pub suite: String,
    pub test: TestInfo,
    pub time_seconds: f64,
    pub exception: ExceptionInfo,
    pub scenario_steps: Vec<ScenarioStep>,
    pub trace: Vec<TraceFrame>,
    /// Ordered by artifact kind, not by the order the host reported them in
    pub artifacts: BTreeMap<String, String>,
    pub hints: Vec<String>,
}
