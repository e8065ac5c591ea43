//! Failure capture and report assembly
//!
//! [`Reporter`] is fed failure events by the host runner, one at a time.
//! Each event runs through the trace pipeline and is appended to the list
//! of finalized failures; once the run ends the reports are written.

use crate::config::ReporterConfig;
use crate::frames::{format_frame, TraceFrameProcessor};
use crate::hints::HintGenerator;
use crate::models::{RawException, RawStep, Status};
use crate::path::PathNormalizer;
use crate::report::writer::{write_report, WriteError};
use crate::report::{json, text, AiReport, ExceptionInfo, Failure, RunInfo, SummaryInfo, TestInfo};
use crate::scenario::ScenarioExtractor;
use crate::trace::TraceNormalizer;
use crate::utils::{escape_console, truncate, CONSOLE_MAX_LEN};
use chrono::{SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

pub const JSON_REPORT_FILE: &str = "ai-report.json";
pub const TEXT_REPORT_FILE: &str = "ai-report.txt";

/// Inline console output shows at most this many steps and hints
const INLINE_STEPS: usize = 2;
const INLINE_HINTS: usize = 3;

/// The failing test as described by the runner
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TestDescriptor {
    pub display_name: String,
    pub signature: String,
    pub full_name: String,
    pub file: Option<String>,
}

/// One failure event delivered by the runner
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FailEvent {
    pub status: Status,
    /// Overrides the suite set by [`Reporter::before_suite`]
    #[serde(default)]
    pub suite: Option<String>,
    #[serde(default)]
    pub test: TestDescriptor,
    #[serde(default)]
    pub time_seconds: f64,
    pub exception: RawException,
    #[serde(default)]
    pub scenario_steps: Vec<RawStep>,
    #[serde(default)]
    pub artifacts: BTreeMap<String, Value>,
}

/// Result of writing one report file
#[derive(Debug)]
pub struct WriteOutcome {
    pub label: &'static str,
    pub path: PathBuf,
    pub result: Result<(), WriteError>,
}

pub struct Reporter {
    config: ReporterConfig,
    project_root: String,
    paths: PathNormalizer,
    traces: TraceNormalizer,
    frames: TraceFrameProcessor,
    scenarios: ScenarioExtractor,
    hints: HintGenerator,
    failures: Vec<Failure>,
    current_suite: String,
    started_at: Instant,
}

impl Reporter {
    pub fn new(config: ReporterConfig, project_root: &str) -> Self {
        let paths = PathNormalizer::new(project_root, config.compact_paths());
        let max_frames = config.max_frames();

        Self {
            traces: TraceNormalizer::new(paths.clone(), max_frames),
            frames: TraceFrameProcessor::new(paths.clone(), max_frames),
            scenarios: ScenarioExtractor::new(paths.clone()),
            hints: HintGenerator::new(),
            paths,
            config,
            project_root: project_root.to_string(),
            failures: Vec::new(),
            current_suite: String::new(),
            started_at: Instant::now(),
        }
    }

    pub fn config(&self) -> &ReporterConfig {
        &self.config
    }

    pub fn before_suite(&mut self, name: &str) {
        self.current_suite = name.to_string();
    }

    pub fn failures(&self) -> &[Failure] {
        &self.failures
    }

    /// Run one failure through the pipeline and record it
    pub fn capture_failure(&mut self, event: FailEvent) -> &Failure {
        let exception = &event.exception;

        let trace = self.traces.normalize(exception);
        let trace = self.frames.prepare(exception, trace);
        let scenario_steps = if self.config.include_steps() {
            self.scenarios.extract(&event.scenario_steps, self.config.max_frames())
        } else {
            Vec::new()
        };
        let hints = self.hints.generate(exception, &trace, &scenario_steps);

        let comparison = exception.comparison.clone();
        let exception_info = ExceptionInfo {
            class: exception.class.clone(),
            message: exception.message.clone(),
            previous: exception.previous_chain(),
            comparison_expected: comparison.as_ref().map(|c| c.expected.clone()),
            comparison_actual: comparison.as_ref().map(|c| c.actual.clone()),
            comparison_diff: comparison.map(|c| c.diff),
        };

        let artifacts = if self.config.include_artifacts() {
            self.normalize_artifacts(&event.artifacts)
        } else {
            BTreeMap::new()
        };

        let failure = Failure {
            status: event.status,
            suite: event.suite.clone().unwrap_or_else(|| self.current_suite.clone()),
            test: TestInfo {
                display_name: event.test.display_name.clone(),
                signature: event.test.signature.clone(),
                full_name: event.test.full_name.clone(),
                file: self.paths.normalize_opt(event.test.file.as_deref()),
            },
            time_seconds: event.time_seconds,
            exception: exception_info,
            scenario_steps,
            trace,
            artifacts,
            hints,
        };

        log::debug!(
            "captured {} for {} ({} frames)",
            failure.status,
            failure.test.display_name,
            failure.trace.len()
        );

        self.failures.push(failure);
        &self.failures[self.failures.len() - 1]
    }

    /// Scalar artifacts are paths; anything else is kept as encoded JSON
    fn normalize_artifacts(&self, artifacts: &BTreeMap<String, Value>) -> BTreeMap<String, String> {
        artifacts
            .iter()
            .map(|(kind, value)| {
                let rendered = match value {
                    Value::String(path) => self.paths.normalize(path),
                    Value::Number(number) => self.paths.normalize(&number.to_string()),
                    Value::Bool(true) => "1".to_string(),
                    Value::Bool(false) => String::new(),
                    other => other.to_string(),
                };
                (kind.clone(), rendered)
            })
            .collect()
    }

    /// Assemble the report; totals are derived from the failures when not given
    pub fn build_report(&self, summary: Option<SummaryInfo>) -> AiReport {
        let elapsed = self.started_at.elapsed().as_secs_f64();

        AiReport {
            run: RunInfo {
                generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, false),
                duration_seconds: (elapsed * 1_000_000.0).round() / 1_000_000.0,
                project_root: self.project_root.replace('\\', "/").trim_end_matches('/').to_string(),
                output_dir: self.config.output_dir().to_string(),
            },
            summary: summary.unwrap_or_else(|| SummaryInfo::from_failures(&self.failures)),
            failures: self.failures.clone(),
        }
    }

    /// Write the configured report files; each write is attempted independently
    pub fn write_reports(&self, report: &AiReport) -> Vec<WriteOutcome> {
        let output_dir = Path::new(self.config.output_dir());
        let mut outcomes = Vec::new();

        if self.config.wants_json() {
            let path = output_dir.join(JSON_REPORT_FILE);
            let result = json::format(report)
                .map_err(WriteError::from)
                .and_then(|contents| write_report(&path, &contents));
            outcomes.push(WriteOutcome {
                label: "AI JSON",
                path,
                result,
            });
        }

        if self.config.wants_text() {
            let path = output_dir.join(TEXT_REPORT_FILE);
            let result = write_report(&path, &text::format(report));
            outcomes.push(WriteOutcome {
                label: "AI TEXT",
                path,
                result,
            });
        }

        for outcome in &outcomes {
            if let Err(err) = &outcome.result {
                log::warn!("{} report generation failed: {}", outcome.label, err);
            }
        }

        outcomes
    }

    /// Console lines summarizing a failure; empty for statuses that are not shown inline
    pub fn inline_context(&self, failure: &Failure) -> Vec<String> {
        let mut lines = Vec::new();
        if !failure.status.is_reportable_inline() {
            return lines;
        }

        let exception = &failure.exception;
        lines.push(format!("    Exception: {}", escape_console(&exception.class)));
        lines.push(format!(
            "    Message: {}",
            escape_console(&truncate(&exception.message, CONSOLE_MAX_LEN))
        ));

        if let Some(diff) = exception.comparison_diff.as_deref().filter(|d| !d.is_empty()) {
            lines.push("    Diff:".to_string());
            for diff_line in diff.split('\n') {
                lines.push(format!("      {}", escape_console(diff_line)));
            }
        }

        if !failure.trace.is_empty() {
            lines.push("    Trace:".to_string());
            for (index, frame) in failure.trace.iter().take(self.config.max_frames()).enumerate() {
                lines.push(format!("      #{} {}", index + 1, escape_console(&format_frame(frame))));
            }
        }

        if !failure.scenario_steps.is_empty() {
            lines.push("    Scenario:".to_string());
            for step in failure.scenario_steps.iter().take(INLINE_STEPS) {
                lines.push(format!("      - {}", escape_console(&step.step)));
            }
        }

        if !failure.artifacts.is_empty() {
            lines.push("    Artifacts:".to_string());
            for (kind, path) in &failure.artifacts {
                lines.push(format!("      - {}: {}", escape_console(kind), escape_console(path)));
            }
        }

        if !failure.hints.is_empty() {
            lines.push("    Hints:".to_string());
            for hint in failure.hints.iter().take(INLINE_HINTS) {
                lines.push(format!("      - {}", escape_console(hint)));
            }
        }

        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RawConfig;
    use crate::models::{ComparisonFailure, FrameRecord};
    use serde_json::json;
    use tempfile::TempDir;

    fn reporter_with(raw: RawConfig, output_dir: &str) -> Reporter {
        let config = ReporterConfig::from_raw(&raw, output_dir, "/repo/project").unwrap();
        Reporter::new(config, "/repo/project")
    }

    fn reporter() -> Reporter {
        reporter_with(RawConfig::default(), "/repo/project/tests/_output")
    }

    fn event(status: Status) -> FailEvent {
        FailEvent {
            status,
            suite: None,
            test: TestDescriptor {
                display_name: "LoginCest: Sign in".to_string(),
                signature: "LoginCest:signIn".to_string(),
                full_name: "tests/Acceptance/LoginCest.php:signIn".to_string(),
                file: Some("/repo/project/tests/Acceptance/LoginCest.php".to_string()),
            },
            time_seconds: 1.25,
            exception: RawException::new("Facebook\\WebDriver\\Exception\\NoSuchElementException", "NoSuchElement: #login")
                .thrown_at("/repo/project/vendor/php-webdriver/webdriver/lib/Remote/HttpCommandExecutor.php", 385)
                .with_trace(vec![
                    FrameRecord::new("/repo/project/vendor/codeception/module-webdriver/src/WebDriver.php", 900)
                        .call("Codeception\\Module\\WebDriver", "->", "click")
                        .into(),
                    FrameRecord::new("/repo/project/tests/Acceptance/LoginCest.php", 14)
                        .call("Tests\\Acceptance\\LoginCest", "->", "signIn")
                        .into(),
                ]),
            scenario_steps: vec![
                RawStep {
                    step: "amOnPage \"/login\"".to_string(),
                    file: None,
                    line: None,
                    failed: false,
                },
                RawStep {
                    step: "click \"#login\"".to_string(),
                    file: Some("/repo/project/tests/Acceptance/LoginCest.php".to_string()),
                    line: Some(14),
                    failed: true,
                },
            ],
            artifacts: BTreeMap::from([
                ("png".to_string(), json!("/repo/project/tests/_output/LoginCest.fail.png")),
                ("meta".to_string(), json!({"browser": "chrome"})),
            ]),
        }
    }

    #[test]
    fn test_capture_failure_runs_pipeline() {
        let mut reporter = reporter();
        reporter.before_suite("Acceptance");
        let failure = reporter.capture_failure(event(Status::Error)).clone();

        assert_eq!(failure.suite, "Acceptance");
        assert_eq!(failure.test.file.as_deref(), Some("tests/Acceptance/LoginCest.php"));
        // The vendor throw site is prepended, vendor stack frames are filtered
        assert_eq!(
            failure.trace[0].call.as_deref(),
            Some("[throw] Facebook\\WebDriver\\Exception\\NoSuchElementException")
        );
        assert_eq!(failure.trace[1].file.as_deref(), Some("tests/Acceptance/LoginCest.php"));
        assert_eq!(failure.scenario_steps[0].step, "click \"#login\"");
        assert_eq!(failure.artifacts["png"], "tests/_output/LoginCest.fail.png");
        assert_eq!(failure.artifacts["meta"], "{\"browser\":\"chrome\"}");
        let kinds: Vec<_> = failure.artifacts.keys().map(String::as_str).collect();
        assert_eq!(kinds, vec!["meta", "png"]);
        assert!(failure.hints.iter().any(|h| h.contains("UI element lookup failed")));
        assert!(failure.hints.iter().any(|h| h.contains("last scenario step")));
        assert_eq!(reporter.failures().len(), 1);
    }

    #[test]
    fn test_capture_respects_step_and_artifact_flags() {
        let raw = RawConfig {
            include_steps: Some(toml::Value::Boolean(false)),
            include_artifacts: Some(toml::Value::Boolean(false)),
            ..Default::default()
        };
        let mut reporter = reporter_with(raw, "/repo/project/tests/_output");
        let failure = reporter.capture_failure(event(Status::Failure)).clone();

        assert!(failure.scenario_steps.is_empty());
        assert!(failure.artifacts.is_empty());
        assert!(!failure.hints.iter().any(|h| h.contains("last scenario step")));
    }

    #[test]
    fn test_comparison_and_previous_chain() {
        let mut reporter = reporter();
        let mut fail = event(Status::Failure);
        fail.exception = RawException::new("PHPUnit\\Framework\\ExpectationFailedException", "Failed asserting that 1 is 2.")
            .thrown_at("/repo/project/tests/Unit/MathTest.php", 9)
            .caused_by(RawException::new("LogicException", "root cause"));
        fail.exception.comparison = Some(ComparisonFailure {
            expected: "2".to_string(),
            actual: "1".to_string(),
            diff: "-2\n+1\n".to_string(),
        });

        let failure = reporter.capture_failure(fail).clone();

        assert_eq!(failure.exception.comparison_expected.as_deref(), Some("2"));
        assert_eq!(failure.exception.previous[0].class, "LogicException");
        assert_eq!(failure.trace, vec![crate::models::TraceFrame::new(
            "tests/Unit/MathTest.php",
            9,
            "[throw] PHPUnit\\Framework\\ExpectationFailedException"
        )]);
        assert!(failure.hints[0].contains("Assertion mismatch"));

        let lines = reporter.inline_context(&failure);
        assert!(lines.contains(&"    Diff:".to_string()));
        assert!(lines.contains(&"      -2".to_string()));
    }

    #[test]
    fn test_inline_context_skipped_for_quiet_statuses() {
        let mut reporter = reporter();
        let failure = reporter.capture_failure(event(Status::Skipped)).clone();
        assert!(reporter.inline_context(&failure).is_empty());
    }

    #[test]
    fn test_inline_context_limits_hints_and_steps() {
        let mut reporter = reporter();
        let mut fail = event(Status::Failure);
        fail.exception.message = "Failed asserting element\nis visible".to_string();
        fail.exception.class = "AssertionError".to_string();
        let failure = reporter.capture_failure(fail).clone();

        let lines = reporter.inline_context(&failure);
        assert_eq!(lines[1], "    Message: Failed asserting element\\nis visible");

        let hints_at = lines.iter().position(|l| l == "    Hints:").unwrap();
        assert_eq!(lines.len() - hints_at - 1, INLINE_HINTS);
    }

    #[test]
    fn test_build_report_derives_summary() {
        let mut reporter = reporter();
        reporter.capture_failure(event(Status::Failure));
        reporter.capture_failure(event(Status::Error));

        let report = reporter.build_report(None);
        assert_eq!(report.summary.tests, 2);
        assert_eq!(report.summary.errors, 1);
        assert_eq!(report.run.project_root, "/repo/project");
        assert_eq!(report.failures.len(), 2);
    }

    #[test]
    fn test_write_reports_both_formats() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("out");
        let mut reporter = reporter_with(RawConfig::default(), &output.to_string_lossy());
        reporter.capture_failure(event(Status::Failure));

        let outcomes = reporter.write_reports(&reporter.build_report(None));

        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(|o| o.result.is_ok()));
        let json = std::fs::read_to_string(output.join(JSON_REPORT_FILE)).unwrap();
        let parsed: AiReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.failures.len(), 1);
        assert!(std::fs::read_to_string(output.join(TEXT_REPORT_FILE))
            .unwrap()
            .starts_with("Context\n"));
    }

    #[test]
    fn test_write_failure_is_isolated() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("out");
        std::fs::create_dir_all(output.join(JSON_REPORT_FILE)).unwrap();
        let reporter = reporter_with(RawConfig::default(), &output.to_string_lossy());

        let outcomes = reporter.write_reports(&reporter.build_report(None));

        assert!(outcomes[0].result.is_err());
        assert!(outcomes[1].result.is_ok());
        assert!(output.join(TEXT_REPORT_FILE).is_file());
    }
}
