//! Plain-text report rendering
//!
//! One `key: value` per line, grouped into sections, so the report can be
//! pasted into a prompt or grepped without a JSON parser.

use super::{AiReport, Failure};

pub fn format(report: &AiReport) -> String {
    let mut lines: Vec<String> = Vec::new();
    let run = &report.run;
    let summary = &report.summary;

    lines.push("Context".to_string());
    lines.push(format!("generated_at: {}", run.generated_at));
    lines.push(format!("project_root: {}", run.project_root));
    lines.push(format!(
        "totals: tests={} successful={} failures={} errors={} warnings={} skipped={} incomplete={} useless={} assertions={}",
        summary.tests,
        summary.successful,
        summary.failures,
        summary.errors,
        summary.warnings,
        summary.skipped,
        summary.incomplete,
        summary.useless,
        summary.assertions,
    ));
    lines.push(String::new());

    if report.failures.is_empty() {
        lines.push("Failure".to_string());
        lines.push("none".to_string());
        lines.push(String::new());
        return lines.join("\n");
    }

    for (index, failure) in report.failures.iter().enumerate() {
        format_failure(&mut lines, index + 1, failure);
    }

    lines.join("\n")
}

fn format_failure(lines: &mut Vec<String>, number: usize, failure: &Failure) {
    lines.push(format!("Failure {}", number));
    lines.push(format!("status: {}", failure.status));
    lines.push(format!("suite: {}", failure.suite));
    lines.push(format!("test: {}", failure.test.display_name));
    lines.push(format!("test_file: {}", failure.test.file.as_deref().unwrap_or_default()));
    lines.push(format!("test_signature: {}", failure.test.signature));
    lines.push(format!("duration_seconds: {}", failure.time_seconds));
    lines.push(String::new());

    let exception = &failure.exception;
    lines.push("Exception".to_string());
    lines.push(format!("exception_class: {}", exception.class));
    lines.push(format!("message: {}", exception.message));
    if let Some(expected) = non_empty(&exception.comparison_expected) {
        lines.push(format!("comparison_expected: {}", expected));
    }
    if let Some(actual) = non_empty(&exception.comparison_actual) {
        lines.push(format!("comparison_actual: {}", actual));
    }
    if let Some(diff) = non_empty(&exception.comparison_diff) {
        lines.push("comparison_diff:".to_string());
        lines.push(diff.trim_end().to_string());
    }
    if !exception.previous.is_empty() {
        lines.push("previous_exceptions:".to_string());
        for previous in &exception.previous {
            lines.push(format!("- {}: {}", previous.class, previous.message));
        }
    }
    lines.push(String::new());

    lines.push("Scenario".to_string());
    if failure.scenario_steps.is_empty() {
        lines.push("none".to_string());
    }
    for step in &failure.scenario_steps {
        let location = match (&step.file, step.line) {
            (Some(file), Some(line)) => format!(" ({}:{})", file, line),
            _ => String::new(),
        };
        let failed = if step.failed { " [FAILED]" } else { "" };
        lines.push(format!("- {}{}{}", step.step, location, failed));
    }
    lines.push(String::new());

    lines.push("Trace".to_string());
    if failure.trace.is_empty() {
        lines.push("none".to_string());
    }
    for (index, frame) in failure.trace.iter().enumerate() {
        let location = match (&frame.file, frame.line) {
            (Some(file), Some(line)) => format!("{}:{}", file, line),
            (Some(file), None) => file.clone(),
            _ => String::new(),
        };
        let call = frame.call.as_deref().unwrap_or_default();
        lines.push(format!("#{} {} {}", index + 1, location, call).trim_end().to_string());
    }
    lines.push(String::new());

    lines.push("Artifacts".to_string());
    if failure.artifacts.is_empty() {
        lines.push("none".to_string());
    }
    for (kind, path) in &failure.artifacts {
        lines.push(format!("- {}: {}", kind, path));
    }
    lines.push(String::new());

    lines.push("Hints".to_string());
    if failure.hints.is_empty() {
        lines.push("- none".to_string());
    }
    for hint in &failure.hints {
        lines.push(format!("- {}", hint));
    }
    lines.push(String::new());
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
