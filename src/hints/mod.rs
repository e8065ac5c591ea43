//! Rule-based diagnostic hints
//!
//! Each rule owns one [`HintCategory`]. Rules are evaluated in a fixed order
//! and a category contributes at most one hint. The generic hint is only
//! emitted when no other rule fired.

pub mod base;

pub mod assertion;
pub mod runtime;
pub mod steps;
pub mod trace;
pub mod ui;

use crate::models::{RawException, ScenarioStep, TraceFrame};
use base::{HintCategory, HintContext, HintRule};

pub const GENERIC_HINT: &str =
    "Start with the first trace frame and exception message, then reproduce with only the failing test.";

/// Get all hint rules in evaluation order
pub fn get_all_rules() -> Vec<Box<dyn HintRule>> {
    vec![
        Box::new(assertion::AssertionRule::new()),
        Box::new(runtime::RuntimeRule::new()),
        Box::new(ui::UiRule::new()),
        Box::new(trace::EmptyTraceRule::new()),
        Box::new(steps::ScenarioStepsRule::new()),
    ]
}

/// Produces the ordered hint list for one failure
pub struct HintGenerator {
    rules: Vec<Box<dyn HintRule>>,
}

impl Default for HintGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl HintGenerator {
    pub fn new() -> Self {
        Self {
            rules: get_all_rules(),
        }
    }

    /// Hints keyed by category, in insertion order
    pub fn generate_keyed(
        &self,
        exception: &RawException,
        trace: &[TraceFrame],
        steps: &[ScenarioStep],
    ) -> Vec<(HintCategory, &'static str)> {
        let context = HintContext {
            exception,
            trace,
            steps,
        };

        let mut hints: Vec<(HintCategory, &'static str)> = Vec::new();
        for rule in &self.rules {
            let category = rule.category();
            if hints.iter().any(|(seen, _)| *seen == category) {
                continue;
            }
            if rule.applies(&context) {
                log::debug!("{} hint applies", category);
                hints.push((category, rule.hint()));
            }
        }

        if hints.is_empty() {
            hints.push((HintCategory::Generic, GENERIC_HINT));
        }

        hints
    }

    pub fn generate(&self, exception: &RawException, trace: &[TraceFrame], steps: &[ScenarioStep]) -> Vec<String> {
        self.generate_keyed(exception, trace, steps)
            .into_iter()
            .map(|(_, hint)| hint.to_string())
            .collect()
    }
}
