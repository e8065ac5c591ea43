//! Base trait for all hint rules

use crate::models::{RawException, ScenarioStep, TraceFrame};

/// Hint categories, in evaluation order. At most one hint per category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HintCategory {
    Assertion,
    Runtime,
    Ui,
    Trace,
    Steps,
    Generic,
}

impl HintCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            HintCategory::Assertion => "assertion",
            HintCategory::Runtime => "runtime",
            HintCategory::Ui => "ui",
            HintCategory::Trace => "trace",
            HintCategory::Steps => "steps",
            HintCategory::Generic => "generic",
        }
    }
}

impl std::fmt::Display for HintCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything a rule may look at
pub struct HintContext<'a> {
    pub exception: &'a RawException,
    pub trace: &'a [TraceFrame],
    pub steps: &'a [ScenarioStep],
}

/// Base trait that all hint rules must implement
pub trait HintRule: Send + Sync {
    fn category(&self) -> HintCategory;

    /// The hint text emitted when the rule fires
    fn hint(&self) -> &'static str;

    fn applies(&self, context: &HintContext) -> bool;
}
