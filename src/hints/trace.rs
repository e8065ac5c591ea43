//! Empty traces

use super::base::{HintCategory, HintContext, HintRule};

pub struct EmptyTraceRule;

impl EmptyTraceRule {
    pub fn new() -> Self {
        Self
    }
}

impl HintRule for EmptyTraceRule {
    fn category(&self) -> HintCategory {
        HintCategory::Trace
    }

    fn hint(&self) -> &'static str {
        "No filtered trace frames were captured; rerun with higher verbosity if deeper diagnostics are needed."
    }

    fn applies(&self, context: &HintContext) -> bool {
        context.trace.is_empty()
    }
}
