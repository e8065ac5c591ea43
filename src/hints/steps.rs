//! Scenario-driven tests

use super::base::{HintCategory, HintContext, HintRule};

pub struct ScenarioStepsRule;

impl ScenarioStepsRule {
    pub fn new() -> Self {
        Self
    }
}

impl HintRule for ScenarioStepsRule {
    fn category(&self) -> HintCategory {
        HintCategory::Steps
    }

    fn hint(&self) -> &'static str {
        "Use the last scenario step to reproduce the failure quickly before expanding diagnostics."
    }

    fn applies(&self, context: &HintContext) -> bool {
        !context.steps.is_empty()
    }
}
