//! Element lookup failures in browser-driven tests

use super::base::{HintCategory, HintContext, HintRule};

pub struct UiRule;

impl UiRule {
    pub fn new() -> Self {
        Self
    }
}

impl HintRule for UiRule {
    fn category(&self) -> HintCategory {
        HintCategory::Ui
    }

    fn hint(&self) -> &'static str {
        "UI element lookup failed; verify locator stability and page state before this step."
    }

    fn applies(&self, context: &HintContext) -> bool {
        let message = &context.exception.message;
        message.contains("NoSuchElement") || message.contains("element")
    }
}
