//! Assertion mismatches

use super::base::{HintCategory, HintContext, HintRule};

pub struct AssertionRule;

impl AssertionRule {
    pub fn new() -> Self {
        Self
    }
}

impl HintRule for AssertionRule {
    fn category(&self) -> HintCategory {
        HintCategory::Assertion
    }

    fn hint(&self) -> &'static str {
        "Assertion mismatch detected; compare expected and actual values at the top non-vendor frame."
    }

    fn applies(&self, context: &HintContext) -> bool {
        context.exception.class.contains("Assertion") || context.exception.message.contains("Failed asserting")
    }
}
