//! Type and argument errors

use super::base::{HintCategory, HintContext, HintRule};

/// Class name fragments; `Error` alone also covers the more specific ones
const RUNTIME_CLASS_MARKERS: &[&str] = &["TypeError", "ArgumentCountError", "Error"];

pub struct RuntimeRule;

impl RuntimeRule {
    pub fn new() -> Self {
        Self
    }
}

impl HintRule for RuntimeRule {
    fn category(&self) -> HintCategory {
        HintCategory::Runtime
    }

    fn hint(&self) -> &'static str {
        "Runtime/type issue detected; verify argument types and nullability at the top frame."
    }

    fn applies(&self, context: &HintContext) -> bool {
        RUNTIME_CLASS_MARKERS
            .iter()
            .any(|marker| context.exception.class.contains(marker))
    }
}
