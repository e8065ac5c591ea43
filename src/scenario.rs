//! Scenario step extraction

use crate::models::{RawStep, ScenarioStep};
use crate::path::PathNormalizer;

#[derive(Debug, Clone)]
pub struct ScenarioExtractor {
    paths: PathNormalizer,
}

impl ScenarioExtractor {
    pub fn new(paths: PathNormalizer) -> Self {
        Self { paths }
    }

    /// Steps newest-first, unlabeled steps skipped, at most `max_frames` of them
    pub fn extract(&self, steps: &[RawStep], max_frames: usize) -> Vec<ScenarioStep> {
        steps
            .iter()
            .rev()
            .filter(|step| !step.step.is_empty())
            .take(max_frames.max(1))
            .map(|step| ScenarioStep {
                step: step.step.clone(),
                file: step
                    .file
                    .as_deref()
                    .map(|file| self.paths.normalize(file))
                    .filter(|file| !file.is_empty()),
                line: step.line,
                failed: step.failed,
            })
            .collect()
    }
}
