//! Raw call stack normalization
//!
//! Turns the runner-captured stack into at most `max_frames` normalized
//! frames, innermost first. Vendor frames are skipped unless nothing else is
//! left, in which case the pass is repeated with them included.

use crate::models::{FrameRecord, RawException, RawFrame, TraceFrame};
use crate::path::PathNormalizer;
use crate::utils::non_empty_or;
use std::collections::HashSet;

/// Normalizes raw stacks into bounded, deduplicated frame lists
#[derive(Debug, Clone)]
pub struct TraceNormalizer {
    paths: PathNormalizer,
    max_frames: usize,
}

impl TraceNormalizer {
    /// `max_frames` below 1 is clamped to 1
    pub fn new(paths: PathNormalizer, max_frames: usize) -> Self {
        Self {
            paths,
            max_frames: max_frames.max(1),
        }
    }

    pub fn max_frames(&self) -> usize {
        self.max_frames
    }

    /// Normalize the exception's stack, falling back to vendor frames if needed
    pub fn normalize(&self, exception: &RawException) -> Vec<TraceFrame> {
        non_empty_or(self.normalize_from_frames(&exception.trace, false), || {
            log::debug!(
                "no project frames in {} trace, falling back to vendor frames",
                exception.class
            );
            self.normalize_from_frames(&exception.trace, true)
        })
    }

    /// Normalize raw frames in order, stopping once `max_frames` are collected
    pub fn normalize_from_frames(&self, frames: &[RawFrame], include_vendor: bool) -> Vec<TraceFrame> {
        let mut result = Vec::new();
        let mut seen = HashSet::new();

        for frame in frames {
            let RawFrame::Record(record) = frame else {
                continue;
            };

            let Some(normalized) = self.normalize_record(record, include_vendor) else {
                continue;
            };

            if !seen.insert(normalized.dedupe_key()) {
                continue;
            }

            result.push(normalized);
            if result.len() >= self.max_frames {
                break;
            }
        }

        result
    }

    /// `None` when the frame is a skipped vendor frame or has no usable field
    fn normalize_record(&self, record: &FrameRecord, include_vendor: bool) -> Option<TraceFrame> {
        let mut frame = TraceFrame::default();

        if let Some(file) = record.file.as_deref().filter(|f| !f.is_empty()) {
            if !include_vendor && self.paths.is_vendor_path(file) {
                return None;
            }

            let normalized = self.paths.normalize(file);
            if !normalized.is_empty() {
                frame.file = Some(normalized);
            }
        }

        frame.line = record.line;
        frame.call = call_signature(record);

        if frame.is_empty() {
            None
        } else {
            Some(frame)
        }
    }
}

/// `Class`, operator and `function` joined as-is, skipping empty parts
fn call_signature(record: &FrameRecord) -> Option<String> {
    let signature: String = [&record.class, &record.call_type, &record.function]
        .into_iter()
        .filter_map(|part| part.as_deref())
        .filter(|part| !part.is_empty())
        .collect();

    if signature.is_empty() {
        None
    } else {
        Some(signature)
    }
}
