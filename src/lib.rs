//! ai-reporter: compact, deterministic failure reports for automated diagnosis
//!
//! A failing test's exception and raw call stack go in; a bounded,
//! noise-free trace plus diagnostic hints come out:
//! - [`trace::TraceNormalizer`] normalizes, deduplicates and caps raw frames
//! - [`frames::TraceFrameProcessor`] splices in the throw site and strips framework noise
//! - [`hints::HintGenerator`] derives short, category-keyed hints
//!
//! [`reporter::Reporter`] wires these together for a test run and writes
//! the JSON and text reports.

pub mod config;
pub mod frames;
pub mod hints;
pub mod models;
pub mod path;
pub mod report;
pub mod reporter;
pub mod scenario;
pub mod trace;
pub mod utils;

pub use frames::{format_frame, TraceFrameProcessor};
pub use hints::HintGenerator;
pub use models::{RawException, RawFrame, TraceFrame};
pub use path::PathNormalizer;
pub use reporter::{FailEvent, Reporter};
pub use trace::TraceNormalizer;

/// Normalize and finalize one exception's trace with the given budget
pub fn prepare_trace(paths: &PathNormalizer, exception: &RawException, max_frames: usize) -> Vec<TraceFrame> {
    let trace = TraceNormalizer::new(paths.clone(), max_frames).normalize(exception);
    TraceFrameProcessor::new(paths.clone(), max_frames).prepare(exception, trace)
}
