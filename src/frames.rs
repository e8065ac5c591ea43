//! Origin-frame injection and framework noise removal
//!
//! Runs after [`crate::trace::TraceNormalizer`]: the exact throw site is
//! spliced in as the first frame, then frames belonging to the test runner,
//! the assertion library, generated support code or the dependency manager
//! are removed. Every stage keeps the trace within `max_frames`.

use crate::models::{RawException, TraceFrame};
use crate::path::PathNormalizer;
use crate::utils::non_empty_or;

/// Prefix of the synthetic origin frame's `call`
pub const THROW_MARKER: &str = "[throw] ";

/// How a noise pattern is matched against a frame field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    Prefix,
    Contains,
}

impl MatchKind {
    fn matches(self, value: &str, pattern: &str) -> bool {
        match self {
            MatchKind::Prefix => value.starts_with(pattern),
            MatchKind::Contains => value.contains(pattern),
        }
    }
}

/// Framework file locations, checked against a frame's `file`
pub const NOISE_FILES: &[(MatchKind, &str)] = &[
    (MatchKind::Prefix, "vendor/phpunit/"),
    (MatchKind::Prefix, "vendor/codeception/"),
    (MatchKind::Prefix, "vendor/composer/"),
    (MatchKind::Prefix, "tests/Support/_generated/"),
    (MatchKind::Contains, "/vendor/phpunit/"),
    (MatchKind::Contains, "/vendor/codeception/"),
    (MatchKind::Contains, "/vendor/composer/"),
    (MatchKind::Contains, "/tests/Support/_generated/"),
];

/// Framework call signatures, checked only for frames without a `file`
pub const NOISE_CALLS: &[(MatchKind, &str)] = &[
    (MatchKind::Prefix, "[throw] PHPUnit\\Framework\\"),
    (MatchKind::Prefix, "[throw] Codeception\\"),
    (MatchKind::Contains, "PHPUnit\\Framework\\Constraint\\"),
    (MatchKind::Contains, "Codeception\\"),
];

fn matches_any(table: &[(MatchKind, &str)], value: &str) -> bool {
    table.iter().any(|(kind, pattern)| kind.matches(value, pattern))
}

/// Whether a frame belongs to framework internals
pub fn is_noise_frame(frame: &TraceFrame) -> bool {
    match frame.file.as_deref().filter(|f| !f.is_empty()) {
        Some(file) => matches_any(NOISE_FILES, file),
        None => matches_any(NOISE_CALLS, frame.call.as_deref().unwrap_or_default()),
    }
}

/// Finalizes a normalized trace for the report
#[derive(Debug, Clone)]
pub struct TraceFrameProcessor {
    paths: PathNormalizer,
    max_frames: usize,
}

impl TraceFrameProcessor {
    /// `max_frames` below 1 is clamped to 1
    pub fn new(paths: PathNormalizer, max_frames: usize) -> Self {
        Self {
            paths,
            max_frames: max_frames.max(1),
        }
    }

    /// Prepend the origin frame, then strip noise.
    ///
    /// The origin goes in first so that a throw site inside framework code is
    /// subject to the same noise filter as every other frame.
    pub fn prepare(&self, exception: &RawException, trace: Vec<TraceFrame>) -> Vec<TraceFrame> {
        let with_origin = self.prepend_origin_frame(exception, trace);
        self.remove_noise_frames(with_origin)
    }

    /// The synthetic frame for the exception's throw site
    pub fn origin_frame(&self, exception: &RawException) -> TraceFrame {
        let file = self.paths.normalize(&exception.file);

        TraceFrame {
            file: (!file.is_empty()).then_some(file),
            line: exception.line,
            call: Some(format!("{}{}", THROW_MARKER, exception.class)),
        }
    }

    /// Put the throw site first unless the top frame already points there.
    ///
    /// The origin always wins the budget: when the trace is full, the oldest
    /// frame is evicted to make room.
    pub fn prepend_origin_frame(&self, exception: &RawException, mut trace: Vec<TraceFrame>) -> Vec<TraceFrame> {
        let origin = self.origin_frame(exception);

        // A throw site without a file never matches, not even a file-less frame
        let same_location = origin.file.is_some()
            && trace
                .first()
                .is_some_and(|top| top.file == origin.file && top.line == origin.line);

        // The existing top frame keeps its own `call`, even if it names a
        // different exception than the origin would have.
        if !same_location {
            trace.insert(0, origin);
        }

        trace.truncate(self.max_frames);
        trace
    }

    /// Drop framework frames; an all-noise trace is returned unfiltered
    pub fn remove_noise_frames(&self, trace: Vec<TraceFrame>) -> Vec<TraceFrame> {
        let filtered: Vec<TraceFrame> = trace.iter().filter(|f| !is_noise_frame(f)).cloned().collect();

        let mut result = non_empty_or(filtered, || {
            if !trace.is_empty() {
                log::debug!("every frame is framework noise, keeping the unfiltered trace");
            }
            trace
        });
        result.truncate(self.max_frames);
        result
    }

    /// Single-line rendering: `file[:line] call`, `[internal]` when there is no file
    pub fn format_frame(&self, frame: &TraceFrame) -> String {
        format_frame(frame)
    }
}

/// See [`TraceFrameProcessor::format_frame`]
pub fn format_frame(frame: &TraceFrame) -> String {
    let mut location = frame.file.clone().unwrap_or_else(|| "[internal]".to_string());
    if let Some(line) = frame.line {
        location.push_str(&format!(":{}", line));
    }

    match frame.call.as_deref() {
        Some(call) if !call.is_empty() => format!("{} {}", location, call),
        _ => location,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn processor(max_frames: usize) -> TraceFrameProcessor {
        TraceFrameProcessor::new(PathNormalizer::new("/repo/project", true), max_frames)
    }

    fn frame(file: &str, line: i64, call: &str) -> TraceFrame {
        TraceFrame::new(file, line, call)
    }

    #[test]
    fn test_remove_noise_drops_framework_frames_when_project_frame_exists() {
        let trace = vec![
            frame(
                "vendor/phpunit/phpunit/src/Framework/Constraint/Constraint.php",
                120,
                "[throw] PHPUnit\\Framework\\ExpectationFailedException",
            ),
            frame("tests/Unit/Report/FooTest.php", 55, "PHPUnit\\Framework\\Assert::assertCount"),
        ];

        let filtered = processor(8).remove_noise_frames(trace);

        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].file.as_deref(), Some("tests/Unit/Report/FooTest.php"));
    }

    #[test]
    fn test_remove_noise_falls_back_when_only_framework_frames_exist() {
        let trace = vec![
            frame(
                "vendor/phpunit/phpunit/src/Framework/Constraint/Constraint.php",
                120,
                "[throw] PHPUnit\\Framework\\ExpectationFailedException",
            ),
            frame(
                "vendor/codeception/codeception/src/Codeception/Test/Test.php",
                230,
                "Codeception\\Test\\Test::dispatchOutcome",
            ),
        ];

        let filtered = processor(8).remove_noise_frames(trace.clone());
        assert_eq!(filtered, trace);

        let capped = processor(1).remove_noise_frames(trace.clone());
        assert_eq!(capped, vec![trace[0].clone()]);
    }

    #[test]
    fn test_noise_classification_for_fileless_frames() {
        let throw = TraceFrame {
            call: Some("[throw] Codeception\\Exception\\ModuleException".to_string()),
            ..Default::default()
        };
        let constraint = TraceFrame {
            call: Some("PHPUnit\\Framework\\Constraint\\IsEqual->evaluate".to_string()),
            ..Default::default()
        };
        let user = TraceFrame {
            call: Some("App\\Foo->bar".to_string()),
            ..Default::default()
        };

        assert!(is_noise_frame(&throw));
        assert!(is_noise_frame(&constraint));
        assert!(!is_noise_frame(&user));
        assert!(!is_noise_frame(&TraceFrame::default()));
    }

    #[test]
    fn test_project_file_is_never_noise_regardless_of_call() {
        let frame = frame("src/Foo.php", 3, "Codeception\\Module\\WebDriver->click");
        assert!(!is_noise_frame(&frame));
    }

    #[test]
    fn test_generated_support_code_is_noise() {
        assert!(is_noise_frame(&frame("tests/Support/_generated/AcceptanceTesterActions.php", 9, "")));
        assert!(is_noise_frame(&frame("/abs/vendor/composer/ClassLoader.php", 1, "")));
    }

    #[test]
    fn test_prepare_adds_origin_frame_and_formats_frame() {
        let exception = RawException::new("RuntimeException", "boom").thrown_at("/repo/project/src/Service.php", 7);

        let prepared = processor(2).prepare(
            &exception,
            vec![frame("tests/Unit/Report/FooTest.php", 12, "App\\Foo::bar")],
        );

        assert_eq!(prepared.len(), 2);
        assert!(prepared[0].call.as_deref().unwrap_or_default().starts_with("[throw] RuntimeException"));
        assert_eq!(prepared[0].file.as_deref(), Some("src/Service.php"));
        assert_eq!(format_frame(&prepared[1]), "tests/Unit/Report/FooTest.php:12 App\\Foo::bar");
    }

    #[test]
    fn test_origin_matching_top_frame_is_not_duplicated() {
        let exception = RawException::new("LogicException", "nope").thrown_at("/repo/project/src/A.php", 10);
        let trace = vec![frame("src/A.php", 10, "App\\A->run"), frame("src/B.php", 20, "App\\B->run")];

        let result = processor(8).prepend_origin_frame(&exception, trace.clone());
        assert_eq!(result, trace);

        let result = processor(1).prepend_origin_frame(&exception, trace.clone());
        assert_eq!(result, vec![trace[0].clone()]);
    }

    #[test]
    fn test_origin_evicts_oldest_frame_when_full() {
        let exception = RawException::new("LogicException", "nope").thrown_at("/repo/project/src/Z.php", 99);
        let trace = vec![frame("src/A.php", 1, "a"), frame("src/B.php", 2, "b")];

        let result = processor(2).prepend_origin_frame(&exception, trace);

        assert_eq!(result.len(), 2);
        assert_eq!(result[0], frame("src/Z.php", 99, "[throw] LogicException"));
        assert_eq!(result[1].file.as_deref(), Some("src/A.php"));
    }

    #[test]
    fn test_origin_into_empty_trace() {
        let exception = RawException::new("Error", "fatal").thrown_at("/repo/project/src/A.php", 5);
        let result = processor(3).prepend_origin_frame(&exception, Vec::new());
        assert_eq!(result, vec![frame("src/A.php", 5, "[throw] Error")]);
    }

    #[test]
    fn test_origin_without_throw_site_file() {
        let exception = RawException::new("Error", "fatal");
        let origin = processor(3).origin_frame(&exception);
        assert_eq!(origin.file, None);
        assert_eq!(origin.line, None);
        assert_eq!(origin.call.as_deref(), Some("[throw] Error"));
    }

    #[test]
    fn test_fileless_origin_is_always_prepended() {
        let exception = RawException::new("RuntimeException", "boom");
        let internal = TraceFrame {
            call: Some("array_map".to_string()),
            ..Default::default()
        };

        let result = processor(8).prepend_origin_frame(&exception, vec![internal.clone()]);
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].call.as_deref(), Some("[throw] RuntimeException"));
        assert_eq!(result[0].file, None);
        assert_eq!(result[1], internal);

        let mut exception = RawException::new("RuntimeException", "boom");
        exception.line = Some(5);
        let same_line = TraceFrame {
            line: Some(5),
            call: Some("App\\X->y".to_string()),
            ..Default::default()
        };

        let result = processor(8).prepend_origin_frame(&exception, vec![same_line.clone()]);
        assert_eq!(result[0].call.as_deref(), Some("[throw] RuntimeException"));
        assert_eq!(result[0].line, Some(5));
        assert_eq!(result[1], same_line);
    }

    #[test]
    fn test_origin_inside_framework_code_is_removed() {
        let exception = RawException::new("PHPUnit\\Framework\\AssertionFailedError", "failed")
            .thrown_at("/repo/project/vendor/phpunit/phpunit/src/Framework/Assert.php", 40);
        let trace = vec![frame("tests/Unit/FooTest.php", 12, "App\\FooTest->testBar")];

        let prepared = processor(8).prepare(&exception, trace.clone());
        assert_eq!(prepared, trace);
    }

    #[test]
    fn test_format_frame_variants() {
        assert_eq!(
            processor(8).format_frame(&frame("tests/Unit/FooTest.php", 12, "App\\Foo::bar")),
            "tests/Unit/FooTest.php:12 App\\Foo::bar"
        );

        let no_call = TraceFrame {
            file: Some("src/A.php".to_string()),
            line: Some(3),
            call: None,
        };
        assert_eq!(format_frame(&no_call), "src/A.php:3");

        let internal = TraceFrame {
            call: Some("array_map".to_string()),
            ..Default::default()
        };
        assert_eq!(format_frame(&internal), "[internal] array_map");
    }
}
