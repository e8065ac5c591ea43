//! Core data models for ai-reporter
//!
//! Raw inputs (`RawFrame`, `RawException`, `RawStep`) are loosely typed and
//! come straight from the host test runner. Everything the pipeline emits
//! (`TraceFrame`, `ScenarioStep`) is strongly typed and serde round-trippable.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One entry of a raw, runner-captured call stack.
///
/// Raw stacks are not trusted: an entry may not be a record at all, and any
/// field of a record may be missing or carry a value of the wrong type.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "Value")]
pub enum RawFrame {
    Record(FrameRecord),
    Malformed,
}

/// Fields of a raw frame record that had the expected type
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameRecord {
    pub file: Option<String>,
    pub line: Option<i64>,
    pub class: Option<String>,
    /// Call operator between class and function (`->`, `::`)
    pub call_type: Option<String>,
    pub function: Option<String>,
}

impl From<Value> for RawFrame {
    fn from(value: Value) -> Self {
        let Value::Object(map) = value else {
            return RawFrame::Malformed;
        };

        let text = |key: &str| map.get(key).and_then(Value::as_str).map(str::to_string);

        RawFrame::Record(FrameRecord {
            file: text("file"),
            line: map.get("line").and_then(Value::as_i64),
            class: text("class"),
            call_type: text("type"),
            function: text("function"),
        })
    }
}

impl From<FrameRecord> for RawFrame {
    fn from(record: FrameRecord) -> Self {
        RawFrame::Record(record)
    }
}

impl FrameRecord {
    pub fn new(file: &str, line: i64) -> Self {
        Self {
            file: Some(file.to_string()),
            line: Some(line),
            ..Default::default()
        }
    }

    pub fn call(mut self, class: &str, call_type: &str, function: &str) -> Self {
        self.class = Some(class.to_string());
        self.call_type = Some(call_type.to_string());
        self.function = Some(function.to_string());
        self
    }
}

/// A normalized stack frame.
///
/// A retained frame always carries at least one field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TraceFrame {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub line: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub call: Option<String>,
}

impl TraceFrame {
    pub fn new(file: &str, line: i64, call: &str) -> Self {
        Self {
            file: Some(file.to_string()),
            line: Some(line),
            call: Some(call.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.file.is_none() && self.line.is_none() && self.call.is_none()
    }

    /// Deduplication key, missing values collapse to `""` / `0`
    pub fn dedupe_key(&self) -> (String, i64, String) {
        (
            self.file.clone().unwrap_or_default(),
            self.line.unwrap_or(0),
            self.call.clone().unwrap_or_default(),
        )
    }
}

/// Expected/actual rendering attached to assertion failures
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComparisonFailure {
    #[serde(default)]
    pub expected: String,
    #[serde(default)]
    pub actual: String,
    #[serde(default)]
    pub diff: String,
}

/// The throwing exception as reported by the host runner
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawException {
    pub class: String,
    #[serde(default)]
    pub message: String,
    /// Throw-site file
    #[serde(default)]
    pub file: String,
    /// Throw-site line
    #[serde(default)]
    pub line: Option<i64>,
    /// Raw call stack, innermost frame first
    #[serde(default)]
    pub trace: Vec<RawFrame>,
    #[serde(default)]
    pub previous: Option<Box<RawException>>,
    #[serde(default)]
    pub comparison: Option<ComparisonFailure>,
}

/// A causally-previous exception in the report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviousException {
    pub class: String,
    pub message: String,
}

impl RawException {
    pub fn new(class: &str, message: &str) -> Self {
        Self {
            class: class.to_string(),
            message: message.to_string(),
            ..Default::default()
        }
    }

    pub fn thrown_at(mut self, file: &str, line: i64) -> Self {
        self.file = file.to_string();
        self.line = Some(line);
        self
    }

    pub fn with_trace(mut self, trace: Vec<RawFrame>) -> Self {
        self.trace = trace;
        self
    }

    pub fn caused_by(mut self, previous: RawException) -> Self {
        self.previous = Some(Box::new(previous));
        self
    }

    /// Flatten the `previous` chain, nearest cause first
    pub fn previous_chain(&self) -> Vec<PreviousException> {
        let mut chain = Vec::new();
        let mut cursor = self.previous.as_deref();

        while let Some(previous) = cursor {
            chain.push(PreviousException {
                class: previous.class.clone(),
                message: previous.message.clone(),
            });
            cursor = previous.previous.as_deref();
        }

        chain
    }
}

/// A scenario step as executed by the runner
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawStep {
    #[serde(default)]
    pub step: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub line: Option<i64>,
    #[serde(default)]
    pub failed: bool,
}

/// A scenario step in the report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioStep {
    pub step: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub line: Option<i64>,
    pub failed: bool,
}

/// Outcome category of a reported test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Failure,
    Error,
    Warning,
    Incomplete,
    Skipped,
    Useless,
}

impl Status {
    /// Whether the inline console context is printed for this status
    pub fn is_reportable_inline(self) -> bool {
        matches!(self, Status::Failure | Status::Error | Status::Warning)
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Failure => write!(f, "failure"),
            Status::Error => write!(f, "error"),
            Status::Warning => write!(f, "warning"),
            Status::Incomplete => write!(f, "incomplete"),
            Status::Skipped => write!(f, "skipped"),
            Status::Useless => write!(f, "useless"),
        }
    }
}
