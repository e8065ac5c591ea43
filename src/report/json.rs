//! JSON report rendering

use super::AiReport;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

/// Pretty-printed JSON with 4-space indentation and a trailing newline
pub fn format(report: &AiReport) -> serde_json::Result<String> {
    let mut buffer = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = Serializer::with_formatter(&mut buffer, formatter);
    report.serialize(&mut serializer)?;

    // serde_json only ever writes valid UTF-8
    let mut output = String::from_utf8_lossy(&buffer).into_owned();
    output.push('\n');
    Ok(output)
}
