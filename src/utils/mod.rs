//! Small helpers shared by the pipeline stages and the console output

/// Default byte budget for messages echoed to the console
pub const CONSOLE_MAX_LEN: usize = 260;

/// Return `primary` unless it came out empty, in which case `fallback` is used.
///
/// Both the vendor filter and the noise filter rely on this so a filter can
/// never turn a non-empty trace into an empty one.
pub fn non_empty_or<T, F>(primary: Vec<T>, fallback: F) -> Vec<T>
where
    F: FnOnce() -> Vec<T>,
{
    if primary.is_empty() {
        fallback()
    } else {
        primary
    }
}

/// Make a message safe to print on a single console line
pub fn escape_console(message: &str) -> String {
    message.replace('\n', "\\n").replace('\r', "\\r")
}

/// Truncate to at most `max_len` bytes, marking the cut with `...`
pub fn truncate(message: &str, max_len: usize) -> String {
    if message.len() <= max_len {
        return message.to_string();
    }

    let mut cut = max_len.saturating_sub(3);
    while !message.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}...", &message[..cut])
}
