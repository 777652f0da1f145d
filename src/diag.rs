//! Diagnostic prefix formatting
//!
//! External tooling consumes these lines verbatim, so the format is fixed:
//! `path:line:col: kind: message` when both coordinates are known,
//! `path:line: kind: message` with only a line, `path: kind: message`
//! otherwise.

/// Placeholder path used for unnamed input
pub const UNNAMED_INPUT: &str = "<stdin>";

/// Formats a one-line diagnostic
///
/// `line` and `column` may be 0 when unknown; an empty `path` renders as
/// [`UNNAMED_INPUT`].
pub fn format(path: &str, line: usize, column: usize, kind: &str, message: &str) -> String {
    let path = if path.is_empty() { UNNAMED_INPUT } else { path };
    if line > 0 && column > 0 {
        format!("{}:{}:{}: {}: {}", path, line, column, kind, message)
    } else if line > 0 {
        format!("{}:{}: {}: {}", path, line, kind, message)
    } else {
        format!("{}: {}: {}", path, kind, message)
    }
}
