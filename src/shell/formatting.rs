//! Formatting helpers for shell output.
//!
//! Renders help enumerations and router-style error pointers for the
//! read-evaluate loop.

use crate::engine::HelpEntry;

/// ANSI color codes for terminal output.
pub struct Colors;

impl Colors {
    /// Reset all formatting.
    pub const RESET: &'static str = "\x1b[0m";
    /// Bold text.
    pub const BOLD: &'static str = "\x1b[1m";
    /// Red color.
    pub const RED: &'static str = "\x1b[31m";
}

/// Formats an error message with styling.
pub fn format_error(text: &str) -> String {
    format!("{}{}{}{}", Colors::BOLD, Colors::RED, text, Colors::RESET)
}

/// Renders a caret line pointing at the offending input column.
///
/// `offset` is the column of the error counted from the start of the
/// rendered line, including the prompt that preceded the echoed input.
pub fn format_caret(offset: usize) -> String {
    format!("{}^", " ".repeat(offset))
}

/// Renders help entries as two aligned columns: alt text, help text.
pub fn format_help(entries: &[HelpEntry]) -> String {
    let width = entries
        .iter()
        .map(|e| e.alt_text.chars().count())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    for entry in entries {
        out.push_str("  ");
        out.push_str(&entry.alt_text);
        if entry.help_text.is_empty() {
            out.push('\n');
            continue;
        }
        let pad = width.saturating_sub(entry.alt_text.chars().count()) + 2;
        out.push_str(&" ".repeat(pad));
        out.push_str(&entry.help_text);
        out.push('\n');
    }
    out
}
