//! Line pass that drops noise and inserts `GO` batch separators.

use serde::Serialize;
use std::borrow::Cow;

/// Client-side batch separator understood by sqlcmd
pub const BATCH_SEPARATOR: &str = "GO";

const COMMENT_PREFIX: &str = "--";
const TERMINATOR: char = ';';

/// Counters from a single line pass
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct BatchStats {
    /// Lines kept in the output, separators excluded
    pub lines_written: u64,
    /// Blank and comment lines that were removed
    pub lines_dropped: u64,
    /// `GO` lines emitted
    pub separators: u64,
}

/// Turn `\r\n` and lone `\r` line endings into `\n`.
///
/// Dumps written on classic Mac or mixed systems otherwise collapse several
/// statements onto one line and lose their separators.
pub fn normalize_newlines(text: &str) -> Cow<'_, str> {
    if !text.contains('\r') {
        return Cow::Borrowed(text);
    }
    Cow::Owned(text.replace("\r\n", "\n").replace('\r', "\n"))
}

/// Trim every line, drop blanks and `--` comments, and follow each line
/// that ends in `;` with a `GO` line. Lines are joined with `\n` and the
/// result has no trailing newline.
pub fn split_batches(text: &str) -> (String, BatchStats) {
    let mut stats = BatchStats::default();
    let mut lines: Vec<&str> = Vec::new();

    for line in text.split('\n') {
        let line = line.trim();
        if line.is_empty() || line.starts_with(COMMENT_PREFIX) {
            stats.lines_dropped += 1;
            continue;
        }

        lines.push(line);
        stats.lines_written += 1;

        if line.ends_with(TERMINATOR) {
            lines.push(BATCH_SEPARATOR);
            stats.separators += 1;
        }
    }

    (lines.join("\n"), stats)
}
