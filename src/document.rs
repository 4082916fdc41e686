use ropey::Rope;
use str_indices::utf16::{from_byte_idx as utf16_from_byte_idx, to_byte_idx as utf16_to_byte_idx};
use tower_lsp::lsp_types::{Position, Range};

/// Immutable snapshot of one schema document.
///
/// Lines are stored without their terminator and are 1:1 with LSP line
/// numbers, so a text ending in `\n` has a trailing empty line.
#[derive(Debug, Clone)]
pub struct Document {
    rope: Rope,
    lines: Vec<String>,
    version: i32,
}

impl Document {
    pub fn new(text: &str, version: i32) -> Self {
        Self {
            rope: Rope::from_str(text),
            lines: split_lines(text),
            version,
        }
    }

    pub fn version(&self) -> i32 {
        self.version
    }

    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Untrimmed text of line `n`.
    pub fn line(&self, n: usize) -> Option<&str> {
        self.lines.get(n).map(String::as_str)
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Length of line `n` in UTF-16 code units.
    pub fn utf16_len(&self, n: usize) -> u32 {
        self.line(n).map_or(0, |l| utf16_col(l, l.len()))
    }

    /// Range covering the whole document, used for full replacements.
    pub fn full_range(&self) -> Range {
        let last = self.line_count().saturating_sub(1);
        Range::new(
            Position::new(0, 0),
            Position::new(last as u32, self.utf16_len(last)),
        )
    }

    /// Converts a byte offset of the whole text into an LSP position.
    pub fn position_at_byte(&self, byte: usize) -> Position {
        let byte = byte.min(self.rope.len_bytes());
        let line = self.rope.byte_to_line(byte);
        let line_start = self.rope.line_to_byte(line);
        let col = self
            .line(line)
            .map_or(0, |l| utf16_col(l, (byte - line_start).min(l.len())));
        Position::new(line as u32, col)
    }
}

/// Splits on `\n`, `\r\n` and `\r` only, the line breaks LSP clients count.
fn split_lines(text: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut rest = text;
    while let Some(idx) = rest.find(['\n', '\r']) {
        lines.push(rest[..idx].to_string());
        let terminator = if rest[idx..].starts_with("\r\n") { 2 } else { 1 };
        rest = &rest[idx + terminator..];
    }
    lines.push(rest.to_string());
    lines
}

/// UTF-16 column of a byte offset within `line`.
pub fn utf16_col(line: &str, byte: usize) -> u32 {
    utf16_from_byte_idx(line, byte) as u32
}

/// Byte offset of a UTF-16 column within `line`, clamped to the line end.
pub fn byte_idx(line: &str, col: u32) -> usize {
    utf16_to_byte_idx(line, col as usize).min(line.len())
}

/// Range of the byte span `[start, end)` on line `row`.
pub fn span_range(row: usize, line: &str, start: usize, end: usize) -> Range {
    Range::new(
        Position::new(row as u32, utf16_col(line, start)),
        Position::new(row as u32, utf16_col(line, end)),
    )
}

fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Byte offset of the first whole-identifier occurrence of `needle` in
/// `haystack` at or after `from`.
pub fn find_identifier(haystack: &str, needle: &str, from: usize) -> Option<usize> {
    if needle.is_empty() || from > haystack.len() {
        return None;
    }
    let mut cursor = from;
    while let Some(found) = haystack.get(cursor..)?.find(needle) {
        let start = cursor + found;
        let end = start + needle.len();
        let before = haystack[..start].chars().next_back();
        let after = haystack[end..].chars().next();
        if !before.is_some_and(is_identifier_char) && !after.is_some_and(is_identifier_char) {
            return Some(start);
        }
        cursor = end;
    }
    None
}

/// Byte span of the first whitespace-delimited token of `line`.
pub fn first_token_span(line: &str) -> Option<(usize, usize)> {
    let start = line.find(|c: char| !c.is_whitespace())?;
    let end = line[start..]
        .find(char::is_whitespace)
        .map_or(line.len(), |i| start + i);
    Some((start, end))
}
