use tower_lsp::lsp_types::{Position, TextEdit, Url, WorkspaceEdit};

/// Edits the workspace edit carries for `uri`, or an empty slice
pub fn edits_for<'a>(edit: &'a WorkspaceEdit, uri: &Url) -> &'a [TextEdit] {
    edit.changes
        .as_ref()
        .and_then(|changes| changes.get(uri))
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Assert that one of the edits inserts `expected_text` starting on `line`
pub fn assert_has_text_edit(edits: &[TextEdit], line: u32, expected_text: &str) -> bool {
    edits
        .iter()
        .any(|e| e.range.start.line == line && e.new_text == expected_text)
}

/// Apply edits to `text` back to front, the way an editor applies a batch
pub fn apply_text_edits(text: &str, edits: &[TextEdit]) -> String {
    let lines: Vec<&str> = text.split('\n').collect();
    let offset = |p: Position| -> usize {
        let line_start: usize = lines[..p.line as usize].iter().map(|l| l.len() + 1).sum();
        let line = lines.get(p.line as usize).copied().unwrap_or("");
        let mut utf16 = 0;
        let mut byte = 0;
        for c in line.chars() {
            if utf16 >= p.character as usize {
                break;
            }
            utf16 += c.len_utf16();
            byte += c.len_utf8();
        }
        line_start + byte
    };
    let mut spans: Vec<_> = edits
        .iter()
        .map(|e| (offset(e.range.start), offset(e.range.end), e.new_text.as_str()))
        .collect();
    spans.sort_by(|a, b| b.0.cmp(&a.0));
    let mut out = text.to_string();
    for (start, end, new_text) in spans {
        out.replace_range(start..end, new_text);
    }
    out
}
