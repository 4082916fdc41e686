//! Rename engine for schema documents.
//!
//! A rename produces the declaration edit, the reference edits and an
//! optional mapping edit, in that order. All edits are computed against one
//! snapshot and never overlap.

pub mod mapping;
pub mod references;

use thiserror::Error;
use tower_lsp::lsp_types::{Position, TextEdit};

use crate::document::Document;
use crate::symbol::{symbol_at, Symbol};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RenameError {
    #[error("new name must not be empty")]
    EmptyName,
    #[error("'{0}' is not a valid identifier")]
    InvalidName(String),
}

/// Rejects names the schema language cannot declare.
pub fn validate_new_name(name: &str) -> Result<(), RenameError> {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return Err(RenameError::EmptyName);
    };
    if !(first.is_alphabetic() || first == '_') || !chars.all(|c| c.is_alphanumeric() || c == '_') {
        return Err(RenameError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Edits renaming the symbol at `position` to `new_name`; empty when
/// nothing renameable is there.
pub fn compute_rename_edits(document: &Document, position: Position, new_name: &str) -> Vec<TextEdit> {
    let Some(symbol) = symbol_at(document, position) else {
        log::debug!("nothing to rename at {:?}", position);
        return Vec::new();
    };
    rename_symbol(document, &symbol, new_name)
}

pub fn rename_symbol(document: &Document, symbol: &Symbol, new_name: &str) -> Vec<TextEdit> {
    if symbol.name == new_name {
        return Vec::new();
    }

    let mut edits = Vec::new();
    if let Some(range) = symbol.declaration_range(document) {
        edits.push(TextEdit::new(range, new_name.to_string()));
    }
    edits.extend(references::rewrite(symbol, new_name, document));
    if mapping::needs_mapping(symbol, document) {
        edits.extend(mapping::synthesize_mapping(symbol, document));
    }

    debug_assert!(edits_are_disjoint(&edits), "overlapping rename edits: {:?}", edits);
    log::info!(
        "{} '{}' was renamed to '{}'",
        symbol.kind.label(),
        symbol.name,
        new_name
    );
    edits
}

/// True when no two edits overlap; touching ranges are allowed.
pub fn edits_are_disjoint(edits: &[TextEdit]) -> bool {
    let key = |p: Position| (p.line, p.character);
    let mut ranges: Vec<_> = edits.iter().map(|e| (key(e.range.start), key(e.range.end))).collect();
    ranges.sort();
    ranges.windows(2).all(|pair| pair[0].1 <= pair[1].0)
}

/// Applies edits to `text` the way an editor would. Test helper.
#[cfg(test)]
pub(crate) fn apply_edits(text: &str, edits: &[TextEdit]) -> String {
    use crate::document::byte_idx;

    let document = Document::new(text, 0);
    let offset = |p: Position| {
        let line_start: usize = document.lines()[..p.line as usize]
            .iter()
            .map(|l| l.len() + 1)
            .sum();
        line_start + byte_idx(document.line(p.line as usize).unwrap_or(""), p.character)
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
