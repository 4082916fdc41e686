//! Keeps the database-visible name stable across a rename by adding
//! `@map`/`@@map` when none exists yet.

use tower_lsp::lsp_types::{Position, Range, TextEdit};

use crate::document::Document;
use crate::symbol::Symbol;

const BLOCK_MAP_ATTRIBUTE: &str = "@@map(";
const FIELD_MAP_ATTRIBUTE: &str = "@map(";

/// True when no explicit mapping anchors the symbol's physical name.
pub fn needs_mapping(symbol: &Symbol, document: &Document) -> bool {
    if symbol.kind.is_block_name() {
        !symbol.block.body_lines().any(|row| {
            document
                .line(row)
                .is_some_and(|line| line.trim().starts_with(BLOCK_MAP_ATTRIBUTE))
        })
    } else {
        !document
            .line(symbol.line)
            .is_some_and(|line| line.contains(FIELD_MAP_ATTRIBUTE))
    }
}

/// Mapping attribute pinning the current name.
///
/// Block mappings replace the closing line, so a block without one gets
/// nothing.
pub fn synthesize_mapping(symbol: &Symbol, document: &Document) -> Option<TextEdit> {
    if symbol.kind.is_block_name() {
        let block = &symbol.block;
        if !block.terminated {
            log::debug!("block {} has no closing brace, skipping @@map", block.name);
            return None;
        }
        return Some(TextEdit::new(
            Range::new(Position::new(block.end.line, 0), block.end),
            format!("\t@@map(\"{}\")\n}}", symbol.name),
        ));
    }
    let end = Position::new(symbol.line as u32, document.utf16_len(symbol.line));
    Some(TextEdit::new(
        Range::new(end, end),
        format!(" @map(\"{}\")", symbol.name),
    ))
}
