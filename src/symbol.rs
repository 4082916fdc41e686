//! Decides which renameable symbol sits under the cursor.

use tower_lsp::lsp_types::{Position, Range};

use crate::block::{locate_block, Block, BlockKind};
use crate::document::{byte_idx, first_token_span, span_range, utf16_col, Document};

/// Width of the `model` keyword; the name starts after it.
const MODEL_KEYWORD_WIDTH: u32 = 5;
/// Width of the `enum` keyword.
const ENUM_KEYWORD_WIDTH: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Model,
    Field,
    Enum,
    EnumValue,
}

impl SymbolKind {
    /// Model and enum names live on the block's opening line.
    pub fn is_block_name(&self) -> bool {
        matches!(self, Self::Model | Self::Enum)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Model => "Model",
            Self::Field => "Field",
            Self::Enum => "Enum",
            Self::EnumValue => "Enum value",
        }
    }
}

/// A classified symbol together with the context it was found in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub kind: SymbolKind,
    pub name: String,
    pub block: Block,
    pub line: usize,
}

impl Symbol {
    /// Range of the symbol's name on its declaring line.
    pub fn declaration_range(&self, document: &Document) -> Option<Range> {
        if self.kind.is_block_name() {
            return self.block.name_range(document);
        }
        let line = document.line(self.line)?;
        let (start, end) = first_token_span(line)?;
        Some(span_range(self.line, line, start, end))
    }
}

/// Whitespace-delimited word containing the UTF-16 column `character`.
pub fn word_at_position(line: &str, character: u32) -> &str {
    let idx = byte_idx(line, character);
    let start = line[..idx]
        .char_indices()
        .rev()
        .take_while(|(_, c)| !c.is_whitespace())
        .last()
        .map_or(idx, |(i, _)| i);
    let end = line[idx..]
        .find(char::is_whitespace)
        .map_or(line.len(), |i| idx + i);
    &line[start..end]
}

fn cursor_on_first_token(line: &str, character: u32) -> bool {
    let Some((start, end)) = first_token_span(line) else {
        return false;
    };
    utf16_col(line, start) <= character && character <= utf16_col(line, end)
}

/// Classifies the symbol at `position`; `line` is the untrimmed text of
/// `position.line` and `block` the block owning it.
pub fn classify(position: Position, line: &str, block: &Block) -> Option<SymbolKind> {
    let row = position.line as usize;
    let trimmed = line.trim();
    let on_start = row == block.start_line();
    let in_body = block.body_contains(row);

    match block.kind {
        BlockKind::Model if on_start => {
            (position.character > MODEL_KEYWORD_WIDTH).then_some(SymbolKind::Model)
        }
        BlockKind::Model => (in_body
            && !trimmed.starts_with('@')
            && !trimmed.starts_with("//")
            && cursor_on_first_token(line, position.character))
        .then_some(SymbolKind::Field),
        BlockKind::Enum if on_start => {
            (position.character > ENUM_KEYWORD_WIDTH).then_some(SymbolKind::Enum)
        }
        BlockKind::Enum => (in_body
            && !trimmed.is_empty()
            && !trimmed.starts_with("@@")
            && !trimmed.starts_with("//")
            && !word_at_position(line, position.character).starts_with('@'))
        .then_some(SymbolKind::EnumValue),
        _ => None,
    }
}

/// Current name of a symbol of `kind` declared on `line` inside `block`.
pub fn current_name(kind: SymbolKind, block: &Block, line: &str) -> Option<String> {
    if kind.is_block_name() {
        return Some(block.name.clone());
    }
    line.split_whitespace().next().map(str::to_string)
}

/// Locates and classifies the symbol under the cursor.
pub fn symbol_at(document: &Document, position: Position) -> Option<Symbol> {
    let row = position.line as usize;
    let line = document.line(row)?;
    let block = locate_block(document, row)?;
    let kind = classify(position, line, &block)?;
    let name = current_name(kind, &block, line)?;
    Some(Symbol {
        kind,
        name,
        block,
        line: row,
    })
}
