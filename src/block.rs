//! Line-oriented block detection for schema documents.
//!
//! Blocks never nest: a block opens on a `<keyword> <name> {` line and closes
//! on the next line starting with `}`.

use std::ops::Range;

use tower_lsp::lsp_types::{Position, Range as LspRange};

use crate::document::{find_identifier, first_token_span, span_range, Document};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Datasource,
    Generator,
    Model,
    Enum,
    TypeAlias,
}

impl BlockKind {
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "datasource" => Some(Self::Datasource),
            "generator" => Some(Self::Generator),
            "model" => Some(Self::Model),
            "enum" => Some(Self::Enum),
            "type_alias" | "type" => Some(Self::TypeAlias),
            _ => None,
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Datasource => "datasource",
            Self::Generator => "generator",
            Self::Model => "model",
            Self::Enum => "enum",
            Self::TypeAlias => "type_alias",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub kind: BlockKind,
    pub name: String,
    pub start: Position,
    /// Line of the closing brace, character at the end of that line.
    pub end: Position,
    /// False when the closing brace was never found.
    pub terminated: bool,
}

impl Block {
    fn new(
        kind: BlockKind,
        name: String,
        start_line: usize,
        end_line: usize,
        document: &Document,
        terminated: bool,
    ) -> Self {
        Self {
            kind,
            name,
            start: Position::new(start_line as u32, 0),
            end: Position::new(end_line as u32, document.utf16_len(end_line)),
            terminated,
        }
    }

    pub fn start_line(&self) -> usize {
        self.start.line as usize
    }

    pub fn end_line(&self) -> usize {
        self.end.line as usize
    }

    pub fn contains_line(&self, line: usize) -> bool {
        self.start_line() <= line && line <= self.end_line()
    }

    /// Range of the block's name on its opening line.
    pub fn name_range(&self, document: &Document) -> Option<LspRange> {
        let line = document.line(self.start_line())?;
        let (_, keyword_end) = first_token_span(line)?;
        let start = find_identifier(line, &self.name, keyword_end)?;
        Some(span_range(self.start_line(), line, start, start + self.name.len()))
    }

    /// Lines after the opening line and before the closing brace. An
    /// unterminated block has no closing line, so its last line is body.
    pub fn body_lines(&self) -> Range<usize> {
        let end = if self.terminated {
            self.end_line()
        } else {
            self.end_line() + 1
        };
        (self.start_line() + 1)..end.max(self.start_line() + 1)
    }

    pub fn body_contains(&self, line: usize) -> bool {
        self.body_lines().contains(&line)
    }
}

/// A field declared inside a model, keyed by its type token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldType {
    pub name: String,
    /// Type token without the `?` and `[]` markers.
    pub type_name: String,
    pub line: usize,
}

fn parse_opening(trimmed: &str) -> Option<(BlockKind, &str)> {
    let head = trimmed.strip_suffix('{')?;
    let mut tokens = head.split_whitespace();
    let kind = BlockKind::from_keyword(tokens.next()?)?;
    let name = tokens.next()?;
    if tokens.next().is_some() {
        return None;
    }
    Some((kind, name))
}

/// All blocks of the document in line order.
pub fn blocks(document: &Document) -> Vec<Block> {
    let mut found = Vec::new();
    let mut open: Option<(BlockKind, String, usize)> = None;

    for (row, line) in document.lines().iter().enumerate() {
        let trimmed = line.trim();
        if let Some((kind, name)) = parse_opening(trimmed) {
            if let Some((prev_kind, prev_name, start)) = open.take() {
                log::debug!("block {} is not closed before line {}", prev_name, row);
                found.push(Block::new(prev_kind, prev_name, start, row - 1, document, false));
            }
            open = Some((kind, name.to_string(), row));
        } else if trimmed.starts_with('}') {
            if let Some((kind, name, start)) = open.take() {
                found.push(Block::new(kind, name, start, row, document, true));
            }
        }
    }

    if let Some((kind, name, start)) = open {
        let last = document.line_count().saturating_sub(1).max(start);
        found.push(Block::new(kind, name, start, last, document, false));
    }
    found
}

/// The block owning `line`, or `None` for top-level lines.
pub fn locate_block(document: &Document, line: usize) -> Option<Block> {
    blocks(document).into_iter().find(|b| b.contains_line(line))
}

/// Names of all blocks of the given kind.
pub fn block_names(document: &Document, kind: BlockKind) -> Vec<String> {
    blocks(document)
        .into_iter()
        .filter(|b| b.kind == kind)
        .map(|b| b.name)
        .collect()
}

pub fn strip_type_modifiers(type_token: &str) -> String {
    type_token.replace('?', "").replace("[]", "")
}

/// Fields of `block` with their stripped type tokens.
pub fn field_types(document: &Document, block: &Block) -> Vec<FieldType> {
    block
        .body_lines()
        .filter_map(|row| {
            let trimmed = document.line(row)?.trim();
            if trimmed.starts_with('@') || trimmed.starts_with("//") {
                return None;
            }
            let mut tokens = trimmed.split_whitespace();
            let name = tokens.next()?;
            let type_token = tokens.next()?;
            Some(FieldType {
                name: name.to_string(),
                type_name: strip_type_modifiers(type_token),
                line: row,
            })
        })
        .collect()
}
