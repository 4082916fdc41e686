//! Hover for model, enum and type names: the declaration plus the `///`
//! documentation written above it.

use tower_lsp::lsp_types::{Hover, HoverContents, MarkupContent, MarkupKind, Position};

use crate::block::{blocks, strip_type_modifiers, Block, BlockKind};
use crate::document::Document;
use crate::symbol::word_at_position;

const DOC_COMMENT: &str = "///";

/// `///` lines directly above the opening line of `block`, prefix removed.
pub fn block_documentation(document: &Document, block: &Block) -> Vec<String> {
    let mut docs: Vec<String> = (0..block.start_line())
        .rev()
        .map_while(|row| {
            let trimmed = document.line(row)?.trim();
            trimmed
                .strip_prefix(DOC_COMMENT)
                .map(|doc| doc.trim().to_string())
        })
        .collect();
    docs.reverse();
    docs
}

pub fn hover(document: &Document, position: Position) -> Option<Hover> {
    let line = document.line(position.line as usize)?;
    let name = strip_type_modifiers(word_at_position(line, position.character));
    if name.is_empty() {
        return None;
    }
    let block = blocks(document).into_iter().find(|b| {
        matches!(b.kind, BlockKind::Model | BlockKind::Enum | BlockKind::TypeAlias) && b.name == name
    })?;

    let mut value = format!("```prisma\n{} {}\n```", block.kind.keyword(), block.name);
    let docs = block_documentation(document, &block);
    if !docs.is_empty() {
        value.push_str("\n___\n");
        value.push_str(&docs.join("\n"));
    }
    Some(Hover {
        contents: HoverContents::Markup(MarkupContent {
            kind: MarkupKind::Markdown,
            value,
        }),
        range: None,
    })
}
