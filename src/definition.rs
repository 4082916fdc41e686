use tower_lsp::lsp_types::{Position, Range};

use crate::block::{blocks, strip_type_modifiers, BlockKind};
use crate::document::Document;
use crate::symbol::word_at_position;

/// Declaration range of the model or enum named by the word at `position`.
pub fn find_definition(document: &Document, position: Position) -> Option<Range> {
    let line = document.line(position.line as usize)?;
    let name = strip_type_modifiers(word_at_position(line, position.character));
    if name.is_empty() {
        return None;
    }
    log::debug!("looking up definition of {:?}", name);
    blocks(document)
        .into_iter()
        .filter(|b| matches!(b.kind, BlockKind::Model | BlockKind::Enum))
        .find(|b| b.name == name)?
        .name_range(document)
}
