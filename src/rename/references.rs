//! Reference discovery for renames.
//!
//! Every edit targets the exact span of one occurrence and is computed
//! against the unmodified snapshot.

use std::ops::Range;

use tower_lsp::lsp_types::TextEdit;

use crate::block::{blocks, field_types, Block, BlockKind};
use crate::document::{find_identifier, first_token_span, span_range, Document};
use crate::symbol::{Symbol, SymbolKind};

const RELATION_ATTRIBUTE: &str = "@relation";
const FIELDS_ARGUMENT: &str = "fields:";
const REFERENCES_ARGUMENT: &str = "references:";
const FIELD_LIST_ATTRIBUTES: [&str; 3] = ["@@index", "@@id", "@@unique"];

/// Edits for every reference to `symbol`, excluding its declaration.
pub fn rewrite(symbol: &Symbol, new_name: &str, document: &Document) -> Vec<TextEdit> {
    match symbol.kind {
        SymbolKind::Field => field_references(&symbol.name, new_name, document, &symbol.block),
        SymbolKind::EnumValue => {
            enum_value_references(&symbol.name, new_name, document, &symbol.block.name)
        }
        SymbolKind::Model | SymbolKind::Enum => type_references(&symbol.name, new_name, document),
    }
}

fn rename_edit(row: usize, line: &str, start: usize, current: &str, new_name: &str) -> TextEdit {
    TextEdit::new(
        span_range(row, line, start, start + current.len()),
        new_name.to_string(),
    )
}

/// Byte span of the bracketed list following `label`, from the `[` up to
/// but excluding the `]`.
fn argument_list(line: &str, label: &str) -> Option<(usize, usize)> {
    let start = line.find(label)?;
    let open = start + line[start..].find('[')?;
    let close = open + line[open..].find(']')?;
    Some((open, close))
}

fn edit_in_argument_list(
    row: usize,
    line: &str,
    label: &str,
    current: &str,
    new_name: &str,
) -> Option<TextEdit> {
    let Some((start, end)) = argument_list(line, label) else {
        log::debug!("no complete `{}` list on line {}", label, row);
        return None;
    };
    let found = find_identifier(&line[..end], current, start)?;
    Some(rename_edit(row, line, found, current, new_name))
}

/// Relation `fields` and field-list attributes inside the owning model, then
/// relation `references` pointing at the owning model from anywhere.
pub fn field_references(
    current: &str,
    new_name: &str,
    document: &Document,
    block: &Block,
) -> Vec<TextEdit> {
    let mut edits = Vec::new();

    for row in block.body_lines() {
        let Some(line) = document.line(row) else {
            break;
        };
        if !line.contains(current) {
            continue;
        }
        if line.contains(RELATION_ATTRIBUTE) {
            edits.extend(edit_in_argument_list(row, line, FIELDS_ARGUMENT, current, new_name));
        }
        if let Some(attribute) = FIELD_LIST_ATTRIBUTES.iter().find(|a| line.contains(*a)) {
            edits.extend(edit_in_argument_list(row, line, attribute, current, new_name));
        }
    }

    for (row, line) in document.lines().iter().enumerate() {
        if line.contains(&block.name) && line.contains(current) && line.contains(RELATION_ATTRIBUTE) {
            edits.extend(edit_in_argument_list(
                row,
                line,
                REFERENCES_ARGUMENT,
                current,
                new_name,
            ));
        }
    }
    edits
}

/// `@default(<value>)` calls on fields typed with the owning enum.
pub fn enum_value_references(
    current: &str,
    new_name: &str,
    document: &Document,
    enum_name: &str,
) -> Vec<TextEdit> {
    let search = format!("@default({})", current);
    let replacement = format!("@default({})", new_name);

    document
        .lines()
        .iter()
        .enumerate()
        .filter_map(|(row, line)| {
            let start = line.find(&search)?;
            find_identifier(line, enum_name, 0)?;
            Some(TextEdit::new(
                span_range(row, line, start, start + search.len()),
                replacement.clone(),
            ))
        })
        .collect()
}

/// Field type tokens naming `current` in any model.
pub fn type_references(current: &str, new_name: &str, document: &Document) -> Vec<TextEdit> {
    let all_blocks = blocks(document);
    let mut visited: Vec<Range<usize>> = Vec::new();
    let mut edits = Vec::new();

    for (row, line) in document.lines().iter().enumerate() {
        if !line.contains(current) || visited.iter().any(|r| r.contains(&row)) {
            continue;
        }
        let Some(block) = all_blocks.iter().find(|b| b.contains_line(row)) else {
            continue;
        };
        if block.kind != BlockKind::Model {
            continue;
        }
        visited.push(block.start_line()..block.end_line() + 1);

        for field in field_types(document, block) {
            if field.type_name != current {
                continue;
            }
            let Some(declaration) = document.line(field.line) else {
                log::warn!("field {} vanished from line {}", field.name, field.line);
                return edits;
            };
            let Some((_, name_end)) = first_token_span(declaration) else {
                continue;
            };
            if let Some(found) = find_identifier(declaration, current, name_end) {
                edits.push(rename_edit(field.line, declaration, found, current, new_name));
            }
        }
    }
    edits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::locate_block;
    use tower_lsp::lsp_types::{Position, Range};

    fn range(line: u32, start: u32, end: u32) -> Range {
        Range::new(Position::new(line, start), Position::new(line, end))
    }

    #[test]
    fn test_field_list_attributes() {
        let doc = Document::new(
            "model User {\n  email String\n  name  String\n  @@unique([email, name])\n  @@index([name], map: \"name_idx\")\n}\n",
            1,
        );
        let block = locate_block(&doc, 0).unwrap();
        let edits = field_references("name", "fullName", &doc, &block);
        assert_eq!(
            edits.iter().map(|e| e.range).collect::<Vec<_>>(),
            vec![range(3, 19, 23), range(4, 11, 15)]
        );
        assert!(edits.iter().all(|e| e.new_text == "fullName"));
    }

    #[test]
    fn test_field_list_attribute_labels_are_untouched() {
        let text = "model User {\n  email String\n  name  String\n  @@unique([email], name: \"email_key\")\n  @@index(name: \"idx\")\n}\n";
        let doc = Document::new(text, 1);
        let block = locate_block(&doc, 0).unwrap();
        assert!(field_references("name", "fullName", &doc, &block).is_empty());

        let edits = field_references("email", "mail", &doc, &block);
        assert_eq!(edits.len(), 1);
        assert_eq!(edits[0].range, range(3, 12, 17));
    }

    #[test]
    fn test_relation_fields_are_scoped_to_list() {
        let doc = Document::new(
            "model Post {\n  id     Int  @id\n  userId Int\n  user   User @relation(fields: [userId], references: [id])\n}\n",
            1,
        );
        let block = locate_block(&doc, 0).unwrap();
        let edits = field_references("userId", "ownerId", &doc, &block);
        assert_eq!(edits.len(), 1);
        assert_eq!(edits[0].range, range(3, 33, 39));

        let edits = field_references("user", "owner", &doc, &block);
        assert!(edits.is_empty());
    }

    #[test]
    fn test_references_from_other_models() {
        let doc = Document::new(
            "model User {\n  id Int @id\n}\n\nmodel Post {\n  authorId Int\n  author   User @relation(fields: [authorId], references: [id])\n}\n",
            1,
        );
        let block = locate_block(&doc, 0).unwrap();
        let edits = field_references("id", "userId", &doc, &block);
        assert_eq!(edits.len(), 1);
        let line = doc.line(6).unwrap();
        let start = line.rfind("id]").unwrap() as u32;
        assert_eq!(edits[0].range, range(6, start, start + 2));
    }

    #[test]
    fn test_missing_bracket_is_skipped() {
        let doc = Document::new(
            "model Post {\n  authorId Int\n  author User @relation(fields: [authorId\n}\n",
            1,
        );
        let block = locate_block(&doc, 0).unwrap();
        assert!(field_references("authorId", "writerId", &doc, &block).is_empty());
    }

    #[test]
    fn test_enum_default_requires_enum_type() {
        let doc = Document::new(
            "model User {\n  role  Role   @default(USER)\n  level Level  @default(USER)\n  other Roles  @default(USER)\n}\n",
            1,
        );
        let edits = enum_value_references("USER", "MEMBER", &doc, "Role");
        assert_eq!(edits.len(), 1);
        assert_eq!(edits[0].range, range(1, 15, 29));
        assert_eq!(edits[0].new_text, "@default(MEMBER)");
    }

    #[test]
    fn test_type_references_skip_field_names() {
        let doc = Document::new(
            "model Tag {\n  id Int @id\n}\n\nmodel Post {\n  Tag  Tag\n  tags Tag[]\n  misc Tag?\n  TagCount Int\n}\n",
            1,
        );
        let edits = type_references("Tag", "Label", &doc);
        assert_eq!(
            edits.iter().map(|e| e.range).collect::<Vec<_>>(),
            vec![range(5, 7, 10), range(6, 7, 10), range(7, 7, 10)]
        );
    }

    #[test]
    fn test_type_references_visit_each_model_once() {
        let doc = Document::new(
            "model Node {\n  id       Int   @id\n  parent   Node? @relation(\"tree\", fields: [parentId], references: [id])\n  parentId Int?\n  children Node[] @relation(\"tree\")\n}\n",
            1,
        );
        let edits = type_references("Node", "TreeNode", &doc);
        assert_eq!(edits.len(), 2);
        assert_eq!(edits[0].range.start.line, 2);
        assert_eq!(edits[1].range.start.line, 4);
    }
}
