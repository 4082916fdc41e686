//! Static completion lists keyed on the cursor's block and token.

use serde_json::Value;
use tower_lsp::lsp_types::{CompletionItem, CompletionItemKind, Documentation, Position};

use crate::block::{block_names, field_types, locate_block, Block, BlockKind};
use crate::document::{byte_idx, Document};

const BLOCK_KEYWORDS: [&str; 5] = ["datasource", "generator", "model", "enum", "type_alias"];

pub const SCALAR_TYPES: [&str; 9] = [
    "String", "Boolean", "Int", "BigInt", "Float", "Decimal", "DateTime", "Json", "Bytes",
];

const BLOCK_ATTRIBUTES: [(&str, &str); 4] = [
    ("map", "Maps the model name to a different table name in the database."),
    ("id", "Defines a multi-field primary key on the model."),
    ("unique", "Defines a compound unique constraint for the listed fields."),
    ("index", "Defines an index on the listed fields."),
];

const FIELD_ATTRIBUTES: [(&str, &str); 6] = [
    ("id", "The @id attribute marks the primary identifier of a model."),
    ("unique", "Defines a unique constraint for this field."),
    ("map", "Maps a field name to a different column name in the database."),
    ("default", "Specifies a default value if null is provided."),
    ("relation", "Defines meta information about the relation."),
    ("updatedAt", "Stores the time when the record was last updated."),
];

const DATASOURCE_KEYS: [&str; 2] = ["provider", "url"];
const GENERATOR_KEYS: [&str; 2] = ["provider", "output"];

fn item(label: &str, kind: CompletionItemKind) -> CompletionItem {
    CompletionItem {
        label: label.to_string(),
        kind: Some(kind),
        ..Default::default()
    }
}

/// Attribute items carry `@name`/`@@name` in `data`; documentation is
/// filled in by `resolve_completion`.
fn attribute_items(prefix: &str, attributes: &[(&str, &str)]) -> Vec<CompletionItem> {
    attributes
        .iter()
        .map(|(label, _)| CompletionItem {
            data: Some(Value::String(format!("{}{}", prefix, label))),
            ..item(label, CompletionItemKind::PROPERTY)
        })
        .collect()
}

fn attribute_documentation(attribute: &str) -> Option<&'static str> {
    let (table, name): (&[(&'static str, &'static str)], &str) = match attribute.strip_prefix("@@") {
        Some(name) => (&BLOCK_ATTRIBUTES[..], name),
        None => (&FIELD_ATTRIBUTES[..], attribute.strip_prefix('@')?),
    };
    table.iter().find(|(label, _)| *label == name).map(|(_, doc)| *doc)
}

/// Adds documentation to an item previously returned by `completions`.
pub fn resolve_completion(mut item: CompletionItem) -> CompletionItem {
    if let Some(doc) = item
        .data
        .as_ref()
        .and_then(Value::as_str)
        .and_then(attribute_documentation)
    {
        item.documentation = Some(Documentation::String(doc.to_string()));
    }
    item
}

fn type_items(document: &Document, block: &Block) -> Vec<CompletionItem> {
    let scalars = SCALAR_TYPES
        .iter()
        .map(|t| item(t, CompletionItemKind::TYPE_PARAMETER));
    let models = block_names(document, BlockKind::Model)
        .into_iter()
        .filter(|name| *name != block.name)
        .map(|name| item(&name, CompletionItemKind::CLASS));
    let enums = block_names(document, BlockKind::Enum)
        .into_iter()
        .map(|name| item(&name, CompletionItemKind::ENUM));
    scalars.chain(models).chain(enums).collect()
}

fn unassigned_keys(document: &Document, block: &Block, keys: &[&str]) -> Vec<CompletionItem> {
    let assigned: Vec<&str> = block
        .body_lines()
        .filter_map(|row| document.line(row))
        .filter_map(|line| line.split('=').next())
        .map(str::trim)
        .collect();
    keys.iter()
        .filter(|key| !assigned.contains(key))
        .map(|key| item(key, CompletionItemKind::FIELD))
        .collect()
}

fn relation_field_items(document: &Document, block: &Block, row: usize) -> Vec<CompletionItem> {
    field_types(document, block)
        .into_iter()
        .filter(|f| f.line != row)
        .map(|f| item(&f.name, CompletionItemKind::FIELD))
        .collect()
}

fn inside_relation_arguments(prefix: &str) -> bool {
    prefix
        .rfind("@relation(")
        .is_some_and(|start| !prefix[start..].contains(')'))
}

/// Completion candidates at `position`.
pub fn completions(document: &Document, position: Position) -> Vec<CompletionItem> {
    let row = position.line as usize;
    let Some(line) = document.line(row) else {
        return Vec::new();
    };
    let prefix = &line[..byte_idx(line, position.character)];
    let token = prefix.rsplit(char::is_whitespace).next().unwrap_or("");
    let completed_tokens = prefix[..prefix.len() - token.len()].split_whitespace().count();

    let Some(block) = locate_block(document, row) else {
        if completed_tokens > 0 {
            return Vec::new();
        }
        return BLOCK_KEYWORDS
            .iter()
            .map(|k| item(k, CompletionItemKind::KEYWORD))
            .collect();
    };
    if row == block.start_line() || (block.terminated && row == block.end_line()) {
        return Vec::new();
    }

    match block.kind {
        BlockKind::Model if inside_relation_arguments(prefix) => {
            relation_field_items(document, &block, row)
        }
        BlockKind::Model if token.starts_with("@@") => attribute_items("@@", &BLOCK_ATTRIBUTES),
        BlockKind::Model | BlockKind::TypeAlias if token.starts_with('@') => {
            attribute_items("@", &FIELD_ATTRIBUTES)
        }
        BlockKind::Model if completed_tokens == 1 => type_items(document, &block),
        BlockKind::Datasource if completed_tokens == 0 => {
            unassigned_keys(document, &block, &DATASOURCE_KEYS)
        }
        BlockKind::Generator if completed_tokens == 0 => {
            unassigned_keys(document, &block, &GENERATOR_KEYS)
        }
        _ => Vec::new(),
    }
}
