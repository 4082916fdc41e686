//! Quick fixes for `prisma-fmt lint` diagnostics.

use std::collections::HashMap;

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use tower_lsp::lsp_types::{
    CodeAction, CodeActionKind, CodeActionOrCommand, Diagnostic, TextEdit, Url, WorkspaceEdit,
};

use crate::block::{block_names, BlockKind};
use crate::completion::SCALAR_TYPES;
use crate::document::Document;

const UNKNOWN_TYPE_PREFIX: &str = "Type \"";
const UNKNOWN_TYPE_SUFFIX: &str = "\" is neither a built-in type";
const MAX_SUGGESTIONS: usize = 3;

/// The type name a lint message reports as unknown.
fn unknown_type(message: &str) -> Option<&str> {
    let rest = message.strip_prefix(UNKNOWN_TYPE_PREFIX)?;
    let end = rest.find(UNKNOWN_TYPE_SUFFIX)?;
    Some(&rest[..end])
}

fn known_types(document: &Document) -> Vec<String> {
    SCALAR_TYPES
        .iter()
        .map(|t| t.to_string())
        .chain(block_names(document, BlockKind::Model))
        .chain(block_names(document, BlockKind::Enum))
        .chain(block_names(document, BlockKind::TypeAlias))
        .collect()
}

/// Candidates fuzzily matching `unknown`, best first.
pub fn spelling_suggestions(unknown: &str, candidates: &[String]) -> Vec<String> {
    let matcher = SkimMatcherV2::default();
    let mut scored: Vec<(i64, &String)> = candidates
        .iter()
        .filter(|c| c.as_str() != unknown)
        .filter_map(|c| matcher.fuzzy_match(c, unknown).map(|score| (score, c)))
        .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.len().cmp(&b.1.len())));
    scored
        .into_iter()
        .take(MAX_SUGGESTIONS)
        .map(|(_, c)| c.clone())
        .collect()
}

fn replace_action(uri: &Url, diagnostic: &Diagnostic, name: String, preferred: bool) -> CodeActionOrCommand {
    CodeActionOrCommand::CodeAction(CodeAction {
        title: format!("Change spelling to '{}'", name),
        kind: Some(CodeActionKind::QUICKFIX),
        diagnostics: Some(vec![diagnostic.clone()]),
        edit: Some(WorkspaceEdit {
            changes: Some(HashMap::from([(
                uri.clone(),
                vec![TextEdit::new(diagnostic.range, name)],
            )])),
            ..Default::default()
        }),
        is_preferred: Some(preferred),
        ..Default::default()
    })
}

/// Spelling fixes for every unknown-type diagnostic in `diagnostics`.
pub fn quick_fixes(document: &Document, uri: &Url, diagnostics: &[Diagnostic]) -> Vec<CodeActionOrCommand> {
    let candidates = known_types(document);
    diagnostics
        .iter()
        .flat_map(|diagnostic| {
            let Some(unknown) = unknown_type(&diagnostic.message) else {
                return Vec::new();
            };
            log::debug!("suggesting types for unknown {:?}", unknown);
            spelling_suggestions(unknown, &candidates)
                .into_iter()
                .enumerate()
                .map(|(rank, name)| replace_action(uri, diagnostic, name, rank == 0))
                .collect::<Vec<_>>()
        })
        .collect()
}
