use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use dashmap::DashMap;
use tower_lsp::jsonrpc::{Error, Result};
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer};

use crate::code_action::quick_fixes;
use crate::completion::{completions, resolve_completion};
use crate::definition::find_definition;
use crate::document::Document;
use crate::hover::hover;
use crate::lsp::lsp_config::{self, PrismaLspConfig, PrismaSettings};
use crate::prisma_fmt::{to_lsp_diagnostics, PrismaFmt};
use crate::rename::{compute_rename_edits, validate_new_name};
use crate::symbol::symbol_at;

pub struct Backend {
    pub client: Client,
    pub documents: DashMap<Url, Document>,
    pub settings: Arc<Mutex<PrismaSettings>>,
    pub config: PrismaLspConfig,
}

impl Backend {
    /// Backend with settings from the user's `prisma-lsp.toml`, if any.
    pub fn new(client: Client) -> Self {
        let config = match lsp_config::load_config() {
            Ok(Some(loaded)) => {
                log::info!("loaded configuration from {:?}", loaded.path);
                loaded.config
            }
            Ok(None) => PrismaLspConfig::default(),
            Err(err) => {
                log::warn!("{}", err);
                PrismaLspConfig::default()
            }
        };
        Self::with_config(client, config)
    }

    pub fn with_config(client: Client, config: PrismaLspConfig) -> Self {
        Self {
            client,
            documents: DashMap::new(),
            settings: Arc::new(Mutex::new(PrismaSettings::default())),
            config,
        }
    }

    fn snapshot(&self, uri: &Url) -> Option<Document> {
        self.documents.get(uri).map(|doc| doc.clone())
    }

    fn store_settings(&self, settings: PrismaSettings) {
        if let Ok(mut current) = self.settings.lock() {
            *current = settings;
        }
    }

    async fn prisma_fmt(&self) -> PrismaFmt {
        let settings = self
            .settings
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default();
        let resolved = lsp_config::resolve_prisma_fmt_path(&settings, &self.config);
        if let Some(warning) = resolved.warning {
            self.client.show_message(MessageType::ERROR, warning).await;
        }
        PrismaFmt::new(resolved.path)
    }

    async fn on_change(&self, params: TextDocumentItem) {
        let document = Document::new(&params.text, params.version);
        self.documents.insert(params.uri.clone(), document.clone());
        self.validate(params.uri, document).await;
    }

    async fn validate(&self, uri: Url, document: Document) {
        let prisma_fmt = self.prisma_fmt().await;
        let diagnostics = match prisma_fmt.lint(&document.text()).await {
            Ok(lints) => to_lsp_diagnostics(&document, &lints),
            Err(err) => {
                log::warn!("validation of {} failed: {}", uri, err);
                self.client
                    .show_message(MessageType::ERROR, format!("prisma-fmt error: {}", err))
                    .await;
                return;
            }
        };
        log::debug!("{} diagnostics for {}", diagnostics.len(), uri);
        self.client
            .publish_diagnostics(uri, diagnostics, Some(document.version()))
            .await;
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        if let Some(settings) = params
            .initialization_options
            .as_ref()
            .and_then(PrismaSettings::from_value)
        {
            self.store_settings(settings);
        }

        let code_action_literals = params
            .capabilities
            .text_document
            .as_ref()
            .and_then(|text_document| text_document.code_action.as_ref())
            .is_some_and(|code_action| code_action.code_action_literal_support.is_some());

        Ok(InitializeResult {
            server_info: Some(ServerInfo {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
            capabilities: ServerCapabilities {
                position_encoding: Some(PositionEncodingKind::UTF16),
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::FULL,
                )),
                completion_provider: Some(CompletionOptions {
                    resolve_provider: Some(true),
                    trigger_characters: Some(
                        vec!["@", "\"", "."]
                            .into_iter()
                            .map(ToString::to_string)
                            .collect(),
                    ),
                    work_done_progress_options: Default::default(),
                    all_commit_characters: None,
                    ..Default::default()
                }),
                definition_provider: Some(OneOf::Left(true)),
                hover_provider: Some(HoverProviderCapability::Simple(true)),
                code_action_provider: code_action_literals.then(|| {
                    CodeActionProviderCapability::Options(CodeActionOptions {
                        code_action_kinds: Some(vec![CodeActionKind::QUICKFIX]),
                        ..Default::default()
                    })
                }),
                document_formatting_provider: Some(OneOf::Left(true)),
                rename_provider: Some(OneOf::Right(RenameOptions {
                    prepare_provider: Some(true),
                    work_done_progress_options: Default::default(),
                })),
                ..ServerCapabilities::default()
            },
            ..Default::default()
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        self.client
            .log_message(MessageType::INFO, "prisma-lsp server initialized!")
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        log::info!("did_open: {:?}", params.text_document.uri);
        self.on_change(TextDocumentItem {
            language_id: "".to_string(),
            uri: params.text_document.uri,
            text: params.text_document.text,
            version: params.text_document.version,
        })
        .await
    }

    async fn did_change(&self, mut params: DidChangeTextDocumentParams) {
        let Some(change) = params.content_changes.pop() else {
            return;
        };
        self.on_change(TextDocumentItem {
            uri: params.text_document.uri,
            language_id: "".to_string(),
            text: change.text,
            version: params.text_document.version,
        })
        .await
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        self.documents.remove(&uri);
        self.client.publish_diagnostics(uri, Vec::new(), None).await;
    }

    async fn did_change_configuration(&self, params: DidChangeConfigurationParams) {
        self.client
            .log_message(MessageType::INFO, "Configuration changed.")
            .await;
        if let Some(settings) = PrismaSettings::from_value(&params.settings) {
            self.store_settings(settings);
        }
        let open: Vec<(Url, Document)> = self
            .documents
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        for (uri, document) in open {
            self.validate(uri, document).await;
        }
    }

    async fn prepare_rename(
        &self,
        params: TextDocumentPositionParams,
    ) -> Result<Option<PrepareRenameResponse>> {
        let response = self.snapshot(&params.text_document.uri).and_then(|document| {
            let symbol = symbol_at(&document, params.position)?;
            let range = symbol.declaration_range(&document)?;
            Some(PrepareRenameResponse::RangeWithPlaceholder {
                range,
                placeholder: symbol.name,
            })
        });
        Ok(response)
    }

    async fn rename(&self, params: RenameParams) -> Result<Option<WorkspaceEdit>> {
        validate_new_name(&params.new_name).map_err(|err| Error::invalid_params(err.to_string()))?;

        let uri = params.text_document_position.text_document.uri;
        let Some(document) = self.snapshot(&uri) else {
            log::debug!("rename requested for unknown document {}", uri);
            return Ok(None);
        };
        let edits = compute_rename_edits(
            &document,
            params.text_document_position.position,
            &params.new_name,
        );
        if edits.is_empty() {
            return Ok(None);
        }
        Ok(Some(WorkspaceEdit {
            changes: Some(HashMap::from([(uri, edits)])),
            ..Default::default()
        }))
    }

    async fn goto_definition(
        &self,
        params: GotoDefinitionParams,
    ) -> Result<Option<GotoDefinitionResponse>> {
        let uri = params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;
        let definition = self
            .snapshot(&uri)
            .and_then(|document| find_definition(&document, position))
            .map(|range| GotoDefinitionResponse::Scalar(Location::new(uri, range)));
        Ok(definition)
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        let uri = params.text_document_position.text_document.uri;
        let position = params.text_document_position.position;
        let items = self
            .snapshot(&uri)
            .map(|document| completions(&document, position))
            .unwrap_or_default();
        log::debug!("completions: {:?}", items);
        if items.is_empty() {
            return Ok(None);
        }
        Ok(Some(CompletionResponse::Array(items)))
    }

    async fn completion_resolve(&self, item: CompletionItem) -> Result<CompletionItem> {
        Ok(resolve_completion(item))
    }

    async fn hover(&self, params: HoverParams) -> Result<Option<Hover>> {
        let uri = params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;
        Ok(self
            .snapshot(&uri)
            .and_then(|document| hover(&document, position)))
    }

    async fn code_action(&self, params: CodeActionParams) -> Result<Option<CodeActionResponse>> {
        let uri = params.text_document.uri;
        let Some(document) = self.snapshot(&uri) else {
            return Ok(None);
        };
        let actions = quick_fixes(&document, &uri, &params.context.diagnostics);
        if actions.is_empty() {
            return Ok(None);
        }
        Ok(Some(actions))
    }

    async fn formatting(&self, params: DocumentFormattingParams) -> Result<Option<Vec<TextEdit>>> {
        let Some(document) = self.snapshot(&params.text_document.uri) else {
            return Ok(None);
        };
        let prisma_fmt = self.prisma_fmt().await;
        match prisma_fmt
            .format(&document.text(), params.options.tab_size)
            .await
        {
            Ok(formatted) => Ok(Some(vec![TextEdit::new(document.full_range(), formatted)])),
            Err(err) => {
                log::warn!("formatting {} failed: {}", params.text_document.uri, err);
                self.client
                    .show_message(MessageType::ERROR, format!("prisma-fmt error: {}", err))
                    .await;
                Ok(None)
            }
        }
    }
}
