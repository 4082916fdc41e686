use tower_lsp::lsp_types::*;
use tower_lsp::{LanguageServer, LspService};

use prisma_lsp::lsp::{Backend, PrismaLspConfig};

use crate::common::TestWorkspace;

/// In-process LSP test client that directly uses Backend
pub struct InProcessLspClient {
    service: LspService<Backend>,
}

#[allow(dead_code)]
impl InProcessLspClient {
    /// Create and initialize a new in-process LSP client
    pub async fn new(workspace: &TestWorkspace) -> Self {
        // Point at a binary that never exists so validation fails fast and
        // the tests do not depend on a local prisma-fmt.
        let config = PrismaLspConfig {
            prisma_fmt_bin_path: Some(workspace.root_path().join("missing-prisma-fmt")),
        };
        let (service, socket) =
            LspService::new(move |client| Backend::with_config(client, config));

        // Consume and discard all messages from server to client
        tokio::spawn(async move {
            futures::pin_mut!(socket);
            while let Some(_msg) = futures::StreamExt::next(&mut socket).await {}
        });

        let mut test_client = Self { service };
        test_client.initialize(workspace.root_uri()).await;
        test_client.initialized().await;
        test_client
    }

    fn backend(&self) -> &Backend {
        self.service.inner()
    }

    /// Initialize the LSP server
    async fn initialize(&mut self, workspace_root: Url) -> InitializeResult {
        let params = InitializeParams {
            process_id: Some(std::process::id()),
            root_uri: Some(workspace_root),
            capabilities: ClientCapabilities {
                text_document: Some(TextDocumentClientCapabilities {
                    rename: Some(RenameClientCapabilities {
                        prepare_support: Some(true),
                        ..Default::default()
                    }),
                    code_action: Some(CodeActionClientCapabilities {
                        code_action_literal_support: Some(CodeActionLiteralSupport {
                            code_action_kind: CodeActionKindLiteralSupport {
                                value_set: vec![CodeActionKind::QUICKFIX.as_str().to_string()],
                            },
                        }),
                        ..Default::default()
                    }),
                    ..Default::default()
                }),
                ..Default::default()
            },
            ..Default::default()
        };
        self.backend().initialize(params).await.unwrap()
    }

    /// Send initialized notification
    async fn initialized(&mut self) {
        self.backend().initialized(InitializedParams {}).await;
    }

    /// Capabilities as advertised by a fresh initialize request
    pub async fn capabilities(&mut self) -> ServerCapabilities {
        let root = Url::parse("file:///tmp/").unwrap();
        self.initialize(root).await.capabilities
    }

    /// Open a document
    pub async fn did_open(&mut self, uri: Url, content: &str) {
        let params = DidOpenTextDocumentParams {
            text_document: TextDocumentItem {
                uri,
                language_id: "prisma".to_string(),
                version: 1,
                text: content.to_string(),
            },
        };
        self.backend().did_open(params).await;
    }

    /// Replace a document's content
    pub async fn did_change(&mut self, uri: Url, version: i32, content: &str) {
        let params = DidChangeTextDocumentParams {
            text_document: VersionedTextDocumentIdentifier { uri, version },
            content_changes: vec![TextDocumentContentChangeEvent {
                range: None,
                range_length: None,
                text: content.to_string(),
            }],
        };
        self.backend().did_change(params).await;
    }

    /// Close a document
    pub async fn did_close(&mut self, uri: Url) {
        let params = DidCloseTextDocumentParams {
            text_document: TextDocumentIdentifier { uri },
        };
        self.backend().did_close(params).await;
    }

    /// Push new client settings
    pub async fn did_change_configuration(&mut self, settings: serde_json::Value) {
        self.backend()
            .did_change_configuration(DidChangeConfigurationParams { settings })
            .await;
    }

    /// Whether the server currently tracks `uri`
    pub fn is_open(&self, uri: &Url) -> bool {
        self.backend().documents.contains_key(uri)
    }

    /// Current client settings held by the server
    pub fn settings(&self) -> prisma_lsp::lsp::PrismaSettings {
        self.backend().settings.lock().unwrap().clone()
    }

    /// Go to definition
    pub async fn definition(&mut self, uri: Url, line: u32, character: u32) -> Option<GotoDefinitionResponse> {
        let params = GotoDefinitionParams {
            text_document_position_params: TextDocumentPositionParams {
                text_document: TextDocumentIdentifier { uri },
                position: Position { line, character },
            },
            work_done_progress_params: Default::default(),
            partial_result_params: Default::default(),
        };
        self.backend().goto_definition(params).await.ok().flatten()
    }

    /// Request completion
    pub async fn completion(&mut self, uri: Url, line: u32, character: u32) -> Option<CompletionResponse> {
        let params = CompletionParams {
            text_document_position: TextDocumentPositionParams {
                text_document: TextDocumentIdentifier { uri },
                position: Position { line, character },
            },
            work_done_progress_params: Default::default(),
            partial_result_params: Default::default(),
            context: None,
        };
        self.backend().completion(params).await.ok().flatten()
    }

    /// Resolve a completion item
    pub async fn completion_resolve(&mut self, item: CompletionItem) -> CompletionItem {
        self.backend().completion_resolve(item).await.unwrap()
    }

    /// Hover
    pub async fn hover(&mut self, uri: Url, line: u32, character: u32) -> Option<Hover> {
        let params = HoverParams {
            text_document_position_params: TextDocumentPositionParams {
                text_document: TextDocumentIdentifier { uri },
                position: Position { line, character },
            },
            work_done_progress_params: Default::default(),
        };
        self.backend().hover(params).await.ok().flatten()
    }

    /// Request code actions for `diagnostics` over `range`
    pub async fn code_action(
        &mut self,
        uri: Url,
        range: Range,
        diagnostics: Vec<Diagnostic>,
    ) -> Option<CodeActionResponse> {
        let params = CodeActionParams {
            text_document: TextDocumentIdentifier { uri },
            range,
            context: CodeActionContext {
                diagnostics,
                only: Some(vec![CodeActionKind::QUICKFIX]),
                trigger_kind: None,
            },
            work_done_progress_params: Default::default(),
            partial_result_params: Default::default(),
        };
        self.backend().code_action(params).await.ok().flatten()
    }

    /// Prepare rename
    pub async fn prepare_rename(&mut self, uri: Url, line: u32, character: u32) -> Option<PrepareRenameResponse> {
        let params = TextDocumentPositionParams {
            text_document: TextDocumentIdentifier { uri },
            position: Position { line, character },
        };
        self.backend().prepare_rename(params).await.ok().flatten()
    }

    /// Rename, keeping the JSON-RPC error
    pub async fn try_rename(
        &mut self,
        uri: Url,
        line: u32,
        character: u32,
        new_name: &str,
    ) -> tower_lsp::jsonrpc::Result<Option<WorkspaceEdit>> {
        let params = RenameParams {
            text_document_position: TextDocumentPositionParams {
                text_document: TextDocumentIdentifier { uri },
                position: Position { line, character },
            },
            new_name: new_name.to_string(),
            work_done_progress_params: Default::default(),
        };
        self.backend().rename(params).await
    }

    /// Rename
    pub async fn rename(&mut self, uri: Url, line: u32, character: u32, new_name: &str) -> Option<WorkspaceEdit> {
        self.try_rename(uri, line, character, new_name).await.ok().flatten()
    }

    /// Format a document
    pub async fn formatting(&mut self, uri: Url) -> Option<Vec<TextEdit>> {
        let params = DocumentFormattingParams {
            text_document: TextDocumentIdentifier { uri },
            options: FormattingOptions {
                tab_size: 2,
                insert_spaces: true,
                ..Default::default()
            },
            work_done_progress_params: Default::default(),
        };
        self.backend().formatting(params).await.ok().flatten()
    }
}
