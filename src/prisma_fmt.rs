//! Adapter for the external `prisma-fmt` binary, which validates and formats
//! schema text passed on stdin.

use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};

use serde::Deserialize;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tower_lsp::lsp_types::{Diagnostic, DiagnosticSeverity, Range};

use crate::document::Document;

pub const DEFAULT_BINARY: &str = "prisma-fmt";

#[derive(Debug, Error)]
pub enum PrismaFmtError {
    #[error("failed to start {path:?}: {source}")]
    Spawn {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("failed to exchange data with prisma-fmt: {0}")]
    Io(#[from] std::io::Error),
    #[error("prisma-fmt exited with {status}: {stderr}")]
    Failed { status: ExitStatus, stderr: String },
    #[error("prisma-fmt returned unreadable output: {0}")]
    InvalidOutput(#[from] serde_json::Error),
}

/// One entry of `prisma-fmt lint` output; offsets are bytes into the text.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LintDiagnostic {
    pub start: usize,
    pub end: usize,
    pub text: String,
    #[serde(default)]
    pub is_warning: bool,
}

#[derive(Debug, Clone)]
pub struct PrismaFmt {
    bin_path: PathBuf,
}

impl PrismaFmt {
    pub fn new(bin_path: impl Into<PathBuf>) -> Self {
        Self {
            bin_path: bin_path.into(),
        }
    }

    async fn run(&self, args: &[&str], input: &str) -> Result<String, PrismaFmtError> {
        log::debug!("running {:?} {:?}", self.bin_path, args);
        let mut child = Command::new(&self.bin_path)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| PrismaFmtError::Spawn {
                source,
                path: self.bin_path.clone(),
            })?;

        // stdin is fed while stdout drains
        let stdin = child.stdin.take();
        let write = async move {
            if let Some(mut stdin) = stdin {
                stdin.write_all(input.as_bytes()).await?;
            }
            Ok::<_, std::io::Error>(())
        };
        let (written, output) = tokio::join!(write, child.wait_with_output());
        let output = output?;
        if !output.status.success() {
            return Err(PrismaFmtError::Failed {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        written?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    pub async fn format(&self, text: &str, tab_size: u32) -> Result<String, PrismaFmtError> {
        self.run(&["format", "-s", &tab_size.to_string()], text).await
    }

    pub async fn lint(&self, text: &str) -> Result<Vec<LintDiagnostic>, PrismaFmtError> {
        let output = self.run(&["lint", "--no-env-errors"], text).await?;
        parse_lint_output(&output)
    }
}

pub fn parse_lint_output(output: &str) -> Result<Vec<LintDiagnostic>, PrismaFmtError> {
    if output.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(output)?)
}

pub fn to_lsp_diagnostics(document: &Document, lints: &[LintDiagnostic]) -> Vec<Diagnostic> {
    lints
        .iter()
        .map(|lint| Diagnostic {
            range: Range::new(
                document.position_at_byte(lint.start),
                document.position_at_byte(lint.end),
            ),
            severity: Some(if lint.is_warning {
                DiagnosticSeverity::WARNING
            } else {
                DiagnosticSeverity::ERROR
            }),
            source: Some("prisma".to_string()),
            message: lint.text.clone(),
            ..Default::default()
        })
        .collect()
}
