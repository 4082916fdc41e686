use std::path::Path;
use tempfile::TempDir;
use tower_lsp::lsp_types::Url;

const SCHEMA_FILE: &str = "schema.prisma";

/// Temporary project directory holding the schema under test
pub struct TestWorkspace {
    dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    /// Write `schema.prisma` and return the URI the editor would use for it
    pub fn schema(&self, content: &str) -> Url {
        let path = self.dir.path().join(SCHEMA_FILE);
        std::fs::write(&path, content).expect("Failed to write schema");
        Url::from_file_path(&path).expect("Failed to create URI")
    }

    pub fn root_uri(&self) -> Url {
        Url::from_directory_path(self.dir.path()).expect("Failed to create root URI")
    }

    pub fn root_path(&self) -> &Path {
        self.dir.path()
    }
}
