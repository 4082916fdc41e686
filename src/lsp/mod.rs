pub mod backend;
pub mod lsp_config;

pub use backend::Backend;
pub use lsp_config::{PrismaLspConfig, PrismaSettings};
