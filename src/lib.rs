pub mod block;
pub mod code_action;
pub mod completion;
pub mod definition;
pub mod document;
pub mod hover;
pub mod lsp;
pub mod prisma_fmt;
pub mod rename;
pub mod symbol;
