mod assertions;
mod in_process_client;
mod workspace;

#[allow(unused_imports)]
pub use assertions::*;
pub use in_process_client::InProcessLspClient;
pub use workspace::TestWorkspace;
