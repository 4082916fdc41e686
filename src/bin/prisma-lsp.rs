use std::fs::File;
use std::path::PathBuf;

use clap::Parser as ClapParser;
use clap_verbosity_flag::{InfoLevel, Verbosity};
use tower_lsp::{LspService, Server};

use prisma_lsp::lsp::Backend;

#[derive(ClapParser)]
#[command(version, about, long_about=None)]
struct Cli {
    /// write logs to this file
    #[arg(short, long, value_name = "FILE")]
    debuglogfile: Option<PathBuf>,
    /// talk LSP over stdin/stdout (the only transport; accepted for editor compatibility)
    #[arg(long)]
    stdio: bool,
    #[command(flatten)]
    verbose: Verbosity<InfoLevel>,
}

fn init_logger(filter_level: log::LevelFilter, logfile: Option<PathBuf>) {
    let mut loggers = Vec::new();
    if let Some(filename) = logfile {
        match File::create(&filename) {
            Ok(file) => loggers.push(simplelog::WriteLogger::new(
                filter_level,
                simplelog::Config::default(),
                file,
            ) as Box<dyn simplelog::SharedLogger>),
            Err(err) => eprintln!("cannot open log file {:?}: {}", filename, err),
        }
    }
    simplelog::CombinedLogger::init(loggers).unwrap();
}

#[tokio::main]
async fn main() {
    let args = Cli::parse();
    init_logger(args.verbose.log_level_filter(), args.debuglogfile);
    log::debug!("stdio flag: {}", args.stdio);
    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::new(Backend::new);
    log::info!("Prisma Language Server started");
    Server::new(stdin, stdout, socket).serve(service).await;
    log::info!("Prisma Language Server exits");
}
