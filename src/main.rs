//! E-invoice transmission console
//!
//! Entry point for the CLI and the console HTTP service.

use clap::Parser;
use dotenvy::dotenv;
use mimalloc::MiMalloc;

use einvoice_console::cli::{Cli, run};

/// Global allocator for improved performance (M-MIMALLOC-APPS).
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() {
    // Load .env (if present) before clap reads env-backed flags
    let _ = dotenv();

    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
