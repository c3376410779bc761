//! `dine` entry point.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use client::{App, Cli, Config, HttpBackend};
use session_store::FileSessionStore;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> ExitCode {
    // 1. Load configuration and parse arguments
    let mut config = Config::from_env();
    let cli = Cli::parse();
    if let Some(api_url) = cli.api_url {
        config.api_url = api_url;
    }
    if let Some(session_file) = cli.session_file {
        config.session_file = session_file;
    }

    // 2. Initialize tracing (stderr, so command output stays clean)
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // 3. Open the session and connect to the backend
    let store = Arc::new(FileSessionStore::open(&config.session_file));
    let backend = match HttpBackend::from_config(&config) {
        Ok(backend) => Arc::new(backend),
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };
    tracing::debug!(api_url = %config.api_url, session = %config.session_file.display(), "client ready");

    // 4. Run the command
    let app = App::new(store, backend, config.poll_interval);
    match app.execute(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
