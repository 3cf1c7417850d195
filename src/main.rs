//! Terminal chat client entry point.

use mimalloc::MiMalloc;

/// Global allocator for improved performance (M-MIMALLOC-APPS).
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

use std::sync::Arc;

use anyhow::Context;
use chat_sync::api::HttpClient;
use chat_sync::config::{Cli, ClientConfig};
use chat_sync::credentials::{CredentialStore, FileCredentialStore, MemoryCredentialStore};
use chat_sync::interaction::InteractionController;
use chat_sync::repl;
use clap::Parser;
use dotenvy::dotenv;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Load .env (if present) before anything reads the environment
    let _ = dotenv();

    // Initialize tracing (M-LOG-STRUCTURED). Logs go to stderr so they do not
    // interleave with the conversation on stdout.
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    // clap prints --help/--version itself and exits with the right status.
    let cli = Cli::parse();
    let config = ClientConfig::from_cli(cli).context("failed to load configuration")?;

    info!(
        name: "client.config.loaded",
        base_url = %config.api.base_url,
        credentials = %config.credentials.path.display(),
        ephemeral = config.credentials.ephemeral,
        "Client configuration loaded"
    );

    let api = Arc::new(
        HttpClient::with_timeout(&config.api.base_url, config.api.timeout())
            .context("invalid service base URL")?,
    );
    let credentials: Arc<dyn CredentialStore> = if config.credentials.ephemeral {
        Arc::new(MemoryCredentialStore::new())
    } else {
        Arc::new(FileCredentialStore::new(&config.credentials.path))
    };

    repl::run(InteractionController::new(api, credentials)).await?;
    Ok(())
}
