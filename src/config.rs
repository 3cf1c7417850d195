use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;

/// Service address used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

/// Config file picked up from the working directory when `--config` is absent.
const DEFAULT_CONFIG_FILE: &str = "chat.yaml";

#[derive(Parser, Debug)]
#[command(author, version, about = "Terminal client for the AI chat service", long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE")]
    pub config: Option<String>,

    /// Base URL of the chat service
    #[arg(long, env = "BACKEND_URL")]
    pub base_url: Option<String>,

    /// Where to persist the login between runs
    #[arg(long, env = "CHAT_CREDENTIALS_FILE")]
    pub credentials_file: Option<String>,

    /// Keep the login in memory only
    #[arg(long)]
    pub ephemeral: bool,

    /// Per-request timeout in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ClientConfig {
    pub api: ApiConfig,
    pub credentials: CredentialsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl ApiConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct CredentialsConfig {
    pub path: PathBuf,
    pub ephemeral: bool,
}

/// `~/.chat-sync/session.json`, or a file in the working directory when
/// there is no home directory.
fn default_credentials_path() -> PathBuf {
    std::env::var_os("HOME")
        .filter(|home| !home.is_empty())
        .map_or_else(
            || PathBuf::from(".chat-sync-session.json"),
            |home| Path::new(&home).join(".chat-sync").join("session.json"),
        )
}

impl ClientConfig {
    /// Parse `args` and build the configuration. A `--help` or `--version`
    /// request comes back as an error here; binaries should use
    /// [`Cli::parse`] and [`ClientConfig::from_cli`] so clap can print and exit.
    pub fn load_from_args<I, T>(args: I) -> Result<Self, config::ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli =
            Cli::try_parse_from(args).map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Self::from_cli(cli)
    }

    /// Priority: CLI flag > CLI env var > `CHAT_` env > config file > defaults.
    pub fn from_cli(cli: Cli) -> Result<Self, config::ConfigError> {
        let mut builder = Config::builder()
            .set_default("api.base_url", DEFAULT_BASE_URL)?
            .set_default("api.timeout_secs", 30)?
            .set_default(
                "credentials.path",
                default_credentials_path().to_string_lossy().into_owned(),
            )?
            .set_default("credentials.ephemeral", false)?;

        // An explicit file must exist; the implicit one is optional.
        builder = match &cli.config {
            Some(path) => builder.add_source(File::with_name(path).required(true)),
            None => builder
                .add_source(File::new(DEFAULT_CONFIG_FILE, FileFormat::Yaml).required(false)),
        };

        // E.g. CHAT_API__BASE_URL=http://chat.internal:8080
        builder = builder.add_source(
            Environment::with_prefix("CHAT")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        if let Some(url) = cli.base_url {
            builder = builder.set_override("api.base_url", url)?;
        }
        if let Some(path) = cli.credentials_file {
            builder = builder.set_override("credentials.path", path)?;
        }
        if let Some(secs) = cli.timeout_secs {
            builder = builder.set_override("api.timeout_secs", secs)?;
        }
        if cli.ephemeral {
            builder = builder.set_override("credentials.ephemeral", true)?;
        }

        let cfg = builder.build()?;
        cfg.try_deserialize()
    }
}
