use clap::{Args, ValueEnum};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Name of the config file picked up from the working directory when no
/// explicit path is given.
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";

/// Global flags shared by every subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE", global = true)]
    pub config: Option<String>,

    /// Base URL of the platform API
    #[arg(long, env = "EINVOICE_API_BASE_URL", global = true)]
    pub api_base_url: Option<String>,

    /// Bearer token sent with every request
    #[arg(long, env = "EINVOICE_API_TOKEN", global = true, hide_env_values = true)]
    pub api_token: Option<String>,

    /// Use the FIRS sandbox for submissions
    #[arg(long, env = "EINVOICE_USE_SANDBOX", global = true)]
    pub use_sandbox: Option<bool>,

    /// Port for the console service
    #[arg(long, env = "PORT", global = true)]
    pub port: Option<u16>,

    /// Log output format
    #[arg(long, env = "LOG_FORMAT", global = true)]
    pub log_format: Option<LogFormat>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub firs: FirsConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    #[serde(default)]
    pub token: Option<String>,
    pub timeout_secs: u64,
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct FirsConfig {
    pub use_sandbox: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub format: LogFormat,
}

#[derive(Debug, Default, Deserialize, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl LogFormat {
    fn as_str(self) -> &'static str {
        match self {
            Self::Pretty => "pretty",
            Self::Json => "json",
        }
    }
}

impl AppConfig {
    /// Load configuration from the process working directory.
    pub fn load(args: &ConfigArgs) -> Result<Self, config::ConfigError> {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::load_from(args, &cwd)
    }

    /// Priority: CLI flag > CLI env var > `EINVOICE_*` env > config file > defaults.
    pub fn load_from(args: &ConfigArgs, cwd: &Path) -> Result<Self, config::ConfigError> {
        let mut builder = Config::builder()
            .set_default("api.base_url", "http://localhost:8000")?
            .set_default("api.timeout_secs", 30)?
            .set_default("firs.use_sandbox", true)?
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("logging.format", LogFormat::default().as_str())?;

        if let Some(path) = resolve_config_file(args.config.as_deref(), cwd) {
            // An explicit path must exist; the cwd fallback was already checked.
            builder = builder.add_source(File::from(path).required(true));
        }

        // E.g. EINVOICE_SERVER__PORT=8080, EINVOICE_API__TIMEOUT_SECS=10
        builder = builder.add_source(
            Environment::with_prefix("EINVOICE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        if let Some(url) = &args.api_base_url {
            builder = builder.set_override("api.base_url", url.as_str())?;
        }
        if let Some(token) = args.api_token.as_ref().filter(|t| !t.trim().is_empty()) {
            builder = builder.set_override("api.token", token.as_str())?;
        }
        if let Some(sandbox) = args.use_sandbox {
            builder = builder.set_override("firs.use_sandbox", sandbox)?;
        }
        if let Some(port) = args.port {
            builder = builder.set_override("server.port", i64::from(port))?;
        }
        if let Some(format) = args.log_format {
            builder = builder.set_override("logging.format", format.as_str())?;
        }

        let cfg: Self = builder.build()?.try_deserialize()?;
        if cfg.api.base_url.trim().is_empty() {
            return Err(config::ConfigError::Message(
                "api.base_url cannot be empty".to_string(),
            ));
        }
        Ok(cfg)
    }
}

/// Explicit path (relative to `cwd`) wins; otherwise `./config.yaml` when it exists.
pub fn resolve_config_file(explicit: Option<&str>, cwd: &Path) -> Option<PathBuf> {
    if let Some(path) = explicit.filter(|p| !p.trim().is_empty()) {
        return Some(cwd.join(path));
    }
    let fallback = cwd.join(DEFAULT_CONFIG_FILE);
    fallback.is_file().then_some(fallback)
}
