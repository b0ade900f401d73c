//! Command-line interface.
//!
//! Every command is a single request (or a small concurrent batch for the
//! dashboard views) against the platform API. Results print as pretty JSON
//! on stdout; the dashboard views can also render as plain text. Failures
//! print the user-facing message and exit non-zero. Nothing is retried.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Args, Parser, Subcommand, ValueEnum};
use einvoice_sdk::{
    BatchUpdateRequest, Client, RecordQuery, RetryRequest, TimelineInterval, TransmissionFilter,
    TransmissionListQuery, TransmissionStatus,
};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::config::{AppConfig, ConfigArgs};
use crate::dashboard::{
    DashboardQuery, TransmissionDashboard, TransmissionDetailView, render,
};
use crate::{build_client, server, telemetry};

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("{}", .0.user_message())]
    Api(#[from] einvoice_sdk::Error),
    #[error("failed to read {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid JSON in {origin}: {source}")]
    InvalidJson {
        origin: String,
        source: serde_json::Error,
    },
    #[error("expected a JSON array of invoices in {0}")]
    ExpectedArray(PathBuf),
    #[error("failed to encode output: {0}")]
    Output(serde_json::Error),
    #[error(transparent)]
    Server(#[from] anyhow::Error),
}

#[derive(Parser, Debug)]
#[command(
    name = "einvoice-console",
    author,
    version,
    about = "E-invoice transmission console"
)]
pub struct Cli {
    #[command(flatten)]
    pub config: ConfigArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check connectivity with the platform API
    Health,
    /// Run the console HTTP service
    Serve,
    /// Transmission status, history and retries
    #[command(subcommand)]
    Transmissions(TransmissionCommand),
    /// FIRS invoice submission
    #[command(subcommand)]
    Firs(FirsCommand),
    /// Certificates, CSIDs, integrations and IRN status
    #[command(subcommand)]
    Records(RecordsCommand),
}

#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Restrict to one organization
    #[arg(long = "org")]
    pub organization_id: Option<String>,
    /// First day included (YYYY-MM-DD)
    #[arg(long)]
    pub start_date: Option<chrono::NaiveDate>,
    /// Last day included (YYYY-MM-DD)
    #[arg(long)]
    pub end_date: Option<chrono::NaiveDate>,
}

impl FilterArgs {
    fn to_filter(&self) -> TransmissionFilter {
        TransmissionFilter {
            organization_id: self.organization_id.clone(),
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Text,
}

#[derive(Subcommand, Debug)]
pub enum TransmissionCommand {
    /// Aggregated counts and success rate
    Stats(FilterArgs),
    /// Counts bucketed by interval
    Timeline {
        #[command(flatten)]
        filter: FilterArgs,
        #[arg(long, default_value = "day", value_parser = parse_interval)]
        interval: TimelineInterval,
    },
    /// List transmissions
    List {
        #[arg(long = "org")]
        organization_id: Option<String>,
        #[arg(long, value_parser = parse_status)]
        status: Option<TransmissionStatus>,
        #[arg(long)]
        skip: Option<u32>,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Show one transmission
    Show {
        id: String,
        /// Include the history timeline
        #[arg(long)]
        history: bool,
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
    /// Status history of one transmission
    History { id: String },
    /// Ask the platform to retry a transmission
    Retry {
        id: String,
        /// Retry even if the platform would normally refuse
        #[arg(long)]
        force: bool,
        #[arg(long)]
        max_retries: Option<u32>,
        /// Delay before retrying, in seconds
        #[arg(long)]
        retry_delay: Option<u64>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Update several transmissions at once
    BatchUpdate {
        #[arg(required = true, num_args = 1..)]
        ids: Vec<String>,
        #[arg(long, value_parser = parse_status)]
        status: Option<TransmissionStatus>,
        /// JSON object stored as response data
        #[arg(long)]
        response_data: Option<String>,
        /// JSON object merged into transmission metadata
        #[arg(long)]
        metadata: Option<String>,
    },
    /// Statistics, timeline and recent transmissions in one view
    Dashboard {
        #[command(flatten)]
        filter: FilterArgs,
        #[arg(long, default_value = "day", value_parser = parse_interval)]
        interval: TimelineInterval,
        /// Rows in the recent list
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
}

#[derive(Subcommand, Debug)]
pub enum FirsCommand {
    /// Submit one invoice read from a JSON file
    Submit {
        file: PathBuf,
        /// Override the configured sandbox setting
        #[arg(long)]
        sandbox: Option<bool>,
    },
    /// Status of a submission
    Status {
        submission_id: String,
        #[arg(long)]
        sandbox: Option<bool>,
    },
    /// Submit a JSON array of invoices
    BatchSubmit {
        file: PathBuf,
        #[arg(long)]
        sandbox: Option<bool>,
    },
}

#[derive(Subcommand, Debug)]
pub enum RecordsCommand {
    Certificates(RecordArgs),
    CertificateRequests(RecordArgs),
    Csids(RecordArgs),
    Integrations(RecordArgs),
    /// IRN status items
    Irn(RecordArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct RecordArgs {
    #[arg(long = "org")]
    pub organization_id: Option<String>,
}

impl RecordArgs {
    fn to_query(&self) -> RecordQuery {
        RecordQuery {
            organization_id: self.organization_id.clone(),
        }
    }
}

fn parse_interval(s: &str) -> Result<TimelineInterval, String> {
    s.parse()
}

fn parse_status(s: &str) -> Result<TransmissionStatus, String> {
    s.parse()
}

/// Parse an optional JSON argument.
pub fn parse_json_arg(name: &str, raw: Option<&str>) -> Result<Option<Value>, CliError> {
    raw.map(|text| {
        serde_json::from_str(text).map_err(|source| CliError::InvalidJson {
            origin: format!("--{name}"),
            source,
        })
    })
    .transpose()
}

fn read_json_file(path: &Path) -> Result<Value, CliError> {
    let text = std::fs::read_to_string(path).map_err(|source| CliError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| CliError::InvalidJson {
        origin: path.display().to_string(),
        source,
    })
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let text = serde_json::to_string_pretty(value).map_err(CliError::Output)?;
    println!("{text}");
    Ok(())
}

/// Load configuration, install logging and execute the command.
pub async fn run(cli: Cli) -> Result<(), CliError> {
    let config = AppConfig::load(&cli.config)?;
    // A subscriber may already be installed when embedded; keep going.
    let _ = telemetry::init(config.logging.format);

    let client = build_client(&config)?;
    execute(cli.command, Arc::new(config), client).await
}

pub async fn execute(command: Command, config: Arc<AppConfig>, client: Client) -> Result<(), CliError> {
    match command {
        Command::Health => {
            let health = client.health().await?;
            info!(name: "upstream.health", healthy = health.is_healthy(), "Health check completed");
            print_json(&health)
        }
        Command::Serve => Ok(server::start_server(config, client).await?),
        Command::Transmissions(cmd) => run_transmissions(cmd, &client).await,
        Command::Firs(cmd) => run_firs(cmd, &config, &client).await,
        Command::Records(cmd) => run_records(cmd, &client).await,
    }
}

async fn run_transmissions(cmd: TransmissionCommand, client: &Client) -> Result<(), CliError> {
    let api = client.transmissions();
    match cmd {
        TransmissionCommand::Stats(filter) => print_json(&api.statistics(&filter.to_filter()).await?),
        TransmissionCommand::Timeline { filter, interval } => {
            print_json(&api.timeline(&filter.to_filter(), interval).await?)
        }
        TransmissionCommand::List {
            organization_id,
            status,
            skip,
            limit,
        } => {
            let query = TransmissionListQuery {
                organization_id,
                status,
                skip,
                limit,
            };
            print_json(&api.list(&query).await?)
        }
        TransmissionCommand::Show {
            id,
            history,
            format,
        } => {
            if !history && format == OutputFormat::Json {
                return print_json(&api.get(&id).await?);
            }
            let view = TransmissionDetailView::load(client, &id).await;
            match format {
                OutputFormat::Json => print_json(&view),
                OutputFormat::Text => {
                    print!("{}", render::render_detail(&view));
                    Ok(())
                }
            }
        }
        TransmissionCommand::History { id } => print_json(&api.history(&id).await?),
        TransmissionCommand::Retry {
            id,
            force,
            max_retries,
            retry_delay,
            notes,
        } => {
            let req = RetryRequest {
                force,
                max_retries,
                retry_delay,
                notes,
            };
            print_json(&api.retry_with_options(&id, &req).await?)
        }
        TransmissionCommand::BatchUpdate {
            ids,
            status,
            response_data,
            metadata,
        } => {
            let req = BatchUpdateRequest {
                transmission_ids: ids,
                status,
                response_data: parse_json_arg("response-data", response_data.as_deref())?,
                transmission_metadata: parse_json_arg("metadata", metadata.as_deref())?,
            };
            print_json(&api.batch_update(&req).await?)
        }
        TransmissionCommand::Dashboard {
            filter,
            interval,
            limit,
            format,
        } => {
            let query = DashboardQuery {
                organization_id: filter.organization_id,
                start_date: filter.start_date,
                end_date: filter.end_date,
                interval,
                limit,
            };
            let dashboard = TransmissionDashboard::load(client, &query).await;
            match format {
                OutputFormat::Json => print_json(&dashboard),
                OutputFormat::Text => {
                    print!("{}", render::render_dashboard(&dashboard));
                    Ok(())
                }
            }
        }
    }
}

async fn run_firs(cmd: FirsCommand, config: &AppConfig, client: &Client) -> Result<(), CliError> {
    let api = client.firs();
    let sandbox = |flag: Option<bool>| flag.unwrap_or(config.firs.use_sandbox);
    match cmd {
        FirsCommand::Submit { file, sandbox: flag } => {
            let invoice = read_json_file(&file)?;
            print_json(&api.submit_invoice(invoice, sandbox(flag)).await?)
        }
        FirsCommand::Status {
            submission_id,
            sandbox: flag,
        } => print_json(&api.submission_status(&submission_id, sandbox(flag)).await?),
        FirsCommand::BatchSubmit { file, sandbox: flag } => {
            let Value::Array(invoices) = read_json_file(&file)? else {
                return Err(CliError::ExpectedArray(file));
            };
            print_json(&api.batch_submit(invoices, sandbox(flag)).await?)
        }
    }
}

async fn run_records(cmd: RecordsCommand, client: &Client) -> Result<(), CliError> {
    let api = client.records();
    match cmd {
        RecordsCommand::Certificates(args) => print_json(&api.certificates(&args.to_query()).await?),
        RecordsCommand::CertificateRequests(args) => {
            print_json(&api.certificate_requests(&args.to_query()).await?)
        }
        RecordsCommand::Csids(args) => print_json(&api.csids(&args.to_query()).await?),
        RecordsCommand::Integrations(args) => print_json(&api.integrations(&args.to_query()).await?),
        RecordsCommand::Irn(args) => print_json(&api.irn_status(&args.to_query()).await?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_retry_defaults() {
        let cli = Cli::try_parse_from(["einvoice-console", "transmissions", "retry", "tx-1"]).unwrap();
        match cli.command {
            Command::Transmissions(TransmissionCommand::Retry {
                id,
                force,
                max_retries,
                ..
            }) => {
                assert_eq!(id, "tx-1");
                assert!(!force);
                assert_eq!(max_retries, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_timeline_interval() {
        let cli = Cli::try_parse_from([
            "einvoice-console",
            "transmissions",
            "timeline",
            "--interval",
            "month",
            "--org",
            "org-1",
        ])
        .unwrap();
        match cli.command {
            Command::Transmissions(TransmissionCommand::Timeline { filter, interval }) => {
                assert_eq!(interval, TimelineInterval::Month);
                assert_eq!(filter.organization_id.as_deref(), Some("org-1"));
            }
            other => panic!("unexpected command: {other:?}"),
        }

        let err = Cli::try_parse_from([
            "einvoice-console",
            "transmissions",
            "timeline",
            "--interval",
            "fortnight",
        ]);
        assert!(err.is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "einvoice-console",
            "health",
            "--api-base-url",
            "http://api.example.test",
        ])
        .unwrap();
        assert_eq!(
            cli.config.api_base_url.as_deref(),
            Some("http://api.example.test")
        );
    }

    #[test]
    fn test_parse_json_arg() {
        assert!(parse_json_arg("metadata", None).unwrap().is_none());
        assert_eq!(
            parse_json_arg("metadata", Some(r#"{"source":"erp"}"#)).unwrap(),
            Some(serde_json::json!({ "source": "erp" }))
        );
        let err = parse_json_arg("metadata", Some("{oops")).unwrap_err();
        assert!(err.to_string().starts_with("invalid JSON in --metadata"));
    }

    #[test]
    fn test_api_error_displays_server_message() {
        let err = CliError::from(einvoice_sdk::Error::Api {
            status: 400,
            message: "Maximum retry attempts exceeded".into(),
        });
        assert_eq!(err.to_string(), "Maximum retry attempts exceeded");
    }
}
