// SPDX-License-Identifier: MIT OR Apache-2.0
#![deny(unsafe_code)]
use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use genui_cli::commands::{self, StopReason};
use genui_cli::format::{Formatter, OutputFormat};
use genui_config::GenUiConfig;
use genui_core::{SessionMode, SessionStatus, Theme};
use genui_http::BackendClient;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "genui", version, about = "Generative UI streaming client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a TOML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Send one message and print the complete response.
    Basic {
        #[arg(long)]
        message: String,
    },

    /// Stream a free-text answer, printing text as it arrives.
    Stream {
        #[arg(long)]
        message: String,

        /// Cancel the stream after this many seconds.
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Ask for a dashboard update and print the resulting dashboard.
    Ui {
        #[arg(long)]
        message: String,

        /// Theme of the dashboard before the update.
        #[arg(long)]
        theme: Option<Theme>,

        /// Status message of the dashboard before the update.
        #[arg(long)]
        status: Option<String>,

        #[arg(long, default_value_t = OutputFormat::JsonPretty)]
        format: OutputFormat,
    },

    /// Decode a captured SSE body offline and print the final session.
    Replay {
        /// File holding the raw response body.
        #[arg(long)]
        file: PathBuf,

        #[arg(long, value_enum, default_value_t = ModeArg::Text)]
        mode: ModeArg,

        /// Bytes per simulated network chunk.
        #[arg(long, default_value_t = 4096)]
        chunk_size: usize,

        #[arg(long, default_value_t = OutputFormat::JsonPretty)]
        format: OutputFormat,
    },

    /// Configuration utilities.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Validate the configuration and print diagnostics.
    Check,
}

#[derive(Debug, Clone, ValueEnum)]
enum ModeArg {
    Text,
    Structured,
}

impl From<ModeArg> for SessionMode {
    fn from(v: ModeArg) -> Self {
        match v {
            ModeArg::Text => SessionMode::FreeText,
            ModeArg::Structured => SessionMode::Structured,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::Config {
        action: ConfigAction::Check,
    } = &cli.command
    {
        init_logging(cli.debug, None);
        return cmd_config_check(cli.config.as_deref());
    }

    let config = commands::resolve_config(cli.config.as_deref())?;
    init_logging(cli.debug, Some(&config));

    match cli.command {
        Commands::Basic { message } => cmd_basic(&config, &message).await,
        Commands::Stream { message, timeout } => cmd_stream(&config, &message, timeout).await,
        Commands::Ui {
            message,
            theme,
            status,
            format,
        } => cmd_ui(&config, &message, theme, status, format).await,
        Commands::Replay {
            file,
            mode,
            chunk_size,
            format,
        } => cmd_replay(&config, &file, mode.into(), chunk_size, format).await,
        Commands::Config { .. } => Ok(()),
    }
}

fn init_logging(debug: bool, config: Option<&GenUiConfig>) {
    let filter = if debug {
        EnvFilter::new("genui=debug")
    } else {
        let level = config.map_or("info", GenUiConfig::log_level);
        EnvFilter::new(format!("genui={level}"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_config_check(path: Option<&std::path::Path>) -> Result<()> {
    let diagnostics = commands::config_check(path);
    let failed = diagnostics.iter().any(|d| d.starts_with("error:"));
    for d in &diagnostics {
        println!("{d}");
    }
    if failed {
        anyhow::bail!("configuration is invalid");
    }
    Ok(())
}

async fn cmd_basic(config: &GenUiConfig, message: &str) -> Result<()> {
    let client = BackendClient::from_config(config);
    let resp = client.basic(message).await?;
    println!("{}", resp.response);
    Ok(())
}

async fn cmd_stream(config: &GenUiConfig, message: &str, timeout: Option<u64>) -> Result<()> {
    let client = BackendClient::from_config(config);
    let timeout = timeout.map(Duration::from_secs).or(config.stream_timeout());
    let mut stdout = std::io::stdout();
    let (snapshot, stopped) = commands::stream_text(
        &client,
        message,
        config.decode_options(),
        timeout,
        &mut stdout,
    )
    .await?;

    let formatter = Formatter::new(OutputFormat::Text);
    for report in &snapshot.reports {
        eprintln!("{}", formatter.format_report(report));
    }
    match stopped {
        Some(StopReason::Timeout) => eprintln!("status: {} (timed out)", snapshot.status),
        Some(StopReason::Interrupt) => eprintln!("status: {} (interrupted)", snapshot.status),
        None => eprintln!("status: {}", snapshot.status),
    }
    if snapshot.status == SessionStatus::Failed {
        let error = snapshot
            .error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "stream failed".into());
        anyhow::bail!(error);
    }
    Ok(())
}

async fn cmd_ui(
    config: &GenUiConfig,
    message: &str,
    theme: Option<Theme>,
    status: Option<String>,
    format: OutputFormat,
) -> Result<()> {
    let client = BackendClient::from_config(config);
    let prior = commands::prior_dashboard(theme, status);
    let (dashboard, report) = commands::apply_ui_document(&client, message, prior).await?;

    let formatter = Formatter::new(format);
    if let Some(report) = &report {
        eprintln!("{}", Formatter::new(OutputFormat::Text).format_report(report));
    }
    println!("{}", formatter.format_dashboard(&dashboard));
    Ok(())
}

async fn cmd_replay(
    config: &GenUiConfig,
    file: &std::path::Path,
    mode: SessionMode,
    chunk_size: usize,
    format: OutputFormat,
) -> Result<()> {
    let body = std::fs::read(file).with_context(|| format!("read '{}'", file.display()))?;
    let snapshot = commands::replay(&body, mode, chunk_size, config.decode_options()).await?;
    println!("{}", Formatter::new(format).format_snapshot(&snapshot));
    Ok(())
}
