//! sticky-edges - Pointer Edge Resistance Daemon
//!
//! Entry point for the daemon binary.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sticky_edges::backend::ReplayBackend;
use sticky_edges::config::Config;
use sticky_edges::daemon::Daemon;

/// Command-line arguments for sticky-edges
#[derive(Parser, Debug)]
#[command(name = "sticky-edges")]
#[command(version, about = "Pointer edge resistance daemon", long_about = None)]
pub struct Args {
    /// Configuration file path (defaults to sticky-edges.toml in the XDG
    /// config directory)
    #[arg(short, long, env = "STICKY_EDGES_CONFIG")]
    pub config: Option<PathBuf>,

    /// Write the built-in defaults to the configuration path and exit
    #[arg(long)]
    pub write_default_config: bool,

    /// Replay a recorded JSONL event trace
    #[arg(short, long, env = "STICKY_EDGES_REPLAY")]
    pub replay: Option<PathBuf>,

    /// Verbose logging (can be specified multiple times)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Log format (json|pretty|compact)
    #[arg(long, default_value = "pretty")]
    pub log_format: String,

    /// Write logs to file (in addition to stdout)
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // The guard flushes buffered file logs on drop; hold it for the
    // lifetime of the process.
    let _log_guard = init_logging(&args)?;

    info!("════════════════════════════════════════════════════════");
    info!("  sticky-edges v{}", env!("CARGO_PKG_VERSION"));
    info!("  Built: {} {}", env!("BUILD_DATE"), env!("BUILD_TIME"));
    info!("  Commit: {}", env!("GIT_HASH"));
    info!(
        "  Profile: {}",
        if cfg!(debug_assertions) {
            "debug"
        } else {
            "release"
        }
    );
    info!("════════════════════════════════════════════════════════");

    let config_path = args.config.clone().unwrap_or_else(Config::default_path);

    if args.write_default_config {
        Config::write_default(&config_path)?;
        info!(path = %config_path.display(), "default configuration written");
        return Ok(());
    }

    let config = Config::load_or_default(&config_path);
    info!("Configuration loaded");
    tracing::debug!("Config: {:?}", config);

    let daemon = Daemon::new(&config, config_path);

    let Some(trace) = args.replay else {
        anyhow::bail!(
            "no event source selected; pass --replay <TRACE> \
             (live window-system backends attach through the backend trait)"
        );
    };

    info!(trace = %trace.display(), "replaying event trace");
    let mut backend = ReplayBackend::open(&trace).await?;
    daemon.run(&mut backend).await?;

    info!("sticky-edges shut down");
    Ok(())
}

fn init_logging(args: &Args) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let log_level = match args.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| {
            tracing_subscriber::EnvFilter::new(format!("sticky_edges={log_level},warn"))
        });

    // If log file is specified, write to both stdout and file
    if let Some(log_file_path) = &args.log_file {
        let file = std::fs::File::create(log_file_path)
            .with_context(|| format!("Failed to create log file: {}", log_file_path.display()))?;
        let (file_writer, guard) = tracing_appender::non_blocking(file);

        match args.log_format.as_str() {
            "json" => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(
                        tracing_subscriber::fmt::layer()
                            .json()
                            .with_writer(std::io::stdout),
                    )
                    .with(
                        tracing_subscriber::fmt::layer()
                            .json()
                            .with_writer(file_writer)
                            .with_ansi(false),
                    )
                    .init();
            }
            "compact" => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(
                        tracing_subscriber::fmt::layer()
                            .compact()
                            .with_writer(std::io::stdout),
                    )
                    .with(
                        tracing_subscriber::fmt::layer()
                            .compact()
                            .with_writer(file_writer)
                            .with_ansi(false),
                    )
                    .init();
            }
            _ => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(
                        tracing_subscriber::fmt::layer()
                            .pretty()
                            .with_writer(std::io::stdout),
                    )
                    .with(
                        tracing_subscriber::fmt::layer()
                            .with_writer(file_writer)
                            .with_ansi(false),
                    )
                    .init();
            }
        }
        info!("Logging to file: {}", log_file_path.display());
        Ok(Some(guard))
    } else {
        // Stdout only
        match args.log_format.as_str() {
            "json" => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(tracing_subscriber::fmt::layer().json())
                    .init();
            }
            "compact" => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(tracing_subscriber::fmt::layer().compact())
                    .init();
            }
            _ => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(tracing_subscriber::fmt::layer().pretty())
                    .init();
            }
        }
        Ok(None)
    }
}
