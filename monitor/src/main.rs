//! Vigil monitor entry point
//!
//! Wraps the monitoring engine in a small interactive command surface:
//! `start` runs the engine until interrupted, `suggestions` prints advisory
//! output over the current in-memory aggregates, `lighthouse` runs a
//! one-shot page audit, `quit` exits.

use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, Level};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use vigil_monitor::{
    audit,
    config::{LoggingConfig, MonitorConfig},
    engine::MonitorEngine,
    recommend, report,
    error::Result,
};

/// Vigil monitor command line interface
#[derive(Parser)]
#[command(name = "vigil-monitor")]
#[command(about = "Performance monitoring and alerting engine")]
#[command(version = "0.1.0")]
struct Cli {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Enable JSON logging on the console
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_configuration(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    // The guard keeps the non-blocking file writer flushing until exit.
    let _guard = initialize_logging(&cli, &config.logging);

    info!("starting Vigil monitor");

    if let Err(e) = run(config).await {
        error!("fatal: {}", e);
        process::exit(1);
    }
}

/// Load configuration from file or defaults
fn load_configuration(cli: &Cli) -> Result<MonitorConfig> {
    let config = if let Some(config_path) = &cli.config {
        MonitorConfig::from_file(config_path)?
    } else {
        let default_path = MonitorConfig::default_config_path()?;
        if default_path.exists() {
            MonitorConfig::from_file(&default_path)?
        } else {
            MonitorConfig::default()
        }
    };

    config.validate()?;
    Ok(config)
}

/// Initialize console and file logging
fn initialize_logging(cli: &Cli, logging: &LoggingConfig) -> Option<WorkerGuard> {
    let log_level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "vigil_monitor={},reqwest=warn,hyper=warn,mio=warn",
            log_level
        ))
    });

    let mut guard = None;
    let file_layer = logging.file_path.as_ref().map(|path| {
        let dir = path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let file_name = path
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("performance.log"));
        let (writer, worker_guard) = tracing_appender::non_blocking(
            tracing_appender::rolling::never(dir, file_name),
        );
        guard = Some(worker_guard);
        fmt::layer().with_writer(writer).with_ansi(false)
    });

    let registry = tracing_subscriber::registry().with(filter).with(file_layer);
    if cli.json_logs {
        registry
            .with(logging.console.then(|| fmt::layer().json()))
            .init();
    } else {
        registry
            .with(logging.console.then(|| fmt::layer().with_target(false)))
            .init();
    }

    guard
}

/// Interactive command loop over standard input
async fn run(config: MonitorConfig) -> Result<()> {
    use std::io::Write as _;

    let mut engine = MonitorEngine::new(config.clone());

    println!("Vigil performance monitor");
    println!("Commands:");
    println!("  start       - start monitoring (Ctrl-C to stop)");
    println!("  lighthouse  - run a one-shot Lighthouse page audit");
    println!("  suggestions - print optimization suggestions");
    println!("  quit        - exit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("\n> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match line.trim().to_lowercase().as_str() {
            "" => continue,
            "start" => {
                if let Err(e) = run_engine(&mut engine).await {
                    eprintln!("{}", e);
                }
            }
            "lighthouse" => match audit::run_lighthouse(&config.audit).await {
                Ok(true) => println!("Audit written to {}", config.audit.output_path.display()),
                Ok(false) => println!("Audit did not complete; see log for details."),
                Err(e) => eprintln!("{}", e),
            },
            "suggestions" => print_suggestions(&engine).await,
            "quit" | "exit" => break,
            other => println!("Unrecognized command: {}", other),
        }
    }

    Ok(())
}

/// Run the engine until the operator interrupts it
async fn run_engine(engine: &mut MonitorEngine) -> Result<()> {
    engine.start().await?;
    println!("Monitoring started; press Ctrl-C to stop.");

    engine.wait_for_shutdown().await?;

    let dump = engine.stop().await?;
    println!("Monitoring stopped; metrics saved to {}", dump.display());
    Ok(())
}

/// Print optimization suggestions over the current in-memory aggregates
async fn print_suggestions(engine: &MonitorEngine) {
    let history = engine.store().snapshot().await;
    let summary = report::summarize(&history);
    let suggestions = recommend::optimization_suggestions(&summary);

    if suggestions.is_empty() {
        println!("No optimization suggestions at current load.");
        return;
    }

    println!("Optimization suggestions:");
    for (index, suggestion) in suggestions.iter().enumerate() {
        println!("{}. {}", index + 1, suggestion);
    }
}
