//! Repline - an interactive read-eval-print console
//!
//! ```text
//! Calculator
//! Type 'help' for a list of commands.
//! >> (1 + 2) * 14
//! => 42
//! >> _
//! ```

mod console;
mod flavors;

use clap::Parser;
use flavors::{calc, shell, FlavorKind};
use repline_config::{Config, ConfigManager};
use repline_core::{
    Evaluator, FlavorConfig, HistoryStorage, JsonFileStorage, Session, SessionEngine,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Repline - interactive console with persistent command history
#[derive(Parser, Debug)]
#[command(name = "repline")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// REPL flavor to start
    #[arg(short = 'f', long, value_enum)]
    flavor: Option<FlavorKind>,

    /// Config file path
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Evaluate one expression and exit
    #[arg(short = 'e', long)]
    execute: Option<String>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Logs go to stderr, the transcript owns stdout
    let log_level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| format!("repline={0},repline_core={0}", log_level)),
        ))
        .init();

    tracing::info!(
        "Starting Repline v{} (core v{})",
        env!("CARGO_PKG_VERSION"),
        repline_core::VERSION
    );

    let manager = match args.config {
        Some(ref path) => ConfigManager::from_path(path)?,
        None => ConfigManager::new()?,
    };
    let config = manager.config();
    let storage: Arc<dyn HistoryStorage> = Arc::new(JsonFileStorage::new(manager.history_path()));
    tracing::debug!("Command history at {}", manager.history_path().display());

    let kind = match args.flavor {
        Some(kind) => kind,
        None => FlavorKind::from_name(&config.general.flavor)?,
    };

    match kind {
        FlavorKind::Calc => launch(calc::flavor(), calc::Calculator, storage, &config, &args),
        FlavorKind::Shell => launch(shell::flavor(), shell::Shell::new(), storage, &config, &args),
    }
}

fn launch<E: Evaluator + 'static>(
    flavor: FlavorConfig,
    evaluator: E,
    storage: Arc<dyn HistoryStorage>,
    config: &Config,
    args: &Args,
) -> anyhow::Result<()> {
    let flavor = match config.prompt.symbol {
        Some(ref symbol) => flavor.with_prompt(symbol.clone()),
        None => flavor,
    };

    tracing::debug!(title = %flavor.title, grammar = %flavor.grammar, "Launching flavor");

    let session = Session::with_default_buffer_size(
        flavor,
        evaluator,
        storage,
        config.history.buffer_size,
    )?;
    let engine = Arc::new(SessionEngine::from_session(session));

    if let Some(ref expression) = args.execute {
        println!("{}", console::execute_once(&engine, expression));
        return Ok(());
    }

    console::run(engine, config.general.show_welcome)
}
