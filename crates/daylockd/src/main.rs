//! daylockd - the daylock enforcement service
//!
//! Wires the enforcement core to its Linux collaborators and exposes the
//! rule-editing surface as CLI subcommands:
//! - `run`: enforce rules in the background until signalled
//! - `add` / `remove` / `list`: edit the stored rules

mod config;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use daylock_api::DaySet;
use daylock_core::{EnforcementConfig, EnforcementLoop};
use daylock_host_api::{ChannelSink, NotificationSink, TracingSink};
use daylock_host_linux::{ProcfsProcessSource, SignalTerminator};
use daylock_store::{RuleStore, SqliteRuleStore};
use daylock_util::RuleIdentity;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal::unix::{signal, SignalKind};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use config::{load_config, DaemonConfig};

/// daylockd - weekday schedule enforcement for protected applications
#[derive(Parser, Debug)]
#[command(name = "daylockd")]
#[command(about = "Weekday schedule enforcement for protected applications", long_about = None)]
struct Args {
    /// Configuration file path (default: ~/.config/daylock/config.toml)
    #[arg(short, long, default_value_os_t = daylock_util::default_config_path())]
    config: PathBuf,

    /// Data directory override (or set DAYLOCK_DATA_DIR env var)
    #[arg(short, long, env = "DAYLOCK_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand, Debug)]
enum CliCommand {
    /// Run the enforcement service until signalled
    Run,

    /// Add or replace the rule for an executable
    Add {
        /// Path to the protected executable
        path: PathBuf,

        /// Allowed days: comma-separated names ("mon,tue,sat"), or
        /// "all", "weekdays", "weekend", "none"
        #[arg(long)]
        days: String,
    },

    /// Remove the rule for an executable
    Remove {
        /// Path (or stored identity) of the executable
        path: String,
    },

    /// List stored rules
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(args.log_level.clone())),
        )
        .init();

    let config = load_config(&args.config)
        .with_context(|| format!("Failed to load config from {:?}", args.config))?;

    let data_dir = args.data_dir.clone().unwrap_or_else(|| config.data_dir.clone());
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create data directory {:?}", data_dir))?;

    let db_path = data_dir.join(daylock_util::DB_FILENAME);
    let store = SqliteRuleStore::open(&db_path)
        .with_context(|| format!("Failed to open rule database {:?}", db_path))?;

    match args.command {
        CliCommand::Run => run_service(store, config).await,
        CliCommand::Add { path, days } => cmd_add(&store, &path, &days),
        CliCommand::Remove { path } => cmd_remove(&store, &path),
        CliCommand::List => cmd_list(&store),
    }
}

fn cmd_add(store: &SqliteRuleStore, path: &PathBuf, days: &str) -> Result<()> {
    let allowed_days: DaySet = days.parse().context("Invalid --days value")?;

    // Existence is validated here, at write time; a target deleted later
    // stays enforceable by name.
    if !path.exists() {
        bail!("No such file: {}", path.display());
    }

    let path_str = path.to_str().context("Path is not valid UTF-8")?;
    store.upsert_rule(path_str, allowed_days)?;

    println!("Rule stored: {} allowed on {}", path.display(), allowed_days);
    Ok(())
}

fn cmd_remove(store: &SqliteRuleStore, path: &str) -> Result<()> {
    store.delete_rule(&RuleIdentity::from_path(path))?;
    println!("Rule removed for {path}");
    Ok(())
}

fn cmd_list(store: &SqliteRuleStore) -> Result<()> {
    let rules = store.list_rules()?;
    if rules.is_empty() {
        println!("No rules stored");
        return Ok(());
    }

    for rule in rules {
        println!("{:<48} {}", rule.identity_path, rule.allowed_days);
    }
    Ok(())
}

async fn run_service(store: SqliteRuleStore, config: DaemonConfig) -> Result<()> {
    if !nix::unistd::Uid::effective().is_root() {
        warn!(
            "daylockd is not running as root; terminating other users' processes will be denied"
        );
    }

    let (sink, mut notifications) = ChannelSink::channel();

    let engine = EnforcementLoop::new(
        Arc::new(store),
        Arc::new(ProcfsProcessSource::new()),
        Arc::new(SignalTerminator::new()),
        Arc::new(sink),
        EnforcementConfig {
            poll_interval: config.poll_interval,
            terminate_timeout: config.terminate_timeout,
        },
    );

    // Foreground consumer: surface loop notifications in the log. Ends
    // when the engine (the only sender) is dropped.
    let consumer = tokio::spawn(async move {
        while let Some(n) = notifications.recv().await {
            TracingSink.notify(n.severity, n.message);
        }
    });

    engine.start();
    info!("daylockd running");

    let mut sigterm = signal(SignalKind::terminate()).context("Failed to create SIGTERM handler")?;
    let mut sigint = signal(SignalKind::interrupt()).context("Failed to create SIGINT handler")?;
    let mut sighup = signal(SignalKind::hangup()).context("Failed to create SIGHUP handler")?;

    tokio::select! {
        _ = sigterm.recv() => info!("Received SIGTERM, shutting down"),
        _ = sigint.recv() => info!("Received SIGINT, shutting down"),
        _ = sighup.recv() => info!("Received SIGHUP, shutting down"),
    }

    engine.stop().await;
    drop(engine);
    let _ = consumer.await;

    info!("Shutdown complete");
    Ok(())
}
