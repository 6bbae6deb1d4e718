//! healthgated: the healthgate daemon.
//!
//! Startup runs in two phases:
//! 1. Cache warm-up: the start is journaled in the record store, the
//!    well-known entry is written, then the simulated warm-up delay
//!    elapses. A shutdown signal here ends the process before binding.
//! 2. Serving: the probe registry is built, the listener is bound and the
//!    actuator endpoints are served until Ctrl-C or SIGTERM.
//!
//! # Usage
//!
//! ```text
//! healthgated serve --config /etc/healthgate.toml --port 8080
//! healthgated print-config --preset simulated
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use healthgate_core::{GateConfig, LogFormat, Preset};
use healthgate_health::{CacheWarmUp, ProbeRegistry, WarmUpError};
use healthgate_state::{CacheManager, StateStore};

const DEFAULT_LOG_FILTER: &str = "info,healthgated=debug,healthgate=debug";

#[derive(Parser)]
#[command(name = "healthgated", about = "healthgate daemon", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

/// Options shared by every subcommand; each one overrides the config file.
#[derive(clap::Args, Debug)]
struct ConfigArgs {
    /// Path to healthgate.toml.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Probe modes to use: simulated or dependency-checking.
    #[arg(long)]
    preset: Option<Preset>,

    /// Port to listen on.
    #[arg(long)]
    port: Option<u16>,

    /// Data directory for the record store.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Seed for the probe randomness sources.
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Subcommand)]
enum Command {
    /// Warm the cache, then serve the probe endpoints.
    Serve {
        #[command(flatten)]
        args: ConfigArgs,
    },
    /// Print the effective configuration as TOML.
    PrintConfig {
        #[command(flatten)]
        args: ConfigArgs,
    },
}

impl ConfigArgs {
    fn resolve(&self) -> anyhow::Result<GateConfig> {
        let mut config = match &self.config {
            Some(path) => GateConfig::from_file(path)?,
            None => GateConfig::default(),
        };
        if let Some(preset) = self.preset {
            config.apply_preset(preset);
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(data_dir) = &self.data_dir {
            config.server.data_dir = data_dir.clone();
        }
        if let Some(seed) = self.seed {
            config.random.seed = Some(seed);
        }
        config.validate()?;
        Ok(config)
    }
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_LOG_FILTER));

    match format {
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
        LogFormat::Json => tracing_subscriber::fmt().json().with_env_filter(filter).init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve { args } => {
            let config = args.resolve()?;
            init_tracing(config.logging.format);
            run_serve(config).await
        }
        Command::PrintConfig { args } => {
            let config = args.resolve()?;
            print!("{}", config.to_toml_string()?);
            Ok(())
        }
    }
}

async fn run_serve(config: GateConfig) -> anyhow::Result<()> {
    info!("healthgate daemon starting");

    std::fs::create_dir_all(&config.server.data_dir)?;
    let db_path = config.server.data_dir.join("healthgate.redb");
    let store = StateStore::open(&db_path)?;

    let shutdown = CancellationToken::new();
    let signal_handle = tokio::spawn(shutdown_signal(shutdown.clone()));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    let result = serve(config, store, shutdown, TcpListener::bind(addr)).await;

    signal_handle.abort();
    info!("healthgate daemon stopped");
    result
}

/// Record the start, warm the cache, then serve until `shutdown` fires.
///
/// `bind` is awaited only once the warm-up has finished, and never when
/// `shutdown` fires during the warm-up.
async fn serve(
    config: GateConfig,
    store: StateStore,
    shutdown: CancellationToken,
    bind: impl Future<Output = std::io::Result<TcpListener>>,
) -> anyhow::Result<()> {
    let start = store.append_record(env!("CARGO_PKG_NAME"), unix_now())?;
    info!(start = start.id, "startup recorded");

    let caches = CacheManager::new();
    let warm_up = CacheWarmUp::from_config(caches.clone(), &config)?;
    match warm_up.run(&shutdown).await {
        Ok(()) => {}
        Err(WarmUpError::Cancelled) => {
            info!("shutdown requested during cache warm-up, not serving");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    }

    let registry = ProbeRegistry::from_config(&config, store, caches)?;
    let router = healthgate_api::build_router(registry);

    let listener = bind.await?;
    info!(addr = %listener.local_addr()?, "API server starting");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await?;
    Ok(())
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_secs())
}

/// Cancel `token` on Ctrl-C or SIGTERM.
async fn shutdown_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received Ctrl-C, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
        _ = token.cancelled() => return,
    }
    token.cancel();
}
