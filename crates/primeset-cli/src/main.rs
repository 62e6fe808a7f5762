//! Prime Training Set
//!
//! Streams every integer in a range through a pool of classifier workers and
//! writes one labelled feature record per value as JSON lines and/or CSV.

use anyhow::Result;
use clap::Parser;
use primeset_core::Error;
use primeset_pipeline::Pipeline;
use std::net::SocketAddr;
use tokio::signal;
use tracing::{info, warn};

mod cli;
mod config;

use cli::{Cli, LogFormat};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.silent, cli.log_format);

    if let Some(path) = &cli.cpuprofile {
        warn!(path = %path.display(), "CPU profiling is not supported, ignoring --cpuprofile");
    }

    let pipeline = match config::load(&cli).and_then(Pipeline::new) {
        Ok(pipeline) => pipeline,
        Err(Error::Config(msg)) => {
            eprintln!("{}", msg);
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };

    if let Some(addr) = cli.metrics_listen {
        init_metrics(addr)?;
    }

    info!(
        start = pipeline.config().start,
        end = pipeline.config().end,
        "Starting prime training set generator"
    );

    tokio::select! {
        result = pipeline.run() => {
            let summary = result?;
            info!(%summary, "Done");
            Ok(())
        }
        name = shutdown_signal() => {
            eprintln!("{}", name);
            std::process::exit(1);
        }
    }
}

/// Wait for SIGINT or SIGTERM and return the signal name
async fn shutdown_signal() -> &'static str {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => "SIGINT",
        _ = terminate => "SIGTERM",
    }
}

/// Default filter directives for the library crates and this binary
fn default_directives(verbose: bool, silent: bool) -> &'static str {
    if verbose {
        "primeset=debug,prime_training_set=debug"
    } else if silent {
        "warn"
    } else {
        "primeset=info,prime_training_set=info"
    }
}

/// Initialize tracing/logging on stderr
fn init_tracing(verbose: bool, silent: bool, format: LogFormat) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let directives = default_directives(verbose, silent);
    let filter = if verbose {
        EnvFilter::new(directives)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives))
    };

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}

/// Install the Prometheus exporter listening on `addr`
fn init_metrics(addr: SocketAddr) -> Result<()> {
    use metrics_exporter_prometheus::PrometheusBuilder;

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics exporter: {}", e))?;

    primeset_telemetry::describe_metrics();

    info!(%addr, "Metrics exporter listening");
    Ok(())
}
