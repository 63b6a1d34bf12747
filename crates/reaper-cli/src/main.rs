mod cluster;
mod output;

use anyhow::Context;
use clap::Parser;
use cluster::KubeNamespaces;
use output::{print_json, print_report};
use reaper_core::{ControlLoop, ReaperConfig, SystemClock, Termination};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "ns-reaper",
    about = "Delete every Kubernetes namespace that is not explicitly retained, once a week",
    version
)]
struct Cli {
    /// YAML config file (flags override its values)
    #[arg(long, env = "NS_REAPER_CONFIG")]
    config: Option<PathBuf>,

    /// Namespaces to retain on top of kube-system, default and kube-public
    #[arg(long = "namespaces-to-retain", value_name = "NS", value_delimiter = ',')]
    namespaces_to_retain: Vec<String>,

    /// Path to kubeconfig file (default: in-cluster or ~/.kube/config)
    #[arg(long)]
    kubeconfig: Option<PathBuf>,

    /// Delete namespaces for real; without this flag it is a dry run
    #[arg(long)]
    yes: bool,

    /// Day of the week on which to run the cleaning pass
    #[arg(long)]
    day: Option<String>,

    /// Hour of the day (UTC, 0-23) at which to run the cleaning pass
    #[arg(long = "time", value_name = "HOUR")]
    hour: Option<u32>,

    /// Run a single pass at the scheduled time, then exit
    #[arg(long = "one-shot", alias = "oneShot")]
    one_shot: bool,

    /// Seconds between clock checks [default: 30]
    #[arg(long = "interval", value_name = "SECS")]
    interval_secs: Option<u64>,

    /// Print the one-shot report as JSON
    #[arg(long, short = 'j')]
    json: bool,
}

impl Cli {
    fn overrides(&self) -> ReaperConfig {
        ReaperConfig {
            day: self.day.clone(),
            hour: self.hour,
            retain: self.namespaces_to_retain.clone(),
            execute: self.yes,
            one_shot: self.one_shot,
            interval_secs: self.interval_secs,
            kubeconfig: self.kubeconfig.clone(),
        }
    }
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter(std::env::var("RUST_LOG").ok().as_deref()))
        .with_target(false)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

/// `RUST_LOG` directives when set and parseable, `info` otherwise.
fn env_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .filter(|d| !d.trim().is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let base = match &cli.config {
        Some(path) => ReaperConfig::load(path)
            .with_context(|| format!("cannot load config {}", path.display()))?,
        None => ReaperConfig::default(),
    };
    let config = base.merge(cli.overrides());

    // Configuration errors are fatal before any cluster connection is made.
    let loop_config = config.validate()?;

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let cluster = KubeNamespaces::connect(config.kubeconfig.as_deref()).await?;
        let control = ControlLoop::new(cluster, SystemClock, loop_config)?;

        match control.run_until(shutdown_signal()).await {
            Termination::Cancelled => Ok(()),
            Termination::OneShotCompleted(Ok(report)) => {
                if cli.json {
                    print_json(&report)?;
                } else {
                    print_report(&report);
                }
                Ok(())
            }
            Termination::OneShotCompleted(Err(e)) => Err(e.into()),
        }
    })
}

/// Resolves on Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "cannot listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received Ctrl-C"),
        _ = terminate => tracing::info!("received terminate signal"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::filter::LevelFilter;

    #[test]
    fn log_level_defaults_to_info() {
        assert_eq!(env_filter(None).max_level_hint(), Some(LevelFilter::INFO));
    }

    #[test]
    fn empty_rust_log_falls_back_to_info() {
        assert_eq!(env_filter(Some("")).max_level_hint(), Some(LevelFilter::INFO));
    }

    #[test]
    fn rust_log_raises_level() {
        assert_eq!(
            env_filter(Some("debug")).max_level_hint(),
            Some(LevelFilter::DEBUG)
        );
    }

    #[test]
    fn rust_log_lowers_level() {
        assert_eq!(
            env_filter(Some("warn")).max_level_hint(),
            Some(LevelFilter::WARN)
        );
    }
}
