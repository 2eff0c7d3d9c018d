//! Controller entrypoint: CLI/env wiring, orchestrator identity detection,
//! and the tokio runtime driving the reconciler loop.

use autoscaler_config::Config;
use autoscaler_metrics::PrometheusMetricsClient;
use autoscaler_orchestrator::KubeOrchestratorClient;
use autoscaler_reconciler::Reconciler;
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tracing::info;

/// Transaction-aware horizontal autoscaler control loop.
///
/// Flags override the recognized environment variables, which in turn
/// override the compiled-in defaults. Only `PROMETHEUS_URL` has a
/// guaranteed meaning downstream; the others are read the same way
/// purely for operational convenience.
#[derive(Parser, Debug)]
#[command(name = "autoscaler", about, version)]
struct Cli {
    /// Endpoint of the time-series backend.
    #[arg(long, env = "PROMETHEUS_URL")]
    metrics_url: Option<String>,

    /// Upper bound on end-to-end latency, in milliseconds.
    #[arg(long, env = "SLO_MS")]
    slo_ms: Option<f64>,

    /// Rate/avg evaluation window, e.g. "1m".
    #[arg(long, env = "QUERY_WINDOW")]
    query_window: Option<String>,

    /// Per-tier replica ceiling.
    #[arg(long, env = "MAX_REPLICAS")]
    max_replicas: Option<u32>,

    /// Per-tier replica floor.
    #[arg(long, env = "MIN_REPLICAS")]
    min_replicas: Option<u32>,

    /// Orchestrator namespace the controller operates in.
    #[arg(long, env = "NAMESPACE")]
    namespace: Option<String>,

    /// Minimum interval between scaling actions, in seconds.
    #[arg(long, env = "COOLDOWN_S")]
    cooldown_s: Option<u64>,

    /// Below this request rate, scale-down is considered.
    #[arg(long, env = "IDLE_RPS_THRESHOLD")]
    idle_rps_threshold: Option<f64>,

    /// Reconciler tick period, in seconds.
    #[arg(long, env = "TICK_S")]
    tick_s: Option<u64>,
}

impl Cli {
    /// Overlays any flags the user supplied onto env/default-derived config.
    fn apply(self, mut config: Config) -> Config {
        if let Some(v) = self.metrics_url {
            config.metrics_url = v;
        }
        if let Some(v) = self.slo_ms {
            config.slo_ms = v;
        }
        if let Some(v) = self.query_window {
            config.query_window = v;
        }
        if let Some(v) = self.max_replicas {
            config.max_replicas = v;
        }
        if let Some(v) = self.min_replicas {
            config.min_replicas = v;
        }
        if let Some(v) = self.namespace {
            config.namespace = v;
        }
        if let Some(v) = self.cooldown_s {
            config.cooldown = Duration::from_secs(v);
        }
        if let Some(v) = self.idle_rps_threshold {
            config.idle_rps_threshold = v;
        }
        if let Some(v) = self.tick_s {
            config.tick_interval = Duration::from_secs(v);
        }
        config
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = cli.apply(Config::from_env());

    info!(
        metrics_url = %config.metrics_url,
        namespace = %config.namespace,
        slo_ms = config.slo_ms,
        tick_interval_s = config.tick_interval.as_secs(),
        "starting autoscaler controller"
    );

    let metrics = PrometheusMetricsClient::new(config.metrics_url.clone());

    // Orchestrator identity detection (in-cluster, falling back to local
    // kubeconfig) happens once here, at start-up. Failure to establish any
    // identity is a `ConfigurationError` and is fatal: the process exits
    // non-zero rather than degrading a tick, because there is no tick to
    // run without an orchestrator.
    let orchestrator = KubeOrchestratorClient::try_new(config.namespace.clone())
        .await
        .map_err(|_| {
            autoscaler_config::ConfigurationError::MissingOrchestratorIdentity
        })?;

    let reconciler = Reconciler::new(metrics, orchestrator, config);

    let shutdown = Arc::new(Notify::new());
    let shutdown_signal = shutdown.clone();
    tokio::spawn(async move {
        wait_for_shutdown_signal().await;
        shutdown_signal.notify_one();
    });

    reconciler.run(shutdown).await;

    info!("autoscaler controller exiting cleanly");
    Ok(())
}

/// Resolves once either `SIGINT` or (on unix) `SIGTERM` is received,
/// letting the reconciler's `run` loop finish its current tick before
/// exiting — a shutdown signal cancels the current sleep and any
/// in-flight I/O, then the process exits cleanly.
async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm =
            signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
