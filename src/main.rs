// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::Result;
use axum::{http::StatusCode, routing::get, Router};
use clap::Parser;
use futures::StreamExt;
use kube::{
    runtime::{controller::Action, watcher::Config, Controller},
    Api, Client, ResourceExt,
};
use nutanix_provider::{
    constants::{
        CREATED_REQUEUE_DURATION_SECS, DEFAULT_DETAILS_DIR, DEFAULT_PROVIDER_CONFIG_NAME,
        ERROR_REQUEUE_DURATION_SECS, KIND_VIRTUAL_MACHINE, METRICS_SERVER_BIND_ADDRESS,
        METRICS_SERVER_PATH, METRICS_SERVER_PORT, STEADY_STATE_REQUEUE_DURATION_SECS,
        TOKIO_WORKER_THREADS,
    },
    context::Context,
    crd::VirtualMachine,
    details::FileDetailStore,
    errors::ReconcileError,
    metrics,
    nutanix::PrismConnector,
    reconcilers::{reconcile_virtual_machine, ReconcileOutcome},
    store::KubeStore,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

/// Nutanix virtual machine provider for Kubernetes
#[derive(Parser, Debug)]
#[command(name = "nutanix-provider", version, about, long_about = None)]
struct Args {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(long)]
    debug: bool,

    /// Directory holding `<kind>-<name>.json` detail records
    #[arg(long, env = "PROVIDER_DETAILS_DIR", default_value = DEFAULT_DETAILS_DIR)]
    details_dir: String,

    /// Port of the Prometheus metrics endpoint
    #[arg(long, env = "METRICS_PORT", default_value_t = METRICS_SERVER_PORT)]
    metrics_port: u16,

    /// Name of the cluster-scoped ProviderConfig to reconcile against
    #[arg(long, default_value = DEFAULT_PROVIDER_CONFIG_NAME)]
    provider_config: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Build Tokio runtime with custom thread names
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(TOKIO_WORKER_THREADS)
        .thread_name("nutanix-provider")
        .enable_all()
        .build()?;

    runtime.block_on(async_main(args))
}

async fn async_main(args: Args) -> Result<()> {
    init_tracing(args.debug);

    info!("Starting Nutanix VM provider");
    debug!(?args, "Parsed command line");

    debug!("Initializing Kubernetes client");
    let client = Client::try_default().await?;
    debug!("Kubernetes client initialized successfully");

    let ctx = Arc::new(
        Context::new(
            Arc::new(KubeStore::new(client.clone())),
            Arc::new(PrismConnector),
            Arc::new(FileDetailStore::new(&args.details_dir)),
            reqwest::Client::builder().build()?,
        )
        .with_provider_config_name(&args.provider_config),
    );

    tokio::select! {
        result = run_metrics_server(args.metrics_port) => {
            error!("CRITICAL: metrics server exited unexpectedly: {:?}", result);
            result?;
            anyhow::bail!("metrics server exited unexpectedly without error")
        }
        () = run_virtualmachine_controller(client, ctx) => {
            info!("VirtualMachine controller stopped");
        }
    }

    Ok(())
}

/// Initialize logging.
///
/// `RUST_LOG` wins when set; otherwise `info`, or `debug` with `--debug`.
/// `RUST_LOG_FORMAT=json` switches to JSON output.
fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .with_ansi(true)
                .compact()
                .init();
        }
    }
}

/// Serve Prometheus metrics until the process exits.
async fn run_metrics_server(port: u16) -> Result<()> {
    let app = Router::new()
        .route(METRICS_SERVER_PATH, get(metrics_handler))
        .route("/healthz", get(|| async { "ok" }));

    let addr = format!("{METRICS_SERVER_BIND_ADDRESS}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(addr = %addr, path = METRICS_SERVER_PATH, "Metrics server started");

    axum::serve(listener, app).await?;
    Ok(())
}

async fn metrics_handler() -> Result<String, (StatusCode, String)> {
    metrics::gather_metrics().map_err(|e| {
        error!(error = %e, "Failed to encode metrics");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })
}

/// Run the `VirtualMachine` controller
async fn run_virtualmachine_controller(client: Client, ctx: Arc<Context>) {
    info!("Starting VirtualMachine controller");
    debug!("Initializing VirtualMachine controller with cluster-wide watch");

    let api = Api::<VirtualMachine>::all(client);

    Controller::new(api, Config::default())
        .shutdown_on_signal()
        .run(reconcile_virtualmachine_wrapper, error_policy, ctx)
        .for_each(|_| futures::future::ready(()))
        .await;
}

/// Requeue schedule after a successful pass, with the metric reason label.
fn requeue_for(outcome: &ReconcileOutcome) -> Option<(Duration, &'static str)> {
    match outcome {
        ReconcileOutcome::NotFound | ReconcileOutcome::Deleted => None,
        ReconcileOutcome::Created { .. } => Some((
            Duration::from_secs(CREATED_REQUEUE_DURATION_SECS),
            "created",
        )),
        ReconcileOutcome::Observed { .. } => Some((
            Duration::from_secs(STEADY_STATE_REQUEUE_DURATION_SECS),
            "steady_state",
        )),
    }
}

/// Reconcile wrapper for `VirtualMachine`
async fn reconcile_virtualmachine_wrapper(
    vm: Arc<VirtualMachine>,
    ctx: Arc<Context>,
) -> Result<Action, ReconcileError> {
    let start = Instant::now();
    let namespace = vm.namespace().unwrap_or_default();
    let name = vm.name_any();

    match reconcile_virtual_machine(&ctx, &namespace, &name).await {
        Ok(outcome) => {
            info!("Successfully reconciled VirtualMachine: {}/{}", namespace, name);
            metrics::record_reconciliation_success(KIND_VIRTUAL_MACHINE, start.elapsed());

            match &outcome {
                ReconcileOutcome::Created { .. } => metrics::record_vm_created(&namespace),
                ReconcileOutcome::Deleted => metrics::record_vm_deleted(&namespace),
                _ => {}
            }

            Ok(match requeue_for(&outcome) {
                Some((after, reason)) => {
                    metrics::record_reconciliation_requeue(KIND_VIRTUAL_MACHINE, reason);
                    Action::requeue(after)
                }
                None => Action::await_change(),
            })
        }
        Err(e) => {
            error!(
                namespace = %namespace,
                name = %name,
                category = e.category(),
                "Failed to reconcile VirtualMachine: {}",
                e
            );
            metrics::record_reconciliation_error(
                KIND_VIRTUAL_MACHINE,
                e.category(),
                start.elapsed(),
            );
            Err(e)
        }
    }
}

/// Error policy for the `VirtualMachine` controller
fn error_policy(_vm: Arc<VirtualMachine>, _err: &ReconcileError, _ctx: Arc<Context>) -> Action {
    metrics::record_reconciliation_requeue(KIND_VIRTUAL_MACHINE, "error");
    Action::requeue(Duration::from_secs(ERROR_REQUEUE_DURATION_SECS))
}
