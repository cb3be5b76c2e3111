use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use clap::{Args, Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use supplier_registry::config::AppConfig;
use supplier_registry::error::AppError;
use supplier_registry::profile::{
    classify, profile_router, InMemoryRecordStore, LogNotificationSender, PermissionLevel,
    ProfileChangeService, ProfileField, READ_ONLY_FIELDS,
};
use supplier_registry::telemetry;
use tracing::info;

#[derive(Clone)]
struct AppState {
    readiness: Arc<AtomicBool>,
    // Absent when REGISTRY_METRICS_ENABLED is off.
    metrics: Option<PrometheusHandle>,
}

#[derive(Parser, Debug)]
#[command(
    name = "Supplier Registry",
    about = "Run the supplier registration and profile change arbitration service",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Print the field permission table used by the arbitration engine
    Fields,
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => run_server(args).await,
        Command::Fields => {
            render_field_table();
            Ok(())
        }
    }
}

async fn run_server(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let readiness_flag = Arc::new(AtomicBool::new(false));
    let mut state = AppState {
        readiness: readiness_flag.clone(),
        metrics: None,
    };

    let mut ops = Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint));

    let mut prometheus_layer = None;
    if config.metrics.enabled {
        let (layer, handle) = PrometheusMetricLayer::pair();
        prometheus_layer = Some(layer);
        state.metrics = Some(handle);
        ops = ops.route("/metrics", get(metrics_endpoint));
    }

    let store = Arc::new(InMemoryRecordStore::default());
    let notifier = Arc::new(LogNotificationSender);
    let service = Arc::new(ProfileChangeService::new(store, notifier));

    let mut app = ops.with_state(state).merge(profile_router(service));
    if let Some(layer) = prometheus_layer {
        app = app.layer(layer);
    }

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "supplier registry ready");

    axum::serve(listener, app).await?;
    Ok(())
}

fn render_field_table() {
    println!("Vendor profile field permissions");

    println!("\nDirect update (immediate effect)");
    for field in ProfileField::ALL {
        if classify(field.name()) == PermissionLevel::Direct {
            println!("- {field}");
        }
    }

    println!("\nApproval required (admin review)");
    for field in ProfileField::ALL {
        if classify(field.name()) == PermissionLevel::ApprovalRequired {
            println!("- {field}");
        }
    }

    println!("\nRead-only (system managed)");
    for name in READ_ONLY_FIELDS {
        println!("- {name}");
    }
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(State(state): State<AppState>) -> Response {
    match state.metrics {
        Some(handle) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_state() -> AppState {
        AppState {
            readiness: Arc::new(AtomicBool::new(false)),
            metrics: None,
        }
    }

    #[tokio::test]
    async fn healthcheck_reports_ok() {
        let Json(payload) = healthcheck().await;
        assert_eq!(payload["status"], "ok");
    }

    #[tokio::test]
    async fn metrics_endpoint_is_dark_without_a_recorder() {
        let response = metrics_endpoint(State(test_state())).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn readiness_flips_with_flag() {
        let state = test_state();

        let before: Response = readiness_endpoint(State(state.clone())).await.into_response();
        assert_eq!(before.status(), StatusCode::SERVICE_UNAVAILABLE);

        state.readiness.store(true, Ordering::Release);
        let after: Response = readiness_endpoint(State(state)).await.into_response();
        assert_eq!(after.status(), StatusCode::OK);
    }
}
