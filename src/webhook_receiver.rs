//! HTTP entry point for alertmanager webhooks.
//!
//! One parameterized route family serves both providers:
//!
//! - `GET /` static welcome text
//! - `GET /:provider/hook/:env` reports whether credentials are configured
//! - `POST /:provider/hook/:env` accepts an alert batch and dispatches it
//! - `GET /metrics` prometheus text exposition
//!
//! A parsed batch is always acknowledged with 200 "Success", no matter how
//! delivery went; only a malformed body is a 400.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::{rejection::JsonRejection, Json, Path, State},
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use prometheus::{Encoder, TextEncoder};

use crate::{
    alert::AlertBatch,
    credentials::CredentialStore,
    metrics,
    notifier::Notifier,
    provider::Provider,
    settings::Settings,
};

pub struct AppState {
    pub notifier: Notifier,
}

impl AppState {
    pub fn new(settings: Settings, credentials: CredentialStore) -> Result<Self> {
        Ok(Self {
            notifier: Notifier::new(settings, credentials)?,
        })
    }
}

async fn welcome() -> &'static str {
    "welcome to use prometheus alertmanager webhook server!"
}

async fn metrics_handler() -> Response {
    let mut buffer = vec![];
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("failed to encode metrics: {err}");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    ([(CONTENT_TYPE, encoder.format_type())], buffer).into_response()
}

async fn hook_status(
    State(state): State<Arc<AppState>>,
    Path((provider, env)): Path<(Provider, String)>,
) -> (StatusCode, String) {
    let env_name = env.to_uppercase();

    if state.notifier.is_configured(provider, &env) {
        (
            StatusCode::OK,
            format!(
                "Welcome to use Prometheus Alertmanager {} webhook server! This URL is for {env_name} environment.",
                provider.display_name()
            ),
        )
    } else {
        (
            StatusCode::BAD_REQUEST,
            format!(
                "Welcome to use Prometheus Alertmanager {} webhook server! This URL is for {env_name} environment. But {env_name} environment is not configured!",
                provider.display_name()
            ),
        )
    }
}

async fn receive_hook(
    State(state): State<Arc<AppState>>,
    Path((provider, env)): Path<(Provider, String)>,
    batch: Result<Json<AlertBatch>, JsonRejection>,
) -> (StatusCode, String) {
    match batch {
        Ok(Json(batch)) => {
            metrics::RECEIVED_BATCHES
                .with_label_values(&[provider.as_str(), &env])
                .inc();

            state.notifier.dispatch(provider, &env, &batch).await;

            (StatusCode::OK, "Success".to_string())
        }
        Err(err) => {
            tracing::debug!("failed to deserialize alert batch: {err}");
            (
                StatusCode::BAD_REQUEST,
                format!("Invalid JSON payload: {err}"),
            )
        }
    }
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(welcome))
        .route("/metrics", get(metrics_handler))
        .route("/:provider/hook/:env", get(hook_status).post(receive_hook))
        .with_state(state)
}

pub async fn run(state: Arc<AppState>) -> Result<()> {
    let addr = state.notifier.settings().to_socket_addr();
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("could not bind webhook receiver address")?;
    tracing::info!("listening on {addr}");

    axum::serve(listener, app)
        .await
        .context("webhook receiver crashed")?;

    Ok(())
}
