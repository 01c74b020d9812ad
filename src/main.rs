use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use clap::Parser;
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

mod config;
mod extract;
mod models;

use config::Config;
use extract::{FetchError, FetchOptions};
use models::{ErrorResponse, FetchParams};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = Config::parse();
    let app = app(config.fetch_options());

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}

fn app(options: FetchOptions) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/fetch/", post(fetch_endpoint))
        .route("/fetch", post(fetch_endpoint))
        // Any origin, credentials included; the origin is mirrored back.
        .layer(CorsLayer::very_permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(options)
}

async fn health() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

async fn fetch_endpoint(
    State(options): State<FetchOptions>,
    Query(params): Query<FetchParams>,
) -> Response {
    match extract::fetch_page(&params.url, options).await {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(e) => {
            let status = match &e {
                FetchError::Request { .. } => StatusCode::BAD_REQUEST,
                FetchError::Status { status, .. } => {
                    StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
                }
            };
            let body = ErrorResponse {
                detail: e.to_string(),
            };
            (status, Json(body)).into_response()
        }
    }
}
