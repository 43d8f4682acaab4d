//! HTTP server.
//!
//! Exposes [`StringService`] as a JSON API.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/strings` | Analyze and store `{ "value": "..." }` |
//! | `GET`  | `/strings` | List strings; query parameters are filters |
//! | `GET`  | `/strings/filter-by-natural-language?query=...` | List strings matching a natural-language query |
//! | `GET`  | `/strings/{value}` | Fetch one string by exact value |
//! | `DELETE` | `/strings/{value}` | Delete one string by exact value |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "not_found", "message": "string does not exist in the system" } }
//! ```
//!
//! | Code | Status | Cause |
//! |------|--------|-------|
//! | `bad_request` | 400 | invalid value or filter, unparseable natural-language query |
//! | `not_found` | 404 | no string with that value |
//! | `conflict` | 409 | value already stored (the stored record is returned in `data`) |
//! | `unprocessable` | 422 | filters that contradict each other |
//! | `internal` | 500 | storage failure |
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use crate::config::Config;
use crate::db;
use crate::migrate;
use crate::service::{
    ListResponse, NaturalListResponse, ServiceError, StringResponse, StringService,
};
use crate::sqlite_store::SqliteStore;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
struct AppState {
    service: StringService,
}

/// Starts the HTTP server backed by the configured SQLite database.
///
/// Applies migrations, binds to `[server].bind`, and serves until Ctrl-C.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let pool = db::connect(config).await?;
    migrate::migrate_pool(&pool).await?;
    let service = StringService::new(Arc::new(SqliteStore::new(pool.clone())));

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    info!(addr = %listener.local_addr()?, "strstat server listening");

    axum::serve(listener, router(service))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    info!("server stopped");
    Ok(())
}

/// Build the router around an existing service.
pub fn router(service: StringService) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/strings", get(handle_list).post(handle_create))
        .route(
            "/strings/filter-by-natural-language",
            get(handle_natural_language),
        )
        .route(
            "/strings/{value}",
            get(handle_get).delete(handle_delete),
        )
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(AppState { service })
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // No signal handler available; run until the process is killed.
        std::future::pending::<()>().await;
    }
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<StringResponse>,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: &'static str,
    message: String,
}

struct AppError {
    status: StatusCode,
    code: &'static str,
    message: String,
    data: Option<StringResponse>,
}

impl AppError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: "bad_request",
            message: message.into(),
            data: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
            data: self.data,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        let message = err.to_string();
        match err {
            ServiceError::Validation(_) | ServiceError::Unparseable(_) => {
                AppError::bad_request(message)
            }
            ServiceError::NotFound => AppError {
                status: StatusCode::NOT_FOUND,
                code: "not_found",
                message,
                data: None,
            },
            ServiceError::Conflict(existing) => AppError {
                status: StatusCode::CONFLICT,
                code: "conflict",
                message,
                data: Some(*existing),
            },
            ServiceError::ConflictingFilters(_) => AppError {
                status: StatusCode::UNPROCESSABLE_ENTITY,
                code: "unprocessable",
                message,
                data: None,
            },
            ServiceError::Internal(e) => {
                error!(error = %e, "request failed");
                AppError {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    code: "internal",
                    message: "internal server error".to_string(),
                    data: None,
                }
            }
        }
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

// ============ /strings ============

async fn handle_create(
    State(state): State<AppState>,
    body: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<(StatusCode, Json<StringResponse>), AppError> {
    let Json(body) = body.map_err(|e| AppError::bad_request(e.body_text()))?;
    let created = state.service.create_from_json(&body).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn handle_list(
    State(state): State<AppState>,
    Query(params): Query<BTreeMap<String, String>>,
) -> Result<Json<ListResponse>, AppError> {
    Ok(Json(state.service.list(&params).await?))
}

#[derive(Deserialize)]
struct NaturalLanguageParams {
    query: Option<String>,
}

async fn handle_natural_language(
    State(state): State<AppState>,
    Query(params): Query<NaturalLanguageParams>,
) -> Result<Json<NaturalListResponse>, AppError> {
    let query = params
        .query
        .ok_or_else(|| AppError::bad_request("missing \"query\" parameter"))?;
    Ok(Json(state.service.list_natural(&query).await?))
}

async fn handle_get(
    State(state): State<AppState>,
    Path(value): Path<String>,
) -> Result<Json<StringResponse>, AppError> {
    Ok(Json(state.service.get(&value).await?))
}

async fn handle_delete(
    State(state): State<AppState>,
    Path(value): Path<String>,
) -> Result<StatusCode, AppError> {
    state.service.delete(&value).await?;
    Ok(StatusCode::NO_CONTENT)
}
