//! Wayfinder API Library
//!
//! This crate provides the core functionality for the Wayfinder office
//! floor-plan directory API
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod auth;
pub mod config;
pub mod db;
pub mod dto;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod middleware_helpers;
pub mod migrator;
pub mod openapi;
pub mod services;
pub mod tracing;
pub mod validation;

use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
    routing::{delete, get, post, put},
    Router,
};
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};
use tower_http::services::ServeDir;

use crate::auth::AuthRouterExt;

/// Headroom on top of the image payload for the other multipart fields
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub services: handlers::AppServices,
}

// Enhanced API routes function
pub fn api_v1_routes(cfg: &config::AppConfig) -> Router<AppState> {
    let upload_body_limit = DefaultBodyLimit::max(cfg.upload_max_bytes + MULTIPART_OVERHEAD_BYTES);

    // Maps routes, split by required capability
    let maps_read = Router::new()
        .route("/maps", get(handlers::maps::list_maps))
        .route("/maps/:id", get(handlers::maps::get_map))
        .with_auth();

    let maps_write = Router::new()
        .route("/maps", post(handlers::maps::create_map))
        .route(
            "/maps/:id",
            put(handlers::maps::update_map).delete(handlers::maps::delete_map),
        )
        .layer(upload_body_limit.clone())
        .with_admin();

    // Employees routes
    let employees_read = Router::new()
        .route("/employees", get(handlers::employees::list_employees))
        .route("/employees/:id", get(handlers::employees::get_employee))
        .with_auth();

    let employees_write = Router::new()
        .route("/employees", post(handlers::employees::create_employee))
        .route(
            "/employees/:id",
            put(handlers::employees::update_employee).delete(handlers::employees::delete_employee),
        )
        .layer(upload_body_limit)
        .with_admin();

    // Locations routes
    let locations_read = Router::new()
        .route("/locations", get(handlers::locations::list_locations))
        .route("/locations/:id", get(handlers::locations::get_location))
        .with_auth();

    let locations_write = Router::new()
        .route("/locations", post(handlers::locations::create_location))
        .route("/locations/:id", put(handlers::locations::update_location))
        .route(
            "/locations/:id",
            delete(handlers::locations::delete_location),
        )
        .with_admin();

    // Search routes
    let search = Router::new()
        .route("/search", get(handlers::search::search))
        .with_auth();

    Router::new()
        // Status endpoints (no credentials required)
        .route("/status", get(api_status))
        .route("/auth/status", get(auth::auth_status))
        // Maps API
        .merge(maps_read)
        .merge(maps_write)
        // Employees API
        .merge(employees_read)
        .merge(employees_write)
        // Locations API
        .merge(locations_read)
        .merge(locations_write)
        // Search API
        .merge(search)
}

/// Builds the full application router, shared by the server binary and the
/// integration tests. CORS and compression are applied by the binary.
pub fn build_router(state: AppState, auth_service: Arc<auth::AuthService>) -> Router {
    let upload_dir = state.config.upload_dir.clone();

    Router::new()
        .route("/", get(|| async { "wayfinder-api up" }))
        .route("/health", get(health_check))
        .nest("/api/v1", api_v1_routes(&state.config))
        .nest_service("/uploads", ServeDir::new(upload_dir))
        .merge(openapi::swagger_ui())
        .fallback(fallback_404)
        // HTTP tracing layer for consistent request/response telemetry
        .layer(crate::tracing::configure_http_tracing())
        // Inject AuthService into request extensions for auth middleware
        .layer(axum::middleware::from_fn_with_state(
            auth_service,
            inject_auth_service,
        ))
        // Ensure every request carries a request id for traceability
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id::request_id_middleware,
        ))
        .with_state(state)
}

async fn inject_auth_service(
    State(auth): State<Arc<auth::AuthService>>,
    mut request: Request,
    next: Next,
) -> Response {
    request.extensions_mut().insert(auth);
    next.run(request).await
}

async fn api_status() -> Result<Json<Value>, errors::ServiceError> {
    let version = env!("CARGO_PKG_VERSION");
    let status_data = json!({
        "status": "ok",
        "version": version,
        "service": "wayfinder-api",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "environment": std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
    });

    Ok(Json(status_data))
}

async fn health_check(State(state): State<AppState>) -> Result<Json<Value>, errors::ServiceError> {
    // Check database connectivity
    let db_status = match state.db.ping().await {
        Ok(_) => "ok",
        Err(_) => "unhealthy",
    };

    let health_data = json!({
        "status": db_status,
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "checks": {
            "database": db_status,
        },
    });

    Ok(Json(health_data))
}

async fn fallback_404() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "Route not found" })),
    )
        .into_response()
}
