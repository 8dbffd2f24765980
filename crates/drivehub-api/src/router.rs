//! Route definitions for the DriveHub HTTP API.
//!
//! All routes are organized by domain and mounted under `/api`.
//! The router receives `AppState` and passes it to all handlers via Axum's `State` extractor.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{delete, get, post},
};
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.server.body_limit_bytes;

    let api_routes = Router::new()
        .merge(health_routes())
        .merge(auth_routes())
        .merge(folder_routes())
        .merge(file_routes())
        .merge(settings_routes())
        .merge(admin_routes());

    let cors = middleware::cors::build_cors_layer(&state.config.server);

    Router::new()
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}

/// Registration and login
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
}

/// Dashboard, folder CRUD, and reconciliation
fn folder_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(handlers::folder::dashboard))
        .route("/verify", get(handlers::folder::verify_root))
        .route("/folders", post(handlers::folder::create_folder))
        .route(
            "/folders/{id}",
            get(handlers::folder::folder_dashboard).delete(handlers::folder::delete_folder),
        )
        .route("/folders/{id}/verify", get(handlers::folder::verify_folder))
}

fn file_routes() -> Router<AppState> {
    Router::new()
        .route("/upload", post(handlers::file::upload))
        .route("/files/{id}", delete(handlers::file::delete_file))
        .route("/files/{id}/download", get(handlers::file::download_file))
}

fn settings_routes() -> Router<AppState> {
    Router::new().route(
        "/settings",
        get(handlers::settings::get_settings).put(handlers::settings::update_settings),
    )
}

/// Admin approval endpoints
fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/dashboard", get(handlers::admin::users::dashboard))
        .route("/admin/users/approve", post(handlers::admin::users::approve_users))
        .route("/admin/users/revoke", post(handlers::admin::users::revoke_users))
        .route(
            "/admin/users/{id}/approve",
            post(handlers::admin::users::approve_user),
        )
        .route(
            "/admin/users/{id}/revoke",
            post(handlers::admin::users::revoke_user),
        )
}
