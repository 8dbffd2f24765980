//! # drivehub-api
//!
//! HTTP API layer for DriveHub built on Axum.
//!
//! Handlers are thin: they extract the caller from the bearer token,
//! decode the request, and hand off to the services in
//! `drivehub-service`. Every handler returns `ApiResult<_>`; the
//! error is turned into a status code and JSON body in [`error`].

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::serve;
pub use router::build_router;
pub use state::AppState;
