//! HTTP integration tests over in-memory backends.

mod admin;
mod auth;
mod files;
mod helpers;
