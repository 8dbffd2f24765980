//! # drivehub-entity
//!
//! Domain entity models for DriveHub. Every struct in this crate is a
//! database row or a domain value object. Row types derive
//! `sqlx::FromRow` in addition to the serde traits.

pub mod file;
pub mod folder;
pub mod profile;
pub mod user;
