//! # drivehub-auth
//!
//! Credential handling for DriveHub.
//!
//! - `password`: Argon2id hashing and the registration password policy
//! - `jwt`: HS256 access tokens carrying the user ID and role

pub mod jwt;
pub mod password;

pub use jwt::{Claims, JwtDecoder, JwtEncoder};
pub use password::{PasswordHasher, PasswordPolicy};
