//! PostgreSQL implementations of the record stores.

pub mod file;
pub mod folder;
pub mod profile;
pub mod user;

pub use file::FileRepository;
pub use folder::FolderRepository;
pub use profile::ProfileRepository;
pub use user::UserRepository;

use drivehub_core::error::{AppError, ErrorKind};

/// Map an insert error, turning unique violations into `Conflict`.
pub(crate) fn map_insert_error(e: sqlx::Error, conflict: &str, context: &str) -> AppError {
    match e {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            AppError::conflict(conflict)
        }
        _ => AppError::with_source(ErrorKind::Database, context, e),
    }
}
