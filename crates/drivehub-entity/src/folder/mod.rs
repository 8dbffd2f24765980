//! Folder domain entities.

pub mod model;
pub mod tree;

pub use model::{CreateFolderRecord, FolderRecord};
pub use tree::{Breadcrumb, FolderTree};
