//! Record-store traits consumed by the service layer.
//!
//! Every folder and file lookup takes the owner's ID, so a record that
//! exists but belongs to someone else is indistinguishable from one that
//! does not exist.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use drivehub_core::result::AppResult;
use drivehub_entity::file::{CreateFileRecord, FileRecord};
use drivehub_entity::folder::{CreateFolderRecord, FolderRecord};
use drivehub_entity::profile::{Profile, UserSummary};
use drivehub_entity::user::{CreateUser, User};

use crate::memory::MemoryStore;
use crate::repositories::{FileRepository, FolderRepository, ProfileRepository, UserRepository};

/// User accounts.
#[async_trait]
pub trait UserStore: Send + Sync + std::fmt::Debug + 'static {
    /// Find a user by primary key.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Find a user by username (case-insensitive).
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;

    /// Insert a user. Duplicate username or email yields `Conflict`.
    async fn create(&self, data: &CreateUser) -> AppResult<User>;
}

/// Per-user profiles.
#[async_trait]
pub trait ProfileStore: Send + Sync + std::fmt::Debug + 'static {
    /// Insert a pending profile for an existing user.
    async fn create(&self, user_id: Uuid) -> AppResult<Profile>;

    /// Find the profile of a user.
    async fn find_by_user(&self, user_id: Uuid) -> AppResult<Option<Profile>>;

    /// Set the approval flag.
    async fn set_approved(&self, user_id: Uuid, approved: bool) -> AppResult<Profile>;

    /// Record the remote root folder ID.
    async fn set_remote_root(&self, user_id: Uuid, remote_id: &str) -> AppResult<Profile>;

    /// Set or clear the share email.
    async fn set_share_email(&self, user_id: Uuid, email: Option<&str>) -> AppResult<Profile>;

    /// All users with their approval state, newest first.
    async fn list_summaries(&self) -> AppResult<Vec<UserSummary>>;
}

/// Folder records.
#[async_trait]
pub trait FolderStore: Send + Sync + std::fmt::Debug + 'static {
    /// Find a folder owned by `owner_id`.
    async fn find_owned(&self, owner_id: Uuid, id: i64) -> AppResult<Option<FolderRecord>>;

    /// All folders of an owner.
    async fn list_by_owner(&self, owner_id: Uuid) -> AppResult<Vec<FolderRecord>>;

    /// Direct children of `parent_id` (None = top level), ordered by name.
    async fn list_children(
        &self,
        owner_id: Uuid,
        parent_id: Option<i64>,
    ) -> AppResult<Vec<FolderRecord>>;

    /// Insert a folder.
    async fn create(&self, data: &CreateFolderRecord) -> AppResult<FolderRecord>;

    /// Delete a folder together with every descendant folder and file.
    async fn delete(&self, owner_id: Uuid, id: i64) -> AppResult<bool>;
}

/// File records.
#[async_trait]
pub trait FileStore: Send + Sync + std::fmt::Debug + 'static {
    /// Find a file owned by `owner_id`.
    async fn find_owned(&self, owner_id: Uuid, id: i64) -> AppResult<Option<FileRecord>>;

    /// Files directly in `folder_id` (None = root), newest upload first.
    async fn list_in_folder(
        &self,
        owner_id: Uuid,
        folder_id: Option<i64>,
    ) -> AppResult<Vec<FileRecord>>;

    /// Insert a file.
    async fn create(&self, data: &CreateFileRecord) -> AppResult<FileRecord>;

    /// Delete a file.
    async fn delete(&self, owner_id: Uuid, id: i64) -> AppResult<bool>;
}

/// The four stores, as shared trait objects.
#[derive(Debug, Clone)]
pub struct Stores {
    /// User accounts.
    pub users: Arc<dyn UserStore>,
    /// Profiles.
    pub profiles: Arc<dyn ProfileStore>,
    /// Folder records.
    pub folders: Arc<dyn FolderStore>,
    /// File records.
    pub files: Arc<dyn FileStore>,
}

impl Stores {
    /// Stores backed by PostgreSQL.
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(UserRepository::new(pool.clone())),
            profiles: Arc::new(ProfileRepository::new(pool.clone())),
            folders: Arc::new(FolderRepository::new(pool.clone())),
            files: Arc::new(FileRepository::new(pool)),
        }
    }

    /// Stores backed by one shared in-memory store.
    pub fn memory(store: MemoryStore) -> Self {
        let store = Arc::new(store);
        Self {
            users: store.clone(),
            profiles: store.clone(),
            folders: store.clone(),
            files: store,
        }
    }
}
