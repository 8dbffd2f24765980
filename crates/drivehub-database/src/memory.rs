//! In-memory record store.
//!
//! Implements all four store traits over one shared state so that
//! cross-table behaviour (profile joins, cascading folder deletes)
//! matches the PostgreSQL schema. Used by tests and local demos.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use drivehub_core::AppError;
use drivehub_core::result::AppResult;
use drivehub_entity::file::{CreateFileRecord, FileRecord};
use drivehub_entity::folder::{CreateFolderRecord, FolderRecord};
use drivehub_entity::profile::{Profile, UserSummary};
use drivehub_entity::user::{CreateUser, User};

use crate::store::{FileStore, FolderStore, ProfileStore, UserStore};

#[derive(Debug, Default)]
struct State {
    users: BTreeMap<Uuid, User>,
    profiles: BTreeMap<Uuid, Profile>,
    folders: BTreeMap<i64, FolderRecord>,
    files: BTreeMap<i64, FileRecord>,
    next_folder_id: i64,
    next_file_id: i64,
}

impl State {
    fn profile_mut(&mut self, user_id: Uuid) -> AppResult<&mut Profile> {
        self.profiles
            .get_mut(&user_id)
            .ok_or_else(|| AppError::not_found(format!("Profile for user {user_id} not found")))
    }
}

/// Shared in-memory store. Clones see the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<State>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of folder records across all users.
    pub async fn folder_count(&self) -> usize {
        self.state.read().await.folders.len()
    }

    /// Number of file records across all users.
    pub async fn file_count(&self) -> usize {
        self.state.read().await.files.len()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state
            .users
            .values()
            .find(|u| u.username.eq_ignore_ascii_case(username))
            .cloned())
    }

    async fn create(&self, data: &CreateUser) -> AppResult<User> {
        let mut state = self.state.write().await;
        let taken = state.users.values().any(|u| {
            u.username.eq_ignore_ascii_case(&data.username)
                || u.email.eq_ignore_ascii_case(&data.email)
        });
        if taken {
            return Err(AppError::conflict(
                "A user with that username or email already exists",
            ));
        }
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username: data.username.clone(),
            email: data.email.clone(),
            password_hash: data.password_hash.clone(),
            role: data.role,
            created_at: now,
            updated_at: now,
        };
        state.users.insert(user.id, user.clone());
        Ok(user)
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn create(&self, user_id: Uuid) -> AppResult<Profile> {
        let mut state = self.state.write().await;
        if !state.users.contains_key(&user_id) {
            return Err(AppError::not_found(format!("User {user_id} not found")));
        }
        if state.profiles.contains_key(&user_id) {
            return Err(AppError::conflict("Profile already exists"));
        }
        let profile = Profile::pending(user_id);
        state.profiles.insert(user_id, profile.clone());
        Ok(profile)
    }

    async fn find_by_user(&self, user_id: Uuid) -> AppResult<Option<Profile>> {
        Ok(self.state.read().await.profiles.get(&user_id).cloned())
    }

    async fn set_approved(&self, user_id: Uuid, approved: bool) -> AppResult<Profile> {
        let mut state = self.state.write().await;
        let profile = state.profile_mut(user_id)?;
        profile.is_approved = approved;
        profile.updated_at = Utc::now();
        Ok(profile.clone())
    }

    async fn set_remote_root(&self, user_id: Uuid, remote_id: &str) -> AppResult<Profile> {
        let mut state = self.state.write().await;
        let profile = state.profile_mut(user_id)?;
        profile.remote_root_id = Some(remote_id.to_string());
        profile.updated_at = Utc::now();
        Ok(profile.clone())
    }

    async fn set_share_email(&self, user_id: Uuid, email: Option<&str>) -> AppResult<Profile> {
        let mut state = self.state.write().await;
        let profile = state.profile_mut(user_id)?;
        profile.share_email = email.map(str::to_string);
        profile.updated_at = Utc::now();
        Ok(profile.clone())
    }

    async fn list_summaries(&self) -> AppResult<Vec<UserSummary>> {
        let state = self.state.read().await;
        let mut out: Vec<UserSummary> = state
            .users
            .values()
            .filter_map(|u| {
                state.profiles.get(&u.id).map(|p| UserSummary {
                    user_id: u.id,
                    username: u.username.clone(),
                    email: u.email.clone(),
                    is_approved: p.is_approved,
                    remote_root_id: p.remote_root_id.clone(),
                    created_at: u.created_at,
                })
            })
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(out)
    }
}

#[async_trait]
impl FolderStore for MemoryStore {
    async fn find_owned(&self, owner_id: Uuid, id: i64) -> AppResult<Option<FolderRecord>> {
        let state = self.state.read().await;
        Ok(state
            .folders
            .get(&id)
            .filter(|f| f.owner_id == owner_id)
            .cloned())
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> AppResult<Vec<FolderRecord>> {
        let state = self.state.read().await;
        Ok(state
            .folders
            .values()
            .filter(|f| f.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn list_children(
        &self,
        owner_id: Uuid,
        parent_id: Option<i64>,
    ) -> AppResult<Vec<FolderRecord>> {
        let state = self.state.read().await;
        let mut out: Vec<FolderRecord> = state
            .folders
            .values()
            .filter(|f| f.owner_id == owner_id && f.parent_id == parent_id)
            .cloned()
            .collect();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(out)
    }

    async fn create(&self, data: &CreateFolderRecord) -> AppResult<FolderRecord> {
        let mut state = self.state.write().await;
        if let Some(parent_id) = data.parent_id {
            match state.folders.get(&parent_id) {
                Some(parent) if parent.owner_id == data.owner_id => {}
                _ => {
                    return Err(AppError::database(format!(
                        "Parent folder {parent_id} does not exist"
                    )));
                }
            }
        }
        state.next_folder_id += 1;
        let folder = FolderRecord {
            id: state.next_folder_id,
            owner_id: data.owner_id,
            name: data.name.clone(),
            remote_id: data.remote_id.clone(),
            parent_id: data.parent_id,
            created_at: Utc::now(),
        };
        state.folders.insert(folder.id, folder.clone());
        Ok(folder)
    }

    async fn delete(&self, owner_id: Uuid, id: i64) -> AppResult<bool> {
        let mut state = self.state.write().await;
        match state.folders.get(&id) {
            Some(f) if f.owner_id == owner_id => {}
            _ => return Ok(false),
        }

        let mut doomed = vec![id];
        let mut cursor = 0;
        while cursor < doomed.len() {
            let parent = doomed[cursor];
            doomed.extend(
                state
                    .folders
                    .values()
                    .filter(|f| f.parent_id == Some(parent))
                    .map(|f| f.id),
            );
            cursor += 1;
        }

        for folder_id in &doomed {
            state.folders.remove(folder_id);
        }
        state
            .files
            .retain(|_, file| !file.folder_id.is_some_and(|fid| doomed.contains(&fid)));
        Ok(true)
    }
}

#[async_trait]
impl FileStore for MemoryStore {
    async fn find_owned(&self, owner_id: Uuid, id: i64) -> AppResult<Option<FileRecord>> {
        let state = self.state.read().await;
        Ok(state
            .files
            .get(&id)
            .filter(|f| f.owner_id == owner_id)
            .cloned())
    }

    async fn list_in_folder(
        &self,
        owner_id: Uuid,
        folder_id: Option<i64>,
    ) -> AppResult<Vec<FileRecord>> {
        let state = self.state.read().await;
        let mut out: Vec<FileRecord> = state
            .files
            .values()
            .filter(|f| f.owner_id == owner_id && f.folder_id == folder_id)
            .cloned()
            .collect();
        out.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at).then(b.id.cmp(&a.id)));
        Ok(out)
    }

    async fn create(&self, data: &CreateFileRecord) -> AppResult<FileRecord> {
        let mut state = self.state.write().await;
        if let Some(folder_id) = data.folder_id
            && !state.folders.contains_key(&folder_id)
        {
            return Err(AppError::database(format!(
                "Folder {folder_id} does not exist"
            )));
        }
        state.next_file_id += 1;
        let file = FileRecord {
            id: state.next_file_id,
            owner_id: data.owner_id,
            name: data.name.clone(),
            size_bytes: data.size_bytes,
            content_type: data.content_type.clone(),
            remote_id: data.remote_id.clone(),
            description: data.description.clone(),
            folder_id: data.folder_id,
            uploaded_at: Utc::now(),
        };
        state.files.insert(file.id, file.clone());
        Ok(file)
    }

    async fn delete(&self, owner_id: Uuid, id: i64) -> AppResult<bool> {
        let mut state = self.state.write().await;
        match state.files.get(&id) {
            Some(f) if f.owner_id == owner_id => {
                state.files.remove(&id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drivehub_entity::user::UserRole;

    async fn user(store: &MemoryStore, name: &str) -> User {
        UserStore::create(
            store,
            &CreateUser {
                username: name.to_string(),
                email: format!("{name}@example.com"),
                password_hash: "hash".to_string(),
                role: UserRole::User,
            },
        )
        .await
        .unwrap()
    }

    fn folder(owner: Uuid, name: &str, parent: Option<i64>) -> CreateFolderRecord {
        CreateFolderRecord {
            owner_id: owner,
            name: name.to_string(),
            remote_id: format!("r-{name}"),
            parent_id: parent,
        }
    }

    fn file(owner: Uuid, name: &str, folder: Option<i64>) -> CreateFileRecord {
        CreateFileRecord {
            owner_id: owner,
            name: name.to_string(),
            size_bytes: 3,
            content_type: None,
            remote_id: format!("r-{name}"),
            description: None,
            folder_id: folder,
        }
    }

    #[tokio::test]
    async fn test_duplicate_username_is_conflict() {
        let store = MemoryStore::new();
        user(&store, "alice").await;
        let err = UserStore::create(
            &store,
            &CreateUser {
                username: "ALICE".to_string(),
                email: "other@example.com".to_string(),
                password_hash: "hash".to_string(),
                role: UserRole::User,
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind, drivehub_core::error::ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_folder_delete_cascades() {
        let store = MemoryStore::new();
        let owner = user(&store, "alice").await.id;
        let top = FolderStore::create(&store, &folder(owner, "top", None)).await.unwrap();
        let mid = FolderStore::create(&store, &folder(owner, "mid", Some(top.id)))
            .await
            .unwrap();
        let other = FolderStore::create(&store, &folder(owner, "other", None))
            .await
            .unwrap();
        FileStore::create(&store, &file(owner, "a.txt", Some(mid.id)))
            .await
            .unwrap();
        FileStore::create(&store, &file(owner, "b.txt", Some(other.id)))
            .await
            .unwrap();

        assert!(FolderStore::delete(&store, owner, top.id).await.unwrap());

        assert_eq!(store.folder_count().await, 1);
        assert_eq!(store.file_count().await, 1);
    }

    #[tokio::test]
    async fn test_file_into_missing_folder_is_rejected() {
        let store = MemoryStore::new();
        let owner = user(&store, "alice").await.id;
        assert!(
            FileStore::create(&store, &file(owner, "a.txt", Some(99)))
                .await
                .is_err()
        );
        assert!(
            FileStore::create(&store, &file(owner, "b.txt", None))
                .await
                .is_ok()
        );
        assert_eq!(store.file_count().await, 1);
    }

    #[tokio::test]
    async fn test_find_owned_hides_other_users_records() {
        let store = MemoryStore::new();
        let alice = user(&store, "alice").await.id;
        let bob = user(&store, "bob").await.id;
        let f = FolderStore::create(&store, &folder(alice, "x", None)).await.unwrap();
        assert!(FolderStore::find_owned(&store, bob, f.id).await.unwrap().is_none());
        assert!(!FolderStore::delete(&store, bob, f.id).await.unwrap());
        assert_eq!(store.folder_count().await, 1);
    }

    #[tokio::test]
    async fn test_children_sorted_by_name() {
        let store = MemoryStore::new();
        let owner = user(&store, "alice").await.id;
        FolderStore::create(&store, &folder(owner, "b", None)).await.unwrap();
        FolderStore::create(&store, &folder(owner, "a", None)).await.unwrap();
        let names: Vec<String> = FolderStore::list_children(&store, owner, None)
            .await
            .unwrap()
            .into_iter()
            .map(|f| f.name)
            .collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_summaries_join_profiles() {
        let store = MemoryStore::new();
        let alice = user(&store, "alice").await.id;
        ProfileStore::create(&store, alice).await.unwrap();
        ProfileStore::set_approved(&store, alice, true).await.unwrap();
        let summaries = store.list_summaries().await.unwrap();
        assert_eq!(summaries.len(), 1);
        assert!(summaries[0].is_approved);
    }
}
