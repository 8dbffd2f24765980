//! Process-local remote storage.
//!
//! Behaves like the Drive client (opaque IDs, cascading folder delete)
//! and additionally counts calls and can be told to fail, which makes
//! partial-failure paths observable in tests.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use drivehub_core::AppError;
use drivehub_core::result::AppResult;
use drivehub_core::traits::remote::{RemoteKind, RemoteObject, RemoteStorage};

/// Remote operations, for counting and failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteOp {
    /// `create_folder`
    CreateFolder,
    /// `upload_file`
    Upload,
    /// `download_file`
    Download,
    /// `delete`
    Delete,
    /// `list_children`
    List,
}

#[derive(Debug, Clone)]
struct StoredObject {
    name: String,
    kind: RemoteKind,
    parent: Option<String>,
    data: Bytes,
    created_time: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct State {
    objects: HashMap<String, StoredObject>,
    shares: HashMap<String, Vec<String>>,
    calls: HashMap<RemoteOp, usize>,
    failing_ops: HashSet<RemoteOp>,
    failing_names: HashSet<String>,
    next_id: u64,
}

impl State {
    fn record(&mut self, op: RemoteOp) -> AppResult<()> {
        *self.calls.entry(op).or_default() += 1;
        if self.failing_ops.contains(&op) {
            return Err(AppError::remote_call(format!("Injected failure for {op:?}")));
        }
        Ok(())
    }

    fn check_name(&self, name: &str) -> AppResult<()> {
        if self.failing_names.contains(name) {
            return Err(AppError::remote_call(format!("Injected failure for '{name}'")));
        }
        Ok(())
    }

    fn require_folder(&self, id: &str) -> AppResult<()> {
        match self.objects.get(id) {
            Some(obj) if obj.kind == RemoteKind::Folder => Ok(()),
            Some(_) => Err(AppError::remote_call(format!("{id} is not a folder"))),
            None => Err(AppError::remote_call(format!("File not found: {id}"))),
        }
    }

    fn insert(&mut self, obj: StoredObject) -> String {
        self.next_id += 1;
        let id = format!("mem-{:06}", self.next_id);
        self.objects.insert(id.clone(), obj);
        id
    }

    fn share(&mut self, id: &str, email: Option<&str>) {
        if let Some(email) = email {
            self.shares
                .entry(id.to_string())
                .or_default()
                .push(email.to_string());
        }
    }

    fn remove_tree(&mut self, id: &str) {
        let children: Vec<String> = self
            .objects
            .iter()
            .filter(|(_, o)| o.parent.as_deref() == Some(id))
            .map(|(k, _)| k.clone())
            .collect();
        for child in children {
            self.remove_tree(&child);
        }
        self.objects.remove(id);
        self.shares.remove(id);
    }
}

/// In-memory [`RemoteStorage`]. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MemoryRemote {
    state: Arc<Mutex<State>>,
}

impl MemoryRemote {
    /// Create an empty remote.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call of `op` fail until cleared.
    pub async fn fail_op(&self, op: RemoteOp) {
        self.state.lock().await.failing_ops.insert(op);
    }

    /// Make creates and uploads of objects named `name` fail.
    pub async fn fail_name(&self, name: &str) {
        self.state.lock().await.failing_names.insert(name.to_string());
    }

    /// Remove all injected failures.
    pub async fn clear_failures(&self) {
        let mut state = self.state.lock().await;
        state.failing_ops.clear();
        state.failing_names.clear();
    }

    /// How many times `op` was attempted.
    pub async fn calls(&self, op: RemoteOp) -> usize {
        self.state.lock().await.calls.get(&op).copied().unwrap_or(0)
    }

    /// Total number of attempted calls of any kind.
    pub async fn total_calls(&self) -> usize {
        self.state.lock().await.calls.values().sum()
    }

    /// Whether an object exists.
    pub async fn contains(&self, id: &str) -> bool {
        self.state.lock().await.objects.contains_key(id)
    }

    /// Number of stored objects.
    pub async fn object_count(&self) -> usize {
        self.state.lock().await.objects.len()
    }

    /// Parent of an object, if any.
    pub async fn parent_of(&self, id: &str) -> Option<String> {
        self.state
            .lock()
            .await
            .objects
            .get(id)
            .and_then(|o| o.parent.clone())
    }

    /// Addresses an object was shared with.
    pub async fn shared_with(&self, id: &str) -> Vec<String> {
        self.state
            .lock()
            .await
            .shares
            .get(id)
            .cloned()
            .unwrap_or_default()
    }

    /// Delete an object without counting a call, as if removed out of band.
    pub async fn remove_out_of_band(&self, id: &str) {
        self.state.lock().await.remove_tree(id);
    }

    /// Add a file without counting a call, as if created out of band.
    pub async fn insert_out_of_band(&self, name: &str, parent_id: &str, data: Bytes) -> String {
        let mut state = self.state.lock().await;
        state.insert(StoredObject {
            name: name.to_string(),
            kind: RemoteKind::File,
            parent: Some(parent_id.to_string()),
            data,
            created_time: Utc::now(),
        })
    }
}

#[async_trait]
impl RemoteStorage for MemoryRemote {
    fn provider_type(&self) -> &str {
        "memory"
    }

    async fn create_folder(
        &self,
        name: &str,
        parent_id: Option<&str>,
        share_email: Option<&str>,
    ) -> AppResult<String> {
        let mut state = self.state.lock().await;
        state.record(RemoteOp::CreateFolder)?;
        state.check_name(name)?;
        if let Some(parent) = parent_id {
            state.require_folder(parent)?;
        }
        let id = state.insert(StoredObject {
            name: name.to_string(),
            kind: RemoteKind::Folder,
            parent: parent_id.map(str::to_string),
            data: Bytes::new(),
            created_time: Utc::now(),
        });
        state.share(&id, share_email);
        Ok(id)
    }

    async fn upload_file(
        &self,
        data: Bytes,
        name: &str,
        _content_type: &str,
        parent_id: &str,
        share_email: Option<&str>,
    ) -> AppResult<String> {
        let mut state = self.state.lock().await;
        state.record(RemoteOp::Upload)?;
        state.check_name(name)?;
        state.require_folder(parent_id)?;
        let id = state.insert(StoredObject {
            name: name.to_string(),
            kind: RemoteKind::File,
            parent: Some(parent_id.to_string()),
            data,
            created_time: Utc::now(),
        });
        state.share(&id, share_email);
        Ok(id)
    }

    async fn download_file(&self, id: &str) -> AppResult<Bytes> {
        let mut state = self.state.lock().await;
        state.record(RemoteOp::Download)?;
        match state.objects.get(id) {
            Some(obj) if obj.kind == RemoteKind::File => Ok(obj.data.clone()),
            Some(_) => Err(AppError::remote_call(format!("{id} is a folder"))),
            None => Err(AppError::remote_call(format!("File not found: {id}"))),
        }
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        let mut state = self.state.lock().await;
        state.record(RemoteOp::Delete)?;
        if !state.objects.contains_key(id) {
            return Err(AppError::remote_call(format!("File not found: {id}")));
        }
        state.remove_tree(id);
        Ok(())
    }

    async fn list_children(&self, parent_id: &str) -> AppResult<Vec<RemoteObject>> {
        let mut state = self.state.lock().await;
        state.record(RemoteOp::List)?;
        state.require_folder(parent_id)?;
        let mut out: Vec<RemoteObject> = state
            .objects
            .iter()
            .filter(|(_, o)| o.parent.as_deref() == Some(parent_id))
            .map(|(id, o)| RemoteObject {
                id: id.clone(),
                name: o.name.clone(),
                kind: o.kind,
                size: (o.kind == RemoteKind::File).then_some(o.data.len() as u64),
                created_time: Some(o.created_time),
            })
            .collect();
        out.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(out)
    }
}
