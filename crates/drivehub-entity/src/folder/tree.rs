//! Arena view over one user's folders.
//!
//! Folders are addressed by their stable numeric IDs; each node only
//! stores its parent's ID. Paths and ancestor chains are computed by
//! walking parent links, and every walk is bounded by the number of
//! nodes so a corrupt chain is reported instead of looping.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use drivehub_core::AppError;
use drivehub_core::result::AppResult;

use super::model::FolderRecord;

/// One step of a breadcrumb trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breadcrumb {
    /// Folder ID.
    pub id: i64,
    /// Folder name.
    pub name: String,
}

/// All folders of a single owner, indexed by ID.
#[derive(Debug, Clone)]
pub struct FolderTree {
    owner_id: Uuid,
    nodes: HashMap<i64, FolderRecord>,
}

impl FolderTree {
    /// Build the arena from `owner_id`'s folders.
    ///
    /// Records belonging to another owner are rejected.
    pub fn build(owner_id: Uuid, folders: Vec<FolderRecord>) -> AppResult<Self> {
        let mut nodes = HashMap::with_capacity(folders.len());
        for folder in folders {
            if folder.owner_id != owner_id {
                return Err(AppError::internal(format!(
                    "Folder {} does not belong to user {owner_id}",
                    folder.id
                )));
            }
            nodes.insert(folder.id, folder);
        }
        Ok(Self { owner_id, nodes })
    }

    /// The owner every node belongs to.
    pub fn owner_id(&self) -> Uuid {
        self.owner_id
    }

    /// Number of folders in the arena.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the arena holds no folders.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Look up a folder by ID.
    pub fn get(&self, id: i64) -> Option<&FolderRecord> {
        self.nodes.get(&id)
    }

    /// Ancestors of `id` from the top level down to `id` itself.
    pub fn ancestors(&self, id: i64) -> AppResult<Vec<&FolderRecord>> {
        let mut chain = Vec::new();
        let mut current = Some(id);
        while let Some(cursor) = current {
            if chain.len() > self.nodes.len() {
                return Err(AppError::internal(format!(
                    "Folder {id} has a cyclic parent chain"
                )));
            }
            let node = self
                .nodes
                .get(&cursor)
                .ok_or_else(|| AppError::not_found(format!("Folder {cursor} not found")))?;
            chain.push(node);
            current = node.parent_id;
        }
        chain.reverse();
        Ok(chain)
    }

    /// Full path of a folder: ancestor names joined with `/`.
    pub fn path(&self, id: i64) -> AppResult<String> {
        let names: Vec<&str> = self
            .ancestors(id)?
            .into_iter()
            .map(|f| f.name.as_str())
            .collect();
        Ok(names.join("/"))
    }

    /// Breadcrumb trail for a folder.
    pub fn breadcrumbs(&self, id: i64) -> AppResult<Vec<Breadcrumb>> {
        Ok(self
            .ancestors(id)?
            .into_iter()
            .map(|f| Breadcrumb {
                id: f.id,
                name: f.name.clone(),
            })
            .collect())
    }

    /// Validate that `parent_id` may become the parent of `child`.
    ///
    /// `child` is `None` for a folder that does not exist yet. The parent
    /// must be in this arena and its chain must reach the top level
    /// without passing through `child`.
    pub fn validate_parent(&self, child: Option<i64>, parent_id: i64) -> AppResult<()> {
        if child == Some(parent_id) {
            return Err(AppError::validation("A folder cannot be its own parent"));
        }
        let chain = self.ancestors(parent_id)?;
        if let Some(child) = child
            && chain.iter().any(|f| f.id == child)
        {
            return Err(AppError::validation(format!(
                "Moving folder {child} under {parent_id} would create a cycle"
            )));
        }
        Ok(())
    }

    /// IDs of every folder below `id`, depth-first.
    pub fn descendants(&self, id: i64) -> Vec<i64> {
        let mut children: HashMap<i64, Vec<i64>> = HashMap::new();
        for node in self.nodes.values() {
            if let Some(parent) = node.parent_id {
                children.entry(parent).or_default().push(node.id);
            }
        }

        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(cursor) = stack.pop() {
            if let Some(kids) = children.get(&cursor) {
                for kid in kids {
                    if *kid != id && !out.contains(kid) {
                        out.push(*kid);
                        stack.push(*kid);
                    }
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn folder(id: i64, owner: Uuid, name: &str, parent: Option<i64>) -> FolderRecord {
        FolderRecord {
            id,
            owner_id: owner,
            name: name.to_string(),
            remote_id: format!("remote-{id}"),
            parent_id: parent,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_path_of_three_level_chain() {
        let owner = Uuid::new_v4();
        let tree = FolderTree::build(
            owner,
            vec![
                folder(1, owner, "2024", None),
                folder(2, owner, "Reports", Some(1)),
                folder(3, owner, "Q1", Some(2)),
            ],
        )
        .unwrap();

        assert_eq!(tree.path(1).unwrap(), "2024");
        assert_eq!(tree.path(2).unwrap(), "2024/Reports");
        assert_eq!(tree.path(3).unwrap(), "2024/Reports/Q1");
        // Recursive definition: path(child) == path(parent) + "/" + name.
        assert_eq!(
            tree.path(3).unwrap(),
            format!("{}/{}", tree.path(2).unwrap(), "Q1")
        );
    }

    #[test]
    fn test_breadcrumbs_root_to_leaf() {
        let owner = Uuid::new_v4();
        let tree = FolderTree::build(
            owner,
            vec![folder(1, owner, "a", None), folder(2, owner, "b", Some(1))],
        )
        .unwrap();
        let crumbs = tree.breadcrumbs(2).unwrap();
        assert_eq!(crumbs.iter().map(|c| c.id).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_validate_parent_rejects_cycle() {
        let owner = Uuid::new_v4();
        let tree = FolderTree::build(
            owner,
            vec![
                folder(1, owner, "a", None),
                folder(2, owner, "b", Some(1)),
                folder(3, owner, "c", Some(2)),
            ],
        )
        .unwrap();

        assert!(tree.validate_parent(None, 3).is_ok());
        assert!(tree.validate_parent(Some(3), 1).is_ok());
        assert!(tree.validate_parent(Some(1), 3).is_err());
        assert!(tree.validate_parent(Some(2), 2).is_err());
    }

    #[test]
    fn test_validate_parent_rejects_unknown_parent() {
        let owner = Uuid::new_v4();
        let tree = FolderTree::build(owner, vec![folder(1, owner, "a", None)]).unwrap();
        let err = tree.validate_parent(None, 42).unwrap_err();
        assert_eq!(err.kind, drivehub_core::error::ErrorKind::NotFound);
    }

    #[test]
    fn test_corrupt_chain_is_reported() {
        let owner = Uuid::new_v4();
        let tree = FolderTree::build(
            owner,
            vec![folder(1, owner, "a", Some(2)), folder(2, owner, "b", Some(1))],
        )
        .unwrap();
        assert!(tree.path(1).is_err());
    }

    #[test]
    fn test_build_rejects_foreign_folder() {
        let owner = Uuid::new_v4();
        let other = Uuid::new_v4();
        assert!(FolderTree::build(owner, vec![folder(1, other, "x", None)]).is_err());
    }

    #[test]
    fn test_descendants() {
        let owner = Uuid::new_v4();
        let tree = FolderTree::build(
            owner,
            vec![
                folder(1, owner, "a", None),
                folder(2, owner, "b", Some(1)),
                folder(3, owner, "c", Some(2)),
                folder(4, owner, "d", None),
            ],
        )
        .unwrap();
        let mut below = tree.descendants(1);
        below.sort();
        assert_eq!(below, vec![2, 3]);
        assert!(tree.descendants(4).is_empty());
    }
}
