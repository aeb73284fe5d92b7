//! Arena-backed in-memory tree store.

use crate::domain::Series;
use crate::error::AppError;
use crate::store::{Entry, ScanStore};

pub type NodeId = usize;

const ROOT: NodeId = 0;

#[derive(Debug, Clone)]
enum NodeKind {
    Folder(Vec<NodeId>),
    Leaf(Series),
}

#[derive(Debug, Clone)]
struct Node {
    name: String,
    kind: NodeKind,
}

/// A hierarchical store held entirely in memory.
///
/// Children keep their insertion order, which is the enumeration order seen by
/// the key walker.
#[derive(Debug, Clone)]
pub struct TreeStore {
    nodes: Vec<Node>,
}

impl Default for TreeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeStore {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                name: String::new(),
                kind: NodeKind::Folder(Vec::new()),
            }],
        }
    }

    /// Insert a leaf at `key`, creating intermediate folders as needed.
    ///
    /// Replacing an existing leaf keeps its position.
    pub fn insert(&mut self, key: &str, series: Series) -> Result<(), AppError> {
        let parts = split_key(key)?;
        let (leaf_name, folders) = parts
            .split_last()
            .ok_or_else(|| AppError::new(AppError::USAGE, "Cannot insert at an empty key."))?;

        let mut current = ROOT;
        for name in folders {
            current = match self.child(current, name) {
                Some(id) => match self.nodes[id].kind {
                    NodeKind::Folder(_) => id,
                    NodeKind::Leaf(_) => {
                        return Err(AppError::new(
                            AppError::USAGE,
                            format!("Cannot insert '{key}': '{name}' is a leaf."),
                        ));
                    }
                },
                None => self.push_child(current, name, NodeKind::Folder(Vec::new())),
            };
        }

        match self.child(current, leaf_name) {
            Some(id) => match &mut self.nodes[id].kind {
                NodeKind::Leaf(existing) => *existing = series,
                NodeKind::Folder(_) => {
                    return Err(AppError::new(
                        AppError::USAGE,
                        format!("Cannot insert '{key}': a folder already exists there."),
                    ));
                }
            },
            None => {
                self.push_child(current, leaf_name, NodeKind::Leaf(series));
            }
        }
        Ok(())
    }

    /// Create an (empty) folder at `key` if it does not exist yet.
    pub fn insert_folder(&mut self, key: &str) -> Result<(), AppError> {
        let mut current = ROOT;
        for name in split_key(key)? {
            current = match self.child(current, name) {
                Some(id) if matches!(self.nodes[id].kind, NodeKind::Folder(_)) => id,
                Some(_) => {
                    return Err(AppError::new(
                        AppError::USAGE,
                        format!("Cannot create folder '{key}': '{name}' is a leaf."),
                    ));
                }
                None => self.push_child(current, name, NodeKind::Folder(Vec::new())),
            };
        }
        Ok(())
    }

    /// Number of leaves in the whole store.
    pub fn leaf_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n.kind, NodeKind::Leaf(_)))
            .count()
    }

    fn resolve(&self, key: &str) -> Option<NodeId> {
        let parts = split_key(key).ok()?;
        let mut current = ROOT;
        for name in parts {
            current = self.child(current, name)?;
        }
        Some(current)
    }

    fn child(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        match &self.nodes[parent].kind {
            NodeKind::Folder(children) => children
                .iter()
                .copied()
                .find(|&id| self.nodes[id].name == name),
            NodeKind::Leaf(_) => None,
        }
    }

    fn push_child(&mut self, parent: NodeId, name: &str, kind: NodeKind) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node {
            name: name.to_string(),
            kind,
        });
        if let NodeKind::Folder(children) = &mut self.nodes[parent].kind {
            children.push(id);
        }
        id
    }
}

impl ScanStore for TreeStore {
    fn entries(&self, dir: Option<&str>) -> Result<Vec<Entry>, AppError> {
        let id = match dir {
            Some(dir) => self.resolve(dir).ok_or_else(|| AppError::not_found(dir))?,
            None => ROOT,
        };
        match &self.nodes[id].kind {
            NodeKind::Folder(children) => Ok(children
                .iter()
                .map(|&c| Entry {
                    name: self.nodes[c].name.clone(),
                    is_folder: matches!(self.nodes[c].kind, NodeKind::Folder(_)),
                })
                .collect()),
            NodeKind::Leaf(_) => Err(AppError::not_found(dir.unwrap_or_default())),
        }
    }

    fn series(&self, key: &str) -> Result<Series, AppError> {
        let id = self.resolve(key).ok_or_else(|| AppError::not_found(key))?;
        match &self.nodes[id].kind {
            NodeKind::Leaf(series) => Ok(series.clone()),
            NodeKind::Folder(_) => Err(AppError::not_found(key)),
        }
    }
}

fn split_key(key: &str) -> Result<Vec<&str>, AppError> {
    let parts: Vec<&str> = key.split('/').collect();
    if parts.iter().any(|p| p.is_empty()) {
        return Err(AppError::new(
            AppError::USAGE,
            format!("Invalid key '{key}': empty path segment."),
        ));
    }
    if parts.iter().any(|p| matches!(*p, "." | "..")) {
        return Err(AppError::new(
            AppError::USAGE,
            format!("Invalid key '{key}': '.' and '..' are not entry names."),
        ));
    }
    Ok(parts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: f64) -> Series {
        Series::new(vec![(0.0, v)])
    }

    #[test]
    fn entries_preserve_insertion_order() {
        let mut store = TreeStore::new();
        store.insert("b/z", s(1.0)).unwrap();
        store.insert("a", s(2.0)).unwrap();
        store.insert("b/y", s(3.0)).unwrap();

        let root = store.entries(None).unwrap();
        let names: Vec<_> = root.iter().map(|e| (e.name.as_str(), e.is_folder)).collect();
        assert_eq!(names, vec![("b", true), ("a", false)]);

        let b: Vec<_> = store.entries(Some("b")).unwrap().into_iter().map(|e| e.name).collect();
        assert_eq!(b, vec!["z", "y"]);
    }

    #[test]
    fn lookups_of_missing_paths_are_not_found() {
        let mut store = TreeStore::new();
        store.insert("a/b", s(1.0)).unwrap();
        assert!(store.entries(Some("nope")).unwrap_err().is_not_found());
        assert!(store.series("a/c").unwrap_err().is_not_found());
        assert!(store.series("a").unwrap_err().is_not_found());
        assert!(store.entries(Some("a/b")).unwrap_err().is_not_found());
        assert_eq!(store.series("a/b").unwrap(), s(1.0));
    }

    #[test]
    fn insert_rejects_paths_through_leaves() {
        let mut store = TreeStore::new();
        store.insert("a", s(1.0)).unwrap();
        assert!(store.insert("a/b", s(2.0)).is_err());
        assert!(store.insert("x//y", s(2.0)).is_err());
        store.insert("a", s(5.0)).unwrap();
        assert_eq!(store.series("a").unwrap(), s(5.0));
        assert_eq!(store.leaf_count(), 1);
    }

    #[test]
    fn dot_segments_are_rejected() {
        let mut store = TreeStore::new();
        for key in ["../escaped", "a/../b", "./a", "a/.", ".."] {
            assert_eq!(store.insert(key, s(1.0)).unwrap_err().exit_code(), AppError::USAGE, "{key}");
            assert_eq!(store.insert_folder(key).unwrap_err().exit_code(), AppError::USAGE, "{key}");
        }
        assert_eq!(store.leaf_count(), 0);
        assert!(store.entries(None).unwrap().is_empty());
    }
}
