//! Read/write scan dataset JSON files.
//!
//! A dataset file is the on-disk form of a `TreeStore`:
//!
//! ```json
//! { "tool": "scan-curves",
//!   "entries": [
//!     { "name": "Final0", "entries": [
//!       { "name": "C0", "entries": [
//!         { "name": "SCurve_c0r0", "x": [0, 1, 2], "y": [0.0, 0.1, 0.4] } ] } ] } ] }
//! ```
//!
//! A node with `entries` is a folder, a node with `x`/`y` is a leaf. Array
//! order is the store's enumeration order.

use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::domain::Series;
use crate::error::AppError;
use crate::store::{ScanStore, TreeStore};

pub const DATASET_TOOL: &str = "scan-curves";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetFile {
    pub tool: String,
    pub entries: Vec<DatasetNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DatasetNode {
    Folder {
        name: String,
        entries: Vec<DatasetNode>,
    },
    Leaf {
        name: String,
        x: Vec<f64>,
        y: Vec<f64>,
    },
}

impl DatasetNode {
    pub fn name(&self) -> &str {
        match self {
            DatasetNode::Folder { name, .. } | DatasetNode::Leaf { name, .. } => name,
        }
    }
}

/// Read a dataset JSON file into an in-memory store.
pub fn read_dataset(path: &Path) -> Result<TreeStore, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::new(
            AppError::RESOURCE,
            format!("Failed to open dataset '{}': {e}", path.display()),
        )
    })?;
    let dataset: DatasetFile = serde_json::from_reader(BufReader::new(file)).map_err(|e| {
        AppError::new(
            AppError::USAGE,
            format!("Invalid dataset JSON '{}': {e}", path.display()),
        )
    })?;
    if dataset.tool != DATASET_TOOL {
        warn!(
            "dataset '{}' was written by '{}', reading it anyway",
            path.display(),
            dataset.tool
        );
    }
    store_from_dataset(&dataset)
}

/// Write every entry of `store` to a dataset JSON file.
///
/// Non-finite samples have no JSON representation and are written as `null`,
/// which `read_dataset` rejects.
pub fn write_dataset<S: ScanStore>(path: &Path, store: &S) -> Result<(), AppError> {
    let dataset = dataset_from_store(store)?;
    let file = File::create(path).map_err(|e| {
        AppError::new(
            AppError::RESOURCE,
            format!("Failed to create dataset '{}': {e}", path.display()),
        )
    })?;
    serde_json::to_writer_pretty(file, &dataset).map_err(|e| {
        AppError::new(
            AppError::RESOURCE,
            format!("Failed to write dataset '{}': {e}", path.display()),
        )
    })
}

/// Build a store from a parsed dataset.
pub fn store_from_dataset(dataset: &DatasetFile) -> Result<TreeStore, AppError> {
    let mut store = TreeStore::new();
    insert_nodes(&mut store, "", &dataset.entries)?;
    Ok(store)
}

/// Snapshot any store as a dataset.
pub fn dataset_from_store<S: ScanStore>(store: &S) -> Result<DatasetFile, AppError> {
    Ok(DatasetFile {
        tool: DATASET_TOOL.to_string(),
        entries: collect_nodes(store, None)?,
    })
}

/// Insert one folder's children. Sibling names must be unique.
fn insert_nodes(store: &mut TreeStore, parent: &str, nodes: &[DatasetNode]) -> Result<(), AppError> {
    let mut seen = HashSet::with_capacity(nodes.len());
    for node in nodes {
        if !seen.insert(node.name()) {
            return Err(AppError::new(
                AppError::USAGE,
                format!("Duplicate entry name '{}' under '{parent}'.", node.name()),
            ));
        }
        insert_node(store, parent, node)?;
    }
    Ok(())
}

fn insert_node(store: &mut TreeStore, parent: &str, node: &DatasetNode) -> Result<(), AppError> {
    let name = node.name();
    if name.is_empty() || name.contains('/') || name == "." || name == ".." {
        return Err(AppError::new(
            AppError::USAGE,
            format!("Invalid entry name '{name}' under '{parent}'."),
        ));
    }
    let key = if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}/{name}")
    };

    match node {
        DatasetNode::Folder { entries, .. } => {
            store.insert_folder(&key)?;
            insert_nodes(store, &key, entries)
        }
        DatasetNode::Leaf { x, y, .. } => {
            let series = Series::from_xy(x, y)
                .map_err(|e| AppError::new(AppError::USAGE, format!("Leaf '{key}': {e}")))?;
            store.insert(&key, series)
        }
    }
}

fn collect_nodes<S: ScanStore>(store: &S, dir: Option<&str>) -> Result<Vec<DatasetNode>, AppError> {
    let mut nodes = Vec::new();
    for entry in store.entries(dir)? {
        let key = match dir {
            Some(dir) => format!("{dir}/{}", entry.name),
            None => entry.name.clone(),
        };
        if entry.is_folder {
            nodes.push(DatasetNode::Folder {
                entries: collect_nodes(store, Some(&key))?,
                name: entry.name,
            });
        } else {
            let series = store.series(&key)?;
            nodes.push(DatasetNode::Leaf {
                name: entry.name,
                x: series.xs(),
                y: series.ys(),
            });
        }
    }
    Ok(nodes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::walk;
    use crate::store::Entry;

    fn sample_store() -> TreeStore {
        let mut store = TreeStore::new();
        store
            .insert("Final0/C0/SCurve_c0r0", Series::new(vec![(0.0, 0.0), (1.0, 0.5), (2.0, 1.0)]))
            .unwrap();
        store
            .insert("Final0/C1/SCurve_c0r0", Series::new(vec![(0.0, 0.1)]))
            .unwrap();
        store.insert_folder("Final0/Summary").unwrap();
        store.insert("notes", Series::default()).unwrap();
        store
    }

    #[test]
    fn write_then_read_preserves_structure() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("scan.json");
        let store = sample_store();
        write_dataset(&path, &store).unwrap();

        let back = read_dataset(&path).unwrap();
        let keys: Vec<String> = walk(&back, None).unwrap().map(Result::unwrap).collect();
        assert_eq!(
            keys,
            vec!["Final0/C0/SCurve_c0r0", "Final0/C1/SCurve_c0r0", "notes"]
        );
        assert_eq!(
            back.series("Final0/C0/SCurve_c0r0").unwrap(),
            store.series("Final0/C0/SCurve_c0r0").unwrap()
        );
        // Empty folders survive.
        assert!(back.entries(Some("Final0/Summary")).unwrap().is_empty());
        assert_eq!(
            back.entries(Some("Final0")).unwrap()[2],
            Entry {
                name: "Summary".to_string(),
                is_folder: true
            }
        );
    }

    #[test]
    fn parses_documented_layout() {
        let json = r#"{
            "tool": "scan-curves",
            "entries": [
                { "name": "Final0", "entries": [
                    { "name": "C3", "entries": [
                        { "name": "a", "x": [0, 1], "y": [0.0, 1.0] }
                    ] }
                ] }
            ]
        }"#;
        let dataset: DatasetFile = serde_json::from_str(json).unwrap();
        let store = store_from_dataset(&dataset).unwrap();
        assert_eq!(
            store.series("Final0/C3/a").unwrap(),
            Series::new(vec![(0.0, 0.0), (1.0, 1.0)])
        );
    }

    #[test]
    fn mismatched_lengths_are_usage_errors() {
        let dataset = DatasetFile {
            tool: DATASET_TOOL.to_string(),
            entries: vec![DatasetNode::Leaf {
                name: "bad".to_string(),
                x: vec![0.0, 1.0],
                y: vec![0.0],
            }],
        };
        let err = store_from_dataset(&dataset).unwrap_err();
        assert_eq!(err.exit_code(), AppError::USAGE);
    }

    #[test]
    fn names_with_slashes_are_rejected() {
        let dataset = DatasetFile {
            tool: DATASET_TOOL.to_string(),
            entries: vec![DatasetNode::Folder {
                name: "a/b".to_string(),
                entries: Vec::new(),
            }],
        };
        assert_eq!(store_from_dataset(&dataset).unwrap_err().exit_code(), AppError::USAGE);
    }

    fn leaf(name: &str, y: f64) -> DatasetNode {
        DatasetNode::Leaf {
            name: name.to_string(),
            x: vec![0.0],
            y: vec![y],
        }
    }

    fn folder(name: &str, entries: Vec<DatasetNode>) -> DatasetNode {
        DatasetNode::Folder {
            name: name.to_string(),
            entries,
        }
    }

    fn dataset(entries: Vec<DatasetNode>) -> DatasetFile {
        DatasetFile {
            tool: DATASET_TOOL.to_string(),
            entries,
        }
    }

    #[test]
    fn dot_names_are_rejected() {
        for name in [".", ".."] {
            let nested = dataset(vec![folder(name, vec![leaf("escaped", 1.0)])]);
            assert_eq!(store_from_dataset(&nested).unwrap_err().exit_code(), AppError::USAGE);
            let top = dataset(vec![leaf(name, 1.0)]);
            assert_eq!(store_from_dataset(&top).unwrap_err().exit_code(), AppError::USAGE);
        }
    }

    #[test]
    fn duplicate_siblings_are_rejected() {
        let leaves = dataset(vec![folder("C0", vec![leaf("a", 1.0), leaf("a", 2.0)])]);
        let err = store_from_dataset(&leaves).unwrap_err();
        assert_eq!(err.exit_code(), AppError::USAGE);
        assert!(err.to_string().contains("'a'"));

        let folders = dataset(vec![
            folder("C0", vec![leaf("a", 1.0)]),
            folder("C0", vec![leaf("b", 2.0)]),
        ]);
        assert_eq!(store_from_dataset(&folders).unwrap_err().exit_code(), AppError::USAGE);

        // Same name under different parents is fine.
        let cousins = dataset(vec![
            folder("C0", vec![leaf("a", 1.0)]),
            folder("C1", vec![leaf("a", 2.0)]),
        ]);
        let store = store_from_dataset(&cousins).unwrap();
        assert_eq!(store.series("C1/a").unwrap(), Series::new(vec![(0.0, 2.0)]));
    }

    #[test]
    fn missing_and_malformed_files() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = read_dataset(&tmp.path().join("nope.json")).unwrap_err();
        assert_eq!(missing.exit_code(), AppError::RESOURCE);

        let path = tmp.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(read_dataset(&path).unwrap_err().exit_code(), AppError::USAGE);
    }
}
