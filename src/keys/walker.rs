//! Lazy depth-first enumeration of leaf keys.
//!
//! The walk keeps an explicit stack of partially consumed folder listings, so a
//! folder's children are only requested from the store when the walk reaches
//! it. Keys come out in the store's native order; nothing is sorted, because
//! downstream colour/marker assignment depends on discovery order.

use crate::domain::LeafKey;
use crate::error::AppError;
use crate::store::{Entry, ScanStore};

struct Frame {
    prefix: Option<String>,
    entries: std::vec::IntoIter<Entry>,
}

/// Single-pass iterator over qualified leaf keys.
///
/// Errors listing a nested folder are yielded in place of the key; the walk
/// can continue past them.
pub struct KeyWalk<S> {
    store: S,
    stack: Vec<Frame>,
}

/// Start a walk at `subdir` (or the store root).
///
/// An absent `subdir` is reported immediately as NotFound.
pub fn walk<S: ScanStore>(store: S, subdir: Option<&str>) -> Result<KeyWalk<S>, AppError> {
    let entries = store.entries(subdir)?;
    Ok(KeyWalk {
        stack: vec![Frame {
            prefix: subdir.map(str::to_string),
            entries: entries.into_iter(),
        }],
        store,
    })
}

impl<S: ScanStore> Iterator for KeyWalk<S> {
    type Item = Result<LeafKey, AppError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let frame = self.stack.last_mut()?;
            let Some(entry) = frame.entries.next() else {
                self.stack.pop();
                continue;
            };
            let key = qualify(frame.prefix.as_deref(), &entry.name);

            if !entry.is_folder {
                return Some(Ok(key));
            }
            match self.store.entries(Some(&key)) {
                Ok(children) => self.stack.push(Frame {
                    prefix: Some(key),
                    entries: children.into_iter(),
                }),
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

fn qualify(prefix: Option<&str>, name: &str) -> String {
    match prefix {
        Some(prefix) => format!("{prefix}/{name}"),
        None => name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Series;
    use crate::store::TreeStore;

    fn fixture() -> TreeStore {
        let mut store = TreeStore::new();
        for key in [
            "top",
            "Final0/C1/x/deep/leaf",
            "Final0/C0/a",
            "Final0/C0/b",
            "Final0/C1/y",
            "Final0/leaf",
            "Other/z",
        ] {
            store.insert(key, Series::new(vec![(0.0, 0.0)])).unwrap();
        }
        store.insert_folder("Final0/Empty").unwrap();
        store
    }

    /// Reference: eager recursive listing.
    fn collect_recursive(store: &TreeStore, dir: Option<&str>) -> Vec<String> {
        let mut out = Vec::new();
        for entry in store.entries(dir).unwrap() {
            let key = qualify(dir, &entry.name);
            if entry.is_folder {
                out.extend(collect_recursive(store, Some(&key)));
            } else {
                out.push(key);
            }
        }
        out
    }

    #[test]
    fn walk_yields_leaves_in_discovery_order() {
        let store = fixture();
        let keys: Vec<String> = walk(&store, None).unwrap().map(Result::unwrap).collect();
        assert_eq!(
            keys,
            vec![
                "top",
                "Final0/C1/x/deep/leaf",
                "Final0/C1/y",
                "Final0/C0/a",
                "Final0/C0/b",
                "Final0/leaf",
                "Other/z",
            ]
        );
    }

    #[test]
    fn folder_walk_is_union_of_child_walks() {
        let store = fixture();
        for dir in [None, Some("Final0"), Some("Final0/C1"), Some("Final0/Empty")] {
            let walked: Vec<String> = walk(&store, dir).unwrap().map(Result::unwrap).collect();
            assert_eq!(walked, collect_recursive(&store, dir));

            let mut dedup = walked.clone();
            dedup.sort();
            dedup.dedup();
            assert_eq!(dedup.len(), walked.len(), "duplicate keys under {dir:?}");
        }
    }

    #[test]
    fn walk_restarts_fresh_each_time() {
        let store = fixture();
        let first: Vec<_> = walk(&store, Some("Final0")).unwrap().map(Result::unwrap).collect();
        let second: Vec<_> = walk(&store, Some("Final0")).unwrap().map(Result::unwrap).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn missing_root_is_not_found() {
        let store = fixture();
        let err = walk(&store, Some("Final9")).err().unwrap();
        assert!(err.is_not_found());
    }
}
