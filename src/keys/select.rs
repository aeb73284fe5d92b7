//! Per-group key selection.
//!
//! Keys are matched by string prefix against a template such as
//! `{namespace}/C{group}/`. The trailing slash in the default keeps group 1
//! from matching keys of group 10.

use crate::domain::LeafKey;
use crate::error::AppError;
use crate::keys::walker::{KeyWalk, walk};
use crate::store::ScanStore;

/// Key prefix template with `{namespace}` and `{group}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPattern {
    template: String,
}

impl KeyPattern {
    pub fn new(template: &str) -> Result<Self, AppError> {
        if !template.contains("{group}") {
            return Err(AppError::new(
                AppError::USAGE,
                format!("Key pattern '{template}' must contain '{{group}}'."),
            ));
        }
        Ok(Self {
            template: template.to_string(),
        })
    }

    pub fn prefix(&self, namespace: &str, group: u32) -> String {
        self.template
            .replace("{namespace}", namespace)
            .replace("{group}", &group.to_string())
    }
}

/// Streaming filter over a walk of `namespace`, stopping after `cap` matches.
pub struct Selection<S> {
    walk: KeyWalk<S>,
    prefix: String,
    remaining: Option<usize>,
}

/// Select the keys of `group` under `namespace`.
///
/// `cap == 0` means unbounded. Once `cap` keys have been yielded the walk is
/// not advanced any further.
pub fn select<S: ScanStore>(
    store: S,
    namespace: &str,
    pattern: &KeyPattern,
    group: u32,
    cap: usize,
) -> Result<Selection<S>, AppError> {
    Ok(Selection {
        walk: walk(store, Some(namespace))?,
        prefix: pattern.prefix(namespace, group),
        remaining: (cap > 0).then_some(cap),
    })
}

impl<S: ScanStore> Iterator for Selection<S> {
    type Item = Result<LeafKey, AppError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == Some(0) {
            return None;
        }
        for item in self.walk.by_ref() {
            match item {
                Ok(key) if key.starts_with(&self.prefix) => {
                    if let Some(n) = self.remaining.as_mut() {
                        *n -= 1;
                    }
                    return Some(Ok(key));
                }
                Ok(_) => continue,
                Err(e) => return Some(Err(e)),
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::domain::{DEFAULT_PATTERN, Series};
    use crate::store::{Entry, TreeStore};

    /// Counts folder listings to observe how far a walk went.
    struct CountingStore {
        inner: TreeStore,
        listings: Cell<usize>,
    }

    impl ScanStore for CountingStore {
        fn entries(&self, dir: Option<&str>) -> Result<Vec<Entry>, AppError> {
            self.listings.set(self.listings.get() + 1);
            self.inner.entries(dir)
        }

        fn series(&self, key: &str) -> Result<Series, AppError> {
            self.inner.series(key)
        }
    }

    fn store_with(groups: &[(u32, usize)]) -> TreeStore {
        let mut store = TreeStore::new();
        for &(g, n) in groups {
            for i in 0..n {
                store
                    .insert(&format!("Final0/C{g}/p{i}/curve"), Series::new(vec![(0.0, 0.0)]))
                    .unwrap();
            }
        }
        store
    }

    fn pattern() -> KeyPattern {
        KeyPattern::new(DEFAULT_PATTERN).unwrap()
    }

    fn keys<S: ScanStore>(sel: Selection<S>) -> Vec<String> {
        sel.map(Result::unwrap).collect()
    }

    #[test]
    fn selects_only_the_requested_group() {
        let store = store_with(&[(1, 2), (10, 3), (0, 1)]);
        let got = keys(select(&store, "Final0", &pattern(), 1, 0).unwrap());
        assert_eq!(got, vec!["Final0/C1/p0/curve", "Final0/C1/p1/curve"]);
    }

    #[test]
    fn capped_selection_is_prefix_of_unbounded() {
        let store = store_with(&[(0, 4), (2, 7), (3, 2)]);
        let all = keys(select(&store, "Final0", &pattern(), 2, 0).unwrap());
        assert_eq!(all.len(), 7);
        for cap in 1..=9 {
            let capped = keys(select(&store, "Final0", &pattern(), 2, cap).unwrap());
            assert_eq!(capped.len(), cap.min(7));
            assert_eq!(capped[..], all[..capped.len()]);
        }
    }

    #[test]
    fn cap_stops_the_traversal_early() {
        let store = CountingStore {
            inner: store_with(&[(0, 50)]),
            listings: Cell::new(0),
        };
        let got = keys(select(&store, "Final0", &pattern(), 0, 5).unwrap());
        assert_eq!(got.len(), 5);
        // Final0, C0 and one folder per yielded key.
        assert_eq!(store.listings.get(), 7);
        assert!(store.listings.get() < 50);
    }

    #[test]
    fn unknown_group_yields_nothing() {
        let store = store_with(&[(0, 3)]);
        assert!(keys(select(&store, "Final0", &pattern(), 6, 0).unwrap()).is_empty());
    }

    #[test]
    fn missing_namespace_is_not_found() {
        let store = store_with(&[(0, 3)]);
        let err = select(&store, "Final1", &pattern(), 0, 0).err().unwrap();
        assert!(err.is_not_found());
    }

    #[test]
    fn pattern_requires_group_placeholder() {
        assert!(KeyPattern::new("{namespace}/C").is_err());
        assert_eq!(pattern().prefix("Final0", 4), "Final0/C4/");
    }
}
