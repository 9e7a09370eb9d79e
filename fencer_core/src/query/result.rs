use super::result_key::ResultKey;
use super::scan_match::Match;
use crate::feature::Feature;
use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// The accumulated state at one `ResultKey`.
pub struct ResultEntry<F> {
    pub features: Vec<Arc<F>>,
    pub meta: Option<Arc<dyn Any + Send + Sync>>,
}

impl<F> Default for ResultEntry<F> {
    fn default() -> Self {
        ResultEntry {
            features: Vec::new(),
            meta: None,
        }
    }
}

/// The `ResultKey -> ResultEntry` map owned by one query.
///
/// Entries are created lazily the first time a key is touched via
/// [`Result::update`] or [`Result::replace`].
pub struct Result<F> {
    entries: HashMap<ResultKey, ResultEntry<F>>,
}

impl<F> Default for Result<F> {
    fn default() -> Self {
        Result {
            entries: HashMap::new(),
        }
    }
}

impl<F: Feature> Result<F> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up (or lazily creates) the entry for `key` and runs `f` against it.
    pub fn update(&mut self, key: ResultKey, f: impl FnOnce(&mut ResultEntry<F>)) {
        let entry = self.entries.entry(key).or_default();
        f(entry);
    }

    /// For each of `match_.result_keys`, replaces the entry's features with
    /// just the match's feature.
    pub fn replace(&mut self, match_: &Match<F>) {
        for key in &match_.result_keys {
            self.update(key.clone(), |entry| {
                entry.features = vec![match_.feature.clone()];
            });
        }
    }

    /// Flattens every entry's features, returning them in first-occurrence
    /// order with duplicate feature keys suppressed. Entry iteration order
    /// is unspecified (backed by a hash map).
    pub fn distinct(&self) -> Vec<Arc<F>> {
        let mut features = Vec::new();
        let mut seen = HashSet::new();
        for entry in self.entries.values() {
            for feature in &entry.features {
                if seen.insert(feature.key()) {
                    features.push(feature.clone());
                }
            }
        }
        features
    }
}
