use super::result_key::ResultKey;
use std::any::Any;
use std::sync::Arc;

/// A transient record carrying one feature through the pipeline.
///
/// Created empty by `Query::scan`, mutated by each aggregator's mapper
/// stage, and finally consumed by that aggregator's reducer.
pub struct Match<F> {
    pub feature: Arc<F>,
    pub result_keys: Vec<ResultKey>,
    pub meta: Option<Arc<dyn Any + Send + Sync>>,
}

impl<F> Match<F> {
    pub fn new(feature: Arc<F>) -> Self {
        Match {
            feature,
            result_keys: Vec::new(),
            meta: None,
        }
    }

    /// Appends an additional result key, so this match contributes to more
    /// than one result bucket.
    pub fn add_key(&mut self, key: ResultKey) {
        self.result_keys.push(key);
    }

    /// Clears any existing result keys and sets a single one, so this match
    /// contributes to exactly one result bucket.
    pub fn replace_keys(&mut self, key: ResultKey) {
        self.result_keys = vec![key];
    }
}

impl<F> Clone for Match<F> {
    fn clone(&self) -> Self {
        Match {
            feature: self.feature.clone(),
            result_keys: self.result_keys.clone(),
            meta: self.meta.clone(),
        }
    }
}
