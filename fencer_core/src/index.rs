use crate::error::{Error, FencerResult};
use crate::feature::Feature;
use crate::query::{Contains, Query, QueryBuilder};
use rtree::{Point, RTree, RTreeItem, Rect};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info};

/// Branching factor for the underlying R-tree: within the `[5, 20]` range
/// recommended for 2D bounding-box trees.
const DEFAULT_BRANCHING: usize = 16;

struct Entry<F>(Arc<F>);

impl<F> Clone for Entry<F> {
    fn clone(&self) -> Self {
        Entry(self.0.clone())
    }
}

impl<F: Feature> RTreeItem for Entry<F> {
    fn bounds(&self) -> Rect {
        self.0.bounds()
    }
}

/// An in-memory spatial index over features of type `F`.
///
/// Holds an R-tree over `(bounds, feature)` pairs plus a `key -> feature`
/// map; both stores point at the same underlying feature. Not safe for
/// concurrent mutation, and not safe to mutate while a query driven by
/// `Index::query` is in flight, since both observe the same index state
/// synchronously on the caller's thread.
pub struct Index<F: Feature> {
    tree: RTree<Entry<F>>,
    by_key: HashMap<F::Key, Arc<F>>,
}

impl<F: Feature + 'static> Index<F> {
    /// Builds an index containing `features` via a chunked bulk load of the
    /// R-tree, rather than one `insert` at a time. A later feature replaces
    /// an earlier one sharing the same key, same as `insert`.
    pub fn new(features: impl IntoIterator<Item = F>) -> FencerResult<Self> {
        let mut by_key: HashMap<F::Key, Arc<F>> = HashMap::new();
        for feature in features {
            by_key.insert(feature.key(), Arc::new(feature));
        }
        let mut tree = RTree::new(DEFAULT_BRANCHING);
        tree.insert_bulk(by_key.values().cloned().map(Entry).collect());
        info!(size = by_key.len(), "built Index via bulk load");
        Ok(Index { tree, by_key })
    }

    /// Adds a feature to the index. Re-inserting an already-present key
    /// replaces the earlier entry (equivalent to `update`), preserving the
    /// invariant that each feature key has exactly one R-tree entry.
    pub fn insert(&mut self, feature: F) -> FencerResult<()> {
        let key = feature.key();
        if self.by_key.contains_key(&key) {
            debug!(key = %key, "insert: key already present, replacing");
            self.delete(&key)?;
        }
        let arc = Arc::new(feature);
        self.tree.insert(Entry(arc.clone()));
        self.by_key.insert(key, arc);
        Ok(())
    }

    /// Removes the feature with the given key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FeatureNotFound`] if `key` isn't present.
    pub fn delete(&mut self, key: &F::Key) -> FencerResult<()> {
        let feature = self
            .by_key
            .remove(key)
            .ok_or_else(|| Error::FeatureNotFound(key.to_string()))?;
        let bounds = feature.bounds();
        self.tree.delete(&bounds, &|e: &Entry<F>| &e.0.key() == key);
        Ok(())
    }

    /// Equivalent to `delete(f.key())` followed by `insert(f)`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FeatureNotFound`] if `feature.key()` wasn't present.
    pub fn update(&mut self, feature: F) -> FencerResult<()> {
        self.delete(&feature.key())?;
        self.insert(feature)
    }

    /// Returns the feature for `key`, if present.
    pub fn lookup(&self, key: &F::Key) -> Vec<Arc<F>> {
        self.by_key.get(key).cloned().into_iter().collect()
    }

    /// Returns every feature whose `contains(point)` returns true, via a
    /// query built from a minimal rectangle around `point`.
    pub fn find_containing(&self, point: Point) -> FencerResult<Vec<Arc<F>>> {
        let bounds = Rect::new(point, f64::MIN_POSITIVE, f64::MIN_POSITIVE)?;
        let mut builder = QueryBuilder::new();
        builder.r#where(Contains { point });
        self.query(&bounds, builder.build())
    }

    /// Returns every feature whose bounds intersect `rect`.
    pub fn intersect(&self, rect: &Rect) -> Vec<Arc<F>> {
        self.tree
            .search_intersect(rect)
            .into_iter()
            .map(|entry| entry.0.clone())
            .collect()
    }

    /// Scans every feature whose bounds intersect `rect` through `query`,
    /// returning its final distinct projection.
    ///
    /// The first error raised by the pipeline aborts the scan; any partial
    /// result accumulated so far is discarded.
    pub fn query(&self, rect: &Rect, mut query: Query<F>) -> FencerResult<Vec<Arc<F>>> {
        let candidates = self.tree.search_intersect(rect);
        if candidates.is_empty() {
            return Ok(Vec::new());
        }
        for candidate in candidates {
            query.scan(candidate.0.clone())?;
        }
        Ok(query.distinct())
    }

    /// Every feature key currently in the index.
    pub fn keys(&self) -> HashSet<F::Key> {
        self.by_key.keys().cloned().collect()
    }

    pub fn size(&self) -> usize {
        self.by_key.len()
    }
}

impl<F: Feature> Default for Index<F> {
    fn default() -> Self {
        info!("creating empty Index");
        Index {
            tree: RTree::new(DEFAULT_BRANCHING),
            by_key: HashMap::new(),
        }
    }
}
