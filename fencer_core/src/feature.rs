use crate::error::FencerResult;
use rtree::{Point, Rect};
use std::fmt;
use std::hash::Hash;

/// A feature's stable identity: hashable, comparable, and renderable for diagnostics.
pub trait FeatureKey: Clone + Eq + Hash + fmt::Debug + fmt::Display + Send + Sync + 'static {}

impl<T> FeatureKey for T where T: Clone + Eq + Hash + fmt::Debug + fmt::Display + Send + Sync + 'static {}

/// A user-defined spatial entity indexable by [`crate::Index`].
///
/// Implementations are opaque to the rest of the crate beyond these three
/// operations: the index never inspects anything else about `Self`.
pub trait Feature {
    type Key: FeatureKey;

    /// The feature's bounding rectangle. Must be stable for as long as the
    /// feature stays in an index (see `Index`'s consistency invariant);
    /// mutating bounds requires `Index::update` or a delete-then-insert.
    fn bounds(&self) -> Rect;

    /// Finer-than-bounds membership test.
    fn contains(&self, point: Point) -> FencerResult<bool>;

    /// The feature's stable identity.
    fn key(&self) -> Self::Key;
}
