//! An in-memory spatial index over user-defined 2D features, paired with a
//! composable scan/map/reduce query pipeline.
//!
//! [`index::Index`] keeps features in an R-tree keyed by bounding rectangle
//! plus a lookup map keyed by [`feature::Feature::Key`]. [`query::QueryBuilder`]
//! assembles a [`query::Query`]: conditions narrow candidates (AND), and
//! aggregators fold surviving matches into a result keyed by
//! [`query::ResultKey`], disjunctively (OR) across aggregators.

pub mod error;
pub mod feature;
pub mod index;
pub mod query;

pub use error::{Error, FencerResult};
pub use feature::{Feature, FeatureKey};
pub use index::Index;
pub use query::{
    Aggregator, Condition, Contains, Mapper, Match, Pred, Query, QueryBuilder, Reducer, Result,
    ResultEntry, ResultKey, StreamAggregator, StreamBuilder,
};
pub use rtree::{Point, Rect};
