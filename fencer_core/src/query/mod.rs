//! The query pipeline: condition conjunctions, aggregator disjunction, stream
//! aggregators (mapper chain + reducer), result accumulation and final
//! distinct projection.

mod aggregator;
mod builder;
mod conditions;
mod defaults;
mod pipeline;
mod result;
mod result_key;
mod scan_match;

pub use aggregator::{Aggregator, Condition, Mapper, Reducer, StreamAggregator};
pub use builder::{QueryBuilder, StreamBuilder};
pub use conditions::{Contains, Pred};
pub use pipeline::Query;
pub use result::{Result, ResultEntry};
pub use result_key::ResultKey;
pub use scan_match::Match;
