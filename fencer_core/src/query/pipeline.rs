use super::aggregator::{Aggregator, Condition};
use super::result::Result;
use super::scan_match::Match;
use crate::error::FencerResult;
use crate::feature::Feature;
use std::sync::Arc;
use tracing::trace;

/// A scan/map/reduce pipeline: a conjunction of conditions gates which
/// features are considered, and a disjunction of aggregators reduces each
/// surviving feature into a shared `Result`, keyed by user-defined
/// `ResultKey`s.
///
/// Built via [`crate::query::QueryBuilder`]; a query built through it always
/// has at least one condition and at least one aggregator.
pub struct Query<F: Feature> {
    pub(crate) conditions: Vec<Box<dyn Condition<F>>>,
    pub(crate) aggregators: Vec<Box<dyn Aggregator<F>>>,
    pub(crate) result: Result<F>,
}

impl<F: Feature> Query<F> {
    /// Sends a feature through the pipeline: conditions first (as a
    /// conjunction), then each aggregator's map/reduce step in registration
    /// order. Features rejected by any condition never touch the result.
    pub fn scan(&mut self, feature: Arc<F>) -> FencerResult<()> {
        for condition in &self.conditions {
            if !condition.is_match(feature.as_ref())? {
                return Ok(());
            }
        }

        let initial = Match::new(feature);
        for aggregator in &self.aggregators {
            let m = aggregator.map(initial.clone())?;
            if m.result_keys.is_empty() {
                trace!("aggregator rejected match, skipping reduce");
                continue;
            }
            aggregator.reduce(&mut self.result, &m)?;
        }
        Ok(())
    }

    /// Flattens the accumulated result into distinct features (deduplicated
    /// by feature key), in an order that depends on the result map's hash
    /// iteration and should not be relied upon.
    pub fn distinct(&self) -> Vec<Arc<F>> {
        self.result.distinct()
    }
}
