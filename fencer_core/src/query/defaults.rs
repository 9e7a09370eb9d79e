use super::aggregator::{Aggregator, Condition};
use super::result::Result;
use super::result_key::ResultKey;
use super::scan_match::Match;
use crate::error::FencerResult;
use crate::feature::Feature;

/// Accepts every feature; installed when a builder has no explicit conditions
/// so a no-argument pipeline is a pass-through.
pub(crate) struct DefaultCondition;

impl<F> Condition<F> for DefaultCondition {
    fn is_match(&self, _feature: &F) -> FencerResult<bool> {
        Ok(true)
    }
}

/// Keeps one result per feature key: each feature key is its own bucket, and
/// the most recently scanned feature replaces any earlier one for that key.
/// Installed when a builder has no explicit aggregators.
pub(crate) struct DefaultAggregator;

impl<F: Feature> Aggregator<F> for DefaultAggregator {
    fn map(&self, mut m: Match<F>) -> FencerResult<Match<F>> {
        m.add_key(ResultKey::new(m.feature.key()));
        Ok(m)
    }

    fn reduce(&self, result: &mut Result<F>, m: &Match<F>) -> FencerResult<()> {
        for key in &m.result_keys {
            result.update(key.clone(), |entry| {
                entry.features = vec![m.feature.clone()];
            });
        }
        Ok(())
    }
}
