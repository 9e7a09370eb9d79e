use super::result::Result;
use super::scan_match::Match;
use crate::error::{Error, FencerResult};

/// A predicate used in the AND stage of the pipeline.
pub trait Condition<F>: Send + Sync {
    fn is_match(&self, feature: &F) -> FencerResult<bool>;
}

/// A transformation that annotates a `Match` with result keys.
pub trait Mapper<F>: Send + Sync {
    fn map(&self, m: Match<F>) -> FencerResult<Match<F>>;
}

/// An accumulator that updates a `Result` from a `Match`.
pub trait Reducer<F>: Send + Sync {
    fn reduce(&self, result: &mut Result<F>, m: &Match<F>) -> FencerResult<()>;
}

/// A (mapper, reducer) pair. Aggregators form the disjunction stage of the
/// pipeline: every aggregator registered on a query gets a chance to reduce
/// each scanned feature into the shared `Result`.
pub trait Aggregator<F>: Send + Sync {
    fn map(&self, m: Match<F>) -> FencerResult<Match<F>>;
    fn reduce(&self, result: &mut Result<F>, m: &Match<F>) -> FencerResult<()>;
}

/// An aggregator composed of an ordered sequence of mappers plus one reducer.
///
/// `map` pipes the match through each mapper in turn; `reduce` delegates to
/// the wrapped reducer. A stream aggregator with no mappers at all violates
/// its own invariant (it must carry at least one transformation) and is
/// rejected at scan time rather than silently behaving like the identity
/// mapper.
pub struct StreamAggregator<F> {
    pub(crate) mappers: Vec<Box<dyn Mapper<F>>>,
    pub(crate) reducer: Box<dyn Reducer<F>>,
}

impl<F> StreamAggregator<F> {
    pub fn new(reducer: impl Reducer<F> + 'static) -> Self {
        StreamAggregator {
            mappers: Vec::new(),
            reducer: Box::new(reducer),
        }
    }
}

impl<F> Aggregator<F> for StreamAggregator<F> {
    fn map(&self, mut m: Match<F>) -> FencerResult<Match<F>> {
        if self.mappers.is_empty() {
            return Err(Error::InternalPipelineError(
                "StreamAggregator has no mappers".to_string(),
            ));
        }
        for mapper in &self.mappers {
            m = mapper.map(m)?;
        }
        Ok(m)
    }

    fn reduce(&self, result: &mut Result<F>, m: &Match<F>) -> FencerResult<()> {
        self.reducer.reduce(result, m)
    }
}
