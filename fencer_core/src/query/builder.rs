use super::aggregator::{Aggregator, Condition, Mapper, Reducer, StreamAggregator};
use super::defaults::{DefaultAggregator, DefaultCondition};
use super::pipeline::Query;
use super::result::Result;
use crate::feature::Feature;

enum AggregatorSlot<F> {
    Plain(Box<dyn Aggregator<F>>),
    Stream(StreamAggregator<F>),
}

/// Fluent construction of a [`Query`].
///
/// `r#where` adds conditions (conjunction), `aggregate` adds a prebuilt
/// aggregator, and `stream_to` opens a [`StreamBuilder`] to grow a fresh
/// `StreamAggregator` mapper-by-mapper. `build` fills in the default
/// condition/aggregator when none were registered.
#[derive(Default)]
pub struct QueryBuilder<F> {
    conditions: Vec<Box<dyn Condition<F>>>,
    aggregators: Vec<AggregatorSlot<F>>,
}

impl<F: Feature + 'static> QueryBuilder<F> {
    pub fn new() -> Self {
        QueryBuilder {
            conditions: Vec::new(),
            aggregators: Vec::new(),
        }
    }

    /// Adds a condition; multiple conditions act as a logical AND.
    pub fn r#where(&mut self, condition: impl Condition<F> + 'static) -> &mut Self {
        self.conditions.push(Box::new(condition));
        self
    }

    /// Adds a prebuilt aggregator; multiple aggregators act as a logical OR.
    pub fn aggregate(&mut self, aggregator: impl Aggregator<F> + 'static) -> &mut Self {
        self.aggregators.push(AggregatorSlot::Plain(Box::new(aggregator)));
        self
    }

    /// Starts a new stream aggregator ending in `reducer`, returning a
    /// sub-builder for appending mappers to it.
    pub fn stream_to(&mut self, reducer: impl Reducer<F> + 'static) -> StreamBuilder<'_, F> {
        self.aggregators
            .push(AggregatorSlot::Stream(StreamAggregator::new(reducer)));
        let idx = self.aggregators.len() - 1;
        StreamBuilder {
            aggregators: &mut self.aggregators,
            idx,
        }
    }

    /// Finalises the query: installs the default condition/aggregator if the
    /// builder has none of either, then hands over a fresh query with an
    /// empty result accumulator.
    pub fn build(&mut self) -> Query<F> {
        if self.conditions.is_empty() {
            self.conditions.push(Box::new(DefaultCondition));
        }
        if self.aggregators.is_empty() {
            self.aggregators.push(AggregatorSlot::Plain(Box::new(DefaultAggregator)));
        }
        let aggregators = std::mem::take(&mut self.aggregators)
            .into_iter()
            .map(|slot| match slot {
                AggregatorSlot::Plain(a) => a,
                AggregatorSlot::Stream(s) => Box::new(s) as Box<dyn Aggregator<F>>,
            })
            .collect();
        Query {
            conditions: std::mem::take(&mut self.conditions),
            aggregators,
            result: Result::new(),
        }
    }
}

/// Sub-builder returned by [`QueryBuilder::stream_to`] for appending mappers
/// to the stream aggregator it just created.
pub struct StreamBuilder<'a, F> {
    aggregators: &'a mut Vec<AggregatorSlot<F>>,
    idx: usize,
}

impl<'a, F: Feature + 'static> StreamBuilder<'a, F> {
    /// Appends a mapper; mappers form a sequence, each transforming the match
    /// received from the previous one.
    pub fn map(self, mapper: impl Mapper<F> + 'static) -> Self {
        match &mut self.aggregators[self.idx] {
            AggregatorSlot::Stream(stream) => stream.mappers.push(Box::new(mapper)),
            AggregatorSlot::Plain(_) => unreachable!("stream_to always installs a Stream slot"),
        }
        self
    }
}
