use super::aggregator::Condition;
use crate::error::FencerResult;
use crate::feature::Feature;
use rtree::Point;

/// Matches features containing the given point, via `Feature::contains`.
pub struct Contains {
    pub point: Point,
}

impl<F: Feature> Condition<F> for Contains {
    fn is_match(&self, feature: &F) -> FencerResult<bool> {
        feature.contains(self.point)
    }
}

/// Adapts a plain closure into a `Condition`.
pub struct Pred<G>(pub G);

impl<F, G> Condition<F> for Pred<G>
where
    G: Fn(&F) -> FencerResult<bool> + Send + Sync,
{
    fn is_match(&self, feature: &F) -> FencerResult<bool> {
        (self.0)(feature)
    }
}
