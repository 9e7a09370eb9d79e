use thiserror::Error;

/// The main error type for the fencer_core library.
///
/// Three taxa, per the pipeline's error-handling contract: structural errors
/// raised by the index itself, internal pipeline errors raised by a
/// misbehaving or misconfigured query component, and opaque errors
/// propagated verbatim from user-supplied conditions, mappers and reducers.
#[derive(Debug, Error)]
pub enum Error {
    #[error("feature not found for key {0}")]
    FeatureNotFound(String),

    #[error("internal pipeline error in {0}")]
    InternalPipelineError(String),

    #[error("invalid geometry: {0}")]
    Rtree(#[from] rtree::Error),

    #[error(transparent)]
    User(#[from] anyhow::Error),
}

impl Error {
    /// Returns true if this is a structural `FeatureNotFound` error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::FeatureNotFound(_))
    }

    /// Returns true if this error originates from the pipeline's own bookkeeping
    /// rather than from a user-supplied condition, mapper or reducer.
    pub fn is_internal(&self) -> bool {
        matches!(self, Error::InternalPipelineError(_) | Error::Rtree(_))
    }
}

pub type FencerResult<T> = std::result::Result<T, Error>;
