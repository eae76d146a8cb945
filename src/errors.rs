// errors.rs
use crate::geos::ReferenceLoadError;
use crate::source::SourceError;
use thiserror::Error;

/// Terminal failure of a pipeline run.
/// Whatever was fetched or computed before the failure is discarded.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("reference layer unavailable: {0}")]
    Reference(#[from] ReferenceLoadError),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
