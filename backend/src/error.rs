use thiserror::Error;

use crate::coord::CoordError;
use crate::database::DatabaseError;
use crate::projection::ProjectionError;
use crate::provider::ProviderError;
use crate::similarity::SimilarityError;

/// Failures surfaced by the matching service and its collaborators. Every
/// failure reaches the caller typed and unchanged; nothing is recovered by
/// substituting default data.
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("coordinate error: {0}")]
    Coordinate(#[from] CoordError),

    #[error("projection error: {0}")]
    Projection(#[from] ProjectionError),

    #[error("similarity error: {0}")]
    Similarity(#[from] SimilarityError),

    #[error("storage error: {0}")]
    Storage(#[from] DatabaseError),

    #[error("routing provider error: {0}")]
    Provider(#[from] ProviderError),
}
