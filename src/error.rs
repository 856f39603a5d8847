//! Top-level error type crossing the planner's public boundary.

use thiserror::Error;

/// Errors a caller of [`crate::colony::Colony::plan`] can observe.
///
/// Infeasibility itself is not an error: a trip nobody can usefully visit
/// yields an empty [`crate::itinerary::Itinerary`], not an `Err`.
#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("failed to resolve travel matrices: {0}")]
    Resolver(#[from] crate::resolver::ResolverError),

    #[error("trip configuration is impossible to plan: {0}")]
    InvalidTrip(String),
}
