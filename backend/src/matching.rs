use std::sync::Arc;

use chrono::Utc;

use crate::database::RouteStore;
use crate::error::MatchError;
use crate::models::{MatchResult, Route};
use crate::schedule::ScheduleFilter;
use crate::similarity;

/// Composes schedule filtering and spatial scoring over the route store.
///
/// Each match request is independent and stateless; the storage fetch is the
/// only suspending step. Errors from storage or scoring propagate unchanged,
/// with no partial result.
pub struct MatchService<S> {
    store: Arc<S>,
    threshold: f64,
}

impl<S> Clone for MatchService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            threshold: self.threshold,
        }
    }
}

impl<S: RouteStore> MatchService<S> {
    /// `threshold` is the strict lower bound on similarity for a candidate
    /// to be reported. The service is handed its value at construction;
    /// the deployed default is 0.0, any positive overlap.
    pub fn new(store: Arc<S>, threshold: f64) -> Self {
        Self { store, threshold }
    }

    /// Find routes compatible with `route`, both in schedule and in space.
    ///
    /// Candidates are fetched excluding the requester's own routes, kept
    /// when their schedule overlaps the requester's within tolerance, then
    /// scored against the requester's path. Results are ranked by
    /// descending similarity; candidates with equal scores keep their
    /// storage order.
    pub async fn find_matches(&self, route: &Route) -> Result<Vec<MatchResult>, MatchError> {
        let filter = ScheduleFilter::new(&route.schedule, Utc::now());

        let candidates = self.store.candidate_routes(&route.owner).await?;
        let fetched = candidates.len();

        let compatible: Vec<Route> = candidates
            .into_iter()
            .filter(|candidate| filter.matches(&candidate.schedule))
            .collect();
        tracing::debug!(
            "schedule filter kept {}/{} candidate routes for {}",
            compatible.len(),
            fetched,
            route.owner
        );

        let mut matches = similarity::compare_candidates(&route.path, compatible, self.threshold)?;
        matches.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));

        tracing::debug!(
            "{} routes matched above threshold {}",
            matches.len(),
            self.threshold
        );
        Ok(matches)
    }
}
