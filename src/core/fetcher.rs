use crate::core::geo::bounding_box_around;
use crate::models::{CandidateProfile, CandidateQuery, Coordinate};
use crate::services::{ProfileStore, StoreError};
use std::sync::Arc;

/// Issues the single bounded-region query of a discovery pass
///
/// The store only sees a square envelope; exact circular filtering is the
/// ranker's job.
#[derive(Clone)]
pub struct CandidateFetcher {
    store: Arc<dyn ProfileStore>,
}

impl CandidateFetcher {
    pub fn new(store: Arc<dyn ProfileStore>) -> Self {
        Self { store }
    }

    pub fn backend_tag(&self) -> &'static str {
        self.store.backend_tag()
    }

    /// Build the query for a viewer at `center`
    pub fn build_query(center: Coordinate, radius_km: f64, viewer_id: &str, cap: usize) -> CandidateQuery {
        CandidateQuery {
            bounding_box: bounding_box_around(center, radius_km),
            exclude_id: viewer_id.to_string(),
            limit: cap,
        }
    }

    /// Fetch raw candidate rows around `center`
    ///
    /// No retries. At most `cap` rows come back even if the backend ignores
    /// the limit.
    pub async fn fetch(
        &self,
        center: Coordinate,
        radius_km: f64,
        viewer_id: &str,
        cap: usize,
    ) -> Result<Vec<CandidateProfile>, StoreError> {
        let query = Self::build_query(center, radius_km, viewer_id, cap);

        tracing::debug!(
            "Fetching candidates for {} from {} (box: {:?}, cap: {})",
            viewer_id,
            self.store.backend_tag(),
            query.bounding_box,
            cap
        );

        let mut rows = self.store.query_candidates(&query).await?;
        rows.truncate(cap);

        Ok(rows)
    }
}
