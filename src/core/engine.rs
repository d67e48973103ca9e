use crate::core::{fetcher::CandidateFetcher, feed::CandidateFeed, ranker::rank_candidates};
use crate::models::{
    Coordinate, DiscoveryParams, RankedCandidate, UnsetLocationPolicy, ViewerProfile,
    DEFAULT_CANDIDATE_CAP, DEFAULT_RADIUS_KM,
};
use crate::services::{ProfileStore, StoreError};
use std::sync::Arc;
use thiserror::Error;

/// Why a discovery pass produced no candidate list
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("Candidate fetch failed: {0}")]
    FetchFailed(#[from] StoreError),

    #[error("Viewer {viewer_id} has no location set")]
    LocationUnknown { viewer_id: String },
}

/// Engine-wide settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiscoveryOptions {
    pub default_radius_km: f64,
    pub candidate_cap: usize,
    pub unset_location: UnsetLocationPolicy,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            default_radius_km: DEFAULT_RADIUS_KM,
            candidate_cap: DEFAULT_CANDIDATE_CAP,
            unset_location: UnsetLocationPolicy::default(),
        }
    }
}

impl DiscoveryOptions {
    /// Parameters used when a caller does not override radius or limit
    pub fn default_params(&self) -> DiscoveryParams {
        DiscoveryParams {
            radius_km: self.default_radius_km,
            limit: self.candidate_cap,
        }
    }
}

/// Result of a refresh against a feed
#[derive(Debug)]
pub struct RefreshOutcome {
    pub generation: u64,
    /// False when a newer refresh was issued before this one finished
    pub applied: bool,
    pub result: Result<Vec<RankedCandidate>, DiscoveryError>,
}

/// Candidate discovery orchestrator
///
/// # Pipeline
/// 1. Resolve the viewer's location (per [`UnsetLocationPolicy`])
/// 2. One bounding-box query against the profile store
/// 3. In-memory filter and distance ranking
#[derive(Clone)]
pub struct DiscoveryEngine {
    fetcher: CandidateFetcher,
    options: DiscoveryOptions,
}

impl DiscoveryEngine {
    pub fn new(store: Arc<dyn ProfileStore>, options: DiscoveryOptions) -> Self {
        Self {
            fetcher: CandidateFetcher::new(store),
            options,
        }
    }

    pub fn options(&self) -> &DiscoveryOptions {
        &self.options
    }

    pub fn backend_tag(&self) -> &'static str {
        self.fetcher.backend_tag()
    }

    /// Where distances are measured from, or `None` if the viewer must be skipped
    pub fn resolve_origin(&self, viewer: &ViewerProfile) -> Option<Coordinate> {
        match (viewer.known_coordinate(), self.options.unset_location) {
            (Some(coordinate), _) => Some(coordinate),
            (None, UnsetLocationPolicy::DefaultToOrigin) => Some(Coordinate::ORIGIN),
            (None, UnsetLocationPolicy::ExcludeViewer) => None,
        }
    }

    /// Run one discovery pass for `viewer`
    ///
    /// The store query is the only suspension point. Store failures are
    /// returned as [`DiscoveryError::FetchFailed`] and not retried.
    pub async fn discover(
        &self,
        viewer: &ViewerProfile,
        params: &DiscoveryParams,
    ) -> Result<Vec<RankedCandidate>, DiscoveryError> {
        let origin = self.resolve_origin(viewer).ok_or_else(|| {
            tracing::info!("Skipping discovery for {}: no location set", viewer.id);
            DiscoveryError::LocationUnknown {
                viewer_id: viewer.id.clone(),
            }
        })?;

        let candidates = self
            .fetcher
            .fetch(origin, params.radius_km, &viewer.id, params.limit)
            .await
            .map_err(|e| {
                tracing::warn!("Candidate fetch failed for {}: {}", viewer.id, e);
                DiscoveryError::FetchFailed(e)
            })?;

        let fetched = candidates.len();
        let ranked = rank_candidates(viewer, candidates, params.radius_km);

        tracing::debug!(
            "Ranked {} of {} fetched candidates for {} (radius: {}km)",
            ranked.len(),
            fetched,
            viewer.id,
            params.radius_km
        );

        Ok(ranked)
    }

    /// Run a pass and publish it to `feed` unless a newer refresh was issued meanwhile
    pub async fn refresh(
        &self,
        feed: &CandidateFeed,
        viewer: &ViewerProfile,
        params: &DiscoveryParams,
    ) -> RefreshOutcome {
        let ticket = feed.begin_refresh().await;
        let result = self.discover(viewer, params).await;
        let applied = feed.publish(ticket, &result).await;

        RefreshOutcome {
            generation: ticket.generation(),
            applied,
            result,
        }
    }
}
