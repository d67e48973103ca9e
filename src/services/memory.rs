use crate::models::{CandidateProfile, CandidateQuery, ViewerProfile};
use crate::services::store::{ProfileStore, StoreError};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;

/// Profile store backed by in-process vectors
///
/// Applies the same bounding-box, id and limit filter a real backend would.
/// Can be told to fail or stall, which is how tests drive the error and
/// concurrency paths.
#[derive(Default)]
pub struct InMemoryProfileStore {
    candidates: RwLock<Vec<CandidateProfile>>,
    viewers: RwLock<Vec<ViewerProfile>>,
    failing: AtomicBool,
    query_delay: RwLock<Duration>,
    query_calls: AtomicU64,
}

impl InMemoryProfileStore {
    pub fn new(candidates: Vec<CandidateProfile>, viewers: Vec<ViewerProfile>) -> Self {
        Self {
            candidates: RwLock::new(candidates),
            viewers: RwLock::new(viewers),
            ..Self::default()
        }
    }

    /// Make every subsequent call fail with `StoreError::Unavailable`
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Delay every subsequent candidate query
    pub async fn set_query_delay(&self, delay: Duration) {
        *self.query_delay.write().await = delay;
    }

    pub async fn replace_candidates(&self, candidates: Vec<CandidateProfile>) {
        *self.candidates.write().await = candidates;
    }

    pub async fn upsert_viewer(&self, viewer: ViewerProfile) {
        let mut viewers = self.viewers.write().await;
        viewers.retain(|v| v.id != viewer.id);
        viewers.push(viewer);
    }

    /// Number of candidate queries served or attempted
    pub fn query_calls(&self) -> u64 {
        self.query_calls.load(Ordering::Relaxed)
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("in-memory store set to fail".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    fn backend_tag(&self) -> &'static str {
        "memory"
    }

    async fn query_candidates(&self, query: &CandidateQuery) -> Result<Vec<CandidateProfile>, StoreError> {
        let delay = *self.query_delay.read().await;
        self.query_calls.fetch_add(1, Ordering::Relaxed);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.check_available()?;

        let rows = self
            .candidates
            .read()
            .await
            .iter()
            .filter(|c| c.id != query.exclude_id)
            .filter(|c| c.coordinate().is_some_and(|coord| query.bounding_box.contains(coord)))
            .take(query.limit)
            .cloned()
            .collect();

        Ok(rows)
    }

    async fn fetch_viewer(&self, user_id: &str) -> Result<ViewerProfile, StoreError> {
        self.check_available()?;

        self.viewers
            .read()
            .await
            .iter()
            .find(|v| v.id == user_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("Profile not found for user {}", user_id)))
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        Ok(!self.failing.load(Ordering::SeqCst))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geo::bounding_box;
    use serde_json::Map;

    fn create_candidate(id: &str, lat: Option<f64>, lon: Option<f64>) -> CandidateProfile {
        CandidateProfile {
            id: id.to_string(),
            latitude: lat,
            longitude: lon,
            gender: None,
            interests: vec![],
            extra: Map::new(),
        }
    }

    #[tokio::test]
    async fn test_query_applies_box_id_and_limit() {
        let store = InMemoryProfileStore::new(
            vec![
                create_candidate("me", Some(0.0), Some(0.0)),
                create_candidate("inside1", Some(0.1), Some(0.1)),
                create_candidate("outside", Some(5.0), Some(5.0)),
                create_candidate("no_location", None, None),
                create_candidate("inside2", Some(-0.1), Some(0.0)),
                create_candidate("inside3", Some(0.0), Some(-0.2)),
            ],
            vec![],
        );

        let query = CandidateQuery {
            bounding_box: bounding_box(0.0, 0.0, 50.0),
            exclude_id: "me".to_string(),
            limit: 2,
        };
        let rows = store.query_candidates(&query).await.unwrap();
        let ids: Vec<&str> = rows.iter().map(|r| r.id.as_str()).collect();

        assert_eq!(ids, vec!["inside1", "inside2"]);
        assert_eq!(store.query_calls(), 1);
    }

    #[tokio::test]
    async fn test_failing_store() {
        let store = InMemoryProfileStore::default();
        store.set_failing(true);

        assert!(matches!(store.fetch_viewer("me").await, Err(StoreError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_missing_viewer() {
        let store = InMemoryProfileStore::default();
        assert!(matches!(store.fetch_viewer("me").await, Err(StoreError::NotFound(_))));
    }
}
