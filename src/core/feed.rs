use crate::core::engine::DiscoveryError;
use crate::models::RankedCandidate;
use serde::Serialize;
use tokio::sync::Mutex;

/// Proof that a refresh was issued, carrying its generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshTicket {
    generation: u64,
}

impl RefreshTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// State of the last published pass
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "snake_case")]
pub enum FeedStatus {
    /// Nothing published yet
    Pending,
    Ready,
    FetchFailed(String),
    LocationUnknown,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedSnapshot {
    pub generation: u64,
    pub status: FeedStatus,
    pub candidates: Vec<RankedCandidate>,
}

#[derive(Debug)]
struct FeedState {
    latest_issued: u64,
    snapshot: FeedSnapshot,
}

/// The "current candidate list" for one viewer
///
/// Every refresh takes a ticket first. Only the most recently issued ticket
/// may publish; completions from older tickets are dropped, so a slow
/// earlier pass can never overwrite a newer one.
#[derive(Debug)]
pub struct CandidateFeed {
    state: Mutex<FeedState>,
}

impl Default for CandidateFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl CandidateFeed {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(FeedState {
                latest_issued: 0,
                snapshot: FeedSnapshot {
                    generation: 0,
                    status: FeedStatus::Pending,
                    candidates: Vec::new(),
                },
            }),
        }
    }

    /// Issue the next generation
    pub async fn begin_refresh(&self) -> RefreshTicket {
        let mut state = self.state.lock().await;
        state.latest_issued += 1;
        RefreshTicket {
            generation: state.latest_issued,
        }
    }

    /// Publish the outcome of a pass; returns false if the ticket is stale
    ///
    /// A failed pass publishes an empty list with a failure status.
    pub async fn publish(
        &self,
        ticket: RefreshTicket,
        outcome: &Result<Vec<RankedCandidate>, DiscoveryError>,
    ) -> bool {
        let mut state = self.state.lock().await;

        if ticket.generation != state.latest_issued {
            tracing::debug!(
                "Discarding stale discovery result (generation {}, latest {})",
                ticket.generation,
                state.latest_issued
            );
            return false;
        }

        let (status, candidates) = match outcome {
            Ok(candidates) => (FeedStatus::Ready, candidates.clone()),
            Err(DiscoveryError::FetchFailed(e)) => (FeedStatus::FetchFailed(e.to_string()), Vec::new()),
            Err(DiscoveryError::LocationUnknown { .. }) => (FeedStatus::LocationUnknown, Vec::new()),
        };

        state.snapshot = FeedSnapshot {
            generation: ticket.generation,
            status,
            candidates,
        };

        true
    }

    pub async fn snapshot(&self) -> FeedSnapshot {
        self.state.lock().await.snapshot.clone()
    }

    /// Generation of the newest issued ticket
    pub async fn latest_generation(&self) -> u64 {
        self.state.lock().await.latest_issued
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CandidateProfile;
    use crate::services::StoreError;
    use serde_json::Map;

    fn ranked(id: &str, distance_km: f64) -> RankedCandidate {
        RankedCandidate {
            profile: CandidateProfile {
                id: id.to_string(),
                latitude: Some(0.0),
                longitude: Some(0.0),
                gender: None,
                interests: vec![],
                extra: Map::new(),
            },
            distance_km,
        }
    }

    #[tokio::test]
    async fn test_starts_pending() {
        let feed = CandidateFeed::new();
        let snapshot = feed.snapshot().await;

        assert_eq!(snapshot.generation, 0);
        assert_eq!(snapshot.status, FeedStatus::Pending);
        assert!(snapshot.candidates.is_empty());
    }

    #[tokio::test]
    async fn test_generations_increase() {
        let feed = CandidateFeed::new();
        let first = feed.begin_refresh().await;
        let second = feed.begin_refresh().await;

        assert!(second.generation() > first.generation());
        assert_eq!(feed.latest_generation().await, second.generation());
    }

    #[tokio::test]
    async fn test_stale_ticket_is_discarded() {
        let feed = CandidateFeed::new();
        let older = feed.begin_refresh().await;
        let newer = feed.begin_refresh().await;

        assert!(feed.publish(newer, &Ok(vec![ranked("new", 1.0)])).await);
        assert!(!feed.publish(older, &Ok(vec![ranked("old", 1.0)])).await);

        let snapshot = feed.snapshot().await;
        assert_eq!(snapshot.generation, newer.generation());
        assert_eq!(snapshot.candidates[0].profile.id, "new");
    }

    #[tokio::test]
    async fn test_older_completion_before_newer_is_also_discarded() {
        let feed = CandidateFeed::new();
        let older = feed.begin_refresh().await;
        let _newer = feed.begin_refresh().await;

        assert!(!feed.publish(older, &Ok(vec![ranked("old", 1.0)])).await);
        assert_eq!(feed.snapshot().await.status, FeedStatus::Pending);
    }

    #[tokio::test]
    async fn test_failure_publishes_empty_list() {
        let feed = CandidateFeed::new();
        let ok = feed.begin_refresh().await;
        feed.publish(ok, &Ok(vec![ranked("a", 1.0)])).await;

        let failed = feed.begin_refresh().await;
        let outcome = Err(DiscoveryError::FetchFailed(StoreError::Unavailable("down".into())));
        assert!(feed.publish(failed, &outcome).await);

        let snapshot = feed.snapshot().await;
        assert!(snapshot.candidates.is_empty());
        assert!(matches!(snapshot.status, FeedStatus::FetchFailed(_)));
    }
}
