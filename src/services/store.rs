use crate::models::{CandidateProfile, CandidateQuery, ViewerProfile};
use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur when reading from a profile store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Unauthorized: invalid API key or token")]
    Unauthorized,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Read access to profile rows held by the backend
///
/// Row-level access control is the backend's job; implementations return
/// whatever the backend lets them see.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Short name used in logs and the health endpoint
    fn backend_tag(&self) -> &'static str;

    /// Rows inside the bounding box, excluding `query.exclude_id`, at most `query.limit`
    async fn query_candidates(&self, query: &CandidateQuery) -> Result<Vec<CandidateProfile>, StoreError>;

    /// The viewer's own row, read before a discovery pass
    async fn fetch_viewer(&self, user_id: &str) -> Result<ViewerProfile, StoreError>;

    /// Whether the backend is reachable
    async fn health_check(&self) -> Result<bool, StoreError> {
        Ok(true)
    }
}
