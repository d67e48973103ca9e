use crate::models::{CandidateProfile, CandidateQuery, ViewerProfile};
use crate::services::store::{ProfileStore, StoreError};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;

/// Supabase (PostgREST) client for the profiles table
///
/// Handles the two reads discovery needs:
/// - Fetching the viewer's own row
/// - Querying candidate rows inside a bounding box
pub struct SupabaseClient {
    base_url: String,
    api_key: String,
    profiles_table: String,
    client: Client,
}

impl SupabaseClient {
    /// Create a new Supabase client
    pub fn new(
        base_url: String,
        api_key: String,
        profiles_table: String,
        timeout: Duration,
    ) -> Result<Self, StoreError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url,
            api_key,
            profiles_table,
            client,
        })
    }

    fn table_url(&self) -> String {
        format!(
            "{}/rest/v1/{}",
            self.base_url.trim_end_matches('/'),
            self.profiles_table
        )
    }

    /// Build the PostgREST filter for a candidate query
    ///
    /// Latitude and longitude each appear twice; PostgREST ANDs repeated
    /// column filters.
    pub fn candidate_filter(query: &CandidateQuery) -> Vec<(String, String)> {
        let bbox = &query.bounding_box;
        vec![
            ("select".to_string(), "*".to_string()),
            ("latitude".to_string(), format!("gte.{}", bbox.min_lat)),
            ("latitude".to_string(), format!("lte.{}", bbox.max_lat)),
            ("longitude".to_string(), format!("gte.{}", bbox.min_lon)),
            ("longitude".to_string(), format!("lte.{}", bbox.max_lon)),
            ("id".to_string(), format!("neq.{}", query.exclude_id)),
            ("limit".to_string(), query.limit.to_string()),
        ]
    }

    fn encode_query(params: &[(String, String)]) -> String {
        params
            .iter()
            .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&")
    }

    async fn get_rows(&self, params: &[(String, String)]) -> Result<Response, StoreError> {
        let url = format!("{}?{}", self.table_url(), Self::encode_query(params));

        tracing::debug!("Querying profiles: {}", url);

        let response = self
            .client
            .get(&url)
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Accept", "application/json")
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(response),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(StoreError::Unauthorized),
            status => {
                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unable to read body".to_string());
                tracing::error!("Profile query failed: {} - {}", status, body);
                Err(StoreError::ApiError(format!("Failed to query profiles: {}", status)))
            }
        }
    }
}

#[async_trait]
impl ProfileStore for SupabaseClient {
    fn backend_tag(&self) -> &'static str {
        "supabase"
    }

    async fn query_candidates(&self, query: &CandidateQuery) -> Result<Vec<CandidateProfile>, StoreError> {
        let response = self.get_rows(&Self::candidate_filter(query)).await?;

        let profiles: Vec<CandidateProfile> = response
            .json()
            .await
            .map_err(|e| StoreError::InvalidResponse(format!("Failed to parse candidates: {}", e)))?;

        tracing::debug!("Queried {} candidates (limit: {})", profiles.len(), query.limit);

        Ok(profiles)
    }

    async fn fetch_viewer(&self, user_id: &str) -> Result<ViewerProfile, StoreError> {
        let params = vec![
            ("select".to_string(), "*".to_string()),
            ("id".to_string(), format!("eq.{}", user_id)),
            ("limit".to_string(), "1".to_string()),
        ];

        tracing::debug!("Fetching viewer profile for user: {}", user_id);

        let response = self.get_rows(&params).await?;

        let rows: Vec<ViewerProfile> = response
            .json()
            .await
            .map_err(|e| StoreError::InvalidResponse(format!("Failed to parse profile: {}", e)))?;

        rows.into_iter()
            .next()
            .ok_or_else(|| StoreError::NotFound(format!("Profile not found for user {}", user_id)))
    }
}
