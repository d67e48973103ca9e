use crate::core::CandidateFeed;
use crate::models::ViewerProfile;
use std::sync::Arc;
use std::time::Duration;

/// In-process cache of viewer profiles
///
/// A refresh needs the viewer's location and preferences; caching them saves
/// one store round-trip per refresh. Entries expire after the configured TTL,
/// so preference edits show up without an explicit invalidation.
#[derive(Clone)]
pub struct ViewerCache {
    entries: moka::future::Cache<String, ViewerProfile>,
}

impl ViewerCache {
    /// Create a new viewer cache
    pub fn new(capacity: u64, ttl_secs: u64) -> Self {
        let entries = moka::future::CacheBuilder::new(capacity)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self { entries }
    }

    pub async fn get(&self, user_id: &str) -> Option<ViewerProfile> {
        let key = CacheKey::viewer(user_id);
        let hit = self.entries.get(&key).await;
        tracing::trace!("Viewer cache {}: {}", if hit.is_some() { "hit" } else { "miss" }, key);
        hit
    }

    pub async fn insert(&self, viewer: ViewerProfile) {
        let key = CacheKey::viewer(&viewer.id);
        self.entries.insert(key, viewer).await;
    }

    pub async fn invalidate(&self, user_id: &str) {
        self.entries.invalidate(&CacheKey::viewer(user_id)).await;
        tracing::debug!("Invalidated cached viewer: {}", user_id);
    }
}

/// One candidate feed per viewer
///
/// Feeds idle for longer than the TTL are dropped; the next refresh starts
/// a fresh feed at generation zero.
#[derive(Clone)]
pub struct FeedRegistry {
    feeds: moka::future::Cache<String, Arc<CandidateFeed>>,
}

impl FeedRegistry {
    pub fn new(capacity: u64, idle_secs: u64) -> Self {
        let feeds = moka::future::CacheBuilder::new(capacity)
            .time_to_idle(Duration::from_secs(idle_secs))
            .build();

        Self { feeds }
    }

    /// The viewer's feed, created on first use
    pub async fn feed_for(&self, user_id: &str) -> Arc<CandidateFeed> {
        self.feeds
            .get_with(CacheKey::feed(user_id), async { Arc::new(CandidateFeed::new()) })
            .await
    }

    /// The viewer's feed if one exists
    pub async fn existing(&self, user_id: &str) -> Option<Arc<CandidateFeed>> {
        self.feeds.get(&CacheKey::feed(user_id)).await
    }
}

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    /// Build a cache key for a viewer profile
    pub fn viewer(user_id: &str) -> String {
        format!("viewer:{}", user_id)
    }

    /// Build a key for a viewer's candidate feed
    pub fn feed(user_id: &str) -> String {
        format!("feed:{}", user_id)
    }
}
