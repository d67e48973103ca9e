// Core algorithm exports
pub mod engine;
pub mod feed;
pub mod fetcher;
pub mod filters;
pub mod geo;
pub mod ranker;

pub use engine::{DiscoveryEngine, DiscoveryError, DiscoveryOptions, RefreshOutcome};
pub use feed::{CandidateFeed, FeedSnapshot, FeedStatus, RefreshTicket};
pub use fetcher::CandidateFetcher;
pub use filters::{has_coordinate, is_not_viewer, matches_gender, shares_interests};
pub use geo::{bounding_box, bounding_box_around, distance_between, distance_km};
pub use ranker::rank_candidates;
