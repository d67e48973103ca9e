//! Candidate Discovery - geo-filtered candidate discovery for a dating app
//!
//! Given a viewer's location and preferences, fetches nearby profiles from
//! the backend with one bounding-box query, then filters them to the exact
//! radius and the viewer's preferences and orders them by distance.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use self::core::{
    bounding_box, distance_km, rank_candidates, CandidateFeed, DiscoveryEngine, DiscoveryError,
    DiscoveryOptions,
};
pub use models::{BoundingBox, CandidateProfile, Coordinate, DiscoveryParams, RankedCandidate, ViewerProfile};
pub use services::{ProfileStore, StoreError};
