// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    BoundingBox, CandidateProfile, CandidateQuery, Coordinate, DiscoveryParams, RankedCandidate,
    UnsetLocationPolicy, ViewerProfile, DEFAULT_CANDIDATE_CAP, DEFAULT_RADIUS_KM,
};
pub use requests::{FeedQuery, RefreshRequest};
pub use responses::{ErrorResponse, HealthResponse, RefreshResponse};
