use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to run a discovery pass for a viewer
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RefreshRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
    #[validate(range(exclusive_min = 0.0))]
    #[serde(alias = "radius_km", rename = "radiusKm", default)]
    pub radius_km: Option<f64>,
    #[validate(range(min = 1))]
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Query string for reading a viewer's current feed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedQuery {
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
}
