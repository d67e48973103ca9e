use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A latitude/longitude pair in decimal degrees (WGS84)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub const ORIGIN: Coordinate = Coordinate { latitude: 0.0, longitude: 0.0 };

    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// Geospatial bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    /// Inclusive on every edge
    #[inline]
    pub fn contains(&self, coordinate: Coordinate) -> bool {
        coordinate.latitude >= self.min_lat
            && coordinate.latitude <= self.max_lat
            && coordinate.longitude >= self.min_lon
            && coordinate.longitude <= self.max_lon
    }
}

/// The current user's attributes relevant to discovery
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewerProfile {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    /// Genders the viewer wants to see; empty means no filter
    #[serde(rename = "show_me", alias = "showMe", default, deserialize_with = "null_as_empty")]
    pub show_me: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub interests: Vec<String>,
}

impl ViewerProfile {
    /// The stored location, or `None` when it is absent or left at (0,0)
    pub fn known_coordinate(&self) -> Option<Coordinate> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) if !(lat == 0.0 && lon == 0.0) => Some(Coordinate::new(lat, lon)),
            _ => None,
        }
    }

    /// The coordinate distances are measured from; unknown locations fall back to (0,0)
    pub fn coordinate_or_origin(&self) -> Coordinate {
        self.known_coordinate().unwrap_or(Coordinate::ORIGIN)
    }
}

/// A prospective match as returned by the profile store
///
/// Columns the engine does not look at are kept in `extra` and serialized
/// back out unchanged, so callers get the full row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateProfile {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub interests: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CandidateProfile {
    /// Both halves of the location, if the row has them
    pub fn coordinate(&self) -> Option<Coordinate> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some(Coordinate::new(lat, lon)),
            _ => None,
        }
    }
}

/// A candidate that survived filtering, with its distance from the viewer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedCandidate {
    #[serde(flatten)]
    pub profile: CandidateProfile,
    #[serde(rename = "distanceKm")]
    pub distance_km: f64,
}

/// Candidate query handed to the profile store
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateQuery {
    pub bounding_box: BoundingBox,
    pub exclude_id: String,
    pub limit: usize,
}

/// Per-request discovery parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiscoveryParams {
    pub radius_km: f64,
    pub limit: usize,
}

pub const DEFAULT_RADIUS_KM: f64 = 50.0;
pub const DEFAULT_CANDIDATE_CAP: usize = 200;

impl Default for DiscoveryParams {
    fn default() -> Self {
        Self {
            radius_km: DEFAULT_RADIUS_KM,
            limit: DEFAULT_CANDIDATE_CAP,
        }
    }
}

/// What to do with a viewer whose location was never set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnsetLocationPolicy {
    /// Measure from (0,0), the historical behavior
    #[default]
    DefaultToOrigin,
    /// Refuse to run discovery until the viewer has a location
    ExcludeViewer,
}

/// Row ids may be text/uuid or integer keys; both are carried as strings
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(id) => Ok(id),
        Value::Number(id) => Ok(id.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "invalid profile id: expected a string or number, got {}",
            other
        ))),
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}
