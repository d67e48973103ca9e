use crate::core::{
    filters::{has_coordinate, is_not_viewer, matches_gender, shares_interests},
    geo::distance_between,
};
use crate::models::{CandidateProfile, RankedCandidate, ViewerProfile};
use std::cmp::Ordering;

/// Narrow raw candidates to the viewer's radius and preferences, nearest first
///
/// # Pipeline Stages
/// 1. Drop rows without a location (and the viewer's own row)
/// 2. Gender preference
/// 3. Shared interests
/// 4. Exact distance, dropping anything beyond `radius_km`
/// 5. Stable sort by distance
///
/// Pure and synchronous. The viewer's location falls back to (0,0) when unset;
/// callers that want to refuse such viewers check before calling.
pub fn rank_candidates(
    viewer: &ViewerProfile,
    candidates: Vec<CandidateProfile>,
    radius_km: f64,
) -> Vec<RankedCandidate> {
    let origin = viewer.coordinate_or_origin();

    let mut ranked: Vec<RankedCandidate> = candidates
        .into_iter()
        // Stage 1: Location present, not self
        .filter(|candidate| has_coordinate(candidate) && is_not_viewer(candidate, viewer))
        // Stage 2 & 3: Preferences
        .filter(|candidate| matches_gender(candidate, viewer))
        .filter(|candidate| shares_interests(candidate, viewer))
        // Stage 4: Exact-circle correction over the bounding-box over-fetch
        .filter_map(|candidate| {
            let coordinate = candidate.coordinate()?;
            let distance_km = distance_between(origin, coordinate);

            (distance_km <= radius_km).then_some(RankedCandidate {
                profile: candidate,
                distance_km,
            })
        })
        .collect();

    // Stage 5: `sort_by` is stable, equal distances keep input order
    ranked.sort_by(|a, b| {
        a.distance_km
            .partial_cmp(&b.distance_km)
            .unwrap_or(Ordering::Equal)
    });

    ranked
}
