use crate::models::{CandidateProfile, ViewerProfile};

/// The candidate has both halves of a location
#[inline]
pub fn has_coordinate(candidate: &CandidateProfile) -> bool {
    candidate.coordinate().is_some()
}

/// Check the viewer's "show me" gender preference
///
/// An empty preference accepts everyone; a candidate without a gender is
/// never a member of a non-empty preference.
#[inline]
pub fn matches_gender(candidate: &CandidateProfile, viewer: &ViewerProfile) -> bool {
    if viewer.show_me.is_empty() {
        return true;
    }

    candidate
        .gender
        .as_ref()
        .is_some_and(|gender| viewer.show_me.contains(gender))
}

/// Check for at least one shared interest
///
/// Only applied when both sides declared interests. A candidate with no
/// interests is not a mismatch.
#[inline]
pub fn shares_interests(candidate: &CandidateProfile, viewer: &ViewerProfile) -> bool {
    if viewer.interests.is_empty() || candidate.interests.is_empty() {
        return true;
    }

    candidate
        .interests
        .iter()
        .any(|interest| viewer.interests.contains(interest))
}

/// Check if the candidate is someone other than the viewer
#[inline]
pub fn is_not_viewer(candidate: &CandidateProfile, viewer: &ViewerProfile) -> bool {
    candidate.id != viewer.id
}
