// Unit tests for Candidate Discovery

use candidate_discovery::core::{
    filters::{matches_gender, shares_interests},
    geo::{bounding_box, distance_km},
    ranker::rank_candidates,
};
use candidate_discovery::models::{CandidateProfile, Coordinate, ViewerProfile};
use serde_json::Map;

/// Point reached by travelling `distance` km from (lat, lon) on `bearing_deg`
fn destination(lat: f64, lon: f64, bearing_deg: f64, distance: f64) -> (f64, f64) {
    let delta = distance / 6371.0;
    let theta = bearing_deg.to_radians();
    let phi1 = lat.to_radians();
    let lambda1 = lon.to_radians();

    let phi2 = (phi1.sin() * delta.cos() + phi1.cos() * delta.sin() * theta.cos()).asin();
    let lambda2 = lambda1
        + (theta.sin() * delta.sin() * phi1.cos()).atan2(delta.cos() - phi1.sin() * phi2.sin());

    (phi2.to_degrees(), lambda2.to_degrees())
}

fn candidate(id: &str, lat: Option<f64>, lon: Option<f64>, gender: &str, interests: &[&str]) -> CandidateProfile {
    CandidateProfile {
        id: id.to_string(),
        latitude: lat,
        longitude: lon,
        gender: Some(gender.to_string()),
        interests: interests.iter().map(|s| s.to_string()).collect(),
        extra: Map::new(),
    }
}

fn viewer(lat: f64, lon: f64, show_me: &[&str], interests: &[&str]) -> ViewerProfile {
    ViewerProfile {
        id: "viewer".to_string(),
        latitude: Some(lat),
        longitude: Some(lon),
        show_me: show_me.iter().map(|s| s.to_string()).collect(),
        interests: interests.iter().map(|s| s.to_string()).collect(),
    }
}

#[test]
fn test_distance_symmetry() {
    let points = [
        (0.0, 0.0),
        (40.7128, -74.0060),
        (-33.8688, 151.2093),
        (64.1466, -21.9426),
        (-54.8019, -68.3030),
    ];

    for &(lat1, lon1) in &points {
        for &(lat2, lon2) in &points {
            let ab = distance_km(lat1, lon1, lat2, lon2);
            let ba = distance_km(lat2, lon2, lat1, lon1);
            assert!((ab - ba).abs() < 1e-9, "{:?} -> {:?}: {} vs {}", (lat1, lon1), (lat2, lon2), ab, ba);
            assert!(ab >= 0.0);
        }
    }
}

#[test]
fn test_distance_zero_for_same_point() {
    for &(lat, lon) in &[(0.0, 0.0), (89.9, 179.9), (-45.5, 12.25), (51.5074, -0.1278)] {
        assert_eq!(distance_km(lat, lon, lat, lon), 0.0);
    }
}

#[test]
fn test_distance_new_york_to_los_angeles() {
    let distance = distance_km(40.7128, -74.0060, 34.0522, -118.2437);
    assert!((distance - 3944.0).abs() < 100.0, "Expected ~3944km, got {}", distance);
}

#[test]
fn test_bounding_box_contains_circle() {
    // The longitude degree length is the WGS84 equatorial value, a little
    // longer than the 6371 km sphere's, so due east/west the box edge sits
    // about 0.11% inside the true radius.
    let inner = 0.998;

    for &(lat, lon) in &[(0.0, 0.0), (40.7128, -74.0060), (-33.8688, 151.2093), (60.0, 10.0)] {
        for &radius in &[1.0, 10.0, 50.0, 200.0] {
            let bbox = bounding_box(lat, lon, radius);

            for step in 0..72 {
                let bearing = step as f64 * 5.0;
                for &fraction in &[0.25, 0.5, 0.9, inner] {
                    let (plat, plon) = destination(lat, lon, bearing, radius * fraction);
                    assert!(distance_km(lat, lon, plat, plon) <= radius);
                    assert!(
                        bbox.contains(Coordinate::new(plat, plon)),
                        "center {:?} radius {} bearing {} fraction {} -> {:?} outside {:?}",
                        (lat, lon),
                        radius,
                        bearing,
                        fraction,
                        (plat, plon),
                        bbox
                    );
                }
            }
        }
    }
}

#[test]
fn test_bounding_box_latitude_never_tighter_than_circle() {
    let bbox = bounding_box(45.0, 7.0, 50.0);

    for bearing in [0.0, 180.0] {
        let (plat, plon) = destination(45.0, 7.0, bearing, 50.0);
        assert!(bbox.contains(Coordinate::new(plat, plon)));
    }
}

#[test]
fn test_bounding_box_east_west_edge_falls_short_of_radius() {
    for &(lat, radius) in &[(0.0, 50.0), (45.0, 50.0), (-33.8688, 200.0)] {
        let bbox = bounding_box(lat, 10.0, radius);

        for bearing in [90.0, 270.0] {
            let (plat, plon) = destination(lat, 10.0, bearing, radius);
            assert!((distance_km(lat, 10.0, plat, plon) - radius).abs() < 1e-6);
            assert!(
                !bbox.contains(Coordinate::new(plat, plon)),
                "point at exactly {}km bearing {} from lat {} unexpectedly inside {:?}",
                radius,
                bearing,
                lat,
                bbox
            );
        }

        // The gap is the ratio between 111.320 and the sphere's 111.195 km per degree
        let (_, plon) = destination(lat, 10.0, 90.0, radius);
        let overshoot = (plon - bbox.max_lon) / (bbox.max_lon - 10.0);
        assert!(overshoot > 0.0 && overshoot < 0.0015, "overshoot {}", overshoot);
    }
}

#[test]
fn test_gender_filter() {
    let v = viewer(0.0, 0.0, &["Woman", "Non-binary"], &[]);

    assert!(matches_gender(&candidate("1", Some(0.0), Some(0.0), "Non-binary", &[]), &v));
    assert!(!matches_gender(&candidate("2", Some(0.0), Some(0.0), "Man", &[]), &v));
}

#[test]
fn test_interest_asymmetry() {
    let v = viewer(0.0, 0.0, &[], &["Music"]);

    // No declared interests is not a mismatch
    assert!(shares_interests(&candidate("1", Some(0.0), Some(0.0), "Woman", &[]), &v));
    // Declared but disjoint interests are
    assert!(!shares_interests(&candidate("2", Some(0.0), Some(0.0), "Woman", &["Art"]), &v));
}

#[test]
fn test_ranking_is_idempotent() {
    let v = viewer(52.37, 4.89, &["Woman"], &["Music"]);
    let raw: Vec<CandidateProfile> = (0..40)
        .map(|i| {
            candidate(
                &i.to_string(),
                Some(52.37 + (i % 7) as f64 * 0.05),
                Some(4.89 - (i % 5) as f64 * 0.05),
                if i % 3 == 0 { "Man" } else { "Woman" },
                if i % 4 == 0 { &["Art"] } else { &["Music"] },
            )
        })
        .collect();

    let first = rank_candidates(&v, raw.clone(), 20.0);
    let second = rank_candidates(&v, raw, 20.0);

    assert!(!first.is_empty());
    assert_eq!(first, second);
}

#[test]
fn test_ranked_output_invariants() {
    let v = viewer(48.8566, 2.3522, &[], &[]);
    let mut raw: Vec<CandidateProfile> = (0..60)
        .map(|i| {
            let (lat, lon) = destination(48.8566, 2.3522, (i * 37 % 360) as f64, (i % 15) as f64 * 5.0);
            candidate(&format!("c{}", i), Some(lat), Some(lon), "Woman", &[])
        })
        .collect();
    raw.push(candidate("viewer", Some(48.8566), Some(2.3522), "Woman", &[]));
    raw.push(candidate("no_lon", Some(48.8566), None, "Woman", &[]));

    let radius = 40.0;
    let ranked = rank_candidates(&v, raw, radius);

    assert!(!ranked.is_empty());
    assert!(ranked.iter().all(|r| r.profile.id != "viewer"));
    assert!(ranked.iter().all(|r| r.profile.coordinate().is_some()));
    assert!(ranked.iter().all(|r| r.distance_km <= radius));
    assert!(ranked.windows(2).all(|w| w[0].distance_km <= w[1].distance_km));
}
