//! Visiting-order planning.
//!
//! Orders attractions with a greedy nearest-neighbor walk starting at
//! the visitor's position. The result is not an optimal tour; it is
//! O(n²) in the number of attractions, which stays cheap for the tens
//! of POIs a catalog holds, so it is safe to re-run on every position
//! update.

use crate::catalog::PointOfInterest;
use crate::geo::{distance, Coordinate};

/// Order all non-sponsored POIs into a visiting sequence from `origin`.
///
/// At each step the closest remaining POI (from the last chosen stop,
/// or from `origin` for the first) is taken. Ties go to the POI that
/// appears first in `pois`. Sponsored entries are dropped. An empty or
/// all-sponsored input yields an empty itinerary.
pub fn plan(origin: Coordinate, pois: &[PointOfInterest]) -> Vec<PointOfInterest> {
    let mut remaining: Vec<&PointOfInterest> = pois.iter().filter(|p| !p.sponsored).collect();
    let mut ordered = Vec::with_capacity(remaining.len());
    let mut current = origin;

    while !remaining.is_empty() {
        let idx = nearest(&current, &remaining);
        // Vec::remove keeps input order, which the tie-break relies on
        let next = remaining.remove(idx);
        current = next.coordinate;
        ordered.push(next.clone());
    }

    ordered
}

/// Index of the candidate closest to `from`. `candidates` must be non-empty.
///
/// Only a strictly smaller distance replaces the best so far, so the
/// first of several equidistant candidates wins. A NaN distance never
/// wins, which keeps the walk total on malformed input.
fn nearest(from: &Coordinate, candidates: &[&PointOfInterest]) -> usize {
    let mut best_idx = 0;
    let mut best_dist = distance(from, &candidates[0].coordinate);

    for (i, candidate) in candidates.iter().enumerate().skip(1) {
        let d = distance(from, &candidate.coordinate);
        if d < best_dist || (best_dist.is_nan() && !d.is_nan()) {
            best_idx = i;
            best_dist = d;
        }
    }

    best_idx
}
