//! Legs and itineraries.
//!
//! Turns an ordered list of stops into straight-line walking legs. No
//! road network is consulted: each leg's geometry is just its two
//! endpoints, its distance is the great-circle distance and its
//! duration comes from the walking-speed model.

use serde::Serialize;

use crate::catalog::PointOfInterest;
use crate::geo::{distance, Coordinate};
use crate::planner;
use crate::speed::SpeedModel;

/// One segment of the walk between two consecutive stops.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Leg {
    pub from: Coordinate,
    pub to: Coordinate,
    /// Path to draw, start to end. Currently always `[from, to]`.
    pub geometry: Vec<Coordinate>,
    pub distance_m: f64,
    pub duration_s: f64,
}

impl Leg {
    /// Straight-line leg between two coordinates.
    pub fn straight(from: Coordinate, to: Coordinate, speed: &SpeedModel) -> Self {
        let distance_m = distance(&from, &to);
        Self {
            from,
            to,
            geometry: vec![from, to],
            distance_m,
            duration_s: speed.estimate_duration(distance_m),
        }
    }
}

/// Build one leg per stop with the default walking pace.
///
/// The first leg runs from `origin` to the first stop, each following
/// leg from the previous stop to the next.
pub fn build_legs(origin: Coordinate, stops: &[PointOfInterest]) -> Vec<Leg> {
    build_legs_with(origin, stops, &SpeedModel::default())
}

/// Like [`build_legs`] with an explicit speed model.
pub fn build_legs_with(origin: Coordinate, stops: &[PointOfInterest], speed: &SpeedModel) -> Vec<Leg> {
    let mut from = origin;
    stops
        .iter()
        .map(|stop| {
            let leg = Leg::straight(from, stop.coordinate, speed);
            from = stop.coordinate;
            leg
        })
        .collect()
}

/// Ordered stops with their parallel legs.
///
/// `legs[i]` ends at `stops[i]`; both always have the same length.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Itinerary {
    stops: Vec<PointOfInterest>,
    legs: Vec<Leg>,
}

impl Itinerary {
    /// Plan a visiting order from `origin` and derive its legs.
    pub fn plan(origin: Coordinate, pois: &[PointOfInterest], speed: &SpeedModel) -> Self {
        let stops = planner::plan(origin, pois);
        let legs = build_legs_with(origin, &stops, speed);
        Self { stops, legs }
    }

    pub fn stops(&self) -> &[PointOfInterest] {
        &self.stops
    }

    pub fn legs(&self) -> &[Leg] {
        &self.legs
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    pub fn total_distance_m(&self) -> f64 {
        self.legs.iter().map(|l| l.distance_m).sum()
    }

    pub fn total_duration_s(&self) -> f64 {
        self.legs.iter().map(|l| l.duration_s).sum()
    }
}
