//! Live navigation state.
//!
//! [`NavigationState`] owns the last catalog, position and heading it
//! was given, the itinerary planned from them, and a cursor on the
//! current destination. It is a plain single-owner value: hosts that
//! feed it from several threads must serialise access themselves.
//!
//! Every catalog or position change replans from scratch. The cursor
//! survives a replan (clamped to the new length) so GPS jitter does not
//! send the visitor back to the first stop. Heading changes never
//! replan.

use log::{debug, trace};
use serde::Serialize;

use crate::catalog::PointOfInterest;
use crate::config::EngineConfig;
use crate::geo::{angle_between, bearing, distance, normalize_heading, Coordinate};
use crate::route::{Itinerary, Leg};

/// Whether there is anything to navigate to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Phase {
    Empty,
    Active { cursor: usize },
}

/// Outcome of an advance or rewind request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum Step {
    /// The cursor moved to `cursor`.
    Moved { cursor: usize },
    /// Already at the first or last stop; the cursor did not move.
    Boundary { cursor: usize },
    /// No itinerary.
    Empty,
}

impl Step {
    pub fn moved(&self) -> bool {
        matches!(self, Step::Moved { .. })
    }
}

/// Coarse direction of the destination relative to where the visitor faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Pointer {
    Ahead,
    SlightLeft,
    Left,
    SlightRight,
    Right,
    Behind,
}

impl Pointer {
    /// Classify a relative angle in degrees; positive is to the right.
    pub fn from_relative(angle: f64) -> Self {
        let abs_angle = angle.abs();

        if abs_angle > 150.0 {
            Pointer::Behind
        } else if abs_angle > 60.0 {
            if angle > 0.0 { Pointer::Right } else { Pointer::Left }
        } else if abs_angle > 20.0 {
            if angle > 0.0 { Pointer::SlightRight } else { Pointer::SlightLeft }
        } else {
            Pointer::Ahead
        }
    }
}

/// What the "next destination" panel shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Guidance {
    pub destination_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination_name: Option<String>,
    /// Straight-line distance from the current position, in meters.
    pub distance_m: f64,
    pub duration_s: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pointer: Option<Pointer>,
    pub text: String,
}

/// Serialisable view of the whole state.
#[derive(Debug, Serialize)]
pub struct Snapshot<'a> {
    #[serde(flatten)]
    pub phase: Phase,
    pub origin: Coordinate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heading: Option<f64>,
    pub stops: &'a [PointOfInterest],
    pub legs: &'a [Leg],
    pub total_distance_m: f64,
    pub total_duration_s: f64,
    pub remaining_distance_m: f64,
    pub remaining_duration_s: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guidance: Option<Guidance>,
}

/// Itinerary plus cursor for one navigation session.
#[derive(Debug, Clone, Default)]
pub struct NavigationState {
    config: EngineConfig,
    catalog: Vec<PointOfInterest>,
    origin: Option<Coordinate>,
    heading: Option<f64>,
    itinerary: Itinerary,
    cursor: Option<usize>,
}

impl NavigationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Replace both catalog and position, then replan.
    pub fn set_catalog_or_origin(
        &mut self,
        pois: impl Into<Vec<PointOfInterest>>,
        origin: Coordinate,
    ) -> Phase {
        self.catalog = pois.into();
        self.origin = Some(origin);
        self.replan()
    }

    /// Replace the catalog and replan from the last known position.
    pub fn set_catalog(&mut self, pois: impl Into<Vec<PointOfInterest>>) -> Phase {
        self.catalog = pois.into();
        self.replan()
    }

    /// Record a new position fix and replan against the cached catalog.
    pub fn update_position(&mut self, position: Coordinate) -> Phase {
        self.origin = Some(position);
        self.replan()
    }

    /// Record a compass reading. A non-finite reading clears the heading.
    pub fn update_heading(&mut self, degrees: f64) -> Option<f64> {
        self.heading = normalize_heading(degrees);
        trace!("heading {:?}", self.heading);
        self.heading
    }

    /// Move to the next destination.
    pub fn advance(&mut self) -> Step {
        match self.cursor {
            None => Step::Empty,
            Some(c) if c + 1 < self.itinerary.len() => {
                self.cursor = Some(c + 1);
                Step::Moved { cursor: c + 1 }
            }
            Some(c) => {
                debug!("advance ignored, already at last stop {c}");
                Step::Boundary { cursor: c }
            }
        }
    }

    /// Move back to the previous destination.
    pub fn rewind(&mut self) -> Step {
        match self.cursor {
            None => Step::Empty,
            Some(c) if c > 0 => {
                self.cursor = Some(c - 1);
                Step::Moved { cursor: c - 1 }
            }
            Some(c) => {
                debug!("rewind ignored, already at first stop");
                Step::Boundary { cursor: c }
            }
        }
    }

    pub fn phase(&self) -> Phase {
        match self.cursor {
            Some(cursor) => Phase::Active { cursor },
            None => Phase::Empty,
        }
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn itinerary(&self) -> &Itinerary {
        &self.itinerary
    }

    /// Position planning starts from: the last fix, or the configured default.
    pub fn origin(&self) -> Coordinate {
        self.config.origin_or_default(self.origin)
    }

    pub fn heading(&self) -> Option<f64> {
        self.heading
    }

    pub fn current_destination(&self) -> Option<&PointOfInterest> {
        self.cursor.map(|c| &self.itinerary.stops()[c])
    }

    /// The leg ending at the current destination.
    pub fn current_leg(&self) -> Option<&Leg> {
        self.cursor.map(|c| &self.itinerary.legs()[c])
    }

    /// Length of the legs from the current one to the end of the itinerary.
    pub fn remaining_distance_m(&self) -> f64 {
        self.remaining_legs().iter().map(|l| l.distance_m).sum()
    }

    pub fn remaining_duration_s(&self) -> f64 {
        self.remaining_legs().iter().map(|l| l.duration_s).sum()
    }

    /// Angle from the facing direction to the current destination, in
    /// (-180, 180]; positive means the destination is to the right.
    pub fn relative_bearing(&self) -> Option<f64> {
        let heading = self.heading?;
        let destination = self.current_destination()?;
        Some(angle_between(heading, bearing(&self.origin(), &destination.coordinate)))
    }

    pub fn pointer(&self) -> Option<Pointer> {
        self.relative_bearing().map(Pointer::from_relative)
    }

    pub fn guidance(&self) -> Option<Guidance> {
        let destination = self.current_destination()?;
        let distance_m = distance(&self.origin(), &destination.coordinate);
        let duration_s = self.config.speed.estimate_duration(distance_m);

        Some(Guidance {
            destination_id: destination.id.clone(),
            destination_name: destination.name.clone(),
            distance_m,
            duration_s,
            pointer: self.pointer(),
            text: format!(
                "{}: {}, about {}",
                destination.label(),
                format_distance(distance_m),
                format_duration(duration_s)
            ),
        })
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            phase: self.phase(),
            origin: self.origin(),
            heading: self.heading,
            stops: self.itinerary.stops(),
            legs: self.itinerary.legs(),
            total_distance_m: self.itinerary.total_distance_m(),
            total_duration_s: self.itinerary.total_duration_s(),
            remaining_distance_m: self.remaining_distance_m(),
            remaining_duration_s: self.remaining_duration_s(),
            guidance: self.guidance(),
        }
    }

    fn remaining_legs(&self) -> &[Leg] {
        match self.cursor {
            Some(c) => &self.itinerary.legs()[c..],
            None => &[],
        }
    }

    fn replan(&mut self) -> Phase {
        let origin = self.origin();
        let itinerary = Itinerary::plan(origin, &self.catalog, &self.config.speed);

        let previous = self.cursor;
        self.cursor = match (itinerary.len(), previous) {
            (0, _) => None,
            (len, Some(c)) => Some(c.min(len - 1)),
            (_, None) => Some(0),
        };
        if let (Some(before), Some(after)) = (previous, self.cursor) {
            if before != after {
                debug!("cursor clamped from {before} to {after}");
            }
        }

        debug!(
            "replanned {} stops from ({:.5}, {:.5}), {:.0} m total",
            itinerary.len(),
            origin.lat,
            origin.lon,
            itinerary.total_distance_m()
        );
        self.itinerary = itinerary;
        self.phase()
    }
}

/// Distance for the panel: whole tens of meters below a kilometer,
/// tenths of a kilometer above. The unit is picked after rounding so
/// 999.6 m reads "1.0 km", not "1000 m".
fn format_distance(meters: f64) -> String {
    let tens = (meters / 10.0).round() as i64;
    if tens >= 100 {
        format!("{:.1} km", meters / 1000.0)
    } else {
        format!("{} m", tens * 10)
    }
}

/// Walking time for the panel, in whole minutes (at least one).
fn format_duration(seconds: f64) -> String {
    let minutes = ((seconds / 60.0).round() as i64).max(1);
    match (minutes / 60, minutes % 60) {
        (0, m) => format!("{m} min"),
        (h, 0) => format!("{h} h"),
        (h, m) => format!("{h} h {m} min"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(lat: f64, lon: f64) -> Coordinate {
        Coordinate::new(lat, lon)
    }

    fn poi(id: &str, lat: f64, lon: f64) -> PointOfInterest {
        PointOfInterest::new(id, pt(lat, lon))
    }

    /// Five stops strung out east of the origin, visited west to east.
    fn five_stops() -> Vec<PointOfInterest> {
        (1..=5).map(|i| poi(&format!("s{i}"), 0.0, i as f64 * 0.01)).collect()
    }

    fn active(cursor: usize) -> Phase {
        Phase::Active { cursor }
    }

    #[test]
    fn starts_empty() {
        let mut nav = NavigationState::new();
        assert_eq!(nav.phase(), Phase::Empty);
        assert_eq!(nav.advance(), Step::Empty);
        assert_eq!(nav.rewind(), Step::Empty);
        assert!(nav.current_destination().is_none());
        assert!(nav.guidance().is_none());
    }

    #[test]
    fn empty_catalog_stays_empty() {
        let mut nav = NavigationState::new();
        assert_eq!(nav.set_catalog_or_origin(Vec::<PointOfInterest>::new(), pt(0.0, 0.0)), Phase::Empty);
        assert!(nav.itinerary().is_empty());
        assert!(nav.itinerary().legs().is_empty());
        assert_eq!(nav.remaining_distance_m(), 0.0);
    }

    #[test]
    fn all_sponsored_is_empty() {
        let mut nav = NavigationState::new();
        let pois = vec![poi("ad", 0.0, 0.01).sponsored()];
        assert_eq!(nav.set_catalog_or_origin(pois, pt(0.0, 0.0)), Phase::Empty);
    }

    #[test]
    fn first_plan_starts_at_zero() {
        let mut nav = NavigationState::new();
        assert_eq!(nav.set_catalog_or_origin(five_stops(), pt(0.0, 0.0)), active(0));
        assert_eq!(nav.current_destination().unwrap().id, "s1");
        assert_eq!(nav.current_leg().unwrap().from, pt(0.0, 0.0));
    }

    #[test]
    fn advance_and_rewind_respect_bounds() {
        let mut nav = NavigationState::new();
        nav.set_catalog_or_origin(five_stops(), pt(0.0, 0.0));

        assert_eq!(nav.rewind(), Step::Boundary { cursor: 0 });
        for expected in 1..5 {
            assert_eq!(nav.advance(), Step::Moved { cursor: expected });
        }
        assert_eq!(nav.advance(), Step::Boundary { cursor: 4 });
        assert!(!nav.advance().moved());
        assert_eq!(nav.current_destination().unwrap().id, "s5");
        assert_eq!(nav.rewind(), Step::Moved { cursor: 3 });
    }

    #[test]
    fn shrinking_itinerary_clamps_cursor() {
        let mut nav = NavigationState::new();
        nav.set_catalog_or_origin(five_stops(), pt(0.0, 0.0));
        for _ in 0..3 {
            nav.advance();
        }
        assert_eq!(nav.phase(), active(3));

        let phase = nav.set_catalog(five_stops().into_iter().take(2).collect::<Vec<_>>());
        assert_eq!(phase, active(1));
        assert_eq!(nav.current_destination().unwrap().id, "s2");
    }

    #[test]
    fn position_update_keeps_progress() {
        let mut nav = NavigationState::new();
        nav.set_catalog_or_origin(five_stops(), pt(0.0, 0.0));
        nav.advance();
        nav.advance();

        // Small GPS jitter
        assert_eq!(nav.update_position(pt(0.00001, -0.00001)), active(2));
        let destination = nav.current_destination().unwrap();
        assert_eq!(destination.id, "s3");
        assert_eq!(nav.current_leg().unwrap().to, destination.coordinate);
        assert_eq!(nav.itinerary().legs()[0].from, pt(0.00001, -0.00001));
    }

    #[test]
    fn emptied_then_refilled_restarts_at_zero() {
        let mut nav = NavigationState::new();
        nav.set_catalog_or_origin(five_stops(), pt(0.0, 0.0));
        nav.advance();
        assert_eq!(nav.set_catalog(Vec::<PointOfInterest>::new()), Phase::Empty);
        assert_eq!(nav.set_catalog(five_stops()), active(0));
    }

    #[test]
    fn catalog_without_position_uses_default_origin() {
        let mut nav = NavigationState::new();
        nav.set_catalog(vec![poi("arena", 43.6778, 4.6310)]);

        assert_eq!(nav.origin(), crate::config::DEFAULT_ORIGIN);
        assert_eq!(nav.itinerary().legs()[0].from, crate::config::DEFAULT_ORIGIN);
    }

    #[test]
    fn heading_does_not_replan() {
        let mut nav = NavigationState::new();
        nav.set_catalog_or_origin(five_stops(), pt(0.0, 0.0));
        nav.advance();
        let before = nav.itinerary().clone();

        assert_eq!(nav.update_heading(-45.0), Some(315.0));
        assert_eq!(nav.itinerary(), &before);
        assert_eq!(nav.phase(), active(1));

        assert_eq!(nav.update_heading(f64::NAN), None);
        assert_eq!(nav.heading(), None);
    }

    #[test]
    fn pointer_follows_heading() {
        let mut nav = NavigationState::new();
        nav.set_catalog_or_origin(vec![poi("east", 0.0, 0.01)], pt(0.0, 0.0));
        assert_eq!(nav.pointer(), None);

        nav.update_heading(0.0);
        assert_eq!(nav.pointer(), Some(Pointer::Right));
        nav.update_heading(90.0);
        assert_eq!(nav.pointer(), Some(Pointer::Ahead));
        nav.update_heading(180.0);
        assert_eq!(nav.pointer(), Some(Pointer::Left));
        nav.update_heading(270.0);
        assert_eq!(nav.pointer(), Some(Pointer::Behind));
        nav.update_heading(50.0);
        assert_eq!(nav.pointer(), Some(Pointer::SlightRight));
    }

    #[test]
    fn remaining_totals_shrink_as_cursor_advances() {
        let mut nav = NavigationState::new();
        nav.set_catalog_or_origin(five_stops(), pt(0.0, 0.0));
        let full = nav.remaining_distance_m();
        assert!((full - nav.itinerary().total_distance_m()).abs() < 1e-9);

        nav.advance();
        assert!(nav.remaining_distance_m() < full);
        assert!(nav.remaining_duration_s() < nav.itinerary().total_duration_s());
    }

    #[test]
    fn guidance_text() {
        let mut nav = NavigationState::new();
        let cathedral = poi("c1", 0.0, 0.00315).with_name("Cathedral");
        nav.set_catalog_or_origin(vec![cathedral], pt(0.0, 0.0));

        let guidance = nav.guidance().unwrap();
        assert_eq!(guidance.destination_id, "c1");
        assert_eq!(guidance.text, "Cathedral: 350 m, about 4 min");
        assert_eq!(guidance.pointer, None);
    }

    #[test]
    fn snapshot_json() {
        let mut nav = NavigationState::new();
        let empty = serde_json::to_value(nav.snapshot()).unwrap();
        assert_eq!(empty["state"], "empty");
        assert!(empty.get("guidance").is_none());

        nav.set_catalog_or_origin(five_stops(), pt(0.0, 0.0));
        nav.advance();
        let json = serde_json::to_value(nav.snapshot()).unwrap();
        assert_eq!(json["state"], "active");
        assert_eq!(json["cursor"], 1);
        assert_eq!(json["stops"].as_array().unwrap().len(), 5);
        assert_eq!(json["legs"][0]["geometry"].as_array().unwrap().len(), 2);
        assert_eq!(json["guidance"]["destination_id"], "s2");
    }

    #[test]
    fn classify_pointer() {
        assert_eq!(Pointer::from_relative(5.0), Pointer::Ahead);
        assert_eq!(Pointer::from_relative(-30.0), Pointer::SlightLeft);
        assert_eq!(Pointer::from_relative(-90.0), Pointer::Left);
        assert_eq!(Pointer::from_relative(175.0), Pointer::Behind);
    }

    #[test]
    fn distance_label_rounds_to_tens_of_meters() {
        assert_eq!(format_distance(0.0), "0 m");
        assert_eq!(format_distance(4.0), "0 m");
        assert_eq!(format_distance(348.0), "350 m");
        assert_eq!(format_distance(994.0), "990 m");
    }

    #[test]
    fn distance_label_switches_to_km_after_rounding() {
        assert_eq!(format_distance(999.6), "1.0 km");
        assert_eq!(format_distance(995.0), "1.0 km");
        assert_eq!(format_distance(1000.0), "1.0 km");
        assert_eq!(format_distance(2540.0), "2.5 km");
    }

    #[test]
    fn duration_label() {
        assert_eq!(format_duration(10.0), "1 min");
        assert_eq!(format_duration(600.0), "10 min");
        assert_eq!(format_duration(3540.0), "59 min");
        assert_eq!(format_duration(4500.0), "1 h 15 min");
    }

    #[test]
    fn duration_label_on_the_hour() {
        assert_eq!(format_duration(3599.0), "1 h");
        assert_eq!(format_duration(7200.0), "2 h");
    }
}
