//! Point-of-interest catalog.
//!
//! POIs come from an external store as JSON, or from the waypoints of a
//! GPX 1.1 file. This is the only place coordinates are validated; the
//! planner and geometry code trust what they are given.

use std::collections::HashSet;
use std::io::Read;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::geo::Coordinate;

/// GPX `<sym>` value that marks a waypoint as sponsored.
const SPONSORED_SYMBOL: &str = "sponsored";

/// A single attraction or sponsored entry.
///
/// Field aliases accept the catalog store's wire names
/// (`poi_id`, `lng`, `is_ad`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointOfInterest {
    #[serde(alias = "poi_id")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub coordinate: Coordinate,
    /// Sponsored entries are never planned into an itinerary.
    #[serde(default, alias = "is_ad", alias = "is_sponsored")]
    pub sponsored: bool,
}

impl PointOfInterest {
    pub fn new(id: impl Into<String>, coordinate: Coordinate) -> Self {
        Self {
            id: id.into(),
            name: None,
            coordinate,
            sponsored: false,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn sponsored(mut self) -> Self {
        self.sponsored = true;
        self
    }

    /// Display label: the name if present, otherwise the id.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

/// A validated set of POIs.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Catalog {
    pois: Vec<PointOfInterest>,
}

impl Catalog {
    /// Build a catalog, rejecting empty or duplicate ids and coordinates
    /// outside the WGS84 range.
    pub fn new(pois: Vec<PointOfInterest>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(pois.len());
        for poi in &pois {
            if poi.id.is_empty() {
                return Err(Error::EmptyId);
            }
            if !poi.coordinate.is_valid() {
                return Err(Error::InvalidCoordinate {
                    id: poi.id.clone(),
                    lat: poi.coordinate.lat,
                    lon: poi.coordinate.lon,
                });
            }
            if !seen.insert(poi.id.as_str()) {
                return Err(Error::DuplicateId(poi.id.clone()));
            }
        }
        Ok(Self { pois })
    }

    /// Parse a JSON array of POIs.
    pub fn from_json(json: &str) -> Result<Self> {
        let pois: Vec<PointOfInterest> = serde_json::from_str(json)?;
        Self::new(pois)
    }

    /// Read POIs from the waypoints of a GPX file.
    ///
    /// The waypoint name becomes the id; unnamed waypoints get `wpt-<n>`.
    /// A `<sym>sponsored</sym>` marks the entry as sponsored.
    pub fn from_gpx<R: Read>(reader: R) -> Result<Self> {
        let gpx = gpx::read(reader).map_err(|e| Error::Gpx(e.to_string()))?;

        let pois = gpx
            .waypoints
            .iter()
            .enumerate()
            .map(|(i, wp)| PointOfInterest {
                id: wp.name.clone().unwrap_or_else(|| format!("wpt-{i}")),
                name: wp.name.clone(),
                coordinate: Coordinate::new(wp.point().y(), wp.point().x()),
                sponsored: wp
                    .symbol
                    .as_deref()
                    .is_some_and(|s| s.eq_ignore_ascii_case(SPONSORED_SYMBOL)),
            })
            .collect();

        Self::new(pois)
    }

    pub fn pois(&self) -> &[PointOfInterest] {
        &self.pois
    }

    pub fn len(&self) -> usize {
        self.pois.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pois.is_empty()
    }

    /// Non-sponsored POIs, in catalog order.
    pub fn attractions(&self) -> impl Iterator<Item = &PointOfInterest> {
        self.pois.iter().filter(|p| !p.sponsored)
    }

    /// Sponsored POIs, for hosts that render them separately.
    pub fn sponsored(&self) -> impl Iterator<Item = &PointOfInterest> {
        self.pois.iter().filter(|p| p.sponsored)
    }
}

impl From<Catalog> for Vec<PointOfInterest> {
    fn from(catalog: Catalog) -> Self {
        catalog.pois
    }
}
