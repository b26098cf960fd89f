//! Errors raised at the input boundary.
//!
//! Planning and navigation never fail; only parsing and validating
//! catalogs or configuration does.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("GPX parse error: {0}")]
    Gpx(String),

    #[error("POI {id} has an invalid coordinate (lat {lat}, lon {lon})")]
    InvalidCoordinate { id: String, lat: f64, lon: f64 },

    #[error("duplicate POI id: {0}")]
    DuplicateId(String),

    #[error("POI with empty id")]
    EmptyId,

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, Error>;
