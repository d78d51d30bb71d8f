//! Geographic coordinates as the backend encodes them.

use serde::{Deserialize, Serialize};

/// A `[longitude, latitude]` pair.
///
/// The backend always sends and expects coordinates as a two-element JSON
/// array with longitude first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct GeoPoint {
	pub lon: f64,
	pub lat: f64,
}

impl GeoPoint {
	pub fn new(lon: f64, lat: f64) -> Self {
		Self { lon, lat }
	}
}

impl From<[f64; 2]> for GeoPoint {
	fn from([lon, lat]: [f64; 2]) -> Self {
		Self { lon, lat }
	}
}

impl From<GeoPoint> for [f64; 2] {
	fn from(point: GeoPoint) -> Self {
		[point.lon, point.lat]
	}
}

impl std::fmt::Display for GeoPoint {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{:.6},{:.6}", self.lon, self.lat)
	}
}
