//! Route identity and geocoded routes.

use std::sync::Arc;

use serde::Serialize;
use taxi_protocol::{DraftRoutePoint, FinalizedAddress, GeoPoint};

const WAYPOINT_SEPARATOR: char = '\u{1f}';

/// Deterministic identity of an ordered list of waypoint inputs.
///
/// Two keys are equal exactly when the trimmed waypoints are equal and in the
/// same order. Waypoints are joined with a control character; inputs that
/// contain it are rejected, so different sequences cannot collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RouteKey(Arc<str>);

impl RouteKey {
	/// Builds the key for `waypoints`, or `None` when there are fewer than two
	/// of them, any is blank, or any contains the separator.
	pub fn from_waypoints<S: AsRef<str>>(waypoints: &[S]) -> Option<Self> {
		if waypoints.len() < 2 {
			return None;
		}
		let mut key = String::new();
		for (index, waypoint) in waypoints.iter().enumerate() {
			let text = waypoint.as_ref().trim();
			if text.is_empty() || text.contains(WAYPOINT_SEPARATOR) {
				return None;
			}
			if index > 0 {
				key.push(WAYPOINT_SEPARATOR);
			}
			key.push_str(text);
		}
		Some(Self(key.into()))
	}

	/// Trimmed waypoint texts in order.
	pub fn waypoints(&self) -> impl Iterator<Item = &str> {
		self.0.split(WAYPOINT_SEPARATOR)
	}
}

impl std::fmt::Display for RouteKey {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		for (index, waypoint) in self.waypoints().enumerate() {
			if index > 0 {
				f.write_str(" → ")?;
			}
			f.write_str(waypoint)?;
		}
		Ok(())
	}
}

impl Serialize for RouteKey {
	fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.collect_seq(self.waypoints())
	}
}

/// A geocoded stop.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedPoint {
	pub text: String,
	pub short_text: String,
	pub position: GeoPoint,
	pub city: Option<String>,
	pub uri: Option<String>,
}

impl ResolvedPoint {
	/// Route stop in the shape the order draft call expects.
	pub fn to_draft_point(&self) -> DraftRoutePoint {
		DraftRoutePoint {
			short_text: self.short_text.clone(),
			geopoint: self.position,
			fullname: self.text.clone(),
			kind: "address".to_string(),
			city: self.city.clone(),
			uri: self.uri.clone(),
		}
	}
}

impl From<FinalizedAddress> for ResolvedPoint {
	fn from(address: FinalizedAddress) -> Self {
		let short_text = if address.title.text.is_empty() {
			address.text.clone()
		} else {
			address.title.text
		};
		Self {
			text: address.text,
			short_text,
			position: address.position,
			city: address.city,
			uri: address.uri,
		}
	}
}

/// Ordered geocoded stops for one [`RouteKey`]. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedRoute {
	pub key: RouteKey,
	pub points: Vec<ResolvedPoint>,
}

impl ResolvedRoute {
	pub fn new(key: RouteKey, points: Vec<ResolvedPoint>) -> Self {
		Self { key, points }
	}

	/// Coordinates in stop order, as the pricing call takes them.
	pub fn positions(&self) -> Vec<GeoPoint> {
		self.points.iter().map(|point| point.position).collect()
	}

	pub fn len(&self) -> usize {
		self.points.len()
	}

	pub fn is_empty(&self) -> bool {
		self.points.is_empty()
	}
}
