//! Host-page signals and session credentials.
//!
//! The engine never reaches into the page itself. Whatever embeds it supplies
//! the route the rider typed, the current map center and whether an address
//! picker is open; credentials come from the page's persisted storage.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use taxi_protocol::GeoPoint;

use crate::error::Result;

/// Read access to the host page.
pub trait HostPage: Send + Sync {
	/// Raw waypoint texts in route order.
	fn route_inputs(&self) -> Vec<String>;

	/// Map center used as the reference point for address lookups.
	fn map_center(&self) -> Option<GeoPoint>;

	/// True while the rider is editing an address; resolution waits.
	fn picker_open(&self) -> bool;
}

/// Per-session identity sent with every backend call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCredentials {
	/// Rider id (`X-Yataxi-Userid` and the `id` body field).
	pub user_id: String,
	/// Anti-forgery token (`X-Csrf-Token`).
	pub csrf_token: String,
}

/// Source of [`SessionCredentials`], consulted on every request so rotated
/// tokens are picked up.
pub trait CredentialSource: Send + Sync {
	fn credentials(&self) -> Result<SessionCredentials>;
}

impl CredentialSource for SessionCredentials {
	fn credentials(&self) -> Result<SessionCredentials> {
		Ok(self.clone())
	}
}

#[derive(Debug, Default)]
struct HostSignals {
	waypoints: Vec<String>,
	center: Option<GeoPoint>,
	picker_open: bool,
}

/// In-memory [`HostPage`] whose signals are set programmatically.
#[derive(Debug, Default)]
pub struct StaticHost {
	signals: RwLock<HostSignals>,
}

impl StaticHost {
	pub fn new<S: Into<String>>(waypoints: impl IntoIterator<Item = S>, center: GeoPoint) -> Self {
		Self {
			signals: RwLock::new(HostSignals {
				waypoints: waypoints.into_iter().map(Into::into).collect(),
				center: Some(center),
				picker_open: false,
			}),
		}
	}

	pub fn set_waypoints<S: Into<String>>(&self, waypoints: impl IntoIterator<Item = S>) {
		self.signals.write().waypoints = waypoints.into_iter().map(Into::into).collect();
	}

	pub fn set_center(&self, center: Option<GeoPoint>) {
		self.signals.write().center = center;
	}

	pub fn set_picker_open(&self, open: bool) {
		self.signals.write().picker_open = open;
	}
}

impl HostPage for StaticHost {
	fn route_inputs(&self) -> Vec<String> {
		self.signals.read().waypoints.clone()
	}

	fn map_center(&self) -> Option<GeoPoint> {
		self.signals.read().center
	}

	fn picker_open(&self) -> bool {
		self.signals.read().picker_open
	}
}
