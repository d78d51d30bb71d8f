//! Pricing (`3.0/routestats`) shapes.

use serde::{Deserialize, Serialize};

use crate::{GeoPoint, Payment, Requirements, ServiceLevel};

/// Per-class requirement entry; one per requested tariff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TariffRequirement {
	pub class: ServiceLevel,
	pub requirements: Requirements,
}

/// Price request for an ordered route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteStatsRequest {
	pub route: Vec<GeoPoint>,
	pub payment: Payment,
	pub summary_version: u32,
	pub format_currency: bool,
	pub extended_description: bool,
	pub is_lightweight: bool,
	pub id: String,
	pub requirements: Requirements,
	pub selected_class: String,
	pub supported_markup: String,
	pub supports_paid_options: bool,
	pub tariff_requirements: Vec<TariffRequirement>,
}

impl RouteStatsRequest {
	pub fn new(rider_id: impl Into<String>, route: Vec<GeoPoint>, payment: Payment, tariffs: &[ServiceLevel]) -> Self {
		Self {
			route,
			payment,
			summary_version: 2,
			format_currency: true,
			extended_description: true,
			is_lightweight: false,
			id: rider_id.into(),
			requirements: Requirements::default(),
			selected_class: String::new(),
			supported_markup: "tml-0.1".to_string(),
			supports_paid_options: true,
			tariff_requirements: tariffs
				.iter()
				.map(|&class| TariffRequirement {
					class,
					requirements: Requirements::default(),
				})
				.collect(),
		}
	}
}

/// Pickup wait estimate attached to a class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimatedWaiting {
	#[serde(default)]
	pub seconds: Option<f64>,
	#[serde(default)]
	pub message: Option<String>,
}

/// One priced class in the routestats response.
///
/// `name` carries the class identifier; classes this client does not know
/// are kept as raw strings and filtered by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceLevelQuote {
	pub name: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub class: Option<String>,
	#[serde(default)]
	pub max_price_as_decimal: Option<f64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub offer: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub estimated_waiting: Option<EstimatedWaiting>,
}

/// Routestats response subset used by the engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteStatsResponse {
	#[serde(default)]
	pub service_levels: Vec<ServiceLevelQuote>,
	/// Response-wide offer, used when a class carries none of its own.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub offer: Option<String>,
}
