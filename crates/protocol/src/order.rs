//! Order draft (`external/3.0/orderdraft`) and commit
//! (`external/3.0/ordercommit`) shapes.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{GeoPoint, Payment, Requirements, ServiceLevel};

/// A route stop as the draft call expects it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftRoutePoint {
	pub short_text: String,
	pub geopoint: GeoPoint,
	pub fullname: String,
	#[serde(rename = "type")]
	pub kind: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub city: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub uri: Option<String>,
}

/// Creates an order draft against a previously quoted offer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderDraftRequest {
	pub id: String,
	pub offer: String,
	pub requirements: Requirements,
	pub parks: Vec<String>,
	pub dont_sms: bool,
	pub driverclientchat_enabled: bool,
	pub payment: Payment,
	pub route: Vec<DraftRoutePoint>,
	pub class: Vec<ServiceLevel>,
}

/// Draft response; only the order id matters for the commit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderDraftResponse {
	pub orderid: String,
}

/// Commits a drafted order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCommitRequest {
	pub id: String,
	pub orderid: String,
}

/// Commit confirmation. The backend payload is passed through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderCommitResponse {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub status: Option<String>,
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}
