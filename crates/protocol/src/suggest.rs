//! Address suggest (`persuggest/v1/suggest`) and finalize
//! (`persuggest/v1/finalsuggest`) shapes.

use serde::{Deserialize, Serialize};

use crate::GeoPoint;

/// Search state sent with every suggest call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestState {
	pub accuracy: u32,
	pub location: GeoPoint,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub selected_class: Option<String>,
}

/// Free-text lookup around a reference point.
///
/// ```json
/// {
///   "action": "user_input",
///   "state": { "accuracy": 0, "location": [37.61, 55.75] },
///   "sticky": false,
///   "type": "b",
///   "id": "rider-id",
///   "part": "Tverskaya 7",
///   "position": [37.61, 55.75]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestRequest {
	pub action: String,
	pub state: SuggestState,
	pub sticky: bool,
	#[serde(rename = "type")]
	pub kind: String,
	pub id: String,
	pub part: String,
	pub position: GeoPoint,
}

impl SuggestRequest {
	pub fn user_input(rider_id: impl Into<String>, part: impl Into<String>, reference: GeoPoint) -> Self {
		Self {
			action: "user_input".to_string(),
			state: SuggestState {
				accuracy: 0,
				location: reference,
				selected_class: None,
			},
			sticky: false,
			kind: "b".to_string(),
			id: rider_id.into(),
			part: part.into(),
			position: reference,
		}
	}
}

/// Title block of a suggest result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestTitle {
	#[serde(default)]
	pub text: String,
}

/// One address candidate returned by the suggest call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestCandidate {
	pub position: GeoPoint,
	#[serde(default)]
	pub text: String,
	#[serde(default)]
	pub title: SuggestTitle,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub uri: Option<String>,
}

/// `results` envelope of the suggest call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SuggestResponse {
	#[serde(default)]
	pub results: Vec<SuggestCandidate>,
}

/// Pins a candidate down to a full address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalizeRequest {
	pub action: String,
	pub state: SuggestState,
	pub sticky: bool,
	#[serde(rename = "type")]
	pub kind: String,
	pub id: String,
	pub position: GeoPoint,
}

impl FinalizeRequest {
	pub fn for_candidate(rider_id: impl Into<String>, candidate: &SuggestCandidate) -> Self {
		Self {
			action: "finalize".to_string(),
			state: SuggestState {
				accuracy: 0,
				location: candidate.position,
				selected_class: Some("econom".to_string()),
			},
			sticky: true,
			kind: "b".to_string(),
			id: rider_id.into(),
			position: candidate.position,
		}
	}
}

/// A finalized address: everything the pricing and ordering calls need.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalizedAddress {
	pub position: GeoPoint,
	#[serde(default)]
	pub text: String,
	#[serde(default)]
	pub title: SuggestTitle,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub city: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub uri: Option<String>,
}

/// `results` envelope of the finalize call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinalizeResponse {
	#[serde(default)]
	pub results: Vec<FinalizedAddress>,
}
