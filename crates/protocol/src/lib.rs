//! Request and response bodies for the ride-hailing backend.
//!
//! Covers address suggest, final suggest, route pricing (`routestats`) and
//! the two-step order flow. Field names follow the backend's JSON exactly.
//! Beyond serde there are only request constructors and tariff class
//! parsing; the engine in `fare-watch` works in terms of these shapes.

pub mod geo;
pub mod order;
pub mod routestats;
pub mod suggest;
pub mod tariff;

pub use geo::*;
pub use order::*;
pub use routestats::*;
pub use suggest::*;
pub use tariff::*;

/// Payment block shared by pricing and ordering requests.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Payment {
	#[serde(rename = "type")]
	pub kind: String,
	pub payment_method_id: String,
}

impl Payment {
	/// Payment block where the method id mirrors the payment type (`cash`).
	pub fn new(kind: impl Into<String>) -> Self {
		let kind = kind.into();
		Self {
			payment_method_id: kind.clone(),
			kind,
		}
	}
}

/// Requirement block; only the empty coupon is ever sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Requirements {
	#[serde(default)]
	pub coupon: String,
}
