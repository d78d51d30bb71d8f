//! Error types for the reconciliation engine.

use thiserror::Error;

use crate::price::Price;
use taxi_protocol::ServiceLevel;

/// Result alias used throughout the engine.
pub type Result<T> = std::result::Result<T, FareError>;

/// Why a single waypoint could not be turned into a geocoded point.
///
/// Cloneable so one in-flight route lookup can hand the same failure to every
/// caller waiting on it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("could not resolve waypoint {waypoint:?}: {reason}")]
pub struct ResolveFailure {
	pub waypoint: String,
	pub reason: String,
}

impl ResolveFailure {
	pub fn new(waypoint: impl Into<String>, reason: impl Into<String>) -> Self {
		Self {
			waypoint: waypoint.into(),
			reason: reason.into(),
		}
	}
}

/// Step of order placement that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStage {
	Draft,
	Commit,
}

impl std::fmt::Display for OrderStage {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			OrderStage::Draft => write!(f, "draft"),
			OrderStage::Commit => write!(f, "commit"),
		}
	}
}

#[derive(Debug, Error)]
pub enum FareError {
	#[error("Session credentials unavailable: {0}")]
	Credentials(String),

	#[error("Request to {endpoint} failed: {source}")]
	Http {
		endpoint: &'static str,
		#[source]
		source: reqwest::Error,
	},

	#[error("{endpoint} returned HTTP {status}: {body}")]
	Status { endpoint: &'static str, status: u16, body: String },

	#[error("{endpoint} returned no results")]
	EmptyResponse { endpoint: &'static str },

	#[error(transparent)]
	Resolution(#[from] ResolveFailure),

	#[error("No live offer for {level} at {price}")]
	OfferUnavailable { level: ServiceLevel, price: Price },

	#[error("No resolved route to order against")]
	NoActiveRoute,

	#[error("Order {stage} failed: {source}")]
	Order {
		stage: OrderStage,
		#[source]
		source: Box<FareError>,
	},

	#[error("Invalid configuration: {0}")]
	Config(String),

	#[error("Backend error: {0}")]
	Backend(String),

	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),

	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
}

impl FareError {
	pub(crate) fn order(stage: OrderStage, source: FareError) -> Self {
		FareError::Order {
			stage,
			source: Box::new(source),
		}
	}

	/// True for failures a user should be told about directly.
	pub fn is_order_failure(&self) -> bool {
		matches!(self, FareError::Order { .. } | FareError::OfferUnavailable { .. } | FareError::NoActiveRoute)
	}
}
