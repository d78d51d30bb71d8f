//! Remote procedures of the ride-hailing backend.
//!
//! The engine only depends on [`TaxiBackend`]; [`HttpBackend`] talks to the
//! real service and [`FakeBackend`] scripts answers for tests.

mod fake;
mod http;

use async_trait::async_trait;
use taxi_protocol::{DraftRoutePoint, FinalizedAddress, GeoPoint, OrderCommitResponse, OrderDraftResponse, RouteStatsResponse, ServiceLevel, SuggestCandidate};

pub use fake::FakeBackend;
pub use http::HttpBackend;

use crate::error::Result;
use crate::price::Offer;

/// Everything needed to draft an order at a quoted price.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftOrder {
	pub level: ServiceLevel,
	pub offer: Offer,
	pub route: Vec<DraftRoutePoint>,
}

#[async_trait]
pub trait TaxiBackend: Send + Sync {
	/// Address candidates for free text around `reference`, best first.
	async fn suggest(&self, text: &str, reference: GeoPoint) -> Result<Vec<SuggestCandidate>>;

	/// Pins a candidate down to a full address.
	async fn finalize(&self, candidate: &SuggestCandidate) -> Result<FinalizedAddress>;

	/// Prices an ordered route for the given classes.
	async fn route_stats(&self, route: &[GeoPoint], tariffs: &[ServiceLevel]) -> Result<RouteStatsResponse>;

	async fn create_order_draft(&self, order: &DraftOrder) -> Result<OrderDraftResponse>;

	async fn commit_order(&self, order_id: &str) -> Result<OrderCommitResponse>;
}
