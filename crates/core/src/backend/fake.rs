//! Scripted in-memory backend for tests.
//!
//! Addresses are registered up front; the pricing answer can be swapped and
//! one-shot pricing failures queued while the engine runs. Every call is counted so tests can assert on
//! cache hits and request deduplication.
//!
//! # Example
//!
//! ```ignore
//! let backend = FakeBackend::new()
//!     .with_address("Addr A", GeoPoint::new(37.60, 55.75))
//!     .with_address("Addr B", GeoPoint::new(37.55, 55.70))
//!     .with_quotes(vec![FakeBackend::quote("econom", 399.0, "O1")]);
//! ```

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use taxi_protocol::{
	FinalizedAddress, GeoPoint, OrderCommitResponse, OrderDraftResponse, RouteStatsResponse, ServiceLevel, ServiceLevelQuote, SuggestCandidate, SuggestTitle,
};

use super::{DraftOrder, TaxiBackend};
use crate::error::{FareError, Result};

#[derive(Default)]
struct FakeState {
	addresses: HashMap<String, GeoPoint>,
	suggest_failure: Option<String>,
	quotes: Option<RouteStatsResponse>,
	queued_failures: VecDeque<String>,
	draft_failure: Option<String>,
	commit_failure: Option<String>,
	references: Vec<GeoPoint>,
	priced_routes: Vec<Vec<GeoPoint>>,
	drafts: Vec<DraftOrder>,
	commits: Vec<String>,
}

/// In-memory [`TaxiBackend`].
#[derive(Default)]
pub struct FakeBackend {
	state: Mutex<FakeState>,
	latency: Option<Duration>,
	suggest_calls: AtomicUsize,
	finalize_calls: AtomicUsize,
	route_stats_calls: AtomicUsize,
}

impl FakeBackend {
	pub fn new() -> Self {
		Self::default()
	}

	/// Wire quote with a price and its own offer.
	pub fn quote(name: &str, price: f64, offer: &str) -> ServiceLevelQuote {
		ServiceLevelQuote {
			name: name.to_string(),
			class: None,
			max_price_as_decimal: Some(price),
			offer: Some(offer.to_string()),
			estimated_waiting: None,
		}
	}

	/// Registers an address that suggest will answer with one candidate.
	pub fn with_address(self, text: &str, position: GeoPoint) -> Self {
		self.state.lock().addresses.insert(text.to_string(), position);
		self
	}

	/// Pricing answer returned whenever nothing is queued.
	pub fn with_quotes(self, quotes: Vec<ServiceLevelQuote>) -> Self {
		self.set_quotes(quotes);
		self
	}

	/// Delay applied to suggest and pricing calls.
	pub fn with_latency(mut self, latency: Duration) -> Self {
		self.latency = Some(latency);
		self
	}

	pub fn set_quotes(&self, quotes: Vec<ServiceLevelQuote>) {
		self.state.lock().quotes = Some(RouteStatsResponse {
			service_levels: quotes,
			offer: None,
		});
	}

	/// One-shot pricing failure served before the standing answer.
	pub fn push_quote_failure(&self, message: &str) {
		self.state.lock().queued_failures.push_back(message.to_string());
	}

	pub fn fail_suggest(&self, message: Option<&str>) {
		self.state.lock().suggest_failure = message.map(String::from);
	}

	pub fn fail_drafts(&self, message: Option<&str>) {
		self.state.lock().draft_failure = message.map(String::from);
	}

	pub fn fail_commits(&self, message: Option<&str>) {
		self.state.lock().commit_failure = message.map(String::from);
	}

	pub fn suggest_calls(&self) -> usize {
		self.suggest_calls.load(Ordering::SeqCst)
	}

	pub fn finalize_calls(&self) -> usize {
		self.finalize_calls.load(Ordering::SeqCst)
	}

	pub fn route_stats_calls(&self) -> usize {
		self.route_stats_calls.load(Ordering::SeqCst)
	}

	/// Reference points suggest was called with, in call order.
	pub fn references(&self) -> Vec<GeoPoint> {
		self.state.lock().references.clone()
	}

	pub fn priced_routes(&self) -> Vec<Vec<GeoPoint>> {
		self.state.lock().priced_routes.clone()
	}

	pub fn drafts(&self) -> Vec<DraftOrder> {
		self.state.lock().drafts.clone()
	}

	pub fn commits(&self) -> Vec<String> {
		self.state.lock().commits.clone()
	}

	async fn delay(&self) {
		if let Some(latency) = self.latency {
			tokio::time::sleep(latency).await;
		}
	}
}

#[async_trait]
impl TaxiBackend for FakeBackend {
	async fn suggest(&self, text: &str, reference: GeoPoint) -> Result<Vec<SuggestCandidate>> {
		self.suggest_calls.fetch_add(1, Ordering::SeqCst);
		self.delay().await;

		let mut state = self.state.lock();
		state.references.push(reference);
		if let Some(message) = &state.suggest_failure {
			return Err(FareError::Backend(message.clone()));
		}
		let text = text.trim();
		Ok(state
			.addresses
			.get(text)
			.map(|&position| SuggestCandidate {
				position,
				text: text.to_string(),
				title: SuggestTitle { text: text.to_string() },
				uri: Some(format!("fake://{text}")),
			})
			.into_iter()
			.collect())
	}

	async fn finalize(&self, candidate: &SuggestCandidate) -> Result<FinalizedAddress> {
		self.finalize_calls.fetch_add(1, Ordering::SeqCst);
		Ok(FinalizedAddress {
			position: candidate.position,
			text: format!("Moscow, {}", candidate.text),
			title: candidate.title.clone(),
			city: Some("Moscow".to_string()),
			uri: candidate.uri.clone(),
		})
	}

	async fn route_stats(&self, route: &[GeoPoint], _tariffs: &[ServiceLevel]) -> Result<RouteStatsResponse> {
		self.route_stats_calls.fetch_add(1, Ordering::SeqCst);
		self.delay().await;

		let mut state = self.state.lock();
		state.priced_routes.push(route.to_vec());
		if let Some(message) = state.queued_failures.pop_front() {
			return Err(FareError::Backend(message));
		}
		Ok(state.quotes.clone().unwrap_or_default())
	}

	async fn create_order_draft(&self, order: &DraftOrder) -> Result<OrderDraftResponse> {
		let mut state = self.state.lock();
		if let Some(message) = &state.draft_failure {
			return Err(FareError::Backend(message.clone()));
		}
		state.drafts.push(order.clone());
		Ok(OrderDraftResponse {
			orderid: format!("order-{}", state.drafts.len()),
		})
	}

	async fn commit_order(&self, order_id: &str) -> Result<OrderCommitResponse> {
		let mut state = self.state.lock();
		if let Some(message) = &state.commit_failure {
			return Err(FareError::Backend(message.clone()));
		}
		state.commits.push(order_id.to_string());
		Ok(OrderCommitResponse {
			status: Some("search".to_string()),
			extra: Default::default(),
		})
	}
}
