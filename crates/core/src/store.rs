//! Session state shared by the resolver, aggregator and sweeper.
//!
//! All cross-cycle state lives in one [`SessionState`] value. Components get
//! it injected as [`SharedState`] and only hold the lock for synchronous
//! sections, never across an `.await`, so each operation below is atomic with
//! respect to the others.
//!
//! Invariant: `offers[level]` has an entry for `price` iff
//! `prices_by_level[level]` contains `price` and a timer exists for
//! `(level, price)`.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use taxi_protocol::ServiceLevel;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::price::{Amount, Offer, Price, PriceKey, Quote};
use crate::route::{ResolvedRoute, RouteKey};

/// Handle through which every component reaches the session state.
pub type SharedState = Arc<Mutex<SessionState>>;

/// Change notifications for the display collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
	/// A `(level, price)` pair was seen for the first time.
	Priced { key: PriceKey, expires_at: Instant },
	/// A pair's validity window ran out; its offer is gone.
	Expired(PriceKey),
	/// The route changed and every price was dropped.
	Reset(RouteKey),
}

/// What one aggregation call did to the state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Aggregation {
	/// Quotes were merged; `fresh` lists the pairs that got a new timer.
	Merged { fresh: Vec<PriceKey> },
	/// A pending route change was consumed; quotes were not merged.
	Reset { route: Option<RouteKey> },
	/// The quotes were fetched for a route that is no longer current.
	Stale,
}

#[derive(Debug)]
pub struct SessionState {
	offer_ttl: Duration,
	prices_by_level: BTreeMap<ServiceLevel, BTreeSet<Price>>,
	offers: BTreeMap<ServiceLevel, BTreeMap<Price, Offer>>,
	timers: BTreeMap<PriceKey, Instant>,
	route_cache: HashMap<RouteKey, Arc<ResolvedRoute>>,
	current_route: Option<RouteKey>,
	route_changed: bool,
}

impl SessionState {
	pub fn new(offer_ttl: Duration) -> Self {
		Self {
			offer_ttl,
			prices_by_level: BTreeMap::new(),
			offers: BTreeMap::new(),
			timers: BTreeMap::new(),
			route_cache: HashMap::new(),
			current_route: None,
			route_changed: false,
		}
	}

	pub fn shared(offer_ttl: Duration) -> SharedState {
		Arc::new(Mutex::new(Self::new(offer_ttl)))
	}

	pub fn offer_ttl(&self) -> Duration {
		self.offer_ttl
	}

	pub fn cached_route(&self, key: &RouteKey) -> Option<Arc<ResolvedRoute>> {
		self.route_cache.get(key).cloned()
	}

	/// Caches a resolved route. An already cached route for the same key wins
	/// and is returned instead.
	pub fn cache_route(&mut self, route: ResolvedRoute) -> Arc<ResolvedRoute> {
		Arc::clone(self.route_cache.entry(route.key.clone()).or_insert_with(|| Arc::new(route)))
	}

	pub fn cached_route_count(&self) -> usize {
		self.route_cache.len()
	}

	/// Records `key` as the current route. Returns true (and flags a pending
	/// reset) when it differs from the previous one.
	pub fn observe_route(&mut self, key: &RouteKey) -> bool {
		let changed = self.current_route.as_ref() != Some(key);
		if changed {
			info!(target = "fare.resolve", route = %key, "route changed");
			self.route_changed = true;
			self.current_route = Some(key.clone());
		}
		changed
	}

	pub fn current_route(&self) -> Option<&RouteKey> {
		self.current_route.as_ref()
	}

	/// The resolved form of the current route, if it is cached.
	pub fn current_resolved_route(&self) -> Option<Arc<ResolvedRoute>> {
		self.current_route.as_ref().and_then(|key| self.cached_route(key))
	}

	pub fn route_changed(&self) -> bool {
		self.route_changed
	}

	/// Merges one fetch worth of quotes.
	///
	/// Prices are kept as sets, offers are first-write-wins and a pair's
	/// expiry is fixed when it is first seen. A pending route change turns
	/// this call into a reset instead.
	pub fn aggregate(&mut self, quotes: &[Quote], now: Instant) -> Aggregation {
		if self.route_changed {
			self.reset();
			return Aggregation::Reset {
				route: self.current_route.clone(),
			};
		}

		let expires_at = now + self.offer_ttl;
		let mut fresh = Vec::new();
		for quote in quotes {
			self.prices_by_level.entry(quote.level).or_default().insert(quote.price);
			self.offers
				.entry(quote.level)
				.or_default()
				.entry(quote.price)
				.or_insert_with(|| quote.offer.clone());

			let key = PriceKey::new(quote.level, quote.price);
			if !self.timers.contains_key(&key) {
				self.timers.insert(key, expires_at);
				fresh.push(key);
			}
		}

		if !fresh.is_empty() {
			debug!(target = "fare.poll", fresh = fresh.len(), live = self.timers.len(), "merged quotes");
		}
		Aggregation::Merged { fresh }
	}

	/// [`aggregate`](Self::aggregate) for quotes fetched against `route`;
	/// discarded when the current route has moved on since.
	pub fn aggregate_for(&mut self, route: &RouteKey, quotes: &[Quote], now: Instant) -> Aggregation {
		if self.current_route.as_ref() != Some(route) {
			debug!(target = "fare.poll", route = %route, "discarding quotes for stale route");
			return Aggregation::Stale;
		}
		self.aggregate(quotes, now)
	}

	/// Removes every pair whose expiry is at or before `now` and returns them.
	///
	/// Route cache and route tracking are left alone.
	pub fn sweep(&mut self, now: Instant) -> Vec<PriceKey> {
		let expired: Vec<PriceKey> = self.timers.iter().filter(|&(_, &expiry)| expiry <= now).map(|(&key, _)| key).collect();

		for key in &expired {
			self.timers.remove(key);
			if let Some(prices) = self.prices_by_level.get_mut(&key.level) {
				prices.remove(&key.price);
				if prices.is_empty() {
					self.prices_by_level.remove(&key.level);
				}
			}
			if let Some(offers) = self.offers.get_mut(&key.level) {
				offers.remove(&key.price);
				if offers.is_empty() {
					self.offers.remove(&key.level);
				}
			}
		}
		expired
	}

	/// Drops all prices, offers and timers and clears the route-change flag.
	/// The route cache survives.
	pub fn reset(&mut self) {
		self.prices_by_level.clear();
		self.offers.clear();
		self.timers.clear();
		self.route_changed = false;
	}

	/// Levels that currently have at least one price.
	pub fn levels(&self) -> impl Iterator<Item = ServiceLevel> + '_ {
		self.prices_by_level.keys().copied()
	}

	pub fn prices(&self, level: ServiceLevel) -> Option<&BTreeSet<Price>> {
		self.prices_by_level.get(&level)
	}

	pub fn offer(&self, level: ServiceLevel, price: Price) -> Option<&Offer> {
		self.offers.get(&level).and_then(|offers| offers.get(&price))
	}

	pub fn offers(&self, level: ServiceLevel) -> Option<&BTreeMap<Price, Offer>> {
		self.offers.get(&level)
	}

	pub fn expiry(&self, key: PriceKey) -> Option<Instant> {
		self.timers.get(&key).copied()
	}

	pub fn live_offer_count(&self) -> usize {
		self.timers.len()
	}

	/// True when no prices, offers or timers are held.
	pub fn is_clear(&self) -> bool {
		self.prices_by_level.is_empty() && self.offers.is_empty() && self.timers.is_empty()
	}

	/// Spread between the highest and lowest quoted amount of `level`.
	pub fn profit(&self, level: ServiceLevel) -> Amount {
		let Some(prices) = self.prices_by_level.get(&level) else {
			return Amount::ZERO;
		};
		let mut amounts = prices.iter().filter_map(|price| price.amount());
		match (amounts.next(), amounts.next_back()) {
			(Some(lowest), Some(highest)) => highest.saturating_sub(lowest),
			_ => Amount::ZERO,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::route::ResolvedPoint;
	use taxi_protocol::GeoPoint;

	const TTL: Duration = Duration::from_secs(600);

	fn state() -> SessionState {
		SessionState::new(TTL)
	}

	fn econom(price: u64, offer: &str) -> Quote {
		Quote::new(ServiceLevel::Econom, price, offer)
	}

	fn route(waypoints: &[&str]) -> ResolvedRoute {
		let key = RouteKey::from_waypoints(waypoints).unwrap();
		let points = waypoints
			.iter()
			.enumerate()
			.map(|(i, text)| ResolvedPoint {
				text: text.to_string(),
				short_text: text.to_string(),
				position: GeoPoint::new(37.0 + i as f64, 55.0),
				city: None,
				uri: None,
			})
			.collect();
		ResolvedRoute::new(key, points)
	}

	fn prices(state: &SessionState, level: ServiceLevel) -> Vec<Price> {
		state.prices(level).map(|set| set.iter().copied().collect()).unwrap_or_default()
	}

	#[test]
	fn aggregates_distinct_prices_with_offers_and_timers() {
		let mut state = state();
		let now = Instant::now();

		let outcome = state.aggregate(&[econom(399, "O1"), econom(450, "O2")], now);

		assert_eq!(
			outcome,
			Aggregation::Merged {
				fresh: vec![PriceKey::new(ServiceLevel::Econom, Price::from(399)), PriceKey::new(ServiceLevel::Econom, Price::from(450))]
			}
		);
		assert_eq!(prices(&state, ServiceLevel::Econom), vec![Price::from(399), Price::from(450)]);
		assert_eq!(state.offer(ServiceLevel::Econom, Price::from(399)), Some(&Offer::from("O1")));
		assert_eq!(state.offer(ServiceLevel::Econom, Price::from(450)), Some(&Offer::from("O2")));
		assert_eq!(state.expiry(PriceKey::new(ServiceLevel::Econom, Price::from(399))), Some(now + TTL));
		assert_eq!(state.expiry(PriceKey::new(ServiceLevel::Econom, Price::from(450))), Some(now + TTL));
		assert_eq!(state.live_offer_count(), 2);
	}

	#[test]
	fn aggregation_is_idempotent() {
		let quotes = [econom(399, "O1"), econom(450, "O2"), Quote::new(ServiceLevel::Business, 700, "B1")];
		let now = Instant::now();

		let mut once = state();
		once.aggregate(&quotes, now);

		let mut twice = state();
		twice.aggregate(&quotes, now);
		let second = twice.aggregate(&quotes, now);

		assert_eq!(second, Aggregation::Merged { fresh: Vec::new() });
		for level in [ServiceLevel::Econom, ServiceLevel::Business] {
			assert_eq!(prices(&once, level), prices(&twice, level));
			assert_eq!(once.offers(level), twice.offers(level));
		}
	}

	#[test]
	fn first_offer_wins_for_a_price() {
		let mut state = state();
		let now = Instant::now();

		state.aggregate(&[econom(399, "O1")], now);
		state.aggregate(&[econom(399, "O1-later")], now + Duration::from_secs(5));

		assert_eq!(state.offer(ServiceLevel::Econom, Price::from(399)), Some(&Offer::from("O1")));
	}

	#[test]
	fn reobserving_a_price_does_not_extend_its_expiry() {
		let mut state = state();
		let first_seen = Instant::now();
		let key = PriceKey::new(ServiceLevel::Econom, Price::from(399));

		state.aggregate(&[econom(399, "O1")], first_seen);
		state.aggregate(&[econom(399, "O1")], first_seen + Duration::from_secs(300));

		assert_eq!(state.expiry(key), Some(first_seen + TTL));
	}

	#[test]
	fn sweep_respects_the_exact_expiry() {
		let mut state = state();
		let now = Instant::now();
		let key = PriceKey::new(ServiceLevel::Econom, Price::from(399));
		state.aggregate(&[econom(399, "O1")], now);

		assert!(state.sweep(now + TTL - Duration::from_millis(1)).is_empty());
		assert_eq!(state.offer(ServiceLevel::Econom, Price::from(399)), Some(&Offer::from("O1")));

		assert_eq!(state.sweep(now + TTL), vec![key]);
		assert!(state.offer(ServiceLevel::Econom, Price::from(399)).is_none());
		assert!(state.prices(ServiceLevel::Econom).is_none());
		assert!(state.expiry(key).is_none());

		assert!(state.sweep(now + TTL + Duration::from_secs(1)).is_empty());
	}

	#[test]
	fn sweep_only_removes_expired_pairs() {
		let mut state = state();
		let start = Instant::now();
		state.aggregate(&[econom(399, "O1")], start);
		state.aggregate(&[econom(450, "O2")], start + Duration::from_secs(60));

		let expired = state.sweep(start + TTL);

		assert_eq!(expired, vec![PriceKey::new(ServiceLevel::Econom, Price::from(399))]);
		assert_eq!(prices(&state, ServiceLevel::Econom), vec![Price::from(450)]);
		assert_eq!(state.offer(ServiceLevel::Econom, Price::from(450)), Some(&Offer::from("O2")));
	}

	#[test]
	fn sweep_leaves_route_tracking_alone() {
		let mut state = state();
		let cached = state.cache_route(route(&["Addr A", "Addr B"]));
		state.observe_route(&cached.key);
		let now = Instant::now();

		state.sweep(now + TTL * 2);

		assert_eq!(state.current_route(), Some(&cached.key));
		assert!(state.route_changed());
		assert_eq!(state.cached_route_count(), 1);
	}

	#[test]
	fn route_change_resets_on_next_aggregation() {
		let mut state = state();
		let now = Instant::now();
		let first = state.cache_route(route(&["Addr A", "Addr B"]));
		state.observe_route(&first.key);
		state.aggregate(&[], now);
		state.aggregate(&[econom(399, "O1")], now);
		assert!(!state.is_clear());

		let second = state.cache_route(route(&["Addr A", "Addr C"]));
		assert!(state.observe_route(&second.key));
		let outcome = state.aggregate(&[econom(500, "O3")], now);

		assert_eq!(
			outcome,
			Aggregation::Reset {
				route: Some(second.key.clone())
			}
		);
		assert!(state.is_clear());
		assert!(!state.route_changed());
		assert!(state.cached_route(&first.key).is_some());
	}

	#[test]
	fn observing_the_same_route_is_not_a_change() {
		let mut state = state();
		let key = RouteKey::from_waypoints(&["Addr A", "Addr B"]).unwrap();

		assert!(state.observe_route(&key));
		state.reset();
		assert!(!state.observe_route(&key));
		assert!(!state.route_changed());
	}

	#[test]
	fn stale_quotes_are_discarded() {
		let mut state = state();
		let old = RouteKey::from_waypoints(&["Addr A", "Addr B"]).unwrap();
		let new = RouteKey::from_waypoints(&["Addr A", "Addr C"]).unwrap();
		state.observe_route(&old);
		state.reset();
		state.observe_route(&new);

		let outcome = state.aggregate_for(&old, &[econom(399, "O1")], Instant::now());

		assert_eq!(outcome, Aggregation::Stale);
		assert!(state.is_clear());
		assert!(state.route_changed());
	}

	#[test]
	fn cache_keeps_the_first_resolution() {
		let mut state = state();
		let first = state.cache_route(route(&["Addr A", "Addr B"]));
		let mut other = route(&["Addr A", "Addr B"]);
		other.points.pop();

		let kept = state.cache_route(other);

		assert!(Arc::ptr_eq(&first, &kept));
		assert_eq!(kept.len(), 2);
	}

	#[test]
	fn profit_is_spread_of_quoted_prices() {
		let mut state = state();
		let now = Instant::now();
		state.aggregate(&[econom(300, "a"), econom(450, "b"), econom(500, "c")], now);
		state.aggregate(&[Quote::new(ServiceLevel::Business, 300, "d")], now);
		state.aggregate(&[Quote::new(ServiceLevel::Vip, Price::Unavailable, "e"), Quote::new(ServiceLevel::Vip, 900, "f")], now);

		assert_eq!(state.profit(ServiceLevel::Econom), Amount::from_minor(20_000));
		assert_eq!(state.profit(ServiceLevel::Business), Amount::ZERO);
		assert_eq!(state.profit(ServiceLevel::Vip), Amount::ZERO);
		assert_eq!(state.profit(ServiceLevel::Minivan), Amount::ZERO);
	}
}
