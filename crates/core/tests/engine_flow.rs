//! End-to-end engine behavior against the in-memory backend.

use std::sync::Arc;
use std::time::Duration;

use fare::backend::FakeBackend;
use fare::{CycleOutcome, Engine, EngineConfig, FareError, GeoPoint, Price, PriceKey, ServiceLevel, SessionEvent, StaticHost};

fn fixture() -> (Arc<FakeBackend>, Arc<StaticHost>) {
	let backend = FakeBackend::new()
		.with_address("Addr A", GeoPoint::new(37.60, 55.75))
		.with_address("Addr B", GeoPoint::new(37.55, 55.70))
		.with_address("Addr C", GeoPoint::new(37.50, 55.80))
		.with_quotes(vec![FakeBackend::quote("econom", 399.0, "O1"), FakeBackend::quote("econom", 450.0, "O2")]);
	let host = StaticHost::new(["Addr A", "Addr B"], GeoPoint::new(37.62, 55.75));
	(Arc::new(backend), Arc::new(host))
}

fn engine(backend: &Arc<FakeBackend>, host: &Arc<StaticHost>) -> Engine {
	Engine::new(EngineConfig::default(), backend.clone(), host.clone()).unwrap()
}

#[tokio::test(start_paused = true)]
async fn quotes_live_for_exactly_the_offer_window() {
	let (backend, host) = fixture();
	let engine = engine(&backend, &host);
	let mut events = engine.subscribe();

	let outcome = engine.poll_once().await;
	assert!(matches!(outcome, CycleOutcome::Merged { ref fresh, route_reset: true } if fresh.len() == 2));

	let snapshot = engine.snapshot();
	let econom = snapshot.level(ServiceLevel::Econom).unwrap();
	let prices: Vec<Price> = econom.prices.iter().map(|row| row.price).collect();
	assert_eq!(prices, vec![Price::from(399), Price::from(450)]);
	assert_eq!(econom.prices[0].remaining_secs, 600);
	assert_eq!(econom.profit.to_string(), "51");
	{
		let state = engine.state().lock();
		assert_eq!(state.offer(ServiceLevel::Econom, Price::from(399)).unwrap().as_str(), "O1");
		assert_eq!(state.offer(ServiceLevel::Econom, Price::from(450)).unwrap().as_str(), "O2");
		assert_eq!(state.live_offer_count(), 2);
	}

	tokio::time::advance(Duration::from_secs(599)).await;
	assert!(engine.sweep_once().is_empty());
	assert_eq!(engine.snapshot().level(ServiceLevel::Econom).unwrap().prices[0].remaining(), "0:01");

	tokio::time::advance(Duration::from_secs(1)).await;
	let expired = engine.sweep_once();
	assert_eq!(
		expired,
		vec![PriceKey::new(ServiceLevel::Econom, Price::from(399)), PriceKey::new(ServiceLevel::Econom, Price::from(450))]
	);
	assert!(engine.snapshot().is_empty());
	assert!(engine.sweep_once().is_empty());

	let received: Vec<SessionEvent> = std::iter::from_fn(|| events.try_recv().ok()).collect();
	assert_eq!(received.len(), 5);
	assert!(matches!(received[0], SessionEvent::Reset(_)));
	assert!(matches!(received[1], SessionEvent::Priced { .. }));
	assert!(matches!(received[2], SessionEvent::Priced { .. }));
	assert_eq!(received[3], SessionEvent::Expired(expired[0]));
	assert_eq!(received[4], SessionEvent::Expired(expired[1]));
}

#[tokio::test(start_paused = true)]
async fn started_engine_polls_and_sweeps_on_its_own() {
	let (backend, host) = fixture();
	let engine = engine(&backend, &host);
	engine.start();
	engine.start();
	assert!(engine.is_running());

	tokio::time::sleep(Duration::from_millis(1_500)).await;
	assert!(engine.snapshot().level(ServiceLevel::Econom).is_some());

	backend.set_quotes(Vec::new());
	tokio::time::sleep(Duration::from_secs(600)).await;
	assert!(engine.snapshot().is_empty());
	assert!(engine.state().lock().is_clear());

	engine.shutdown();
	assert!(!engine.is_running());
	let calls = backend.route_stats_calls();
	tokio::time::sleep(Duration::from_secs(5)).await;
	assert_eq!(backend.route_stats_calls(), calls);
}

#[tokio::test]
async fn editing_the_route_replaces_all_prices() {
	let (backend, host) = fixture();
	let engine = engine(&backend, &host);
	engine.poll_once().await;

	backend.set_quotes(vec![FakeBackend::quote("comfortplus", 610.0, "C1")]);
	host.set_waypoints(["Addr A", "Addr C"]);
	let outcome = engine.poll_once().await;

	assert!(matches!(outcome, CycleOutcome::Merged { route_reset: true, .. }));
	let snapshot = engine.snapshot();
	assert_eq!(snapshot.levels.len(), 1);
	assert_eq!(snapshot.levels[0].level, ServiceLevel::Comfortplus);
	assert_eq!(snapshot.route.unwrap().to_string(), "Addr A → Addr C");
	assert_eq!(engine.state().lock().cached_route_count(), 2);

	// going back costs no lookups
	host.set_waypoints(["Addr A", "Addr B"]);
	engine.poll_once().await;
	assert_eq!(backend.suggest_calls(), 4);
}

#[tokio::test(start_paused = true)]
async fn orders_only_while_the_offer_is_live() {
	let (backend, host) = fixture();
	let engine = engine(&backend, &host);
	engine.poll_once().await;

	let receipt = engine.place_order(ServiceLevel::Econom, Price::from(450)).await.unwrap();
	assert_eq!(receipt.order_id, "order-1");
	assert_eq!(backend.drafts()[0].offer.as_str(), "O2");
	assert_eq!(backend.drafts()[0].route.len(), 2);

	tokio::time::advance(Duration::from_secs(600)).await;
	engine.sweep_once();
	let err = engine.place_order(ServiceLevel::Econom, Price::from(450)).await.unwrap_err();
	assert!(matches!(err, FareError::OfferUnavailable { .. }));
}

#[tokio::test]
async fn invalid_config_is_rejected() {
	let (backend, host) = fixture();
	let config = EngineConfig {
		offer_ttl_secs: 0,
		..Default::default()
	};
	let result = Engine::new(config, backend, host);
	assert!(matches!(result, Err(FareError::Config(_))));
}
