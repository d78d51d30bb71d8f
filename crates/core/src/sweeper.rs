//! Expiry sweep on its own tick, decoupled from polling.

use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::debug;

use crate::price::PriceKey;
use crate::store::{SessionEvent, SharedState};

#[derive(Clone)]
pub struct Sweeper {
	state: SharedState,
	events: broadcast::Sender<SessionEvent>,
}

impl Sweeper {
	pub fn new(state: SharedState, events: broadcast::Sender<SessionEvent>) -> Self {
		Self { state, events }
	}

	/// Evicts everything expired as of now and announces each pair once.
	pub fn tick(&self) -> Vec<PriceKey> {
		let expired = self.state.lock().sweep(Instant::now());
		if !expired.is_empty() {
			debug!(target = "fare.sweep", expired = expired.len(), "evicted expired offers");
		}
		for &key in &expired {
			let _ = self.events.send(SessionEvent::Expired(key));
		}
		expired
	}

	pub async fn run(self, period: Duration) {
		let mut ticker = tokio::time::interval(period);
		ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
		loop {
			ticker.tick().await;
			self.tick();
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::price::{Price, Quote};
	use crate::route::RouteKey;
	use crate::store::SessionState;
	use taxi_protocol::ServiceLevel;

	const TTL: Duration = Duration::from_secs(600);

	fn primed() -> (Sweeper, SharedState, broadcast::Receiver<SessionEvent>) {
		let state = SessionState::shared(TTL);
		{
			let mut state = state.lock();
			let route = RouteKey::from_waypoints(&["Addr A", "Addr B"]).unwrap();
			state.observe_route(&route);
			state.aggregate(&[], Instant::now());
			state.aggregate(&[Quote::new(ServiceLevel::Econom, 399, "O1")], Instant::now());
		}
		let (tx, rx) = broadcast::channel(16);
		(Sweeper::new(state.clone(), tx), state, rx)
	}

	#[tokio::test(start_paused = true)]
	async fn keeps_offers_until_the_window_closes() {
		let (sweeper, state, mut events) = primed();

		tokio::time::advance(TTL - Duration::from_millis(1)).await;
		assert!(sweeper.tick().is_empty());
		assert_eq!(state.lock().live_offer_count(), 1);

		tokio::time::advance(Duration::from_millis(1)).await;
		let key = PriceKey::new(ServiceLevel::Econom, Price::from(399));
		assert_eq!(sweeper.tick(), vec![key]);
		assert_eq!(events.try_recv().unwrap(), SessionEvent::Expired(key));
		assert!(state.lock().is_clear());

		assert!(sweeper.tick().is_empty());
		assert!(events.try_recv().is_err());
	}

	#[tokio::test(start_paused = true)]
	async fn run_evicts_on_its_own_tick() {
		let (sweeper, state, mut events) = primed();
		let task = tokio::spawn(sweeper.run(Duration::from_secs(1)));

		tokio::time::sleep(TTL + Duration::from_secs(1)).await;
		task.abort();

		assert!(state.lock().is_clear());
		assert!(matches!(events.try_recv(), Ok(SessionEvent::Expired(_))));
		// route tracking is not the sweeper's business
		assert!(state.lock().current_route().is_some());
	}
}
