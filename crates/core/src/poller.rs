//! The polling cycle: resolve the route, fetch quotes, aggregate.
//!
//! Cycles are started on a fixed tick regardless of whether the previous one
//! finished. A cycle that finds another one still running skips itself, and a
//! fetch that comes back after the route moved on is discarded, so a slow
//! backend can neither interleave two cycles nor resurrect stale prices.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use taxi_protocol::ServiceLevel;
use tokio::sync::broadcast;
use tokio::task::JoinSet;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, trace, warn};

use crate::backend::TaxiBackend;
use crate::error::{ResolveFailure, Result};
use crate::host::HostPage;
use crate::price::{PriceKey, Quote};
use crate::resolver::{RouteResolver, Unresolvable};
use crate::route::ResolvedRoute;
use crate::store::{Aggregation, SessionEvent, SharedState};

/// Why a cycle did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
	/// The previous cycle is still running.
	InFlight,
	/// The rider is editing an address.
	PickerOpen,
	/// The route input is incomplete.
	InputUnavailable,
}

/// Result of one polling cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
	Skipped(SkipReason),
	ResolutionFailed(ResolveFailure),
	FetchFailed(String),
	/// Quotes arrived for a route that is no longer current.
	Stale,
	Merged {
		fresh: Vec<PriceKey>,
		/// A route change was consumed and the quotes were fetched again.
		route_reset: bool,
	},
}

/// Clears the in-flight flag when the cycle ends, however it ends.
struct CycleGuard<'a>(&'a AtomicBool);

impl<'a> CycleGuard<'a> {
	fn acquire(flag: &'a AtomicBool) -> Option<Self> {
		flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire).ok().map(|_| Self(flag))
	}
}

impl Drop for CycleGuard<'_> {
	fn drop(&mut self) {
		self.0.store(false, Ordering::Release);
	}
}

pub struct Poller {
	state: SharedState,
	resolver: Arc<RouteResolver>,
	backend: Arc<dyn TaxiBackend>,
	host: Arc<dyn HostPage>,
	tariffs: Vec<ServiceLevel>,
	events: broadcast::Sender<SessionEvent>,
	in_flight: AtomicBool,
}

impl Poller {
	pub fn new(
		state: SharedState,
		resolver: Arc<RouteResolver>,
		backend: Arc<dyn TaxiBackend>,
		host: Arc<dyn HostPage>,
		tariffs: Vec<ServiceLevel>,
		events: broadcast::Sender<SessionEvent>,
	) -> Self {
		Self {
			state,
			resolver,
			backend,
			host,
			tariffs,
			events,
			in_flight: AtomicBool::new(false),
		}
	}

	pub fn is_in_flight(&self) -> bool {
		self.in_flight.load(Ordering::Acquire)
	}

	/// Runs one cycle to completion.
	///
	/// Resolution always finishes before the fetch starts. Failures are
	/// logged and reported in the outcome; nothing here is fatal.
	pub async fn run_cycle(&self) -> CycleOutcome {
		let Some(_guard) = CycleGuard::acquire(&self.in_flight) else {
			debug!(target = "fare.poll", "previous cycle still in flight, skipping");
			return CycleOutcome::Skipped(SkipReason::InFlight);
		};

		if self.host.picker_open() {
			debug!(target = "fare.poll", "address picker open, skipping");
			return CycleOutcome::Skipped(SkipReason::PickerOpen);
		}

		let waypoints = self.host.route_inputs();
		let route = match self.resolver.resolve(&waypoints).await {
			Ok(route) => route,
			Err(Unresolvable::InputUnavailable) => {
				trace!(target = "fare.poll", waypoints = waypoints.len(), "route input incomplete");
				return CycleOutcome::Skipped(SkipReason::InputUnavailable);
			}
			Err(Unresolvable::Failed(failure)) => {
				warn!(target = "fare.resolve", waypoint = %failure.waypoint, reason = %failure.reason, "route resolution failed");
				return CycleOutcome::ResolutionFailed(failure);
			}
		};

		let mut route_reset = false;
		loop {
			let aggregation = match self.fetch(&route).await {
				Ok(aggregation) => aggregation,
				Err(err) => {
					warn!(target = "fare.poll", route = %route.key, error = %err, "quote fetch failed");
					return CycleOutcome::FetchFailed(err.to_string());
				}
			};

			match aggregation {
				Aggregation::Merged { fresh } => return CycleOutcome::Merged { fresh, route_reset },
				Aggregation::Stale => return CycleOutcome::Stale,
				Aggregation::Reset { route: current } => {
					if let Some(key) = current {
						let _ = self.events.send(SessionEvent::Reset(key));
					}
					// One immediate re-fetch per cycle; a second reset waits for the next tick.
					if route_reset {
						return CycleOutcome::Merged { fresh: Vec::new(), route_reset };
					}
					route_reset = true;
				}
			}
		}
	}

	/// Starts a cycle every `period` until the returned future is dropped.
	///
	/// Cycles run as their own tasks so a slow one never delays the tick;
	/// dropping this future aborts any that are still running.
	pub async fn run(self: Arc<Self>, period: Duration) {
		let mut ticker = tokio::time::interval(period);
		ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
		let mut cycles = JoinSet::new();

		loop {
			tokio::select! {
				_ = ticker.tick() => {
					let poller = Arc::clone(&self);
					cycles.spawn(async move { poller.run_cycle().await });
				}
				Some(joined) = cycles.join_next() => match joined {
					Ok(outcome) => trace!(target = "fare.poll", ?outcome, "cycle finished"),
					Err(err) => warn!(target = "fare.poll", error = %err, "cycle task failed"),
				},
			}
		}
	}

	/// Fetches quotes for `route` and merges them, tagged with its key.
	async fn fetch(&self, route: &ResolvedRoute) -> Result<Aggregation> {
		let response = self.backend.route_stats(&route.positions(), &self.tariffs).await?;
		let quotes: Vec<Quote> = response
			.service_levels
			.iter()
			.filter_map(|quote| Quote::from_wire(quote, response.offer.as_deref(), &self.tariffs))
			.collect();
		let now = Instant::now();

		let mut state = self.state.lock();
		let aggregation = state.aggregate_for(&route.key, &quotes, now);
		if let Aggregation::Merged { fresh } = &aggregation {
			for &key in fresh {
				if let Some(expires_at) = state.expiry(key) {
					let _ = self.events.send(SessionEvent::Priced { key, expires_at });
				}
			}
		}
		Ok(aggregation)
	}
}
