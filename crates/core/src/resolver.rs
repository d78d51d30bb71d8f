//! Waypoint text to geocoded route.
//!
//! Resolution is memoized per [`RouteKey`] for the whole session: a route is
//! looked up at most once, later calls are served from the session's route
//! cache. Concurrent calls for a key whose lookup is still running join that
//! lookup instead of starting their own.

use std::collections::HashMap;
use std::sync::Arc;

use futures_util::FutureExt;
use futures_util::future::{self, BoxFuture, Shared};
use parking_lot::Mutex;
use thiserror::Error;
use tracing::debug;

use crate::backend::TaxiBackend;
use crate::error::ResolveFailure;
use crate::host::HostPage;
use crate::route::{ResolvedPoint, ResolvedRoute, RouteKey};
use crate::store::SharedState;

type Lookup = Shared<BoxFuture<'static, Result<Arc<ResolvedRoute>, ResolveFailure>>>;

/// Why no route came out of a resolution attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Unresolvable {
	/// Fewer than two waypoints, or a blank one. Not worth reporting.
	#[error("route input incomplete")]
	InputUnavailable,
	#[error(transparent)]
	Failed(#[from] ResolveFailure),
}

pub struct RouteResolver {
	state: SharedState,
	backend: Arc<dyn TaxiBackend>,
	host: Arc<dyn HostPage>,
	in_flight: Mutex<HashMap<RouteKey, Lookup>>,
}

impl RouteResolver {
	pub fn new(state: SharedState, backend: Arc<dyn TaxiBackend>, host: Arc<dyn HostPage>) -> Self {
		Self {
			state,
			backend,
			host,
			in_flight: Mutex::new(HashMap::new()),
		}
	}

	/// Resolves `waypoints` to a route and records it as the current one.
	///
	/// Fails without touching any state when the input is incomplete or any
	/// single waypoint cannot be resolved; a partially resolved route is
	/// never cached.
	pub async fn resolve<S: AsRef<str>>(&self, waypoints: &[S]) -> Result<Arc<ResolvedRoute>, Unresolvable> {
		let key = RouteKey::from_waypoints(waypoints).ok_or(Unresolvable::InputUnavailable)?;

		{
			let mut state = self.state.lock();
			if let Some(route) = state.cached_route(&key) {
				state.observe_route(&key);
				return Ok(route);
			}
		}

		let lookup = self.lookup(&key);
		let result = lookup.clone().await;

		{
			let mut in_flight = self.in_flight.lock();
			if in_flight.get(&key).is_some_and(|current| current.ptr_eq(&lookup)) {
				in_flight.remove(&key);
			}
		}

		let route = result?;
		self.state.lock().observe_route(&route.key);
		Ok(route)
	}

	/// Number of lookups currently running.
	pub fn in_flight(&self) -> usize {
		self.in_flight.lock().len()
	}

	fn lookup(&self, key: &RouteKey) -> Lookup {
		let mut in_flight = self.in_flight.lock();
		if let Some(existing) = in_flight.get(key) {
			debug!(target = "fare.resolve", route = %key, "joining in-flight lookup");
			return existing.clone();
		}

		// A lookup may have finished between the cache check and here.
		if let Some(route) = self.state.lock().cached_route(key) {
			return future::ready(Ok(route)).boxed().shared();
		}

		debug!(target = "fare.resolve", route = %key, "resolving route");
		let backend = Arc::clone(&self.backend);
		let host = Arc::clone(&self.host);
		let state = Arc::clone(&self.state);
		let route_key = key.clone();
		let lookup = async move {
			let points = resolve_points(backend.as_ref(), host.as_ref(), &route_key).await?;
			let route = ResolvedRoute::new(route_key, points);
			Ok(state.lock().cache_route(route))
		}
		.boxed()
		.shared();

		in_flight.insert(key.clone(), lookup.clone());
		lookup
	}
}

/// Resolves each waypoint in order against a freshly read map center.
async fn resolve_points(backend: &dyn TaxiBackend, host: &dyn HostPage, key: &RouteKey) -> Result<Vec<ResolvedPoint>, ResolveFailure> {
	let mut points = Vec::new();
	for waypoint in key.waypoints() {
		let reference = host.map_center().ok_or_else(|| ResolveFailure::new(waypoint, "map center unavailable"))?;
		let candidates = backend
			.suggest(waypoint, reference)
			.await
			.map_err(|e| ResolveFailure::new(waypoint, e.to_string()))?;
		let candidate = candidates
			.into_iter()
			.next()
			.ok_or_else(|| ResolveFailure::new(waypoint, "no address candidates"))?;
		let address = backend.finalize(&candidate).await.map_err(|e| ResolveFailure::new(waypoint, e.to_string()))?;
		points.push(ResolvedPoint::from(address));
	}
	Ok(points)
}
