//! Engine: owns the session state and runs the poll and sweep loops.

use std::sync::Arc;

use parking_lot::Mutex;
use taxi_protocol::ServiceLevel;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::info;

use crate::backend::TaxiBackend;
use crate::config::EngineConfig;
use crate::error::Result;
use crate::host::HostPage;
use crate::order::{OrderDesk, OrderReceipt};
use crate::panel::PanelSnapshot;
use crate::poller::{CycleOutcome, Poller};
use crate::price::{Price, PriceKey};
use crate::resolver::RouteResolver;
use crate::store::{SessionEvent, SessionState, SharedState};
use crate::sweeper::Sweeper;

const EVENT_CAPACITY: usize = 256;

/// One watch session.
///
/// Construction wires the components around a fresh [`SessionState`];
/// [`start`](Self::start) spawns the timers. Dropping the engine stops them.
pub struct Engine {
	config: EngineConfig,
	state: SharedState,
	resolver: Arc<RouteResolver>,
	poller: Arc<Poller>,
	sweeper: Sweeper,
	desk: OrderDesk,
	events: broadcast::Sender<SessionEvent>,
	tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl Engine {
	pub fn new(config: EngineConfig, backend: Arc<dyn TaxiBackend>, host: Arc<dyn HostPage>) -> Result<Self> {
		config.validate()?;

		let state = SessionState::shared(config.offer_ttl());
		let (events, _) = broadcast::channel(EVENT_CAPACITY);
		let resolver = Arc::new(RouteResolver::new(Arc::clone(&state), Arc::clone(&backend), Arc::clone(&host)));
		let poller = Arc::new(Poller::new(
			Arc::clone(&state),
			Arc::clone(&resolver),
			Arc::clone(&backend),
			host,
			config.tariffs.clone(),
			events.clone(),
		));
		let sweeper = Sweeper::new(Arc::clone(&state), events.clone());
		let desk = OrderDesk::new(Arc::clone(&state), backend);

		Ok(Self {
			config,
			state,
			resolver,
			poller,
			sweeper,
			desk,
			events,
			tasks: Mutex::new(Vec::new()),
		})
	}

	/// Spawns the poll and sweep loops. Calling it again while they run is a
	/// no-op. Must be called from within a tokio runtime.
	pub fn start(&self) {
		let mut tasks = self.tasks.lock();
		if !tasks.is_empty() {
			return;
		}
		info!(
			target = "fare.poll",
			poll_ms = self.config.poll_interval_ms,
			sweep_ms = self.config.sweep_interval_ms,
			ttl_secs = self.config.offer_ttl_secs,
			"starting engine"
		);
		tasks.push(tokio::spawn(Arc::clone(&self.poller).run(self.config.poll_interval())));
		tasks.push(tokio::spawn(self.sweeper.clone().run(self.config.sweep_interval())));
	}

	pub fn is_running(&self) -> bool {
		!self.tasks.lock().is_empty()
	}

	/// Stops both loops. In-flight cycles are aborted with them.
	pub fn shutdown(&self) {
		let tasks: Vec<_> = self.tasks.lock().drain(..).collect();
		if tasks.is_empty() {
			return;
		}
		for task in tasks {
			task.abort();
		}
		info!(target = "fare.poll", "engine stopped");
	}

	pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
		self.events.subscribe()
	}

	pub fn snapshot(&self) -> PanelSnapshot {
		PanelSnapshot::capture(&self.state.lock(), Instant::now())
	}

	/// Runs a single polling cycle outside the timer.
	pub async fn poll_once(&self) -> CycleOutcome {
		self.poller.run_cycle().await
	}

	/// Runs a single expiry sweep outside the timer.
	pub fn sweep_once(&self) -> Vec<PriceKey> {
		self.sweeper.tick()
	}

	pub async fn place_order(&self, level: ServiceLevel, price: Price) -> Result<OrderReceipt> {
		self.desk.place_order(level, price).await
	}

	pub fn config(&self) -> &EngineConfig {
		&self.config
	}

	pub fn state(&self) -> &SharedState {
		&self.state
	}

	pub fn resolver(&self) -> &RouteResolver {
		&self.resolver
	}
}

impl Drop for Engine {
	fn drop(&mut self) {
		self.shutdown();
	}
}
