//! Route-to-quote reconciliation engine.
//!
//! Watches the route a rider is entering on the host page, re-prices it
//! against the ride-hailing backend on a fixed cadence and keeps a per-class
//! set of distinct live prices, each with a hard validity window.
//!
//! # Layers
//!
//! * [`store`]: the single [`SessionState`] value every component mutates
//! * [`resolver`]: waypoint text to geocoded route, cached per [`RouteKey`]
//! * [`poller`]: one resolve, fetch, aggregate cycle with an in-flight guard
//! * [`sweeper`]: evicts expired offers on its own tick
//! * [`engine`]: wires the above to timers and exposes the display/ordering surface
//!
//! Remote procedures sit behind [`TaxiBackend`]; host-page signals behind
//! [`HostPage`]. Both have in-memory implementations for tests.

pub mod backend;
pub mod config;
pub mod engine;
pub mod error;
pub mod host;
pub mod order;
pub mod panel;
pub mod poller;
pub mod price;
pub mod resolver;
pub mod route;
pub mod store;
pub mod sweeper;

pub use backend::{DraftOrder, TaxiBackend};
pub use config::{BackendConfig, EngineConfig};
pub use engine::Engine;
pub use error::{FareError, ResolveFailure, Result};
pub use host::{CredentialSource, HostPage, SessionCredentials, StaticHost};
pub use order::{OrderDesk, OrderReceipt};
pub use panel::{LevelPanel, PanelSnapshot, PriceRow};
pub use poller::{CycleOutcome, Poller, SkipReason};
pub use price::{Amount, Offer, Price, PriceKey, Quote};
pub use resolver::{RouteResolver, Unresolvable};
pub use route::{ResolvedPoint, ResolvedRoute, RouteKey};
pub use store::{Aggregation, SessionEvent, SessionState, SharedState};
pub use sweeper::Sweeper;
pub use taxi_protocol::{GeoPoint, ServiceLevel};
