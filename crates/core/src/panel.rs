//! Read model for the price panel.
//!
//! A [`PanelSnapshot`] is a plain copy of what the display needs at one
//! instant, so rendering never holds the session lock.

use std::time::Duration;

use serde::Serialize;
use taxi_protocol::ServiceLevel;
use tokio::time::Instant;

use crate::price::{Amount, Price, PriceKey};
use crate::route::RouteKey;
use crate::store::SessionState;

/// One live price of a level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRow {
	pub price: Price,
	/// Cheapest live price of its level.
	pub lowest: bool,
	pub remaining_secs: u64,
}

impl PriceRow {
	pub fn remaining(&self) -> String {
		format_remaining(Duration::from_secs(self.remaining_secs))
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelPanel {
	pub level: ServiceLevel,
	pub label: &'static str,
	pub profit: Amount,
	/// Ascending.
	pub prices: Vec<PriceRow>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PanelSnapshot {
	pub route: Option<RouteKey>,
	pub levels: Vec<LevelPanel>,
}

impl PanelSnapshot {
	/// Captures the panel as of `now`.
	///
	/// Levels come in tariff order. A level shows up once it has a quoted
	/// price; its "unavailable" answers are then listed first as their own
	/// rows, and `lowest` marks the cheapest quoted one.
	pub fn capture(state: &SessionState, now: Instant) -> Self {
		let levels = ServiceLevel::ALL
			.iter()
			.filter_map(|&level| {
				let known = state.prices(level)?;
				let cheapest = known.iter().copied().find(|price| price.is_quoted())?;
				let prices = known
					.iter()
					.map(|&price| PriceRow {
						price,
						lowest: price == cheapest,
						remaining_secs: state
							.expiry(PriceKey::new(level, price))
							.map_or(0, |expiry| expiry.saturating_duration_since(now).as_secs()),
					})
					.collect();
				Some(LevelPanel {
					level,
					label: level.label(),
					profit: state.profit(level),
					prices,
				})
			})
			.collect();

		Self {
			route: state.current_route().cloned(),
			levels,
		}
	}

	pub fn level(&self, level: ServiceLevel) -> Option<&LevelPanel> {
		self.levels.iter().find(|panel| panel.level == level)
	}

	pub fn is_empty(&self) -> bool {
		self.levels.is_empty()
	}
}

/// Renders a remaining validity as `m:ss`.
pub fn format_remaining(remaining: Duration) -> String {
	let secs = remaining.as_secs();
	format!("{}:{:02}", secs / 60, secs % 60)
}
