use fare::{Price, PriceKey, RouteKey, ServiceLevel, SessionEvent};
use serde::Serialize;
use tokio::time::Instant;

/// What happened to the session, as streamed by `watch`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
	Priced,
	Expired,
	Reset,
}

/// Result data for one watch event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventData {
	pub kind: EventKind,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub level: Option<ServiceLevel>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub price: Option<Price>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub remaining_secs: Option<u64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub route: Option<RouteKey>,
}

impl EventData {
	pub fn from_event(event: &SessionEvent, now: Instant) -> Self {
		match event {
			SessionEvent::Priced { key, expires_at } => Self {
				remaining_secs: Some(expires_at.saturating_duration_since(now).as_secs()),
				..Self::for_key(EventKind::Priced, *key)
			},
			SessionEvent::Expired(key) => Self::for_key(EventKind::Expired, *key),
			SessionEvent::Reset(route) => Self {
				kind: EventKind::Reset,
				level: None,
				price: None,
				remaining_secs: None,
				route: Some(route.clone()),
			},
		}
	}

	fn for_key(kind: EventKind, key: PriceKey) -> Self {
		Self {
			kind,
			level: Some(key.level),
			price: Some(key.price),
			remaining_secs: None,
			route: None,
		}
	}
}
