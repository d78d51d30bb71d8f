use std::time::Duration;

use fare::{PanelSnapshot, Price, PriceKey, Quote, RouteKey, ServiceLevel, SessionEvent, SessionState};
use tokio::time::Instant;

use super::*;

fn snapshot(quotes: &[Quote]) -> PanelSnapshot {
	let now = Instant::now();
	let mut state = SessionState::new(Duration::from_secs(600));
	state.observe_route(&RouteKey::from_waypoints(&["Addr A", "Addr B"]).unwrap());
	state.aggregate(&[], now);
	state.aggregate(quotes, now);
	PanelSnapshot::capture(&state, now)
}

#[test]
fn builder_marks_success_only_with_data() {
	let result = ResultBuilder::new("config").data(42).build();
	assert!(result.ok);
	assert_eq!(result.schema_version, Some(SCHEMA_VERSION));
	assert!(result.duration_ms.is_some());

	let result: EmptyResult = ResultBuilder::new("quote").error(ErrorCode::QuoteFailed, "timed out").build();
	assert!(!result.ok);
	assert_eq!(result.error.unwrap().code, ErrorCode::QuoteFailed);
}

#[test]
fn envelope_serializes_camel_case_with_screaming_codes() {
	let result: EmptyResult = ResultBuilder::new("watch").error(ErrorCode::OfferUnavailable, "gone").duration_ms(7).build();
	let json = serde_json::to_value(&result).unwrap();
	assert_eq!(json["schemaVersion"], 1);
	assert_eq!(json["ok"], false);
	assert_eq!(json["error"]["code"], "OFFER_UNAVAILABLE");
	assert_eq!(json["durationMs"], 7);
	assert!(json.get("data").is_none());
}

#[test]
fn format_parses_case_insensitively() {
	assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
	assert_eq!("ndjson".parse::<OutputFormat>().unwrap(), OutputFormat::Ndjson);
	assert!("toon".parse::<OutputFormat>().is_err());
	assert!(!OutputFormat::Text.is_machine());
}

#[test]
fn panel_lists_prices_with_remaining_time_and_profit() {
	colored::control::set_override(false);
	let snapshot = snapshot(&[
		Quote::new(ServiceLevel::Econom, 399, "O1"),
		Quote::new(ServiceLevel::Econom, 450, "O2"),
		Quote::new(ServiceLevel::Business, 700, "B1"),
	]);

	let text = render_panel(&snapshot);

	let lines: Vec<&str> = text.lines().collect();
	assert_eq!(lines[0], "Route: Addr A → Addr B");
	assert_eq!(lines[1], "Эконом      399 (10:00)  450 (10:00)  +51");
	assert_eq!(lines[2], "Комфорт     700 (10:00)");
}

#[test]
fn panel_shows_unavailable_rows_without_counting_them_in_profit() {
	colored::control::set_override(false);
	let snapshot = snapshot(&[Quote::new(ServiceLevel::Minivan, Price::Unavailable, "M0"), Quote::new(ServiceLevel::Minivan, 900, "M1")]);

	let text = render_panel(&snapshot);

	assert_eq!(text.lines().nth(1), Some("Минивэн     недоступно (10:00)  900 (10:00)"));
}

#[test]
fn empty_panel_says_so() {
	colored::control::set_override(false);
	let text = render_panel(&PanelSnapshot::default());
	assert_eq!(text, "Route: waiting for input\nNo live prices\n");
}

#[test]
fn events_render_as_single_lines() {
	colored::control::set_override(false);
	let now = Instant::now();
	let key = PriceKey::new(ServiceLevel::Econom, Price::from(399));

	let priced = EventData::from_event(&SessionEvent::Priced { key, expires_at: now + Duration::from_secs(600) }, now);
	assert_eq!(render_event(&priced), "+ Эконом 399 (10:00)");

	let expired = EventData::from_event(&SessionEvent::Expired(key), now);
	assert_eq!(render_event(&expired), "- Эконом 399 expired");
	assert_eq!(serde_json::to_value(&expired).unwrap(), serde_json::json!({ "kind": "expired", "level": "econom", "price": 399.0 }));

	let route = RouteKey::from_waypoints(&["Addr A", "Addr B"]).unwrap();
	let reset = EventData::from_event(&SessionEvent::Reset(route), now);
	assert_eq!(render_event(&reset), "~ route Addr A → Addr B, prices reset");
}
