//! Tariff classes recognized by the pricing endpoint.

use serde::{Deserialize, Serialize};

/// A ride tariff class ("service level").
///
/// Only these classes are requested from and accepted back from the pricing
/// endpoint; anything else the backend returns is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceLevel {
	Econom,
	Business,
	Comfortplus,
	Vip,
	Ultimate,
	Maybach,
	ChildTariff,
	Minivan,
}

impl ServiceLevel {
	/// Every recognized class, in the order the panel lists them.
	pub const ALL: [ServiceLevel; 8] = [
		ServiceLevel::Econom,
		ServiceLevel::Business,
		ServiceLevel::Comfortplus,
		ServiceLevel::Vip,
		ServiceLevel::Ultimate,
		ServiceLevel::Maybach,
		ServiceLevel::ChildTariff,
		ServiceLevel::Minivan,
	];

	/// Class identifier as it appears on the wire.
	pub fn as_str(self) -> &'static str {
		match self {
			ServiceLevel::Econom => "econom",
			ServiceLevel::Business => "business",
			ServiceLevel::Comfortplus => "comfortplus",
			ServiceLevel::Vip => "vip",
			ServiceLevel::Ultimate => "ultimate",
			ServiceLevel::Maybach => "maybach",
			ServiceLevel::ChildTariff => "child_tariff",
			ServiceLevel::Minivan => "minivan",
		}
	}

	/// Label the host page shows for this class.
	pub fn label(self) -> &'static str {
		match self {
			ServiceLevel::Econom => "Эконом",
			ServiceLevel::Business => "Комфорт",
			ServiceLevel::Comfortplus => "Комфорт+",
			ServiceLevel::Vip => "Business",
			ServiceLevel::Ultimate => "Premier",
			ServiceLevel::Maybach => "Élite",
			ServiceLevel::ChildTariff => "Детский",
			ServiceLevel::Minivan => "Минивэн",
		}
	}

	/// Exact wire identifier lookup, as used for backend responses.
	pub fn from_wire(name: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|level| level.as_str() == name)
	}

	/// Parses a host-page label or a wire identifier.
	///
	/// Labels win: `Business` is the label of `vip`, not the `business` class.
	pub fn parse(value: &str) -> Option<Self> {
		let value = value.trim();
		Self::ALL
			.into_iter()
			.find(|level| level.label() == value)
			.or_else(|| Self::ALL.into_iter().find(|level| level.as_str().eq_ignore_ascii_case(value)))
	}
}

impl std::str::FromStr for ServiceLevel {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::parse(s).ok_or_else(|| format!("unknown service level: {s}"))
	}
}

impl std::fmt::Display for ServiceLevel {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn wire_names_round_trip_through_serde() {
		for level in ServiceLevel::ALL {
			let json = serde_json::to_value(level).unwrap();
			assert_eq!(json, serde_json::Value::String(level.as_str().to_string()));
		}
	}

	#[test]
	fn parses_wire_names_and_labels() {
		assert_eq!(ServiceLevel::parse("econom"), Some(ServiceLevel::Econom));
		assert_eq!(ServiceLevel::parse("CHILD_TARIFF"), Some(ServiceLevel::ChildTariff));
		assert_eq!(ServiceLevel::parse("Комфорт+"), Some(ServiceLevel::Comfortplus));
		assert_eq!(ServiceLevel::parse("express"), None);
	}

	#[test]
	fn labels_take_precedence_over_wire_names() {
		assert_eq!(ServiceLevel::parse("Business"), Some(ServiceLevel::Vip));
		assert_eq!(ServiceLevel::parse("business"), Some(ServiceLevel::Business));
		assert_eq!(ServiceLevel::parse("Комфорт"), Some(ServiceLevel::Business));
		for level in ServiceLevel::ALL {
			assert_eq!(ServiceLevel::parse(level.label()), Some(level));
		}
	}

	#[test]
	fn wire_lookup_is_exact() {
		assert_eq!(ServiceLevel::from_wire("minivan"), Some(ServiceLevel::Minivan));
		assert_eq!(ServiceLevel::from_wire("Minivan"), None);
		assert_eq!(ServiceLevel::from_wire("Минивэн"), None);
	}
}
