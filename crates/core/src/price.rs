//! Prices, offers and the quotes that carry them.

use serde::{Serialize, Serializer};
use taxi_protocol::{ServiceLevel, ServiceLevelQuote};

/// A non-negative money amount in hundredths of the currency unit.
///
/// Stored as an integer so prices can be ordered, hashed and deduplicated
/// exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Amount(u64);

impl Amount {
	pub const ZERO: Amount = Amount(0);

	pub fn from_minor(minor: u64) -> Self {
		Self(minor)
	}

	/// Rounds a decimal to the nearest hundredth. Negative or non-finite input
	/// has no amount.
	pub fn from_decimal(value: f64) -> Option<Self> {
		if !value.is_finite() || value < 0.0 {
			return None;
		}
		Some(Self((value * 100.0).round() as u64))
	}

	pub fn minor(self) -> u64 {
		self.0
	}

	pub fn as_decimal(self) -> f64 {
		self.0 as f64 / 100.0
	}

	pub fn saturating_sub(self, other: Amount) -> Amount {
		Amount(self.0.saturating_sub(other.0))
	}
}

impl std::fmt::Display for Amount {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let (units, cents) = (self.0 / 100, self.0 % 100);
		if cents == 0 {
			write!(f, "{units}")
		} else {
			write!(f, "{units}.{cents:02}")
		}
	}
}

impl Serialize for Amount {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_f64(self.as_decimal())
	}
}

/// Quoted price of a class, or the backend's "not available here" answer.
///
/// `Unavailable` orders before every amount, matching how the panel lists it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Price {
	Unavailable,
	Quoted(Amount),
}

impl Price {
	pub fn from_decimal(value: Option<f64>) -> Self {
		value.and_then(Amount::from_decimal).map_or(Price::Unavailable, Price::Quoted)
	}

	pub fn amount(self) -> Option<Amount> {
		match self {
			Price::Quoted(amount) => Some(amount),
			Price::Unavailable => None,
		}
	}

	pub fn is_quoted(self) -> bool {
		matches!(self, Price::Quoted(_))
	}
}

impl From<u64> for Price {
	/// Whole currency units.
	fn from(units: u64) -> Self {
		Price::Quoted(Amount(units * 100))
	}
}

impl std::str::FromStr for Price {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let s = s.trim();
		if s.eq_ignore_ascii_case("unavailable") || s == "-" {
			return Ok(Price::Unavailable);
		}
		let value: f64 = s.parse().map_err(|_| format!("invalid price: {s}"))?;
		Amount::from_decimal(value)
			.map(Price::Quoted)
			.ok_or_else(|| format!("price must be a non-negative number: {s}"))
	}
}

impl std::fmt::Display for Price {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Price::Quoted(amount) => amount.fmt(f),
			Price::Unavailable => write!(f, "unavailable"),
		}
	}
}

impl Serialize for Price {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		match self {
			Price::Quoted(amount) => amount.serialize(serializer),
			Price::Unavailable => serializer.serialize_none(),
		}
	}
}

/// Opaque provider token that must be presented unchanged to order at the
/// quoted price.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Offer(String);

impl Offer {
	pub fn new(token: impl Into<String>) -> Self {
		Self(token.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl From<&str> for Offer {
	fn from(token: &str) -> Self {
		Self(token.to_string())
	}
}

/// Identity of one price entry: `(level, price)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PriceKey {
	pub level: ServiceLevel,
	pub price: Price,
}

impl PriceKey {
	pub fn new(level: ServiceLevel, price: Price) -> Self {
		Self { level, price }
	}
}

impl std::fmt::Display for PriceKey {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}-{}", self.level, self.price)
	}
}

/// One priced class from a single pricing fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quote {
	pub level: ServiceLevel,
	pub price: Price,
	pub offer: Offer,
}

impl Quote {
	pub fn new(level: ServiceLevel, price: impl Into<Price>, offer: impl Into<Offer>) -> Self {
		Self {
			level,
			price: price.into(),
			offer: offer.into(),
		}
	}

	/// Converts a wire quote, dropping classes outside `accepted` and quotes
	/// that carry no offer at all.
	pub fn from_wire(quote: &ServiceLevelQuote, fallback_offer: Option<&str>, accepted: &[ServiceLevel]) -> Option<Self> {
		let level = ServiceLevel::from_wire(&quote.name).or_else(|| quote.class.as_deref().and_then(ServiceLevel::from_wire))?;
		if !accepted.contains(&level) {
			return None;
		}
		let offer = quote.offer.as_deref().or(fallback_offer)?;
		Some(Self {
			level,
			price: Price::from_decimal(quote.max_price_as_decimal),
			offer: Offer::new(offer),
		})
	}
}
