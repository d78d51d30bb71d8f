//! Engine configuration.
//!
//! Every field has a default, so an empty JSON object (or no file at all) is
//! a valid configuration. Durations are stored as integers to keep the file
//! format flat.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use taxi_protocol::ServiceLevel;

use crate::error::{FareError, Result};

pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1_000;
pub const DEFAULT_SWEEP_INTERVAL_MS: u64 = 1_000;
/// Offers are honored by the backend for ten minutes from first sight.
pub const DEFAULT_OFFER_TTL_SECS: u64 = 600;
/// Upper bound for both loop periods: one hour.
pub const MAX_INTERVAL_MS: u64 = 3_600_000;
/// Upper bound for the offer window: one day.
pub const MAX_OFFER_TTL_SECS: u64 = 86_400;
pub const DEFAULT_BASE_URL: &str = "https://ya-authproxy.taxi.yandex.ru";
pub const DEFAULT_ORIGIN: &str = "https://taxi.yandex.ru";

/// Backend endpoint settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BackendConfig {
	pub base_url: String,
	/// Sent as both `Origin` and `Referer`.
	pub origin: String,
	pub payment_type: String,
	pub timeout_ms: u64,
}

impl Default for BackendConfig {
	fn default() -> Self {
		Self {
			base_url: DEFAULT_BASE_URL.to_string(),
			origin: DEFAULT_ORIGIN.to_string(),
			payment_type: "cash".to_string(),
			timeout_ms: 10_000,
		}
	}
}

impl BackendConfig {
	pub fn timeout(&self) -> Duration {
		Duration::from_millis(self.timeout_ms)
	}
}

/// Polling cadence, offer lifetime and recognized tariffs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
	pub poll_interval_ms: u64,
	pub sweep_interval_ms: u64,
	pub offer_ttl_secs: u64,
	pub tariffs: Vec<ServiceLevel>,
	pub backend: BackendConfig,
}

impl Default for EngineConfig {
	fn default() -> Self {
		Self {
			poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
			sweep_interval_ms: DEFAULT_SWEEP_INTERVAL_MS,
			offer_ttl_secs: DEFAULT_OFFER_TTL_SECS,
			tariffs: ServiceLevel::ALL.to_vec(),
			backend: BackendConfig::default(),
		}
	}
}

impl EngineConfig {
	/// Reads a JSON config file. Missing fields take their defaults.
	pub fn load(path: &Path) -> Result<Self> {
		let content = std::fs::read_to_string(path)?;
		let config: EngineConfig = serde_json::from_str(&content)?;
		Ok(config)
	}

	pub fn poll_interval(&self) -> Duration {
		Duration::from_millis(self.poll_interval_ms)
	}

	pub fn sweep_interval(&self) -> Duration {
		Duration::from_millis(self.sweep_interval_ms)
	}

	pub fn offer_ttl(&self) -> Duration {
		Duration::from_secs(self.offer_ttl_secs)
	}

	pub fn validate(&self) -> Result<()> {
		if self.poll_interval_ms == 0 {
			return Err(FareError::Config("pollIntervalMs must be greater than zero".into()));
		}
		if self.sweep_interval_ms == 0 {
			return Err(FareError::Config("sweepIntervalMs must be greater than zero".into()));
		}
		if self.offer_ttl_secs == 0 {
			return Err(FareError::Config("offerTtlSecs must be greater than zero".into()));
		}
		if self.poll_interval_ms > MAX_INTERVAL_MS {
			return Err(FareError::Config(format!("pollIntervalMs must be at most {MAX_INTERVAL_MS}")));
		}
		if self.sweep_interval_ms > MAX_INTERVAL_MS {
			return Err(FareError::Config(format!("sweepIntervalMs must be at most {MAX_INTERVAL_MS}")));
		}
		if self.offer_ttl_secs > MAX_OFFER_TTL_SECS {
			return Err(FareError::Config(format!("offerTtlSecs must be at most {MAX_OFFER_TTL_SECS}")));
		}
		if self.tariffs.is_empty() {
			return Err(FareError::Config("tariffs must list at least one service level".into()));
		}
		if self.backend.base_url.trim().is_empty() {
			return Err(FareError::Config("backend.baseUrl must not be empty".into()));
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn empty_object_yields_defaults() {
		let config: EngineConfig = serde_json::from_str("{}").unwrap();
		assert_eq!(config, EngineConfig::default());
		assert_eq!(config.offer_ttl(), Duration::from_secs(600));
		assert_eq!(config.tariffs.len(), 8);
		config.validate().unwrap();
	}

	#[test]
	fn partial_override_keeps_other_defaults() {
		let config: EngineConfig = serde_json::from_str(r#"{"pollIntervalMs": 2500, "tariffs": ["econom", "business"], "backend": {"paymentType": "card"}}"#).unwrap();
		assert_eq!(config.poll_interval(), Duration::from_millis(2500));
		assert_eq!(config.sweep_interval(), Duration::from_secs(1));
		assert_eq!(config.tariffs, vec![ServiceLevel::Econom, ServiceLevel::Business]);
		assert_eq!(config.backend.payment_type, "card");
		assert_eq!(config.backend.base_url, DEFAULT_BASE_URL);
	}

	#[test]
	fn unknown_tariff_is_rejected() {
		let result = serde_json::from_str::<EngineConfig>(r#"{"tariffs": ["express"]}"#);
		assert!(result.is_err());
	}

	#[test]
	fn validate_rejects_zero_intervals_and_empty_tariffs() {
		let config = EngineConfig {
			poll_interval_ms: 0,
			..Default::default()
		};
		assert!(matches!(config.validate(), Err(FareError::Config(_))));

		let config = EngineConfig {
			tariffs: Vec::new(),
			..Default::default()
		};
		assert!(matches!(config.validate(), Err(FareError::Config(msg)) if msg.contains("tariffs")));
	}

	#[test]
	fn validate_rejects_oversized_durations() {
		let config = EngineConfig {
			offer_ttl_secs: u64::MAX,
			..Default::default()
		};
		assert!(matches!(config.validate(), Err(FareError::Config(msg)) if msg.contains("offerTtlSecs")));

		let config = EngineConfig {
			poll_interval_ms: MAX_INTERVAL_MS + 1,
			..Default::default()
		};
		assert!(matches!(config.validate(), Err(FareError::Config(msg)) if msg.contains("pollIntervalMs")));

		let config = EngineConfig {
			offer_ttl_secs: MAX_OFFER_TTL_SECS,
			sweep_interval_ms: MAX_INTERVAL_MS,
			..Default::default()
		};
		config.validate().unwrap();
	}
}
