use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use fare::{EngineConfig, GeoPoint};

use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "farewatch")]
#[command(about = "Live ride price comparison for a multi-stop route")]
#[command(version)]
pub struct Cli {
	/// Increase verbosity (-v info, -vv debug)
	#[arg(short, long, global = true, action = clap::ArgAction::Count)]
	pub verbose: u8,

	/// Engine configuration file (JSON)
	#[arg(short, long, global = true, value_name = "FILE")]
	pub config: Option<PathBuf>,

	/// Output format
	#[arg(short, long, global = true, value_enum, default_value = "text")]
	pub format: OutputFormat,

	#[command(flatten)]
	pub overrides: ConfigOverrides,

	#[command(subcommand)]
	pub command: Commands,
}

/// Flags that take precedence over the configuration file.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
	/// Pricing poll period in milliseconds
	#[arg(long, global = true, value_name = "MS")]
	pub poll_interval_ms: Option<u64>,

	/// Expiry sweep period in milliseconds
	#[arg(long, global = true, value_name = "MS")]
	pub sweep_interval_ms: Option<u64>,

	/// Offer validity window in seconds
	#[arg(long, global = true, value_name = "SECS")]
	pub offer_ttl_secs: Option<u64>,

	/// Backend base URL
	#[arg(long, global = true, value_name = "URL")]
	pub base_url: Option<String>,
}

impl ConfigOverrides {
	pub fn apply(&self, config: &mut EngineConfig) {
		if let Some(ms) = self.poll_interval_ms {
			config.poll_interval_ms = ms;
		}
		if let Some(ms) = self.sweep_interval_ms {
			config.sweep_interval_ms = ms;
		}
		if let Some(secs) = self.offer_ttl_secs {
			config.offer_ttl_secs = secs;
		}
		if let Some(url) = &self.base_url {
			config.backend.base_url = url.clone();
		}
	}
}

#[derive(Subcommand, Debug)]
pub enum Commands {
	/// Keep the price panel live for the route in a host file
	///
	/// Reads `order <class> <price>`, `show` and `quit` from stdin.
	Watch {
		/// Host page signals (waypoints, map center, picker state)
		#[arg(long, value_name = "FILE")]
		host: PathBuf,

		/// Session credentials (userId, csrfToken)
		#[arg(long, value_name = "FILE")]
		session: PathBuf,

		/// Stop after this many seconds
		#[arg(long, value_name = "SECS")]
		duration_secs: Option<u64>,
	},

	/// Price a route once and print the panel
	Quote {
		/// Session credentials (userId, csrfToken)
		#[arg(long, value_name = "FILE")]
		session: PathBuf,

		/// Reference point for address lookups
		#[arg(long, value_name = "LON,LAT", value_parser = parse_center)]
		center: GeoPoint,

		/// Waypoints in route order
		#[arg(required = true, num_args = 2..)]
		waypoints: Vec<String>,
	},

	/// Print the effective configuration
	Config,
}

impl Commands {
	pub fn name(&self) -> &'static str {
		match self {
			Commands::Watch { .. } => "watch",
			Commands::Quote { .. } => "quote",
			Commands::Config => "config",
		}
	}
}

/// Parses `lon,lat`.
pub fn parse_center(value: &str) -> Result<GeoPoint, String> {
	let (lon, lat) = value.split_once(',').ok_or_else(|| format!("expected LON,LAT, got {value:?}"))?;
	let lon: f64 = lon.trim().parse().map_err(|_| format!("invalid longitude: {lon:?}"))?;
	let lat: f64 = lat.trim().parse().map_err(|_| format!("invalid latitude: {lat:?}"))?;
	if !(-180.0..=180.0).contains(&lon) || !(-90.0..=90.0).contains(&lat) {
		return Err(format!("coordinates out of range: {value}"));
	}
	Ok(GeoPoint::new(lon, lat))
}
