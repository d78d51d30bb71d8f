mod config;
mod quote;
pub mod watch;

use std::path::Path;
use std::time::Duration;

use fare::EngineConfig;
use tracing::debug;

use crate::cli::{Cli, Commands, ConfigOverrides};
use crate::error::{CliError, Result};
use crate::output::{EmptyResult, ResultBuilder, print_result};

pub async fn dispatch(cli: Cli) -> Result<()> {
	let command = cli.command.name();
	let format = cli.format;

	let result = match load_config(cli.config.as_deref(), &cli.overrides) {
		Ok(config) => match cli.command {
			Commands::Config => config::execute(&config, format),
			Commands::Quote { session, center, waypoints } => quote::execute(config, &session, center, waypoints, format).await,
			Commands::Watch { host, session, duration_secs } => watch::execute(config, &host, &session, duration_secs.map(Duration::from_secs), format).await,
		},
		Err(err) => Err(err),
	};

	if let Err(err) = &result {
		let envelope: EmptyResult = ResultBuilder::new(command).error(err.code(), err.to_string()).build();
		print_result(&envelope, format);
	}
	result
}

/// Config file (or defaults), then flag overrides, then validation.
pub fn load_config(path: Option<&Path>, overrides: &ConfigOverrides) -> Result<EngineConfig> {
	let mut config = match path {
		Some(path) => {
			debug!(target = "farewatch", path = %path.display(), "loading config");
			EngineConfig::load(path)?
		}
		None => EngineConfig::default(),
	};
	overrides.apply(&mut config);
	config.validate().map_err(CliError::from)?;
	Ok(config)
}

#[cfg(test)]
mod tests {
	use std::io::Write;

	use fare::FareError;
	use tempfile::NamedTempFile;

	use super::*;

	#[test]
	fn flags_override_the_file() {
		let mut file = NamedTempFile::new().unwrap();
		write!(file, r#"{{"pollIntervalMs": 5000, "offerTtlSecs": 300}}"#).unwrap();
		let overrides = ConfigOverrides {
			poll_interval_ms: Some(750),
			..Default::default()
		};

		let config = load_config(Some(file.path()), &overrides).unwrap();

		assert_eq!(config.poll_interval_ms, 750);
		assert_eq!(config.offer_ttl_secs, 300);
	}

	#[test]
	fn invalid_result_is_rejected_after_overrides() {
		let overrides = ConfigOverrides {
			sweep_interval_ms: Some(0),
			..Default::default()
		};
		let err = load_config(None, &overrides).unwrap_err();
		assert!(matches!(err, CliError::Fare(FareError::Config(_))));
	}

	#[test]
	fn missing_file_is_an_io_error() {
		let dir = tempfile::tempdir().unwrap();
		let err = load_config(Some(dir.path().join("absent.json").as_path()), &ConfigOverrides::default()).unwrap_err();
		assert!(matches!(err, CliError::Fare(FareError::Io(_))));
	}
}
