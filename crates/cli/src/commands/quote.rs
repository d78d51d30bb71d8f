use std::path::Path;
use std::sync::Arc;

use fare::backend::HttpBackend;
use fare::{CycleOutcome, Engine, EngineConfig, FareError, GeoPoint, SkipReason, StaticHost};
use tracing::info;

use crate::error::{CliError, Result};
use crate::host_file::FileCredentials;
use crate::output::{OutputFormat, ResultBuilder, print_panel};

/// Resolves and prices `waypoints` once, then prints the panel.
pub async fn execute(config: EngineConfig, session: &Path, center: GeoPoint, waypoints: Vec<String>, format: OutputFormat) -> Result<()> {
	let credentials = Arc::new(FileCredentials::new(session));
	let backend = Arc::new(HttpBackend::new(config.backend.clone(), credentials)?);
	let host = Arc::new(StaticHost::new(waypoints, center));
	let engine = Engine::new(config, backend, host)?;

	match engine.poll_once().await {
		CycleOutcome::Merged { fresh, .. } => {
			info!(target = "farewatch", prices = fresh.len(), "route priced");
		}
		CycleOutcome::Skipped(SkipReason::InputUnavailable) => {
			return Err(CliError::InvalidInput("every waypoint must be non-empty".to_string()));
		}
		CycleOutcome::Skipped(reason) => {
			return Err(CliError::Quote(format!("cycle skipped: {reason:?}")));
		}
		CycleOutcome::ResolutionFailed(failure) => return Err(FareError::Resolution(failure).into()),
		CycleOutcome::FetchFailed(message) => return Err(CliError::Quote(message)),
		CycleOutcome::Stale => return Err(CliError::Quote("route changed while pricing".to_string())),
	}

	let result = ResultBuilder::new("quote").data(engine.snapshot()).build();
	print_panel(&result, format);
	Ok(())
}
