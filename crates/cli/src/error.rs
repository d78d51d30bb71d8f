use fare::FareError;
use thiserror::Error;

use crate::output::ErrorCode;

#[derive(Debug, Error)]
pub enum CliError {
	#[error(transparent)]
	Fare(#[from] FareError),

	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),

	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),

	#[error("Invalid input: {0}")]
	InvalidInput(String),

	#[error("Quote failed: {0}")]
	Quote(String),

	#[error(transparent)]
	Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, CliError>;

impl CliError {
	/// Stable code for the output envelope.
	pub fn code(&self) -> ErrorCode {
		match self {
			CliError::Fare(err) => match err {
				FareError::Config(_) => ErrorCode::ConfigError,
				FareError::Credentials(_) => ErrorCode::CredentialsError,
				FareError::Resolution(_) => ErrorCode::ResolutionFailed,
				FareError::OfferUnavailable { .. } | FareError::NoActiveRoute => ErrorCode::OfferUnavailable,
				FareError::Order { .. } => ErrorCode::OrderFailed,
				FareError::Http { .. } | FareError::Status { .. } | FareError::EmptyResponse { .. } | FareError::Backend(_) => ErrorCode::BackendError,
				FareError::Io(_) => ErrorCode::IoError,
				FareError::Json(_) => ErrorCode::ConfigError,
			},
			CliError::Io(_) => ErrorCode::IoError,
			CliError::Json(_) => ErrorCode::InvalidInput,
			CliError::InvalidInput(_) => ErrorCode::InvalidInput,
			CliError::Quote(_) => ErrorCode::QuoteFailed,
			CliError::Other(_) => ErrorCode::InternalError,
		}
	}
}

#[cfg(test)]
mod tests {
	use fare::{Price, ResolveFailure, ServiceLevel};

	use super::*;

	#[test]
	fn maps_engine_errors_to_codes() {
		let err = CliError::from(FareError::Config("pollIntervalMs must be greater than zero".into()));
		assert_eq!(err.code(), ErrorCode::ConfigError);

		let err = CliError::from(FareError::from(ResolveFailure::new("Nowhere", "no address candidates")));
		assert_eq!(err.code(), ErrorCode::ResolutionFailed);

		let err = CliError::from(FareError::OfferUnavailable {
			level: ServiceLevel::Econom,
			price: Price::from(399),
		});
		assert_eq!(err.code(), ErrorCode::OfferUnavailable);
		assert_eq!(err.to_string(), "No live offer for econom at 399");
	}

	#[test]
	fn wraps_anyhow_context() {
		let err = CliError::from(anyhow::anyhow!("stdin closed"));
		assert_eq!(err.code(), ErrorCode::InternalError);
		assert_eq!(err.to_string(), "stdin closed");
	}
}
