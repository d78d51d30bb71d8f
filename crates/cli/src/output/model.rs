use serde::{Deserialize, Serialize};

/// Current schema version for command output.
pub const SCHEMA_VERSION: u32 = 1;

/// The result envelope returned by all commands.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResult<T: Serialize> {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub schema_version: Option<u32>,
	pub ok: bool,
	pub command: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub data: Option<T>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error: Option<CommandError>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub duration_ms: Option<u64>,
}

/// Error information for failed commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandError {
	pub code: ErrorCode,
	pub message: String,
}

/// Standardized error codes for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
	ConfigError,
	CredentialsError,
	ResolutionFailed,
	QuoteFailed,
	OfferUnavailable,
	OrderFailed,
	BackendError,
	IoError,
	InvalidInput,
	InternalError,
}

impl std::fmt::Display for ErrorCode {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			ErrorCode::ConfigError => write!(f, "CONFIG_ERROR"),
			ErrorCode::CredentialsError => write!(f, "CREDENTIALS_ERROR"),
			ErrorCode::ResolutionFailed => write!(f, "RESOLUTION_FAILED"),
			ErrorCode::QuoteFailed => write!(f, "QUOTE_FAILED"),
			ErrorCode::OfferUnavailable => write!(f, "OFFER_UNAVAILABLE"),
			ErrorCode::OrderFailed => write!(f, "ORDER_FAILED"),
			ErrorCode::BackendError => write!(f, "BACKEND_ERROR"),
			ErrorCode::IoError => write!(f, "IO_ERROR"),
			ErrorCode::InvalidInput => write!(f, "INVALID_INPUT"),
			ErrorCode::InternalError => write!(f, "INTERNAL_ERROR"),
		}
	}
}

/// A command result with no payload data.
pub type EmptyResult = CommandResult<()>;
