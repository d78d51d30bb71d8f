//! File-backed host page and session credentials.
//!
//! Whatever drives the page (a browser extension, a script, a person with an
//! editor) writes two JSON files; the engine re-reads them on every access so
//! edits take effect on the next poll.
//!
//! Host file:
//!
//! ```json
//! { "waypoints": ["Addr A", "Addr B"], "center": [37.62, 55.75], "pickerOpen": false }
//! ```
//!
//! Session file:
//!
//! ```json
//! { "userId": "…", "csrfToken": "…" }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use fare::{CredentialSource, FareError, GeoPoint, HostPage, SessionCredentials};
use serde::Deserialize;
use tracing::debug;

/// On-disk shape of the host file. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostFile {
	#[serde(default)]
	pub waypoints: Vec<String>,
	#[serde(default)]
	pub center: Option<GeoPoint>,
	#[serde(default)]
	pub picker_open: bool,
}

/// [`HostPage`] backed by a JSON file.
///
/// A missing or malformed file reads as an empty page, which the engine
/// treats as "no route yet".
#[derive(Debug, Clone)]
pub struct FileHost {
	path: PathBuf,
}

impl FileHost {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	pub fn read(&self) -> HostFile {
		let content = match fs::read_to_string(&self.path) {
			Ok(content) => content,
			Err(e) => {
				debug!(target = "farewatch", path = %self.path.display(), error = %e, "host file unreadable");
				return HostFile::default();
			}
		};
		serde_json::from_str(&content).unwrap_or_else(|e| {
			debug!(target = "farewatch", path = %self.path.display(), error = %e, "host file malformed");
			HostFile::default()
		})
	}
}

impl HostPage for FileHost {
	fn route_inputs(&self) -> Vec<String> {
		self.read().waypoints
	}

	fn map_center(&self) -> Option<GeoPoint> {
		self.read().center
	}

	fn picker_open(&self) -> bool {
		self.read().picker_open
	}
}

/// [`CredentialSource`] backed by a JSON file, re-read on every request.
#[derive(Debug, Clone)]
pub struct FileCredentials {
	path: PathBuf,
}

impl FileCredentials {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}
}

impl CredentialSource for FileCredentials {
	fn credentials(&self) -> fare::Result<SessionCredentials> {
		let content = fs::read_to_string(&self.path).map_err(|e| FareError::Credentials(format!("{}: {e}", self.path.display())))?;
		let credentials: SessionCredentials =
			serde_json::from_str(&content).map_err(|e| FareError::Credentials(format!("{}: {e}", self.path.display())))?;
		if credentials.user_id.trim().is_empty() {
			return Err(FareError::Credentials(format!("{}: userId is empty", self.path.display())));
		}
		Ok(credentials)
	}
}

#[cfg(test)]
mod tests {
	use std::io::Write;

	use tempfile::NamedTempFile;

	use super::*;

	fn file_with(content: &str) -> NamedTempFile {
		let mut file = NamedTempFile::new().unwrap();
		file.write_all(content.as_bytes()).unwrap();
		file
	}

	#[test]
	fn reads_all_host_signals() {
		let file = file_with(r#"{"waypoints": ["Addr A", "Addr B"], "center": [37.62, 55.75], "pickerOpen": true}"#);
		let host = FileHost::new(file.path());

		assert_eq!(host.route_inputs(), vec!["Addr A", "Addr B"]);
		assert_eq!(host.map_center(), Some(GeoPoint::new(37.62, 55.75)));
		assert!(host.picker_open());
	}

	#[test]
	fn picks_up_edits_between_reads() {
		let file = file_with(r#"{"waypoints": ["Addr A"]}"#);
		let host = FileHost::new(file.path());
		assert_eq!(host.route_inputs().len(), 1);
		assert_eq!(host.map_center(), None);

		fs::write(file.path(), r#"{"waypoints": ["Addr A", "Addr C"], "center": [30.31, 59.94]}"#).unwrap();
		assert_eq!(host.route_inputs(), vec!["Addr A", "Addr C"]);
		assert!(!host.picker_open());
	}

	#[test]
	fn missing_or_malformed_file_reads_as_empty_page() {
		let dir = tempfile::tempdir().unwrap();
		let host = FileHost::new(dir.path().join("absent.json"));
		assert_eq!(host.read(), HostFile::default());

		let file = file_with("{not json");
		assert!(FileHost::new(file.path()).route_inputs().is_empty());
	}

	#[test]
	fn loads_session_credentials() {
		let file = file_with(r#"{"userId": "u-42", "csrfToken": "tok"}"#);
		let credentials = FileCredentials::new(file.path()).credentials().unwrap();
		assert_eq!(credentials.user_id, "u-42");
		assert_eq!(credentials.csrf_token, "tok");
	}

	#[test]
	fn credential_problems_are_reported() {
		let dir = tempfile::tempdir().unwrap();
		let err = FileCredentials::new(dir.path().join("absent.json")).credentials().unwrap_err();
		assert!(matches!(err, FareError::Credentials(_)));

		let file = file_with(r#"{"userId": " ", "csrfToken": "tok"}"#);
		let err = FileCredentials::new(file.path()).credentials().unwrap_err();
		assert!(err.to_string().contains("userId is empty"));
	}
}
