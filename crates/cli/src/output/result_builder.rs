use std::io::{self, Write};
use std::time::Instant;

use fare::PanelSnapshot;
use serde::Serialize;

use crate::output::format::OutputFormat;
use crate::output::model::{CommandError, CommandResult, ErrorCode, SCHEMA_VERSION};
use crate::output::panel::render_panel;

/// Builder for constructing command results.
pub struct ResultBuilder<T: Serialize> {
	schema_version: Option<u32>,
	command: String,
	data: Option<T>,
	error: Option<CommandError>,
	start_time: Option<Instant>,
	duration_ms: Option<u64>,
}

impl<T: Serialize> ResultBuilder<T> {
	pub fn new(command: impl Into<String>) -> Self {
		Self {
			schema_version: Some(SCHEMA_VERSION),
			command: command.into(),
			data: None,
			error: None,
			start_time: Some(Instant::now()),
			duration_ms: None,
		}
	}

	pub fn data(mut self, data: T) -> Self {
		self.data = Some(data);
		self
	}

	pub fn error(mut self, code: ErrorCode, message: impl Into<String>) -> Self {
		self.error = Some(CommandError {
			code,
			message: message.into(),
		});
		self
	}

	pub fn duration_ms(mut self, duration_ms: u64) -> Self {
		self.duration_ms = Some(duration_ms);
		self
	}

	pub fn build(self) -> CommandResult<T> {
		let ok = self.error.is_none() && self.data.is_some();
		let duration_ms = self.duration_ms.or_else(|| self.start_time.map(|start| start.elapsed().as_millis() as u64));

		CommandResult {
			schema_version: self.schema_version,
			ok,
			command: self.command,
			data: self.data,
			error: self.error,
			duration_ms,
		}
	}
}

/// Print a command result to stdout in the specified format.
pub fn print_result<T: Serialize>(result: &CommandResult<T>, format: OutputFormat) {
	match format {
		OutputFormat::Json => {
			if let Ok(json) = serde_json::to_string_pretty(result) {
				println!("{json}");
			}
		}
		OutputFormat::Ndjson => {
			if let Ok(json) = serde_json::to_string(result) {
				println!("{json}");
			}
		}
		OutputFormat::Text => {
			print_result_text(result);
		}
	}
}

/// Like [`print_result`], but text mode draws the price panel instead of
/// dumping the snapshot as JSON.
pub fn print_panel(result: &CommandResult<PanelSnapshot>, format: OutputFormat) {
	match (format, &result.data) {
		(OutputFormat::Text, Some(snapshot)) if result.ok => {
			print!("{}", render_panel(snapshot));
			let _ = io::stdout().flush();
		}
		_ => print_result(result, format),
	}
}

fn print_result_text<T: Serialize>(result: &CommandResult<T>) {
	let mut stdout = io::stdout().lock();

	if result.ok {
		if let Some(ref data) = result.data {
			if let Ok(json) = serde_json::to_string_pretty(data) {
				let _ = writeln!(stdout, "{json}");
			}
		}
	} else if let Some(ref error) = result.error {
		let _ = writeln!(stdout, "Error [{}]: {}", error.code, error.message);
	}
}
