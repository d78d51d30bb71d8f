//! `farewatch watch`: live panel plus interactive ordering.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use fare::backend::HttpBackend;
use fare::{Engine, EngineConfig, Price, ServiceLevel, SessionEvent};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tokio::time::Instant;
use tracing::{info, warn};

use crate::error::{CliError, Result};
use crate::host_file::{FileCredentials, FileHost};
use crate::output::{EmptyResult, EventData, OutputFormat, ResultBuilder, print_panel, print_result, render_event};

/// A line typed while watching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchCommand {
	Order { level: ServiceLevel, price: Price },
	Show,
	Quit,
}

/// Parses `order <class> <price>`, `show` or `quit`. Blank lines mean `show`.
pub fn parse_command(line: &str) -> std::result::Result<WatchCommand, String> {
	let mut words = line.split_whitespace();
	let Some(verb) = words.next() else {
		return Ok(WatchCommand::Show);
	};

	let command = match verb.to_lowercase().as_str() {
		"show" | "panel" => WatchCommand::Show,
		"quit" | "exit" | "q" => WatchCommand::Quit,
		"order" => {
			let level = words.next().ok_or("usage: order <class> <price>")?;
			let price = words.next().ok_or("usage: order <class> <price>")?;
			WatchCommand::Order {
				level: ServiceLevel::parse(level).ok_or_else(|| format!("unknown class: {level}"))?,
				price: price.parse()?,
			}
		}
		other => return Err(format!("unknown command: {other}")),
	};

	match words.next() {
		Some(extra) => Err(format!("unexpected argument: {extra}")),
		None => Ok(command),
	}
}

pub async fn execute(config: EngineConfig, host: &Path, session: &Path, duration: Option<Duration>, format: OutputFormat) -> Result<()> {
	let credentials = Arc::new(FileCredentials::new(session));
	let backend = Arc::new(HttpBackend::new(config.backend.clone(), credentials)?);
	let engine = Engine::new(config, backend, Arc::new(FileHost::new(host)))?;

	let mut events = engine.subscribe();
	engine.start();
	info!(target = "farewatch", host = %host.display(), "watching");

	let mut lines = BufReader::new(tokio::io::stdin()).lines();
	let mut stdin_open = true;
	let stop = async {
		match duration {
			Some(duration) => tokio::time::sleep(duration).await,
			None => std::future::pending().await,
		}
	};
	tokio::pin!(stop);

	loop {
		tokio::select! {
			event = events.recv() => match event {
				Ok(event) => emit_event(&event, format),
				Err(RecvError::Lagged(skipped)) => {
					warn!(target = "farewatch", skipped, "display fell behind, redrawing");
					show_panel(&engine, format);
				}
				Err(RecvError::Closed) => break,
			},
			line = lines.next_line(), if stdin_open => match line? {
				Some(line) => match parse_command(&line) {
					Ok(WatchCommand::Quit) => break,
					Ok(WatchCommand::Show) => show_panel(&engine, format),
					Ok(WatchCommand::Order { level, price }) => place_order(&engine, level, price, format).await,
					Err(message) => {
						let result: EmptyResult = ResultBuilder::new("watch").error(CliError::InvalidInput(message.clone()).code(), message).build();
						print_result(&result, format);
					}
				},
				None => stdin_open = false,
			},
			_ = tokio::signal::ctrl_c() => break,
			_ = &mut stop => break,
		}
	}

	engine.shutdown();
	Ok(())
}

fn emit_event(event: &SessionEvent, format: OutputFormat) {
	let data = EventData::from_event(event, Instant::now());
	if format.is_machine() {
		print_result(&ResultBuilder::new("watch").data(data).build(), format);
	} else {
		println!("{}", render_event(&data));
	}
}

fn show_panel(engine: &Engine, format: OutputFormat) {
	print_panel(&ResultBuilder::new("watch").data(engine.snapshot()).build(), format);
}

/// Order failures are shown and the watch goes on.
async fn place_order(engine: &Engine, level: ServiceLevel, price: Price, format: OutputFormat) {
	match engine.place_order(level, price).await {
		Ok(receipt) => print_result(&ResultBuilder::new("order").data(receipt).build(), format),
		Err(err) => {
			let err = CliError::from(err);
			let result: EmptyResult = ResultBuilder::new("order").error(err.code(), err.to_string()).build();
			print_result(&result, format);
		}
	}
}
