use std::fmt::Write;
use std::time::Duration;

use colored::Colorize;
use fare::PanelSnapshot;
use fare::panel::format_remaining;

use crate::output::data::{EventData, EventKind};

const LABEL_WIDTH: usize = 10;
const UNAVAILABLE: &str = "недоступно";

/// Draws the price panel: one line per level, cheapest price highlighted.
pub fn render_panel(snapshot: &PanelSnapshot) -> String {
	let mut out = String::new();
	match &snapshot.route {
		Some(route) => {
			let _ = writeln!(out, "{} {}", "Route:".bold(), route);
		}
		None => {
			let _ = writeln!(out, "{}", "Route: waiting for input".dimmed());
		}
	}

	if snapshot.is_empty() {
		let _ = writeln!(out, "{}", "No live prices".dimmed());
		return out;
	}

	for level in &snapshot.levels {
		let prices: Vec<String> = level
			.prices
			.iter()
			.map(|row| {
				let price = if !row.price.is_quoted() {
					UNAVAILABLE.dimmed().to_string()
				} else if row.lowest {
					row.price.to_string().green().bold().to_string()
				} else {
					row.price.to_string()
				};
				format!("{price} {}", format!("({})", row.remaining()).dimmed())
			})
			.collect();
		let _ = write!(out, "{:<width$}  {}", level.label, prices.join("  "), width = LABEL_WIDTH);
		if level.prices.iter().filter(|row| row.price.is_quoted()).count() > 1 {
			let _ = write!(out, "  {}", format!("+{}", level.profit).yellow());
		}
		out.push('\n');
	}
	out
}

/// One line describing a watch event.
pub fn render_event(event: &EventData) -> String {
	let key = || match (event.level, event.price) {
		(Some(level), Some(price)) => format!("{} {price}", level.label()),
		_ => String::new(),
	};
	match event.kind {
		EventKind::Priced => {
			let remaining = format_remaining(Duration::from_secs(event.remaining_secs.unwrap_or_default()));
			format!("{} {} {}", "+".green(), key(), format!("({remaining})").dimmed())
		}
		EventKind::Expired => format!("{} {} expired", "-".red(), key()),
		EventKind::Reset => match &event.route {
			Some(route) => format!("{} route {route}, prices reset", "~".cyan()),
			None => format!("{} prices reset", "~".cyan()),
		},
	}
}
