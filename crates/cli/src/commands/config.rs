use fare::EngineConfig;

use crate::error::Result;
use crate::output::{OutputFormat, ResultBuilder, print_result};

pub fn execute(config: &EngineConfig, format: OutputFormat) -> Result<()> {
	let result = ResultBuilder::new("config").data(config).build();
	print_result(&result, format);
	Ok(())
}
