pub mod cli;
pub mod commands;
pub mod error;
pub mod host_file;
pub mod logging;
pub mod output;
