//! Process-level plumbing shared by the server binary: layered configuration,
//! logging initialization and home directory resolution.

pub mod config;
pub mod logging;
pub mod paths;

pub use config::{AppConfig, CliArgs, DatabaseConfig, LoggingConfig, Section, ServerConfig};
