//! CLI module for clusterq
//!
//! Provides command-line interface for:
//! - query: One-shot query execution against a fixture
//! - types: Listing the resource definitions of a fixture

mod args;
mod commands;
mod config;
mod errors;
mod io;
mod logging;

pub use args::{Cli, Command, QueryArgs};
pub use commands::{execute, query, run, run_command, types};
pub use config::CliConfig;
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_fixture, write_json};
pub use logging::init_logging;
