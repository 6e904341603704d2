//! CLI argument definitions using clap
//!
//! Commands:
//! - clusterq query <resource> --fixture <path> [--key T=v]... [--fields ..]
//! - clusterq types --fixture <path>

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// clusterq - schema-driven resource queries over cluster fixtures
#[derive(Parser, Debug)]
#[command(name = "clusterq")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Execute a single query and print the result tree
    Query(QueryArgs),

    /// List the resource types defined by a fixture
    Types {
        /// Path to configuration file
        #[arg(long, default_value = "./clusterq.json")]
        config: PathBuf,

        /// Fixture holding resource definitions and rows
        #[arg(long)]
        fixture: PathBuf,
    },
}

#[derive(Args, Debug, Clone)]
pub struct QueryArgs {
    /// Resource type, or its singular/plural name
    pub resource: String,

    /// Path to configuration file
    #[arg(long, default_value = "./clusterq.json")]
    pub config: PathBuf,

    /// Fixture holding resource definitions and rows
    #[arg(long)]
    pub fixture: PathBuf,

    /// Key binding `Type=value`; repeatable
    #[arg(long = "key", value_name = "TYPE=VALUE")]
    pub keys: Vec<String>,

    /// Comma-separated field selection, e.g. `Hosts/host_name,host_components`
    #[arg(long)]
    pub fields: Option<String>,

    /// Equality filter `property=value`; repeatable, all must hold
    #[arg(long = "filter", value_name = "PROPERTY=VALUE")]
    pub filters: Vec<String>,

    /// Rows per page
    #[arg(long)]
    pub page_size: Option<usize>,

    /// Page offset
    #[arg(long)]
    pub offset: Option<usize>,

    /// Count the offset back from the last row
    #[arg(long)]
    pub from_end: bool,

    /// Sort key `property[:asc|:desc]`; repeatable
    #[arg(long = "sort", value_name = "PROPERTY[:ORDER]")]
    pub sort: Vec<String>,

    /// Print compact JSON
    #[arg(long)]
    pub compact: bool,

    /// Tracing filter directive, overrides the configured one
    #[arg(long)]
    pub log_filter: Option<String>,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
