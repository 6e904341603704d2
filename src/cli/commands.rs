//! CLI command implementations
//!
//! `query` loads a fixture into an in-memory controller, builds a query
//! tree from the arguments, executes it and prints the rendered result.

use std::path::Path;
use std::sync::Arc;

use serde_json::{json, Value};
use tracing::info;

use crate::controller::{
    ClusterController, InMemoryController, PageRequest, SortRequest, StartingPoint,
};
use crate::predicate::Predicate;
use crate::query::Query;
use crate::schema::{KeyBinding, KeyValueMap, PropertyId, ResourceType};

use super::args::{Cli, Command, QueryArgs};
use super::config::CliConfig;
use super::errors::{CliError, CliResult};
use super::io::{read_fixture, write_json};
use super::logging::init_logging;

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Query(args) => query(&args),
        Command::Types { config, fixture } => types(&config, &fixture),
    }
}

/// Execute a single query and print the result
pub fn query(args: &QueryArgs) -> CliResult<()> {
    let config = CliConfig::load(&args.config)?;
    init_logging(args.log_filter.as_deref().unwrap_or(&config.log_filter));

    let output = execute(args, &config)?;
    write_json(&output, config.pretty && !args.compact)
}

/// List the resource types of a fixture
pub fn types(config_path: &Path, fixture_path: &Path) -> CliResult<()> {
    let config = CliConfig::load(config_path)?;
    init_logging(&config.log_filter);

    let output = describe_types(fixture_path)?;
    write_json(&output, config.pretty)
}

/// Runs the query described by `args` and returns the rendered result
pub fn execute(args: &QueryArgs, config: &CliConfig) -> CliResult<Value> {
    let fixture = read_fixture(&args.fixture)?;
    let catalog = Arc::new(fixture.definitions.clone());
    let controller: Arc<dyn ClusterController> = Arc::new(InMemoryController::from_fixture(&fixture));

    let resource_type = catalog
        .definition_by_name(&args.resource)
        .map(|d| d.resource_type.clone())
        .ok_or_else(|| CliError::invalid_argument(format!("Unknown resource '{}'", args.resource)))?;

    let mut key_value_map = parse_keys(&args.keys)?;
    key_value_map
        .entry(resource_type.clone())
        .or_insert(KeyBinding::Unbound);

    let mut query = Query::new(resource_type.clone(), key_value_map, catalog, controller)?;
    if let Some(fields) = &args.fields {
        query.add_fields(fields)?;
    }
    query.set_user_predicate(parse_filters(&args.filters)?);
    query.set_page_request(page_request(args, config)?);

    info!(resource_type = %resource_type, "running query");
    let result = query.execute()?;
    info!(rows = result.len(), total = ?result.total_count(), "query complete");

    Ok(result.to_json())
}

fn describe_types(fixture_path: &Path) -> CliResult<Value> {
    let fixture = read_fixture(fixture_path)?;
    let definitions: Vec<Value> = Vec::from(fixture.definitions)
        .into_iter()
        .map(|d| {
            let sub_resources: Vec<&str> = d.sub_resources.iter().map(|s| s.resource_type.as_str()).collect();
            json!({
                "type": d.resource_type,
                "singular_name": d.singular_name,
                "plural_name": d.plural_name,
                "sub_resources": sub_resources,
            })
        })
        .collect();
    Ok(json!({ "items": definitions }))
}

/// Parses `Type=value` bindings; an empty value leaves the type unbound
fn parse_keys(keys: &[String]) -> CliResult<KeyValueMap> {
    let mut map = KeyValueMap::new();
    for key in keys {
        let (resource_type, value) = split_assignment(key, "--key")?;
        let binding = if value.is_empty() {
            KeyBinding::Unbound
        } else {
            KeyBinding::bound(value)
        };
        map.insert(ResourceType::new(resource_type), binding);
    }
    Ok(map)
}

fn parse_filters(filters: &[String]) -> CliResult<Option<Predicate>> {
    let mut equalities = Vec::with_capacity(filters.len());
    for filter in filters {
        let (property, value) = split_assignment(filter, "--filter")?;
        let property_id = PropertyId::parse(property)
            .map_err(|e| CliError::invalid_argument(e.to_string()))?;
        equalities.push(Predicate::equals(property_id, value));
    }
    Ok(Predicate::and(equalities))
}

fn parse_sort(sort: &[String]) -> CliResult<Option<SortRequest>> {
    if sort.is_empty() {
        return Ok(None);
    }
    let mut request = SortRequest::default();
    for key in sort {
        let (property, order) = match key.rsplit_once(':') {
            Some((property, order)) => (property, order),
            None => (key.as_str(), "asc"),
        };
        let property_id = PropertyId::parse(property)
            .map_err(|e| CliError::invalid_argument(e.to_string()))?;
        request = match order {
            "asc" => request.asc(property_id),
            "desc" => request.desc(property_id),
            other => {
                return Err(CliError::invalid_argument(format!(
                    "Invalid sort order '{}' in '{}'",
                    other, key
                )))
            }
        };
    }
    Ok(Some(request))
}

/// Sorting without an explicit page size pages over every row
fn page_request(args: &QueryArgs, config: &CliConfig) -> CliResult<Option<PageRequest>> {
    let sort = parse_sort(&args.sort)?;
    let page_size = match (args.page_size.or(config.default_page_size), &sort) {
        (Some(0), _) => return Err(CliError::invalid_argument("--page-size must be > 0")),
        (Some(size), _) => size,
        (None, Some(_)) => usize::MAX,
        (None, None) => return Ok(None),
    };

    let starting_point = match (args.offset, args.from_end) {
        (None, false) => StartingPoint::Beginning,
        (None, true) => StartingPoint::End,
        (Some(offset), false) => StartingPoint::OffsetStart(offset),
        (Some(offset), true) => StartingPoint::OffsetEnd(offset),
    };

    Ok(Some(PageRequest {
        starting_point,
        page_size,
        sort,
    }))
}

fn split_assignment<'a>(arg: &'a str, flag: &str) -> CliResult<(&'a str, &'a str)> {
    match arg.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name, value)),
        _ => Err(CliError::invalid_argument(format!(
            "Invalid {} '{}': expected NAME=VALUE",
            flag, arg
        ))),
    }
}
