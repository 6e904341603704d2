//! JSON output for the CLI
//!
//! Results go to stdout as a single JSON document, UTF-8.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use serde_json::Value;

use super::errors::{CliError, CliResult};
use crate::controller::Fixture;

/// Read and parse a fixture file
pub fn read_fixture(path: &Path) -> CliResult<Fixture> {
    let content = fs::read_to_string(path).map_err(|e| {
        CliError::fixture_error(format!("Failed to read fixture {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&content)
        .map_err(|e| CliError::fixture_error(format!("Invalid fixture JSON: {}", e)))
}

/// Write a JSON value to stdout
pub fn write_json(value: &Value, pretty: bool) -> CliResult<()> {
    let mut stdout = io::stdout().lock();
    if pretty {
        serde_json::to_writer_pretty(&mut stdout, value)?;
    } else {
        serde_json::to_writer(&mut stdout, value)?;
    }
    writeln!(stdout)?;
    stdout.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_read_fixture() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"definitions": [{{"type": "Host", "singular_name": "host", "plural_name": "hosts"}}]}}"#
        )
        .unwrap();

        let fixture = read_fixture(file.path()).unwrap();
        assert_eq!(fixture.definitions.len(), 1);
    }

    #[test]
    fn test_read_fixture_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_fixture(&dir.path().join("nope.json")).unwrap_err();
        assert_eq!(err.code_str(), "CLUSTERQ_CLI_FIXTURE_ERROR");
    }
}
