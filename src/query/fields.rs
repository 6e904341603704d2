//! Field selection parsing
//!
//! Parses the comma-separated `fields` list of a read request:
//!
//! ```text
//! Hosts/host_name,host_components/HostRoles/state,metrics/cpu[1700000000,1700003600,60],*
//! ```
//!
//! The last `/` separates category from name. An optional
//! `[start,end,step]` suffix (epoch seconds, end and step optional) attaches
//! a time range to the field.

use crate::controller::TemporalInfo;

use super::errors::{QueryError, QueryResult};

/// One parsed field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSelection {
    pub category: Option<String>,
    pub name: String,
    pub temporal_info: Option<TemporalInfo>,
}

/// Parses a comma-separated field list.
///
/// Commas inside brackets do not split fields; empty entries are skipped.
pub fn parse_fields(fields: &str) -> QueryResult<Vec<FieldSelection>> {
    split_top_level(fields)?
        .into_iter()
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(|f| parse_field(fields, f))
        .collect()
}

fn split_top_level(fields: &str) -> QueryResult<Vec<&str>> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (i, c) in fields.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| QueryError::invalid_fields(fields, "unbalanced ']'"))?;
            }
            ',' if depth == 0 => {
                parts.push(&fields[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(QueryError::invalid_fields(fields, "unclosed '['"));
    }
    parts.push(&fields[start..]);
    Ok(parts)
}

fn parse_field(fields: &str, field: &str) -> QueryResult<FieldSelection> {
    let (path, temporal_info) = match field.find('[') {
        Some(open) => {
            let inner = field[open + 1..]
                .strip_suffix(']')
                .ok_or_else(|| QueryError::invalid_fields(fields, "text after ']'"))?;
            (&field[..open], Some(parse_temporal(fields, inner)?))
        }
        None => (field, None),
    };

    let (category, name) = match path.rfind('/') {
        Some(i) => (Some(path[..i].to_string()), path[i + 1..].to_string()),
        None => (None, path.to_string()),
    };
    if name.is_empty() {
        return Err(QueryError::invalid_fields(fields, format!("empty name in '{}'", field)));
    }

    Ok(FieldSelection {
        category,
        name,
        temporal_info,
    })
}

fn parse_temporal(fields: &str, inner: &str) -> QueryResult<TemporalInfo> {
    let numbers = inner
        .split(',')
        .map(|n| n.trim().parse::<i64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| QueryError::invalid_fields(fields, format!("bad time range '{}': {}", inner, e)))?;

    let (start, end, step) = match numbers.as_slice() {
        [start] => (*start, None, None),
        [start, end] => (*start, Some(*end), None),
        [start, end, step] => (*start, Some(*end), Some(*step)),
        _ => {
            return Err(QueryError::invalid_fields(
                fields,
                format!("expected 1 to 3 values in '[{}]'", inner),
            ))
        }
    };

    let step = match step {
        Some(s) => Some(
            u64::try_from(s)
                .map_err(|_| QueryError::invalid_fields(fields, "negative step"))?,
        ),
        None => None,
    };

    TemporalInfo::from_epoch_seconds(start, end, step)
        .ok_or_else(|| QueryError::invalid_fields(fields, "time out of range"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_fields() {
        let parsed = parse_fields("Hosts/host_name, host_components ,*").unwrap();
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[0].category.as_deref(), Some("Hosts"));
        assert_eq!(parsed[0].name, "host_name");
        assert_eq!(parsed[1].category, None);
        assert_eq!(parsed[1].name, "host_components");
        assert_eq!(parsed[2].name, "*");
    }

    #[test]
    fn test_nested_path() {
        let parsed = parse_fields("host_components/HostRoles/state").unwrap();
        assert_eq!(parsed[0].category.as_deref(), Some("host_components/HostRoles"));
        assert_eq!(parsed[0].name, "state");
    }

    #[test]
    fn test_temporal_suffix() {
        let parsed = parse_fields("metrics/cpu[100,200,15],Hosts/host_name").unwrap();
        assert_eq!(parsed.len(), 2);
        let t = parsed[0].temporal_info.unwrap();
        assert_eq!(t.start_time.timestamp(), 100);
        assert_eq!(t.end_time.unwrap().timestamp(), 200);
        assert_eq!(t.step, Some(15));
        assert_eq!(parsed[0].category.as_deref(), Some("metrics"));
        assert_eq!(parsed[0].name, "cpu");
    }

    #[test]
    fn test_empty_entries_skipped() {
        assert!(parse_fields("").unwrap().is_empty());
        assert_eq!(parse_fields("a,,b").unwrap().len(), 2);
    }

    #[test]
    fn test_malformed() {
        for bad in ["metrics[1,2", "metrics]", "metrics[x]", "metrics[1,2,3,4]", "metrics[1]x", "Hosts/", "m[1,2,-5]"] {
            let err = parse_fields(bad).unwrap_err();
            assert_eq!(err.code(), "CLUSTERQ_INVALID_FIELDS", "input {}", bad);
        }
    }
}
