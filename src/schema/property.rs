//! Property id encoding
//!
//! A property id is the flat form of a `(category, name)` pair. The category
//! may itself be a path (`metrics/cpu`), so the *last* separator splits the
//! name off:
//!
//! ```text
//! (None,                "state")     <-> "state"
//! (Some("HostRoles"),   "state")     <-> "HostRoles/state"
//! (Some("metrics/cpu"), "cpu_user")  <-> "metrics/cpu/cpu_user"
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use super::errors::{SchemaError, SchemaResult};

/// Separator between path segments
pub const PATH_SEPARATOR: char = '/';

/// Encoded `(category, name)` pair
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyId(String);

impl PropertyId {
    /// Encodes a category and a name into a property id.
    pub fn encode(category: Option<&str>, name: &str) -> Self {
        match category {
            Some(category) if !category.is_empty() => {
                PropertyId(format!("{}{}{}", category, PATH_SEPARATOR, name))
            }
            _ => PropertyId(name.to_string()),
        }
    }

    /// Decodes a property id into its category and name.
    pub fn decode(id: &str) -> SchemaResult<(Option<String>, String)> {
        let parsed = Self::parse(id)?;
        Ok((
            parsed.category().map(str::to_string),
            parsed.name().to_string(),
        ))
    }

    /// Validates and wraps a raw property id.
    pub fn parse(id: &str) -> SchemaResult<Self> {
        if id.is_empty() {
            return Err(SchemaError::invalid_property_id(id, "empty id"));
        }
        if id.starts_with(PATH_SEPARATOR) || id.ends_with(PATH_SEPARATOR) {
            return Err(SchemaError::invalid_property_id(
                id,
                "leading or trailing separator",
            ));
        }
        if id.split(PATH_SEPARATOR).any(str::is_empty) {
            return Err(SchemaError::invalid_property_id(id, "empty segment"));
        }
        Ok(PropertyId(id.to_string()))
    }

    /// Wraps a raw id without validation.
    pub fn new_unchecked(id: impl Into<String>) -> Self {
        PropertyId(id.into())
    }

    /// Category part, if any
    pub fn category(&self) -> Option<&str> {
        self.0.rfind(PATH_SEPARATOR).map(|i| &self.0[..i])
    }

    /// Name part
    pub fn name(&self) -> &str {
        match self.0.rfind(PATH_SEPARATOR) {
            Some(i) => &self.0[i + 1..],
            None => &self.0,
        }
    }

    /// Returns true if this id equals `category` or lives beneath it
    pub fn is_within(&self, category: &str) -> bool {
        self.0 == category
            || (self.0.starts_with(category)
                && self.0[category.len()..].starts_with(PATH_SEPARATOR))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PropertyId {
    fn from(id: &str) -> Self {
        PropertyId(id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode() {
        assert_eq!(PropertyId::encode(None, "state").as_str(), "state");
        assert_eq!(
            PropertyId::encode(Some("HostRoles"), "state").as_str(),
            "HostRoles/state"
        );
        assert_eq!(
            PropertyId::encode(Some("metrics/cpu"), "cpu_user").as_str(),
            "metrics/cpu/cpu_user"
        );
    }

    #[test]
    fn test_decode_inverts_encode() {
        let pairs = [
            (None, "state"),
            (Some("Hosts"), "host_name"),
            (Some("metrics/disk/sda"), "read_bytes"),
        ];
        for (category, name) in pairs {
            let id = PropertyId::encode(category, name);
            let (c, n) = PropertyId::decode(id.as_str()).unwrap();
            assert_eq!(c.as_deref(), category);
            assert_eq!(n, name);
        }
    }

    #[test]
    fn test_decode_rejects_malformed() {
        for bad in ["", "/a", "a/", "a//b", "/"] {
            let err = PropertyId::decode(bad).unwrap_err();
            assert_eq!(err.code(), "CLUSTERQ_INVALID_PROPERTY_ID");
        }
    }

    #[test]
    fn test_accessors() {
        let id = PropertyId::from("Hosts/host_name");
        assert_eq!(id.category(), Some("Hosts"));
        assert_eq!(id.name(), "host_name");

        let bare = PropertyId::from("state");
        assert_eq!(bare.category(), None);
        assert_eq!(bare.name(), "state");
    }

    #[test]
    fn test_is_within() {
        let id = PropertyId::from("metrics/cpu/cpu_user");
        assert!(id.is_within("metrics"));
        assert!(id.is_within("metrics/cpu"));
        assert!(id.is_within("metrics/cpu/cpu_user"));
        assert!(!id.is_within("metric"));
        assert!(!id.is_within("metrics/cp"));
    }
}
