//! Predicate evaluation against resources
//!
//! Equality compares JSON values exactly, falling back to the key rendering
//! so that a string key `"8"` matches a numeric property `8`.

use serde_json::Value;

use super::predicate::Predicate;
use crate::resource::{value_as_key, Resource};

/// Evaluates predicates against resources
pub struct PredicateFilter;

impl PredicateFilter {
    /// Checks if a resource matches an optional predicate.
    ///
    /// No predicate matches everything.
    pub fn matches(resource: &Resource, predicate: Option<&Predicate>) -> bool {
        match predicate {
            Some(p) => Self::evaluate(resource, p),
            None => true,
        }
    }

    /// Checks if a resource matches a predicate
    pub fn evaluate(resource: &Resource, predicate: &Predicate) -> bool {
        match predicate {
            Predicate::Equals { property_id, value } => match resource.property_value(property_id) {
                Some(actual) => Self::eq_match(actual, value),
                None => false, // Missing property = no match
            },
            Predicate::And(ops) => ops.iter().all(|op| Self::evaluate(resource, op)),
            Predicate::Or(ops) => ops.iter().any(|op| Self::evaluate(resource, op)),
        }
    }

    fn eq_match(actual: &Value, expected: &Value) -> bool {
        // Null values never match
        if actual.is_null() {
            return false;
        }
        actual == expected
            || matches!(
                (value_as_key(actual), value_as_key(expected)),
                (Some(a), Some(e)) if a == e
            )
    }
}
