//! Predicate value objects

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::schema::PropertyId;

/// Boolean filter over resource properties
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    /// property = value
    Equals {
        /// Compared property
        property_id: PropertyId,
        /// Expected value
        value: Value,
    },
    /// All operands match
    And(Vec<Predicate>),
    /// Any operand matches
    Or(Vec<Predicate>),
}

impl Predicate {
    /// Create an equality predicate
    pub fn equals(property_id: impl Into<PropertyId>, value: impl Into<Value>) -> Self {
        Predicate::Equals {
            property_id: property_id.into(),
            value: value.into(),
        }
    }

    /// Conjunction of `predicates`.
    ///
    /// No operands yield `None`; a single operand is returned unwrapped.
    pub fn and(predicates: impl IntoIterator<Item = Predicate>) -> Option<Self> {
        Self::collapse(predicates.into_iter().collect(), Predicate::And)
    }

    /// Disjunction of `predicates`, collapsed like [`Predicate::and`]
    pub fn or(predicates: impl IntoIterator<Item = Predicate>) -> Option<Self> {
        Self::collapse(predicates.into_iter().collect(), Predicate::Or)
    }

    fn collapse(mut predicates: Vec<Predicate>, wrap: fn(Vec<Predicate>) -> Predicate) -> Option<Self> {
        match predicates.len() {
            0 => None,
            1 => predicates.pop(),
            _ => Some(wrap(predicates)),
        }
    }

    /// Operands of a composite predicate; empty for `Equals`
    pub fn operands(&self) -> &[Predicate] {
        match self {
            Predicate::Equals { .. } => &[],
            Predicate::And(ops) | Predicate::Or(ops) => ops,
        }
    }

    /// Every property referenced anywhere in this predicate
    pub fn property_ids(&self) -> BTreeSet<&PropertyId> {
        let mut ids = BTreeSet::new();
        self.collect_property_ids(&mut ids);
        ids
    }

    fn collect_property_ids<'a>(&'a self, ids: &mut BTreeSet<&'a PropertyId>) {
        match self {
            Predicate::Equals { property_id, .. } => {
                ids.insert(property_id);
            }
            Predicate::And(ops) | Predicate::Or(ops) => {
                for op in ops {
                    op.collect_property_ids(ids);
                }
            }
        }
    }

    /// Equality terms that must all hold for the predicate to hold.
    ///
    /// Descends through `And` only; terms under an `Or` are not required.
    pub fn required_equalities(&self) -> Vec<(&PropertyId, &Value)> {
        match self {
            Predicate::Equals { property_id, value } => vec![(property_id, value)],
            Predicate::And(ops) => ops.iter().flat_map(Predicate::required_equalities).collect(),
            Predicate::Or(_) => Vec::new(),
        }
    }
}

// `Value` has no `Hash`; equal values render to equal JSON
impl Hash for Predicate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Predicate::Equals { property_id, value } => {
                property_id.hash(state);
                value.to_string().hash(state);
            }
            Predicate::And(ops) | Predicate::Or(ops) => ops.hash(state),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Equals { property_id, value } => match value {
                Value::String(s) => write!(f, "{}={}", property_id, s),
                other => write!(f, "{}={}", property_id, other),
            },
            Predicate::And(ops) => write_joined(f, ops, " AND "),
            Predicate::Or(ops) => write_joined(f, ops, " OR "),
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, ops: &[Predicate], sep: &str) -> fmt::Result {
    write!(f, "(")?;
    for (i, op) in ops.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{}", op)?;
    }
    write!(f, ")")
}
