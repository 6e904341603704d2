//! Predicate algebra for clusterq
//!
//! `Equals` plus N-ary `And`/`Or`. The only normalization performed is
//! arity collapsing: a composite of one operand is that operand, a
//! composite of none is "no predicate".

mod filter;
mod predicate;

pub use filter::PredicateFilter;
pub use predicate::Predicate;
