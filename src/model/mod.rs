//! The compiled data model: criteria, properties, rules, and namespaces.
//!
//! Leaf-first, the way the teacher organizes `ast`: value domain first,
//! then the criterion types built from it, then the property/rule shapes
//! that reference both, then the namespace that owns a tree of them.

pub mod criterion;
pub mod namespace;
pub mod property;
pub mod value;

pub use criterion::{CriterionDefinition, CriterionIdentifier, GroupedCriterion};
pub use namespace::Namespace;
pub use property::{Property, Rule};
pub use value::{Element, Timestamp, TimestampPrecision, Value};
