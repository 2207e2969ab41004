//! The four-shape `Property` sum and the rules whose fields hold them.
//!
//! Exactly four variants, closed, dispatched by pattern matching rather than
//! virtual dispatch (per spec §9's design note) — the same choice the
//! teacher makes for `ExprKind`/`ValueKind` rather than reaching for `dyn`.

use linked_hash_map::LinkedHashMap;
use smol_str::SmolStr;

use super::criterion::GroupedCriterion;
use super::value::Value;

/// One matchable rule: a conjunction of [`GroupedCriterion`]s guarding an
/// ordered field→property assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub criteria: Vec<GroupedCriterion>,
    pub values: LinkedHashMap<SmolStr, Property>,
}

impl Rule {
    pub fn new(criteria: Vec<GroupedCriterion>) -> Self {
        Self {
            criteria,
            values: LinkedHashMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A lazily-resolved value node.
///
/// `Basic` is the only terminal shape; the other three are conditional and
/// require a predicate map to resolve into a concrete [`Value`] (see
/// `crate::eval`).
#[derive(Debug, Clone, PartialEq)]
pub enum Property {
    /// A terminal data-tree value, any type, treated opaquely.
    Basic(Value),
    /// A struct whose fields are themselves produced by cascading a nested
    /// rule vector under the caller's predicates.
    DynamicStruct(Vec<Rule>),
    /// A list whose positional elements each contribute zero, one, or many
    /// values to the final materialized list.
    DynamicList(Vec<Property>),
    /// A single list element that is conditional: at most one of its rules
    /// is chosen at evaluation time, contributing either one value (field
    /// `value`) or spliced elements (field `values`).
    DynamicSubField(Vec<Rule>),
}

impl Property {
    pub fn as_basic(&self) -> Option<&Value> {
        match self {
            Property::Basic(v) => Some(v),
            _ => None,
        }
    }
}
