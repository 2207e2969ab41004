//! Criterion identifiers and the definitions/groupings built from them.
//!
//! A criterion identifier is parsed from the textual form `[!]<name>-<value>`
//! wherever a field name or annotation is encountered that could plausibly be
//! one (see [`parse_criterion_definition`]). The grouping step that turns a
//! set of same-identifier definitions into one [`GroupedCriterion`] lives in
//! `crate::compiler`, next to the recursion that discovers them.

use std::collections::BTreeSet;

use smol_str::SmolStr;

/// `(name, negated)`. Two identifiers are the same criterion iff both fields
/// match — `category` and `!category` are different identifiers.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CriterionIdentifier {
    pub name: SmolStr,
    pub negated: bool,
}

impl CriterionIdentifier {
    pub fn new(name: impl Into<SmolStr>, negated: bool) -> Self {
        let name = name.into();
        debug_assert!(!name.is_empty(), "criterion name must be non-empty");
        Self { name, negated }
    }
}

/// A single `identifier = value` pair, as parsed from one field name or one
/// annotation. Only exists transiently while the compiler is grouping
/// disjuncts into a [`GroupedCriterion`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CriterionDefinition {
    pub identifier: CriterionIdentifier,
    pub value: SmolStr,
}

/// An OR-disjunction over values sharing one [`CriterionIdentifier`].
///
/// Matches (per spec §3) iff the caller's predicate for `identifier.name`,
/// applied to `values`, returns true — XORed with `identifier.negated`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupedCriterion {
    pub identifier: CriterionIdentifier,
    pub values: BTreeSet<SmolStr>,
}

impl GroupedCriterion {
    /// Build a grouped criterion from one or more definitions that all share
    /// the same identifier. Panics (a compiler bug, not a user-facing error)
    /// if the definitions disagree on identifier.
    pub fn from_definitions(defs: impl IntoIterator<Item = CriterionDefinition>) -> Self {
        let mut iter = defs.into_iter();
        let first = iter
            .next()
            .expect("GroupedCriterion::from_definitions requires at least one definition");
        let mut values = BTreeSet::new();
        values.insert(first.value);
        let identifier = first.identifier;
        for def in iter {
            assert_eq!(
                def.identifier, identifier,
                "grouped criterion disjuncts must share one identifier"
            );
            values.insert(def.value);
        }
        Self {
            identifier,
            values,
        }
    }
}

/// Parse `[!]<name>-<value>` into a [`CriterionDefinition`].
///
/// Returns `None` when the string doesn't qualify as a criterion — a leading
/// or trailing `-`, or no internal `-` at all — in which case the caller
/// should treat the string as an ordinary data field name instead.
pub fn parse_criterion_definition(s: &str) -> Option<CriterionDefinition> {
    let (negated, rest) = match s.strip_prefix('!') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    if rest.is_empty() || rest.starts_with('-') || rest.ends_with('-') {
        return None;
    }
    let dash = rest.find('-')?;
    let (name, value) = rest.split_at(dash);
    let value = &value[1..]; // skip the separator itself
    if name.is_empty() || value.is_empty() {
        return None;
    }
    Some(CriterionDefinition {
        identifier: CriterionIdentifier::new(name, negated),
        value: SmolStr::new(value),
    })
}
