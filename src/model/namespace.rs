//! A namespace: an ordered set of criterion names plus the rules compiled
//! under it.

use std::collections::HashMap;

use smol_str::SmolStr;

use super::property::Rule;

/// A named, ordered list of criterion names (`prioritizedCriteria`), plus
/// the rule vector compiled for it.
///
/// The index of a name in `prioritized_criteria` is its priority rank (0 =
/// lowest). Every criterion name that appears anywhere in `rules` must also
/// appear in `prioritized_criteria` — the compiler enforces this before the
/// namespace is considered built.
#[derive(Debug, Clone, PartialEq)]
pub struct Namespace {
    pub name: SmolStr,
    pub prioritized_criteria: Vec<SmolStr>,
    pub rules: Vec<Rule>,
}

impl Namespace {
    pub fn new(name: impl Into<SmolStr>, prioritized_criteria: Vec<SmolStr>) -> Self {
        Self {
            name: name.into(),
            prioritized_criteria,
            rules: Vec::new(),
        }
    }

    /// `name -> rank` lookup built from `prioritized_criteria`, used by the
    /// priority sorter and by validation.
    pub fn rank_map(&self) -> HashMap<SmolStr, usize> {
        self.prioritized_criteria
            .iter()
            .enumerate()
            .map(|(rank, name)| (name.clone(), rank))
            .collect()
    }
}
