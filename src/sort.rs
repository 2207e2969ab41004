//! The priority sorter (spec §4.2).
//!
//! Runs once, right after compilation, over every rule vector reachable
//! from a namespace: the top-level vector plus every nested `DynamicStruct`
//! and `DynamicSubField` body. Rather than threading a Java-style list of
//! mutable references to "vectors that still need sorting" out of the
//! compiler (spec §9's "mutable parse-time state" note explicitly flags this
//! as something to re-architect), this does one recursive post-order walk
//! over the already-built namespace tree and mutates each vector in place.

use std::collections::HashMap;

use num_bigint::BigUint;
use smol_str::SmolStr;

use crate::model::{Namespace, Property, Rule};

/// Sort every rule vector in `namespace` in place.
pub fn sort_namespace(namespace: &mut Namespace) {
    let rank_map = namespace.rank_map();
    let total_criteria = namespace.prioritized_criteria.len();
    sort_rule_vec(&mut namespace.rules, &rank_map, total_criteria);
}

fn sort_rule_vec(rules: &mut Vec<Rule>, rank_map: &HashMap<SmolStr, usize>, total_criteria: usize) {
    for rule in rules.iter_mut() {
        for property in rule.values.values_mut() {
            sort_property(property, rank_map, total_criteria);
        }
    }

    // Drop rules with no direct field assignments (spec §4.2.a).
    rules.retain(|r| !r.is_empty());

    // Sort each rule's own criteria descending by rank (spec §4.2.b) before
    // scoring, since the score formula assumes that order.
    for rule in rules.iter_mut() {
        rule.criteria
            .sort_by(|a, b| rank(rank_map, &b.identifier.name).cmp(&rank(rank_map, &a.identifier.name)));
    }

    // Sort the rule vector ascending by score (spec §4.2.c). `Vec::sort_by`
    // is stable, so rules that tie on score keep their compile-time
    // insertion order — the tie-break spec §9's open question resolves to.
    let mut scored: Vec<(BigUint, Rule)> = rules
        .drain(..)
        .map(|r| {
            let s = score(&r, rank_map, total_criteria);
            (s, r)
        })
        .collect();
    scored.sort_by(|a, b| a.0.cmp(&b.0));
    rules.extend(scored.into_iter().map(|(_, r)| r));
}

fn sort_property(property: &mut Property, rank_map: &HashMap<SmolStr, usize>, total_criteria: usize) {
    match property {
        Property::Basic(_) => {}
        Property::DynamicStruct(rules) | Property::DynamicSubField(rules) => {
            sort_rule_vec(rules, rank_map, total_criteria)
        }
        Property::DynamicList(items) => {
            for item in items.iter_mut() {
                sort_property(item, rank_map, total_criteria);
            }
        }
    }
}

fn rank(rank_map: &HashMap<SmolStr, usize>, name: &SmolStr) -> usize {
    // PANIC SAFETY: every criterion name reaching here was validated against
    // `prioritizedCriteria` at compile time (`validate_criterion`).
    #[allow(clippy::expect_used)]
    *rank_map
        .get(name)
        .expect("criterion name validated during compilation")
}

/// `score = Σ (r_i + 1) · P^(P - i)` for `i = 0..criteria.len()`, with
/// `criteria` already sorted descending by rank. Arbitrary precision is
/// required: `P^P` overflows 64-bit math once `P >= 14` (spec §9).
fn score(rule: &Rule, rank_map: &HashMap<SmolStr, usize>, total_criteria: usize) -> BigUint {
    let p = BigUint::from(total_criteria);
    let mut total = BigUint::from(0u32);
    for (i, grouped) in rule.criteria.iter().enumerate() {
        let r = rank(rank_map, &grouped.identifier.name);
        let exponent = total_criteria.saturating_sub(i) as u32;
        let term = BigUint::from(r + 1) * big_pow(&p, exponent);
        total += term;
    }
    total
}

/// Binary exponentiation, avoiding any dependency on which `Pow` trait impl
/// a given `num-bigint` version happens to expose for `BigUint`.
fn big_pow(base: &BigUint, mut exponent: u32) -> BigUint {
    let mut result = BigUint::from(1u32);
    let mut b = base.clone();
    while exponent > 0 {
        if exponent & 1 == 1 {
            result *= &b;
        }
        b = &b * &b;
        exponent >>= 1;
    }
    result
}
