//! The evaluator (spec §4.3): scans a namespace's sorted rule vector under
//! a predicate map and composes a `name -> Value` result.
//!
//! Evaluation never fails (spec §7) — a missing namespace yields an empty
//! map, a missing predicate defaults to always-false, and predicate panics
//! are not caught (spec §4.4/§7: predicates run "as-is").

use std::collections::HashMap;

use linked_hash_map::LinkedHashMap;
use smol_str::SmolStr;

use crate::compiler::Engine;
use crate::model::value::{Element, Value};
use crate::model::{Property, Rule};
use crate::predicate::Predicate;

impl Engine {
    /// Sugar for [`Engine::values_for_predicates`] with per-key equality
    /// predicates (spec §4.3).
    pub fn values_for_properties(
        &self,
        namespace: &str,
        properties: &HashMap<SmolStr, SmolStr>,
    ) -> HashMap<SmolStr, Value> {
        let predicates: HashMap<SmolStr, Predicate> = properties
            .iter()
            .map(|(k, v)| (k.clone(), Predicate::equals(v.clone())))
            .collect();
        self.values_for_predicates(namespace, &predicates)
    }

    /// Evaluate `namespace` against `predicates`, producing a flat
    /// `field -> Value` map. An unknown namespace evaluates to an empty map
    /// rather than an error (spec §4.3 "Failure semantics").
    pub fn values_for_predicates(
        &self,
        namespace: &str,
        predicates: &HashMap<SmolStr, Predicate>,
    ) -> HashMap<SmolStr, Value> {
        match self.namespace(namespace) {
            Some(ns) => {
                let accumulator = evaluate_rules(&ns.rules, predicates);
                accumulator
                    .into_iter()
                    .map(|(field, property)| (field, materialize(property, predicates)))
                    .collect()
            }
            None => HashMap::new(),
        }
    }
}

/// Scan `rules` in order, accumulating `field -> Property` with later
/// matching rules overwriting earlier ones (spec §4.3, steps 1-2).
fn evaluate_rules<'a>(
    rules: &'a [Rule],
    predicates: &HashMap<SmolStr, Predicate>,
) -> LinkedHashMap<SmolStr, &'a Property> {
    let mut accumulator = LinkedHashMap::new();
    for rule in rules {
        if rule_matches(rule, predicates) {
            for (field, property) in rule.values.iter() {
                accumulator.insert(field.clone(), property);
            }
        }
    }
    accumulator
}

/// A rule matches iff every one of its grouped criteria matches (spec §4.3
/// step 2): the predicate test, XORed with the identifier's `negated` flag.
fn rule_matches(rule: &Rule, predicates: &HashMap<SmolStr, Predicate>) -> bool {
    rule.criteria.iter().all(|grouped| {
        let matched = predicates
            .get(&grouped.identifier.name)
            .map(|p| p.test(&grouped.values))
            .unwrap_or(false);
        matched ^ grouped.identifier.negated
    })
}

/// Materialize one `Property` into a concrete `Value` (spec §4.3.1).
fn materialize(property: &Property, predicates: &HashMap<SmolStr, Predicate>) -> Value {
    match property {
        Property::Basic(value) => value.clone(),
        Property::DynamicStruct(rules) => {
            let accumulator = evaluate_rules(rules, predicates);
            let fields = accumulator
                .into_iter()
                .map(|(field, nested)| (field, Element::new(materialize(nested, predicates))))
                .collect();
            Value::Struct(fields)
        }
        Property::DynamicList(elements) => {
            let mut items = Vec::new();
            for element in elements {
                splice_list_element(element, predicates, &mut items);
            }
            Value::List(items)
        }
        // A bare `DynamicSubField` only ever arises as a `DynamicList`
        // element; it never reaches materialization on its own.
        Property::DynamicSubField(_) => Value::Null,
    }
}

/// Contribute the value(s) of one `DynamicList` element (spec §4.3.2).
fn splice_list_element(
    property: &Property,
    predicates: &HashMap<SmolStr, Predicate>,
    out: &mut Vec<Element>,
) {
    match property {
        Property::DynamicSubField(rules) => {
            let Some(chosen) = rules.iter().find(|rule| rule_matches(rule, predicates)) else {
                return; // no disjunct matched: contribute nothing
            };
            if let Some(value_prop) = chosen.values.get("value") {
                out.push(Element::new(materialize(value_prop, predicates)));
            } else if let Some(values_prop) = chosen.values.get("values") {
                if let Value::List(items) = materialize(values_prop, predicates) {
                    out.extend(items);
                }
            }
        }
        other => out.push(Element::new(materialize(other, predicates))),
    }
}
