//! Recursive descent from a stream of `(record_name, Element)` pairs into a
//! compiled [`Engine`].
//!
//! Two passes over the input, per spec §4.1: first every namespace
//! declaration is collected (so a content record may legally precede the
//! namespace declaration it belongs to in the input stream), then every
//! content record is compiled against its namespace's now-fully-known
//! `prioritizedCriteria`. Compilation is all-or-nothing — the first error
//! aborts the whole construction (spec §4.3 "Failure semantics").

use std::collections::HashMap;

use linked_hash_map::LinkedHashMap;
use smol_str::SmolStr;

use crate::err::{ConfigError, ConfigResult};
use crate::model::criterion::{parse_criterion_definition, GroupedCriterion};
use crate::model::value::{Element, Value};
use crate::model::{Namespace, Property, Rule};
use crate::sort;

/// The compiled, immutable result of [`compile`].
#[derive(Debug, Clone, PartialEq)]
pub struct Engine {
    pub(crate) namespaces: HashMap<SmolStr, Namespace>,
}

impl Engine {
    pub fn namespace(&self, name: &str) -> Option<&Namespace> {
        self.namespaces.get(name)
    }

    pub fn namespace_names(&self) -> impl Iterator<Item = &SmolStr> {
        self.namespaces.keys()
    }
}

/// Compile a stream of `(record_name, Element)` pairs into an [`Engine`].
///
/// `record_name` is an opaque handle used only in error messages (spec
/// §4.1): a filename, a synthetic id, anything the caller finds useful for
/// diagnosing which input record a failure came from.
#[tracing::instrument(level = "debug", skip(records))]
pub fn compile(
    records: impl IntoIterator<Item = (String, Element)>,
) -> ConfigResult<Engine> {
    let records: Vec<(String, Element)> = records.into_iter().collect();

    let mut namespaces: LinkedHashMap<SmolStr, Namespace> = LinkedHashMap::new();
    let mut declared_in: HashMap<SmolStr, SmolStr> = HashMap::new();

    for (record_name, element) in &records {
        if !is_namespace_decl(element) {
            continue;
        }
        let record_name: SmolStr = record_name.as_str().into();
        let ns_name = element.annotations[1].clone();
        if let Some(first_record) = declared_in.get(&ns_name) {
            return Err(ConfigError::DuplicateNamespace {
                name: ns_name,
                first_record: first_record.clone(),
                second_record: record_name,
            });
        }
        let fields = element.value.as_struct().ok_or_else(|| ConfigError::NamespaceShape {
            record: record_name.clone(),
            reason: "namespace declaration must be a struct".to_string(),
        })?;
        let prioritized = extract_prioritized_criteria(fields).ok_or_else(|| {
            ConfigError::InvalidPrioritizedCriteria {
                name: ns_name.clone(),
            }
        })?;
        tracing::debug!(namespace = %ns_name, criteria = ?prioritized, "declared namespace");
        namespaces.insert(ns_name.clone(), Namespace::new(ns_name.clone(), prioritized));
        declared_in.insert(ns_name, record_name);
    }

    for (record_name, element) in &records {
        if is_namespace_decl(element) {
            continue;
        }
        let Some(ns_name) = element.annotations.first().cloned() else {
            continue;
        };
        let record_name: SmolStr = record_name.as_str().into();
        let namespace = match namespaces.get_mut(&ns_name) {
            Some(ns) => ns,
            None => {
                tracing::warn!(record = %record_name, namespace = %ns_name, "content record for undeclared namespace");
                return Err(ConfigError::UndeclaredNamespace {
                    record: record_name,
                    namespace: ns_name,
                });
            }
        };
        let fields = element.value.as_struct().ok_or_else(|| ConfigError::ContentShape {
            record: record_name.clone(),
            reason: "content record must be a struct".to_string(),
        })?;
        let rank_map = namespace.rank_map();
        compile_body(&record_name, &ns_name, &rank_map, fields, Vec::new(), &mut namespace.rules)?;
    }

    for namespace in namespaces.values_mut() {
        sort::sort_namespace(namespace);
        tracing::debug!(
            namespace = %namespace.name,
            rules = namespace.rules.len(),
            "sorted namespace"
        );
    }

    Ok(Engine {
        namespaces: namespaces.into_iter().collect(),
    })
}

fn is_namespace_decl(element: &Element) -> bool {
    element.annotations.len() == 2 && element.annotations[0].eq_ignore_ascii_case("namespace")
}

fn extract_prioritized_criteria(fields: &[(SmolStr, Element)]) -> Option<Vec<SmolStr>> {
    let (_, value) = fields.iter().find(|(name, _)| name == "prioritizedCriteria")?;
    let items = value.value.as_list()?;
    items
        .iter()
        .map(|item| item.value.as_text().map(SmolStr::new))
        .collect()
}

/// Compile one "body" (the direct fields of a namespace content struct, or
/// of a `DynamicStruct`/`DynamicSubField` nested struct) into the rules that
/// belong to it, appending into `out_rules`.
///
/// `criteria_path` is the conjunction of [`GroupedCriterion`]s accumulated
/// so far on the way down to this body; every rule this call (and its
/// recursive calls into deeper criteria-bearing fields) produces carries
/// that path as a prefix of its own criteria.
fn compile_body(
    record_name: &str,
    namespace_name: &str,
    rank_map: &HashMap<SmolStr, usize>,
    fields: &[(SmolStr, Element)],
    criteria_path: Vec<GroupedCriterion>,
    out_rules: &mut Vec<Rule>,
) -> ConfigResult<()> {
    let mut current = Rule::new(criteria_path.clone());

    for (field_name, field_element) in fields {
        match parse_criterion_definition(field_name) {
            Some(def) => {
                let nested_fields = field_element.value.as_struct().ok_or_else(|| {
                    ConfigError::MalformedCriterion {
                        record: record_name.into(),
                        text: field_name.clone(),
                    }
                })?;
                let mut defs = vec![def];
                for annotation in &field_element.annotations {
                    let d = parse_criterion_definition(annotation).ok_or_else(|| {
                        ConfigError::MalformedCriterion {
                            record: record_name.into(),
                            text: annotation.clone(),
                        }
                    })?;
                    defs.push(d);
                }
                let grouped = group_by_identifier(defs);
                for g in &grouped {
                    validate_criterion(record_name, namespace_name, rank_map, &g.identifier.name)?;
                }
                let mut new_path = criteria_path.clone();
                new_path.extend(grouped);
                compile_body(
                    record_name,
                    namespace_name,
                    rank_map,
                    nested_fields,
                    new_path,
                    out_rules,
                )?;
            }
            None => {
                let prop = compile_property(record_name, namespace_name, rank_map, field_element)?;
                current.values.insert(field_name.clone(), prop);
            }
        }
    }

    if !current.is_empty() {
        out_rules.push(current);
    }
    Ok(())
}

/// Group a flat list of criterion definitions by identifier, preserving
/// first-seen order, merging same-identifier disjuncts into one
/// [`GroupedCriterion`] (spec §4.1's "OR-grouping": `'color-blue':'color-red'`
/// is one rule, not two).
fn group_by_identifier(defs: Vec<crate::model::CriterionDefinition>) -> Vec<GroupedCriterion> {
    let mut order: Vec<crate::model::CriterionIdentifier> = Vec::new();
    let mut groups: HashMap<crate::model::CriterionIdentifier, std::collections::BTreeSet<SmolStr>> =
        HashMap::new();
    for def in defs {
        groups
            .entry(def.identifier.clone())
            .or_insert_with(|| {
                order.push(def.identifier.clone());
                std::collections::BTreeSet::new()
            })
            .insert(def.value);
    }
    order
        .into_iter()
        .map(|identifier| {
            let values = groups.remove(&identifier).unwrap_or_default();
            GroupedCriterion { identifier, values }
        })
        .collect()
}

fn validate_criterion(
    record_name: &str,
    namespace_name: &str,
    rank_map: &HashMap<SmolStr, usize>,
    criterion_name: &SmolStr,
) -> ConfigResult<()> {
    if rank_map.contains_key(criterion_name) {
        Ok(())
    } else {
        Err(ConfigError::CriterionNotPrioritized {
            record: record_name.into(),
            namespace: namespace_name.into(),
            criterion: criterion_name.clone(),
        })
    }
}

/// Build a [`Property`] from a data-tree value (spec §4.1.1).
fn compile_property(
    record_name: &str,
    namespace_name: &str,
    rank_map: &HashMap<SmolStr, usize>,
    element: &Element,
) -> ConfigResult<Property> {
    match &element.value {
        Value::Struct(fields)
            if fields
                .iter()
                .any(|(name, _)| parse_criterion_definition(name).is_some()) =>
        {
            let mut rules = Vec::new();
            compile_body(record_name, namespace_name, rank_map, fields, Vec::new(), &mut rules)?;
            Ok(Property::DynamicStruct(rules))
        }
        Value::List(items)
            if items
                .iter()
                .any(|item| matches!(item.value, Value::Struct(_) | Value::List(_))) =>
        {
            let mut props = Vec::with_capacity(items.len());
            for item in items {
                props.push(compile_list_element(record_name, namespace_name, rank_map, item)?);
            }
            Ok(Property::DynamicList(props))
        }
        other => Ok(Property::Basic(other.clone())),
    }
}

/// Build the [`Property`] for one element of a `DynamicList` (spec §4.1.1's
/// list-element rules, and the sub-field shape in §4.1.2).
fn compile_list_element(
    record_name: &str,
    namespace_name: &str,
    rank_map: &HashMap<SmolStr, usize>,
    item: &Element,
) -> ConfigResult<Property> {
    let is_subfield = item
        .annotations
        .first()
        .is_some_and(|a| parse_criterion_definition(a).is_some());

    if !is_subfield {
        return compile_property(record_name, namespace_name, rank_map, item);
    }

    let fields = item.value.as_struct().ok_or_else(|| ConfigError::SubFieldShape {
        record: record_name.into(),
        reason: "sub-field element must be a struct".to_string(),
    })?;
    if fields.len() != 1 {
        return Err(ConfigError::SubFieldShape {
            record: record_name.into(),
            reason: format!("sub-field element must have exactly one field, found {}", fields.len()),
        });
    }
    let (field_name, field_value) = &fields[0];
    if field_name != "value" && field_name != "values" {
        return Err(ConfigError::SubFieldShape {
            record: record_name.into(),
            reason: format!("sub-field's single field must be named `value` or `values`, found `{field_name}`"),
        });
    }
    if field_name == "values" && field_value.value.as_list().is_none() {
        return Err(ConfigError::SubFieldShape {
            record: record_name.into(),
            reason: "sub-field's `values` field must be list-typed".to_string(),
        });
    }

    // Every disjunct annotation becomes its own rule with the identical
    // payload (spec §4.3.2's rationale for first-match selection).
    let mut rules = Vec::with_capacity(item.annotations.len());
    for annotation in &item.annotations {
        let def = parse_criterion_definition(annotation).ok_or_else(|| ConfigError::MalformedCriterion {
            record: record_name.into(),
            text: annotation.clone(),
        })?;
        validate_criterion(record_name, namespace_name, rank_map, &def.identifier.name)?;
        let mut values = std::collections::BTreeSet::new();
        values.insert(def.value);
        let mut rule = Rule::new(vec![GroupedCriterion {
            identifier: def.identifier,
            values,
        }]);
        let payload = compile_property(record_name, namespace_name, rank_map, field_value)?;
        rule.values.insert(field_name.clone(), payload);
        rules.push(rule);
    }
    Ok(Property::DynamicSubField(rules))
}
