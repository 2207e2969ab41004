//! Integration tests for the numbered scenarios and invariants from spec §8,
//! built through the in-memory [`InMemorySource`] so nothing here touches
//! `.ion` files on disk.

use std::collections::HashMap;

use cascade_config::{compile, Element, InMemorySource, Predicate, RecordSource, Value};
use num_bigint::BigInt;
use smol_str::SmolStr;

fn text(s: &str) -> Element {
    Element::new(Value::String(SmolStr::new(s)))
}

fn list(items: Vec<Element>) -> Element {
    Element::new(Value::List(items))
}

fn int(v: i64) -> Element {
    Element::new(Value::Int(BigInt::from(v)))
}

fn namespace_decl(name: &str, criteria: &[&str]) -> Element {
    Element::with_annotations(
        vec![SmolStr::new("namespace"), SmolStr::new(name)],
        Value::Struct(vec![(
            SmolStr::new("prioritizedCriteria"),
            list(criteria.iter().map(|c| text(c)).collect()),
        )]),
    )
}

fn content(namespace: &str, fields: Vec<(&str, Element)>) -> Element {
    Element::with_annotations(
        vec![SmolStr::new(namespace)],
        Value::Struct(fields.into_iter().map(|(k, v)| (SmolStr::new(k), v)).collect()),
    )
}

fn criteria_struct(fields: Vec<(&str, Element)>) -> Element {
    Element::new(Value::Struct(
        fields.into_iter().map(|(k, v)| (SmolStr::new(k), v)).collect(),
    ))
}

fn predicates(pairs: &[(&str, &str)]) -> HashMap<SmolStr, Predicate> {
    pairs
        .iter()
        .map(|(k, v)| (SmolStr::new(*k), Predicate::equals(*v)))
        .collect()
}

fn my_field(result: &HashMap<SmolStr, Value>) -> i64 {
    result
        .get("myField")
        .and_then(|v| v.as_int())
        .and_then(|i| i.to_string().parse().ok())
        .expect("myField should be present")
}

/// Installs a `tracing` subscriber once per process so the compiler's
/// `debug!`/`warn!` events (src/compiler.rs) are visible under
/// `RUST_LOG=cascade_config=debug cargo test -- --nocapture`.
fn init_tracing() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// The six numbered scenarios (spec §8), priorities `[field1, field2, field3]`.
fn product_scenario_engine() -> cascade_config::Engine {
    init_tracing();
    let records = vec![
        (
            "namespace.ion".to_string(),
            namespace_decl("Products", &["field1", "field2", "field3"]),
        ),
        (
            "content.ion".to_string(),
            content(
                "Products",
                vec![
                    ("myField", int(1)),
                    (
                        "field1-true",
                        criteria_struct(vec![
                            ("myField", int(2)),
                            (
                                "field2-true",
                                criteria_struct(vec![
                                    ("myField", int(3)),
                                    (
                                        "field3-true",
                                        criteria_struct(vec![("myField", int(4))]),
                                    ),
                                ]),
                            ),
                        ]),
                    ),
                    ("field2-true", criteria_struct(vec![("myField", int(5))])),
                ],
            ),
        ),
    ];
    let loaded = InMemorySource::new(records).load().unwrap();
    compile(loaded).unwrap()
}

#[test]
fn scenario_1_through_6() {
    let engine = product_scenario_engine();
    let eval = |preds: &[(&str, &str)]| {
        my_field(&engine.values_for_predicates("Products", &predicates(preds)))
    };
    assert_eq!(eval(&[]), 1);
    assert_eq!(eval(&[("field1", "true")]), 2);
    assert_eq!(eval(&[("field1", "true"), ("field2", "true")]), 3);
    assert_eq!(
        eval(&[("field1", "true"), ("field2", "true"), ("field3", "true")]),
        4
    );
    assert_eq!(eval(&[("field2", "true")]), 5);
    assert_eq!(eval(&[("field3", "true")]), 1);
}

/// Priorities `[category, seller, sku]`: a rule gated on `sku` alone
/// outranks a rule gated on the `category`+`seller` combination, because
/// `sku` sits at the highest rank (spec §8, the `§9 example`).
#[test]
fn sku_outranks_category_and_seller_combination() {
    let records = vec![
        (
            "namespace.ion".to_string(),
            namespace_decl("Catalog", &["category", "seller", "sku"]),
        ),
        (
            "content.ion".to_string(),
            content(
                "Catalog",
                vec![
                    ("myValue", int(0)),
                    (
                        "category-001234321",
                        Element::with_annotations(
                            vec![SmolStr::new("seller-1234")],
                            Value::Struct(vec![(SmolStr::new("myValue"), int(3))]),
                        ),
                    ),
                    ("sku-B0000SKUU1", criteria_struct(vec![("myValue", int(5))])),
                ],
            ),
        ),
    ];
    let engine = compile(records).unwrap();
    let result = engine.values_for_predicates(
        "Catalog",
        &predicates(&[
            ("sku", "B0000SKUU1"),
            ("category", "001234321"),
            ("seller", "1234"),
        ]),
    );
    assert_eq!(
        result.get("myValue").and_then(|v| v.as_int()),
        Some(&BigInt::from(5))
    );
}

/// A `DynamicList` whose fourth element is itself a struct containing a
/// nested `modules` list (spec §8's `Products.layout` scenario).
#[test]
fn products_layout_list_materializes_literal_for_literal() {
    let module_item = |name: &str| text(name);
    let modules = list(vec![
        module_item("businessPricing"),
        module_item("rebates"),
        module_item("quantityPrice"),
        module_item("points"),
        module_item("globalStoreIfd"),
        Element::new(Value::Struct(vec![
            (SmolStr::new("name"), text("promoMessaging")),
            (SmolStr::new("template"), text("customTemplate1")),
        ])),
        module_item("samplingBuyBox"),
    ]);
    let layout = list(vec![
        text("header"),
        text("banner"),
        text("sidebar"),
        Element::new(Value::Struct(vec![(SmolStr::new("modules"), modules)])),
    ]);
    let records = vec![
        (
            "namespace.ion".to_string(),
            namespace_decl(
                "Products",
                &["websiteFeatureGroup", "department", "category", "subcategory", "sku"],
            ),
        ),
        (
            "content.ion".to_string(),
            content(
                "Products",
                vec![(
                    "websiteFeatureGroup-wireless",
                    Element::with_annotations(
                        vec![SmolStr::new("department-111")],
                        Value::Struct(vec![(
                            SmolStr::new("category-555"),
                            Element::with_annotations(
                                vec![SmolStr::new("subcategory-1234")],
                                Value::Struct(vec![(SmolStr::new("layout"), layout.clone())]),
                            ),
                        )]),
                    ),
                )],
            ),
        ),
    ];
    let engine = compile(records).unwrap();
    let result = engine.values_for_predicates(
        "Products",
        &predicates(&[
            ("websiteFeatureGroup", "wireless"),
            ("department", "111"),
            ("category", "555"),
            ("subcategory", "1234"),
        ]),
    );
    similar_asserts::assert_eq!(result.get("layout"), Some(&layout.value));
}

/// `'department-107'::{values:[456,789]}` spliced inline (spec §8's "list
/// splicing scenario").
#[test]
fn list_splicing_scenario() {
    let records = vec![
        (
            "namespace.ion".to_string(),
            namespace_decl("Products", &["department"]),
        ),
        (
            "content.ion".to_string(),
            content(
                "Products",
                vec![(
                    "myList",
                    list(vec![
                        int(123),
                        Element::with_annotations(
                            vec![SmolStr::new("department-107")],
                            Value::Struct(vec![(SmolStr::new("values"), list(vec![int(456), int(789)]))]),
                        ),
                        int(999),
                    ]),
                )],
            ),
        ),
    ];
    let engine = compile(records).unwrap();

    let spliced = engine.values_for_predicates("Products", &predicates(&[("department", "107")]));
    let items: Vec<i64> = spliced
        .get("myList")
        .and_then(|v| v.as_list())
        .unwrap()
        .iter()
        .map(|e| e.value.as_int().unwrap().to_string().parse().unwrap())
        .collect();
    assert_eq!(items, vec![123, 456, 789, 999]);

    let without = engine.values_for_predicates("Products", &HashMap::new());
    let items: Vec<i64> = without
        .get("myList")
        .and_then(|v| v.as_list())
        .unwrap()
        .iter()
        .map(|e| e.value.as_int().unwrap().to_string().parse().unwrap())
        .collect();
    assert_eq!(items, vec![123, 999]);
}

/// `'color-blue':'color-red'::{...}` matches either value and does not
/// duplicate the rule (spec §8's "OR-grouping scenario").
#[test]
fn or_grouping_scenario() {
    let records = vec![
        ("namespace.ion".to_string(), namespace_decl("Products", &["color"])),
        (
            "content.ion".to_string(),
            content(
                "Products",
                vec![(
                    "color-blue",
                    Element::with_annotations(
                        vec![SmolStr::new("color-red")],
                        Value::Struct(vec![(SmolStr::new("myField"), int(42))]),
                    ),
                )],
            ),
        ),
    ];
    let engine = compile(records).unwrap();
    assert_eq!(engine.namespace("Products").unwrap().rules.len(), 1);
    assert_eq!(my_field(&engine.values_for_predicates("Products", &predicates(&[("color", "blue")]))), 42);
    assert_eq!(my_field(&engine.values_for_predicates("Products", &predicates(&[("color", "red")]))), 42);
}

#[test]
fn idempotence() {
    let engine = product_scenario_engine();
    let preds = predicates(&[("field1", "true")]);
    let first = engine.values_for_predicates("Products", &preds);
    let second = engine.values_for_predicates("Products", &preds);
    assert_eq!(first, second);
}

/// If R2 uses a superset of R1's matching criteria and both match, R2
/// overrides R1 for every field they share (spec §8's monotone specificity).
#[test]
fn monotone_specificity() {
    let engine = product_scenario_engine();
    let r1_only = engine.values_for_predicates("Products", &predicates(&[("field1", "true")]));
    let r2_superset = engine.values_for_predicates(
        "Products",
        &predicates(&[("field1", "true"), ("field2", "true"), ("field3", "true")]),
    );
    assert_eq!(my_field(&r1_only), 2);
    assert_eq!(my_field(&r2_superset), 4);
}

/// Flipping every identifier's negation and inverting the matching predicate
/// gives identical results (spec §8's negation involution).
#[test]
fn negation_involution() {
    let positive_records = vec![
        ("namespace.ion".to_string(), namespace_decl("Products", &["field1"])),
        (
            "content.ion".to_string(),
            content("Products", vec![("field1-true", criteria_struct(vec![("myField", int(7))]))]),
        ),
    ];
    let negated_records = vec![
        ("namespace.ion".to_string(), namespace_decl("Products", &["field1"])),
        (
            "content.ion".to_string(),
            content("Products", vec![("!field1-true", criteria_struct(vec![("myField", int(7))]))]),
        ),
    ];
    let positive_engine = compile(positive_records).unwrap();
    let negated_engine = compile(negated_records).unwrap();

    let positive_result = positive_engine.values_for_predicates("Products", &predicates(&[("field1", "true")]));
    // Inverting the predicate's truth value for the negated engine: absent
    // predicate means "not true".
    let negated_result = negated_engine.values_for_predicates("Products", &HashMap::new());
    assert_eq!(positive_result, negated_result);
}

#[test]
fn namespace_isolation() {
    let records = vec![
        ("ns_a.ion".to_string(), namespace_decl("A", &["field1"])),
        (
            "content_a.ion".to_string(),
            content("A", vec![("field1-true", criteria_struct(vec![("x", int(1))]))]),
        ),
        ("ns_b.ion".to_string(), namespace_decl("B", &["field1"])),
        ("content_b.ion".to_string(), content("B", vec![("x", int(9))])),
    ];
    let engine = compile(records).unwrap();
    let a = engine.values_for_predicates("A", &predicates(&[("field1", "true")]));
    let b = engine.values_for_predicates("B", &predicates(&[("field1", "true")]));
    assert_eq!(a.get("x").and_then(|v| v.as_int()), Some(&BigInt::from(1)));
    assert_eq!(b.get("x").and_then(|v| v.as_int()), Some(&BigInt::from(9)));
}

/// An always-matching rule with empty criteria contributes a baseline that
/// any matching prioritized-criterion rule overrides (spec §8's
/// empty-criteria baseline).
#[test]
fn empty_criteria_baseline() {
    let engine = product_scenario_engine();
    let baseline = engine.values_for_predicates("Products", &HashMap::new());
    assert_eq!(my_field(&baseline), 1);
    let overridden = engine.values_for_predicates("Products", &predicates(&[("field1", "true")]));
    assert_eq!(my_field(&overridden), 2);
}
