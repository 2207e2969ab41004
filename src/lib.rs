//! A criteria-driven cascading configuration engine.
//!
//! Compile a stream of namespace declarations and content records into an
//! [`Engine`], then query it with caller-supplied criterion values (or
//! custom [`Predicate`]s) to get back a flat `field -> Value` map. Rule
//! selection follows CSS-like specificity: a matching rule naming more, or
//! higher-priority, criteria overrides a less specific one.
//!
//! ```
//! use std::collections::HashMap;
//! use cascade_config::{compile, Element, Value};
//! use smol_str::SmolStr;
//!
//! let namespace = Element::with_annotations(
//!     vec![SmolStr::new("namespace"), SmolStr::new("Products")],
//!     Value::Struct(vec![(
//!         SmolStr::new("prioritizedCriteria"),
//!         Element::new(Value::List(vec![Element::new(Value::String(SmolStr::new("color")))])),
//!     )]),
//! );
//! let content = Element::with_annotations(
//!     vec![SmolStr::new("Products")],
//!     Value::Struct(vec![(SmolStr::new("myField"), Element::new(Value::Int(1.into())))]),
//! );
//! let engine = compile(vec![("ns.ion".to_string(), namespace), ("content.ion".to_string(), content)]).unwrap();
//! let result = engine.values_for_properties("Products", &HashMap::new());
//! assert_eq!(result.get("myField").and_then(|v| v.as_int()), Some(&1.into()));
//! ```

mod adapter;
mod compiler;
mod err;
mod eval;
mod facade;
mod model;
mod predicate;
mod sort;
mod source;

pub use adapter::{FromValue, ValueAdapter};
pub use compiler::{compile, Engine};
pub use err::{ConfigError, ConfigResult};
pub use facade::{Facade, PredicateMapFingerprint};
pub use model::{
    CriterionDefinition, CriterionIdentifier, Element, GroupedCriterion, Namespace, Property,
    Rule, Timestamp, TimestampPrecision, Value,
};
pub use predicate::Predicate;
pub use source::{DirectorySource, FileListSource, InMemorySource, RecordSource, SingleFileSource};

use std::sync::OnceLock;

static DEFAULT_ENGINE: OnceLock<Engine> = OnceLock::new();

/// Install the process-wide default engine. Per §9's "global singleton"
/// redesign, nothing populates this implicitly — an embedder calls this
/// once, typically at startup, after building an `Engine` from whatever
/// [`RecordSource`] it chooses. Later calls are ignored; the first engine
/// installed wins.
pub fn set_default(engine: Engine) {
    let _ = DEFAULT_ENGINE.set(engine);
}

/// Fetch the process-wide default engine, or `Err` if [`set_default`] was
/// never called.
pub fn try_default() -> ConfigResult<&'static Engine> {
    DEFAULT_ENGINE.get().ok_or(ConfigError::NoDefaultEngine)
}

/// Fetch the process-wide default engine.
///
/// # Panics
///
/// Panics if [`set_default`] was never called. Prefer [`try_default`] in
/// code that shouldn't panic on a missing installation.
pub fn default() -> &'static Engine {
    try_default().expect("no default engine has been installed; call cascade_config::set_default() first")
}
