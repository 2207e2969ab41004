//! `Predicate(&Set<String>) -> bool`, plus the convenience constructors
//! described in spec §4.4.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use smol_str::SmolStr;

/// A caller-supplied test against the set of values a criterion resolves to.
///
/// Predicates are plain callables; the evaluator invokes one at most once
/// per grouped criterion encountered during a rule scan (spec §4.4), so a
/// side-effecting predicate (e.g. one that counts invocations for test
/// diagnostics) is tolerated, not assumed pure.
#[derive(Clone)]
pub struct Predicate(Arc<dyn Fn(&BTreeSet<SmolStr>) -> bool + Send + Sync>);

impl Predicate {
    /// Wrap an arbitrary closure as a predicate.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&BTreeSet<SmolStr>) -> bool + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Matches iff the criterion's value set contains exactly `value`.
    pub fn equals(value: impl Into<SmolStr>) -> Self {
        let value = value.into();
        Self::from_fn(move |values| values.contains(&value))
    }

    /// Matches iff the criterion's value set intersects `values`.
    pub fn intersects(values: impl IntoIterator<Item = SmolStr>) -> Self {
        let wanted: BTreeSet<SmolStr> = values.into_iter().collect();
        Self::from_fn(move |values| !values.is_disjoint(&wanted))
    }

    /// Matches iff `test` returns true for any element of the criterion's
    /// value set.
    pub fn any(test: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
        Self::from_fn(move |values| values.iter().any(|v| test(v.as_str())))
    }

    /// A predicate that never matches — used for criteria absent from a
    /// caller-supplied predicate map (spec §4.3: "Missing key ⇒ always-false
    /// predicate").
    pub fn always_false() -> Self {
        Self::from_fn(|_| false)
    }

    pub fn test(&self, values: &BTreeSet<SmolStr>) -> bool {
        (self.0)(values)
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Predicate(..)")
    }
}
