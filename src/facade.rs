//! The namespaced query facade (spec §2's component table, §6's
//! "programmatic surface", AMBIENT 6.C): default predicates merged under
//! caller-supplied ones, plus an optional per-instance result cache.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

use smol_str::SmolStr;

use crate::compiler::Engine;
use crate::model::value::Value;
use crate::predicate::Predicate;

/// A caller-computed identity for a predicate map (spec §5: "keys on
/// (namespace, predicate-map identity)"). The facade never inspects a
/// predicate map's contents to build this itself — predicates aren't
/// `Eq`/`Hash` — so the caller supplies one, typically a hash of whatever
/// request parameters produced the predicate map.
pub type PredicateMapFingerprint = u64;

/// A compiled engine scoped to one namespace, with default predicates and
/// an optional result cache layered on top.
pub struct Facade {
    engine: Arc<Engine>,
    namespace: SmolStr,
    default_predicates: HashMap<SmolStr, Predicate>,
    cache: RefCell<Option<HashMap<PredicateMapFingerprint, Rc<HashMap<SmolStr, Value>>>>>,
}

impl Facade {
    pub fn new(engine: Arc<Engine>, namespace: impl Into<SmolStr>) -> Self {
        Self {
            engine,
            namespace: namespace.into(),
            default_predicates: HashMap::new(),
            cache: RefCell::new(None),
        }
    }

    pub fn with_default_predicates(mut self, defaults: HashMap<SmolStr, Predicate>) -> Self {
        self.default_predicates = defaults;
        self
    }

    /// Enable the per-instance result cache. Disabled by default: a facade
    /// with no caller-supplied fingerprints should not pay for a lock/borrow
    /// on every query.
    pub fn with_cache(self) -> Self {
        *self.cache.borrow_mut() = Some(HashMap::new());
        self
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Sugar for [`Facade::values_for_predicates`] with per-key equality
    /// predicates, mirroring [`Engine::values_for_properties`].
    pub fn values_for_properties(
        &self,
        properties: &HashMap<SmolStr, SmolStr>,
        fingerprint: Option<PredicateMapFingerprint>,
    ) -> Rc<HashMap<SmolStr, Value>> {
        let predicates: HashMap<SmolStr, Predicate> = properties
            .iter()
            .map(|(k, v)| (k.clone(), Predicate::equals(v.clone())))
            .collect();
        self.values_for_predicates(&predicates, fingerprint)
    }

    /// Merge `predicates` over this facade's defaults (caller wins on
    /// conflict) and evaluate, consulting/populating the cache when
    /// `fingerprint` is given and caching is enabled.
    pub fn values_for_predicates(
        &self,
        predicates: &HashMap<SmolStr, Predicate>,
        fingerprint: Option<PredicateMapFingerprint>,
    ) -> Rc<HashMap<SmolStr, Value>> {
        if let Some(key) = fingerprint {
            if let Some(cached) = self
                .cache
                .borrow()
                .as_ref()
                .and_then(|cache| cache.get(&key))
            {
                return Rc::clone(cached);
            }
        }

        let mut merged = self.default_predicates.clone();
        merged.extend(predicates.iter().map(|(k, v)| (k.clone(), v.clone())));
        let result = Rc::new(self.engine.values_for_predicates(&self.namespace, &merged));

        if let Some(key) = fingerprint {
            if let Some(cache) = self.cache.borrow_mut().as_mut() {
                cache.insert(key, Rc::clone(&result));
            }
        }

        result
    }

    /// Discard every cached result. The caller is responsible for calling
    /// this on any mutation to the predicate set (spec §5).
    pub fn clear_cache(&self) {
        if let Some(cache) = self.cache.borrow_mut().as_mut() {
            cache.clear();
        }
    }
}
