//! Transient proxy types (C5 design notes): small value-type handles
//! over the store and an instance map, built fresh for a single
//! `evaluate` call and never cached across cycles. They exist only to
//! unify "current value" and "k-lagged value" behind one subscriptable
//! handle; the store, not the proxy, remains the single source of
//! truth once a cycle's nodes have stepped.
//!
//! Names are held as owned strings rather than borrows: the proxy's
//! lifetime needs to track only the store and instance map (which live
//! for the whole engine), not the expression tree being walked, whose
//! borrow is otherwise unrelated.

use crate::algorithms::Algorithm;
use crate::store::VariableStore;

/// A view over a live instance's attribute, coercing to scalar either
/// from the store (if the owning node has already persisted this
/// cycle's value) or from the instance's own current state.
pub struct AttributeProxy<'a> {
    instance_name: String,
    attribute_name: String,
    store: &'a VariableStore,
    instance: &'a dyn Algorithm,
}

impl<'a> AttributeProxy<'a> {
    pub fn new(
        instance_name: impl Into<String>,
        attribute_name: impl Into<String>,
        store: &'a VariableStore,
        instance: &'a dyn Algorithm,
    ) -> Self {
        Self {
            instance_name: instance_name.into(),
            attribute_name: attribute_name.into(),
            store,
            instance,
        }
    }

    fn store_key(&self) -> String {
        format!("{}.{}", self.instance_name, self.attribute_name)
    }

    /// Current value: store first, live attribute as fallback.
    pub fn value(&self) -> f64 {
        let key = self.store_key();
        if self.store.contains(&key) {
            self.store.get(&key, 0.0)
        } else {
            self.instance.attribute(&self.attribute_name).unwrap_or(0.0)
        }
    }

    /// `proxy[-k]`: the value stored `k` cycles prior, or `default` if
    /// history doesn't reach that far back.
    pub fn lag(&self, k: usize, default: f64) -> f64 {
        self.store.get_with_lag(&self.store_key(), k, default)
    }
}

/// A view over a registered instance, dispensing [`AttributeProxy`]s.
/// Method dispatch (`.execute(...)`) is not performed here — that call
/// form is recognized and handled directly by the algorithm node, which
/// never routes it through the general evaluator.
pub struct InstanceProxy<'a> {
    name: String,
    store: &'a VariableStore,
    instance: &'a dyn Algorithm,
}

impl<'a> InstanceProxy<'a> {
    pub fn new(name: impl Into<String>, store: &'a VariableStore, instance: &'a dyn Algorithm) -> Self {
        Self {
            name: name.into(),
            store,
            instance,
        }
    }

    pub fn attribute(&self, attr: impl Into<String>) -> AttributeProxy<'a> {
        AttributeProxy::new(self.name.clone(), attr, self.store, self.instance)
    }
}

/// A view over a plain (non-instance) variable name.
pub struct VariableAccessor<'a> {
    name: String,
    store: &'a VariableStore,
}

impl<'a> VariableAccessor<'a> {
    pub fn new(name: impl Into<String>, store: &'a VariableStore) -> Self {
        Self {
            name: name.into(),
            store,
        }
    }

    pub fn value(&self) -> f64 {
        self.store.get(&self.name, 0.0)
    }

    pub fn lag(&self, k: usize, default: f64) -> f64 {
        self.store.get_with_lag(&self.name, k, default)
    }
}
