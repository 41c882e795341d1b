//! Map from store key to (current value, optional history), with per-name
//! lag configuration (C2).
//!
//! A store key is either a plain variable name or a qualified
//! `instance.attribute` name; the store itself treats both uniformly as
//! opaque strings.

use std::collections::HashMap;

use crate::ring_buffer::RingBuffer;

#[derive(Debug, Clone, Default)]
struct VariableState {
    current: Option<f64>,
    history: Option<RingBuffer>,
}

/// Name → (current, history) map, plus per-name required history capacity.
///
/// Only names configured with a positive capacity (via
/// [`VariableStore::configure_lag`]) ever own a [`RingBuffer`] — reads on
/// any other name never allocate.
#[derive(Debug, Default)]
pub struct VariableStore {
    states: HashMap<String, VariableState>,
    capacities: HashMap<String, usize>,
}

impl VariableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the required history capacity for `name`. Idempotent; must
    /// be called before the first `set` for that name to take effect.
    pub fn configure_lag(&mut self, name: &str, capacity: usize) {
        self.capacities.insert(name.to_string(), capacity);
    }

    /// Current configured capacity for `name`, or 0 if never configured.
    pub fn configured_capacity(&self, name: &str) -> usize {
        self.capacities.get(name).copied().unwrap_or(0)
    }

    /// Set `name`'s current value, creating state lazily and appending to
    /// history if the name was configured with `capacity > 0`.
    pub fn set(&mut self, name: &str, v: f64) {
        let capacity = self.configured_capacity(name);
        let state = self
            .states
            .entry(name.to_string())
            .or_insert_with(|| VariableState {
                current: None,
                history: if capacity > 0 {
                    Some(RingBuffer::new(capacity))
                } else {
                    None
                },
            });
        state.current = Some(v);
        if let Some(h) = state.history.as_mut() {
            h.push(v);
        }
    }

    /// Current value of `name`, or `default` if never set.
    pub fn get(&self, name: &str, default: f64) -> f64 {
        self.states
            .get(name)
            .and_then(|s| s.current)
            .unwrap_or(default)
    }

    /// Value of `name` lagged by `k` cycles. Falls back to `get` when the
    /// name has no history buffer and `k == 0`; `default` otherwise.
    pub fn get_with_lag(&self, name: &str, k: usize, default: f64) -> f64 {
        match self.states.get(name) {
            Some(state) => match &state.history {
                Some(h) => h.get_by_lag(k, default),
                None if k == 0 => state.current.unwrap_or(default),
                None => default,
            },
            None => default,
        }
    }

    /// Whether `name` has ever been set.
    pub fn contains(&self, name: &str) -> bool {
        self.states.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn isolation_never_write_on_read() {
        let store = VariableStore::new();
        assert_eq!(store.get("never_written", 1.5), 1.5);
        assert!(!store.contains("never_written"));
    }

    #[test]
    fn set_then_get_roundtrips() {
        let mut store = VariableStore::new();
        store.set("x", 10.0);
        assert_eq!(store.get_with_lag("x", 0, 0.0), 10.0);
    }

    #[test]
    fn lag_without_configured_history_only_serves_k0() {
        let mut store = VariableStore::new();
        store.set("x", 3.0);
        store.set("x", 4.0);
        assert_eq!(store.get_with_lag("x", 0, -1.0), 4.0);
        assert_eq!(store.get_with_lag("x", 1, -1.0), -1.0);
    }

    #[test]
    fn lag_with_configured_history_respects_capacity() {
        let mut store = VariableStore::new();
        store.configure_lag("r.out", 10);
        for v in 1..=15 {
            store.set("r.out", v as f64);
        }
        assert_eq!(store.get_with_lag("r.out", 0, -1.0), 15.0);
        assert_eq!(store.get_with_lag("r.out", 9, -1.0), 6.0);
        assert_eq!(store.get_with_lag("r.out", 10, -1.0), -1.0);
    }

    #[test]
    fn lag_configuration_monotonicity() {
        let mut store = VariableStore::new();
        store.configure_lag("k", 4);
        for i in 0..100 {
            store.set("k", i as f64);
        }
        // internal invariant: len <= capacity, observable only indirectly
        // via lag access never exceeding configured depth.
        assert_eq!(store.get_with_lag("k", 3, -1.0), 96.0);
        assert_eq!(store.get_with_lag("k", 4, -1.0), -1.0);
    }
}
