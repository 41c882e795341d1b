//! Shape shared by all stateful algorithm instances (C4).
//!
//! Every algorithm is constructed once, at engine build time, from its
//! `default_params` overlaid with the configuration's `init_args`, and
//! injected with the engine's `cycle_time`. `execute` is called once per
//! cycle and mutates the instance's own attributes; the engine persists
//! `stored_attributes` into the variable store afterward.

use std::collections::HashMap;

pub mod cylindrical_tank;
pub mod list_wave;
pub mod pid;
pub mod random_walk;
pub mod sine_wave;
pub mod square_wave;
pub mod triangle_wave;
pub mod valve;

/// Raw `init_args` as loaded from YAML: most algorithms only ever need a
/// scalar per key, but `LIST_WAVE`'s `wave_list` is a list of `(value,
/// duration)` pairs, so values are kept as `serde_yaml::Value` until each
/// algorithm's constructor extracts what it needs.
pub type InitArgs = HashMap<String, serde_yaml::Value>;

/// A stateful simulation component.
///
/// Implementors hold their own mutable state (integrators, phase
/// accumulators, positions); `execute` advances that state by one cycle.
pub trait Algorithm: std::fmt::Debug {
    /// Ordered attribute names the engine persists to the store after
    /// each `execute` call, as `"instance_name.attribute"`.
    fn stored_attributes(&self) -> &'static [&'static str];

    /// Advance the instance by one cycle, consuming resolved keyword
    /// arguments from the `instance.execute(...)` expression.
    fn execute(&mut self, kwargs: &HashMap<String, f64>);

    /// Read a stored attribute's current value by name. Returns `None`
    /// for an attribute not in `stored_attributes()`.
    fn attribute(&self, name: &str) -> Option<f64>;
}

/// Look up an overridden scalar parameter from `init_args`, falling back
/// to the algorithm's own default. Every concrete algorithm's constructor
/// calls this once per declared scalar parameter.
pub fn param(init_args: &InitArgs, defaults: &[(&str, f64)], key: &str) -> f64 {
    if let Some(v) = init_args.get(key).and_then(|v| v.as_f64()) {
        return v;
    }
    defaults
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, v)| *v)
        .unwrap_or_else(|| panic!("no default registered for parameter '{key}'"))
}

/// Extract a `wave_list`-shaped parameter: a YAML sequence of
/// two-element `[value, duration_seconds]` sequences.
pub fn param_pairs(init_args: &InitArgs, key: &str) -> Vec<(f64, f64)> {
    let Some(serde_yaml::Value::Sequence(items)) = init_args.get(key) else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| {
            let serde_yaml::Value::Sequence(pair) = item else {
                return None;
            };
            let v = pair.first()?.as_f64()?;
            let d = pair.get(1)?.as_f64()?;
            Some((v, d))
        })
        .collect()
}

/// Constructs a boxed algorithm instance from the engine's `cycle_time`
/// and the configuration's `init_args`.
pub type AlgorithmFactory = fn(cycle_time: f64, init_args: &InitArgs) -> Box<dyn Algorithm>;
