//! Configuration loader (C8): parses the declarative YAML program,
//! performs static analysis of every expression (reject early on
//! syntax errors), sizes per-variable history from lag requirements,
//! and emits everything the engine needs to construct instances and
//! nodes. A `ConfigError` here means the engine is never built.

use std::collections::{HashMap, HashSet};

use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::algorithms::{Algorithm, InitArgs};
use crate::clock::{Clock, ClockMode};
use crate::expr;
use crate::expr::ast::{Expr, Stmt};
use crate::expr::error::ExprError;
use crate::node::{AlgorithmNode, ExpressionNode, Node};
use crate::registry::Registry;
use crate::store::VariableStore;

/// Lag-history sizing per §4.8: `capacity = max(ceil(k * MARGIN), MIN)`.
const LAG_SAFETY_MARGIN: f64 = 1.5;
const MIN_RECORD_LENGTH: usize = 10;

#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(String),
    #[error("program item names must be unique; `{0}` appears more than once")]
    DuplicateName(String),
    #[error("program item `{name}` has unknown type `{type_name}`")]
    UnknownType { name: String, type_name: String },
    #[error("program item `{name}`: {reason}")]
    Invalid { name: String, reason: String },
    #[error("program item `{name}` has a malformed expression: {source}")]
    Expression { name: String, source: ExprError },
    #[error("invalid clock configuration: {0}")]
    InvalidClock(String),
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(default)]
    clock: Option<RawClockConfig>,
    #[serde(default)]
    record_length: Option<usize>,
    program: Vec<RawProgramItem>,
}

#[derive(Debug, Deserialize)]
struct RawClockConfig {
    cycle_time: f64,
    #[serde(default = "default_mode")]
    mode: ClockMode,
    #[serde(default)]
    sample_interval: Option<f64>,
    #[serde(default)]
    time_format: Option<String>,
    #[serde(default)]
    start_time: Option<String>,
}

fn default_mode() -> ClockMode {
    ClockMode::Generator
}

#[derive(Debug, Deserialize)]
struct RawProgramItem {
    name: String,
    #[serde(rename = "type")]
    type_name: String,
    #[serde(default)]
    init_args: InitArgs,
    expression: String,
}

/// Everything the engine needs, already validated and wired together.
pub struct EngineConfig {
    pub clock: Clock,
    pub instances: HashMap<String, Box<dyn Algorithm>>,
    pub nodes: Vec<Node>,
    pub store: VariableStore,
}

pub fn load(text: &str, registry: &Registry) -> Result<EngineConfig, ConfigError> {
    let raw: RawConfig =
        serde_yaml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;

    let mut seen = HashSet::new();
    for item in &raw.program {
        if !seen.insert(item.name.clone()) {
            return Err(ConfigError::DuplicateName(item.name.clone()));
        }
    }

    let instance_names: HashSet<String> = raw
        .program
        .iter()
        .filter(|item| item.type_name != "Variable")
        .map(|item| item.name.clone())
        .collect();

    let cycle_time = raw.clock.as_ref().map(|c| c.cycle_time).unwrap_or(1.0);
    if cycle_time <= 0.0 {
        return Err(ConfigError::InvalidClock(format!(
            "cycle_time must be > 0, got {cycle_time}"
        )));
    }
    if let Some(sample_interval) = raw.clock.as_ref().and_then(|c| c.sample_interval) {
        if sample_interval < cycle_time {
            return Err(ConfigError::InvalidClock(format!(
                "sample_interval ({sample_interval}) must be >= cycle_time ({cycle_time})"
            )));
        }
    }

    let mut instances: HashMap<String, Box<dyn Algorithm>> = HashMap::new();
    let mut nodes = Vec::with_capacity(raw.program.len());
    let mut lag_requirements: HashMap<String, i64> = HashMap::new();

    for item in &raw.program {
        if item.type_name == "Variable" {
            let node = build_expression_node(item, &instance_names, &mut lag_requirements)?;
            nodes.push(Node::Expression(node));
        } else {
            let entry = registry
                .algorithm(&item.type_name)
                .ok_or_else(|| ConfigError::UnknownType {
                    name: item.name.clone(),
                    type_name: item.type_name.clone(),
                })?;
            let instance = (entry.factory)(cycle_time, &item.init_args);
            let node = build_algorithm_node(
                item,
                instance.stored_attributes(),
                &instance_names,
                &mut lag_requirements,
            )?;
            instances.insert(item.name.clone(), instance);
            nodes.push(Node::Algorithm(node));
        }
    }

    let mut store = VariableStore::new();
    for (key, k) in &lag_requirements {
        let capacity = match raw.record_length {
            Some(explicit) => explicit,
            None => ((*k as f64 * LAG_SAFETY_MARGIN).ceil() as usize).max(MIN_RECORD_LENGTH),
        };
        store.configure_lag(key, capacity);
    }
    info!(
        program_items = raw.program.len(),
        lag_keys = lag_requirements.len(),
        "configuration loaded"
    );

    let start_time_epoch = raw
        .clock
        .as_ref()
        .and_then(|c| c.start_time.as_deref())
        .map(parse_start_time)
        .unwrap_or(0.0);
    let mode = raw.clock.as_ref().map(|c| c.mode).unwrap_or(ClockMode::Generator);
    let sample_interval = raw.clock.as_ref().and_then(|c| c.sample_interval);
    let time_format = raw.clock.as_ref().and_then(|c| c.time_format.clone());
    let clock = Clock::new(cycle_time, mode, sample_interval, time_format, start_time_epoch);

    Ok(EngineConfig {
        clock,
        instances,
        nodes,
        store,
    })
}

/// Accepts an epoch-seconds numeral or an RFC 3339 / ISO-8601 timestamp.
fn parse_start_time(text: &str) -> f64 {
    if let Ok(secs) = text.parse::<f64>() {
        return secs;
    }
    chrono::DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.timestamp() as f64)
        .unwrap_or(0.0)
}

fn build_expression_node(
    item: &RawProgramItem,
    instance_names: &HashSet<String>,
    lag_requirements: &mut HashMap<String, i64>,
) -> Result<ExpressionNode, ConfigError> {
    let stmt = expr::parse(&item.expression).map_err(|source| ConfigError::Expression {
        name: item.name.clone(),
        source,
    })?;
    let (target, value) = match stmt {
        Stmt::Assign { target, value } => (target, value),
        Stmt::Expr(_) => {
            return Err(ConfigError::Invalid {
                name: item.name.clone(),
                reason: "Variable items require an expression of the form `name = <rhs>`".into(),
            })
        }
    };
    if target != item.name {
        return Err(ConfigError::Invalid {
            name: item.name.clone(),
            reason: format!(
                "assignment target `{target}` does not match item name `{}`",
                item.name
            ),
        });
    }
    expr::validate(&value, &item.expression).map_err(|source| ConfigError::Expression {
        name: item.name.clone(),
        source,
    })?;
    let rewritten = crate::expr::rewrite::rewrite_expr(value, instance_names);
    crate::expr::lag::extract_lags(&Stmt::Expr(rewritten.clone()), lag_requirements);
    Ok(ExpressionNode {
        name: item.name.clone(),
        value: rewritten,
        source_text: item.expression.clone(),
    })
}

fn build_algorithm_node(
    item: &RawProgramItem,
    stored_attributes: &'static [&'static str],
    instance_names: &HashSet<String>,
    lag_requirements: &mut HashMap<String, i64>,
) -> Result<AlgorithmNode, ConfigError> {
    let stmt = expr::parse(&item.expression).map_err(|source| ConfigError::Expression {
        name: item.name.clone(),
        source,
    })?;
    let (func, args, kwargs) = match stmt {
        Stmt::Expr(Expr::Call { func, args, kwargs }) => (func, args, kwargs),
        _ => {
            return Err(ConfigError::Invalid {
                name: item.name.clone(),
                reason: "Algorithm items require an expression of the form `name.execute(...)`"
                    .into(),
            })
        }
    };
    let expected_func = Expr::Attribute {
        value: Box::new(Expr::Name(item.name.clone())),
        attr: "execute".to_string(),
    };
    if *func != expected_func || !args.is_empty() {
        return Err(ConfigError::Invalid {
            name: item.name.clone(),
            reason: format!("expression must be exactly `{}.execute(...)`", item.name),
        });
    }

    let mut rewritten_kwargs = Vec::with_capacity(kwargs.len());
    for (key, value) in kwargs {
        expr::validate(&value, &item.expression).map_err(|source| ConfigError::Expression {
            name: item.name.clone(),
            source,
        })?;
        let rewritten = crate::expr::rewrite::rewrite_expr(value, instance_names);
        crate::expr::lag::extract_lags(&Stmt::Expr(rewritten.clone()), lag_requirements);
        rewritten_kwargs.push((key, rewritten));
    }

    Ok(AlgorithmNode {
        instance_name: item.name.clone(),
        kwargs: rewritten_kwargs,
        stored_attributes,
        source_text: item.expression.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const S1_YAML: &str = r#"
clock:
  cycle_time: 1.0
  mode: GENERATOR
program:
  - name: r
    type: RANDOM
    init_args: { L: 0, H: 100, max_step: 0 }
    expression: "r.execute()"
  - name: d
    type: Variable
    expression: "d = r[-3]"
"#;

    #[test]
    fn loads_s1_and_sizes_lag_buffer_per_spec_formula() {
        let registry = Registry::default();
        let config = load(S1_YAML, &registry).unwrap();
        assert_eq!(config.nodes.len(), 2);
        assert_eq!(config.store.configured_capacity("r.out"), 10);
    }

    #[test]
    fn unknown_algorithm_type_is_rejected() {
        let registry = Registry::default();
        let yaml = "program:\n  - name: x\n    type: NOT_REAL\n    expression: \"x.execute()\"\n";
        let err = load(yaml, &registry).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownType { .. }));
    }

    #[test]
    fn unsafe_variable_expression_is_rejected_at_load_time() {
        let registry = Registry::default();
        let yaml = "program:\n  - name: y\n    type: Variable\n    expression: \"y = __import__('os')\"\n";
        let err = load(yaml, &registry).unwrap_err();
        assert!(matches!(err, ConfigError::Expression { .. }));
    }

    #[test]
    fn non_positive_cycle_time_is_rejected() {
        let registry = Registry::default();
        let yaml = "clock:\n  cycle_time: 0\nprogram:\n  - name: x\n    type: Variable\n    expression: \"x = 1\"\n";
        let err = load(yaml, &registry).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidClock(_)));
    }

    #[test]
    fn sample_interval_below_cycle_time_is_rejected() {
        let registry = Registry::default();
        let yaml = "clock:\n  cycle_time: 2.0\n  sample_interval: 1.0\nprogram:\n  - name: x\n    type: Variable\n    expression: \"x = 1\"\n";
        let err = load(yaml, &registry).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidClock(_)));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let registry = Registry::default();
        let yaml = r#"
program:
  - name: x
    type: Variable
    expression: "x = 1"
  - name: x
    type: Variable
    expression: "x = 2"
"#;
        let err = load(yaml, &registry).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateName(_)));
    }
}
