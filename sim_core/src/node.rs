//! Algorithm node (C6) and expression node (C7), unified as a sum type
//! per the design notes: they differ only in per-cycle behavior, so a
//! tagged enum dispatched by a single `step` replaces an open class
//! hierarchy.
//!
//! A node holds the *name* of its instance rather than a live reference
//! to it: the engine owns every [`Algorithm`] instance in one map, and
//! handing `step` that map each cycle avoids a self-referential
//! ownership cycle between node and engine.

use std::collections::HashMap;

use thiserror::Error;

use crate::algorithms::Algorithm;
use crate::expr::ast::Expr;
use crate::expr::error::ExprError;
use crate::expr::eval::Env;
use crate::expr::{self};
use crate::registry::Registry;
use crate::store::VariableStore;

/// An expression error attributed to the node and cycle it failed in.
/// Node failures are never swallowed: the engine logs and re-raises.
#[derive(Debug, Clone, Error)]
#[error("node `{node_name}` failed at cycle {cycle_count}: {source}")]
pub struct NodeError {
    pub node_name: String,
    pub cycle_count: u64,
    #[source]
    pub source: ExprError,
}

impl NodeError {
    fn new(node_name: &str, cycle_count: u64, source: ExprError) -> Self {
        Self {
            node_name: node_name.to_string(),
            cycle_count,
            source,
        }
    }
}

/// Binds a stateful instance to its `name.execute(...)` expression.
pub struct AlgorithmNode {
    pub instance_name: String,
    /// Each keyword argument's sub-expression, already rewritten and
    /// validated at load time; re-evaluated independently every cycle.
    pub kwargs: Vec<(String, Expr)>,
    pub stored_attributes: &'static [&'static str],
    pub source_text: String,
}

/// Binds a pure-variable assignment's right-hand side.
pub struct ExpressionNode {
    pub name: String,
    pub value: Expr,
    pub source_text: String,
}

pub enum Node {
    Algorithm(AlgorithmNode),
    Expression(ExpressionNode),
}

impl Node {
    pub fn name(&self) -> &str {
        match self {
            Node::Algorithm(n) => &n.instance_name,
            Node::Expression(n) => &n.name,
        }
    }

    /// Advance this node by one cycle against the engine's store and
    /// instance map. See `AlgorithmNode`/`ExpressionNode` doc comments
    /// for the two behaviors this dispatches between.
    pub fn step(
        &self,
        store: &mut VariableStore,
        instances: &mut HashMap<String, Box<dyn Algorithm>>,
        registry: &Registry,
        cycle_count: u64,
    ) -> Result<(), NodeError> {
        match self {
            Node::Expression(n) => {
                let value = {
                    let views = instance_views(instances);
                    let env = Env {
                        store,
                        instances: &views,
                        registry,
                    };
                    expr::eval_to_scalar(&n.value, &env, &n.source_text)
                        .map_err(|e| NodeError::new(&n.name, cycle_count, e))?
                };
                store.set(&n.name, value);
                Ok(())
            }
            Node::Algorithm(n) => {
                let resolved: HashMap<String, f64> = {
                    let views = instance_views(instances);
                    let env = Env {
                        store,
                        instances: &views,
                        registry,
                    };
                    let mut resolved = HashMap::with_capacity(n.kwargs.len());
                    for (key, expr) in &n.kwargs {
                        let v = expr::eval_to_scalar(expr, &env, &n.source_text)
                            .map_err(|e| NodeError::new(&n.instance_name, cycle_count, e))?;
                        resolved.insert(key.clone(), v);
                    }
                    resolved
                };
                let instance = instances
                    .get_mut(&n.instance_name)
                    .expect("instance registered at engine construction");
                instance.execute(&resolved);
                for attr in n.stored_attributes {
                    if let Some(v) = instance.attribute(attr) {
                        store.set(&format!("{}.{attr}", n.instance_name), v);
                    }
                }
                Ok(())
            }
        }
    }
}

fn instance_views(
    instances: &HashMap<String, Box<dyn Algorithm>>,
) -> HashMap<String, &dyn Algorithm> {
    instances
        .iter()
        .map(|(k, v)| (k.clone(), v.as_ref()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::sine_wave::SineWave;
    use crate::algorithms::InitArgs;

    fn registry_and_instances() -> (Registry, HashMap<String, Box<dyn Algorithm>>) {
        let registry = Registry::default();
        let mut instances: HashMap<String, Box<dyn Algorithm>> = HashMap::new();
        instances.insert("s".to_string(), SineWave::new(1.0, &InitArgs::new()));
        (registry, instances)
    }

    #[test]
    fn expression_node_persists_rewritten_instance_read() {
        let (registry, mut instances) = registry_and_instances();
        let mut store = VariableStore::new();
        let node = Node::Expression(ExpressionNode {
            name: "x".to_string(),
            value: Expr::Attribute {
                value: Box::new(Expr::Name("s".to_string())),
                attr: "out".to_string(),
            },
            source_text: "x = s".to_string(),
        });
        node.step(&mut store, &mut instances, &registry, 1).unwrap();
        assert_eq!(store.get("x", f64::NAN), 0.0);
    }

    #[test]
    fn algorithm_node_resolves_kwargs_and_persists_attributes() {
        let (registry, mut instances) = registry_and_instances();
        let mut store = VariableStore::new();
        let node = Node::Algorithm(AlgorithmNode {
            instance_name: "s".to_string(),
            kwargs: vec![],
            stored_attributes: &["out"],
            source_text: "s.execute()".to_string(),
        });
        node.step(&mut store, &mut instances, &registry, 1).unwrap();
        assert!(store.contains("s.out"));
    }
}
