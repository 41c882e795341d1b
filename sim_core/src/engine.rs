//! Engine (C10): orchestrates one cycle — tick the clock, evaluate
//! every node in declared order, assemble the snapshot, pace or stream.
//!
//! The engine owns the variable store, every algorithm instance, and
//! every node; it is the single executor driving them, matching the
//! single-threaded cooperative execution model.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error};

use crate::algorithms::Algorithm;
use crate::clock::{Clock, ClockMode};
use crate::config::{self, ConfigError};
use crate::node::{Node, NodeError};
use crate::registry::Registry;
use crate::store::VariableStore;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("node failure: {0}")]
    Node(#[from] NodeError),
}

/// The flat per-cycle record emitted by the engine. `values` carries
/// every persisted store key and is flattened into the same JSON object
/// as the reserved fields, matching the snapshot stream's "flat map"
/// contract.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub cycle_count: u64,
    pub sim_time: f64,
    pub need_sample: bool,
    pub time_str: String,
    #[serde(flatten)]
    pub values: HashMap<String, f64>,
}

pub struct Engine {
    clock: Clock,
    store: VariableStore,
    instances: HashMap<String, Box<dyn Algorithm>>,
    nodes: Vec<Node>,
    registry: Registry,
    persisted_keys: Vec<String>,
}

impl Engine {
    /// Build an engine from a declarative YAML configuration document.
    /// Any malformed document, unknown type, or malformed expression
    /// fails here; the engine is never constructed in that case.
    pub fn from_config(text: &str) -> Result<Self, EngineError> {
        let registry = Registry::default();
        let built = config::load(text, &registry)?;
        let persisted_keys = built
            .nodes
            .iter()
            .flat_map(|node| match node {
                Node::Expression(n) => vec![n.name.clone()],
                Node::Algorithm(n) => n
                    .stored_attributes
                    .iter()
                    .map(|a| format!("{}.{a}", n.instance_name))
                    .collect(),
            })
            .collect();
        Ok(Self {
            clock: built.clock,
            store: built.store,
            instances: built.instances,
            nodes: built.nodes,
            registry,
            persisted_keys,
        })
    }

    /// Advance exactly one cycle and assemble its snapshot.
    fn step(&mut self) -> Result<Snapshot, EngineError> {
        let (tick, time_str) = self.clock.tick();
        for node in &self.nodes {
            if let Err(e) = node.step(&mut self.store, &mut self.instances, &self.registry, tick.cycle_count) {
                error!(node = node.name(), cycle = tick.cycle_count, error = %e, "node failed");
                return Err(EngineError::Node(e));
            }
        }
        let values = self
            .persisted_keys
            .iter()
            .map(|k| (k.clone(), self.store.get(k, 0.0)))
            .collect();
        let snapshot = Snapshot {
            cycle_count: tick.cycle_count,
            sim_time: tick.sim_time,
            need_sample: tick.need_sample,
            time_str,
            values,
        };
        debug!(cycle = snapshot.cycle_count, ?snapshot, "cycle complete");
        if self.clock.mode() == ClockMode::Realtime {
            self.clock.sleep_remaining();
        }
        Ok(snapshot)
    }

    /// Run exactly `n` cycles in Generator mode; never sleeps.
    pub fn run_generator(&mut self, n: u64) -> Result<Vec<Snapshot>, EngineError> {
        self.clock.set_mode(ClockMode::Generator);
        let mut snapshots = Vec::with_capacity(n as usize);
        for _ in 0..n {
            snapshots.push(self.step()?);
        }
        Ok(snapshots)
    }

    /// Run in Realtime mode, one cycle per real `cycle_time`, streaming
    /// each snapshot to `sender` until `cancel` is observed set at a
    /// cycle boundary. A cycle in progress always finishes before
    /// cancellation takes effect.
    pub fn run_realtime(
        &mut self,
        cancel: &AtomicBool,
        sender: Sender<Snapshot>,
    ) -> Result<(), EngineError> {
        self.clock.set_mode(ClockMode::Realtime);
        while !cancel.load(Ordering::Relaxed) {
            let snapshot = self.step()?;
            if sender.send(snapshot).is_err() {
                break;
            }
        }
        Ok(())
    }
}
