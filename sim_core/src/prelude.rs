//! Convenient re-exports for consumers of this crate.
//!
//! ```rust
//! use sim_core::prelude::*;
//! ```

// ─── Engine ─────────────────────────────────────────────────────────
pub use crate::engine::{Engine, EngineError, Snapshot};

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, EngineConfig};

// ─── Clock ──────────────────────────────────────────────────────────
pub use crate::clock::{Clock, ClockMode, Tick};

// ─── Catalog ────────────────────────────────────────────────────────
pub use crate::registry::Registry;

// ─── Variable store ─────────────────────────────────────────────────
pub use crate::store::VariableStore;
