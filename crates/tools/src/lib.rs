//! Developer tooling: frame statistics and pool inspection.
//!
//! # Invariants
//! - Tools only read pools and the scene; they never write uniforms.

mod inspector;
mod stats;

pub use inspector::{PlanSummary, PoolInspector, PoolSummary, SceneSummary};
pub use stats::{AVERAGE_WEIGHT, FrameStats, FrameWindow};
