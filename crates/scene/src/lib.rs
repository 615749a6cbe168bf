//! The demo world built on mesh pools.
//!
//! [`Scene::build`] fills one main pool (ground, player, spinning cubes), one
//! or more grass pools and a water pool. [`Scene::step`] runs once per frame
//! and rewrites only the uniform slots of meshes that moved.
//!
//! # Invariants
//! - Pool topology is fixed after `build`; per-frame work is uniform writes only.
//! - Expired cubes are collapsed once and never written again.
//! - Grass tiles stay within half a grid extent of the player on X and Z.
//! - Water is drawn in the main pass but never in the shadow pass.

mod camera;
mod config;
mod cubes;
mod grass;
mod lifetime;
mod light;
mod player;
mod water;
mod world;

pub use camera::ChaseCamera;
pub use config::{ConfigError, GrassConfig, PoolConfig, RenderConfig, SceneConfig, WaterConfig};
pub use cubes::{CubeSeed, SPIN_PER_FRAME, SpinningCube};
pub use grass::{GrassField, GrassTile};
pub use lifetime::Lifetime;
pub use light::DirectionalLight;
pub use player::{LOOK_SENSITIVITY, PlayerRig};
pub use water::WaterSurface;
pub use world::{Scene, StepReport};
