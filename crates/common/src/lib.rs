//! Shared plain types for the sprigheim renderer.

mod types;

pub use types::{Aabb, SurfaceKind, align_up};
