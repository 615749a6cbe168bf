//! wgpu backend for the sprig renderer.
//!
//! Implements [`sprig_render::GpuBackend`] over a device and queue, compiles
//! draw plans into render bundles and records the procedural, shadow and main
//! passes in schedule order.
//!
//! # Invariants
//! - Bundles are replayed, never re-encoded per frame. They are rebuilt only
//!   after the pool topology changes.
//! - Per-frame CPU work is limited to uniform writes and bundle execution.
//! - Device loss is reported as [`RenderError::DeviceLost`], never a panic.

mod backend;
mod bundle;
mod driver;
mod error;
mod pipelines;
mod renderer;
mod shaders;
mod targets;

pub use backend::WgpuBackend;
pub use bundle::{BundleTarget, encode_plan, model_bind_group};
pub use driver::FrameDriver;
pub use error::RenderError;
pub use pipelines::{MAIN_DEPTH_FORMAT, PROCEDURAL_FORMAT, Pipelines, SHADOW_FORMAT, vertex_layout};
pub use renderer::Renderer;
pub use targets::MainTargets;
