//! Backend-agnostic core of the batched renderer.
//!
//! Meshes are packed into fixed-capacity pools. Each pool owns one vertex
//! buffer, one index buffer, and one uniform buffer of aligned per-mesh slots.
//! Draw plans are compiled once per pool topology and replayed every frame;
//! per-frame work is limited to uniform slot writes.
//!
//! # Invariants
//! - Uniform slot `i` lives at `i * stride`, and `stride` is a multiple of the
//!   backend's minimum uniform alignment.
//! - A pool's topology is frozen by `finish`; only uniform payloads change.
//! - A rejected `add_mesh` leaves the builder untouched.
//! - A [`Topology`] changes only when the pool list or a pool's mesh count does.
//! - Every pass input is produced by an earlier pass in the schedule.

mod backend;
mod frame;
mod layout;
mod plan;
mod pool;
mod schedule;
mod topology;
mod uniform;

pub use backend::{BufferUsage, GpuBackend, MemoryBackend, MemoryBuffer};
pub use frame::FrameContext;
pub use layout::{
    DEFAULT_UNIFORM_ALIGNMENT, MeshUniform, ProceduralUniform, SceneData, SceneUniform, Vertex,
    aligned_stride,
};
pub use plan::{DrawCommand, DrawPlan};
pub use pool::{
    MAX_POOL_VERTS, MeshHandle, MeshPool, MeshPoolBuilder, PoolCapacity, PoolError, PoolResource,
};
pub use schedule::{PassDescriptor, PassKind, PassSchedule, ScheduleError, TextureSlot};
pub use topology::{PoolShape, Topology, TopologyTracker};
pub use uniform::mesh_uniform;
