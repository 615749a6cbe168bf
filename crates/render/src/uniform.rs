use glam::Mat4;

use crate::backend::GpuBackend;
use crate::layout::MeshUniform;
use crate::pool::{MeshHandle, MeshPool};

/// Serialize a handle's current per-instance state.
pub fn mesh_uniform(handle: &MeshHandle) -> MeshUniform {
    MeshUniform::new(handle.transform, handle.bounds())
}

impl<B: GpuBackend> MeshPool<B> {
    /// Write `handle`'s transform and bounds into its uniform slot.
    ///
    /// Last write wins. Call once per frame for every mesh whose transform moved;
    /// a skipped call leaves the previous frame's data in place. A handle issued
    /// by another pool is ignored.
    pub fn update_uniform(&self, backend: &B, handle: &MeshHandle) {
        if !self.check_owned(handle) {
            return;
        }
        let record = mesh_uniform(handle);
        backend.write_buffer(
            self.uniform_buffer(),
            handle.uniform_offset(),
            bytemuck::bytes_of(&record),
        );
    }

    /// Write a zero transform into `handle`'s slot so its triangles collapse and draw nothing.
    ///
    /// Pools never remove meshes; this is how a dead mesh leaves the frame.
    pub fn collapse(&self, backend: &B, handle: &MeshHandle) {
        if !self.check_owned(handle) {
            return;
        }
        let record = MeshUniform::new(Mat4::ZERO, handle.bounds());
        backend.write_buffer(
            self.uniform_buffer(),
            handle.uniform_offset(),
            bytemuck::bytes_of(&record),
        );
    }

    /// Whether `handle` was issued by this pool's builder.
    pub fn owns(&self, handle: &MeshHandle) -> bool {
        self.meshes().get(handle.slot() as usize).is_some_and(|h| {
            h.uniform_offset() == handle.uniform_offset()
                && h.vertex_offset() == handle.vertex_offset()
                && h.index_offset() == handle.index_offset()
        })
    }

    fn check_owned(&self, handle: &MeshHandle) -> bool {
        let owned = self.owns(handle);
        if !owned {
            tracing::warn!(
                pool = %self.label(),
                slot = handle.slot(),
                "ignoring uniform write for a handle this pool did not issue"
            );
        }
        owned
    }
}
