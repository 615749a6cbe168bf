use glam::{Mat4, Vec3};
use sprig_mesh::shapes;
use sprig_render::{GpuBackend, MeshHandle, MeshPool, MeshPoolBuilder, PoolCapacity, PoolError};

use crate::config::WaterConfig;

/// A flat grid tagged [`sprig_common::SurfaceKind::Water`]; the vertex shader animates it.
///
/// Lives in its own pool so the shadow pass can skip it.
pub struct WaterSurface<B: GpuBackend> {
    pool: MeshPool<B>,
    mesh: MeshHandle,
}

impl<B: GpuBackend> WaterSurface<B> {
    pub fn build(config: &WaterConfig, backend: &B) -> Result<Self, PoolError> {
        let grid = shapes::water_grid(config.cells, config.spacing);
        let tris = grid.triangle_count() as u32;
        let mut builder =
            MeshPoolBuilder::for_backend("water", PoolCapacity::new(1, tris, tris * 3), backend)?;
        let mut mesh = builder.add_raw(&grid)?;
        let pool = builder.finish(backend);

        mesh.transform = Mat4::from_translation(Vec3::new(0.0, config.height, 0.0));
        pool.update_uniform(backend, &mesh);
        tracing::debug!(cells = config.cells, tris, "water surface built");
        Ok(Self { pool, mesh })
    }

    pub fn pool(&self) -> &MeshPool<B> {
        &self.pool
    }

    pub fn mesh(&self) -> &MeshHandle {
        &self.mesh
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sprig_render::{MemoryBackend, Vertex};

    #[test]
    fn builds_a_single_water_mesh() {
        let backend = MemoryBackend::new();
        let water = WaterSurface::build(&WaterConfig::default(), &backend).unwrap();
        assert_eq!(water.pool().mesh_count(), 1);
        assert_eq!(water.pool().triangle_count(), 64 * 64 * 2);

        let bytes = backend.contents(water.pool().vertex_buffer());
        let v: Vertex = bytemuck::pod_read_unaligned(&bytes[..Vertex::SIZE as usize]);
        assert_eq!(v.kind, 1);
        assert_eq!(water.mesh().transform.w_axis.y, -12.0);
    }

    #[test]
    fn too_many_cells_for_u16_indices() {
        let backend = MemoryBackend::new();
        let config = WaterConfig {
            cells: 200,
            ..WaterConfig::default()
        };
        assert!(matches!(
            WaterSurface::build(&config, &backend),
            Err(PoolError::InvalidCapacity(_))
        ));
    }

    #[test]
    fn zero_cells_is_invalid() {
        let backend = MemoryBackend::new();
        let config = WaterConfig {
            cells: 0,
            ..WaterConfig::default()
        };
        assert!(WaterSurface::build(&config, &backend).is_err());
    }
}
