use std::fmt;
use std::ops::Range;
use std::sync::atomic::{AtomicU64, Ordering};

use glam::Mat4;
use sprig_common::{Aabb, align_up};
use sprig_mesh::{MeshError, RawMesh, UnsharedMesh, unshare};

use crate::backend::{BufferUsage, GpuBackend};
use crate::layout::{MeshUniform, Vertex, aligned_stride};

/// Largest vertex count addressable by `u16` indices.
pub const MAX_POOL_VERTS: u32 = u16::MAX as u32 + 1;

static NEXT_POOL_ID: AtomicU64 = AtomicU64::new(1);

/// Which fixed pool limit a request ran into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolResource {
    Meshes,
    Triangles,
    Vertices,
}

impl fmt::Display for PoolResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolResource::Meshes => write!(f, "meshes"),
            PoolResource::Triangles => write!(f, "triangles"),
            PoolResource::Vertices => write!(f, "vertices"),
        }
    }
}

/// Errors from building a mesh pool.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PoolError {
    #[error("pool `{pool}` is out of {resource}: need {requested}, capacity {capacity}")]
    CapacityExceeded {
        pool: String,
        resource: PoolResource,
        requested: u64,
        capacity: u64,
    },
    #[error("invalid pool capacity: {0}")]
    InvalidCapacity(String),
    #[error("malformed mesh: {0}")]
    Mesh(#[from] MeshError),
}

/// Fixed limits of a pool, known up front.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolCapacity {
    pub max_meshes: u32,
    pub max_tris: u32,
    pub max_verts: u32,
}

impl PoolCapacity {
    pub fn new(max_meshes: u32, max_tris: u32, max_verts: u32) -> Self {
        Self {
            max_meshes,
            max_tris,
            max_verts,
        }
    }

    fn validate(&self, uniform_stride: u64) -> Result<(), PoolError> {
        if self.max_meshes == 0 || self.max_tris == 0 || self.max_verts == 0 {
            return Err(PoolError::InvalidCapacity(format!(
                "all limits must be non-zero: {self:?}"
            )));
        }
        if self.max_verts > MAX_POOL_VERTS {
            return Err(PoolError::InvalidCapacity(format!(
                "max_verts {} exceeds the u16 index range ({MAX_POOL_VERTS})",
                self.max_verts
            )));
        }
        if self.max_meshes as u64 * uniform_stride > u32::MAX as u64 {
            return Err(PoolError::InvalidCapacity(format!(
                "{} uniform slots of {uniform_stride} bytes overflow a dynamic offset",
                self.max_meshes
            )));
        }
        Ok(())
    }
}

/// One mesh inside a pool.
///
/// Offsets are assigned by the pool and never change. `transform` is the
/// caller's to mutate; push it to the GPU with [`MeshPool::update_uniform`].
#[derive(Debug, Clone, PartialEq)]
pub struct MeshHandle {
    slot: u32,
    vertex_offset: u32,
    index_offset: u32,
    tri_count: u32,
    uniform_offset: u64,
    bounds: Aabb,
    pub transform: Mat4,
}

impl MeshHandle {
    /// Position in the pool; also the uniform slot index.
    pub fn slot(&self) -> u32 {
        self.slot
    }

    /// First vertex element in the pool's vertex buffer.
    pub fn vertex_offset(&self) -> u32 {
        self.vertex_offset
    }

    /// First index element in the pool's index buffer.
    pub fn index_offset(&self) -> u32 {
        self.index_offset
    }

    pub fn tri_count(&self) -> u32 {
        self.tri_count
    }

    /// Byte offset of this mesh's uniform slot.
    pub fn uniform_offset(&self) -> u64 {
        self.uniform_offset
    }

    /// Local-space bounds of the mesh geometry.
    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    pub fn vertex_count(&self) -> u32 {
        self.tri_count * 3
    }

    pub fn index_count(&self) -> u32 {
        self.tri_count * 3
    }

    /// Index elements covered by this mesh.
    pub fn index_range(&self) -> Range<u32> {
        self.index_offset..self.index_offset + self.index_count()
    }

    pub fn vertex_range(&self) -> Range<u32> {
        self.vertex_offset..self.vertex_offset + self.vertex_count()
    }
}

/// Accumulates meshes into staging memory. Consumed by [`MeshPoolBuilder::finish`].
#[derive(Debug)]
pub struct MeshPoolBuilder {
    label: String,
    capacity: PoolCapacity,
    uniform_stride: u64,
    vertices: Vec<Vertex>,
    indices: Vec<u16>,
    uniforms: Vec<u8>,
    handles: Vec<MeshHandle>,
}

impl MeshPoolBuilder {
    /// Create a builder whose uniform slots are aligned to `uniform_alignment` bytes.
    ///
    /// # Panics
    /// Panics if `uniform_alignment` is not a power of two.
    pub fn new(
        label: impl Into<String>,
        capacity: PoolCapacity,
        uniform_alignment: u64,
    ) -> Result<Self, PoolError> {
        let uniform_stride = aligned_stride::<MeshUniform>(uniform_alignment);
        assert_eq!(
            uniform_stride % uniform_alignment,
            0,
            "uniform stride {uniform_stride} is not a multiple of {uniform_alignment}"
        );
        assert!(uniform_stride >= MeshUniform::SIZE);
        capacity.validate(uniform_stride)?;

        let label = label.into();
        tracing::debug!(
            pool = %label,
            max_meshes = capacity.max_meshes,
            max_tris = capacity.max_tris,
            max_verts = capacity.max_verts,
            uniform_stride,
            "created mesh pool builder"
        );

        Ok(Self {
            label,
            capacity,
            uniform_stride,
            vertices: Vec::with_capacity(capacity.max_verts as usize),
            indices: Vec::with_capacity(capacity.max_tris as usize * 3),
            uniforms: Vec::new(),
            handles: Vec::new(),
        })
    }

    /// Create a builder aligned to the backend's uniform offset requirement.
    pub fn for_backend<B: GpuBackend>(
        label: impl Into<String>,
        capacity: PoolCapacity,
        backend: &B,
    ) -> Result<Self, PoolError> {
        Self::new(label, capacity, backend.min_uniform_alignment())
    }

    /// Append a mesh. Fails without touching the builder if any limit would be exceeded.
    pub fn add_mesh(&mut self, mesh: &UnsharedMesh) -> Result<MeshHandle, PoolError> {
        let vertex_offset = self.vertices.len() as u32;
        let index_offset = self.indices.len() as u32;
        let tri_count = mesh.triangle_count() as u32;
        let slot = self.handles.len() as u32;

        self.check(PoolResource::Meshes, slot as u64 + 1, self.capacity.max_meshes)?;
        self.check(
            PoolResource::Triangles,
            index_offset as u64 / 3 + tri_count as u64,
            self.capacity.max_tris,
        )?;
        self.check(
            PoolResource::Vertices,
            vertex_offset as u64 + mesh.vertex_count() as u64,
            self.capacity.max_verts,
        )?;

        self.vertices
            .extend(mesh.vertices().iter().map(|v| Vertex::from_flat(v, mesh.kind)));
        // Bounded by MAX_POOL_VERTS, so every global index fits in u16.
        self.indices
            .extend(mesh.indices().map(|i| (vertex_offset + i) as u16));

        let handle = MeshHandle {
            slot,
            vertex_offset,
            index_offset,
            tri_count,
            uniform_offset: slot as u64 * self.uniform_stride,
            bounds: mesh.bounds(),
            transform: Mat4::IDENTITY,
        };

        self.uniforms
            .resize((slot as u64 + 1) as usize * self.uniform_stride as usize, 0);
        let start = handle.uniform_offset as usize;
        let record = MeshUniform::new(handle.transform, handle.bounds);
        self.uniforms[start..start + MeshUniform::SIZE as usize]
            .copy_from_slice(bytemuck::bytes_of(&record));

        self.handles.push(handle.clone());
        Ok(handle)
    }

    /// Preprocess and append an authored mesh. A malformed mesh is rejected before any staging.
    pub fn add_raw(&mut self, mesh: &RawMesh) -> Result<MeshHandle, PoolError> {
        let flat = unshare(mesh)?;
        self.add_mesh(&flat)
    }

    fn check(&self, resource: PoolResource, requested: u64, capacity: u32) -> Result<(), PoolError> {
        if requested > capacity as u64 {
            return Err(PoolError::CapacityExceeded {
                pool: self.label.clone(),
                resource,
                requested,
                capacity: capacity as u64,
            });
        }
        Ok(())
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn capacity(&self) -> PoolCapacity {
        self.capacity
    }

    pub fn uniform_stride(&self) -> u64 {
        self.uniform_stride
    }

    pub fn mesh_count(&self) -> usize {
        self.handles.len()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Upload all three staging regions and freeze the pool's topology.
    pub fn finish<B: GpuBackend>(self, backend: &B) -> MeshPool<B> {
        let _span = tracing::info_span!("pool_finish", pool = %self.label).entered();

        let vertex_bytes = self.capacity.max_verts as u64 * Vertex::SIZE;
        let index_bytes = align_up(self.capacity.max_tris as u64 * 3 * 2, 4);
        let uniform_bytes = self.capacity.max_meshes as u64 * self.uniform_stride;

        let vertex_buffer = backend.create_buffer(
            &format!("{}_vertices", self.label),
            BufferUsage::Vertex,
            vertex_bytes,
            bytemuck::cast_slice(&self.vertices),
        );
        let index_buffer = backend.create_buffer(
            &format!("{}_indices", self.label),
            BufferUsage::Index,
            index_bytes,
            bytemuck::cast_slice(&self.indices),
        );
        let uniform_buffer = backend.create_buffer(
            &format!("{}_uniforms", self.label),
            BufferUsage::Uniform,
            uniform_bytes,
            &self.uniforms,
        );

        tracing::info!(
            pool = %self.label,
            meshes = self.handles.len(),
            verts = self.vertices.len(),
            tris = self.indices.len() / 3,
            bytes = vertex_bytes + index_bytes + uniform_bytes,
            "mesh pool finished"
        );

        MeshPool {
            id: NEXT_POOL_ID.fetch_add(1, Ordering::Relaxed),
            label: self.label,
            capacity: self.capacity,
            uniform_stride: self.uniform_stride,
            vertex_count: self.vertices.len() as u32,
            index_count: self.indices.len() as u32,
            handles: self.handles,
            vertex_buffer,
            index_buffer,
            uniform_buffer,
        }
    }
}

/// Device-resident geometry and per-instance uniforms for many meshes.
///
/// Topology is frozen; only uniform slot contents change after creation.
pub struct MeshPool<B: GpuBackend> {
    id: u64,
    label: String,
    capacity: PoolCapacity,
    uniform_stride: u64,
    vertex_count: u32,
    index_count: u32,
    handles: Vec<MeshHandle>,
    vertex_buffer: B::Buffer,
    index_buffer: B::Buffer,
    uniform_buffer: B::Buffer,
}

impl<B: GpuBackend> MeshPool<B> {
    /// Process-unique; two finished pools never share an id.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn capacity(&self) -> PoolCapacity {
        self.capacity
    }

    pub fn uniform_stride(&self) -> u64 {
        self.uniform_stride
    }

    /// Handles in slot order, as issued by the builder.
    pub fn meshes(&self) -> &[MeshHandle] {
        &self.handles
    }

    pub fn mesh_count(&self) -> usize {
        self.handles.len()
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    pub fn triangle_count(&self) -> u32 {
        self.index_count / 3
    }

    pub fn vertex_buffer(&self) -> &B::Buffer {
        &self.vertex_buffer
    }

    pub fn index_buffer(&self) -> &B::Buffer {
        &self.index_buffer
    }

    pub fn uniform_buffer(&self) -> &B::Buffer {
        &self.uniform_buffer
    }
}

impl<B: GpuBackend> fmt::Debug for MeshPool<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MeshPool")
            .field("label", &self.label)
            .field("capacity", &self.capacity)
            .field("uniform_stride", &self.uniform_stride)
            .field("meshes", &self.handles.len())
            .field("vertex_count", &self.vertex_count)
            .field("index_count", &self.index_count)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use sprig_mesh::shapes;

    fn flat(raw: &RawMesh) -> UnsharedMesh {
        unshare(raw).unwrap()
    }

    #[test]
    fn offsets_increase_without_overlap() {
        let mut builder = MeshPoolBuilder::new("p", PoolCapacity::new(8, 200, 600), 256).unwrap();
        let meshes = [
            shapes::plane(),
            shapes::cube(),
            shapes::water_grid(3, 1.0),
            shapes::cube(),
        ];
        let handles: Vec<MeshHandle> = meshes
            .iter()
            .map(|m| builder.add_mesh(&flat(m)).unwrap())
            .collect();

        for pair in handles.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            assert_eq!(a.vertex_range().end, b.vertex_offset);
            assert_eq!(a.index_range().end, b.index_offset);
            assert!(a.uniform_offset + MeshUniform::SIZE <= b.uniform_offset);
            assert_eq!(b.slot, a.slot + 1);
        }
    }

    #[test]
    fn uniform_offsets_are_aligned_for_every_slot() {
        for alignment in [64u64, 256] {
            let cap = PoolCapacity::new(16, 16 * 12, 16 * 36);
            let mut builder = MeshPoolBuilder::new("p", cap, alignment).unwrap();
            for _ in 0..cap.max_meshes {
                let h = builder.add_mesh(&flat(&shapes::cube())).unwrap();
                assert_eq!(h.uniform_offset % alignment, 0);
                assert_eq!(h.uniform_offset, h.slot as u64 * builder.uniform_stride());
            }
        }
    }

    #[test]
    fn indices_are_global() {
        let mut builder = MeshPoolBuilder::new("p", PoolCapacity::new(2, 16, 48), 256).unwrap();
        builder.add_mesh(&flat(&shapes::plane())).unwrap();
        let cube = builder.add_mesh(&flat(&shapes::cube())).unwrap();
        assert_eq!(cube.vertex_offset, 12);
        assert_eq!(builder.indices[cube.index_offset as usize], 12);
        assert_eq!(*builder.indices.last().unwrap(), 47);
    }

    #[test]
    fn mesh_budget_exhausted_before_geometry_budget() {
        let mut builder = MeshPoolBuilder::new("p", PoolCapacity::new(2, 32, 96), 256).unwrap();
        let cube = builder.add_mesh(&flat(&shapes::cube())).unwrap();
        let plane = builder.add_mesh(&flat(&shapes::plane())).unwrap();
        assert_eq!((cube.tri_count, cube.vertex_count()), (12, 36));
        assert_eq!((plane.tri_count, plane.vertex_count()), (4, 12));

        let blade = shapes::grass_blade(
            glam::Vec3::ZERO,
            0.1,
            0.5,
            glam::Vec3::ZERO,
            glam::Vec3::Y,
        );
        let err = builder.add_mesh(&flat(&blade)).unwrap_err();
        assert!(matches!(
            err,
            PoolError::CapacityExceeded {
                resource: PoolResource::Meshes,
                requested: 3,
                capacity: 2,
                ..
            }
        ));
        assert_eq!(builder.mesh_count(), 2);
        assert_eq!(builder.triangle_count(), 16);
    }

    #[test]
    fn third_mesh_rejected_when_mesh_slots_exhausted() {
        // maxMeshes=2, maxTris=12, maxVerts=36: the cube consumes all geometry,
        // and the plane is rejected on triangles; any third mesh is rejected on slots.
        let mut builder = MeshPoolBuilder::new("p", PoolCapacity::new(2, 12, 36), 256).unwrap();
        builder.add_mesh(&flat(&shapes::cube())).unwrap();
        let plane = builder.add_mesh(&flat(&shapes::plane()));
        assert!(matches!(
            plane,
            Err(PoolError::CapacityExceeded {
                resource: PoolResource::Triangles,
                ..
            })
        ));

        let empty = UnsharedMesh::from_vertices(Vec::new(), Default::default()).unwrap();
        builder.add_mesh(&empty).unwrap();
        assert!(matches!(
            builder.add_mesh(&empty),
            Err(PoolError::CapacityExceeded {
                resource: PoolResource::Meshes,
                ..
            })
        ));
    }

    #[test]
    fn rejected_add_leaves_builder_untouched() {
        let mut builder = MeshPoolBuilder::new("p", PoolCapacity::new(4, 14, 42), 256).unwrap();
        builder.add_mesh(&flat(&shapes::cube())).unwrap();
        let before = (
            builder.vertices.clone(),
            builder.indices.clone(),
            builder.uniforms.clone(),
            builder.handles.clone(),
        );

        let err = builder.add_mesh(&flat(&shapes::plane())).unwrap_err();
        assert!(matches!(
            err,
            PoolError::CapacityExceeded {
                resource: PoolResource::Triangles,
                requested: 16,
                capacity: 14,
                ..
            }
        ));
        assert_eq!(builder.vertices, before.0);
        assert_eq!(builder.indices, before.1);
        assert_eq!(builder.uniforms, before.2);
        assert_eq!(builder.handles, before.3);
    }

    #[test]
    fn vertex_limit_enforced() {
        let mut builder = MeshPoolBuilder::new("p", PoolCapacity::new(4, 100, 40), 256).unwrap();
        builder.add_mesh(&flat(&shapes::cube())).unwrap();
        assert!(matches!(
            builder.add_mesh(&flat(&shapes::plane())),
            Err(PoolError::CapacityExceeded {
                resource: PoolResource::Vertices,
                requested: 48,
                capacity: 40,
                ..
            })
        ));
    }

    #[test]
    fn malformed_raw_mesh_rejected_before_staging() {
        let mut builder = MeshPoolBuilder::new("p", PoolCapacity::new(4, 100, 300), 256).unwrap();
        let bad = RawMesh::new(vec![glam::Vec3::ZERO], vec![[0, 1, 2]], vec![glam::Vec3::ONE]);
        assert!(matches!(builder.add_raw(&bad), Err(PoolError::Mesh(_))));
        assert_eq!(builder.mesh_count(), 0);
        assert_eq!(builder.vertex_count(), 0);
    }

    #[test]
    fn partial_triangle_never_reaches_staging() {
        let mut builder = MeshPoolBuilder::new("p", PoolCapacity::new(2, 1, 6), 256).unwrap();
        let corner = sprig_mesh::FlatVertex {
            position: glam::Vec3::ZERO,
            normal: glam::Vec3::Y,
            color: glam::Vec3::ONE,
        };
        let staged = UnsharedMesh::from_vertices(vec![corner; 5], Default::default())
            .map_err(PoolError::from)
            .and_then(|mesh| builder.add_mesh(&mesh));
        assert!(matches!(
            staged,
            Err(PoolError::Mesh(MeshError::PartialTriangle { vertices: 5 }))
        ));
        assert_eq!(builder.vertex_count(), 0);
        assert_eq!(builder.indices.len() % 3, 0);
        assert_eq!(builder.mesh_count(), 0);
    }

    #[test]
    fn invalid_capacities_rejected() {
        assert!(matches!(
            MeshPoolBuilder::new("p", PoolCapacity::new(0, 1, 1), 256),
            Err(PoolError::InvalidCapacity(_))
        ));
        assert!(matches!(
            MeshPoolBuilder::new("p", PoolCapacity::new(1, 1, MAX_POOL_VERTS + 1), 256),
            Err(PoolError::InvalidCapacity(_))
        ));
    }

    #[test]
    #[should_panic]
    fn non_power_of_two_alignment_panics() {
        let _ = MeshPoolBuilder::new("p", PoolCapacity::new(1, 1, 3), 100);
    }

    #[test]
    fn finish_uploads_staging_into_capacity_sized_buffers() {
        let backend = MemoryBackend::new();
        let cap = PoolCapacity::new(3, 20, 60);
        let mut builder = MeshPoolBuilder::for_backend("scene", cap, &backend).unwrap();
        let cube = builder.add_raw(&shapes::cube()).unwrap();
        let pool = builder.finish(&backend);

        assert_eq!(pool.mesh_count(), 1);
        assert_eq!(pool.vertex_count(), 36);
        assert_eq!(pool.triangle_count(), 12);
        assert_eq!(backend.buffer_count(), 3);

        let verts = backend.contents(pool.vertex_buffer());
        assert_eq!(verts.len() as u64, 60 * Vertex::SIZE);
        let first: Vertex = bytemuck::pod_read_unaligned(&verts[..Vertex::SIZE as usize]);
        assert_eq!(first.position, [1.0, 1.0, 1.0]);

        let indices = backend.contents(pool.index_buffer());
        assert_eq!(indices.len(), 120);

        let uniforms = backend.contents(pool.uniform_buffer());
        assert_eq!(uniforms.len(), 3 * 256);
        let record: MeshUniform =
            bytemuck::pod_read_unaligned(&uniforms[..MeshUniform::SIZE as usize]);
        assert_eq!(record.transform, Mat4::IDENTITY.to_cols_array_2d());
        assert_eq!(record.aabb_min, cube.bounds.min.to_array());
        assert_eq!(backend.label(pool.uniform_buffer()), "scene_uniforms");
    }
}
