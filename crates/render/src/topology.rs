use crate::backend::GpuBackend;
use crate::pool::MeshPool;

/// Shape of one pool as seen by a compiled draw plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolShape {
    pub pool_id: u64,
    pub mesh_count: usize,
}

/// Fingerprint of an ordered pool list: which pools, and how many meshes each holds.
///
/// Uniform contents are not part of it, so per-frame slot writes never change it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Topology {
    pools: Vec<PoolShape>,
}

impl Topology {
    pub fn of<'a, B: GpuBackend + 'a>(pools: impl IntoIterator<Item = &'a MeshPool<B>>) -> Self {
        Self {
            pools: pools
                .into_iter()
                .map(|pool| PoolShape {
                    pool_id: pool.id(),
                    mesh_count: pool.mesh_count(),
                })
                .collect(),
        }
    }

    pub fn pools(&self) -> &[PoolShape] {
        &self.pools
    }

    pub fn mesh_count(&self) -> usize {
        self.pools.iter().map(|p| p.mesh_count).sum()
    }
}

/// Remembers the topology the current bundles were compiled against.
#[derive(Debug, Default)]
pub struct TopologyTracker {
    compiled: Option<Topology>,
}

impl TopologyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// True before the first compile, after [`TopologyTracker::invalidate`],
    /// and whenever `current` differs from the compiled topology.
    pub fn needs_rebuild(&self, current: &Topology) -> bool {
        self.compiled.as_ref() != Some(current)
    }

    pub fn mark_compiled(&mut self, topology: Topology) {
        tracing::debug!(
            pools = topology.pools.len(),
            meshes = topology.mesh_count(),
            "bundle topology compiled"
        );
        self.compiled = Some(topology);
    }

    /// Force the next check to report a rebuild.
    pub fn invalidate(&mut self) {
        self.compiled = None;
    }

    pub fn compiled(&self) -> Option<&Topology> {
        self.compiled.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use crate::pool::{MeshPoolBuilder, PoolCapacity};
    use glam::{Mat4, Vec3};
    use sprig_mesh::shapes;

    fn cube_pool(backend: &MemoryBackend, label: &str, cubes: usize) -> MeshPool<MemoryBackend> {
        let mut builder =
            MeshPoolBuilder::for_backend(label, PoolCapacity::new(4, 48, 144), backend).unwrap();
        for _ in 0..cubes {
            builder.add_raw(&shapes::cube()).unwrap();
        }
        builder.finish(backend)
    }

    #[test]
    fn first_check_always_rebuilds() {
        let backend = MemoryBackend::new();
        let pool = cube_pool(&backend, "a", 1);
        let tracker = TopologyTracker::new();
        assert!(tracker.needs_rebuild(&Topology::of([&pool])));
        assert!(tracker.needs_rebuild(&Topology::default()));
    }

    #[test]
    fn uniform_writes_never_trigger_rebuild() {
        let backend = MemoryBackend::new();
        let pool = cube_pool(&backend, "a", 2);
        let mut tracker = TopologyTracker::new();
        tracker.mark_compiled(Topology::of([&pool]));

        let mut handles = pool.meshes().to_vec();
        for frame in 0..10 {
            for h in &mut handles {
                h.transform = Mat4::from_translation(Vec3::splat(frame as f32));
                pool.update_uniform(&backend, h);
            }
            pool.collapse(&backend, &handles[0]);
            assert!(!tracker.needs_rebuild(&Topology::of([&pool])));
        }
    }

    #[test]
    fn pool_set_changes_trigger_rebuild() {
        let backend = MemoryBackend::new();
        let a = cube_pool(&backend, "a", 1);
        let b = cube_pool(&backend, "b", 1);
        let mut tracker = TopologyTracker::new();
        tracker.mark_compiled(Topology::of([&a]));

        assert!(tracker.needs_rebuild(&Topology::of([&a, &b])));
        assert!(tracker.needs_rebuild(&Topology::of([&b])));
        assert!(tracker.needs_rebuild(&Topology::of([&b, &a])));
        assert!(tracker.needs_rebuild(&Topology::default()));
        assert!(!tracker.needs_rebuild(&Topology::of([&a])));
    }

    #[test]
    fn rebuilt_pool_with_same_shape_is_a_new_topology() {
        let backend = MemoryBackend::new();
        let old = cube_pool(&backend, "cubes", 2);
        let mut tracker = TopologyTracker::new();
        tracker.mark_compiled(Topology::of([&old]));

        let fresh = cube_pool(&backend, "cubes", 2);
        assert_ne!(old.id(), fresh.id());
        assert!(tracker.needs_rebuild(&Topology::of([&fresh])));
    }

    #[test]
    fn mesh_count_is_part_of_the_fingerprint() {
        let backend = MemoryBackend::new();
        let pool = cube_pool(&backend, "a", 3);
        let mut shape = Topology::of([&pool]);
        assert_eq!(shape.mesh_count(), 3);

        let mut tracker = TopologyTracker::new();
        tracker.mark_compiled(shape.clone());
        shape.pools[0].mesh_count = 2;
        assert!(tracker.needs_rebuild(&shape));
    }

    #[test]
    fn invalidate_forces_one_rebuild() {
        let backend = MemoryBackend::new();
        let pool = cube_pool(&backend, "a", 1);
        let current = Topology::of([&pool]);
        let mut tracker = TopologyTracker::new();
        tracker.mark_compiled(current.clone());

        tracker.invalidate();
        assert!(tracker.compiled().is_none());
        assert!(tracker.needs_rebuild(&current));
        tracker.mark_compiled(current.clone());
        assert!(!tracker.needs_rebuild(&current));
    }
}
