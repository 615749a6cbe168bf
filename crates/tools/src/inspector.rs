use std::fmt;

use sprig_render::{DrawPlan, GpuBackend, MeshPool, PoolCapacity};
use sprig_scene::Scene;

/// Read-only queries over pools and the scene, for the overlay and the CLI.
pub struct PoolInspector;

impl PoolInspector {
    pub fn summary<B: GpuBackend>(pool: &MeshPool<B>) -> PoolSummary {
        PoolSummary {
            label: pool.label().to_string(),
            meshes: pool.mesh_count(),
            tris: pool.triangle_count(),
            verts: pool.vertex_count(),
            capacity: pool.capacity(),
            uniform_stride: pool.uniform_stride(),
        }
    }

    pub fn scene<B: GpuBackend>(scene: &Scene<B>) -> SceneSummary {
        let main = scene.pools();
        let shadow = scene.shadow_casters();
        SceneSummary {
            pools: main.iter().map(|p| Self::summary(*p)).collect(),
            main_plan: PlanSummary::of(&DrawPlan::compile(&main)),
            shadow_plan: PlanSummary::of(&DrawPlan::compile(&shadow)),
            live_cubes: scene.live_cubes(),
            total_cubes: scene.cubes().len(),
            grass_tiles: scene.grass().tiles().len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PoolSummary {
    pub label: String,
    pub meshes: usize,
    pub tris: u32,
    pub verts: u32,
    pub capacity: PoolCapacity,
    pub uniform_stride: u64,
}

impl PoolSummary {
    /// Fraction of the triangle budget in use.
    pub fn tri_usage(&self) -> f32 {
        self.tris as f32 / self.capacity.max_tris as f32
    }
}

impl fmt::Display for PoolSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: meshes={}/{} tris={}/{} verts={}/{} stride={}",
            self.label,
            self.meshes,
            self.capacity.max_meshes,
            self.tris,
            self.capacity.max_tris,
            self.verts,
            self.capacity.max_verts,
            self.uniform_stride,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanSummary {
    pub binds: usize,
    pub draws: usize,
    pub tris: u64,
}

impl PlanSummary {
    pub fn of(plan: &DrawPlan) -> Self {
        Self {
            binds: plan.bind_count(),
            draws: plan.draw_count(),
            tris: plan.triangle_count(),
        }
    }
}

impl fmt::Display for PlanSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "binds={} draws={} tris={}", self.binds, self.draws, self.tris)
    }
}

#[derive(Debug, Clone)]
pub struct SceneSummary {
    pub pools: Vec<PoolSummary>,
    pub main_plan: PlanSummary,
    pub shadow_plan: PlanSummary,
    pub live_cubes: usize,
    pub total_cubes: usize,
    pub grass_tiles: usize,
}

impl fmt::Display for SceneSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Scene: cubes={}/{} grass_tiles={}",
            self.live_cubes, self.total_cubes, self.grass_tiles
        )?;
        for pool in &self.pools {
            writeln!(f, "  {pool}")?;
        }
        writeln!(f, "  main pass: {}", self.main_plan)?;
        write!(f, "  shadow pass: {}", self.shadow_plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sprig_mesh::shapes;
    use sprig_render::{MemoryBackend, MeshPoolBuilder};
    use sprig_scene::{GrassConfig, SceneConfig, WaterConfig};

    #[test]
    fn pool_summary() {
        let backend = MemoryBackend::new();
        let mut builder =
            MeshPoolBuilder::for_backend("demo", PoolCapacity::new(4, 40, 120), &backend).unwrap();
        builder.add_raw(&shapes::cube()).unwrap();
        let pool = builder.finish(&backend);

        let summary = PoolInspector::summary(&pool);
        assert_eq!(summary.meshes, 1);
        assert_eq!(summary.tris, 12);
        assert_eq!(summary.verts, 36);
        assert!((summary.tri_usage() - 0.3).abs() < 1e-6);
        assert_eq!(
            summary.to_string(),
            "demo: meshes=1/4 tris=12/40 verts=36/120 stride=256"
        );
    }

    #[test]
    fn scene_summary_counts_both_passes() {
        let backend = MemoryBackend::new();
        let config = SceneConfig {
            cube_count: 2,
            grass: GrassConfig {
                tiles_per_side: 1,
                blades_per_tile: 5,
                ..GrassConfig::default()
            },
            water: WaterConfig {
                cells: 2,
                ..WaterConfig::default()
            },
            ..SceneConfig::default()
        };
        let scene = Scene::build(&config, &backend).unwrap();
        let summary = PoolInspector::scene(&scene);

        assert_eq!(summary.pools.len(), 3);
        assert_eq!(summary.main_plan.draws, 4 + 1 + 1);
        assert_eq!(summary.shadow_plan.draws, 4 + 1);
        assert_eq!(summary.main_plan.tris, summary.shadow_plan.tris + 8);
        assert_eq!(summary.live_cubes, 2);
        let text = summary.to_string();
        assert!(text.contains("main pass: binds=3 draws=6"));
        assert!(text.contains("water: meshes=1/1"));
    }
}
