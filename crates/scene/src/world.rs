use glam::{Mat4, Vec2, Vec3};
use rand::SeedableRng;
use rand::rngs::StdRng;
use sprig_input::InputState;
use sprig_mesh::shapes;
use sprig_render::{GpuBackend, MeshHandle, MeshPool, MeshPoolBuilder, PoolError, SceneData};

use crate::camera::ChaseCamera;
use crate::config::SceneConfig;
use crate::cubes::{CubeSeed, SpinningCube};
use crate::grass::GrassField;
use crate::lifetime::Lifetime;
use crate::light::DirectionalLight;
use crate::player::PlayerRig;
use crate::water::WaterSurface;

/// What one [`Scene::step`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepReport {
    /// Uniform slots rewritten this frame, collapses included.
    pub uniform_writes: usize,
    pub expired: usize,
    pub grass_wrapped: usize,
}

/// All meshes of the demo world and the per-frame logic that moves them.
pub struct Scene<B: GpuBackend> {
    main: MeshPool<B>,
    ground: MeshHandle,
    player: PlayerRig,
    cubes: Vec<SpinningCube>,
    grass: GrassField<B>,
    water: WaterSurface<B>,
    camera: ChaseCamera,
    light: DirectionalLight,
    elapsed_ms: f32,
}

impl<B: GpuBackend> Scene<B> {
    /// Build every pool and place the initial transforms.
    pub fn build(config: &SceneConfig, backend: &B) -> Result<Self, PoolError> {
        let _span = tracing::info_span!("scene_build", seed = config.seed).entered();
        let mut rng = StdRng::seed_from_u64(config.seed);

        let mut builder = MeshPoolBuilder::for_backend("main", config.pool.capacity(), backend)?;
        let mut ground = builder.add_raw(&shapes::plane())?;
        let player = builder.add_raw(&shapes::cube())?;

        let mut cubes = Vec::with_capacity(config.cube_count as usize);
        let mut seeds = Vec::with_capacity(config.cube_count as usize);
        for _ in 0..config.cube_count {
            let seed = CubeSeed::random(&mut rng);
            let mesh = builder.add_raw(&shapes::cube().with_uniform_color(seed.color))?;
            cubes.push(SpinningCube {
                mesh,
                axis: seed.axis,
                lifetime: config.cube_lifetime_ms.map(Lifetime::new),
            });
            seeds.push(seed);
        }
        let main = builder.finish(backend);

        ground.transform = Mat4::from_translation(Vec3::new(0.0, -3.0, -8.0))
            * Mat4::from_scale(Vec3::splat(10.0));
        main.update_uniform(backend, &ground);
        for (cube, seed) in cubes.iter_mut().zip(&seeds) {
            cube.mesh.transform = Mat4::from_translation(seed.translation);
            main.update_uniform(backend, &cube.mesh);
        }

        let grass = GrassField::build(&config.grass, &mut rng, backend)?;
        let water = WaterSurface::build(&config.water, backend)?;

        tracing::info!(
            cubes = cubes.len(),
            grass_pools = grass.pools().len(),
            "scene built"
        );

        Ok(Self {
            main,
            ground,
            player: PlayerRig::new(player),
            cubes,
            grass,
            water,
            camera: ChaseCamera::default(),
            light: DirectionalLight::default(),
            elapsed_ms: 0.0,
        })
    }

    /// Advance one frame: consume input, move the player, spin and expire
    /// cubes, wrap grass. Every moved mesh gets its uniform rewritten.
    pub fn step(&mut self, backend: &B, input: &mut InputState, dt_ms: f32) -> StepReport {
        let mut report = StepReport::default();
        self.elapsed_ms += dt_ms;

        let pointer = input.pointer.take();
        if self.player.steer(input.keys.movement(), pointer) {
            self.main.update_uniform(backend, &self.player.mesh);
            report.uniform_writes += 1;
        }

        for cube in &mut self.cubes {
            if !cube.is_alive() {
                continue;
            }
            let expired = cube.lifetime.as_mut().is_some_and(|l| l.tick(dt_ms));
            if expired {
                self.main.collapse(backend, &cube.mesh);
                report.expired += 1;
            } else {
                cube.spin();
                self.main.update_uniform(backend, &cube.mesh);
            }
            report.uniform_writes += 1;
        }
        if report.expired > 0 {
            tracing::debug!(expired = report.expired, "cubes expired");
        }

        report.grass_wrapped = self.grass.update(backend, self.player.position());
        report.uniform_writes += report.grass_wrapped;
        report
    }

    /// Per-frame scene uniform values for a viewport of `width x height`.
    pub fn scene_data(&self, width: u32, height: u32) -> SceneData {
        let aspect = width.max(1) as f32 / height.max(1) as f32;
        let player = self.player.transform();
        let offset = self.player.camera_offset;
        SceneData {
            camera_view_proj: self.camera.view_projection(player, offset, aspect),
            light_view_proj: self.light.view_projection(),
            light_dir: self.light.direction(),
            time: self.elapsed_ms,
            target_size: Vec2::new(width as f32, height as f32),
            camera_pos: self.camera.position(player, offset),
        }
    }

    /// Every pool drawn in the main pass.
    pub fn pools(&self) -> Vec<&MeshPool<B>> {
        let mut pools = self.shadow_casters();
        pools.push(self.water.pool());
        pools
    }

    /// Pools drawn into the shadow map. Water neither casts nor needs depth there.
    pub fn shadow_casters(&self) -> Vec<&MeshPool<B>> {
        let mut pools = vec![&self.main];
        pools.extend(self.grass.pools());
        pools
    }

    pub fn main_pool(&self) -> &MeshPool<B> {
        &self.main
    }

    pub fn ground(&self) -> &MeshHandle {
        &self.ground
    }

    pub fn player(&self) -> &PlayerRig {
        &self.player
    }

    pub fn cubes(&self) -> &[SpinningCube] {
        &self.cubes
    }

    pub fn live_cubes(&self) -> usize {
        self.cubes.iter().filter(|c| c.is_alive()).count()
    }

    pub fn grass(&self) -> &GrassField<B> {
        &self.grass
    }

    pub fn water(&self) -> &WaterSurface<B> {
        &self.water
    }

    pub fn elapsed_ms(&self) -> f32 {
        self.elapsed_ms
    }
}
