use glam::{Mat4, Vec2, Vec3};
use rand::RngExt;
use rand::rngs::StdRng;
use sprig_mesh::{RawMesh, shapes};
use sprig_render::{
    GpuBackend, MAX_POOL_VERTS, MeshHandle, MeshPool, MeshPoolBuilder, PoolCapacity, PoolError,
};

use crate::config::GrassConfig;

/// One square patch of blades and the pool it lives in.
#[derive(Debug, Clone)]
pub struct GrassTile {
    pub mesh: MeshHandle,
    pub pool: usize,
    /// World XZ of the tile's minimum corner.
    pub origin: Vec2,
}

/// A square grid of grass tiles that wraps around the player.
///
/// Tiles never move in the vertex buffer. When one falls more than half the
/// grid behind the player it jumps to the far side by rewriting its uniform.
pub struct GrassField<B: GpuBackend> {
    config: GrassConfig,
    pools: Vec<MeshPool<B>>,
    tiles: Vec<GrassTile>,
}

impl<B: GpuBackend> GrassField<B> {
    pub fn build(config: &GrassConfig, rng: &mut StdRng, backend: &B) -> Result<Self, PoolError> {
        if !config.has_valid_tile_size() {
            return Err(PoolError::InvalidCapacity(format!(
                "grass tile_size must be positive and finite, got {}",
                config.tile_size
            )));
        }
        let tile_count = config.tiles_per_side * config.tiles_per_side;
        if tile_count == 0 || config.blades_per_tile == 0 {
            return Ok(Self {
                config: *config,
                pools: Vec::new(),
                tiles: Vec::new(),
            });
        }

        let tris_per_tile = config.blades_per_tile * 2;
        let verts_per_tile = tris_per_tile * 3;
        let tiles_per_pool = MAX_POOL_VERTS / verts_per_tile;
        if tiles_per_pool == 0 {
            return Err(PoolError::InvalidCapacity(format!(
                "a grass tile of {verts_per_tile} vertices does not fit in one pool"
            )));
        }

        let extent = config.tiles_per_side as f32 * config.tile_size;
        let mut pools = Vec::new();
        let mut tiles = Vec::with_capacity(tile_count as usize);

        for first in (0..tile_count).step_by(tiles_per_pool as usize) {
            let last = (first + tiles_per_pool).min(tile_count);
            let n = last - first;
            let cap = PoolCapacity::new(n, tris_per_tile * n, verts_per_tile * n);
            let mut builder =
                MeshPoolBuilder::for_backend(format!("grass{}", pools.len()), cap, backend)?;

            for i in first..last {
                let mesh = builder.add_raw(&tile_mesh(config, rng))?;
                let (col, row) = (i % config.tiles_per_side, i / config.tiles_per_side);
                let origin =
                    Vec2::new(col as f32, row as f32) * config.tile_size - Vec2::splat(extent * 0.5);
                tiles.push(GrassTile {
                    mesh,
                    pool: pools.len(),
                    origin,
                });
            }
            pools.push(builder.finish(backend));
        }

        let mut field = Self {
            config: *config,
            pools,
            tiles,
        };
        for idx in 0..field.tiles.len() {
            field.place(idx);
            field.write(backend, idx);
        }
        tracing::info!(
            tiles = field.tiles.len(),
            pools = field.pools.len(),
            blades = tile_count * config.blades_per_tile,
            "grass field built"
        );
        Ok(field)
    }

    /// Wrap tiles that fell behind `player`. Returns how many moved.
    pub fn update(&mut self, backend: &B, player: Vec3) -> usize {
        let extent = self.extent();
        let half = self.config.tile_size * 0.5;
        let player = Vec2::new(player.x, player.z);
        let mut moved = 0;
        for idx in 0..self.tiles.len() {
            let center = self.tiles[idx].origin + Vec2::splat(half);
            let shift = ((center - player + Vec2::splat(extent * 0.5)) / extent).floor();
            if shift != Vec2::ZERO {
                self.tiles[idx].origin -= shift * extent;
                self.place(idx);
                self.write(backend, idx);
                moved += 1;
            }
        }
        if moved > 0 {
            tracing::trace!(moved, "grass tiles wrapped");
        }
        moved
    }

    fn place(&mut self, idx: usize) {
        let tile = &mut self.tiles[idx];
        tile.mesh.transform =
            Mat4::from_translation(Vec3::new(tile.origin.x, self.config.height, tile.origin.y));
    }

    fn write(&self, backend: &B, idx: usize) {
        let tile = &self.tiles[idx];
        self.pools[tile.pool].update_uniform(backend, &tile.mesh);
    }

    /// Side length of the whole grid.
    pub fn extent(&self) -> f32 {
        self.config.tiles_per_side as f32 * self.config.tile_size
    }

    pub fn pools(&self) -> &[MeshPool<B>] {
        &self.pools
    }

    pub fn tiles(&self) -> &[GrassTile] {
        &self.tiles
    }
}

/// Blades scattered over `[0, tile_size)` on XZ in tile-local space.
fn tile_mesh(config: &GrassConfig, rng: &mut StdRng) -> RawMesh {
    let mut mesh = RawMesh::default();
    for _ in 0..config.blades_per_tile {
        let base = Vec3::new(
            rng.random_range(0.0..config.tile_size),
            0.0,
            rng.random_range(0.0..config.tile_size),
        );
        let lean = Vec3::new(rng.random_range(-0.3..0.3), 0.0, rng.random_range(-0.3..0.3));
        let height = config.blade_height * rng.random_range(0.6..1.4);
        let color = Vec3::new(
            rng.random_range(0.02..0.1),
            rng.random_range(0.25..0.5),
            rng.random_range(0.01..0.06),
        );
        mesh.append(&shapes::grass_blade(base, config.blade_width, height, lean, color));
    }
    mesh
}
