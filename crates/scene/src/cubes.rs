use glam::{Mat4, Vec3};
use rand::RngExt;
use rand::rngs::StdRng;
use sprig_render::MeshHandle;

use crate::lifetime::Lifetime;

/// Rotation applied to every live cube each frame.
pub const SPIN_PER_FRAME: f32 = std::f32::consts::PI * 0.01;

/// A cube that spins about a fixed local axis until its lifetime runs out.
#[derive(Debug, Clone)]
pub struct SpinningCube {
    pub mesh: MeshHandle,
    pub axis: Vec3,
    pub lifetime: Option<Lifetime>,
}

impl SpinningCube {
    pub fn is_alive(&self) -> bool {
        self.lifetime.is_none_or(|l| l.is_alive())
    }

    pub fn spin(&mut self) {
        self.mesh.transform = self.mesh.transform * Mat4::from_axis_angle(self.axis, SPIN_PER_FRAME);
    }
}

/// Random placement, spin axis and color for one cube.
#[derive(Debug, Clone, Copy)]
pub struct CubeSeed {
    pub translation: Vec3,
    pub axis: Vec3,
    pub color: Vec3,
}

impl CubeSeed {
    pub fn random(rng: &mut StdRng) -> Self {
        let color = Vec3::new(
            rng.random_range(0.0..1.0),
            rng.random_range(0.0..1.0),
            rng.random_range(0.0..1.0),
        );
        let translation = Vec3::new(
            rng.random_range(-10.0..10.0),
            rng.random_range(0.0..5.0),
            rng.random_range(-15.0..-5.0),
        );
        let axis = Vec3::new(
            rng.random_range(-0.5..0.5),
            rng.random_range(-0.5..0.5),
            rng.random_range(-0.5..0.5),
        )
        .try_normalize()
        .unwrap_or(Vec3::Y);
        Self {
            translation,
            axis,
            color,
        }
    }
}
