use glam::{Mat4, Vec2, Vec3};
use sprig_render::MeshHandle;

/// Radians of yaw or pitch per pointer pixel.
pub const LOOK_SENSITIVITY: f32 = 0.01;

/// The player mesh plus the camera offset that hangs off it.
///
/// Yaw turns the player itself; pitch only tilts the camera offset, so the
/// player cube stays level.
#[derive(Debug, Clone)]
pub struct PlayerRig {
    pub mesh: MeshHandle,
    pub camera_offset: Mat4,
}

impl PlayerRig {
    pub fn new(mesh: MeshHandle) -> Self {
        Self {
            mesh,
            camera_offset: Mat4::from_rotation_x(-std::f32::consts::PI / 8.0),
        }
    }

    /// Move in the player's local frame, then turn by the pointer delta.
    /// Returns whether the player transform changed.
    pub fn steer(&mut self, movement: Vec3, pointer: Vec2) -> bool {
        if movement == Vec3::ZERO && pointer == Vec2::ZERO {
            return false;
        }
        let t = &mut self.mesh.transform;
        *t = *t * Mat4::from_translation(movement);
        *t = *t * Mat4::from_rotation_y(-pointer.x * LOOK_SENSITIVITY);
        self.camera_offset = self.camera_offset * Mat4::from_rotation_x(-pointer.y * LOOK_SENSITIVITY);
        true
    }

    pub fn transform(&self) -> Mat4 {
        self.mesh.transform
    }

    pub fn position(&self) -> Vec3 {
        self.mesh.transform.w_axis.truncate()
    }
}
