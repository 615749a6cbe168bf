use glam::{Mat4, Vec3};

/// Camera that trails the player. Its world placement is
/// `player * offset * translate(0, 0, distance)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChaseCamera {
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    pub distance: f32,
}

impl Default for ChaseCamera {
    fn default() -> Self {
        Self {
            fov: 2.0 * std::f32::consts::PI / 5.0,
            near: 1.0,
            far: 10000.0,
            distance: 10.0,
        }
    }
}

impl ChaseCamera {
    /// World transform of the camera.
    pub fn placement(&self, player: Mat4, offset: Mat4) -> Mat4 {
        player * offset * Mat4::from_translation(Vec3::new(0.0, 0.0, self.distance))
    }

    pub fn position(&self, player: Mat4, offset: Mat4) -> Vec3 {
        self.placement(player, offset).w_axis.truncate()
    }

    pub fn view_matrix(&self, player: Mat4, offset: Mat4) -> Mat4 {
        self.placement(player, offset).inverse()
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov, aspect, self.near, self.far)
    }

    pub fn view_projection(&self, player: Mat4, offset: Mat4, aspect: f32) -> Mat4 {
        self.projection_matrix(aspect) * self.view_matrix(player, offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_camera() {
        let cam = ChaseCamera::default();
        let vp = cam.view_projection(Mat4::IDENTITY, Mat4::IDENTITY, 16.0 / 9.0);
        assert!(!vp.col(0).x.is_nan());
    }

    #[test]
    fn sits_behind_player() {
        let cam = ChaseCamera::default();
        let player = Mat4::from_translation(Vec3::new(5.0, 0.0, 0.0));
        let pos = cam.position(player, Mat4::IDENTITY);
        assert!((pos - Vec3::new(5.0, 0.0, 10.0)).length() < 1e-5);
    }

    #[test]
    fn player_is_in_front_of_camera() {
        let cam = ChaseCamera::default();
        let vp = cam.view_projection(Mat4::IDENTITY, Mat4::IDENTITY, 1.0);
        let clip = vp * glam::Vec4::new(0.0, 0.0, 0.0, 1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(clip.w > 0.0);
        assert!(ndc.x.abs() < 1e-5 && ndc.y.abs() < 1e-5);
        assert!((0.0..=1.0).contains(&ndc.z));
    }
}
