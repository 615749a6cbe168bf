use glam::{Mat4, Vec3};

/// Single directional light with an orthographic shadow frustum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub position: Vec3,
    pub target: Vec3,
    pub half_extent: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self {
            position: Vec3::new(50.0, 50.0, 0.0),
            target: Vec3::ZERO,
            half_extent: 80.0,
            near: -200.0,
            far: 300.0,
        }
    }
}

impl DirectionalLight {
    /// Unit vector the light travels along.
    pub fn direction(&self) -> Vec3 {
        (self.target - self.position).normalize()
    }

    pub fn view_projection(&self) -> Mat4 {
        let view = Mat4::look_at_rh(self.position, self.target, Vec3::Y);
        let e = self.half_extent;
        let proj = Mat4::orthographic_rh(-e, e, -e, e, self.near, self.far);
        proj * view
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_points_at_origin() {
        let light = DirectionalLight::default();
        let d = light.direction();
        assert!((d.length() - 1.0).abs() < 1e-6);
        assert!(d.x < 0.0 && d.y < 0.0);
    }

    #[test]
    fn origin_lands_in_shadow_frustum() {
        let vp = DirectionalLight::default().view_projection();
        let p = vp.project_point3(Vec3::ZERO);
        assert!(p.x.abs() < 1e-4 && p.y.abs() < 1e-4);
        assert!((0.0..=1.0).contains(&p.z));
    }
}
