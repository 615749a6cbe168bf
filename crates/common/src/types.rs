use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in mesh-local space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// An inverted box that any point will grow.
    pub const EMPTY: Self = Self {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    /// Smallest box containing every point. Empty input yields a zero box at the origin.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Vec3>) -> Self {
        let mut aabb = Self::EMPTY;
        for p in points {
            aabb.min = aabb.min.min(*p);
            aabb.max = aabb.max.max(*p);
        }
        if aabb.is_empty() {
            return Self {
                min: Vec3::ZERO,
                max: Vec3::ZERO,
            };
        }
        aabb
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self {
            min: Vec3::ZERO,
            max: Vec3::ZERO,
        }
    }
}

/// Per-vertex surface tag read by the vertex program.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SurfaceKind {
    /// Static geometry drawn as authored.
    #[default]
    Solid = 0,
    /// Displaced every frame by the time-driven wave function.
    Water = 1,
}

impl SurfaceKind {
    pub fn as_u32(self) -> u32 {
        self as u32
    }
}

/// Round `value` up to the next multiple of `alignment`.
///
/// # Panics
/// Panics if `alignment` is zero or not a power of two.
pub fn align_up(value: u64, alignment: u64) -> u64 {
    assert!(
        alignment.is_power_of_two(),
        "alignment must be a non-zero power of two, got {alignment}"
    );
    (value + alignment - 1) & !(alignment - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aabb_from_points() {
        let pts = [
            Vec3::new(-1.0, 2.0, 0.5),
            Vec3::new(3.0, -4.0, 0.0),
            Vec3::new(0.0, 0.0, 7.0),
        ];
        let aabb = Aabb::from_points(&pts);
        assert_eq!(aabb.min, Vec3::new(-1.0, -4.0, 0.0));
        assert_eq!(aabb.max, Vec3::new(3.0, 2.0, 7.0));
        assert_eq!(aabb.size(), Vec3::new(4.0, 6.0, 7.0));
    }

    #[test]
    fn aabb_from_no_points_is_zero() {
        let aabb = Aabb::from_points(&Vec::<Vec3>::new());
        assert_eq!(aabb, Aabb::default());
        assert!(!aabb.is_empty());
    }

    #[test]
    fn surface_kind_discriminants() {
        assert_eq!(SurfaceKind::Solid.as_u32(), 0);
        assert_eq!(SurfaceKind::Water.as_u32(), 1);
    }

    #[test]
    fn align_up_rounds_to_multiple() {
        assert_eq!(align_up(0, 256), 0);
        assert_eq!(align_up(1, 256), 256);
        assert_eq!(align_up(96, 256), 256);
        assert_eq!(align_up(256, 256), 256);
        assert_eq!(align_up(257, 256), 512);
        assert_eq!(align_up(4, 4), 4);
    }

    #[test]
    #[should_panic]
    fn align_up_rejects_non_power_of_two() {
        align_up(10, 3);
    }
}
