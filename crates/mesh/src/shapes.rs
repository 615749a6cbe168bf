//! Authored meshes. All triangles are counter-clockwise seen from outside.

use glam::Vec3;
use sprig_common::SurfaceKind;

use crate::raw::RawMesh;

const CUBE_RED: Vec3 = Vec3::new(0.2, 0.0, 0.0);
const GROUND_GRAY: Vec3 = Vec3::new(0.02, 0.02, 0.02);
const WATER_BLUE: Vec3 = Vec3::new(0.05, 0.15, 0.35);

/// Cube spanning `[-1, 1]` on every axis.
pub fn cube() -> RawMesh {
    let positions = vec![
        Vec3::new(1.0, 1.0, 1.0),
        Vec3::new(-1.0, 1.0, 1.0),
        Vec3::new(-1.0, -1.0, 1.0),
        Vec3::new(1.0, -1.0, 1.0),
        Vec3::new(1.0, 1.0, -1.0),
        Vec3::new(-1.0, 1.0, -1.0),
        Vec3::new(-1.0, -1.0, -1.0),
        Vec3::new(1.0, -1.0, -1.0),
    ];
    #[rustfmt::skip]
    let triangles = vec![
        [0, 1, 2], [0, 2, 3], // +Z
        [4, 5, 1], [4, 1, 0], // +Y
        [3, 4, 0], [3, 7, 4], // +X
        [2, 1, 5], [2, 5, 6], // -X
        [6, 3, 2], [6, 7, 3], // -Y
        [5, 4, 7], [5, 7, 6], // -Z
    ];
    let colors = vec![CUBE_RED; triangles.len()];
    RawMesh::new(positions, triangles, colors)
}

/// Unit plane on XZ at `y = 0`, visible from both sides.
pub fn plane() -> RawMesh {
    let positions = vec![
        Vec3::new(1.0, 0.0, 1.0),
        Vec3::new(-1.0, 0.0, 1.0),
        Vec3::new(1.0, 0.0, -1.0),
        Vec3::new(-1.0, 0.0, -1.0),
    ];
    #[rustfmt::skip]
    let triangles = vec![
        [0, 2, 3], [0, 3, 1], // top
        [3, 2, 0], [1, 3, 0], // bottom
    ];
    let colors = vec![GROUND_GRAY; triangles.len()];
    RawMesh::new(positions, triangles, colors)
}

/// Square grid of `cells x cells` quads on XZ, centered on the origin, tagged as water.
pub fn water_grid(cells: u32, spacing: f32) -> RawMesh {
    let side = cells + 1;
    let half = cells as f32 * spacing * 0.5;

    let mut positions = Vec::with_capacity((side * side) as usize);
    for z in 0..side {
        for x in 0..side {
            positions.push(Vec3::new(
                x as f32 * spacing - half,
                0.0,
                z as f32 * spacing - half,
            ));
        }
    }

    let mut triangles = Vec::with_capacity((cells * cells * 2) as usize);
    for z in 0..cells {
        for x in 0..cells {
            let a = z * side + x;
            let b = a + 1;
            let c = a + side;
            let d = c + 1;
            triangles.push([a, c, b]);
            triangles.push([b, c, d]);
        }
    }

    let colors = vec![WATER_BLUE; triangles.len()];
    RawMesh::new(positions, triangles, colors).with_kind(SurfaceKind::Water)
}

/// A two-sided grass blade rooted at `base`, with its tip displaced by `lean`.
pub fn grass_blade(base: Vec3, width: f32, height: f32, lean: Vec3, color: Vec3) -> RawMesh {
    let half = width * 0.5;
    let positions = vec![
        base + Vec3::new(-half, 0.0, 0.0),
        base + Vec3::new(half, 0.0, 0.0),
        base + Vec3::new(lean.x, height, lean.z),
    ];
    let triangles = vec![[0, 1, 2], [1, 0, 2]];
    RawMesh::new(positions, triangles, vec![color; 2])
}
