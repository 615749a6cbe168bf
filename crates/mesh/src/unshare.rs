use glam::Vec3;
use sprig_common::{Aabb, SurfaceKind};

use crate::raw::{MeshError, RawMesh};

/// One vertex of an unshared mesh. Owned by exactly one triangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatVertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub color: Vec3,
}

/// A mesh where no vertex is referenced by more than one triangle.
///
/// `vertices.len() == 3 * triangle_count()` and triangle `t` is always
/// `[3t, 3t + 1, 3t + 2]`.
#[derive(Debug, Clone, PartialEq)]
pub struct UnsharedMesh {
    vertices: Vec<FlatVertex>,
    pub kind: SurfaceKind,
}

impl UnsharedMesh {
    /// Wrap already-flattened corners, three per triangle.
    pub fn from_vertices(vertices: Vec<FlatVertex>, kind: SurfaceKind) -> Result<Self, MeshError> {
        if vertices.len() % 3 != 0 {
            return Err(MeshError::PartialTriangle {
                vertices: vertices.len(),
            });
        }
        Ok(Self { vertices, kind })
    }

    pub fn vertices(&self) -> &[FlatVertex] {
        &self.vertices
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.vertices.len() / 3
    }

    /// Local index list, `0..3N` in triangle order.
    pub fn indices(&self) -> impl Iterator<Item = u32> + '_ {
        0..self.vertices.len() as u32
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_points(self.vertices.iter().map(|v| &v.position))
    }
}

/// Normal of the counter-clockwise triangle `(p0, p1, p2)`: `(p1 - p0) x (p2 - p0)`.
///
/// Degenerate triangles get a zero normal.
pub fn face_normal(p0: Vec3, p1: Vec3, p2: Vec3) -> Vec3 {
    (p1 - p0).cross(p2 - p0).normalize_or_zero()
}

/// Duplicate vertices so each triangle owns its three corners, carrying the
/// triangle's face normal and flat color on every corner.
pub fn unshare(mesh: &RawMesh) -> Result<UnsharedMesh, MeshError> {
    mesh.validate()?;

    let mut vertices = Vec::with_capacity(mesh.triangles.len() * 3);
    for (tri, &color) in mesh.triangles.iter().zip(&mesh.colors) {
        let [p0, p1, p2] = tri.map(|i| mesh.positions[i as usize]);
        let normal = face_normal(p0, p1, p2);
        for position in [p0, p1, p2] {
            vertices.push(FlatVertex {
                position,
                normal,
                color,
            });
        }
    }

    tracing::trace!(
        triangles = mesh.triangles.len(),
        vertices = vertices.len(),
        "unshared mesh"
    );

    Ok(UnsharedMesh {
        vertices,
        kind: mesh.kind,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes;

    #[test]
    fn vertex_count_is_three_per_triangle() {
        for raw in [shapes::cube(), shapes::plane(), shapes::water_grid(4, 1.0)] {
            let flat = unshare(&raw).unwrap();
            assert_eq!(flat.vertex_count(), raw.triangle_count() * 3);
            assert_eq!(flat.triangle_count(), raw.triangle_count());
        }
    }

    #[test]
    fn corners_carry_triangle_color() {
        let mut raw = shapes::cube();
        for (i, c) in raw.colors.iter_mut().enumerate() {
            *c = Vec3::new(i as f32, 0.5, 0.25);
        }
        let flat = unshare(&raw).unwrap();
        for (t, tri) in flat.vertices().chunks_exact(3).enumerate() {
            for v in tri {
                assert_eq!(v.color, raw.colors[t]);
            }
        }
    }

    #[test]
    fn corners_keep_original_order() {
        let raw = shapes::cube();
        let flat = unshare(&raw).unwrap();
        for (tri, out) in raw.triangles.iter().zip(flat.vertices().chunks_exact(3)) {
            for corner in 0..3 {
                assert_eq!(out[corner].position, raw.positions[tri[corner] as usize]);
            }
        }
    }

    #[test]
    fn indices_are_sequential() {
        let flat = unshare(&shapes::plane()).unwrap();
        let idx: Vec<u32> = flat.indices().collect();
        assert_eq!(idx, (0..12).collect::<Vec<u32>>());
    }

    #[test]
    fn ccw_triangle_faces_toward_viewer() {
        // Counter-clockwise when seen from +Z.
        let n = face_normal(Vec3::ZERO, Vec3::X, Vec3::Y);
        assert_eq!(n, Vec3::Z);
    }

    #[test]
    fn cube_normals_point_outward() {
        let flat = unshare(&shapes::cube()).unwrap();
        for tri in flat.vertices().chunks_exact(3) {
            let centroid = (tri[0].position + tri[1].position + tri[2].position) / 3.0;
            assert!(tri[0].normal.dot(centroid) > 0.0, "inward normal at {centroid}");
            assert!((tri[0].normal.length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn malformed_mesh_is_rejected() {
        let raw = RawMesh::new(vec![Vec3::ZERO], vec![[0, 0, 1]], vec![Vec3::ONE]);
        assert!(matches!(
            unshare(&raw),
            Err(MeshError::TriangleIndexOutOfRange { index: 1, .. })
        ));
    }

    #[test]
    fn partial_triangle_is_rejected() {
        let corner = FlatVertex {
            position: Vec3::ZERO,
            normal: Vec3::Y,
            color: Vec3::ONE,
        };
        assert_eq!(
            UnsharedMesh::from_vertices(vec![corner; 5], SurfaceKind::Solid),
            Err(MeshError::PartialTriangle { vertices: 5 })
        );
        let whole = UnsharedMesh::from_vertices(vec![corner; 6], SurfaceKind::Solid).unwrap();
        assert_eq!(whole.triangle_count(), 2);
        assert_eq!(whole.indices().count(), 6);
    }

    #[test]
    fn kind_survives_unsharing() {
        let flat = unshare(&shapes::water_grid(2, 1.0)).unwrap();
        assert_eq!(flat.kind, SurfaceKind::Water);
    }

    #[test]
    fn bounds_cover_cube() {
        let flat = unshare(&shapes::cube()).unwrap();
        let b = flat.bounds();
        assert_eq!(b.min, Vec3::splat(-1.0));
        assert_eq!(b.max, Vec3::splat(1.0));
    }
}
