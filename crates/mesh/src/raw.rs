use glam::Vec3;
use sprig_common::SurfaceKind;

/// Errors from mesh validation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MeshError {
    #[error("triangle {triangle} references vertex {index}, but the mesh has {len} positions")]
    TriangleIndexOutOfRange {
        triangle: usize,
        index: u32,
        len: usize,
    },
    #[error("mesh has {triangles} triangles but {colors} colors")]
    ColorCountMismatch { triangles: usize, colors: usize },
    #[error("{vertices} unshared vertices do not form whole triangles")]
    PartialTriangle { vertices: usize },
}

/// An authored, shared-vertex mesh: positions, triangles, and one flat color per triangle.
///
/// Immutable once handed to [`crate::unshare`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawMesh {
    pub positions: Vec<Vec3>,
    /// Counter-clockwise corner indices into `positions`.
    pub triangles: Vec<[u32; 3]>,
    /// One color per triangle.
    pub colors: Vec<Vec3>,
    pub kind: SurfaceKind,
}

impl RawMesh {
    pub fn new(positions: Vec<Vec3>, triangles: Vec<[u32; 3]>, colors: Vec<Vec3>) -> Self {
        Self {
            positions,
            triangles,
            colors,
            kind: SurfaceKind::Solid,
        }
    }

    pub fn with_kind(mut self, kind: SurfaceKind) -> Self {
        self.kind = kind;
        self
    }

    /// Copy of this mesh with every triangle painted `color`.
    pub fn with_uniform_color(&self, color: Vec3) -> Self {
        Self {
            colors: vec![color; self.triangles.len()],
            ..self.clone()
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Append another mesh's geometry, re-basing its triangle indices.
    pub fn append(&mut self, other: &RawMesh) {
        let base = self.positions.len() as u32;
        self.positions.extend_from_slice(&other.positions);
        self.triangles
            .extend(other.triangles.iter().map(|t| [t[0] + base, t[1] + base, t[2] + base]));
        self.colors.extend_from_slice(&other.colors);
    }

    /// Check that every triangle index is in range and every triangle has a color.
    pub fn validate(&self) -> Result<(), MeshError> {
        if self.colors.len() != self.triangles.len() {
            return Err(MeshError::ColorCountMismatch {
                triangles: self.triangles.len(),
                colors: self.colors.len(),
            });
        }
        let len = self.positions.len();
        for (triangle, tri) in self.triangles.iter().enumerate() {
            if let Some(&index) = tri.iter().find(|&&i| i as usize >= len) {
                return Err(MeshError::TriangleIndexOutOfRange {
                    triangle,
                    index,
                    len,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_triangle() -> RawMesh {
        RawMesh::new(
            vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            vec![[0, 1, 2]],
            vec![Vec3::ONE],
        )
    }

    #[test]
    fn valid_mesh_passes() {
        assert!(one_triangle().validate().is_ok());
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let mut mesh = one_triangle();
        mesh.triangles.push([0, 2, 3]);
        mesh.colors.push(Vec3::ONE);
        assert_eq!(
            mesh.validate(),
            Err(MeshError::TriangleIndexOutOfRange {
                triangle: 1,
                index: 3,
                len: 3
            })
        );
    }

    #[test]
    fn missing_color_is_rejected() {
        let mut mesh = one_triangle();
        mesh.colors.clear();
        assert!(matches!(
            mesh.validate(),
            Err(MeshError::ColorCountMismatch { triangles: 1, colors: 0 })
        ));
    }

    #[test]
    fn append_rebases_indices() {
        let mut a = one_triangle();
        a.append(&one_triangle());
        assert_eq!(a.positions.len(), 6);
        assert_eq!(a.triangles[1], [3, 4, 5]);
        assert_eq!(a.colors.len(), 2);
        assert!(a.validate().is_ok());
    }

    #[test]
    fn uniform_color_repaints_every_triangle() {
        let mut mesh = one_triangle();
        mesh.append(&one_triangle());
        let red = Vec3::new(1.0, 0.0, 0.0);
        let painted = mesh.with_uniform_color(red);
        assert!(painted.colors.iter().all(|c| *c == red));
        assert_eq!(painted.positions, mesh.positions);
    }
}
