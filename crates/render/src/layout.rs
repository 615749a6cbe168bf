//! Byte layouts shared with the GPU programs.
//!
//! Every record here is `#[repr(C)]` + `Pod`, so serialization is a plain
//! `bytemuck::bytes_of`. Field order and padding mirror the WGSL structs.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2, Vec3};
use sprig_common::{Aabb, SurfaceKind, align_up};
use sprig_mesh::FlatVertex;

/// Minimum uniform binding alignment guaranteed by WebGPU-class devices.
pub const DEFAULT_UNIFORM_ALIGNMENT: u64 = 256;

/// One vertex as laid out in a pool's vertex buffer: position, normal, color, kind.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 3],
    pub kind: u32,
}

impl Vertex {
    pub const SIZE: u64 = std::mem::size_of::<Self>() as u64;

    pub fn from_flat(v: &FlatVertex, kind: SurfaceKind) -> Self {
        Self {
            position: v.position.to_array(),
            normal: v.normal.to_array(),
            color: v.color.to_array(),
            kind: kind.as_u32(),
        }
    }
}

/// Per-instance record stored in a mesh's uniform slot.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct MeshUniform {
    pub transform: [[f32; 4]; 4],
    pub aabb_min: [f32; 3],
    pub _pad0: f32,
    pub aabb_max: [f32; 3],
    pub _pad1: f32,
}

impl MeshUniform {
    pub const SIZE: u64 = std::mem::size_of::<Self>() as u64;

    pub fn new(transform: Mat4, bounds: Aabb) -> Self {
        Self {
            transform: transform.to_cols_array_2d(),
            aabb_min: bounds.min.to_array(),
            _pad0: 0.0,
            aabb_max: bounds.max.to_array(),
            _pad1: 0.0,
        }
    }
}

/// Process-wide per-frame record read by every pass.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct SceneUniform {
    pub camera_view_proj: [[f32; 4]; 4],
    pub light_view_proj: [[f32; 4]; 4],
    pub light_dir: [f32; 3],
    pub time: f32,
    pub target_size: [f32; 2],
    pub _pad0: [f32; 2],
    pub camera_pos: [f32; 3],
    pub _pad1: f32,
}

impl SceneUniform {
    pub const SIZE: u64 = std::mem::size_of::<Self>() as u64;
}

/// Input of the procedural texture pass. It depends on time only.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct ProceduralUniform {
    pub time: f32,
    pub _pad: [f32; 3],
}

impl ProceduralUniform {
    pub fn new(time: f32) -> Self {
        Self {
            time,
            _pad: [0.0; 3],
        }
    }
}

/// CPU-side scene state, serialized into [`SceneUniform`] once per frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneData {
    pub camera_view_proj: Mat4,
    pub light_view_proj: Mat4,
    pub light_dir: Vec3,
    /// Elapsed time in milliseconds.
    pub time: f32,
    pub target_size: Vec2,
    pub camera_pos: Vec3,
}

impl Default for SceneData {
    fn default() -> Self {
        Self {
            camera_view_proj: Mat4::IDENTITY,
            light_view_proj: Mat4::IDENTITY,
            light_dir: -Vec3::Y,
            time: 0.0,
            target_size: Vec2::ONE,
            camera_pos: Vec3::ZERO,
        }
    }
}

impl SceneData {
    pub fn to_uniform(&self) -> SceneUniform {
        SceneUniform {
            camera_view_proj: self.camera_view_proj.to_cols_array_2d(),
            light_view_proj: self.light_view_proj.to_cols_array_2d(),
            light_dir: self.light_dir.to_array(),
            time: self.time,
            target_size: self.target_size.to_array(),
            _pad0: [0.0; 2],
            camera_pos: self.camera_pos.to_array(),
            _pad1: 0.0,
        }
    }
}

/// Distance in bytes between consecutive uniform slots holding `T`.
///
/// # Panics
/// Panics if `alignment` is not a power of two.
pub fn aligned_stride<T: Pod>(alignment: u64) -> u64 {
    align_up(std::mem::size_of::<T>() as u64, alignment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::{offset_of, size_of};

    #[test]
    fn vertex_layout_matches_pipeline() {
        assert_eq!(size_of::<Vertex>(), 40);
        assert_eq!(offset_of!(Vertex, position), 0);
        assert_eq!(offset_of!(Vertex, normal), 12);
        assert_eq!(offset_of!(Vertex, color), 24);
        assert_eq!(offset_of!(Vertex, kind), 36);
    }

    #[test]
    fn mesh_uniform_layout_matches_wgsl() {
        assert_eq!(size_of::<MeshUniform>(), 96);
        assert_eq!(offset_of!(MeshUniform, aabb_min), 64);
        assert_eq!(offset_of!(MeshUniform, aabb_max), 80);
    }

    #[test]
    fn scene_uniform_layout_matches_wgsl() {
        assert_eq!(size_of::<SceneUniform>(), 176);
        assert_eq!(offset_of!(SceneUniform, light_view_proj), 64);
        assert_eq!(offset_of!(SceneUniform, light_dir), 128);
        assert_eq!(offset_of!(SceneUniform, time), 140);
        assert_eq!(offset_of!(SceneUniform, target_size), 144);
        assert_eq!(offset_of!(SceneUniform, camera_pos), 160);
    }

    #[test]
    fn strides_round_up_to_alignment() {
        assert_eq!(aligned_stride::<MeshUniform>(256), 256);
        assert_eq!(aligned_stride::<SceneUniform>(256), 256);
        assert_eq!(aligned_stride::<MeshUniform>(64), 128);
        assert_eq!(aligned_stride::<ProceduralUniform>(256), 256);
    }

    #[test]
    fn scene_data_serializes_fields() {
        let data = SceneData {
            time: 12.5,
            target_size: Vec2::new(800.0, 600.0),
            camera_pos: Vec3::new(1.0, 2.0, 3.0),
            ..SceneData::default()
        };
        let u = data.to_uniform();
        assert_eq!(u.time, 12.5);
        assert_eq!(u.target_size, [800.0, 600.0]);
        assert_eq!(u.camera_pos, [1.0, 2.0, 3.0]);
        assert_eq!(u.light_dir, [0.0, -1.0, 0.0]);
    }

    #[test]
    fn vertex_from_flat_keeps_kind() {
        let flat = FlatVertex {
            position: Vec3::X,
            normal: Vec3::Y,
            color: Vec3::Z,
        };
        let v = Vertex::from_flat(&flat, SurfaceKind::Water);
        assert_eq!(v.position, [1.0, 0.0, 0.0]);
        assert_eq!(v.normal, [0.0, 1.0, 0.0]);
        assert_eq!(v.kind, 1);
    }
}
