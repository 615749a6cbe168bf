//! Mesh authoring model and the flat-shading vertex preprocessor.
//!
//! # Invariants
//! - Triangles are counter-clockwise when seen from their front side.
//! - `unshare` output owns three vertices per triangle; nothing is shared.
//! - Malformed meshes are rejected before any pool storage is touched.

mod raw;
pub mod shapes;
mod unshare;

pub use raw::{MeshError, RawMesh};
pub use unshare::{FlatVertex, UnsharedMesh, face_normal, unshare};
