use std::fmt;
use std::ops::Range;

use crate::backend::GpuBackend;
use crate::pool::MeshPool;

/// One recorded step of a draw bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawCommand {
    /// Bind pool `pool`'s vertex and index buffers.
    BindPool { pool: usize },
    /// Bind the mesh's uniform slot as a dynamic offset and draw its triangle range.
    DrawMesh {
        pool: usize,
        slot: u32,
        uniform_offset: u32,
        indices: Range<u32>,
        base_vertex: i32,
    },
}

/// The command sequence a draw bundle replays, independent of any device.
///
/// Compiled once per topology; uniform-only changes never invalidate it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrawPlan {
    commands: Vec<DrawCommand>,
}

impl DrawPlan {
    /// Record every mesh of every pool, binding each pool's buffers once.
    pub fn compile<B: GpuBackend>(pools: &[&MeshPool<B>]) -> Self {
        let mut commands = Vec::new();
        for (pool_index, pool) in pools.iter().enumerate() {
            if pool.mesh_count() == 0 {
                continue;
            }
            commands.push(DrawCommand::BindPool { pool: pool_index });
            for mesh in pool.meshes() {
                commands.push(DrawCommand::DrawMesh {
                    pool: pool_index,
                    slot: mesh.slot(),
                    // Capacity validation keeps every slot offset within u32.
                    uniform_offset: mesh.uniform_offset() as u32,
                    indices: mesh.index_range(),
                    // Indices are stored pool-global.
                    base_vertex: 0,
                });
            }
        }
        Self { commands }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn draw_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::DrawMesh { .. }))
            .count()
    }

    pub fn bind_count(&self) -> usize {
        self.commands.len() - self.draw_count()
    }

    pub fn triangle_count(&self) -> u64 {
        self.commands
            .iter()
            .map(|c| match c {
                DrawCommand::DrawMesh { indices, .. } => (indices.len() / 3) as u64,
                DrawCommand::BindPool { .. } => 0,
            })
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl fmt::Display for DrawPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "draw plan: {} binds, {} draws, {} triangles",
            self.bind_count(),
            self.draw_count(),
            self.triangle_count()
        )?;
        for cmd in &self.commands {
            match cmd {
                DrawCommand::BindPool { pool } => writeln!(f, "  bind pool {pool}")?,
                DrawCommand::DrawMesh {
                    slot,
                    uniform_offset,
                    indices,
                    ..
                } => writeln!(
                    f,
                    "    draw slot {slot} @ {uniform_offset} indices {}..{}",
                    indices.start, indices.end
                )?,
            }
        }
        Ok(())
    }
}
