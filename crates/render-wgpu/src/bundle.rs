use std::num::NonZeroU64;

use sprig_render::{DrawCommand, DrawPlan, MeshPool, MeshUniform};

use crate::backend::WgpuBackend;

/// Attachment formats a bundle is recorded against. Must match the pass it replays in.
#[derive(Debug, Clone, Copy)]
pub struct BundleTarget {
    pub label: &'static str,
    pub color_format: Option<wgpu::TextureFormat>,
    pub depth_format: Option<wgpu::TextureFormat>,
    pub sample_count: u32,
}

/// Group 1 for one pool: its uniform buffer, one slot wide, offset per draw.
pub fn model_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    pool: &MeshPool<WgpuBackend>,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(&format!("{}_model_bind_group", pool.label())),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer: pool.uniform_buffer(),
                offset: 0,
                size: NonZeroU64::new(MeshUniform::SIZE),
            }),
        }],
    })
}

/// Encode `plan` into a render bundle. `plan` must have been compiled from `pools`.
pub fn encode_plan(
    device: &wgpu::Device,
    target: &BundleTarget,
    pipeline: &wgpu::RenderPipeline,
    scene_group: &wgpu::BindGroup,
    model_layout: &wgpu::BindGroupLayout,
    pools: &[&MeshPool<WgpuBackend>],
    plan: &DrawPlan,
) -> wgpu::RenderBundle {
    let _span = tracing::info_span!("compile_bundle", bundle = target.label).entered();

    let model_groups: Vec<wgpu::BindGroup> = pools
        .iter()
        .map(|pool| model_bind_group(device, model_layout, pool))
        .collect();
    let color_formats: Vec<Option<wgpu::TextureFormat>> =
        target.color_format.into_iter().map(Some).collect();

    let mut encoder = device.create_render_bundle_encoder(&wgpu::RenderBundleEncoderDescriptor {
        label: Some(target.label),
        color_formats: &color_formats,
        depth_stencil: target.depth_format.map(|format| wgpu::RenderBundleDepthStencil {
            format,
            depth_read_only: false,
            stencil_read_only: false,
        }),
        sample_count: target.sample_count,
        multiview: None,
    });
    encoder.set_pipeline(pipeline);
    encoder.set_bind_group(0, scene_group, &[]);

    for command in plan.commands() {
        match command {
            DrawCommand::BindPool { pool } => {
                let pool = pools[*pool];
                encoder.set_vertex_buffer(0, pool.vertex_buffer().slice(..));
                encoder.set_index_buffer(pool.index_buffer().slice(..), wgpu::IndexFormat::Uint16);
            }
            DrawCommand::DrawMesh {
                pool,
                uniform_offset,
                indices,
                base_vertex,
                ..
            } => {
                encoder.set_bind_group(1, &model_groups[*pool], &[*uniform_offset]);
                encoder.draw_indexed(indices.clone(), *base_vertex, 0..1);
            }
        }
    }

    tracing::info!(
        bundle = target.label,
        pools = plan.bind_count(),
        draws = plan.draw_count(),
        tris = plan.triangle_count(),
        "bundle compiled"
    );
    encoder.finish(&wgpu::RenderBundleDescriptor {
        label: Some(target.label),
    })
}
