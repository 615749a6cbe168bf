use crate::pipelines::{MAIN_DEPTH_FORMAT, PROCEDURAL_FORMAT, SHADOW_FORMAT};

/// Viewport-sized targets of the main pass. Recreated on resize.
pub struct MainTargets {
    /// Multisampled color, resolved into the surface. `None` without MSAA.
    pub color: Option<wgpu::TextureView>,
    pub depth: wgpu::TextureView,
    pub size: (u32, u32),
}

impl MainTargets {
    pub fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        samples: u32,
        width: u32,
        height: u32,
    ) -> Self {
        let size = wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        };
        let color = (samples > 1).then(|| {
            device
                .create_texture(&wgpu::TextureDescriptor {
                    label: Some("main_msaa_color"),
                    size,
                    mip_level_count: 1,
                    sample_count: samples,
                    dimension: wgpu::TextureDimension::D2,
                    format,
                    usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                    view_formats: &[],
                })
                .create_view(&Default::default())
        });
        let depth = device
            .create_texture(&wgpu::TextureDescriptor {
                label: Some("main_depth"),
                size,
                mip_level_count: 1,
                sample_count: samples,
                dimension: wgpu::TextureDimension::D2,
                format: MAIN_DEPTH_FORMAT,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                view_formats: &[],
            })
            .create_view(&Default::default());
        tracing::debug!(width = size.width, height = size.height, samples, "main targets created");
        Self {
            color,
            depth,
            size: (size.width, size.height),
        }
    }
}

/// Square render target sampled by the main pass.
fn sampled_target(
    device: &wgpu::Device,
    label: &str,
    format: wgpu::TextureFormat,
    side: u32,
) -> wgpu::TextureView {
    device
        .create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: side.max(1),
                height: side.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        })
        .create_view(&Default::default())
}

pub fn shadow_map(device: &wgpu::Device, side: u32) -> wgpu::TextureView {
    sampled_target(device, "shadow_map", SHADOW_FORMAT, side)
}

pub fn procedural_texture(device: &wgpu::Device, side: u32) -> wgpu::TextureView {
    sampled_target(device, "procedural_texture", PROCEDURAL_FORMAT, side)
}
