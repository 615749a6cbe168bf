use sprig_render::{
    BufferUsage, DrawPlan, FrameContext, GpuBackend, PassDescriptor, PassKind, PassSchedule,
    ProceduralUniform, SceneData, SceneUniform, Topology, TopologyTracker, aligned_stride,
};
use sprig_scene::{RenderConfig, Scene};

use crate::backend::WgpuBackend;
use crate::bundle::{BundleTarget, encode_plan};
use crate::error::RenderError;
use crate::pipelines::{MAIN_DEPTH_FORMAT, PROCEDURAL_FORMAT, Pipelines, SHADOW_FORMAT};
use crate::targets::{self, MainTargets};

const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.5,
    g: 0.5,
    b: 0.5,
    a: 1.0,
};

struct PassBundles {
    shadow: wgpu::RenderBundle,
    main: wgpu::RenderBundle,
    main_draws: usize,
    shadow_draws: usize,
}

/// Owns every GPU object outside the mesh pools and records the passes.
///
/// Bundles are recompiled lazily: [`Renderer::prepare`] rebuilds them when the
/// scene's pool topology differs from the one they were compiled against, or
/// after [`Renderer::invalidate`].
pub struct Renderer {
    pipelines: Pipelines,
    schedule: PassSchedule,
    scene_buffer: wgpu::Buffer,
    procedural_buffer: wgpu::Buffer,
    shadow_map: wgpu::TextureView,
    procedural_view: wgpu::TextureView,
    shadow_scene_group: wgpu::BindGroup,
    main_scene_group: wgpu::BindGroup,
    procedural_bundle: wgpu::RenderBundle,
    bundles: Option<PassBundles>,
    topology: TopologyTracker,
    frame: FrameContext<MainTargets>,
}

impl Renderer {
    pub fn new(
        backend: &WgpuBackend,
        surface_format: wgpu::TextureFormat,
        config: &RenderConfig,
    ) -> Result<Self, RenderError> {
        Self::with_passes(
            backend,
            surface_format,
            config,
            PassSchedule::standard().passes().to_vec(),
        )
    }

    /// Build with a custom pass list. The list is validated before any GPU work.
    pub fn with_passes(
        backend: &WgpuBackend,
        surface_format: wgpu::TextureFormat,
        config: &RenderConfig,
        passes: Vec<PassDescriptor>,
    ) -> Result<Self, RenderError> {
        let schedule = PassSchedule::new(passes)?;
        let device = backend.device();

        let msaa_samples = if config.msaa_samples >= 4 { 4 } else { 1 };
        if msaa_samples != config.msaa_samples {
            tracing::warn!(
                requested = config.msaa_samples,
                using = msaa_samples,
                "unsupported MSAA sample count"
            );
        }
        let pipelines = Pipelines::new(device, surface_format, msaa_samples);

        let scene_buffer = backend.create_buffer(
            "scene_uniform",
            BufferUsage::Uniform,
            SceneUniform::SIZE,
            bytemuck::bytes_of(&SceneData::default().to_uniform()),
        );
        let procedural_buffer = backend.create_buffer(
            "procedural_uniform",
            BufferUsage::Uniform,
            aligned_stride::<ProceduralUniform>(backend.min_uniform_alignment()),
            bytemuck::bytes_of(&ProceduralUniform::new(0.0)),
        );

        let shadow_map = targets::shadow_map(device, config.shadow_map_size);
        let procedural_view = targets::procedural_texture(device, config.procedural_size);

        let shadow_scene_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("shadow_scene_bind_group"),
            layout: &pipelines.shadow_scene_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: scene_buffer.as_entire_binding(),
            }],
        });

        let shadow_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("shadow_sampler"),
            compare: Some(wgpu::CompareFunction::Less),
            ..Default::default()
        });
        let procedural_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("procedural_sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        let main_scene_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("main_scene_bind_group"),
            layout: &pipelines.main_scene_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: scene_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&shadow_map),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&shadow_sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(&procedural_view),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: wgpu::BindingResource::Sampler(&procedural_sampler),
                },
            ],
        });

        let procedural_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("procedural_bind_group"),
            layout: &pipelines.procedural_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: procedural_buffer.as_entire_binding(),
            }],
        });
        let procedural_bundle = {
            let mut encoder = device.create_render_bundle_encoder(&wgpu::RenderBundleEncoderDescriptor {
                label: Some("procedural_bundle"),
                color_formats: &[Some(PROCEDURAL_FORMAT)],
                depth_stencil: None,
                sample_count: 1,
                multiview: None,
            });
            encoder.set_pipeline(&pipelines.procedural);
            encoder.set_bind_group(0, &procedural_group, &[]);
            encoder.draw(0..3, 0..1);
            encoder.finish(&wgpu::RenderBundleDescriptor {
                label: Some("procedural_bundle"),
            })
        };

        tracing::info!(
            passes = ?schedule.order().collect::<Vec<_>>(),
            shadow_map = config.shadow_map_size,
            procedural = config.procedural_size,
            msaa_samples,
            "renderer created"
        );

        Ok(Self {
            pipelines,
            schedule,
            scene_buffer,
            procedural_buffer,
            shadow_map,
            procedural_view,
            shadow_scene_group,
            main_scene_group,
            procedural_bundle,
            bundles: None,
            topology: TopologyTracker::new(),
            frame: FrameContext::new(),
        })
    }

    /// Force the bundles to be rebuilt on the next `prepare`.
    pub fn invalidate(&mut self) {
        self.topology.invalidate();
    }

    /// Pool topology the current bundles were compiled against.
    pub fn compiled_topology(&self) -> Option<&Topology> {
        self.topology.compiled()
    }

    /// Recompile the shadow and main bundles if the topology changed since the last compile.
    pub fn prepare(&mut self, backend: &WgpuBackend, scene: &Scene<WgpuBackend>) -> bool {
        let pools = scene.pools();
        let casters = scene.shadow_casters();
        let current = Topology::of(pools.iter().chain(&casters).copied());
        if self.bundles.is_some() && !self.topology.needs_rebuild(&current) {
            return false;
        }
        let _span =
            tracing::debug_span!("compile_bundles", meshes = current.mesh_count()).entered();
        let device = backend.device();

        let shadow_plan = DrawPlan::compile(&casters);
        let shadow = encode_plan(
            device,
            &BundleTarget {
                label: "shadow_bundle",
                color_format: None,
                depth_format: Some(SHADOW_FORMAT),
                sample_count: 1,
            },
            &self.pipelines.shadow,
            &self.shadow_scene_group,
            &self.pipelines.model_layout,
            &casters,
            &shadow_plan,
        );

        let main_plan = DrawPlan::compile(&pools);
        let main = encode_plan(
            device,
            &BundleTarget {
                label: "main_bundle",
                color_format: Some(self.pipelines.surface_format),
                depth_format: Some(MAIN_DEPTH_FORMAT),
                sample_count: self.pipelines.msaa_samples,
            },
            &self.pipelines.main,
            &self.main_scene_group,
            &self.pipelines.model_layout,
            &pools,
            &main_plan,
        );

        self.bundles = Some(PassBundles {
            shadow,
            main,
            main_draws: main_plan.draw_count(),
            shadow_draws: shadow_plan.draw_count(),
        });
        self.topology.mark_compiled(current);
        true
    }

    /// Recreate the main targets if the viewport changed.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) -> bool {
        let format = self.pipelines.surface_format;
        let samples = self.pipelines.msaa_samples;
        self.frame
            .ensure_size(width, height, |w, h| MainTargets::new(device, format, samples, w, h))
    }

    /// Serialize the scene uniform and the procedural time.
    pub fn write_uniforms(&self, backend: &WgpuBackend, data: &SceneData) {
        backend.write_buffer(&self.scene_buffer, 0, bytemuck::bytes_of(&data.to_uniform()));
        backend.write_buffer(
            &self.procedural_buffer,
            0,
            bytemuck::bytes_of(&ProceduralUniform::new(data.time)),
        );
    }

    /// Record every pass in schedule order. `surface` receives the resolved main pass.
    ///
    /// Fails with [`RenderError::NotPrepared`] unless [`Renderer::prepare`] and
    /// [`Renderer::resize`] have both run; nothing is recorded in that case.
    pub fn record(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        surface: &wgpu::TextureView,
    ) -> Result<(), RenderError> {
        let bundles = self
            .bundles
            .as_ref()
            .ok_or(RenderError::NotPrepared("prepare"))?;
        let main_targets = self
            .frame
            .targets()
            .ok_or(RenderError::NotPrepared("resize"))?;

        for kind in self.schedule.order() {
            match kind {
                PassKind::Procedural => {
                    let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                        label: Some("procedural_pass"),
                        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                            view: &self.procedural_view,
                            resolve_target: None,
                            ops: wgpu::Operations {
                                load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                                store: wgpu::StoreOp::Store,
                            },
                        })],
                        ..Default::default()
                    });
                    pass.execute_bundles(std::iter::once(&self.procedural_bundle));
                }
                PassKind::Shadow => {
                    let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                        label: Some("shadow_pass"),
                        color_attachments: &[],
                        depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                            view: &self.shadow_map,
                            depth_ops: Some(wgpu::Operations {
                                load: wgpu::LoadOp::Clear(1.0),
                                store: wgpu::StoreOp::Store,
                            }),
                            stencil_ops: None,
                        }),
                        ..Default::default()
                    });
                    pass.execute_bundles(std::iter::once(&bundles.shadow));
                }
                PassKind::Main => {
                    let (view, resolve_target) = match &main_targets.color {
                        Some(msaa) => (msaa, Some(surface)),
                        None => (surface, None),
                    };
                    let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                        label: Some("main_pass"),
                        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                            view,
                            resolve_target,
                            ops: wgpu::Operations {
                                load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                                store: wgpu::StoreOp::Store,
                            },
                        })],
                        depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                            view: &main_targets.depth,
                            depth_ops: Some(wgpu::Operations {
                                load: wgpu::LoadOp::Clear(1.0),
                                store: wgpu::StoreOp::Store,
                            }),
                            stencil_ops: Some(wgpu::Operations {
                                load: wgpu::LoadOp::Clear(0),
                                store: wgpu::StoreOp::Store,
                            }),
                        }),
                        ..Default::default()
                    });
                    pass.execute_bundles(std::iter::once(&bundles.main));
                }
            }
        }
        Ok(())
    }

    pub fn schedule(&self) -> &PassSchedule {
        &self.schedule
    }

    /// Draw counts of the compiled main and shadow bundles.
    pub fn draw_counts(&self) -> Option<(usize, usize)> {
        self.bundles.as_ref().map(|b| (b.main_draws, b.shadow_draws))
    }

    /// How many times the main targets have been created.
    pub fn target_generation(&self) -> u64 {
        self.frame.generation()
    }

    pub fn msaa_samples(&self) -> u32 {
        self.pipelines.msaa_samples
    }
}
