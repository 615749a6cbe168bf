use std::time::Instant;

use sprig_input::InputState;
use sprig_scene::{Scene, SceneConfig, StepReport};
use sprig_tools::{FrameStats, PoolInspector, SceneSummary};

use crate::backend::WgpuBackend;
use crate::error::RenderError;
use crate::renderer::Renderer;

/// Runs one frame at a time: step the scene, upload uniforms, replay bundles, submit.
///
/// Owns the backend so every pool buffer and the device share one lifetime.
pub struct FrameDriver {
    backend: WgpuBackend,
    renderer: Renderer,
    scene: Scene<WgpuBackend>,
    stats: FrameStats,
    last_frame: Option<Instant>,
}

impl FrameDriver {
    pub fn new(
        backend: WgpuBackend,
        surface_format: wgpu::TextureFormat,
        config: &SceneConfig,
    ) -> Result<Self, RenderError> {
        let scene = Scene::build(config, &backend)?;
        let renderer = Renderer::new(&backend, surface_format, &config.render)?;
        Ok(Self {
            backend,
            renderer,
            scene,
            stats: FrameStats::new(),
            last_frame: None,
        })
    }

    /// Render one frame into `target`, a `width x height` surface view.
    ///
    /// Fails with [`RenderError::DeviceLost`] once the device is gone; nothing
    /// is stepped or submitted in that case. A recording failure also skips the submit.
    pub fn frame(
        &mut self,
        input: &mut InputState,
        target: &wgpu::TextureView,
        width: u32,
        height: u32,
    ) -> Result<StepReport, RenderError> {
        if let Some(reason) = self.backend.lost() {
            return Err(RenderError::DeviceLost(reason));
        }

        let start = Instant::now();
        let frame_time = self.last_frame.map(|t| start - t).unwrap_or_default();
        self.last_frame = Some(start);
        let dt_ms = frame_time.as_secs_f32() * 1000.0;

        let _span = tracing::info_span!("frame", frame = self.stats.frames(), dt_ms).entered();

        self.renderer.resize(self.backend.device(), width, height);
        let report = self.scene.step(&self.backend, input, dt_ms);
        self.renderer
            .write_uniforms(&self.backend, &self.scene.scene_data(width, height));
        self.renderer.prepare(&self.backend, &self.scene);

        let mut encoder = self
            .backend
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame_encoder"),
            });
        self.renderer.record(&mut encoder, target)?;
        self.backend.queue().submit(std::iter::once(encoder.finish()));

        self.stats.record(start.elapsed(), frame_time);
        Ok(report)
    }

    /// Force the main and shadow bundles to be recompiled on the next frame.
    pub fn invalidate(&mut self) {
        self.renderer.invalidate();
    }

    pub fn backend(&self) -> &WgpuBackend {
        &self.backend
    }

    pub fn device(&self) -> &wgpu::Device {
        self.backend.device()
    }

    pub fn queue(&self) -> &wgpu::Queue {
        self.backend.queue()
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn scene(&self) -> &Scene<WgpuBackend> {
        &self.scene
    }

    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }

    pub fn summary(&self) -> SceneSummary {
        PoolInspector::scene(&self.scene)
    }
}
