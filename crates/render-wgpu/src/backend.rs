use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use sprig_render::{BufferUsage, GpuBackend};

/// [`GpuBackend`] over a wgpu device and queue.
///
/// Also watches for device loss: the callback only records the reason, and
/// the frame driver turns it into an error on its next frame.
pub struct WgpuBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    lost: Arc<AtomicBool>,
    lost_reason: Arc<Mutex<Option<String>>>,
}

impl WgpuBackend {
    pub fn new(device: wgpu::Device, queue: wgpu::Queue) -> Self {
        let lost = Arc::new(AtomicBool::new(false));
        let lost_reason = Arc::new(Mutex::new(None));
        {
            let lost = lost.clone();
            let lost_reason = lost_reason.clone();
            device.set_device_lost_callback(move |reason, message| {
                tracing::error!(?reason, %message, "GPU device lost");
                if let Ok(mut slot) = lost_reason.lock() {
                    *slot = Some(format!("{reason:?}: {message}"));
                }
                lost.store(true, Ordering::SeqCst);
            });
        }
        Self {
            device,
            queue,
            lost,
            lost_reason,
        }
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// The loss reason, once the device has been lost.
    pub fn lost(&self) -> Option<String> {
        if !self.lost.load(Ordering::SeqCst) {
            return None;
        }
        let reason = self
            .lost_reason
            .lock()
            .ok()
            .and_then(|r| r.clone())
            .unwrap_or_else(|| "unknown".to_string());
        Some(reason)
    }
}

fn usages(usage: BufferUsage) -> wgpu::BufferUsages {
    match usage {
        BufferUsage::Vertex => wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        BufferUsage::Index => wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
        BufferUsage::Uniform => wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    }
}

impl GpuBackend for WgpuBackend {
    type Buffer = wgpu::Buffer;

    fn min_uniform_alignment(&self) -> u64 {
        self.device.limits().min_uniform_buffer_offset_alignment as u64
    }

    fn create_buffer(
        &self,
        label: &str,
        usage: BufferUsage,
        size: u64,
        contents: &[u8],
    ) -> wgpu::Buffer {
        // Mapped ranges must be a multiple of COPY_BUFFER_ALIGNMENT.
        let size = sprig_common::align_up(size.max(contents.len() as u64), wgpu::COPY_BUFFER_ALIGNMENT);
        let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size,
            usage: usages(usage),
            mapped_at_creation: true,
        });
        if !contents.is_empty() {
            buffer.slice(..).get_mapped_range_mut()[..contents.len()].copy_from_slice(contents);
        }
        buffer.unmap();
        buffer
    }

    fn write_buffer(&self, buffer: &wgpu::Buffer, offset: u64, bytes: &[u8]) {
        self.queue.write_buffer(buffer, offset, bytes);
    }
}
