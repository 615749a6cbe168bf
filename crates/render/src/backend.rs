use std::cell::{Cell, RefCell};

use crate::layout::DEFAULT_UNIFORM_ALIGNMENT;

/// What a buffer is bound as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferUsage {
    Vertex,
    Index,
    Uniform,
}

/// The buffer operations the pool arena needs from a device.
///
/// The wgpu backend implements this over a device/queue pair; [`MemoryBackend`]
/// implements it over plain byte vectors so pool behavior is testable without a GPU.
pub trait GpuBackend {
    type Buffer;

    /// Minimum alignment of dynamic uniform offsets, in bytes.
    fn min_uniform_alignment(&self) -> u64;

    /// Create a buffer of at least `size` bytes whose leading bytes are `contents`.
    fn create_buffer(
        &self,
        label: &str,
        usage: BufferUsage,
        size: u64,
        contents: &[u8],
    ) -> Self::Buffer;

    /// Queue a write of `bytes` at `offset`. Visible to every command submitted afterwards.
    fn write_buffer(&self, buffer: &Self::Buffer, offset: u64, bytes: &[u8]);
}

/// Handle to a buffer owned by a [`MemoryBackend`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MemoryBuffer(usize);

#[derive(Debug)]
struct MemoryBufferData {
    label: String,
    usage: BufferUsage,
    bytes: Vec<u8>,
}

/// Host-memory backend. Useful for tests and headless inspection.
#[derive(Debug)]
pub struct MemoryBackend {
    alignment: u64,
    buffers: RefCell<Vec<MemoryBufferData>>,
    writes: Cell<usize>,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::with_alignment(DEFAULT_UNIFORM_ALIGNMENT)
    }

    pub fn with_alignment(alignment: u64) -> Self {
        Self {
            alignment,
            buffers: RefCell::new(Vec::new()),
            writes: Cell::new(0),
        }
    }

    /// Snapshot of a buffer's bytes.
    pub fn contents(&self, buffer: &MemoryBuffer) -> Vec<u8> {
        self.buffers.borrow()[buffer.0].bytes.clone()
    }

    pub fn label(&self, buffer: &MemoryBuffer) -> String {
        self.buffers.borrow()[buffer.0].label.clone()
    }

    pub fn usage(&self, buffer: &MemoryBuffer) -> BufferUsage {
        self.buffers.borrow()[buffer.0].usage
    }

    pub fn buffer_count(&self) -> usize {
        self.buffers.borrow().len()
    }

    /// Number of `write_buffer` calls since creation.
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }
}

impl GpuBackend for MemoryBackend {
    type Buffer = MemoryBuffer;

    fn min_uniform_alignment(&self) -> u64 {
        self.alignment
    }

    fn create_buffer(
        &self,
        label: &str,
        usage: BufferUsage,
        size: u64,
        contents: &[u8],
    ) -> MemoryBuffer {
        assert!(
            contents.len() as u64 <= size,
            "buffer `{label}`: {} bytes of contents exceed size {size}",
            contents.len()
        );
        let mut bytes = vec![0u8; size as usize];
        bytes[..contents.len()].copy_from_slice(contents);

        let mut buffers = self.buffers.borrow_mut();
        buffers.push(MemoryBufferData {
            label: label.to_string(),
            usage,
            bytes,
        });
        MemoryBuffer(buffers.len() - 1)
    }

    fn write_buffer(&self, buffer: &MemoryBuffer, offset: u64, bytes: &[u8]) {
        let mut buffers = self.buffers.borrow_mut();
        let data = &mut buffers[buffer.0];
        let start = offset as usize;
        let end = start + bytes.len();
        assert!(
            end <= data.bytes.len(),
            "write to `{}` at {start}..{end} overruns {} bytes",
            data.label,
            data.bytes.len()
        );
        data.bytes[start..end].copy_from_slice(bytes);
        self.writes.set(self.writes.get() + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_pads_with_zeros() {
        let backend = MemoryBackend::new();
        let buf = backend.create_buffer("b", BufferUsage::Vertex, 8, &[1, 2, 3]);
        assert_eq!(backend.contents(&buf), vec![1, 2, 3, 0, 0, 0, 0, 0]);
        assert_eq!(backend.label(&buf), "b");
        assert_eq!(backend.usage(&buf), BufferUsage::Vertex);
    }

    #[test]
    fn write_replaces_range() {
        let backend = MemoryBackend::new();
        let buf = backend.create_buffer("u", BufferUsage::Uniform, 6, &[]);
        backend.write_buffer(&buf, 2, &[9, 9]);
        assert_eq!(backend.contents(&buf), vec![0, 0, 9, 9, 0, 0]);
        assert_eq!(backend.write_count(), 1);
    }

    #[test]
    #[should_panic]
    fn write_past_end_panics() {
        let backend = MemoryBackend::new();
        let buf = backend.create_buffer("u", BufferUsage::Uniform, 4, &[]);
        backend.write_buffer(&buf, 2, &[0, 0, 0]);
    }

    #[test]
    fn default_alignment_is_256() {
        assert_eq!(MemoryBackend::new().min_uniform_alignment(), 256);
        assert_eq!(MemoryBackend::with_alignment(64).min_uniform_alignment(), 64);
    }
}
