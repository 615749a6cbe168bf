/// Per-driver render state that depends on the viewport size.
///
/// Created once at startup; updated only when [`FrameContext::ensure_size`]
/// observes a new size. `T` is whatever the backend sizes to the viewport
/// (color and depth targets for wgpu).
#[derive(Debug)]
pub struct FrameContext<T> {
    size: Option<(u32, u32)>,
    targets: Option<T>,
    generation: u64,
}

impl<T> Default for FrameContext<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FrameContext<T> {
    pub fn new() -> Self {
        Self {
            size: None,
            targets: None,
            generation: 0,
        }
    }

    /// Recreate the sized targets if the viewport changed. Returns `true` if they were rebuilt.
    ///
    /// Zero dimensions are clamped to one. The previous targets are dropped
    /// before `create` runs.
    pub fn ensure_size(
        &mut self,
        width: u32,
        height: u32,
        create: impl FnOnce(u32, u32) -> T,
    ) -> bool {
        let size = (width.max(1), height.max(1));
        if self.size == Some(size) && self.targets.is_some() {
            return false;
        }
        if let Some((w, h)) = self.size {
            tracing::info!(from = ?(w, h), to = ?size, "viewport resized");
        }
        self.targets = None;
        self.targets = Some(create(size.0, size.1));
        self.size = Some(size);
        self.generation += 1;
        true
    }

    pub fn targets(&self) -> Option<&T> {
        self.targets.as_ref()
    }

    pub fn size(&self) -> Option<(u32, u32)> {
        self.size
    }

    pub fn aspect_ratio(&self) -> f32 {
        match self.size {
            Some((w, h)) => (w as f32 / h as f32).abs(),
            None => 1.0,
        }
    }

    /// Number of times the targets have been (re)created.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use crate::pool::{MeshPoolBuilder, PoolCapacity};
    use sprig_mesh::shapes;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Counts live instances so drops can be observed.
    struct Targets {
        size: (u32, u32),
        live: Rc<Cell<i32>>,
    }

    impl Drop for Targets {
        fn drop(&mut self) {
            self.live.set(self.live.get() - 1);
        }
    }

    #[test]
    fn first_call_creates_targets() {
        let mut ctx = FrameContext::new();
        assert!(ctx.targets().is_none());
        assert!(ctx.ensure_size(800, 600, |w, h| (w, h)));
        assert_eq!(ctx.targets(), Some(&(800, 600)));
        assert!((ctx.aspect_ratio() - 800.0 / 600.0).abs() < 1e-6);
    }

    #[test]
    fn same_size_is_a_no_op() {
        let mut ctx = FrameContext::new();
        ctx.ensure_size(800, 600, |w, h| (w, h));
        assert!(!ctx.ensure_size(800, 600, |_, _| panic!("recreated")));
        assert_eq!(ctx.generation(), 1);
    }

    #[test]
    fn zero_size_is_clamped() {
        let mut ctx = FrameContext::new();
        ctx.ensure_size(0, 0, |w, h| (w, h));
        assert_eq!(ctx.size(), Some((1, 1)));
    }

    #[test]
    fn resize_recreates_once_and_leaves_pools_alone() {
        let backend = MemoryBackend::new();
        let mut builder =
            MeshPoolBuilder::for_backend("scene", PoolCapacity::new(2, 16, 48), &backend).unwrap();
        builder.add_raw(&shapes::cube()).unwrap();
        builder.add_raw(&shapes::plane()).unwrap();
        let pool = builder.finish(&backend);
        let snapshot = |b: &MemoryBackend| {
            (
                b.contents(pool.vertex_buffer()),
                b.contents(pool.index_buffer()),
                b.contents(pool.uniform_buffer()),
            )
        };
        let before = snapshot(&backend);

        let live = Rc::new(Cell::new(0));
        let created = Cell::new(0);
        let mut make = |w: u32, h: u32| {
            created.set(created.get() + 1);
            live.set(live.get() + 1);
            Targets {
                size: (w, h),
                live: live.clone(),
            }
        };

        let mut ctx = FrameContext::new();
        ctx.ensure_size(800, 600, &mut make);
        assert_eq!(created.get(), 1);

        for _ in 0..3 {
            ctx.ensure_size(1920, 1080, &mut make);
        }
        assert_eq!(created.get(), 2);
        assert_eq!(live.get(), 1, "old targets must be dropped");
        assert_eq!(ctx.targets().map(|t| t.size), Some((1920, 1080)));
        assert_eq!(snapshot(&backend), before);
        assert_eq!(backend.write_count(), 0);
    }
}
