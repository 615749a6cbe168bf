use glam::Vec2;

/// Sums pointer motion between frames.
///
/// Event handlers call [`PointerAccumulator::accumulate`]; the frame driver is
/// the single consumer and calls [`PointerAccumulator::take`] once per frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerAccumulator {
    delta: Vec2,
}

impl PointerAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accumulate(&mut self, dx: f32, dy: f32) {
        self.delta += Vec2::new(dx, dy);
    }

    /// Return the motion since the last take and reset to zero.
    pub fn take(&mut self) -> Vec2 {
        std::mem::take(&mut self.delta)
    }

    pub fn peek(&self) -> Vec2 {
        self.delta
    }
}
