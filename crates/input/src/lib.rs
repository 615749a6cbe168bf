//! Input sampled by the frame driver: held keys and accumulated pointer motion.
//!
//! # Invariants
//! - Input state is owned here and read by exactly one consumer per frame.
//! - Platform key codes are mapped by the application; this crate never sees them.

mod keys;
mod pointer;

pub use keys::{BOOST_SPEED, Key, PressedKeys, WALK_SPEED};
pub use pointer::PointerAccumulator;

/// Everything the frame driver samples from the input collaborator.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    pub keys: PressedKeys,
    pub pointer: PointerAccumulator,
    /// Pointer motion only counts while captured.
    pub pointer_captured: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pointer_moved(&mut self, dx: f32, dy: f32) {
        if self.pointer_captured {
            self.pointer.accumulate(dx, dy);
        }
    }
}
