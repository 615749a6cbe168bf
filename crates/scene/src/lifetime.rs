/// Countdown in game-clock milliseconds. Once negative, the owner is dead.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lifetime {
    pub start_ms: f32,
    pub remaining_ms: f32,
}

impl Lifetime {
    pub fn new(ms: f32) -> Self {
        Self {
            start_ms: ms,
            remaining_ms: ms,
        }
    }

    /// Advance by `dt_ms`. Returns `true` only on the tick that expires it.
    pub fn tick(&mut self, dt_ms: f32) -> bool {
        let was_alive = self.is_alive();
        self.remaining_ms -= dt_ms;
        was_alive && !self.is_alive()
    }

    pub fn is_alive(&self) -> bool {
        self.remaining_ms >= 0.0
    }

    /// Fraction of the lifetime left, in `[0, 1]`.
    pub fn fraction(&self) -> f32 {
        if self.start_ms <= 0.0 {
            return 0.0;
        }
        (self.remaining_ms / self.start_ms).clamp(0.0, 1.0)
    }
}
