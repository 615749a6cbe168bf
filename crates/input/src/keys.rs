use std::collections::HashSet;

use glam::Vec3;

/// Keys the frame driver reacts to. Platform key codes map onto these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Forward,
    Back,
    Left,
    Right,
    Up,
    Down,
    Boost,
}

/// Player speed per frame, and while [`Key::Boost`] is held.
pub const WALK_SPEED: f32 = 0.2;
pub const BOOST_SPEED: f32 = 1.0;

/// Set of currently held keys.
#[derive(Debug, Clone, Default)]
pub struct PressedKeys {
    held: HashSet<Key>,
}

impl PressedKeys {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: Key, pressed: bool) {
        if pressed {
            self.held.insert(key);
        } else {
            self.held.remove(&key);
        }
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    pub fn clear(&mut self) {
        self.held.clear();
    }

    /// Local-space translation for this frame: +X right, +Y up, -Z forward.
    pub fn movement(&self) -> Vec3 {
        let speed = if self.is_held(Key::Boost) {
            BOOST_SPEED
        } else {
            WALK_SPEED
        };
        let mut dir = Vec3::ZERO;
        if self.is_held(Key::Forward) {
            dir.z -= 1.0;
        }
        if self.is_held(Key::Back) {
            dir.z += 1.0;
        }
        if self.is_held(Key::Left) {
            dir.x -= 1.0;
        }
        if self.is_held(Key::Right) {
            dir.x += 1.0;
        }
        if self.is_held(Key::Up) {
            dir.y += 1.0;
        }
        if self.is_held(Key::Down) {
            dir.y -= 1.0;
        }
        dir * speed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_keys_no_movement() {
        assert_eq!(PressedKeys::new().movement(), Vec3::ZERO);
    }

    #[test]
    fn forward_is_negative_z() {
        let mut keys = PressedKeys::new();
        keys.set(Key::Forward, true);
        assert_eq!(keys.movement(), Vec3::new(0.0, 0.0, -WALK_SPEED));
    }

    #[test]
    fn boost_scales_speed() {
        let mut keys = PressedKeys::new();
        keys.set(Key::Right, true);
        keys.set(Key::Up, true);
        keys.set(Key::Boost, true);
        assert_eq!(keys.movement(), Vec3::new(BOOST_SPEED, BOOST_SPEED, 0.0));
    }

    #[test]
    fn opposite_keys_cancel() {
        let mut keys = PressedKeys::new();
        keys.set(Key::Left, true);
        keys.set(Key::Right, true);
        assert_eq!(keys.movement(), Vec3::ZERO);
    }

    #[test]
    fn release_removes_key() {
        let mut keys = PressedKeys::new();
        keys.set(Key::Down, true);
        keys.set(Key::Down, false);
        assert!(!keys.is_held(Key::Down));
    }
}
