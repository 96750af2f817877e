use crate::consts::KEY_COUNT;

/// State of the 16-key hex keypad.
///
/// Besides the level of every key it keeps a latch used by `LD Vx, K`: while
/// armed, the first up-to-down transition of any key is captured. Keys that
/// were already held when the latch was armed do not count until released
/// and pressed again.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct KeypadState {
    keys: [bool; KEY_COUNT],
    armed: bool,
    latched: Option<u8>,
}

impl KeypadState {
    /// Record a key level, returning true if this was a key-down edge.
    pub fn set(&mut self, key: u8, pressed: bool) -> bool {
        let slot = &mut self.keys[key as usize & 0xF];
        let edge = pressed && !*slot;
        *slot = pressed;
        if edge && self.armed && self.latched.is_none() {
            self.latched = Some(key & 0xF);
        }
        edge
    }

    pub fn is_pressed(&self, key: u8) -> bool {
        self.keys[key as usize & 0xF]
    }

    pub fn keys(&self) -> &[bool; KEY_COUNT] {
        &self.keys
    }

    /// Start waiting for a fresh key press.
    pub fn arm(&mut self) {
        self.armed = true;
        self.latched = None;
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Take the latched key, disarming the latch if one was captured.
    pub fn take_latched(&mut self) -> Option<u8> {
        let key = self.latched.take()?;
        self.armed = false;
        Some(key)
    }

    /// Release every key and drop any pending wait.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
