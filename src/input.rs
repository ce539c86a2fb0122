/// Per-tick input as the round core sees it.
///
/// The host polls the keyboard however it likes; the core only wants three
/// booleans, one of which (`fire`) must already be edge-triggered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InputSnapshot {
    pub left: bool,
    pub right: bool,
    /// True only on the tick the fire key went from up to down.
    pub fire: bool,
}

impl InputSnapshot {
    /// Build a snapshot from raw key levels, running the fire level through
    /// `latch` so a held key fires once.
    pub fn from_keys(left: bool, right: bool, fire_down: bool, latch: &mut FireLatch) -> Self {
        Self {
            left,
            right,
            fire: latch.press(fire_down),
        }
    }
}

/// Remembers the previous frame's fire level.
#[derive(Clone, Copy, Debug, Default)]
pub struct FireLatch {
    was_down: bool,
}

impl FireLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed this frame's level; returns true on a rising edge only.
    pub fn press(&mut self, down: bool) -> bool {
        let edge = down && !self.was_down;
        self.was_down = down;
        edge
    }
}
