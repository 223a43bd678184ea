/// Length of one run in seconds
pub const GAME_DURATION_SECS: u32 = 30;

/// Whole-second countdown advanced by external ticks
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GameClock {
    duration: u32,
    remaining: u32,
}

impl GameClock {
    pub fn new(duration: u32) -> Self {
        Self {
            duration,
            remaining: duration,
        }
    }

    pub fn reset(&mut self) {
        self.remaining = self.duration;
    }

    /// Counts down one second, never below zero. Returns the seconds left.
    pub fn tick(&mut self) -> u32 {
        self.remaining = self.remaining.saturating_sub(1);
        self.remaining
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

}

impl Default for GameClock {
    fn default() -> Self {
        Self::new(GAME_DURATION_SECS)
    }
}
