//! Game clock
//!
//! Counts game turns and tells day from night, which decides whether town
//! monsters carry their light or their darkness.

/// Turn counter with a day/night cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayClock {
    /// Game turns since the start
    turn: u64,
    /// Turns in a full day/night cycle
    day_length: u64,
}

impl DayClock {
    /// Create a clock at dawn of the first day
    pub fn new(day_length: u64) -> Self {
        Self {
            turn: 0,
            day_length: day_length.max(2),
        }
    }

    /// Advance by `turns` turns, returning true if day and night swapped
    pub fn advance(&mut self, turns: u64) -> bool {
        let was_day = self.is_daytime();
        self.turn = self.turn.saturating_add(turns);
        was_day != self.is_daytime()
    }

    /// The first half of every cycle is day
    pub fn is_daytime(&self) -> bool {
        self.turn % self.day_length < self.day_length / 2
    }

    pub fn turn(&self) -> u64 {
        self.turn
    }
}

impl Default for DayClock {
    fn default() -> Self {
        Self::new(10_000)
    }
}
