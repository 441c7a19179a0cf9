//! Fixed-interval countdown for the decryption test.
//!
//! The countdown has no clock of its own; the caller decides what an interval
//! is and advances it with [`Countdown::tick`]. Expiry is reported exactly
//! once so the failure transition cannot double-fire.

/// Result of advancing the countdown by one interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Still counting; seconds remaining after this tick.
    Running(u32),
    /// This tick hit zero. Reported for exactly one tick.
    Expired,
    /// The countdown already expired on an earlier tick.
    Spent,
}

#[derive(Debug, Clone)]
pub struct Countdown {
    remaining: u32,
    expired: bool,
}

impl Countdown {
    pub fn new(secs: u32) -> Self {
        Self {
            remaining: secs,
            expired: false,
        }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_expired(&self) -> bool {
        self.expired
    }

    /// Advance by one interval.
    pub fn tick(&mut self) -> Tick {
        if self.expired {
            return Tick::Spent;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.expired = true;
            Tick::Expired
        } else {
            Tick::Running(self.remaining)
        }
    }
}
