//! Elapsed recording time, advanced once per second.

/// Minutes and seconds since recording started.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ElapsedTimer {
    minutes: u32,
    seconds: u32,
}

impl ElapsedTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance by one second.
    pub fn tick(&mut self) {
        self.seconds += 1;
        if self.seconds == 60 {
            self.seconds = 0;
            self.minutes += 1;
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn minutes(&self) -> u32 {
        self.minutes
    }

    pub fn seconds(&self) -> u32 {
        self.seconds
    }

    pub fn total_seconds(&self) -> u32 {
        self.minutes * 60 + self.seconds
    }
}

impl std::fmt::Display for ElapsedTimer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.minutes, self.seconds)
    }
}
