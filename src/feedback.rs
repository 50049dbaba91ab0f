//! Badge feedback for long-running actions.
//!
//! While an action runs the badge cycles through a set of frames. When it
//! completes the badge shows the outcome for a moment and then clears. An
//! action that takes longer than [`TIMEOUT`] is reported as failed, even if
//! it completes later. Every action gets a sequence number; completions of
//! anything but the current action are ignored.

use std::time::{Duration, Instant};

pub const TIMEOUT: Duration = Duration::from_secs(20);

/// How long an outcome stays on the badge
pub const OUTCOME_DISPLAY: Duration = Duration::from_secs(3);

pub const BUSY_FRAMES: &[&str] = &[
    "⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏",
];

pub const SUCCESS_TEXT: &str = "✓";
pub const FAILURE_TEXT: &str = "✗";

/// Position in a looping table of frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cycle {
    pub index: usize,
    pub frames: &'static [&'static str],
}

impl Cycle {
    pub fn new(frames: &'static [&'static str]) -> Self {
        Self { index: 0, frames }
    }

    pub fn current(&self) -> &'static str {
        if self.frames.is_empty() {
            ""
        } else {
            self.frames[self.index % self.frames.len()]
        }
    }

    pub fn advance(&mut self) {
        if !self.frames.is_empty() {
            self.index = (self.index + 1) % self.frames.len();
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Busy { sequence: u64, started: Instant },
    Succeeded { sequence: u64, at: Instant },
    Failed { sequence: u64, at: Instant },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Badge {
    phase: Phase,
    sequence: u64,
    cycle: Cycle,
}

impl Default for Badge {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            sequence: 0,
            cycle: Cycle::new(BUSY_FRAMES),
        }
    }
}

impl Badge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Starts a new action, superseding any running one, and returns its
    /// sequence number
    pub fn start(&mut self, now: Instant) -> u64 {
        self.sequence += 1;
        self.phase = Phase::Busy {
            sequence: self.sequence,
            started: now,
        };
        self.cycle = Cycle::new(BUSY_FRAMES);
        self.sequence
    }

    /// Reports the outcome of action `sequence`. Returns whether the badge
    /// changed.
    pub fn complete(&mut self, sequence: u64, ok: bool, now: Instant) -> bool {
        match self.phase {
            Phase::Busy { sequence: current, .. } if current == sequence => {
                self.phase = if ok {
                    Phase::Succeeded { sequence, at: now }
                } else {
                    Phase::Failed { sequence, at: now }
                };
                true
            }
            _ => {
                ::log::trace!("Ignoring completion of badge action {}", sequence);
                false
            }
        }
    }

    /// Advances the animation and the timers. Returns whether the badge
    /// changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.phase {
            Phase::Idle => false,
            Phase::Busy { sequence, started } => {
                if now.saturating_duration_since(started) >= TIMEOUT {
                    ::log::warn!("Badge action {} timed out", sequence);
                    self.phase = Phase::Failed { sequence, at: now };
                } else {
                    self.cycle.advance();
                }
                true
            }
            Phase::Succeeded { at, .. } | Phase::Failed { at, .. } => {
                if now.saturating_duration_since(at) >= OUTCOME_DISPLAY {
                    self.phase = Phase::Idle;
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Text to show on the badge
    pub fn text(&self) -> &'static str {
        match self.phase {
            Phase::Idle => "",
            Phase::Busy { .. } => self.cycle.current(),
            Phase::Succeeded { .. } => SUCCESS_TEXT,
            Phase::Failed { .. } => FAILURE_TEXT,
        }
    }
}
