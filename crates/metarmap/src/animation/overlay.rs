//! Timed overlay state machines.
//!
//! Both overlays are global: one state machine drives every affected slot.
//! Each is gated by the time elapsed since its own last action, so they behave
//! like independent timers inside a single polled loop.

use rand::Rng;

/// Interval between thunderstorm trigger checks.
pub const THUNDERSTORM_CHECK_MS: u64 = 3000;

/// Chance that a thunderstorm check starts a flash.
pub const THUNDERSTORM_TRIGGER_PROBABILITY: f64 = 0.2;

/// How long a flash stays lit.
pub const THUNDERSTORM_DWELL_MS: u64 = 100;

/// Interval between wind blink toggles.
pub const WIND_BLINK_MS: u64 = 1000;

/// Phase of the thunderstorm overlay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StormPhase {
    /// Waiting for the next trigger.
    #[default]
    Idle,
    /// Flash colors are asserted.
    Flashing,
}

/// A change of thunderstorm phase that the engine must apply to slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StormTransition {
    /// Assert the flash color on thunderstorm slots.
    Flash,
    /// Release the flash and show resting colors again.
    Restore,
}

/// Randomly triggered thunderstorm flash.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThunderstormOverlay {
    phase: StormPhase,
    last_action_ms: u64,
}

impl ThunderstormOverlay {
    /// Create an idle overlay whose timer starts at `now_ms`.
    #[must_use]
    pub fn new(now_ms: u64) -> Self {
        Self {
            phase: StormPhase::Idle,
            last_action_ms: now_ms,
        }
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> StormPhase {
        self.phase
    }

    /// Advance the state machine to `now_ms`.
    ///
    /// While idle, a trigger check runs once the check interval has elapsed;
    /// every check restarts the interval, whether or not it fires. A flash is
    /// released after the dwell time.
    pub fn advance(&mut self, now_ms: u64, rng: &mut impl Rng) -> Option<StormTransition> {
        let elapsed = now_ms.saturating_sub(self.last_action_ms);
        match self.phase {
            StormPhase::Idle => {
                if elapsed < THUNDERSTORM_CHECK_MS {
                    return None;
                }
                self.last_action_ms = now_ms;
                if rng.random_bool(THUNDERSTORM_TRIGGER_PROBABILITY) {
                    self.phase = StormPhase::Flashing;
                    Some(StormTransition::Flash)
                } else {
                    None
                }
            }
            StormPhase::Flashing => {
                if elapsed < THUNDERSTORM_DWELL_MS {
                    return None;
                }
                self.phase = StormPhase::Idle;
                self.last_action_ms = now_ms;
                Some(StormTransition::Restore)
            }
        }
    }
}

/// Fixed-period on/off blink for high-wind slots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WindBlink {
    lit: bool,
    last_toggle_ms: u64,
}

impl WindBlink {
    /// Create an unlit blink whose timer starts at `now_ms`.
    #[must_use]
    pub fn new(now_ms: u64) -> Self {
        Self {
            lit: false,
            last_toggle_ms: now_ms,
        }
    }

    /// Whether the blink is in its lit half.
    #[must_use]
    pub fn is_lit(&self) -> bool {
        self.lit
    }

    /// Advance to `now_ms`, returning the new lit state when it toggles.
    pub fn advance(&mut self, now_ms: u64) -> Option<bool> {
        if now_ms.saturating_sub(self.last_toggle_ms) < WIND_BLINK_MS {
            return None;
        }
        self.lit = !self.lit;
        self.last_toggle_ms = now_ms;
        Some(self.lit)
    }
}
