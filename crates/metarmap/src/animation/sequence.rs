//! Full-strip sequences.
//!
//! The rainbow sweep marks a successful (re)connection and the alarm pulse
//! marks a failed fetch. Both are stepped from the tick loop like the
//! overlays, so input keeps flowing while they play. Per-tick overlays are
//! suspended until a sequence finishes.

use super::color::{wheel, Palette, Rgb};

/// Number of hue steps in the rainbow sweep.
pub const SWEEP_STEPS: u32 = 256;

/// Time per sweep step.
pub const SWEEP_STEP_MS: u64 = 10;

/// Brightness levels on each side of the alarm pulse.
pub const PULSE_LEVELS: u32 = 32;

/// Time per pulse step.
pub const PULSE_STEP_MS: u64 = 8;

/// Which sequence is playing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceKind {
    /// Rainbow sweep across the whole strip.
    Sweep,
    /// Alarm hue ramped up, then down.
    Pulse,
}

/// A full-strip sequence in progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    kind: SequenceKind,
    started_ms: u64,
}

impl Sequence {
    /// Start a rainbow sweep at `now_ms`.
    #[must_use]
    pub fn sweep(now_ms: u64) -> Self {
        Self {
            kind: SequenceKind::Sweep,
            started_ms: now_ms,
        }
    }

    /// Start an alarm pulse at `now_ms`.
    #[must_use]
    pub fn pulse(now_ms: u64) -> Self {
        Self {
            kind: SequenceKind::Pulse,
            started_ms: now_ms,
        }
    }

    /// Which sequence this is.
    #[must_use]
    pub fn kind(&self) -> SequenceKind {
        self.kind
    }

    /// Total number of steps.
    #[must_use]
    pub fn step_count(&self) -> u32 {
        match self.kind {
            SequenceKind::Sweep => SWEEP_STEPS,
            SequenceKind::Pulse => PULSE_LEVELS * 2,
        }
    }

    fn step_ms(&self) -> u64 {
        match self.kind {
            SequenceKind::Sweep => SWEEP_STEP_MS,
            SequenceKind::Pulse => PULSE_STEP_MS,
        }
    }

    /// Total play time.
    #[must_use]
    pub fn duration_ms(&self) -> u64 {
        u64::from(self.step_count()) * self.step_ms()
    }

    /// The step to show at `now_ms`, or `None` once the sequence is over.
    #[must_use]
    pub fn step_at(&self, now_ms: u64) -> Option<u32> {
        let step = now_ms.saturating_sub(self.started_ms) / self.step_ms();
        u32::try_from(step)
            .ok()
            .filter(|&step| step < self.step_count())
    }

    /// Colors for every position at a given step.
    #[must_use]
    pub fn render(&self, step: u32, len: usize, palette: &Palette) -> Vec<Rgb> {
        match self.kind {
            SequenceKind::Sweep => (0..len)
                .map(|i| {
                    let offset = i * 256 / len;
                    let hue = (offset + step as usize) % 256;
                    wheel(u8::try_from(hue).unwrap_or(0))
                })
                .collect(),
            SequenceKind::Pulse => vec![palette.alarm.scale(pulse_level(step)); len],
        }
    }
}

/// Brightness of the pulse at a step: rising through the first half, then
/// falling symmetrically.
fn pulse_level(step: u32) -> u8 {
    let index = if step < PULSE_LEVELS {
        step
    } else {
        (PULSE_LEVELS * 2 - 1).saturating_sub(step)
    };
    let level = (index + 1) * 256 / PULSE_LEVELS - 1;
    u8::try_from(level).unwrap_or(u8::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sweep_runs_256_steps() {
        let seq = Sequence::sweep(1000);
        assert_eq!(seq.step_count(), 256);
        assert_eq!(seq.duration_ms(), 2560);
        assert_eq!(seq.step_at(1000), Some(0));
        assert_eq!(seq.step_at(1000 + 2559), Some(255));
        assert_eq!(seq.step_at(1000 + 2560), None);
    }

    #[test]
    fn test_step_before_start_is_first() {
        let seq = Sequence::pulse(500);
        assert_eq!(seq.step_at(0), Some(0));
    }

    #[test]
    fn test_sweep_spreads_hues_over_strip() {
        let seq = Sequence::sweep(0);
        let palette = Palette::default();
        let frame = seq.render(0, 4, &palette);
        assert_eq!(frame, vec![wheel(0), wheel(64), wheel(128), wheel(192)]);

        let shifted = seq.render(10, 4, &palette);
        assert_eq!(shifted[0], wheel(10));
        assert_eq!(shifted[3], wheel(202));
    }

    #[test]
    fn test_sweep_empty_strip() {
        let seq = Sequence::sweep(0);
        assert!(seq.render(3, 0, &Palette::default()).is_empty());
    }

    #[test]
    fn test_pulse_ramps_up_then_down() {
        assert_eq!(pulse_level(0), 7);
        assert_eq!(pulse_level(PULSE_LEVELS - 1), 255);
        assert_eq!(pulse_level(PULSE_LEVELS), 255);
        assert_eq!(pulse_level(PULSE_LEVELS * 2 - 1), 7);

        let levels: Vec<u8> = (0..PULSE_LEVELS * 2).map(pulse_level).collect();
        let peak = levels.iter().position(|&l| l == 255).unwrap();
        assert!(levels[..=peak].windows(2).all(|w| w[0] <= w[1]));
        assert!(levels[peak..].windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_pulse_uses_alarm_hue() {
        let palette = Palette::default();
        let seq = Sequence::pulse(0);
        let frame = seq.render(PULSE_LEVELS - 1, 3, &palette);
        assert_eq!(frame, vec![palette.alarm; 3]);
    }
}
