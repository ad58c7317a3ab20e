//! Indicator animation: resting colors, timed overlays and full-strip
//! sequences.
//!
//! Everything here is driven by explicit millisecond timestamps and an
//! injected random source, so the runner owns the clock and tests can step
//! through time deterministically.

pub mod color;
mod engine;
pub mod overlay;
pub mod sequence;

pub use color::{wheel, Palette, Rgb};
pub use engine::{AnimationEngine, Frame};
pub use overlay::{
    StormPhase, StormTransition, ThunderstormOverlay, WindBlink, THUNDERSTORM_CHECK_MS,
    THUNDERSTORM_DWELL_MS, THUNDERSTORM_TRIGGER_PROBABILITY, WIND_BLINK_MS,
};
pub use sequence::{
    Sequence, SequenceKind, PULSE_LEVELS, PULSE_STEP_MS, SWEEP_STEPS, SWEEP_STEP_MS,
};
