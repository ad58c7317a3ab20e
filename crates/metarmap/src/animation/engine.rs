//! The indicator animation engine.
//!
//! Keeps a resting color per slot, recomputed whenever the registry or the
//! display state changes, and layers the thunderstorm flash, the wind blink
//! and the full-strip sequences on top of it. The color shown for a slot is
//! its overlay color while one is asserted, and its resting color otherwise.

use rand::Rng;
use tracing::{debug, trace};

use super::color::{Palette, Rgb};
use super::overlay::{StormPhase, StormTransition, ThunderstormOverlay, WindBlink};
use super::sequence::{Sequence, SequenceKind};
use crate::registry::{AirportSlot, Registry};
use crate::state::{DisplayState, Hazards};

/// One rendered frame, brightness already applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    pixels: Vec<Rgb>,
}

impl Frame {
    /// Colors in display order.
    #[must_use]
    pub fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }

    /// `(index, color)` assignments for the strip.
    pub fn assignments(&self) -> impl Iterator<Item = (usize, Rgb)> + '_ {
        self.pixels.iter().copied().enumerate()
    }

    /// Colors as `(r, g, b)` tuples.
    #[must_use]
    pub fn to_tuples(&self) -> Vec<(u8, u8, u8)> {
        self.pixels.iter().map(|c| c.to_tuple()).collect()
    }

    /// Number of positions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    /// Whether the frame has no positions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct SlotLight {
    resting: Rgb,
    overlay: Option<Rgb>,
    hazards: Hazards,
}

impl SlotLight {
    fn displayed(&self) -> Rgb {
        self.overlay.unwrap_or(self.resting)
    }
}

/// Computes the color of every slot over time.
#[derive(Debug, Clone)]
pub struct AnimationEngine {
    palette: Palette,
    slots: Vec<SlotLight>,
    thunderstorm: ThunderstormOverlay,
    wind_blink: WindBlink,
    sequence: Option<Sequence>,
    sequence_step: Option<u32>,
    dirty: bool,
}

impl AnimationEngine {
    /// Create an engine with no slots. Call [`Self::update_base`] to populate it.
    #[must_use]
    pub fn new(palette: Palette) -> Self {
        Self {
            palette,
            slots: Vec::new(),
            thunderstorm: ThunderstormOverlay::new(0),
            wind_blink: WindBlink::new(0),
            sequence: None,
            sequence_step: None,
            dirty: true,
        }
    }

    /// The palette in use.
    #[must_use]
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Number of slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the engine has no slots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Recompute every resting color from the registry and display state.
    ///
    /// Overlay colors are released; the overlays reassert them on their next
    /// transition.
    pub fn update_base(&mut self, registry: &Registry, state: &DisplayState) {
        self.slots = registry
            .slots()
            .iter()
            .map(|slot| self.light_for(slot, state))
            .collect();
        self.dirty = true;

        debug!(
            slots = self.slots.len(),
            thunderstorms = self.slots.iter().filter(|s| s.hazards.thunderstorm).count(),
            windy = self.slots.iter().filter(|s| s.hazards.wind).count(),
            "Resting colors updated"
        );
    }

    fn light_for(&self, slot: &AirportSlot, state: &DisplayState) -> SlotLight {
        if !state.power_on || slot.is_unused() {
            return SlotLight::default();
        }

        let no_data = SlotLight {
            resting: self.palette.no_data,
            ..SlotLight::default()
        };

        let Some(obs) = slot.observation().filter(|obs| obs.is_valid()) else {
            return no_data;
        };
        let Some(category) = obs.category else {
            return no_data;
        };

        let hazards = state.hazards(obs);
        let resting = if hazards.wind {
            self.palette.wind
        } else {
            self.palette.category(category)
        };

        SlotLight {
            resting,
            overlay: None,
            hazards,
        }
    }

    /// Start the rainbow sweep.
    pub fn start_sweep(&mut self, now_ms: u64) {
        debug!("Starting rainbow sweep");
        self.sequence = Some(Sequence::sweep(now_ms));
        self.sequence_step = None;
    }

    /// Start the alarm pulse.
    pub fn start_pulse(&mut self, now_ms: u64) {
        debug!("Starting alarm pulse");
        self.sequence = Some(Sequence::pulse(now_ms));
        self.sequence_step = None;
    }

    /// The full-strip sequence currently playing, if any.
    #[must_use]
    pub fn sequence(&self) -> Option<SequenceKind> {
        self.sequence.as_ref().map(Sequence::kind)
    }

    /// Current thunderstorm overlay phase.
    #[must_use]
    pub fn storm_phase(&self) -> StormPhase {
        self.thunderstorm.phase()
    }

    /// Whether the wind blink is in its lit half.
    #[must_use]
    pub fn wind_lit(&self) -> bool {
        self.wind_blink.is_lit()
    }

    /// Resting color of a slot.
    #[must_use]
    pub fn resting(&self, index: usize) -> Option<Rgb> {
        self.slots.get(index).map(|s| s.resting)
    }

    /// Color currently shown for a slot, ignoring full-strip sequences and
    /// brightness.
    #[must_use]
    pub fn displayed(&self, index: usize) -> Option<Rgb> {
        self.slots.get(index).map(SlotLight::displayed)
    }

    /// Hazards recorded for a slot at the last update.
    #[must_use]
    pub fn hazards(&self, index: usize) -> Option<Hazards> {
        self.slots.get(index).map(|s| s.hazards)
    }

    /// Advance sequences and overlays to `now_ms`.
    ///
    /// Returns a frame when anything visible changed since the last frame.
    pub fn tick(
        &mut self,
        now_ms: u64,
        state: &DisplayState,
        rng: &mut impl Rng,
    ) -> Option<Frame> {
        if let Some(sequence) = &self.sequence {
            match sequence.step_at(now_ms) {
                Some(step) => {
                    if self.sequence_step != Some(step) {
                        self.sequence_step = Some(step);
                        self.dirty = true;
                    }
                }
                None => {
                    trace!(kind = ?sequence.kind(), "Sequence finished");
                    self.sequence = None;
                    self.sequence_step = None;
                    self.dirty = true;
                }
            }
        }

        if self.sequence.is_none() && state.overlays_allowed() {
            if state.thunderstorm_enabled {
                self.advance_thunderstorm(now_ms, rng);
            }
            if state.wind_enabled {
                self.advance_wind(now_ms);
            }
        }

        if std::mem::take(&mut self.dirty) {
            Some(self.frame(state))
        } else {
            None
        }
    }

    fn advance_thunderstorm(&mut self, now_ms: u64, rng: &mut impl Rng) {
        let any_storm = self.slots.iter().any(|s| s.hazards.thunderstorm);
        if !any_storm && self.thunderstorm.phase() == StormPhase::Idle {
            return;
        }

        let overlay = match self.thunderstorm.advance(now_ms, rng) {
            Some(StormTransition::Flash) => Some(self.palette.lightning),
            Some(StormTransition::Restore) => None,
            None => return,
        };
        trace!(flash = overlay.is_some(), "Thunderstorm overlay transition");

        for slot in self.slots.iter_mut().filter(|s| s.hazards.thunderstorm) {
            slot.overlay = overlay;
        }
        self.dirty = true;
    }

    fn advance_wind(&mut self, now_ms: u64) {
        let Some(lit) = self.wind_blink.advance(now_ms) else {
            return;
        };
        let color = if lit { self.palette.wind } else { Rgb::OFF };

        for slot in self.slots.iter_mut().filter(|s| s.hazards.wind) {
            slot.overlay = Some(color);
            self.dirty = true;
        }
    }

    /// Render the current frame.
    #[must_use]
    pub fn frame(&self, state: &DisplayState) -> Frame {
        let len = self.slots.len();
        let pixels: Vec<Rgb> = if !state.power_on {
            vec![Rgb::OFF; len]
        } else if let (Some(sequence), Some(step)) = (&self.sequence, self.sequence_step) {
            sequence.render(step, len, &self.palette)
        } else {
            self.slots.iter().map(SlotLight::displayed).collect()
        };

        Frame {
            pixels: pixels
                .into_iter()
                .map(|c| c.scale(state.brightness))
                .collect(),
        }
    }
}

impl Default for AnimationEngine {
    fn default() -> Self {
        Self::new(Palette::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::testing::FixedRng;
    use crate::animation::{wheel, SWEEP_STEPS, SWEEP_STEP_MS};
    use crate::category::FlightCategory;
    use crate::parser::parse_report;

    const VFR_CALM: &str = "KAAA 081856Z 28005KT 10SM CLR 15/12 A3012";
    const IFR_CALM: &str = "KBBB 081856Z 28005KT 2SM BR OVC008 15/12 A3012";
    const VFR_WINDY: &str = "KCCC 081856Z 28040KT 10SM CLR 15/12 A3012";
    const STORM_WINDY: &str = "KDDD 081856Z 28040KT 10SM TSRA BKN020CB 15/12 A3012";

    fn state() -> DisplayState {
        DisplayState {
            brightness: 255,
            last_fetch_ok: true,
            ..DisplayState::default()
        }
    }

    fn setup(ids: &[&str], reports: &[&str], state: &DisplayState) -> (Registry, AnimationEngine) {
        let mut registry = Registry::new(ids, 16).unwrap();
        registry.merge(reports.iter().map(|r| parse_report(r)));
        let mut engine = AnimationEngine::default();
        engine.update_base(&registry, state);
        (registry, engine)
    }

    #[test]
    fn test_resting_colors() {
        let state = state();
        let (_, engine) = setup(
            &["KAAA", "KBBB", "", "KCCC", "KZZZ"],
            &[VFR_CALM, IFR_CALM, VFR_WINDY],
            &state,
        );
        let palette = Palette::default();

        assert_eq!(engine.resting(0), Some(palette.category(FlightCategory::Vfr)));
        assert_eq!(engine.resting(1), Some(palette.category(FlightCategory::Ifr)));
        assert_eq!(engine.resting(2), Some(Rgb::OFF));
        assert_eq!(engine.resting(3), Some(palette.wind));
        assert_eq!(engine.resting(4), Some(palette.no_data));
        assert_eq!(engine.resting(5), None);
    }

    #[test]
    fn test_wind_override_respects_settings() {
        let state = DisplayState {
            wind_enabled: false,
            ..state()
        };
        let (_, engine) = setup(&["KCCC"], &[VFR_WINDY], &state);
        assert_eq!(engine.resting(0), Some(Palette::default().vfr));

        let state = DisplayState {
            wind_threshold_kt: 40,
            ..self::state()
        };
        let (_, engine) = setup(&["KCCC"], &[VFR_WINDY], &state);
        assert_eq!(engine.resting(0), Some(Palette::default().vfr));
    }

    #[test]
    fn test_power_off_is_all_off() {
        let state = DisplayState {
            power_on: false,
            ..state()
        };
        let (_, engine) = setup(&["KAAA", "KBBB"], &[VFR_CALM, IFR_CALM], &state);
        assert_eq!(engine.resting(0), Some(Rgb::OFF));
        assert!(engine.frame(&state).pixels().iter().all(|c| c.is_off()));
    }

    #[test]
    fn test_invalid_observation_is_no_data() {
        let state = state();
        let mut registry = Registry::new(&["KAAA"], 4).unwrap();
        let mut obs = parse_report(VFR_CALM);
        obs.category = None;
        registry.merge(vec![obs]);
        let mut engine = AnimationEngine::default();
        engine.update_base(&registry, &state);
        assert_eq!(engine.resting(0), Some(Palette::default().no_data));
    }

    #[test]
    fn test_first_tick_emits_frame_then_idle() {
        let state = state();
        let (_, mut engine) = setup(&["KAAA"], &[VFR_CALM], &state);
        let mut rng = FixedRng::never();

        let frame = engine.tick(10, &state, &mut rng).unwrap();
        assert_eq!(frame.pixels(), &[Palette::default().vfr]);
        assert!(engine.tick(20, &state, &mut rng).is_none());
    }

    #[test]
    fn test_wind_blink_on_off() {
        let state = state();
        let (_, mut engine) = setup(&["KAAA", "KCCC"], &[VFR_CALM, VFR_WINDY], &state);
        let palette = Palette::default();
        let mut rng = FixedRng::never();

        engine.tick(0, &state, &mut rng);
        assert_eq!(engine.displayed(1), Some(palette.wind));

        engine.tick(1000, &state, &mut rng);
        assert!(engine.wind_lit());
        assert_eq!(engine.displayed(1), Some(palette.wind));

        let frame = engine.tick(2000, &state, &mut rng).unwrap();
        assert_eq!(engine.displayed(1), Some(Rgb::OFF));
        assert_eq!(frame.pixels()[1], Rgb::OFF);
        // Calm slot is untouched
        assert_eq!(engine.displayed(0), Some(palette.vfr));

        engine.tick(3000, &state, &mut rng);
        assert_eq!(engine.displayed(1), Some(palette.wind));
    }

    #[test]
    fn test_thunderstorm_flash_and_restore() {
        let state = state();
        let (_, mut engine) = setup(&["KAAA", "KDDD"], &[VFR_CALM, STORM_WINDY], &state);
        let palette = Palette::default();
        let mut rng = FixedRng::always();

        engine.tick(2999, &state, &mut rng);
        assert_eq!(engine.storm_phase(), StormPhase::Idle);

        let frame = engine.tick(3000, &state, &mut rng).unwrap();
        assert_eq!(engine.storm_phase(), StormPhase::Flashing);
        assert_eq!(frame.pixels()[1], palette.lightning);
        assert_eq!(frame.pixels()[0], palette.vfr);

        engine.tick(3100, &state, &mut rng);
        assert_eq!(engine.storm_phase(), StormPhase::Idle);
        assert_eq!(engine.displayed(1), engine.resting(1));
    }

    #[test]
    fn test_thunderstorm_takes_precedence_over_wind() {
        let state = state();
        let (_, mut engine) = setup(&["KDDD"], &[STORM_WINDY], &state);
        let palette = Palette::default();
        let mut rng = FixedRng::always();

        // Resting color is the category color, not the wind warning
        assert_eq!(engine.resting(0), Some(palette.category(FlightCategory::Mvfr)));

        for now in (0..=10_000).step_by(50) {
            engine.tick(now, &state, &mut rng);
            let shown = engine.displayed(0).unwrap();
            assert_ne!(shown, palette.wind, "wind color at {now} ms");
            match engine.storm_phase() {
                StormPhase::Flashing => assert_eq!(shown, palette.lightning),
                StormPhase::Idle => assert_eq!(Some(shown), engine.resting(0)),
            }
        }
    }

    #[test]
    fn test_thunderstorm_disabled() {
        let state = DisplayState {
            thunderstorm_enabled: false,
            ..state()
        };
        let (_, mut engine) = setup(&["KDDD"], &[STORM_WINDY], &state);
        let mut rng = FixedRng::always();
        engine.tick(3000, &state, &mut rng);
        assert_eq!(engine.storm_phase(), StormPhase::Idle);
        // With thunderstorms hidden, the wind warning shows instead
        assert_eq!(engine.resting(0), Some(Palette::default().wind));
    }

    #[test]
    fn test_overlays_need_successful_fetch() {
        let state = DisplayState {
            last_fetch_ok: false,
            ..state()
        };
        let (_, mut engine) = setup(&["KCCC", "KDDD"], &[VFR_WINDY, STORM_WINDY], &state);
        let mut rng = FixedRng::always();

        for now in (0..=5000).step_by(100) {
            engine.tick(now, &state, &mut rng);
        }
        assert_eq!(engine.storm_phase(), StormPhase::Idle);
        assert!(!engine.wind_lit());
        assert_eq!(engine.displayed(0), engine.resting(0));
        assert_eq!(engine.displayed(1), engine.resting(1));
    }

    #[test]
    fn test_update_base_releases_overlays() {
        let state = state();
        let (registry, mut engine) = setup(&["KCCC"], &[VFR_WINDY], &state);
        let mut rng = FixedRng::never();
        engine.tick(1000, &state, &mut rng);
        engine.tick(2000, &state, &mut rng);
        assert_eq!(engine.displayed(0), Some(Rgb::OFF));

        engine.update_base(&registry, &state);
        assert_eq!(engine.displayed(0), engine.resting(0));
    }

    #[test]
    fn test_empty_slot_never_lit() {
        let state = state();
        let (_, mut engine) = setup(&["KDDD", "", "KCCC"], &[STORM_WINDY, VFR_WINDY], &state);
        let mut rng = FixedRng::always();
        for now in (0..=8000).step_by(50) {
            if let Some(frame) = engine.tick(now, &state, &mut rng) {
                assert!(frame.pixels()[1].is_off(), "lit at {now} ms");
            }
        }
    }

    #[test]
    fn test_sweep_runs_then_returns_to_resting() {
        let state = state();
        let (_, mut engine) = setup(&["KAAA", "KBBB"], &[VFR_CALM, IFR_CALM], &state);
        let mut rng = FixedRng::never();

        engine.start_sweep(0);
        assert_eq!(engine.sequence(), Some(SequenceKind::Sweep));
        let first = engine.tick(0, &state, &mut rng).unwrap();
        assert_eq!(first.pixels()[0], wheel(0));

        assert!(engine.tick(5, &state, &mut rng).is_none());
        assert!(engine.tick(SWEEP_STEP_MS, &state, &mut rng).is_some());

        let end = u64::from(SWEEP_STEPS) * SWEEP_STEP_MS;
        let last = engine.tick(end, &state, &mut rng).unwrap();
        assert_eq!(engine.sequence(), None);
        assert_eq!(last.pixels()[0], Palette::default().vfr);
        assert_eq!(last.pixels()[1], Palette::default().ifr);
    }

    #[test]
    fn test_sequence_suspends_overlays() {
        let state = state();
        let (_, mut engine) = setup(&["KCCC"], &[VFR_WINDY], &state);
        let mut rng = FixedRng::never();

        engine.start_pulse(0);
        engine.tick(1000, &state, &mut rng);
        assert_eq!(engine.sequence(), None);
        // Pulse lasted 512 ms; the blink resumes on this same tick
        assert!(engine.wind_lit());

        // A toggle falls due at 2000 but the pulse holds it back
        engine.start_pulse(1900);
        engine.tick(2100, &state, &mut rng);
        engine.tick(2300, &state, &mut rng);
        assert_eq!(engine.sequence(), Some(SequenceKind::Pulse));
        assert!(engine.wind_lit());

        engine.tick(2500, &state, &mut rng);
        assert_eq!(engine.sequence(), None);
        assert!(!engine.wind_lit());
    }

    #[test]
    fn test_pulse_frames_use_alarm_hue() {
        let state = state();
        let (_, mut engine) = setup(&["KAAA", "", "KBBB"], &[VFR_CALM, IFR_CALM], &state);
        let mut rng = FixedRng::never();
        engine.start_pulse(0);
        let frame = engine.tick(0, &state, &mut rng).unwrap();
        assert_eq!(frame.len(), 3);
        let alarm = Palette::default().alarm;
        for color in frame.pixels() {
            assert_eq!(color.1, 0);
            assert_eq!(color.2, 0);
            assert!(color.0 > 0 && color.0 <= alarm.0);
        }
    }

    #[test]
    fn test_brightness_applied_to_frame() {
        let state = DisplayState {
            brightness: 127,
            ..state()
        };
        let (_, engine) = setup(&["KAAA"], &[VFR_CALM], &state);
        let frame = engine.frame(&state);
        assert_eq!(frame.pixels(), &[Rgb(0, 127, 0)]);
        assert_eq!(frame.to_tuples(), vec![(0, 127, 0)]);
        assert_eq!(frame.assignments().collect::<Vec<_>>(), vec![(0, Rgb(0, 127, 0))]);
    }
}
