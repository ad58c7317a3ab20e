//! Display state passed into the core on every update and tick.
//!
//! Holds the runtime settings owned by the configuration layer plus the
//! outcome of the most recent fetch. Nothing in the core keeps a global copy.

use serde::{Deserialize, Serialize};

use crate::observation::Observation;

/// Runtime display settings and link status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayState {
    /// Global brightness, 0 to 255.
    pub brightness: u8,
    /// Whether high-wind warnings are shown.
    pub wind_enabled: bool,
    /// Wind speed above which a warning is shown, in knots.
    pub wind_threshold_kt: u16,
    /// Whether thunderstorm flashes are shown.
    pub thunderstorm_enabled: bool,
    /// Global display power.
    pub power_on: bool,
    /// Whether the most recent fetch succeeded.
    pub last_fetch_ok: bool,
}

impl Default for DisplayState {
    fn default() -> Self {
        Self {
            brightness: 40,
            wind_enabled: true,
            wind_threshold_kt: 25,
            thunderstorm_enabled: true,
            power_on: true,
            last_fetch_ok: false,
        }
    }
}

/// Active hazards for one observation under the current settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hazards {
    /// Thunderstorm flag set and thunderstorm display enabled.
    pub thunderstorm: bool,
    /// Wind above threshold and wind display enabled. Never set together
    /// with `thunderstorm`.
    pub wind: bool,
}

impl DisplayState {
    /// Evaluate the hazards of an observation.
    #[must_use]
    pub fn hazards(&self, obs: &Observation) -> Hazards {
        if !obs.is_valid() {
            return Hazards::default();
        }
        let thunderstorm = self.thunderstorm_enabled && obs.thunderstorm;
        let wind = self.wind_enabled
            && !thunderstorm
            && obs
                .wind_speed_kt
                .is_some_and(|speed| speed > self.wind_threshold_kt);
        Hazards { thunderstorm, wind }
    }

    /// Whether per-tick overlays may run at all.
    #[must_use]
    pub fn overlays_allowed(&self) -> bool {
        self.power_on && self.last_fetch_ok
    }
}
