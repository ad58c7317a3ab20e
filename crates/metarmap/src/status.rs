//! Status summaries for the CLI.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::category::FlightCategory;
use crate::error::Result;
use crate::registry::{AirportSlot, Registry};
use crate::state::DisplayState;

/// Summary of one display position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotSummary {
    /// Position on the display.
    pub index: usize,

    /// Bound identifier, absent for unused positions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,

    /// Flight category of the current observation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<FlightCategory>,

    /// Thunderstorm flash would be shown.
    pub thunderstorm: bool,

    /// Wind warning would be shown.
    pub wind: bool,

    /// Minutes since the observation was taken.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_minutes: Option<i64>,

    /// Report text of the current observation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

impl SlotSummary {
    fn from_slot(slot: &AirportSlot, state: &DisplayState, now: DateTime<Utc>) -> Self {
        let obs = slot.observation().filter(|obs| obs.is_valid());
        let hazards = obs.map(|obs| state.hazards(obs)).unwrap_or_default();

        Self {
            index: slot.index(),
            identifier: slot.identifier().map(str::to_string),
            category: obs.and_then(|obs| obs.category),
            thunderstorm: hazards.thunderstorm,
            wind: hazards.wind,
            age_minutes: obs.and_then(|obs| obs.age(now)).map(|age| age.num_minutes()),
            raw: obs.map(|obs| obs.raw.clone()),
        }
    }
}

/// Summary of the whole display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    /// Number of display positions.
    pub total_slots: usize,

    /// Positions bound to an airport.
    pub bound_slots: usize,

    /// Bound positions holding a valid observation.
    pub valid: usize,

    /// Whether the most recent fetch succeeded.
    pub last_fetch_ok: bool,

    /// When reports were last fetched successfully.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_success: Option<DateTime<Utc>>,

    /// Per-position details.
    pub slots: Vec<SlotSummary>,
}

impl Summary {
    /// Build a summary of the registry under the given display state.
    #[must_use]
    pub fn collect(
        registry: &Registry,
        state: &DisplayState,
        last_success: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            total_slots: registry.len(),
            bound_slots: registry.bound_count(),
            valid: registry.valid_count(),
            last_fetch_ok: state.last_fetch_ok,
            last_success,
            slots: registry
                .slots()
                .iter()
                .map(|slot| SlotSummary::from_slot(slot, state, now))
                .collect(),
        }
    }

    /// Render the summary as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`](crate::Error::Json) if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Number of positions in each flight category.
    #[must_use]
    pub fn category_counts(&self) -> [(FlightCategory, usize); 4] {
        let count = |category| {
            self.slots
                .iter()
                .filter(|slot| slot.category == Some(category))
                .count()
        };
        [
            FlightCategory::Vfr,
            FlightCategory::Mvfr,
            FlightCategory::Ifr,
            FlightCategory::Lifr,
        ]
        .map(|category| (category, count(category)))
    }
}
