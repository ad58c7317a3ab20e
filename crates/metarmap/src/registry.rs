//! Airport registry.
//!
//! A fixed, ordered list of display positions. Each position is either unused
//! or bound to one airport identifier for the lifetime of the registry. New
//! observations replace a slot's data wholesale; slots missing from a batch
//! keep whatever they had before, with no expiry.

use tracing::debug;

use crate::error::{Error, Result};
use crate::observation::Observation;

/// Identifier text that marks an unused position.
const UNUSED_MARKER: &str = "-";

/// One display position.
#[derive(Debug, Clone, PartialEq)]
pub struct AirportSlot {
    index: usize,
    identifier: Option<String>,
    observation: Option<Observation>,
}

impl AirportSlot {
    /// Position of this slot on the display.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Bound airport identifier, or `None` for an unused position.
    #[must_use]
    pub fn identifier(&self) -> Option<&str> {
        self.identifier.as_deref()
    }

    /// Whether this position is unused.
    #[must_use]
    pub fn is_unused(&self) -> bool {
        self.identifier.is_none()
    }

    /// The most recently merged observation.
    #[must_use]
    pub fn observation(&self) -> Option<&Observation> {
        self.observation.as_ref()
    }

    /// Whether the slot holds a valid observation.
    #[must_use]
    pub fn has_valid_observation(&self) -> bool {
        self.observation.as_ref().is_some_and(Observation::is_valid)
    }
}

/// Outcome of merging one batch of observations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Slots whose observation was replaced.
    pub updated: usize,
    /// Identifiers in the batch with no matching slot. These are dropped.
    pub unmatched: Vec<String>,
    /// Bound slots that received nothing and kept their previous data.
    pub stale: usize,
}

/// The ordered set of airport slots.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Registry {
    slots: Vec<AirportSlot>,
}

impl Registry {
    /// Create a registry from configured identifiers, in display order.
    ///
    /// An empty entry (or `-`) marks an unused position. Identifiers are
    /// trimmed and upper-cased.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SlotCapacity`] if more than `max_slots` entries are given.
    pub fn new<S: AsRef<str>>(identifiers: &[S], max_slots: usize) -> Result<Self> {
        if identifiers.len() > max_slots {
            return Err(Error::SlotCapacity {
                requested: identifiers.len(),
                max: max_slots,
            });
        }

        let slots = identifiers
            .iter()
            .enumerate()
            .map(|(index, id)| AirportSlot {
                index,
                identifier: normalize_identifier(id.as_ref()),
                observation: None,
            })
            .collect();

        Ok(Self { slots })
    }

    /// Merge a batch of observations into the slots.
    ///
    /// Each observation with an identifier replaces the observation of the
    /// first slot bound to the same identifier. Duplicated identifiers across
    /// slots are not disambiguated: only the first one ever receives data.
    pub fn merge(&mut self, batch: impl IntoIterator<Item = Observation>) -> MergeReport {
        let mut report = MergeReport::default();
        let mut touched = vec![false; self.slots.len()];

        for obs in batch {
            let Some(station) = obs.station.clone() else {
                continue;
            };

            match self
                .slots
                .iter()
                .position(|slot| slot.identifier.as_deref() == Some(station.as_str()))
            {
                Some(pos) => {
                    self.slots[pos].observation = Some(obs);
                    if !touched[pos] {
                        touched[pos] = true;
                        report.updated += 1;
                    }
                }
                None => {
                    debug!(station = %station, "Observation has no matching slot, dropped");
                    report.unmatched.push(station);
                }
            }
        }

        report.stale = self
            .slots
            .iter()
            .zip(&touched)
            .filter(|(slot, touched)| !slot.is_unused() && !**touched)
            .count();

        debug!(
            updated = report.updated,
            unmatched = report.unmatched.len(),
            stale = report.stale,
            "Merged observation batch"
        );
        report
    }

    /// Number of slots, used or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the registry has no slots at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// All slots in display order.
    #[must_use]
    pub fn slots(&self) -> &[AirportSlot] {
        &self.slots
    }

    /// The slot at a display position.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&AirportSlot> {
        self.slots.get(index)
    }

    /// Number of slots bound to an airport.
    #[must_use]
    pub fn bound_count(&self) -> usize {
        self.slots.iter().filter(|s| !s.is_unused()).count()
    }

    /// Number of slots holding a valid observation.
    #[must_use]
    pub fn valid_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| s.has_valid_observation())
            .count()
    }
}

fn normalize_identifier(raw: &str) -> Option<String> {
    let id = raw.trim();
    if id.is_empty() || id == UNUSED_MARKER {
        None
    } else {
        Some(id.to_ascii_uppercase())
    }
}
