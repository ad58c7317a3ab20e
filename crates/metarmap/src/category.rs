//! Flight-category classification.
//!
//! Maps a ceiling and a visibility to one of the four flight categories.
//! Each input is judged on its own and the more severe outcome wins.

use serde::{Deserialize, Serialize};

/// Flight category, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FlightCategory {
    /// Visual flight rules.
    Vfr,
    /// Marginal visual flight rules.
    Mvfr,
    /// Instrument flight rules.
    Ifr,
    /// Low instrument flight rules.
    Lifr,
}

impl FlightCategory {
    /// Classify conditions from a ceiling (feet) and a visibility (statute miles).
    ///
    /// Either input may be absent. With neither known the result is [`Self::Vfr`].
    #[must_use]
    pub fn classify(ceiling_ft: Option<u32>, visibility_sm: Option<f64>) -> Self {
        let by_ceiling = ceiling_ft.map_or(Self::Vfr, Self::from_ceiling);
        let by_visibility = visibility_sm.map_or(Self::Vfr, Self::from_visibility);
        by_ceiling.max(by_visibility)
    }

    fn from_ceiling(ceiling_ft: u32) -> Self {
        match ceiling_ft {
            1..=499 => Self::Lifr,
            500..=999 => Self::Ifr,
            1000..=3000 => Self::Mvfr,
            _ => Self::Vfr,
        }
    }

    fn from_visibility(visibility_sm: f64) -> Self {
        if visibility_sm > 0.0 && visibility_sm < 1.0 {
            Self::Lifr
        } else if (1.0..3.0).contains(&visibility_sm) {
            Self::Ifr
        } else if (3.0..5.0).contains(&visibility_sm) {
            Self::Mvfr
        } else {
            Self::Vfr
        }
    }

    /// Short upper-case label.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Vfr => "VFR",
            Self::Mvfr => "MVFR",
            Self::Ifr => "IFR",
            Self::Lifr => "LIFR",
        }
    }
}

impl std::fmt::Display for FlightCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
