//! Core observation types for metarmap.
//!
//! An [`Observation`] is produced fresh by the parser for every report line and
//! never edited afterwards. Every reported quantity is optional: `None` means
//! the report did not carry the field, or it could not be read. Absent values
//! are never replaced by zero.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub use crate::category::FlightCategory;

/// Slack allowed for report timestamps slightly ahead of the local clock.
const FUTURE_TOLERANCE_MINUTES: i64 = 60;

/// How far back a day-of-month timestamp is searched for a matching date.
const RESOLVE_MONTHS: usize = 12;

/// Sky coverage of a cloud layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Coverage {
    /// Sky clear (`SKC`), reported by an observer.
    SkyClear,
    /// Clear below automated sensor range (`CLR`).
    Clear,
    /// Few (`FEW`), 1/8 to 2/8.
    Few,
    /// Scattered (`SCT`), 3/8 to 4/8.
    Scattered,
    /// Broken (`BKN`), 5/8 to 7/8.
    Broken,
    /// Overcast (`OVC`), 8/8.
    Overcast,
    /// Sky obscured, vertical visibility (`VV`).
    VerticalVisibility,
}

impl Coverage {
    /// Look up a coverage from its report code.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "SKC" => Some(Self::SkyClear),
            "CLR" => Some(Self::Clear),
            "FEW" => Some(Self::Few),
            "SCT" => Some(Self::Scattered),
            "BKN" => Some(Self::Broken),
            "OVC" => Some(Self::Overcast),
            "VV" => Some(Self::VerticalVisibility),
            _ => None,
        }
    }

    /// The report code for this coverage.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::SkyClear => "SKC",
            Self::Clear => "CLR",
            Self::Few => "FEW",
            Self::Scattered => "SCT",
            Self::Broken => "BKN",
            Self::Overcast => "OVC",
            Self::VerticalVisibility => "VV",
        }
    }

    /// Whether this coverage carries a layer height.
    #[must_use]
    pub fn has_height(self) -> bool {
        !matches!(self, Self::SkyClear | Self::Clear)
    }

    /// Whether a layer of this coverage can form the ceiling.
    #[must_use]
    pub fn forms_ceiling(self) -> bool {
        matches!(self, Self::Broken | Self::Overcast)
    }
}

/// Convective cloud type attached to a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Convective {
    /// Cumulonimbus (`CB`).
    Cumulonimbus,
    /// Towering cumulus (`TCU`).
    ToweringCumulus,
}

/// One reported cloud layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloudLayer {
    /// Sky coverage.
    pub coverage: Coverage,
    /// Base height in hundreds of feet. Absent for clear coverages.
    pub height_hundreds_ft: Option<u16>,
    /// Convective modifier, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub convective: Option<Convective>,
}

impl CloudLayer {
    /// Base height in feet.
    #[must_use]
    pub fn height_ft(&self) -> Option<u32> {
        self.height_hundreds_ft.map(|h| u32::from(h) * 100)
    }

    /// Whether this layer is cumulonimbus.
    #[must_use]
    pub fn is_cumulonimbus(&self) -> bool {
        self.convective == Some(Convective::Cumulonimbus)
    }
}

/// Formats the layer as it appears in a report, e.g. `BKN040CB`.
impl std::fmt::Display for CloudLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.coverage.code())?;
        if let Some(height) = self.height_hundreds_ft {
            write!(f, "{height:03}")?;
        }
        match self.convective {
            Some(Convective::Cumulonimbus) => f.write_str("CB"),
            Some(Convective::ToweringCumulus) => f.write_str("TCU"),
            None => Ok(()),
        }
    }
}

/// Day-of-month and time of an observation, as written in the report (UTC).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservationTime {
    /// Day of month, 1 to 31.
    pub day: u8,
    /// Hour, 0 to 23.
    pub hour: u8,
    /// Minute, 0 to 59.
    pub minute: u8,
}

impl ObservationTime {
    /// Build a timestamp, rejecting out-of-range components.
    #[must_use]
    pub fn new(day: u8, hour: u8, minute: u8) -> Option<Self> {
        ((1..=31).contains(&day) && hour <= 23 && minute <= 59).then_some(Self {
            day,
            hour,
            minute,
        })
    }

    /// Resolve to a full date and time relative to `reference`.
    ///
    /// Picks the latest date not after `reference` (plus a small tolerance for
    /// clock skew) whose day of month matches, searching back up to a year.
    #[must_use]
    pub fn resolve(&self, reference: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let latest = reference + Duration::minutes(FUTURE_TOLERANCE_MINUTES);
        let mut year = reference.year();
        let mut month = reference.month();

        for _ in 0..RESOLVE_MONTHS {
            let candidate = NaiveDate::from_ymd_opt(year, month, u32::from(self.day))
                .and_then(|d| d.and_hms_opt(u32::from(self.hour), u32::from(self.minute), 0))
                .map(|naive| naive.and_utc());

            if let Some(at) = candidate {
                if at <= latest {
                    return Some(at);
                }
            }

            if month == 1 {
                month = 12;
                year -= 1;
            } else {
                month -= 1;
            }
        }

        None
    }
}

impl std::fmt::Display for ObservationTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}{:02}{:02}Z", self.day, self.hour, self.minute)
    }
}

/// A parsed weather report for one airport.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Four-character airport identifier. Absent when the line was rejected.
    pub station: Option<String>,
    /// Observation time.
    pub observed: Option<ObservationTime>,
    /// Wind direction in degrees true.
    pub wind_direction_deg: Option<u16>,
    /// Sustained wind speed in knots.
    pub wind_speed_kt: Option<u16>,
    /// Prevailing visibility in statute miles.
    pub visibility_sm: Option<f64>,
    /// Temperature in degrees Celsius.
    pub temperature_c: Option<f64>,
    /// Dewpoint in degrees Celsius.
    pub dewpoint_c: Option<f64>,
    /// Altimeter setting in inches of mercury.
    pub altimeter_inhg: Option<f64>,
    /// Cloud layers in report order.
    pub clouds: Vec<CloudLayer>,
    /// Thunderstorm reported, or cumulonimbus present.
    pub thunderstorm: bool,
    /// Flight category. Present whenever the station is.
    pub category: Option<FlightCategory>,
    /// The report text as received.
    pub raw: String,
}

impl Observation {
    /// Whether the observation identifies an airport.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.station.is_some()
    }

    /// Height of the lowest broken or overcast layer, in feet.
    #[must_use]
    pub fn ceiling_ft(&self) -> Option<u32> {
        self.clouds
            .iter()
            .filter(|layer| layer.coverage.forms_ceiling())
            .filter_map(CloudLayer::height_ft)
            .min()
    }

    /// Time elapsed between the observation and `now`.
    #[must_use]
    pub fn age(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.observed
            .and_then(|t| t.resolve(now))
            .map(|at| now.signed_duration_since(at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn layer(coverage: Coverage, height: Option<u16>) -> CloudLayer {
        CloudLayer {
            coverage,
            height_hundreds_ft: height,
            convective: None,
        }
    }

    #[test]
    fn test_coverage_codes() {
        for code in ["SKC", "CLR", "FEW", "SCT", "BKN", "OVC", "VV"] {
            let coverage = Coverage::from_code(code).unwrap();
            assert_eq!(coverage.code(), code);
        }
        assert!(Coverage::from_code("NSC").is_none());
    }

    #[test]
    fn test_cloud_layer_display() {
        let layer = CloudLayer {
            coverage: Coverage::Broken,
            height_hundreds_ft: Some(40),
            convective: Some(Convective::Cumulonimbus),
        };
        assert_eq!(layer.to_string(), "BKN040CB");

        let clear = CloudLayer {
            coverage: Coverage::Clear,
            height_hundreds_ft: None,
            convective: None,
        };
        assert_eq!(clear.to_string(), "CLR");

        let towering = CloudLayer {
            coverage: Coverage::Scattered,
            height_hundreds_ft: Some(5),
            convective: Some(Convective::ToweringCumulus),
        };
        assert_eq!(towering.to_string(), "SCT005TCU");
    }

    #[test]
    fn test_coverage_has_height() {
        assert!(!Coverage::Clear.has_height());
        assert!(!Coverage::SkyClear.has_height());
        assert!(Coverage::Few.has_height());
        assert!(Coverage::VerticalVisibility.has_height());
    }

    #[test]
    fn test_ceiling_uses_lowest_broken_or_overcast() {
        let obs = Observation {
            clouds: vec![
                layer(Coverage::Few, Some(5)),
                layer(Coverage::Overcast, Some(40)),
                layer(Coverage::Broken, Some(25)),
            ],
            ..Observation::default()
        };
        assert_eq!(obs.ceiling_ft(), Some(2500));
    }

    #[test]
    fn test_ceiling_ignores_few_and_scattered() {
        let obs = Observation {
            clouds: vec![layer(Coverage::Few, Some(5)), layer(Coverage::Scattered, Some(8))],
            ..Observation::default()
        };
        assert_eq!(obs.ceiling_ft(), None);
    }

    #[test]
    fn test_ceiling_absent_without_layers() {
        assert_eq!(Observation::default().ceiling_ft(), None);
    }

    #[test]
    fn test_observation_time_ranges() {
        assert!(ObservationTime::new(8, 18, 56).is_some());
        assert!(ObservationTime::new(0, 12, 0).is_none());
        assert!(ObservationTime::new(32, 12, 0).is_none());
        assert!(ObservationTime::new(1, 24, 0).is_none());
        assert!(ObservationTime::new(1, 0, 60).is_none());
    }

    #[test]
    fn test_observation_time_display() {
        let t = ObservationTime::new(8, 6, 5).unwrap();
        assert_eq!(t.to_string(), "080605Z");
    }

    #[test]
    fn test_resolve_same_month() {
        let now = Utc.with_ymd_and_hms(2024, 3, 8, 19, 30, 0).unwrap();
        let t = ObservationTime::new(8, 18, 56).unwrap();
        assert_eq!(
            t.resolve(now),
            Some(Utc.with_ymd_and_hms(2024, 3, 8, 18, 56, 0).unwrap())
        );
    }

    #[test]
    fn test_resolve_previous_month() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 0, 10, 0).unwrap();
        let t = ObservationTime::new(29, 23, 55).unwrap();
        assert_eq!(
            t.resolve(now),
            Some(Utc.with_ymd_and_hms(2024, 2, 29, 23, 55, 0).unwrap())
        );
    }

    #[test]
    fn test_resolve_skips_short_months() {
        let now = Utc.with_ymd_and_hms(2023, 3, 2, 0, 0, 0).unwrap();
        let t = ObservationTime::new(31, 12, 0).unwrap();
        // February has no 31st, so January is the match
        assert_eq!(
            t.resolve(now),
            Some(Utc.with_ymd_and_hms(2023, 1, 31, 12, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_age() {
        let now = Utc.with_ymd_and_hms(2024, 3, 8, 19, 26, 0).unwrap();
        let obs = Observation {
            observed: ObservationTime::new(8, 18, 56),
            ..Observation::default()
        };
        assert_eq!(obs.age(now), Some(Duration::minutes(30)));
        assert_eq!(Observation::default().age(now), None);
    }

    #[test]
    fn test_default_is_invalid() {
        let obs = Observation::default();
        assert!(!obs.is_valid());
        assert!(obs.category.is_none());
        assert!(!obs.thunderstorm);
    }

    #[test]
    fn test_cloud_layer_serialization() {
        let layer = CloudLayer {
            coverage: Coverage::Broken,
            height_hundreds_ft: Some(20),
            convective: Some(Convective::Cumulonimbus),
        };
        let json = serde_json::to_string(&layer).unwrap();
        assert!(json.contains("broken"));
        assert!(json.contains("cumulonimbus"));
        assert!(layer.is_cumulonimbus());
        assert_eq!(layer.height_ft(), Some(2000));
    }
}
