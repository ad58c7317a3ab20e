//! Report parser.
//!
//! Scans one raw report line into an [`Observation`]. This is a tolerant scan
//! over a fixed layout, not a full grammar: every field is located on its own,
//! and a field that cannot be read is left absent without affecting the rest.
//!
//! Positions matter. Visibility and weather are searched for only after the
//! wind group, and the temperature group only after the visibility group, which
//! keeps runway visual range groups (`R28L/2400FT`) from being mistaken for
//! either.

use std::sync::LazyLock;

use regex::Regex;
use tracing::trace;

use crate::category::FlightCategory;
use crate::observation::{CloudLayer, Convective, Coverage, Observation, ObservationTime};

/// Lines shorter than this are rejected outright.
const MIN_REPORT_LEN: usize = 10;

/// Maximum number of cloud layers kept per report.
const MAX_CLOUD_LAYERS: usize = 10;

/// Optional report-type tokens preceding the identifier.
const REPORT_TYPES: [&str; 2] = ["METAR", "SPECI"];

/// Remarks token; cloud groups are not read past it.
const REMARKS: &str = "RMK";

/// Thunderstorm sensor out of service. Not a thunderstorm.
const TS_SENSOR_OUT: &str = "TSNO";

static ALTIMETER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" A(\d{4})(?:\s|$)").expect("valid altimeter pattern"));

static CLOUD_GROUP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(SKC|CLR|FEW|SCT|BKN|OVC|VV)(\d{3})?(CB|TCU)?$").expect("valid cloud pattern")
});

/// A whitespace-delimited token and its byte offset in the line.
#[derive(Debug, Clone, Copy)]
struct Token<'a> {
    pos: usize,
    text: &'a str,
}

impl Token<'_> {
    fn end(&self) -> usize {
        self.pos + self.text.len()
    }
}

fn tokenize(line: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut start = None;
    for (i, c) in line.char_indices() {
        if c.is_ascii_whitespace() {
            if let Some(s) = start.take() {
                tokens.push(Token {
                    pos: s,
                    text: &line[s..i],
                });
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        tokens.push(Token {
            pos: s,
            text: &line[s..],
        });
    }
    tokens
}

fn all_digits(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit())
}

fn parse_digits(text: &str) -> Option<u32> {
    if all_digits(text) {
        text.parse().ok()
    } else {
        None
    }
}

/// Parse a temperature value, where a leading `M` means minus.
fn parse_signed(text: &str) -> Option<f64> {
    match text.strip_prefix('M') {
        Some(magnitude) => parse_digits(magnitude).map(|v| -f64::from(v)),
        None => parse_digits(text).map(f64::from),
    }
}

/// Parse one visibility piece: whole miles (`10`, `6+`) or a fraction (`3/4`).
fn parse_visibility(text: &str) -> Option<f64> {
    let text = text.trim_end_matches('+');
    if let Some((numerator, denominator)) = text.split_once('/') {
        let numerator = parse_digits(numerator)?;
        let denominator = parse_digits(denominator)?;
        if denominator == 0 {
            return None;
        }
        return Some(f64::from(numerator) / f64::from(denominator));
    }
    parse_digits(text).map(f64::from)
}

/// Parse one raw report line.
///
/// Lines shorter than ten characters yield an empty, invalid observation.
/// Otherwise every field is extracted independently; the returned observation
/// is valid when the identifier could be read.
#[must_use]
pub fn parse_report(line: &str) -> Observation {
    let raw = line.trim_end_matches(['\r', '\n']);
    if raw.len() < MIN_REPORT_LEN {
        trace!(len = raw.len(), "Report too short, rejected");
        return Observation::default();
    }

    let tokens = tokenize(raw);
    let mut rest = tokens.as_slice();
    if let Some((first, tail)) = rest.split_first() {
        if REPORT_TYPES.contains(&first.text) {
            rest = tail;
        }
    }

    let Some((ident, rest)) = rest.split_first() else {
        return Observation {
            raw: raw.to_string(),
            ..Observation::default()
        };
    };

    let station = parse_station(ident.text);
    let ident_end = ident.pos + ident.text.len().min(4);
    let observed = rest.first().and_then(|t| parse_timestamp(t.text));

    let wind_token = rest.iter().find(|t| t.text.ends_with("KT"));
    let (wind_direction_deg, wind_speed_kt) =
        wind_token.and_then(|t| parse_wind(t.text)).unzip();
    let wind_end = wind_token.map_or(ident_end, Token::end);

    let (visibility_sm, visibility_end) = match find_visibility(raw, rest, wind_end) {
        Some((value, end)) => (value, end),
        None => (None, wind_end),
    };

    let (temperature_c, dewpoint_c) = find_temperature(raw, visibility_end).unzip();
    let dewpoint_c = dewpoint_c.flatten();

    let altimeter_inhg = ALTIMETER
        .captures(raw)
        .and_then(|c| c.get(1))
        .and_then(|m| parse_digits(m.as_str()))
        .map(|v| f64::from(v) / 100.0);

    let clouds = parse_clouds(rest);
    let thunderstorm = clouds.iter().any(CloudLayer::is_cumulonimbus)
        || rest
            .iter()
            .filter(|t| t.pos >= wind_end)
            .any(|t| is_thunderstorm_token(t.text));

    let mut obs = Observation {
        station,
        observed,
        wind_direction_deg,
        wind_speed_kt,
        visibility_sm,
        temperature_c,
        dewpoint_c,
        altimeter_inhg,
        clouds,
        thunderstorm,
        category: None,
        raw: raw.to_string(),
    };

    if obs.is_valid() {
        obs.category = Some(FlightCategory::classify(obs.ceiling_ft(), obs.visibility_sm));
    }

    log_missing_fields(&obs);
    obs
}

/// Parse a multi-line response body, skipping blank lines.
#[must_use]
pub fn parse_batch(text: &str) -> Vec<Observation> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(parse_report)
        .collect()
}

fn parse_station(token: &str) -> Option<String> {
    token
        .get(..4)
        .filter(|id| id.bytes().all(|b| b.is_ascii_alphanumeric()))
        .map(str::to_ascii_uppercase)
}

fn parse_timestamp(token: &str) -> Option<ObservationTime> {
    let digits = token.strip_suffix('Z')?;
    if digits.len() != 6 || !all_digits(digits) {
        return None;
    }
    let field = |range: std::ops::Range<usize>| digits.get(range).and_then(|d| d.parse().ok());
    ObservationTime::new(field(0..2)?, field(2..4)?, field(4..6)?)
}

/// Direction and speed from a wind group such as `28015KT`, `280105KT` or
/// `28015G25KT`. Gusts are not read.
fn parse_wind(token: &str) -> Option<(u16, u16)> {
    let group = token.strip_suffix("KT")?;
    let direction = group.get(0..3).filter(|d| all_digits(d))?;
    let speed = group
        .get(3..)?
        .split('G')
        .next()
        .filter(|s| (2..=3).contains(&s.len()) && all_digits(s))?;
    Some((direction.parse().ok()?, speed.parse().ok()?))
}

/// Locate the visibility group after `after` and return the parsed value and
/// the offset just past the `SM` marker.
fn find_visibility(
    raw: &str,
    tokens: &[Token<'_>],
    after: usize,
) -> Option<(Option<f64>, usize)> {
    let token = tokens
        .iter()
        .find(|t| t.pos >= after && t.text.len() > 2 && t.text.ends_with("SM"))?;
    let marker = token.end() - 2;
    let end = token.end();

    // Runway visual range, not prevailing visibility
    if token.text.starts_with('R') {
        return Some((None, end));
    }

    let bytes = raw.as_bytes();
    let mut start = marker;
    while start > after && matches!(bytes[start - 1], b'0'..=b'9' | b'/' | b' ' | b'+') {
        start -= 1;
    }
    let pieces: Vec<&str> = raw[start..marker].split_whitespace().collect();

    // Only a short whole number directly before a fraction counts ("1 1/2")
    let value = match pieces.as_slice() {
        [.., whole, fraction] if whole.len() <= 2 && all_digits(whole) && fraction.contains('/') => {
            parse_visibility(whole).zip(parse_visibility(fraction)).map(|(w, f)| w + f)
        }
        [.., last] => parse_visibility(last),
        [] => None,
    };

    Some((value, end))
}

/// Temperature and dewpoint from the first `TT/DD` group after `after`.
fn find_temperature(raw: &str, after: usize) -> Option<(f64, Option<f64>)> {
    let bytes = raw.as_bytes();
    let tail = raw.get(after..)?;

    for (offset, _) in tail.match_indices('/') {
        let slash = after + offset;

        let mut start = slash;
        while start > 0 && bytes[start - 1].is_ascii_digit() {
            start -= 1;
        }
        if start > 0 && bytes[start - 1] == b'M' {
            start -= 1;
        }
        // Must be a token of its own, not a runway designator
        if start == slash || start == 0 || bytes[start - 1] != b' ' {
            continue;
        }
        let Some(temperature) = parse_signed(&raw[start..slash]) else {
            continue;
        };

        let mut end = slash + 1;
        while end < bytes.len() && (bytes[end].is_ascii_digit() || bytes[end] == b'M') {
            end += 1;
        }
        let dewpoint = parse_signed(&raw[slash + 1..end]);

        return Some((temperature, dewpoint));
    }

    None
}

fn parse_clouds(tokens: &[Token<'_>]) -> Vec<CloudLayer> {
    let mut layers = Vec::new();
    for token in tokens.iter().take_while(|t| t.text != REMARKS) {
        if layers.len() == MAX_CLOUD_LAYERS {
            break;
        }
        let Some(caps) = CLOUD_GROUP.captures(token.text) else {
            continue;
        };
        let Some(coverage) = caps.get(1).and_then(|m| Coverage::from_code(m.as_str())) else {
            continue;
        };
        let height = caps.get(2).and_then(|m| m.as_str().parse::<u16>().ok());
        let convective = caps.get(3).map(|m| {
            if m.as_str() == "CB" {
                Convective::Cumulonimbus
            } else {
                Convective::ToweringCumulus
            }
        });

        if coverage.has_height() != height.is_some() {
            continue;
        }
        if !coverage.has_height() && convective.is_some() {
            continue;
        }

        layers.push(CloudLayer {
            coverage,
            height_hundreds_ft: height,
            convective,
        });
    }
    layers
}

fn is_thunderstorm_token(token: &str) -> bool {
    if token.starts_with(TS_SENSOR_OUT) {
        return false;
    }
    let core = token.trim_start_matches(['+', '-']);
    let core = core.strip_prefix("VC").unwrap_or(core);
    core.starts_with("TS")
}

fn log_missing_fields(obs: &Observation) {
    let station = obs.station.as_deref().unwrap_or("????");
    let fields = [
        ("station", obs.station.is_none()),
        ("time", obs.observed.is_none()),
        ("wind", obs.wind_speed_kt.is_none()),
        ("visibility", obs.visibility_sm.is_none()),
        ("temperature", obs.temperature_c.is_none()),
        ("dewpoint", obs.dewpoint_c.is_none()),
        ("altimeter", obs.altimeter_inhg.is_none()),
    ];
    for (field, missing) in fields {
        if missing {
            trace!(station, field, "Field not parsed");
        }
    }
}
