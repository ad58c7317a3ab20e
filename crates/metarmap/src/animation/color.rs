//! Colors and the display palette.

use serde::{Deserialize, Serialize};

use crate::category::FlightCategory;

/// A 24-bit color. Serializes as `[r, g, b]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Unlit.
    pub const OFF: Self = Self(0, 0, 0);

    /// Scale every channel by `level / 256`, rounding down; 255 keeps the color.
    #[must_use]
    pub fn scale(self, level: u8) -> Self {
        let s = |c: u8| -> u8 {
            let scaled = (u16::from(c) * (u16::from(level) + 1)) >> 8;
            u8::try_from(scaled).unwrap_or(u8::MAX)
        };
        Self(s(self.0), s(self.1), s(self.2))
    }

    /// Whether the color is unlit.
    #[must_use]
    pub fn is_off(self) -> bool {
        self == Self::OFF
    }

    /// Channels as a tuple.
    #[must_use]
    pub fn to_tuple(self) -> (u8, u8, u8) {
        (self.0, self.1, self.2)
    }
}

/// A hue on a 256-step color wheel: red to green to blue and back to red.
#[must_use]
pub fn wheel(position: u8) -> Rgb {
    let pos = 255 - position;
    match pos {
        0..=84 => Rgb(255 - pos * 3, 0, pos * 3),
        85..=169 => {
            let pos = pos - 85;
            Rgb(0, pos * 3, 255 - pos * 3)
        }
        _ => {
            let pos = pos - 170;
            Rgb(pos * 3, 255 - pos * 3, 0)
        }
    }
}

/// Colors used for every display state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    /// VFR.
    pub vfr: Rgb,
    /// MVFR.
    pub mvfr: Rgb,
    /// IFR.
    pub ifr: Rgb,
    /// LIFR.
    pub lifr: Rgb,
    /// Bound slot without usable data.
    pub no_data: Rgb,
    /// High-wind warning.
    pub wind: Rgb,
    /// Thunderstorm flash.
    pub lightning: Rgb,
    /// Error pulse hue.
    pub alarm: Rgb,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            vfr: Rgb(0, 255, 0),
            mvfr: Rgb(0, 0, 255),
            ifr: Rgb(255, 0, 0),
            lifr: Rgb(255, 0, 255),
            no_data: Rgb(48, 48, 48),
            wind: Rgb(255, 255, 0),
            lightning: Rgb(255, 255, 255),
            alarm: Rgb(255, 0, 0),
        }
    }
}

impl Palette {
    /// Color for a flight category.
    #[must_use]
    pub fn category(&self, category: FlightCategory) -> Rgb {
        match category {
            FlightCategory::Vfr => self.vfr,
            FlightCategory::Mvfr => self.mvfr,
            FlightCategory::Ifr => self.ifr,
            FlightCategory::Lifr => self.lifr,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_full_keeps_color() {
        assert_eq!(Rgb(10, 128, 255).scale(255), Rgb(10, 128, 255));
    }

    #[test]
    fn test_scale_zero_is_off() {
        assert!(Rgb(255, 255, 255).scale(0).is_off());
    }

    #[test]
    fn test_scale_half() {
        assert_eq!(Rgb(255, 0, 100).scale(127), Rgb(127, 0, 50));
    }

    #[test]
    fn test_wheel_primaries() {
        assert_eq!(wheel(0), Rgb(255, 0, 0));
        assert_eq!(wheel(85), Rgb(0, 255, 0));
        assert_eq!(wheel(170), Rgb(0, 0, 255));
        assert_eq!(wheel(255), Rgb(255, 0, 0));
    }

    #[test]
    fn test_wheel_is_full_intensity() {
        for pos in 0..=255u8 {
            let Rgb(r, g, b) = wheel(pos);
            assert_eq!(u16::from(r) + u16::from(g) + u16::from(b), 255, "pos {pos}");
        }
    }

    #[test]
    fn test_palette_category() {
        let palette = Palette::default();
        assert_eq!(palette.category(FlightCategory::Vfr), Rgb(0, 255, 0));
        assert_eq!(palette.category(FlightCategory::Lifr), Rgb(255, 0, 255));
    }

    #[test]
    fn test_rgb_serializes_as_array() {
        assert_eq!(serde_json::to_string(&Rgb(1, 2, 3)).unwrap(), "[1,2,3]");
        let rgb: Rgb = serde_json::from_str("[4,5,6]").unwrap();
        assert_eq!(rgb, Rgb(4, 5, 6));
    }
}
