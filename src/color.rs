//! Background colors and the built-in reading palette

use std::fmt;
use std::str::FromStr;
use crate::error::{Error, Result};

/// A 24-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Rgb {
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Parse a color written as exactly six hex digits, e.g. `F7F1E4`.
    ///
    /// Case-insensitive. A leading `#` is not accepted here; callers taking
    /// user input from a color picker strip it first.
    pub fn from_hex(input: &str) -> Result<Self> {
        let invalid = || Error::InvalidColor { input: input.to_string() };

        if input.len() != 6 || !input.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&input[range], 16).map_err(|_| invalid())
        };

        Ok(Self {
            red: channel(0..2)?,
            green: channel(2..4)?,
            blue: channel(4..6)?,
        })
    }

    /// Channel values scaled to the 0.0..=1.0 range used by the `rg` operator
    pub fn components(&self) -> [f32; 3] {
        [
            f32::from(self.red) / 255.0,
            f32::from(self.green) / 255.0,
            f32::from(self.blue) / 255.0,
        ]
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Preset::ClassicYellow.color()
    }
}

impl FromStr for Rgb {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02X}{:02X}{:02X}", self.red, self.green, self.blue)
    }
}

/// Named background colors offered by the tool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    MediumGrey,
    ClassicYellow,
    SoftCream,
    WarmSand,
    CoolMint,
    GentleBlue,
    BlushPink,
}

impl Preset {
    /// All presets in palette order
    pub const ALL: [Preset; 7] = [
        Preset::MediumGrey,
        Preset::ClassicYellow,
        Preset::SoftCream,
        Preset::WarmSand,
        Preset::CoolMint,
        Preset::GentleBlue,
        Preset::BlushPink,
    ];

    /// Palette number, as printed on the color chart
    pub fn number(self) -> u8 {
        match self {
            Preset::MediumGrey => 1,
            Preset::ClassicYellow => 2,
            Preset::SoftCream => 3,
            Preset::WarmSand => 4,
            Preset::CoolMint => 5,
            Preset::GentleBlue => 6,
            Preset::BlushPink => 7,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Preset::MediumGrey => "medium-grey",
            Preset::ClassicYellow => "classic-yellow",
            Preset::SoftCream => "soft-cream",
            Preset::WarmSand => "warm-sand",
            Preset::CoolMint => "cool-mint",
            Preset::GentleBlue => "gentle-blue",
            Preset::BlushPink => "blush-pink",
        }
    }

    pub fn color(self) -> Rgb {
        match self {
            Preset::MediumGrey => Rgb::new(0xBF, 0xBA, 0xB7),
            Preset::ClassicYellow => Rgb::new(0xF7, 0xF1, 0xE4),
            Preset::SoftCream => Rgb::new(0xFD, 0xFA, 0xF1),
            Preset::WarmSand => Rgb::new(0xF5, 0xE6, 0xD3),
            Preset::CoolMint => Rgb::new(0xF1, 0xF7, 0xED),
            Preset::GentleBlue => Rgb::new(0xF0, 0xF5, 0xFA),
            Preset::BlushPink => Rgb::new(0xFF, 0xF0, 0xF0),
        }
    }
}

impl FromStr for Preset {
    type Err = Error;

    /// Accepts either the palette number ("2") or the name ("classic-yellow")
    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase().replace(|c: char| c == '_' || c == ' ', "-");
        Preset::ALL
            .into_iter()
            .find(|p| p.name() == wanted || p.number().to_string() == wanted)
            .ok_or_else(|| Error::General(format!(
                "Unknown preset {:?} (run `pdf-readability presets` for the list)",
                s
            )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_hex() {
        let color = Rgb::from_hex("F7F1E4").unwrap();
        assert_eq!(color, Rgb::new(0xF7, 0xF1, 0xE4));

        let lower = Rgb::from_hex("bfbab7").unwrap();
        assert_eq!(lower, Rgb::new(0xBF, 0xBA, 0xB7));
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        for input in ["ZZZZZZ", "ABC", "", "F7F1E4A", "#F7F1E", "#F7F1E4", "F7 1E4", "ééé"] {
            let result = Rgb::from_hex(input);
            assert!(
                matches!(result, Err(Error::InvalidColor { .. })),
                "{:?} should be rejected",
                input
            );
        }
    }

    #[test]
    fn test_display_is_uppercase_hex() {
        assert_eq!(Rgb::new(0xfd, 0xfa, 0xf1).to_string(), "FDFAF1");
        assert_eq!(Rgb::new(0, 1, 2).to_string(), "000102");
    }

    #[test]
    fn test_components_scale() {
        let [r, g, b] = Rgb::new(255, 0, 51).components();
        assert_eq!(r, 1.0);
        assert_eq!(g, 0.0);
        assert!((b - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_default_is_classic_yellow() {
        assert_eq!(Rgb::default().to_string(), "F7F1E4");
    }

    #[test]
    fn test_preset_lookup() {
        assert_eq!("1".parse::<Preset>().unwrap(), Preset::MediumGrey);
        assert_eq!("cool-mint".parse::<Preset>().unwrap(), Preset::CoolMint);
        assert_eq!("Blush_Pink".parse::<Preset>().unwrap(), Preset::BlushPink);
        assert!("8".parse::<Preset>().is_err());
        assert!("mauve".parse::<Preset>().is_err());
    }

    #[test]
    fn test_presets_are_numbered_in_order() {
        for (i, preset) in Preset::ALL.iter().enumerate() {
            assert_eq!(preset.number() as usize, i + 1);
        }
    }
}
