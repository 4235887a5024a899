//! Canonical color table for the pixel strip
//!
//! Values are plain RGB. The order the bytes travel on the data line is a
//! property of the strip (`PixelOrder`) and is applied only when encoding.

use serde::{Deserialize, Serialize};

/// Named colors the robot understands
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Color {
    Red,
    Green,
    Blue,
    White,
    Yellow,
    Purple,
    Orange,
    Off,
}

impl Color {
    pub const ALL: [Color; 8] = [
        Color::Off,
        Color::Red,
        Color::Green,
        Color::Blue,
        Color::White,
        Color::Yellow,
        Color::Purple,
        Color::Orange,
    ];

    /// Resolve a color name, rendering anything unrecognized as white
    pub fn from_name(name: &str) -> Self {
        Self::lookup(name).unwrap_or(Color::White)
    }

    /// Resolve a color name without a fallback
    pub fn lookup(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "red" => Some(Color::Red),
            "green" => Some(Color::Green),
            "blue" => Some(Color::Blue),
            "white" => Some(Color::White),
            "yellow" => Some(Color::Yellow),
            "purple" => Some(Color::Purple),
            "orange" => Some(Color::Orange),
            "off" => Some(Color::Off),
            _ => None,
        }
    }

    pub fn rgb(&self) -> (u8, u8, u8) {
        match self {
            Color::Red => (255, 0, 0),
            Color::Green => (0, 255, 0),
            Color::Blue => (0, 0, 255),
            Color::White => (255, 255, 255),
            Color::Yellow => (255, 255, 0),
            Color::Purple => (255, 0, 255),
            Color::Orange => (255, 165, 0),
            Color::Off => (0, 0, 0),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Color::Red => "red",
            Color::Green => "green",
            Color::Blue => "blue",
            Color::White => "white",
            Color::Yellow => "yellow",
            Color::Purple => "purple",
            Color::Orange => "orange",
            Color::Off => "off",
        }
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Byte order a strip expects on its data line
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PixelOrder {
    /// WS2812/NeoPixel default
    #[default]
    Grb,
    Rgb,
}

impl PixelOrder {
    pub fn arrange(&self, (r, g, b): (u8, u8, u8)) -> [u8; 3] {
        match self {
            PixelOrder::Grb => [g, r, b],
            PixelOrder::Rgb => [r, g, b],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert_eq!(Color::from_name("Blue"), Color::Blue);
        assert_eq!(Color::from_name("  OFF "), Color::Off);
    }

    #[test]
    fn test_unknown_color_renders_white() {
        assert_eq!(Color::from_name("chartreuse"), Color::White);
        assert_eq!(Color::lookup("chartreuse"), None);
    }

    #[test]
    fn test_red_and_green_are_not_transposed() {
        assert_eq!(Color::Red.rgb(), (255, 0, 0));
        assert_eq!(Color::Green.rgb(), (0, 255, 0));
        assert_eq!(PixelOrder::Grb.arrange(Color::Red.rgb()), [0, 255, 0]);
        assert_eq!(PixelOrder::Rgb.arrange(Color::Red.rgb()), [255, 0, 0]);
    }

    #[test]
    fn test_names_round_trip_through_lookup() {
        for color in Color::ALL {
            assert_eq!(Color::lookup(color.name()), Some(color));
        }
    }
}
