//! Colour parsing and conversion.
//!
//! Annotation and layer colours arrive as CSS-like strings. Styles work on
//! normalised RGB triples.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// An RGB colour with components in 0.0-1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    /// Stroke used for hovered and tool-highlighted annotations.
    pub const HOVER: Color = Color::rgb(1.0, 0.9, 0.9);

    pub const fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rgb`, `#rrggbb` or a basic CSS colour name.
    pub fn parse(text: &str) -> Result<Color, EngineError> {
        let trimmed = text.trim();
        if let Some(hex) = trimmed.strip_prefix('#') {
            return parse_hex(hex).ok_or_else(|| EngineError::invalid_color(text));
        }
        named_color(&trimmed.to_ascii_lowercase()).ok_or_else(|| EngineError::invalid_color(text))
    }

    /// Multiply every component by `factor`.
    pub fn scaled(self, factor: f64) -> Color {
        Color::rgb(self.r * factor, self.g * factor, self.b * factor)
    }

    /// Build a colour from hue (degrees), saturation and value.
    pub fn from_hsv(h: f64, s: f64, v: f64) -> Color {
        let (r, g, b) = hsv_to_rgb(h.rem_euclid(360.0), s, v);
        Color::rgb(r, g, b)
    }

    /// `#rrggbb` form.
    pub fn to_hex(&self) -> String {
        let channel = |c: f64| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!("#{:02x}{:02x}{:02x}", channel(self.r), channel(self.g), channel(self.b))
    }
}

fn parse_hex(hex: &str) -> Option<Color> {
    let digits: Vec<u8> = match hex.len() {
        3 => hex
            .chars()
            .map(|c| c.to_digit(16).map(|d| (d * 17) as u8))
            .collect::<Option<_>>()?,
        6 => (0..3)
            .map(|i| hex.get(i * 2..i * 2 + 2).and_then(|s| u8::from_str_radix(s, 16).ok()))
            .collect::<Option<_>>()?,
        _ => return None,
    };
    Some(Color::rgb(
        f64::from(digits[0]) / 255.0,
        f64::from(digits[1]) / 255.0,
        f64::from(digits[2]) / 255.0,
    ))
}

fn named_color(name: &str) -> Option<Color> {
    let rgb = match name {
        "black" => (0, 0, 0),
        "white" => (255, 255, 255),
        "red" => (255, 0, 0),
        "green" => (0, 128, 0),
        "lime" => (0, 255, 0),
        "blue" => (0, 0, 255),
        "yellow" => (255, 255, 0),
        "cyan" => (0, 255, 255),
        "magenta" => (255, 0, 255),
        "orange" => (255, 165, 0),
        "purple" => (128, 0, 128),
        "gray" | "grey" => (128, 128, 128),
        _ => return None,
    };
    Some(Color::rgb(
        f64::from(rgb.0) / 255.0,
        f64::from(rgb.1) / 255.0,
        f64::from(rgb.2) / 255.0,
    ))
}

/// Convert HSV to RGB.
///
/// # Arguments
/// * `h` - Hue in degrees (0-360)
/// * `s` - Saturation (0.0-1.0)
/// * `v` - Value/brightness (0.0-1.0)
fn hsv_to_rgb(h: f64, s: f64, v: f64) -> (f64, f64, f64) {
    let c = v * s;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = v - c;

    let (r, g, b) = match h {
        h if h < 60.0 => (c, x, 0.0),
        h if h < 120.0 => (x, c, 0.0),
        h if h < 180.0 => (0.0, c, x),
        h if h < 240.0 => (0.0, x, c),
        h if h < 300.0 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    (r + m, g + m, b + m)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Color, b: Color) -> bool {
        (a.r - b.r).abs() < 0.01 && (a.g - b.g).abs() < 0.01 && (a.b - b.b).abs() < 0.01
    }

    #[test]
    fn test_parse_hex() {
        assert_eq!(Color::parse("#ff0000").unwrap(), Color::rgb(1.0, 0.0, 0.0));
        assert_eq!(Color::parse("#0f0").unwrap(), Color::rgb(0.0, 1.0, 0.0));
        assert!(Color::parse("#12").is_err());
        assert!(Color::parse("#gg0000").is_err());
    }

    #[test]
    fn test_parse_named() {
        assert_eq!(Color::parse("White").unwrap(), Color::WHITE);
        assert!(matches!(
            Color::parse("not-a-colour"),
            Err(EngineError::InvalidColor { .. })
        ));
    }

    #[test]
    fn test_hsv_primaries() {
        assert!(close(Color::from_hsv(0.0, 1.0, 1.0), Color::rgb(1.0, 0.0, 0.0)));
        assert!(close(Color::from_hsv(120.0, 1.0, 1.0), Color::rgb(0.0, 1.0, 0.0)));
        assert!(close(Color::from_hsv(240.0, 1.0, 1.0), Color::rgb(0.0, 0.0, 1.0)));
        assert!(close(Color::from_hsv(480.0, 1.0, 1.0), Color::rgb(0.0, 1.0, 0.0)));
    }

    #[test]
    fn test_to_hex_round_trip() {
        let c = Color::parse("#336699").unwrap();
        assert_eq!(c.to_hex(), "#336699");
    }
}
