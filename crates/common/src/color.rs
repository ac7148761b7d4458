use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Linear RGB color used for node and edge tinting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

/// Error parsing a `#rrggbb` hex string.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseColorError {
    #[error("expected '#rrggbb', got {0:?}")]
    BadFormat(String),
    #[error("invalid hex digits in {0:?}")]
    BadDigits(String),
}

impl Color {
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Parse a `#rrggbb` hex string into a color with components in [0, 1].
    pub fn from_hex(hex: &str) -> Result<Self, ParseColorError> {
        let digits = hex
            .strip_prefix('#')
            .ok_or_else(|| ParseColorError::BadFormat(hex.to_string()))?;
        if digits.len() != 6 {
            return Err(ParseColorError::BadFormat(hex.to_string()));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16)
                .map(|v| v as f32 / 255.0)
                .map_err(|_| ParseColorError::BadDigits(hex.to_string()))
        };
        Ok(Self {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }

    /// Linear interpolation between two colors, `t` clamped to [0, 1].
    pub fn lerp(self, other: Color, t: f32) -> Color {
        let t = t.clamp(0.0, 1.0);
        Color {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
        }
    }

    /// RGBA array with the given alpha, ready for vertex upload.
    pub fn with_alpha(self, a: f32) -> [f32; 4] {
        [self.r, self.g, self.b, a]
    }

    pub fn is_finite(self) -> bool {
        self.r.is_finite() && self.g.is_finite() && self.b.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_hex_parses_channels() {
        let c = Color::from_hex("#ff8000").unwrap();
        assert!((c.r - 1.0).abs() < 1e-6);
        assert!((c.g - 128.0 / 255.0).abs() < 1e-6);
        assert!((c.b - 0.0).abs() < 1e-6);
    }

    #[test]
    fn from_hex_rejects_bad_input() {
        assert!(matches!(
            Color::from_hex("ff8000"),
            Err(ParseColorError::BadFormat(_))
        ));
        assert!(matches!(
            Color::from_hex("#ff80"),
            Err(ParseColorError::BadFormat(_))
        ));
        assert!(matches!(
            Color::from_hex("#zzzzzz"),
            Err(ParseColorError::BadDigits(_))
        ));
    }

    #[test]
    fn lerp_endpoints_and_clamp() {
        let a = Color::rgb(0.0, 0.0, 0.0);
        let b = Color::rgb(1.0, 1.0, 1.0);
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
        assert_eq!(a.lerp(b, 2.0), b);
        let mid = a.lerp(b, 0.5);
        assert!((mid.r - 0.5).abs() < 1e-6);
    }

    #[test]
    fn with_alpha_packs_rgba() {
        let c = Color::rgb(0.1, 0.2, 0.3);
        assert_eq!(c.with_alpha(0.4), [0.1, 0.2, 0.3, 0.4]);
    }
}
