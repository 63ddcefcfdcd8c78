use std::fmt;

use serde::Deserialize;

use crate::error::ConfigError;

/// Linear RGBA color with components in [0, 1].
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(try_from = "String")]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const TRANSPARENT: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 0.0,
    };

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Color { r, g, b, a: 1.0 }
    }

    pub fn from_hex(hex: u32) -> Self {
        let r = ((hex >> 16) & 0xff) as f32 / 255.0;
        let g = ((hex >> 8) & 0xff) as f32 / 255.0;
        let b = (hex & 0xff) as f32 / 255.0;
        Color::rgb(r, g, b)
    }

    /// `hue` in degrees, `saturation` and `lightness` in [0, 1].
    pub fn from_hsl(hue: f32, saturation: f32, lightness: f32) -> Self {
        let h = hue.rem_euclid(360.0) / 60.0;
        let c = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
        let x = c * (1.0 - (h % 2.0 - 1.0).abs());
        let (r, g, b) = match h as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };
        let m = lightness - c / 2.0;
        Color::rgb(r + m, g + m, b + m)
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Color { a, ..self }
    }

    /// Scale the color channels, keeping alpha.
    pub fn scaled(self, k: f32) -> Color {
        Color {
            r: self.r * k,
            g: self.g * k,
            b: self.b * k,
            a: self.a,
        }
    }

    pub fn lerp(self, other: Color, t: f32) -> Color {
        Color {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
            a: self.a + (other.a - self.a) * t,
        }
    }

    pub fn to_rgb_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }

    pub fn to_rgb8(self) -> (u8, u8, u8) {
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        (q(self.r), q(self.g), q(self.b))
    }

    /// CSS `rgba()` string with an explicit alpha.
    pub fn css_rgba(self, alpha: f32) -> String {
        let (r, g, b) = self.to_rgb8();
        format!("rgba({r}, {g}, {b}, {alpha})")
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (r, g, b) = self.to_rgb8();
        write!(f, "#{r:02x}{g:02x}{b:02x}")
    }
}

impl TryFrom<String> for Color {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let digits = value
            .strip_prefix('#')
            .filter(|d| d.len() == 6 && d.bytes().all(|b| b.is_ascii_hexdigit()))
            .ok_or_else(|| ConfigError::Color(value.clone()))?;
        let hex = u32::from_str_radix(digits, 16).map_err(|_| ConfigError::Color(value.clone()))?;
        Ok(Color::from_hex(hex))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_round_trips_through_display() {
        assert_eq!(Color::from_hex(0x00b4d8).to_string(), "#00b4d8");
        assert_eq!(Color::try_from("#4361ee".to_string()).unwrap().to_rgb8(), (0x43, 0x61, 0xee));
    }

    #[test]
    fn rejects_malformed_hex() {
        assert!(Color::try_from("4361ee".to_string()).is_err());
        assert!(Color::try_from("#4361e".to_string()).is_err());
        assert!(Color::try_from("#zz61ee".to_string()).is_err());
        assert!(Color::try_from("#+12345".to_string()).is_err());
        assert!(Color::try_from("#-12345".to_string()).is_err());
    }

    #[test]
    fn hsl_primaries() {
        assert_eq!(Color::from_hsl(0.0, 1.0, 0.5).to_rgb8(), (255, 0, 0));
        assert_eq!(Color::from_hsl(120.0, 1.0, 0.5).to_rgb8(), (0, 255, 0));
        assert_eq!(Color::from_hsl(240.0, 1.0, 0.5).to_rgb8(), (0, 0, 255));
        // hsl(271, 100%, 70%)
        assert_eq!(Color::from_hsl(271.0, 1.0, 0.7).to_rgb8(), (181, 102, 255));
    }
}
