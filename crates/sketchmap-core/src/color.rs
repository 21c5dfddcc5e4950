//! Color handling for SketchMap styling
//!
//! This module provides the [`Color`] type which wraps the `DynamicColor` type
//! from the color crate. Style options carry colors as hex strings; they are
//! parsed once into a [`Color`] and converted to the representation each
//! exporter needs (hex for SVG, RGBA bytes for rasters).

use std::{
    fmt,
    hash::{Hash, Hasher},
    str::FromStr,
};

use color::{DynamicColor, Srgb};

/// Wrapper around the `DynamicColor` type from the color crate
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Color {
    color: DynamicColor,
}

impl Eq for Color {}

impl Hash for Color {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_rgba8().hash(state);
    }
}

impl Color {
    /// Create a new `Color` from a string
    /// This will parse CSS color strings such as "#ff0000", "rgb(255, 0, 0)", "red", etc.
    ///
    /// # Examples
    ///
    /// ```
    /// use sketchmap_core::color::Color;
    ///
    /// let red = Color::new("#ff0000").unwrap();
    /// let blue = Color::new("blue").unwrap();
    /// ```
    pub fn new(color_str: &str) -> Result<Self, String> {
        match DynamicColor::from_str(color_str) {
            Ok(color) => Ok(Self { color }),
            Err(err) => Err(format!("invalid color `{color_str}`: {err}")),
        }
    }

    /// Parse a strict hex color, `#rgb` or `#rrggbb`.
    ///
    /// Named colors and functional notations are rejected.
    ///
    /// # Examples
    ///
    /// ```
    /// use sketchmap_core::color::Color;
    ///
    /// assert!(Color::from_hex("#3b82f6").is_ok());
    /// assert!(Color::from_hex("#fff").is_ok());
    /// assert!(Color::from_hex("blue").is_err());
    /// assert!(Color::from_hex("#12345").is_err());
    /// ```
    pub fn from_hex(hex: &str) -> Result<Self, String> {
        let digits = hex
            .strip_prefix('#')
            .ok_or_else(|| format!("invalid hex color `{hex}`: missing `#` prefix"))?;
        if !matches!(digits.len(), 3 | 6) || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(format!(
                "invalid hex color `{hex}`: expected `#rgb` or `#rrggbb`"
            ));
        }
        Self::new(hex)
    }

    /// Returns the color as 8-bit sRGB components `[r, g, b, a]`.
    pub fn to_rgba8(self) -> [u8; 4] {
        let rgba = self.color.to_alpha_color::<Srgb>().to_rgba8();
        [rgba.r, rgba.g, rgba.b, rgba.a]
    }

    /// Returns the color as a lowercase `#rrggbb` string, alpha dropped.
    pub fn to_hex(self) -> String {
        let [r, g, b, _] = self.to_rgba8();
        format!("#{r:02x}{g:02x}{b:02x}")
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::new("black").expect("'black' is a valid CSS color")
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.color)
    }
}

impl From<Color> for svg::node::Value {
    fn from(color: Color) -> Self {
        Self::from(color.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_new() {
        assert!(Color::new("#ff0000").is_ok());
        assert!(Color::new("not-a-color").is_err());
    }

    #[test]
    fn test_color_from_hex_accepts_short_and_long() {
        assert_eq!(Color::from_hex("#fff").unwrap().to_hex(), "#ffffff");
        assert_eq!(Color::from_hex("#3B82F6").unwrap().to_hex(), "#3b82f6");
    }

    #[test]
    fn test_color_from_hex_rejects_other_notations() {
        assert!(Color::from_hex("red").is_err());
        assert!(Color::from_hex("rgb(1, 2, 3)").is_err());
        assert!(Color::from_hex("#ggg").is_err());
        assert!(Color::from_hex("3b82f6").is_err());
    }

    #[test]
    fn test_color_to_rgba8() {
        let color = Color::from_hex("#8b5cf6").unwrap();
        assert_eq!(color.to_rgba8(), [0x8b, 0x5c, 0xf6, 0xff]);
    }

    #[test]
    fn test_color_eq_hash() {
        use std::collections::HashSet;

        let color1 = Color::new("#ff0000").unwrap();
        let color2 = Color::new("#ff0000").unwrap();
        let color3 = Color::new("#0000ff").unwrap();

        assert_eq!(color1, color2);
        assert_ne!(color1, color3);

        let mut set = HashSet::new();
        set.insert(color1);
        assert!(set.contains(&color2));
        assert!(!set.contains(&color3));
    }
}
