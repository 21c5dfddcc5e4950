//! Presentation options for rendering a mind map.
//!
//! [`StyleOptions`] is pure presentation: node radius, colors and font. It
//! never influences graph topology or node identity, and it is passed
//! explicitly into every render instead of living in shared mutable state.
//!
//! Options deserialize from the camelCase object used by the editing UI:
//!
//! ```text
//! { "nodeColor": "#3b82f6", "nodeSize": 20, "linkColor": "#8b5cf6",
//!   "fontFamily": "Arial", "fontSize": 12 }
//! ```

use std::{fmt, ops::RangeInclusive};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::color::Color;

/// Accepted node radii.
pub const NODE_SIZE_RANGE: RangeInclusive<f32> = 10.0..=40.0;

/// Accepted font sizes.
pub const FONT_SIZE_RANGE: RangeInclusive<u16> = 8..=24;

/// Font families offered for node labels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FontFamily {
    #[default]
    Arial,
    Helvetica,
    #[serde(rename = "Times New Roman")]
    TimesNewRoman,
    Courier,
}

impl FontFamily {
    /// The CSS / font-database family name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Arial => "Arial",
            Self::Helvetica => "Helvetica",
            Self::TimesNewRoman => "Times New Roman",
            Self::Courier => "Courier",
        }
    }
}

impl fmt::Display for FontFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Invalid style option.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StyleError {
    #[error("{field}: {message}")]
    InvalidColor { field: &'static str, message: String },

    #[error("nodeSize must be within {min}..={max}, got {value}", min = NODE_SIZE_RANGE.start(), max = NODE_SIZE_RANGE.end())]
    NodeSizeOutOfRange { value: f32 },

    #[error("fontSize must be within {min}..={max}, got {value}", min = FONT_SIZE_RANGE.start(), max = FONT_SIZE_RANGE.end())]
    FontSizeOutOfRange { value: u16 },
}

/// Visual styling for nodes, links and labels.
///
/// # Examples
///
/// ```
/// # use sketchmap_core::style::{FontFamily, StyleOptions};
/// let style = StyleOptions::default();
/// assert_eq!(style.node_size(), 20.0);
/// assert_eq!(style.font_family(), FontFamily::Arial);
/// assert!(style.validate().is_ok());
///
/// let style = style.with_node_size(80.0);
/// assert!(style.validate().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StyleOptions {
    node_color: String,
    node_size: f32,
    link_color: String,
    font_family: FontFamily,
    font_size: u16,
}

impl Default for StyleOptions {
    fn default() -> Self {
        Self {
            node_color: "#3b82f6".to_string(),
            node_size: 20.0,
            link_color: "#8b5cf6".to_string(),
            font_family: FontFamily::Arial,
            font_size: 12,
        }
    }
}

impl StyleOptions {
    /// Sets the node fill color (builder style).
    pub fn with_node_color(mut self, color: impl Into<String>) -> Self {
        self.node_color = color.into();
        self
    }

    /// Sets the node radius (builder style).
    pub fn with_node_size(mut self, size: f32) -> Self {
        self.node_size = size;
        self
    }

    /// Sets the link color (builder style).
    pub fn with_link_color(mut self, color: impl Into<String>) -> Self {
        self.link_color = color.into();
        self
    }

    /// Sets the label font family (builder style).
    pub fn with_font_family(mut self, family: FontFamily) -> Self {
        self.font_family = family;
        self
    }

    /// Sets the label font size (builder style).
    pub fn with_font_size(mut self, size: u16) -> Self {
        self.font_size = size;
        self
    }

    /// Node circle radius in canvas units
    pub fn node_size(&self) -> f32 {
        self.node_size
    }

    /// Returns the label font family.
    pub fn font_family(&self) -> FontFamily {
        self.font_family
    }

    /// Returns the label font size in pixels.
    pub fn font_size(&self) -> u16 {
        self.font_size
    }

    /// Parsed node fill color.
    ///
    /// # Errors
    ///
    /// Returns [`StyleError::InvalidColor`] when the configured value is not a hex color.
    pub fn node_color(&self) -> Result<Color, StyleError> {
        Color::from_hex(&self.node_color).map_err(|message| StyleError::InvalidColor {
            field: "nodeColor",
            message,
        })
    }

    /// Parsed link stroke color.
    ///
    /// # Errors
    ///
    /// Returns [`StyleError::InvalidColor`] when the configured value is not a hex color.
    pub fn link_color(&self) -> Result<Color, StyleError> {
        Color::from_hex(&self.link_color).map_err(|message| StyleError::InvalidColor {
            field: "linkColor",
            message,
        })
    }

    /// Checks every option, independently of any graph.
    ///
    /// # Errors
    ///
    /// Returns the first invalid option found.
    pub fn validate(&self) -> Result<(), StyleError> {
        self.node_color()?;
        self.link_color()?;
        if !NODE_SIZE_RANGE.contains(&self.node_size) {
            return Err(StyleError::NodeSizeOutOfRange {
                value: self.node_size,
            });
        }
        if !FONT_SIZE_RANGE.contains(&self.font_size) {
            return Err(StyleError::FontSizeOutOfRange {
                value: self.font_size,
            });
        }
        Ok(())
    }
}
