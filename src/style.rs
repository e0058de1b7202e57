//! Style vocabulary shared by tools, objects, and the rasterizer.
//!
//! Everything here is a plain value supplied by the host toolbar. The
//! concrete pixel meaning of each tier lives next to its enum so the editor
//! and the rasterizer can never disagree.

#[cfg(test)]
#[path = "style_test.rs"]
mod style_test;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MarkupError;

/// An RGBA color, serialized as `#rrggbb` (opaque) or `#rrggbbaa`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    #[must_use]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Same color with its alpha scaled by `opacity` (0.0..=1.0).
    #[must_use]
    pub fn with_opacity(self, opacity: f32) -> Self {
        let scaled = (f32::from(self.a) * opacity.clamp(0.0, 1.0)).round();
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let a = scaled as u8;
        Self { a, ..self }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl FromStr for Color {
    type Err = MarkupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || MarkupError::InvalidColor(s.to_owned());
        let hex = s.strip_prefix('#').ok_or_else(invalid)?;
        if !hex.is_ascii() || !(hex.len() == 6 || hex.len() == 8) {
            return Err(invalid());
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
        let a = if hex.len() == 8 { channel(6)? } else { 255 };
        Ok(Self { r: channel(0)?, g: channel(2)?, b: channel(4)?, a })
    }
}

impl TryFrom<String> for Color {
    type Error = MarkupError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

/// The three box-tool colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoxColor {
    Red,
    Blue,
    /// Neutral color; the only one that asks for a label on commit.
    Gray,
}

impl BoxColor {
    /// Concrete paint color.
    #[must_use]
    pub fn color(self) -> Color {
        match self {
            Self::Red => Color::rgb(0xEF, 0x44, 0x44),
            Self::Blue => Color::rgb(0x3B, 0x82, 0xF6),
            Self::Gray => Color::rgb(0x6B, 0x72, 0x80),
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Blue => "blue",
            Self::Gray => "gray",
        }
    }

    /// Whether committing a box of this color solicits a label.
    #[must_use]
    pub fn wants_label(self) -> bool {
        self == Self::Gray
    }
}

/// Size tier for boxes, stamps, and text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeTier {
    Small,
    #[default]
    Medium,
    Large,
}

impl SizeTier {
    /// Box outline stroke width in pixels.
    #[must_use]
    pub fn box_stroke_width(self) -> f32 {
        match self {
            Self::Small => 2.0,
            Self::Medium => 3.0,
            Self::Large => 4.0,
        }
    }

    /// Stamp diameter-equivalent in pixels.
    #[must_use]
    pub fn stamp_px(self) -> f64 {
        match self {
            Self::Small => 18.0,
            Self::Medium => 24.0,
            Self::Large => 36.0,
        }
    }

    /// Text font size in pixels.
    #[must_use]
    pub fn font_px(self) -> f64 {
        match self {
            Self::Small => 14.0,
            Self::Medium => 18.0,
            Self::Large => 24.0,
        }
    }
}

/// Stamp glyph shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StampShape {
    #[default]
    Circle,
    Square,
    Triangle,
    Star,
}

/// Box outline style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoxShape {
    #[default]
    Rectangle,
    Rounded,
    Ellipse,
}
