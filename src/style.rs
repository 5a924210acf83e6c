use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors produced when parsing a `#rrggbb` / `#rrggbbaa` color string.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ColorParseError {
    #[error("color must start with '#': {0:?}")]
    MissingHash(String),

    #[error("color must have 6 or 8 hex digits: {0:?}")]
    BadLength(String),

    #[error("invalid hex digits in color: {0:?}")]
    BadDigits(String),
}

/// An sRGB color with straight (non-premultiplied) alpha.
///
/// On the wire a color is a CSS-style hex string, `#rrggbb` when opaque and
/// `#rrggbbaa` otherwise.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }

    pub fn to_color32(self) -> egui::Color32 {
        egui::Color32::from_rgba_unmultiplied(self.r, self.g, self.b, self.a)
    }

    pub fn from_color32(color: egui::Color32) -> Self {
        let [r, g, b, a] = color.to_srgba_unmultiplied();
        Self { r, g, b, a }
    }

    pub fn to_skia(self) -> tiny_skia::Color {
        tiny_skia::Color::from_rgba8(self.r, self.g, self.b, self.a)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s
            .strip_prefix('#')
            .ok_or_else(|| ColorParseError::MissingHash(s.to_owned()))?;
        if !hex.is_ascii() || (hex.len() != 6 && hex.len() != 8) {
            return Err(ColorParseError::BadLength(s.to_owned()));
        }

        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|_| ColorParseError::BadDigits(s.to_owned()))
        };

        let a = if hex.len() == 8 { channel(6)? } else { 255 };
        Ok(Self {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
            a,
        })
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// The font families offered by the text tool.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FontFamily {
    #[default]
    Arial,
    Courier,
    #[serde(rename = "Times New Roman")]
    TimesNewRoman,
    #[serde(rename = "Comic Sans MS")]
    ComicSansMS,
}

impl FontFamily {
    pub const ALL: [FontFamily; 4] = [
        FontFamily::Arial,
        FontFamily::Courier,
        FontFamily::TimesNewRoman,
        FontFamily::ComicSansMS,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            FontFamily::Arial => "Arial",
            FontFamily::Courier => "Courier",
            FontFamily::TimesNewRoman => "Times New Roman",
            FontFamily::ComicSansMS => "Comic Sans MS",
        }
    }

    pub fn is_monospace(&self) -> bool {
        matches!(self, FontFamily::Courier)
    }
}

/// Text style snapshot. Copied by value into every text action, so changing
/// the editor's current style never alters text that is already committed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FontStyle {
    pub family: FontFamily,
    /// Size in pixels, always positive.
    pub size: u32,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    #[serde(default)]
    pub underline: bool,
}

impl FontStyle {
    pub const MIN_SIZE: u32 = 1;
    pub const MAX_SIZE: u32 = 512;
    /// Sizes the renderer will rasterize
    pub const SIZE_RANGE: std::ops::RangeInclusive<u32> = Self::MIN_SIZE..=Self::MAX_SIZE;

    /// Copy with `size` clamped into [`FontStyle::SIZE_RANGE`].
    pub fn with_size(mut self, size: u32) -> Self {
        self.size = size.clamp(Self::MIN_SIZE, Self::MAX_SIZE);
        self
    }

    /// CSS-like font descriptor, e.g. `"bold italic 16px Arial"`.
    pub fn descriptor(&self) -> String {
        let mut out = String::new();
        if self.bold {
            out.push_str("bold ");
        }
        if self.italic {
            out.push_str("italic ");
        }
        out.push_str(&format!("{}px {}", self.size, self.family.name()));
        out
    }
}

impl Default for FontStyle {
    fn default() -> Self {
        Self {
            family: FontFamily::Arial,
            size: 16,
            bold: false,
            italic: false,
            underline: false,
        }
    }
}
