//! Colors accepted by the rasterizer and the rule that picks the canvas color mode.

use crate::error::{Error, Result};

/// A fill or background color.
///
/// `Named` holds a case-insensitive CSS color string: any of the CSS named colors (`"black"`,
/// `"darkblue"`, `"transparent"`), a hex literal (`#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`), or a
/// functional form such as `rgb(0, 0, 128)`, `rgb(100%, 0%, 0%)`, `hsl(...)` or `hsv(...)`. The
/// other variants are forwarded to the canvas unchanged.
///
/// # Example
///
/// ```rust
/// use qirust_raster::color::Color;
///
/// assert_eq!(Color::from("Black").normalized(), Color::Named("black".into()));
/// assert_eq!(Color::from("#FFA500").to_rgba().unwrap(), [255, 165, 0, 255]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(untagged))]
pub enum Color {
    Named(String),
    Luma(u8),
    Rgb([u8; 3]),
    Rgba([u8; 4]),
}

impl Color {
    /// Lower-cases textual colors; other values are returned as is.
    pub fn normalized(self) -> Self {
        match self {
            Color::Named(name) => Color::Named(name.to_lowercase()),
            other => other,
        }
    }

    /// Returns `true` if this is the named color `name` (compared case-insensitively).
    pub fn is_named(&self, name: &str) -> bool {
        matches!(self, Color::Named(n) if n.eq_ignore_ascii_case(name))
    }

    /// Resolves this color to an RGBA pixel value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownColor`] if a named color is not a valid CSS color.
    pub fn to_rgba(&self) -> Result<[u8; 4]> {
        match self {
            Color::Named(name) => csscolorparser::parse(name.trim())
                .map(|color| color.to_rgba8())
                .map_err(|_| Error::UnknownColor(name.to_string())),
            Color::Luma(l) => Ok([*l, *l, *l, 255]),
            Color::Rgb([r, g, b]) => Ok([*r, *g, *b, 255]),
            Color::Rgba(rgba) => Ok(*rgba),
        }
    }
}

impl From<&str> for Color {
    fn from(name: &str) -> Self {
        Color::Named(name.to_string())
    }
}

impl From<String> for Color {
    fn from(name: String) -> Self {
        Color::Named(name)
    }
}

impl From<u8> for Color {
    fn from(luma: u8) -> Self {
        Color::Luma(luma)
    }
}

impl From<[u8; 3]> for Color {
    fn from(rgb: [u8; 3]) -> Self {
        Color::Rgb(rgb)
    }
}

impl From<[u8; 4]> for Color {
    fn from(rgba: [u8; 4]) -> Self {
        Color::Rgba(rgba)
    }
}

/// The pixel layout of a canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
    /// Black and white only. Stored as 8-bit luma holding 0 or 255.
    Bilevel,
    /// Full color without alpha.
    Rgb,
    /// Full color with an alpha channel.
    Rgba,
}

impl ColorMode {
    /// Converts an RGBA value to the pixel stored by a canvas of this mode, as RGBA.
    pub(crate) fn quantize(self, [r, g, b, a]: [u8; 4]) -> [u8; 4] {
        match self {
            ColorMode::Bilevel => {
                // L = (r*299 + g*587 + b*114) / 1000, then thresholded.
                let luma = (u32::from(r) * 299 + u32::from(g) * 587 + u32::from(b) * 114) / 1000;
                let bit = if luma < 128 { 0 } else { 255 };
                [bit, bit, bit, 255]
            }
            ColorMode::Rgb => [r, g, b, 255],
            ColorMode::Rgba => [r, g, b, a],
        }
    }
}

/// Colors after mode selection, as they will be painted on the canvas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedColors {
    pub mode: ColorMode,
    pub fill: Color,
    /// `None` means the canvas starts transparent and background fills are skipped.
    pub back: Option<Color>,
}

/// Picks the canvas mode for a fill/background pair.
///
/// Black on white degrades to [`ColorMode::Bilevel`] with fill `Luma(0)` and background
/// `Luma(255)`. A `"transparent"` background selects [`ColorMode::Rgba`] with no background fill.
/// Anything else is [`ColorMode::Rgb`] with both colors passed through, names lower-cased.
pub fn select_mode(fill: Color, back: Color) -> ResolvedColors {
    let fill = fill.normalized();
    let back = back.normalized();

    if fill.is_named("black") && back.is_named("white") {
        ResolvedColors {
            mode: ColorMode::Bilevel,
            fill: Color::Luma(0),
            back: Some(Color::Luma(255)),
        }
    } else if back.is_named("transparent") {
        ResolvedColors { mode: ColorMode::Rgba, fill, back: None }
    } else {
        ResolvedColors { mode: ColorMode::Rgb, fill, back: Some(back) }
    }
}
