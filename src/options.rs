//! Rendering and encoding options.

use crate::color::Color;

/// Styling and sizing for a rendered QR code image.
///
/// # Example
///
/// ```rust
/// use qirust_raster::options::ImageOptions;
///
/// let options = ImageOptions::default()
///     .with_fill_color("navy")
///     .with_back_color([255, 255, 224])
///     .with_box_size(6);
/// assert_eq!(options.border, 4);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(default))]
pub struct ImageOptions {
    pub fill_color: Color,
    pub back_color: Color,
    /// Pixels per module edge.
    pub box_size: u32,
    /// Quiet zone around the symbol, in modules.
    pub border: u32,
}

impl Default for ImageOptions {
    fn default() -> Self {
        Self {
            fill_color: Color::from("black"),
            back_color: Color::from("white"),
            box_size: 10,
            border: 4,
        }
    }
}

impl ImageOptions {
    pub fn with_fill_color(mut self, color: impl Into<Color>) -> Self {
        self.fill_color = color.into();
        self
    }

    pub fn with_back_color(mut self, color: impl Into<Color>) -> Self {
        self.back_color = color.into();
        self
    }

    pub fn with_box_size(mut self, box_size: u32) -> Self {
        self.box_size = box_size;
        self
    }

    pub fn with_border(mut self, border: u32) -> Self {
        self.border = border;
        self
    }
}

/// PNG compression effort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Compression {
    #[default]
    Default,
    Fast,
    Best,
}

/// Options handed to the encoder. Formats ignore the options that do not apply to them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(default))]
pub struct EncoderOptions {
    /// JPEG quality, 1 to 100. Defaults to 75.
    pub quality: Option<u8>,
    /// PNG compression.
    pub compression: Compression,
}

/// Options for [`ModuleRasterizer::save`](crate::rasterizer::ModuleRasterizer::save).
///
/// `kind` overrides the rasterizer's default format name and is consumed before the remaining
/// options reach the encoder.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(default))]
pub struct SaveOptions {
    pub kind: Option<String>,
    pub encoder: EncoderOptions,
}

impl SaveOptions {
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn with_quality(mut self, quality: u8) -> Self {
        self.encoder.quality = Some(quality);
        self
    }

    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.encoder.compression = compression;
        self
    }
}
