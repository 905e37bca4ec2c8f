//! Draws a module matrix onto an in-memory bitmap and encodes it.

use std::io::{Seek, Write};

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{
    DynamicImage, GenericImageView, GrayImage, ImageBuffer, ImageFormat, Luma, Pixel, Rgb, RgbImage,
    Rgba, RgbaImage,
};
use tracing::{debug, trace};

use crate::color::{select_mode, Color, ColorMode};
use crate::error::{Error, Result};
use crate::geometry::{Layout, PixelBox};
use crate::matrix::{Cell, Matrix};
use crate::options::{Compression, ImageOptions, SaveOptions};

/// Colors resolved at canvas creation, kept for the lifetime of one render.
#[derive(Debug, Clone)]
struct RenderState {
    fill_color: Color,
    back_color: Option<Color>,
    fill: [u8; 4],
    back: Option<[u8; 4]>,
}

/// Rasterizes QR code modules onto a square canvas.
///
/// The canvas is created by [`ModuleRasterizer::initialize_canvas`]; modules are then drawn one at
/// a time and the result is encoded with [`ModuleRasterizer::save`].
///
/// # Example
///
/// ```rust
/// use qirust_raster::geometry::Layout;
/// use qirust_raster::options::{ImageOptions, SaveOptions};
/// use qirust_raster::rasterizer::ModuleRasterizer;
///
/// let layout = Layout::new(21, 4, 2).unwrap();
/// let mut raster = ModuleRasterizer::initialize_canvas(layout, &ImageOptions::default()).unwrap();
/// raster.draw_module(0, 0);
///
/// let mut out = std::io::Cursor::new(Vec::new());
/// raster.save(&mut out, None, SaveOptions::default()).unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct ModuleRasterizer {
    layout: Layout,
    mode: ColorMode,
    state: RenderState,
    image: DynamicImage,
}

impl ModuleRasterizer {
    /// The format used by [`save`](Self::save) when neither a format nor a kind is given.
    pub const KIND: &'static str = "PNG";

    /// Creates the canvas for `layout`, filled with the background color.
    ///
    /// Black on white produces a bilevel canvas, a `"transparent"` background produces an RGBA
    /// canvas left fully transparent, and anything else an RGB canvas.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownColor`] if either color cannot be parsed.
    pub fn initialize_canvas(layout: Layout, options: &ImageOptions) -> Result<Self> {
        let resolved = select_mode(options.fill_color.clone(), options.back_color.clone());
        let mode = resolved.mode;
        let fill = mode.quantize(resolved.fill.to_rgba()?);
        let back = match &resolved.back {
            Some(color) => Some(mode.quantize(color.to_rgba()?)),
            None => None,
        };

        let size = layout.pixel_size();
        let image = match (mode, back) {
            (ColorMode::Bilevel, Some(px)) => {
                DynamicImage::ImageLuma8(GrayImage::from_pixel(size, size, Luma([px[0]])))
            }
            (ColorMode::Rgb, Some(px)) => {
                let px = Rgb([px[0], px[1], px[2]]);
                DynamicImage::ImageRgb8(RgbImage::from_pixel(size, size, px))
            }
            (ColorMode::Rgba, Some(px)) => {
                DynamicImage::ImageRgba8(RgbaImage::from_pixel(size, size, Rgba(px)))
            }
            (ColorMode::Bilevel, None) => DynamicImage::ImageLuma8(GrayImage::new(size, size)),
            (ColorMode::Rgb, None) => DynamicImage::ImageRgb8(RgbImage::new(size, size)),
            (ColorMode::Rgba, None) => DynamicImage::ImageRgba8(RgbaImage::new(size, size)),
        };
        debug!(?mode, size, fill = ?resolved.fill, back = ?resolved.back, "created QR code canvas");

        Ok(Self {
            layout,
            mode,
            state: RenderState {
                fill_color: resolved.fill,
                back_color: resolved.back,
                fill,
                back,
            },
            image,
        })
    }

    /// Fills the box of the module at `(row, col)` with the fill color.
    pub fn draw_module(&mut self, row: usize, col: usize) {
        let area = self.layout.pixel_box(row, col);
        trace!(row, col, ?area, "drawing module");
        let fill = self.state.fill;
        self.fill_rect(area, fill);
    }

    /// Draws the module at `(row, col)` according to its styled cell in `matrix`.
    ///
    /// Dark cells fill the whole box. [`Cell::StyledHole`] fills the box and then punches a
    /// background-colored dot in its center; [`Cell::StyledDot`] draws only a fill-colored dot and
    /// leaves the rest of the box as it is. Light or missing cells draw nothing.
    pub fn draw_module_styled(&mut self, row: usize, col: usize, matrix: &Matrix) {
        let dot_size = self.dot_size();
        match matrix.get(row, col).unwrap_or_default() {
            Cell::Dark => self.draw_module(row, col),
            Cell::StyledHole => {
                if matrix.debug() {
                    debug!(row, col, "drawing white in black");
                }
                let area = self.layout.pixel_box(row, col);
                let fill = self.state.fill;
                self.fill_rect(area, fill);
                let dot = area.small_rect(dot_size, dot_size);
                if let (Some(dot), Some(back)) = (dot, self.state.back) {
                    self.fill_rect(dot, back);
                }
            }
            Cell::StyledDot => {
                if matrix.debug() {
                    debug!(row, col, "drawing black in white");
                }
                let area = self.layout.pixel_box(row, col);
                if let Some(dot) = area.small_rect(dot_size, dot_size) {
                    let fill = self.state.fill;
                    self.fill_rect(dot, fill);
                }
            }
            Cell::Light => {}
        }
    }

    /// Encodes the image into `sink`.
    ///
    /// # Arguments
    ///
    /// * `sink` - Where the encoded bytes are written.
    /// * `format` - Optional. The format name, e.g. `"PNG"` or `"jpeg"`. Defaults to the kind.
    /// * `options` - `kind` replaces [`Self::KIND`] as the default format; the encoder options are
    ///   passed to the encoder.
    ///
    /// Returns the format that was written.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownFormat`] for a name the image crate does not know,
    /// [`Error::DependencyMissing`] when that format's encoder is not compiled in, and
    /// [`Error::Image`] when encoding fails.
    pub fn save<W: Write + Seek>(
        &self,
        sink: &mut W,
        format: Option<&str>,
        options: SaveOptions,
    ) -> Result<ImageFormat> {
        let SaveOptions { kind, encoder } = options;
        let kind = kind.unwrap_or_else(|| Self::KIND.to_string());
        let name = format.map(str::to_string).unwrap_or(kind);
        let format = resolve_format(&name)?;
        debug!(?format, mode = ?self.mode, "encoding QR code image");

        match format {
            ImageFormat::Jpeg => {
                let quality = encoder.quality.unwrap_or(75);
                self.image.write_with_encoder(JpegEncoder::new_with_quality(sink, quality))?;
            }
            ImageFormat::Png => {
                let compression = match encoder.compression {
                    Compression::Default => CompressionType::Default,
                    Compression::Fast => CompressionType::Fast,
                    Compression::Best => CompressionType::Best,
                };
                let encoder = PngEncoder::new_with_quality(sink, compression, FilterType::Adaptive);
                self.image.write_with_encoder(encoder)?;
            }
            other => self.image.write_to(sink, other)?,
        }
        Ok(format)
    }

    /// The underlying image.
    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    pub fn into_image(self) -> DynamicImage {
        self.image
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn color_mode(&self) -> ColorMode {
        self.mode
    }

    /// The fill color after mode selection, e.g. `Luma(0)` for a bilevel canvas.
    pub fn fill_color(&self) -> &Color {
        &self.state.fill_color
    }

    /// The background color after mode selection, `None` for a transparent canvas.
    pub fn back_color(&self) -> Option<&Color> {
        self.state.back_color.as_ref()
    }

    /// Returns the pixel at `(x, y)` as RGBA, or `None` outside the canvas.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.image.in_bounds(x, y).then(|| self.image.get_pixel(x, y).0)
    }

    fn dot_size(&self) -> i32 {
        (self.layout.box_size() as i32 / 2).min(2)
    }

    fn fill_rect(&mut self, area: PixelBox, px: [u8; 4]) {
        match &mut self.image {
            DynamicImage::ImageLuma8(buf) => fill_buffer(buf, area, Luma([px[0]])),
            DynamicImage::ImageRgb8(buf) => fill_buffer(buf, area, Rgb([px[0], px[1], px[2]])),
            DynamicImage::ImageRgba8(buf) => fill_buffer(buf, area, Rgba(px)),
            _ => {}
        }
    }
}

/// Fills `area`, corners inclusive, clipped to the buffer.
fn fill_buffer<P: Pixel>(buf: &mut ImageBuffer<P, Vec<P::Subpixel>>, area: PixelBox, px: P) {
    let (width, height) = buf.dimensions();
    if width == 0 || height == 0 {
        return;
    }
    let x0 = area.x0.max(0);
    let y0 = area.y0.max(0);
    let x1 = area.x1.min(width as i32 - 1);
    let y1 = area.y1.min(height as i32 - 1);
    for y in y0..=y1 {
        for x in x0..=x1 {
            buf.put_pixel(x as u32, y as u32, px);
        }
    }
}

/// Looks up a format by name, e.g. `"PNG"`, `"jpg"` or `"Bmp"`.
pub fn resolve_format(name: &str) -> Result<ImageFormat> {
    let format = ImageFormat::from_extension(name.to_ascii_lowercase())
        .ok_or_else(|| Error::UnknownFormat(name.to_string()))?;
    if !format.writing_enabled() {
        return Err(Error::DependencyMissing(name.to_string()));
    }
    Ok(format)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    const WHITE: [u8; 4] = [255, 255, 255, 255];
    const BLACK: [u8; 4] = [0, 0, 0, 255];

    fn raster(width: u32, box_size: u32, options: &ImageOptions) -> ModuleRasterizer {
        let layout = Layout::new(width, box_size, 1).unwrap();
        ModuleRasterizer::initialize_canvas(layout, options).unwrap()
    }

    /// Every pixel of the canvas whose value differs from `px`.
    fn changed_pixels(raster: &ModuleRasterizer, px: [u8; 4]) -> Vec<(u32, u32)> {
        let mut changed = Vec::new();
        for y in 0..raster.height() {
            for x in 0..raster.width() {
                if raster.pixel(x, y) != Some(px) {
                    changed.push((x, y));
                }
            }
        }
        changed
    }

    #[test]
    fn test_black_on_white_is_bilevel() {
        let raster = raster(3, 10, &ImageOptions::default());
        assert_eq!(raster.color_mode(), ColorMode::Bilevel);
        assert_eq!(raster.fill_color(), &Color::Luma(0));
        assert_eq!(raster.back_color(), Some(&Color::Luma(255)));
        assert!(matches!(raster.image(), DynamicImage::ImageLuma8(_)));
        assert_eq!((raster.width(), raster.height()), (50, 50));
        assert!(changed_pixels(&raster, WHITE).is_empty());
    }

    #[test]
    fn test_transparent_canvas() {
        let options = ImageOptions::default().with_fill_color("Red").with_back_color("transparent");
        let raster = raster(3, 10, &options);
        assert_eq!(raster.color_mode(), ColorMode::Rgba);
        assert_eq!(raster.back_color(), None);
        assert!(matches!(raster.image(), DynamicImage::ImageRgba8(_)));
        assert!(changed_pixels(&raster, [0, 0, 0, 0]).is_empty());
    }

    #[test]
    fn test_colored_canvas() {
        let options = ImageOptions::default()
            .with_fill_color("NAVY")
            .with_back_color([250, 240, 230]);
        let raster = raster(3, 10, &options);
        assert_eq!(raster.color_mode(), ColorMode::Rgb);
        assert_eq!(raster.fill_color(), &Color::Named("navy".into()));
        assert_eq!(raster.back_color(), Some(&Color::Rgb([250, 240, 230])));
        assert!(changed_pixels(&raster, [250, 240, 230, 255]).is_empty());
    }

    #[test]
    fn test_unknown_color_fails() {
        let layout = Layout::new(3, 10, 1).unwrap();
        let options = ImageOptions::default().with_fill_color("blurple");
        let err = ModuleRasterizer::initialize_canvas(layout, &options).unwrap_err();
        assert!(matches!(err, Error::UnknownColor(_)));
    }

    #[test]
    fn test_draw_module_fills_box() {
        let mut raster = raster(3, 10, &ImageOptions::default());
        raster.draw_module(1, 2);
        // border 1: row 1 -> y 20..=29, col 2 -> x 30..=39
        let changed = changed_pixels(&raster, WHITE);
        assert_eq!(changed.len(), 100);
        assert!(changed.iter().all(|&(x, y)| (30..=39).contains(&x) && (20..=29).contains(&y)));
        assert_eq!(raster.pixel(30, 20), Some(BLACK));
        assert_eq!(raster.pixel(39, 29), Some(BLACK));
    }

    #[test]
    fn test_styled_dark_matches_plain() {
        let matrix = Matrix::from_bools(&[vec![false, true], vec![false, false]]).unwrap();
        let mut styled = raster(2, 10, &ImageOptions::default());
        let mut plain = raster(2, 10, &ImageOptions::default());
        styled.draw_module_styled(0, 1, &matrix);
        plain.draw_module(0, 1);
        assert_eq!(styled.image(), plain.image());
    }

    #[test]
    fn test_styled_hole() {
        let mut matrix = Matrix::new(2);
        matrix.set(0, 0, Cell::StyledHole);
        let mut raster = raster(2, 10, &ImageOptions::default());
        raster.draw_module_styled(0, 0, &matrix);

        // box (10,10)-(19,19), center 14, dot (13,13)-(15,15)
        let area = raster.layout().pixel_box(0, 0);
        let dot = area.small_rect(2, 2).unwrap();
        assert_eq!(dot, PixelBox::new(13, 13, 15, 15));
        assert!(dot.x0 > area.x0 && dot.x1 < area.x1 && dot.y0 > area.y0 && dot.y1 < area.y1);

        for y in 10..=19 {
            for x in 10..=19 {
                let in_dot = (13..=15).contains(&x) && (13..=15).contains(&y);
                let expected = if in_dot { WHITE } else { BLACK };
                assert_eq!(raster.pixel(x, y), Some(expected), "pixel ({x}, {y})");
            }
        }
        assert_eq!(changed_pixels(&raster, WHITE).len(), 100 - 9);
    }

    #[test]
    fn test_styled_dot_leaves_rest_of_box() {
        let mut matrix = Matrix::new(2);
        matrix.set(1, 1, Cell::StyledDot);
        let mut raster = raster(2, 10, &ImageOptions::default());
        raster.draw_module_styled(1, 1, &matrix);

        // box (20,20)-(29,29), center 24, dot (23,23)-(25,25)
        let changed = changed_pixels(&raster, WHITE);
        assert_eq!(changed.len(), 9);
        assert!(changed.iter().all(|&(x, y)| (23..=25).contains(&x) && (23..=25).contains(&y)));
    }

    #[test]
    fn test_styled_cells_small_box_sizes() {
        // Border 0, one module: the canvas is exactly one box. The dot is
        // small_rect(box, min(2, box_size / 2)) filled corners inclusive, so it
        // reaches the box edge below box size 5.
        let cases = [(1, 0..=0), (2, 0..=1), (3, 1..=2), (4, 0..=2)];
        for (box_size, dot) in cases {
            for cell in [Cell::StyledHole, Cell::StyledDot] {
                let mut matrix = Matrix::new(1);
                matrix.set(0, 0, cell);
                let layout = Layout::new(1, box_size, 0).unwrap();
                let options = ImageOptions::default();
                let mut raster = ModuleRasterizer::initialize_canvas(layout, &options).unwrap();
                raster.draw_module_styled(0, 0, &matrix);

                for y in 0..box_size {
                    for x in 0..box_size {
                        let in_dot = dot.contains(&x) && dot.contains(&y);
                        let expected = match (cell, in_dot) {
                            (Cell::StyledHole, true) => WHITE,
                            (Cell::StyledHole, false) => BLACK,
                            (_, true) => BLACK,
                            (_, false) => WHITE,
                        };
                        assert_eq!(
                            raster.pixel(x, y),
                            Some(expected),
                            "box size {box_size}, {cell:?}, pixel ({x}, {y})"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_styled_dot_strictly_inside_from_box_size_five() {
        for box_size in 5..=12 {
            let layout = Layout::new(1, box_size, 0).unwrap();
            let area = layout.pixel_box(0, 0);
            let side = (box_size as i32 / 2).min(2);
            let dot = area.small_rect(side, side).unwrap();
            assert!(dot.x0 > area.x0 && dot.y0 > area.y0, "box size {box_size}");
            assert!(dot.x1 < area.x1 && dot.y1 < area.y1, "box size {box_size}");
        }
    }

    #[test]
    fn test_debug_matrix_draws_the_same_pixels() {
        let mut matrix = Matrix::new(2);
        matrix.set(0, 0, Cell::StyledHole);
        matrix.set(1, 1, Cell::StyledDot);
        let debug_matrix = matrix.clone().with_debug(true);

        let mut plain = raster(2, 10, &ImageOptions::default());
        let mut logged = raster(2, 10, &ImageOptions::default());
        for (row, col) in [(0, 0), (1, 1)] {
            plain.draw_module_styled(row, col, &matrix);
            logged.draw_module_styled(row, col, &debug_matrix);
        }
        assert_eq!(plain.image(), logged.image());
    }

    #[test]
    fn test_styled_hole_on_transparent_canvas_stays_filled() {
        let mut matrix = Matrix::new(1);
        matrix.set(0, 0, Cell::StyledHole);
        let options = ImageOptions::default().with_back_color("transparent");
        let mut raster = raster(1, 10, &options);
        raster.draw_module_styled(0, 0, &matrix);
        assert_eq!(raster.pixel(14, 14), Some(BLACK));
    }

    #[test]
    fn test_light_and_missing_cells_draw_nothing() {
        let matrix = Matrix::new(2).with_debug(true);
        let mut raster = raster(2, 10, &ImageOptions::default());
        raster.draw_module_styled(0, 0, &matrix);
        raster.draw_module_styled(5, 5, &matrix);
        assert!(changed_pixels(&raster, WHITE).is_empty());
    }

    #[test]
    fn test_save_defaults_to_png() {
        let raster = raster(2, 4, &ImageOptions::default());
        let mut out = Cursor::new(Vec::new());
        let format = raster.save(&mut out, None, SaveOptions::default()).unwrap();
        assert_eq!(format, ImageFormat::Png);
        assert!(out.get_ref().starts_with(b"\x89PNG"));
    }

    #[test]
    fn test_save_kind_overrides_default() {
        let raster = raster(2, 4, &ImageOptions::default());
        let mut out = Cursor::new(Vec::new());
        let options = SaveOptions::default().with_kind("JPEG").with_quality(90);
        let format = raster.save(&mut out, None, options).unwrap();
        assert_eq!(format, ImageFormat::Jpeg);
        assert!(out.get_ref().starts_with(&[0xFF, 0xD8, 0xFF]));
    }

    #[test]
    fn test_save_format_wins_over_kind() {
        let raster = raster(2, 4, &ImageOptions::default());
        let mut out = Cursor::new(Vec::new());
        let options = SaveOptions::default().with_kind("JPEG");
        let format = raster.save(&mut out, Some("bmp"), options).unwrap();
        assert_eq!(format, ImageFormat::Bmp);
        assert!(out.get_ref().starts_with(b"BM"));
    }

    #[test]
    fn test_save_round_trips_pixels() {
        let mut raster = raster(2, 4, &ImageOptions::default());
        raster.draw_module(0, 0);
        let mut out = Cursor::new(Vec::new());
        raster.save(&mut out, Some("png"), SaveOptions::default()).unwrap();
        let decoded = image::load_from_memory(out.get_ref()).unwrap().to_luma8();
        assert_eq!(decoded.get_pixel(4, 4), &Luma([0]));
        assert_eq!(decoded.get_pixel(0, 0), &Luma([255]));
    }

    #[test]
    fn test_unknown_format() {
        let raster = raster(2, 4, &ImageOptions::default());
        let mut out = Cursor::new(Vec::new());
        let err = raster.save(&mut out, Some("xyz"), SaveOptions::default()).unwrap_err();
        assert!(matches!(err, Error::UnknownFormat(name) if name == "xyz"));
    }

    #[test]
    fn test_resolve_format() {
        assert_eq!(resolve_format("JPG").unwrap(), ImageFormat::Jpeg);
        assert_eq!(resolve_format("Png").unwrap(), ImageFormat::Png);
    }
}
