//! Pixel geometry: where each module lands on the canvas.

use crate::error::{Error, Result};

/// A rectangle in pixel space. Both corners are inclusive when filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelBox {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl PixelBox {
    pub const fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Returns a `inner_width` x `inner_height` rectangle centered within this one, or `None` if
    /// it does not fit.
    ///
    /// The center is found with floor division, and the top-left corner sits half the inner size
    /// (again floored) before it, so odd sizes leave the inner box up to one pixel off center.
    ///
    /// # Example
    ///
    /// ```rust
    /// use qirust_raster::geometry::PixelBox;
    ///
    /// let outer = PixelBox::from(((0, 0), (10, 10)));
    /// assert_eq!(outer.small_rect(4, 4), Some(PixelBox::from(((3, 3), (7, 7)))));
    /// assert_eq!(outer.small_rect(20, 4), None);
    /// ```
    pub fn small_rect(&self, inner_width: i32, inner_height: i32) -> Option<PixelBox> {
        let (outer_x0, outer_y0) = (i64::from(self.x0), i64::from(self.y0));
        let (outer_x1, outer_y1) = (i64::from(self.x1), i64::from(self.y1));
        let (width, height) = (i64::from(inner_width), i64::from(inner_height));
        if width > outer_x1 - outer_x0 || height > outer_y1 - outer_y0 {
            return None;
        }

        let center_x = (outer_x0 + outer_x1).div_euclid(2);
        let center_y = (outer_y0 + outer_y1).div_euclid(2);

        let x0 = center_x - width.div_euclid(2);
        let y0 = center_y - height.div_euclid(2);

        Some(PixelBox::new(
            i32::try_from(x0).ok()?,
            i32::try_from(y0).ok()?,
            i32::try_from(x0 + width).ok()?,
            i32::try_from(y0 + height).ok()?,
        ))
    }
}

impl From<((i32, i32), (i32, i32))> for PixelBox {
    fn from(((x0, y0), (x1, y1)): ((i32, i32), (i32, i32))) -> Self {
        PixelBox::new(x0, y0, x1, y1)
    }
}

impl From<PixelBox> for ((i32, i32), (i32, i32)) {
    fn from(b: PixelBox) -> Self {
        ((b.x0, b.y0), (b.x1, b.y1))
    }
}

/// How a matrix maps onto the canvas: module count, pixels per module, and quiet-zone width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    width: u32,
    box_size: u32,
    border: u32,
    pixel_size: u32,
}

impl Layout {
    /// Creates a layout for a `width` x `width` matrix.
    ///
    /// # Arguments
    ///
    /// * `width` - Modules per side of the matrix.
    /// * `box_size` - Pixels per module edge.
    /// * `border` - Width of the quiet zone around the matrix, in modules.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBoxSize`] if `box_size` is zero, and [`Error::LayoutTooLarge`] if
    /// the image side would not fit in an `i32` pixel coordinate.
    pub fn new(width: u32, box_size: u32, border: u32) -> Result<Self> {
        if box_size == 0 {
            return Err(Error::InvalidBoxSize);
        }
        let pixel_size = border
            .checked_mul(2)
            .and_then(|b| b.checked_add(width))
            .and_then(|modules| modules.checked_mul(box_size))
            .filter(|&size| i32::try_from(size).is_ok())
            .ok_or(Error::LayoutTooLarge { width, box_size, border })?;
        Ok(Self { width, box_size, border, pixel_size })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn box_size(&self) -> u32 {
        self.box_size
    }

    pub fn border(&self) -> u32 {
        self.border
    }

    /// The side length of the whole image in pixels, quiet zone included.
    pub fn pixel_size(&self) -> u32 {
        self.pixel_size
    }

    /// Returns the box covering the module at `(row, col)`.
    ///
    /// Modules inside the matrix always map inside the canvas. Coordinates far outside it are
    /// clamped to the `i32` range, which leaves the box off canvas.
    pub fn pixel_box(&self, row: usize, col: usize) -> PixelBox {
        let box_size = i64::from(self.box_size);
        let origin = |index: usize| {
            let index = i64::try_from(index).unwrap_or(i64::MAX);
            index.saturating_add(i64::from(self.border)).saturating_mul(box_size)
        };
        let (x, y) = (origin(col), origin(row));
        let clamp = |v: i64| v.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32;
        PixelBox::new(
            clamp(x),
            clamp(y),
            clamp(x.saturating_add(box_size - 1)),
            clamp(y.saturating_add(box_size - 1)),
        )
    }
}
