//! The module matrix handed over by the QR encoder.

use crate::error::{Error, Result};

/// The state of one module, including the styled "context" variants used for eye dots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    /// A light module; nothing is drawn.
    #[default]
    Light,
    /// A dark module, drawn as a full box.
    Dark,
    /// Logically dark, drawn as a full box with a background-colored dot in its center.
    StyledHole,
    /// Logically light, drawn as a fill-colored dot in the center of an empty box.
    StyledDot,
}

impl Cell {
    /// Returns the logical module value, ignoring styling.
    pub fn is_dark(self) -> bool {
        matches!(self, Cell::Dark | Cell::StyledHole)
    }
}

impl From<bool> for Cell {
    fn from(dark: bool) -> Self {
        if dark {
            Cell::Dark
        } else {
            Cell::Light
        }
    }
}

/// A square grid of [`Cell`]s, addressed by `(row, col)`.
///
/// # Example
///
/// ```rust
/// use qirust_raster::matrix::{Cell, Matrix};
///
/// let mut matrix = Matrix::new(21);
/// matrix.set(0, 0, Cell::Dark);
/// assert_eq!(matrix.get(0, 0), Some(Cell::Dark));
/// assert_eq!(matrix.get(21, 0), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matrix {
    width: usize,
    cells: Vec<Cell>,
    debug: bool,
}

impl Matrix {
    /// Creates a `width` x `width` matrix of light cells.
    pub fn new(width: usize) -> Self {
        Self {
            width,
            cells: vec![Cell::Light; width * width],
            debug: false,
        }
    }

    /// Builds a matrix from rows of cells.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NonSquareMatrix`] if any row's length differs from the number of rows.
    pub fn from_rows(rows: Vec<Vec<Cell>>) -> Result<Self> {
        let width = rows.len();
        let mut cells = Vec::with_capacity(width * width);
        for (row, cols) in rows.into_iter().enumerate() {
            if cols.len() != width {
                return Err(Error::NonSquareMatrix { rows: width, row, len: cols.len() });
            }
            cells.extend(cols);
        }
        Ok(Self { width, cells, debug: false })
    }

    /// Builds a matrix of plain dark/light cells.
    pub fn from_bools(rows: &[Vec<bool>]) -> Result<Self> {
        Self::from_rows(
            rows.iter()
                .map(|row| row.iter().copied().map(Cell::from).collect())
                .collect(),
        )
    }

    /// Enables `debug`-level log events for styled cells while rendering.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// The number of modules per side.
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Returns the cell at `(row, col)`, or `None` outside the matrix.
    pub fn get(&self, row: usize, col: usize) -> Option<Cell> {
        if row < self.width && col < self.width {
            Some(self.cells[row * self.width + col])
        } else {
            None
        }
    }

    /// Sets the cell at `(row, col)`. Coordinates outside the matrix are ignored.
    pub fn set(&mut self, row: usize, col: usize, cell: Cell) {
        if row < self.width && col < self.width {
            self.cells[row * self.width + col] = cell;
        }
    }
}
