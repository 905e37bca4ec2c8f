/// Errors produced while building or encoding a QR code image.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The imaging capability needed for the requested operation is not available in this build.
    #[error("no encoder for `{0}` is available in this build")]
    DependencyMissing(String),

    /// The requested output format name is not known to the imaging library.
    #[error("unknown image format `{0}`")]
    UnknownFormat(String),

    /// A named color could not be parsed.
    #[error("unknown color specifier: `{0}`")]
    UnknownColor(String),

    #[error("box size must be >= 1")]
    InvalidBoxSize,

    /// The image for this layout would be too large to address.
    #[error("layout of {width} modules, box size {box_size} and border {border} is too large")]
    LayoutTooLarge { width: u32, box_size: u32, border: u32 },

    /// A matrix row does not have as many cells as the matrix has rows.
    #[error("matrix has {rows} rows but row {row} has {len} cells")]
    NonSquareMatrix { rows: usize, row: usize, len: usize },

    #[error("failed to encode image: {0}")]
    Image(#[from] image::ImageError),

    #[error("failed to write image: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
