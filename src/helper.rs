use crate::error::{Error, Result};
use crate::geometry::Layout;
use crate::matrix::Matrix;
use crate::options::{ImageOptions, SaveOptions};
use crate::rasterizer::{resolve_format, ModuleRasterizer};

use std::fs;
use std::io::{BufWriter, Cursor, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/*---- Utilities ----*/

/// Renders every module of `matrix` onto a new canvas.
///
/// Each cell is drawn with [`ModuleRasterizer::draw_module_styled`], so styled eye-dot cells are
/// honoured alongside plain dark modules.
///
/// # Errors
///
/// Returns an error if `options.box_size` is zero, the image would be too large, or a color
/// cannot be parsed.
///
/// # Example
///
/// ```rust
/// use qirust_raster::helper::render;
/// use qirust_raster::matrix::Matrix;
/// use qirust_raster::options::ImageOptions;
///
/// let matrix = Matrix::from_bools(&[vec![true, false], vec![false, true]]).unwrap();
/// let raster = render(&matrix, &ImageOptions::default().with_box_size(2).with_border(1)).unwrap();
/// assert_eq!(raster.width(), 8);
/// ```
pub fn render(matrix: &Matrix, options: &ImageOptions) -> Result<ModuleRasterizer> {
    let width = u32::try_from(matrix.width()).map_err(|_| Error::LayoutTooLarge {
        width: u32::MAX,
        box_size: options.box_size,
        border: options.border,
    })?;
    let layout = Layout::new(width, options.box_size, options.border)?;
    let mut raster = ModuleRasterizer::initialize_canvas(layout, options)?;
    for row in 0..matrix.width() {
        for col in 0..matrix.width() {
            raster.draw_module_styled(row, col, matrix);
        }
    }
    Ok(raster)
}

/// Renders `matrix` and returns the encoded image.
///
/// # Arguments
///
/// * `matrix` - The modules to draw.
/// * `options` - Colors and sizing.
/// * `format` - Optional. The output format name. Defaults to PNG.
pub fn render_to_bytes(
    matrix: &Matrix,
    options: &ImageOptions,
    format: Option<&str>,
) -> Result<Vec<u8>> {
    let raster = render(matrix, options)?;
    let mut out = Cursor::new(Vec::new());
    raster.save(&mut out, format, SaveOptions::default())?;
    Ok(out.into_inner())
}

/// Renders `matrix` and saves it to a file.
///
/// # Arguments
///
/// * `matrix` - The modules to draw.
/// * `options` - Colors and sizing.
/// * `directory_path` - Optional. The directory path where the image will be saved. If not
///   provided, the default directory is "generated".
/// * `filename` - Optional. The name of the image file, without extension. If not provided, a
///   timestamp-based filename will be used.
///
/// Returns the path of the written file, which always has a `.png` extension.
///
/// # Example
///
/// ```no_run
/// use qirust_raster::helper::render_and_save;
/// use qirust_raster::matrix::Matrix;
/// use qirust_raster::options::ImageOptions;
///
/// let matrix = Matrix::new(21);
/// render_and_save(&matrix, &ImageOptions::default(), Some("images"), Some("qr_code")).unwrap();
/// ```
pub fn render_and_save(
    matrix: &Matrix,
    options: &ImageOptions,
    directory_path: Option<&str>,
    filename: Option<&str>,
) -> Result<PathBuf> {
    let directory_path = directory_path.unwrap_or("generated");
    let filename = match filename {
        Some(name) => name.to_string(),
        None => {
            let since_the_epoch = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default();
            since_the_epoch.as_millis().to_string()
        }
    };

    let format = resolve_format(ModuleRasterizer::KIND)?;
    let extension = format.extensions_str().first().copied().unwrap_or("png");
    let file_path = Path::new(directory_path).join(format!("{}.{}", filename, extension));

    // Check if the directory exists, create it if it doesn't
    if !Path::new(directory_path).exists() {
        fs::create_dir_all(directory_path)?;
    }

    let raster = render(matrix, options)?;
    let mut writer = BufWriter::new(fs::File::create(&file_path)?);
    raster.save(&mut writer, None, SaveOptions::default())?;
    writer.flush()?;
    tracing::debug!(path = %file_path.display(), "saved QR code image");
    Ok(file_path)
}

/// Returns the matrix as text, two characters per module, with `border` light modules around it.
pub fn to_ascii_string(matrix: &Matrix, border: usize) -> String {
    let side = matrix.width() + 2 * border;
    let mut result = String::new();
    for y in 0..side {
        for x in 0..side {
            let dark = y
                .checked_sub(border)
                .zip(x.checked_sub(border))
                .and_then(|(row, col)| matrix.get(row, col))
                .is_some_and(|cell| cell.is_dark());
            let c: char = if dark { '█' } else { ' ' };
            result.push(c);
            result.push(c);
        }
        result.push('\n');
    }
    result
}

/// Prints the given matrix to the console.
pub fn print_matrix(matrix: &Matrix) {
    println!("{}", to_ascii_string(matrix, 4));
}
