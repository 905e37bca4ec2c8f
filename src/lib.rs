//! # qirust-raster
//!
//! A raster image backend for QR codes.
//!
//! `qirust-raster` takes the module matrix produced by a QR encoder and draws it into a bitmap with
//! the [`image`] crate. Besides plain dark and light modules it understands styled "context" cells,
//! used to draw eye markers as a box with a hole or as a single center dot.
//!
//! ## Features
//!
//! - Black-on-white output is stored as a bilevel image; other colors use RGB, and a
//!   `"transparent"` background gives an RGBA image.
//! - Named colors (`"navy"`, `"Orange"`, `"#ff8800"`) or raw luma/RGB/RGBA values.
//! - Encode to PNG, JPEG, BMP or any other format the image crate can write.
//! - Optional `serde` feature to load [`options::ImageOptions`] from configuration files.
//! - Safe Rust implementation with no unsafe code.
//!
//! ## Example
//!
//! ```rust
//! use qirust_raster::helper::render;
//! use qirust_raster::matrix::{Cell, Matrix};
//! use qirust_raster::options::{ImageOptions, SaveOptions};
//!
//! let mut matrix = Matrix::new(21);
//! matrix.set(0, 0, Cell::Dark);
//! matrix.set(3, 3, Cell::StyledHole);
//!
//! let options = ImageOptions::default().with_fill_color("navy").with_back_color("transparent");
//! let raster = render(&matrix, &options).unwrap();
//!
//! let mut png = std::io::Cursor::new(Vec::new());
//! raster.save(&mut png, None, SaveOptions::default()).unwrap();
//! ```
//!
//! ## Modules
//!
//! - [`rasterizer`]: Canvas creation, module drawing and encoding.
//! - [`helper`]: Render a whole matrix to an image, bytes, a file, or the console.
//! - [`matrix`], [`color`], [`geometry`], [`options`]: The types they work with.

#![forbid(unsafe_code)]

pub mod color;
pub mod error;
pub mod geometry;
pub mod helper;
pub mod matrix;
pub mod options;
pub mod rasterizer;

pub use error::{Error, Result};
pub use rasterizer::ModuleRasterizer;
