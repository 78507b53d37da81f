//! Image decoding
//!
//! Decoders return tightly packed pixels at a requested depth with the
//! bottom row first, which is the row order OpenGL expects.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Image decoding failures
#[derive(Debug, Error)]
pub enum ImageError {
    /// The image file does not exist
    #[error("Image file not found: {0}")]
    NotFound(PathBuf),

    /// The format is unrecognised or the data is corrupt
    #[error("Failed to decode {path}: {message}")]
    Decode {
        /// Image file
        path: PathBuf,
        /// Decoder diagnostic
        message: String,
    },

    /// The caller asked for a depth other than 8, 24 or 32 bits
    #[error("Unsupported bit depth: {0}")]
    UnsupportedDepth(u8),
}

/// Decoded pixels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Depth of `pixels`
    pub bits_per_pixel: u8,
    /// Packed rows, bottom row first
    pub pixels: Vec<u8>,
}

/// Image file decoder
pub trait ImageDecoder {
    /// Decode the file at `path`, converting to `bits_per_pixel` (8, 24 or 32)
    fn decode(&self, path: &Path, bits_per_pixel: u8) -> Result<DecodedImage, ImageError>;
}

/// Decoder backed by the `image` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct FileImageDecoder;

impl ImageDecoder for FileImageDecoder {
    fn decode(&self, path: &Path, bits_per_pixel: u8) -> Result<DecodedImage, ImageError> {
        if !matches!(bits_per_pixel, 8 | 24 | 32) {
            return Err(ImageError::UnsupportedDepth(bits_per_pixel));
        }
        if !path.exists() {
            return Err(ImageError::NotFound(path.to_path_buf()));
        }

        let image = image::open(path)
            .map_err(|error| ImageError::Decode {
                path: path.to_path_buf(),
                message: error.to_string(),
            })?
            .flipv();

        let (width, height) = (image.width(), image.height());
        let pixels = match bits_per_pixel {
            8 => image.into_luma8().into_raw(),
            24 => image.into_rgb8().into_raw(),
            _ => image.into_rgba8().into_raw(),
        };
        log::trace!("Decoded {} ({}x{}, {} bpp)", path.display(), width, height, bits_per_pixel);

        Ok(DecodedImage {
            width,
            height,
            bits_per_pixel,
            pixels,
        })
    }
}
