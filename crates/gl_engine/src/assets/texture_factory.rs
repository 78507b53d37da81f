//! Builds textures from image files

use std::path::Path;

use crate::render::{Texture, TextureType};

use super::image_loader::ImageDecoder;
use super::FactoryError;

/// Bit depth requested from the decoder for a texture role
///
/// Shading maps are opaque; anything else keeps its alpha channel.
pub fn requested_depth(texture_type: TextureType) -> u8 {
    match texture_type {
        TextureType::Diffuse | TextureType::Specular | TextureType::Bump => 24,
        TextureType::Unknown => 32,
    }
}

/// Decodes an image into a loaded, non-resident [`Texture`]
pub struct TextureFactory;

impl TextureFactory {
    /// Decode `path` at the depth `texture_type` calls for
    pub fn create(
        decoder: &dyn ImageDecoder,
        path: &Path,
        texture_type: TextureType,
    ) -> Result<Texture, FactoryError> {
        let image = decoder.decode(path, requested_depth(texture_type))?;

        let mut texture = Texture::new();
        texture.load(
            texture_type,
            image.pixels,
            image.width,
            image.height,
            image.bits_per_pixel,
        );
        Ok(texture)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::image_loader::{DecodedImage, ImageError};
    use std::cell::Cell;

    struct FixedDecoder {
        requested: Cell<u8>,
    }

    impl ImageDecoder for FixedDecoder {
        fn decode(&self, _path: &Path, bits_per_pixel: u8) -> Result<DecodedImage, ImageError> {
            self.requested.set(bits_per_pixel);
            let bytes = usize::from(bits_per_pixel / 8);
            Ok(DecodedImage {
                width: 2,
                height: 1,
                bits_per_pixel,
                pixels: vec![7; 2 * bytes],
            })
        }
    }

    #[test]
    fn test_shading_maps_request_opaque_pixels() {
        assert_eq!(requested_depth(TextureType::Diffuse), 24);
        assert_eq!(requested_depth(TextureType::Specular), 24);
        assert_eq!(requested_depth(TextureType::Bump), 24);
        assert_eq!(requested_depth(TextureType::Unknown), 32);
    }

    #[test]
    fn test_create_loads_without_touching_gpu() {
        let decoder = FixedDecoder {
            requested: Cell::new(0),
        };
        let texture =
            TextureFactory::create(&decoder, Path::new("any.png"), TextureType::Specular).unwrap();

        assert_eq!(decoder.requested.get(), 24);
        assert_eq!(texture.texture_type(), TextureType::Specular);
        assert_eq!((texture.width(), texture.height(), texture.bits_per_pixel()), (2, 1, 24));
        assert_eq!(texture.data(), &[7; 6]);
        assert!(texture.is_loaded());
        assert!(!texture.is_on_gpu());
    }

    #[test]
    fn test_decoder_failure_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let result = TextureFactory::create(
            &crate::assets::FileImageDecoder,
            &dir.path().join("missing.png"),
            TextureType::Diffuse,
        );
        assert!(matches!(result, Err(FactoryError::Image(ImageError::NotFound(_)))));
    }
}
