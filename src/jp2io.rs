use hayro_jpeg2000::{self, ColorSpace};
use std::io;

use crate::image::{Image, PixelFormat};

fn invalid_data<E>(error: E) -> io::Error
where
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    io::Error::new(io::ErrorKind::InvalidData, error)
}

impl Image {
    /// Reads an image from a JPEG 2000 file or codestream.
    pub fn read_jp2(input: &[u8]) -> io::Result<Image> {
        let image = hayro_jpeg2000::Image::new(
            input,
            &hayro_jpeg2000::DecodeSettings {
                resolve_palette_indices: true,
                strict: false,
                target_resolution: None,
            },
        )
        .map_err(|e| invalid_data(e.to_string()))?;

        let pixel_format = match image.color_space() {
            ColorSpace::Gray if image.has_alpha() => PixelFormat::GrayAlpha,
            ColorSpace::Gray => PixelFormat::Gray,
            ColorSpace::RGB if image.has_alpha() => PixelFormat::RGBA,
            ColorSpace::RGB => PixelFormat::RGB,
            ColorSpace::CMYK => {
                return Err(invalid_data(
                    "jpeg2000 images with CMYK color space not supported",
                ));
            }
            ColorSpace::Unknown { num_channels } => {
                return Err(invalid_data(format!(
                    "jpeg2000 images with unknown ({num_channels}\
                     -channel) color space not supported"
                )));
            }
            ColorSpace::Icc { .. } => {
                return Err(invalid_data(
                    "jpeg2000 images with ICC profile not supported",
                ));
            }
        };
        let (width, height) = (image.width(), image.height());
        if Image::data_length(pixel_format, width, height).is_none() {
            return Err(invalid_data(format!(
                "jpeg2000 image of {width}x{height} pixels is too large"
            )));
        }
        let pixels = image.decode().map_err(|e| invalid_data(e.to_string()))?;
        Image::from_data(pixel_format, width, height, pixels).ok_or_else(|| {
            invalid_data("jpeg2000 decoder returned the wrong amount of data")
        })
    }
}
