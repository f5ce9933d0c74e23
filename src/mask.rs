//! Merging a separately stored 8-bit mask into a color image.

use crate::error::{Error, Result};
use crate::image::{Image, PixelFormat};

/// Combines a color image with its alpha mask into a new RGBA image of
/// `resolution` by `resolution` pixels.  The color's RGB channels are kept
/// and the alpha channel is taken from the mask, pixel for pixel.
///
/// Both inputs must already be `resolution` pixels square.
pub fn composite(color: &Image, mask: &Image, resolution: u32) -> Result<Image> {
    check_size("color image", color, resolution)?;
    check_size("mask", mask, resolution)?;
    let mut output = color.convert_to(PixelFormat::RGBA);
    let alpha = match mask.pixel_format() {
        PixelFormat::Gray | PixelFormat::Alpha => mask.clone(),
        PixelFormat::RGB => mask.convert_to(PixelFormat::Gray),
        PixelFormat::RGBA | PixelFormat::GrayAlpha => {
            mask.convert_to(PixelFormat::Alpha)
        }
    };
    for (pixel, &value) in output.data_mut()
                                 .chunks_exact_mut(4)
                                 .zip(alpha.data().iter()) {
        pixel[3] = value;
    }
    Ok(output)
}

fn check_size(what: &str, image: &Image, resolution: u32) -> Result<()> {
    if image.width() != resolution || image.height() != resolution {
        return Err(Error::Config(format!("{} is {}x{}, expected {}x{}",
                                         what,
                                         image.width(),
                                         image.height(),
                                         resolution,
                                         resolution)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alpha_comes_from_mask() {
        let color = Image::from_data(PixelFormat::RGB, 2, 2,
                                     vec![10, 20, 30, 11, 21, 31, 12, 22, 32,
                                          13, 23, 33]).unwrap();
        let mask = Image::from_data(PixelFormat::Alpha, 2, 2,
                                    vec![0, 85, 170, 255]).unwrap();
        let output = composite(&color, &mask, 2).unwrap();
        assert_eq!(output.pixel_format(), PixelFormat::RGBA);
        assert_eq!(output.data(),
                   &[10, 20, 30, 0, 11, 21, 31, 85, 12, 22, 32, 170, 13, 23,
                     33, 255]);
        // Inputs untouched.
        assert_eq!(color.pixel_format(), PixelFormat::RGB);
        assert_eq!(mask.data(), &[0, 85, 170, 255]);
    }

    #[test]
    fn replaces_existing_alpha() {
        let color = Image::from_data(PixelFormat::RGBA, 1, 1,
                                     vec![1, 2, 3, 200]).unwrap();
        let mask = Image::from_data(PixelFormat::Gray, 1, 1, vec![9]).unwrap();
        assert_eq!(composite(&color, &mask, 1).unwrap().data(), &[1, 2, 3, 9]);
    }

    #[test]
    fn size_mismatch_is_config_error() {
        let color = Image::new(PixelFormat::RGB, 16, 16);
        let mask = Image::new(PixelFormat::Alpha, 32, 32);
        match composite(&color, &mask, 16) {
            Err(Error::Config(msg)) => assert!(msg.starts_with("mask")),
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(matches!(composite(&color, &color, 32),
                         Err(Error::Config(_))));
    }
}
