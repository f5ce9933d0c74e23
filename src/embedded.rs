//! Decoding of the PNG and JPEG 2000 files embedded in modern icon chunks.

use std::io::{self, Error, ErrorKind};

use crate::image::Image;

/// The first bytes of a PNG file.
const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";
/// The first bytes of a JPEG 2000 file in a JP2 container.
const JP2_SIGNATURE: &[u8] = b"\0\0\0\x0cjP  \r\n\x87\n";
/// The first bytes of a raw JPEG 2000 codestream.
const J2K_SIGNATURE: &[u8] = b"\xff\x4f\xff\x51";

/// Decodes an embedded image payload.  Implementations receive the raw chunk
/// payload and the pixel size the chunk type promises, and return the image
/// together with a short label naming the codec that was used.
pub trait ImageDecoder {
    /// Decodes `data` into an image of `resolution` by `resolution` pixels.
    fn decode(&self, data: &[u8], resolution: u32) -> io::Result<(Image, &'static str)>;
}

/// The default decoder: PNG (with the `pngio` feature) and JPEG 2000 (with
/// the `jp2io` feature), told apart by their signatures.
#[derive(Clone, Copy, Debug, Default)]
pub struct EmbeddedDecoder;

impl ImageDecoder for EmbeddedDecoder {
    fn decode(&self, data: &[u8], resolution: u32) -> io::Result<(Image, &'static str)> {
        let (image, label) = if data.starts_with(PNG_SIGNATURE) {
            (decode_png(data)?, "png")
        } else if data.starts_with(JP2_SIGNATURE) ||
                  data.starts_with(J2K_SIGNATURE) {
            (decode_jp2(data)?, "jpeg2000")
        } else {
            return Err(Error::new(ErrorKind::InvalidData,
                                  "unrecognized embedded image format"));
        };
        if image.width() != resolution || image.height() != resolution {
            let msg = format!("decoded {} has wrong dimensions ({}x{} \
                               instead of {}x{})",
                              label,
                              image.width(),
                              image.height(),
                              resolution,
                              resolution);
            return Err(Error::new(ErrorKind::InvalidData, msg));
        }
        Ok((image, label))
    }
}

#[cfg(feature = "pngio")]
fn decode_png(data: &[u8]) -> io::Result<Image> {
    Image::read_png(io::Cursor::new(data))
}

#[cfg(not(feature = "pngio"))]
fn decode_png(_data: &[u8]) -> io::Result<Image> {
    Err(Error::new(ErrorKind::Unsupported,
                   "PNG support requires the `pngio` feature"))
}

#[cfg(feature = "jp2io")]
fn decode_jp2(data: &[u8]) -> io::Result<Image> {
    Image::read_jp2(data)
}

#[cfg(not(feature = "jp2io"))]
fn decode_jp2(_data: &[u8]) -> io::Result<Image> {
    Err(Error::new(ErrorKind::Unsupported,
                   "JPEG 2000 support requires the `jp2io` feature"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_payload_is_rejected() {
        let err = EmbeddedDecoder.decode(b"GIF89a", 16).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData);
    }

    #[cfg(feature = "pngio")]
    #[test]
    fn png_is_decoded_and_checked() {
        use crate::image::PixelFormat;

        let image = Image::new(PixelFormat::RGBA, 16, 16);
        let mut png = Vec::new();
        image.write_png(&mut png).unwrap();
        let (decoded, label) = EmbeddedDecoder.decode(&png, 16).unwrap();
        assert_eq!(label, "png");
        assert_eq!(decoded, image);
        assert!(EmbeddedDecoder.decode(&png, 32).is_err());
    }
}
