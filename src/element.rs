use byteorder::{BigEndian, ByteOrder, ReadBytesExt, WriteBytesExt};
use std::io::{self, Error, ErrorKind, Read, Write};

use crate::embedded::{EmbeddedDecoder, ImageDecoder};
use crate::error::{CodecError, Result};
use crate::icontype::{Encoding, IconType, OSType};
use crate::image::{Image, PixelFormat};
use crate::registry::{FormatDescriptor, FormatRegistry};
use crate::rle;

/// The length of an icon element header, in bytes:
pub(crate) const ICON_ELEMENT_HEADER_LENGTH: u32 = 8;

/// Tag preceding the compressed planes of an ARGB element.
const ARGB_TAG: &[u8; 4] = b"ARGB";

/// Zero prefix carried by `it32` payloads before the compressed planes.
const IT32_PREFIX: &[u8; 4] = &[0, 0, 0, 0];

/// One chunk in an ICNS file.  Depending on the type code, this may
/// represent an icon, or part of an icon (such as an alpha mask, or color
/// data without the mask).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IconElement {
    /// The chunk's type code.
    pub ostype: OSType,
    /// The chunk's payload, without the header.
    pub data: Vec<u8>,
}

impl IconElement {
    /// Creates an icon element with the given OSType and data payload.
    pub fn new(ostype: OSType, data: Vec<u8>) -> IconElement {
        IconElement { ostype, data }
    }

    /// Returns the type of icon encoded by this element, or `None` if this
    /// element does not encode a supported icon type.
    pub fn icon_type(&self) -> Option<IconType> {
        IconType::from_ostype(self.ostype)
    }

    /// Returns the encoded length of the element, in bytes, including the
    /// length of the header.
    pub fn total_length(&self) -> u32 {
        ICON_ELEMENT_HEADER_LENGTH + (self.data.len() as u32)
    }

    /// Decodes the element into an image using the standard registry and
    /// the default embedded decoder.  Masks decode to `Alpha` images; no
    /// compositing happens here.
    pub fn decode_image(&self) -> Result<Image> {
        let format = FormatRegistry::standard()
            .lookup(self.ostype)
            .ok_or(crate::error::Error::Unsupported(self.ostype))?;
        let (image, _) = decode_payload(&self.data, format, &EmbeddedDecoder)?;
        Ok(image)
    }

    /// Reads one icon element from a stream positioned at a chunk header.
    pub fn read<R: Read>(mut reader: R) -> Result<IconElement> {
        let mut raw_ostype = [0u8; 4];
        reader.read_exact(&mut raw_ostype)?;
        let ostype = OSType(raw_ostype);
        let element_length = reader.read_u32::<BigEndian>()?;
        let truncated = |available: usize| crate::error::Error::TruncatedChunk {
            ostype,
            declared: element_length,
            available,
        };
        if element_length < ICON_ELEMENT_HEADER_LENGTH {
            return Err(truncated(ICON_ELEMENT_HEADER_LENGTH as usize));
        }
        let data_length = (element_length - ICON_ELEMENT_HEADER_LENGTH) as u64;
        let mut data = Vec::new();
        reader.take(data_length).read_to_end(&mut data)?;
        if (data.len() as u64) < data_length {
            return Err(truncated(ICON_ELEMENT_HEADER_LENGTH as usize + data.len()));
        }
        Ok(IconElement::new(ostype, data))
    }

    /// Writes the icon element to within an ICNS file.
    pub fn write<W: Write>(&self, mut writer: W) -> io::Result<()> {
        let OSType(ref raw_ostype) = self.ostype;
        writer.write_all(raw_ostype)?;
        writer.write_u32::<BigEndian>(self.total_length())?;
        writer.write_all(&self.data)?;
        Ok(())
    }

    /// Encodes an image into an element of the given format.  Color data is
    /// taken from the image for color formats and its alpha channel for mask
    /// formats.  The image must already have the format's dimensions.
    pub fn encode_image(image: &Image, format: &FormatDescriptor) -> io::Result<IconElement> {
        let width = format.resolution;
        if image.width() != width || image.height() != width {
            let msg = format!("image has wrong dimensions for '{}' ({}x{} \
                               instead of {}x{})",
                              format.ostype,
                              image.width(),
                              image.height(),
                              width,
                              width);
            return Err(Error::new(ErrorKind::InvalidInput, msg));
        }
        let data = match format.encoding {
            Encoding::Pack => {
                let mut data = Vec::new();
                if format.icon_type == IconType::RGB24_128x128 {
                    data.extend_from_slice(IT32_PREFIX);
                }
                for plane in image.planes(PixelFormat::RGB) {
                    data.extend_from_slice(&rle::encode(&plane));
                }
                data
            }
            Encoding::Mask8 => image.convert_to(PixelFormat::Alpha).data().to_vec(),
            Encoding::Argb => {
                let mut data = ARGB_TAG.to_vec();
                let planes = image.planes(PixelFormat::RGBA);
                // RGBA planes, stored alpha first.
                for index in [3, 0, 1, 2] {
                    data.extend_from_slice(&rle::encode(&planes[index]));
                }
                data
            }
            Encoding::Embedded => encode_embedded(image)?,
        };
        Ok(IconElement::new(format.ostype, data))
    }
}

/// Decodes a chunk payload according to its format.  Returns the image and
/// the label of the codec used.
pub(crate) fn decode_payload(data: &[u8],
                             format: &FormatDescriptor,
                             embedded: &dyn ImageDecoder)
                             -> Result<(Image, &'static str)> {
    let width = format.resolution;
    let num_pixels = (width * width) as usize;
    match format.encoding {
        Encoding::Pack => {
            let mut data = data;
            if format.icon_type == IconType::RGB24_128x128 &&
               data.starts_with(IT32_PREFIX) {
                data = &data[IT32_PREFIX.len()..];
            }
            let planes = rle::decode_exact(data, 3 * num_pixels)?;
            let (red, rest) = planes.split_at(num_pixels);
            let (green, blue) = rest.split_at(num_pixels);
            let image = Image::from_planes(PixelFormat::RGB,
                                           width,
                                           width,
                                           &[red, green, blue]);
            Ok((image, "pack"))
        }
        Encoding::Mask8 => {
            let image = Image::from_data(PixelFormat::Alpha,
                                         width,
                                         width,
                                         data.to_vec())
                .ok_or(CodecError::LengthMismatch {
                    expected: num_pixels,
                    actual: data.len(),
                })?;
            Ok((image, "mask"))
        }
        Encoding::Argb => {
            let argb = if let Some(compressed) = data.strip_prefix(ARGB_TAG) {
                rle::decode_exact(compressed, 4 * num_pixels)?
            } else if data.len() == 4 * num_pixels {
                argb_interleaved_to_planar(data)
            } else {
                return Err(CodecError::LengthMismatch {
                        expected: 4 * num_pixels,
                        actual: data.len(),
                    }
                    .into());
            };
            let (alpha, rest) = argb.split_at(num_pixels);
            let (red, rest) = rest.split_at(num_pixels);
            let (green, blue) = rest.split_at(num_pixels);
            let image = Image::from_planes(PixelFormat::RGBA,
                                           width,
                                           width,
                                           &[red, green, blue, alpha]);
            Ok((image, "argb"))
        }
        Encoding::Embedded => Ok(embedded.decode(data, width)?),
    }
}

/// Reorders interleaved ARGB pixels into A, R, G and B planes.
fn argb_interleaved_to_planar(data: &[u8]) -> Vec<u8> {
    let num_pixels = data.len() / 4;
    let mut planar = vec![0u8; data.len()];
    for (pixel, argb) in data.chunks_exact(4).enumerate() {
        for (channel, &value) in argb.iter().enumerate() {
            planar[channel * num_pixels + pixel] = value;
        }
    }
    planar
}

#[cfg(feature = "pngio")]
fn encode_embedded(image: &Image) -> io::Result<Vec<u8>> {
    let mut data = Vec::new();
    image.write_png(&mut data)?;
    Ok(data)
}

#[cfg(not(feature = "pngio"))]
fn encode_embedded(_image: &Image) -> io::Result<Vec<u8>> {
    Err(Error::new(ErrorKind::Unsupported,
                   "encoding embedded icons requires the `pngio` feature"))
}

/// A problem found while walking the chunk stream.  Iteration ends after
/// one of these is reported.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct TruncatedChunk {
    /// Offset of the chunk header within the file.
    pub offset: usize,
    /// The chunk's type code, if the header was complete enough to hold one.
    pub ostype: Option<OSType>,
    /// The length the header declared (zero if it was cut off).
    pub declared: u32,
    /// Bytes that remained from the header onward.
    pub available: usize,
}

/// Walks the chunks of a buffer, header by header.  Yields `Err` at most
/// once, for a chunk whose header or payload runs past the end of the
/// buffer (or declares a length shorter than its own header), and then
/// stops.
pub(crate) struct ChunkIter<'a> {
    data: &'a [u8],
    offset: usize,
    done: bool,
}

impl<'a> ChunkIter<'a> {
    /// `data` is the whole file; iteration starts at `offset`.
    pub(crate) fn new(data: &'a [u8], offset: usize) -> ChunkIter<'a> {
        ChunkIter { data, offset, done: false }
    }
}

/// A chunk borrowed from the input buffer.
#[derive(Clone, Copy, Debug)]
pub(crate) struct RawChunk<'a> {
    pub offset: usize,
    pub ostype: OSType,
    pub payload: &'a [u8],
}

impl<'a> Iterator for ChunkIter<'a> {
    type Item = std::result::Result<RawChunk<'a>, TruncatedChunk>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.offset >= self.data.len() {
            return None;
        }
        let offset = self.offset;
        let rest = &self.data[offset..];
        let header_length = ICON_ELEMENT_HEADER_LENGTH as usize;
        if rest.len() < header_length {
            self.done = true;
            let ostype = if rest.len() >= 4 {
                Some(OSType([rest[0], rest[1], rest[2], rest[3]]))
            } else {
                None
            };
            return Some(Err(TruncatedChunk {
                offset,
                ostype,
                declared: 0,
                available: rest.len(),
            }));
        }
        let ostype = OSType([rest[0], rest[1], rest[2], rest[3]]);
        let declared = BigEndian::read_u32(&rest[4..8]);
        let payload = (declared as usize)
            .checked_sub(header_length)
            .and_then(|length| rest.get(header_length..header_length + length));
        match payload {
            Some(payload) => {
                self.offset += declared as usize;
                Some(Ok(RawChunk { offset, ostype, payload }))
            }
            None => {
                self.done = true;
                Some(Err(TruncatedChunk {
                    offset,
                    ostype: Some(ostype),
                    declared,
                    available: rest.len(),
                }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn format(code: &[u8; 4]) -> FormatDescriptor {
        *FormatRegistry::standard().lookup(OSType(*code)).unwrap()
    }

    #[test]
    fn decode_rle() {
        let data: Vec<u8> = vec![0, 12, 255, 0, 250, 0, 128, 34, 255, 0, 248,
                                 0, 1, 56, 99, 255, 0, 249, 0];
        let (image, label) =
            decode_payload(&data, &format(b"is32"), &EmbeddedDecoder)
                .expect("failed to decode image");
        assert_eq!(label, "pack");
        assert_eq!(image.pixel_format(), PixelFormat::RGB);
        assert_eq!(image.width(), 16);
        assert_eq!(image.height(), 16);
        assert_eq!(image.data()[0], 12);
        assert_eq!(image.data()[1], 34);
        assert_eq!(image.data()[2], 56);
    }

    #[test]
    fn decode_rle_wrong_length() {
        let data: Vec<u8> = vec![0x80, 0x00];
        match decode_payload(&data, &format(b"is32"), &EmbeddedDecoder) {
            Err(Error::Codec(CodecError::LengthMismatch { expected, actual })) => {
                assert_eq!(expected, 768);
                assert_eq!(actual, 3);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn decode_mask() {
        let mut data = vec![0u8; 256];
        data[2] = 127;
        let (image, _) =
            decode_payload(&data, &format(b"s8mk"), &EmbeddedDecoder)
                .expect("failed to decode image");
        assert_eq!(image.pixel_format(), PixelFormat::Alpha);
        assert_eq!(image.width(), 16);
        assert_eq!(image.height(), 16);
        assert_eq!(image.data()[2], 127);
    }

    #[test]
    fn decode_mask_wrong_length() {
        let data = vec![0u8; 255];
        assert!(decode_payload(&data, &format(b"s8mk"), &EmbeddedDecoder)
                    .is_err());
    }

    #[test]
    fn decode_raw_argb() {
        let mut data = Vec::new();
        for _ in 0..256 {
            data.extend_from_slice(&[200, 1, 2, 3]);
        }
        let (image, label) =
            decode_payload(&data, &format(b"ic04"), &EmbeddedDecoder)
                .expect("failed to decode image");
        assert_eq!(label, "argb");
        assert_eq!(image.pixel_format(), PixelFormat::RGBA);
        assert_eq!(&image.data()[..4], &[1, 2, 3, 200]);
    }

    #[test]
    fn pack_and_argb_round_trip() {
        for code in [b"il32", b"it32", b"ic05"] {
            let format = format(code);
            let size = format.resolution;
            let mut image = Image::new(PixelFormat::RGBA, size, size);
            for (index, byte) in image.data_mut().iter_mut().enumerate() {
                *byte = (index / 7) as u8;
            }
            let element = IconElement::encode_image(&image, &format).unwrap();
            let (decoded, _) =
                decode_payload(&element.data, &format, &EmbeddedDecoder)
                    .unwrap();
            let expected = if format.encoding == Encoding::Pack {
                image.convert_to(PixelFormat::RGB)
            } else {
                image
            };
            assert_eq!(decoded, expected);
        }
    }

    #[test]
    fn it32_has_zero_prefix() {
        let format = format(b"it32");
        let image = Image::new(PixelFormat::RGB, 128, 128);
        let element = IconElement::encode_image(&image, &format).unwrap();
        assert_eq!(&element.data[..4], &[0, 0, 0, 0]);
    }

    #[test]
    fn encode_wrong_size() {
        let image = Image::new(PixelFormat::RGB, 16, 16);
        let err = IconElement::encode_image(&image, &format(b"il32"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn write_element() {
        let element = IconElement::new(OSType(*b"quux"), b"foobar".to_vec());
        let mut output = Vec::new();
        element.write(&mut output).unwrap();
        assert_eq!(&output, b"quux\0\0\0\x0efoobar");
    }

    #[test]
    fn chunk_iter_walks_and_stops() {
        let input: &[u8] = b"icns\0\0\0\x1fquux\0\0\0\x0efoobarbaz!\0\0\0\x09#";
        let chunks: Vec<_> = ChunkIter::new(input, 8).collect();
        assert_eq!(chunks.len(), 2);
        let first = chunks[0].unwrap();
        assert_eq!(first.ostype, OSType(*b"quux"));
        assert_eq!(first.payload, b"foobar");
        let second = chunks[1].unwrap();
        assert_eq!(second.offset, 22);
        assert_eq!(second.payload, b"#");
    }

    #[test]
    fn chunk_iter_reports_overlong_chunk() {
        let input: &[u8] = b"quux\0\0\0\x20foo";
        let mut iter = ChunkIter::new(input, 0);
        assert_eq!(iter.next().unwrap().unwrap_err(),
                   TruncatedChunk {
                       offset: 0,
                       ostype: Some(OSType(*b"quux")),
                       declared: 32,
                       available: 11,
                   });
        assert!(iter.next().is_none());
    }

    #[test]
    fn chunk_iter_reports_undersized_length() {
        let input: &[u8] = b"quux\0\0\0\x04";
        let mut iter = ChunkIter::new(input, 0);
        assert_eq!(iter.next().unwrap().unwrap_err().declared, 4);
        assert!(iter.next().is_none());
    }

    #[test]
    fn chunk_iter_reports_short_header() {
        let input: &[u8] = b"qu";
        let mut iter = ChunkIter::new(input, 0);
        assert_eq!(iter.next().unwrap().unwrap_err().ostype, None);
        assert!(iter.next().is_none());
    }

    #[test]
    fn read_element() {
        let input: &[u8] = b"quux\0\0\0\x0bfoobar";
        let element = IconElement::read(input).expect("failed to read");
        assert_eq!(element.ostype, OSType(*b"quux"));
        assert_eq!(element.data, b"foo".to_vec());
    }

    #[test]
    fn read_element_reports_truncation() {
        let input: &[u8] = b"ic08\0\0\x10\0partial";
        match IconElement::read(input) {
            Err(Error::TruncatedChunk { ostype, declared, available }) => {
                assert_eq!(ostype, OSType(*b"ic08"));
                assert_eq!(declared, 0x1000);
                assert_eq!(available, 15);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn decode_image_of_unknown_code() {
        let element = IconElement::new(OSType(*b"TOC "), vec![]);
        assert!(matches!(element.decode_image(),
                         Err(Error::Unsupported(code)) if code == OSType(*b"TOC ")));
    }

    #[test]
    fn decode_image_of_mask() {
        let element = IconElement::new(OSType(*b"s8mk"), vec![0x7f; 256]);
        let image = element.decode_image().expect("failed to decode mask");
        assert_eq!(image.pixel_format(), PixelFormat::Alpha);
        assert_eq!(image.width(), 16);
    }
}
