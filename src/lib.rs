//! Library for reading and writing the chunks of Apple Icon Image (.icns)
//! files.
//!
//! An ICNS file is the magic literal `icns`, a big-endian file length, and a
//! sequence of chunks.  Each chunk is a four-byte type code (an
//! [`OSType`]), a big-endian length that includes the eight header bytes,
//! and a payload whose meaning depends on the type code.  The
//! [`FormatRegistry`] maps type codes to the way their payloads are encoded:
//!
//! * legacy color chunks (`is32`, `il32`, `ih32`, `it32`) hold run-length
//!   compressed RGB planes (see [`rle`]) with no alpha;
//! * legacy mask chunks (`s8mk`, `l8mk`, `h8mk`, `t8mk`) hold the 8-bit
//!   alpha for the color chunk of the same size;
//! * `ic04` and `ic05` hold ARGB planes;
//! * the remaining types embed a PNG or JPEG 2000 file.
//!
//! Reading is tolerant: unknown chunks are listed in
//! [`IconFamily::unsupported`], chunks that fail to decode are skipped, and a
//! chunk that runs past the end of the file ends the parse without an error.
//! [`IconFamily::reports`] records what happened to every chunk.
//!
//! By default a mask is only applied if it comes before its color chunk in
//! the file; see [`CompositeOrder`].
//!
//! See https://en.wikipedia.org/wiki/Apple_Icon_Image_format for more
//! information about the file format.

#![warn(missing_docs)]

use std::io::Read;

mod element;
mod embedded;
mod error;
mod family;
mod icontype;
mod image;
#[cfg(feature = "jp2io")]
mod jp2io;
pub mod mask;
mod parser;
#[cfg(feature = "pngio")]
mod pngio;
mod registry;
pub mod rle;

pub use self::element::IconElement;
pub use self::embedded::{EmbeddedDecoder, ImageDecoder};
pub use self::error::{CodecError, Error, Result};
pub use self::family::{Asset, IconFamily};
pub use self::icontype::{CompatRange, Compatibility, Encoding, IconType, OSType};
pub use self::image::{Image, PixelFormat};
pub use self::parser::{parse, ChunkReport, ChunkStatus, CompositeOrder, ParseOptions};
pub use self::registry::{FormatDescriptor, FormatRegistry};

/// Size information about the largest icon in an ICNS file.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct IconInfo {
    /// Width of the largest icon, in pixels.
    pub width: u32,
    /// Height of the largest icon, in pixels.
    pub height: u32,
    /// The chunk type the largest icon is stored as.
    pub ostype: OSType,
}

/// Reports the size of the largest icon in an ICNS file without decoding
/// any pixel data.
pub fn decode_config<R: Read>(mut reader: R) -> Result<IconInfo> {
    let mut data = Vec::new();
    reader.read_to_end(&mut data)?;
    let options = ParseOptions::new().with_metadata_only(true);
    let family = parse(&data, &options)?;
    let asset = family.highest_resolution_asset()?;
    Ok(IconInfo {
        width: asset.resolution(),
        height: asset.resolution(),
        ostype: asset.format.ostype,
    })
}

/// Reads an ICNS file and returns its largest icon.
pub fn decode<R: Read>(reader: R) -> Result<Image> {
    let family = IconFamily::read(reader)?;
    let asset = family.highest_resolution_asset()?;
    let ostype = asset.format.ostype;
    family.assets
          .into_iter()
          .find(|a| a.format.ostype == ostype)
          .and_then(|a| a.image)
          .ok_or(Error::MissingImage(ostype))
}
