use byteorder::{BigEndian, WriteBytesExt};
use log::debug;
use std::io::{Read, Write};

use crate::element::IconElement;
use crate::error::{Error, Result};
use crate::icontype::{CompatRange, Encoding, IconType, OSType};
use crate::image::Image;
use crate::parser::{self, ChunkReport, ParseOptions};
use crate::registry::{FormatDescriptor, FormatRegistry};

/// The first four bytes of an ICNS file:
pub(crate) const ICNS_MAGIC_LITERAL: &[u8; 4] = b"icns";

/// The length of an icon family header, in bytes:
const ICON_FAMILY_HEADER_LENGTH: u32 = 8;

/// One decoded icon within a family.
#[derive(Clone, Debug)]
pub struct Asset {
    /// The chunk format the icon was read from (or will be written as).
    pub format: FormatDescriptor,
    /// The decoded pixels; `None` after a metadata-only parse.
    pub image: Option<Image>,
    /// Which codec produced the image (`"pack"`, `"argb"`, `"png"`, ...).
    pub label: Option<&'static str>,
    /// The chunk payload exactly as read, written back unchanged.  Empty for
    /// assets that were added rather than read.
    pub data: Vec<u8>,
    /// The mask chunk whose alpha was composited into `image`, if any.
    pub mask: Option<OSType>,
}

impl Asset {
    pub(crate) fn placeholder(format: FormatDescriptor) -> Asset {
        Asset {
            format,
            image: None,
            label: None,
            data: Vec::new(),
            mask: None,
        }
    }

    /// Returns the width (and height) of the asset, in pixels.
    pub fn resolution(&self) -> u32 {
        self.format.resolution
    }
}

/// A set of icons stored in a single ICNS file.
#[derive(Debug)]
pub struct IconFamily {
    /// The decoded icons, in file order.
    pub assets: Vec<Asset>,
    pub(crate) unsupported: Vec<OSType>,
    pub(crate) reports: Vec<ChunkReport>,
    pub(crate) compat: Option<CompatRange>,
    /// Mask chunks as read, one per code, written back with their color
    /// chunks.
    pub(crate) mask_chunks: Vec<IconElement>,
}

impl IconFamily {
    /// Creates a new, empty icon family that accepts icons for every
    /// platform generation.
    pub fn new() -> IconFamily {
        IconFamily::with_compatibility(CompatRange::FULL)
    }

    /// Creates a new, empty icon family whose [`add_icon`](#method.add_icon)
    /// only uses formats within the given range of platform generations.
    pub fn with_compatibility(range: CompatRange) -> IconFamily {
        IconFamily {
            compat: Some(range),
            ..IconFamily::empty()
        }
    }

    pub(crate) fn empty() -> IconFamily {
        IconFamily {
            assets: Vec::new(),
            unsupported: Vec::new(),
            reports: Vec::new(),
            compat: None,
            mask_chunks: Vec::new(),
        }
    }

    /// Reads an icon family from an ICNS file, decoding every icon.
    pub fn read<R: Read>(reader: R) -> Result<IconFamily> {
        IconFamily::read_with(reader, &ParseOptions::new())
    }

    /// Reads an icon family from an ICNS file with the given options.
    pub fn read_with<R: Read>(mut reader: R, options: &ParseOptions) -> Result<IconFamily> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        parser::parse(&data, options)
    }

    /// Returns true if the icon family contains no icons.
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Returns the type codes of chunks that were read but not understood,
    /// each listed once, in the order first seen.
    pub fn unsupported(&self) -> &[OSType] {
        &self.unsupported
    }

    /// Returns what the parser did with each chunk, in file order.
    pub fn reports(&self) -> &[ChunkReport] {
        &self.reports
    }

    /// Returns the range of platform generations spanned by the family's
    /// formats, or `None` if a parse decoded nothing.
    pub fn compatibility(&self) -> Option<CompatRange> {
        self.compat
    }

    /// Encodes the image into the family under every format of its size
    /// allowed by the family's compatibility range, replacing any icons
    /// already stored under those formats.  Returns an error if the image is
    /// not square or no format matches.
    pub fn add_icon(&mut self, image: &Image) -> Result<()> {
        if image.width() != image.height() {
            return Err(Error::Config(format!("image is not square ({}x{})",
                                             image.width(),
                                             image.height())));
        }
        let range = self.compat;
        let registry = FormatRegistry::standard();
        let formats: Vec<FormatDescriptor> = IconType::ALL
            .iter()
            .filter_map(|&icon_type| registry.image_format(icon_type.ostype()))
            .filter(|format| format.resolution == image.width())
            .filter(|format| range.map_or(false, |r| r.contains(format.compatibility)))
            .copied()
            .collect();
        if formats.is_empty() {
            return Err(Error::Config(format!("no available format for \
                                              resolution {}",
                                             image.width())));
        }
        for format in formats {
            self.store(image, format);
        }
        Ok(())
    }

    /// Encodes the image into the family using the given (non-mask) icon
    /// type, replacing any icon already stored under it.
    pub fn add_icon_with_type(&mut self, image: &Image, icon_type: IconType) -> Result<()> {
        if icon_type.is_mask() {
            return Err(Error::Config(format!("'{}' is a mask type",
                                             icon_type.ostype())));
        }
        let format = FormatDescriptor::for_icon_type(icon_type);
        if image.width() != format.resolution || image.height() != format.resolution {
            return Err(Error::Config(format!("image is {}x{}, but '{}' \
                                              requires {}x{}",
                                             image.width(),
                                             image.height(),
                                             format.ostype,
                                             format.resolution,
                                             format.resolution)));
        }
        self.store(image, format);
        Ok(())
    }

    fn store(&mut self, image: &Image, format: FormatDescriptor) {
        let asset = Asset {
            image: Some(image.clone()),
            ..Asset::placeholder(format)
        };
        match self.assets.iter_mut().find(|a| a.format.ostype == format.ostype) {
            Some(existing) => *existing = asset,
            None => self.assets.push(asset),
        }
    }

    /// Returns the asset with the smallest resolution at least as large as
    /// `resolution`, falling back to the largest asset.
    pub fn closest_resolution(&self, resolution: u32) -> Result<&Asset> {
        let mut best: Option<&Asset> = None;
        for asset in &self.assets {
            if asset.resolution() >= resolution &&
               best.map_or(true, |b| asset.resolution() < b.resolution()) {
                best = Some(asset);
            }
        }
        match best {
            Some(asset) => Ok(asset),
            None => self.highest_resolution_asset(),
        }
    }

    /// Returns the first image with exactly the given resolution.
    pub fn by_resolution(&self, resolution: u32) -> Result<&Image> {
        let asset = self.assets
                        .iter()
                        .find(|a| a.resolution() == resolution)
                        .ok_or_else(|| {
                            Error::NotFound(format!("no image with resolution {}",
                                                    resolution))
                        })?;
        asset.image.as_ref().ok_or(Error::MissingImage(asset.format.ostype))
    }

    /// Returns the first asset of the largest resolution in the family.
    pub fn highest_resolution_asset(&self) -> Result<&Asset> {
        let mut best: Option<&Asset> = None;
        for asset in &self.assets {
            if best.map_or(true, |b| asset.resolution() > b.resolution()) {
                best = Some(asset);
            }
        }
        best.ok_or_else(|| Error::NotFound("no valid image".to_string()))
    }

    /// Returns the image of the largest resolution in the family.
    pub fn highest_resolution(&self) -> Result<&Image> {
        let asset = self.highest_resolution_asset()?;
        asset.image.as_ref().ok_or(Error::MissingImage(asset.format.ostype))
    }

    /// Returns a human-readable listing of the family's contents.
    pub fn summary(&self) -> String {
        let mut out = format!("{} images:\n",
                              self.assets.len() + self.unsupported.len());
        for asset in &self.assets {
            out.push_str(&format!("[{}] {} image with resolution {}\n",
                                  asset.format.ostype,
                                  asset.label.unwrap_or("undecoded"),
                                  asset.resolution()));
        }
        for ostype in &self.unsupported {
            out.push_str(&format!("[{}] unsupported image format\n", ostype));
        }
        out
    }

    pub(crate) fn keep_mask_chunk(&mut self, ostype: OSType, data: &[u8]) {
        let element = IconElement::new(ostype, data.to_vec());
        match self.mask_chunks.iter_mut().find(|el| el.ostype == ostype) {
            Some(existing) => *existing = element,
            None => self.mask_chunks.push(element),
        }
    }

    /// Builds the chunks this family will be written as.  Assets read from a
    /// file are re-emitted byte for byte, each legacy one preceded by the
    /// mask chunk it was read with, if any.  Other assets are encoded from
    /// their images, legacy ones after a mask chunk built from the image's
    /// alpha channel.  Unsupported chunks are not written.
    pub fn to_elements(&self) -> Result<Vec<IconElement>> {
        let registry = FormatRegistry::standard();
        let mut elements = Vec::new();
        for asset in &self.assets {
            let format = &asset.format;
            if format.encoding == Encoding::Pack {
                if let Some(mask_format) = format.paired.and_then(|c| registry.mask_format(c)) {
                    if asset.data.is_empty() {
                        let image = asset.image
                                         .as_ref()
                                         .ok_or(Error::MissingImage(format.ostype))?;
                        elements.push(IconElement::encode_image(image, mask_format)?);
                    } else if let Some(raw) = self.mask_chunks
                                                  .iter()
                                                  .find(|el| el.ostype == mask_format.ostype) {
                        elements.push(raw.clone());
                    }
                }
            }
            if !asset.data.is_empty() {
                elements.push(IconElement::new(format.ostype, asset.data.clone()));
            } else {
                let image = asset.image
                                 .as_ref()
                                 .ok_or(Error::MissingImage(format.ostype))?;
                elements.push(IconElement::encode_image(image, format)?);
            }
        }
        Ok(elements)
    }

    /// Writes the icon family to an ICNS file.
    pub fn write<W: Write>(&self, mut writer: W) -> Result<()> {
        let elements = self.to_elements()?;
        let total_length = elements
            .iter()
            .fold(ICON_FAMILY_HEADER_LENGTH, |length, el| length + el.total_length());
        debug!("writing {} chunks, {} bytes", elements.len(), total_length);
        writer.write_all(ICNS_MAGIC_LITERAL)?;
        writer.write_u32::<BigEndian>(total_length)?;
        for element in &elements {
            element.write(writer.by_ref())?;
        }
        Ok(())
    }
}

impl Default for IconFamily {
    fn default() -> IconFamily {
        IconFamily::new()
    }
}
