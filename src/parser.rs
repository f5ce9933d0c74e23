//! The container parser: walks the chunks of an ICNS file, decodes the ones
//! the registry knows, and pairs legacy color chunks with their masks.

use byteorder::{BigEndian, ByteOrder};
use log::{debug, warn};
use std::collections::HashMap;

use crate::element::{decode_payload, ChunkIter, RawChunk, ICON_ELEMENT_HEADER_LENGTH};
use crate::embedded::{EmbeddedDecoder, ImageDecoder};
use crate::error::{Error, Result};
use crate::family::{Asset, IconFamily, ICNS_MAGIC_LITERAL};
use crate::icontype::{CompatRange, Compatibility, OSType};
use crate::image::Image;
use crate::mask;
use crate::registry::{FormatDescriptor, FormatRegistry};

/// When legacy color chunks are merged with their alpha masks.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum CompositeOrder {
    /// Composite while reading, so only a mask that comes before its color
    /// chunk is applied.  A mask stored after its color chunk is decoded
    /// but left unused.  This matches how most existing readers behave.
    #[default]
    InStream,
    /// Composite after the whole file has been read, so masks are applied
    /// wherever they appear.
    Deferred,
}

/// Settings for a single parse.
#[derive(Clone, Copy)]
pub struct ParseOptions<'a> {
    /// Record which formats are present without decoding any pixels.  Mask
    /// chunks are skipped entirely; image chunks yield assets with no image
    /// and no retained payload.
    pub metadata_only: bool,
    /// When masks are composited.
    pub composite_order: CompositeOrder,
    /// Reject files whose declared length differs from the input length.
    pub strict_length: bool,
    /// The formats to recognize.
    pub registry: &'a FormatRegistry,
    /// Decoder for embedded PNG/JPEG 2000 payloads.
    pub decoder: &'a dyn ImageDecoder,
}

impl ParseOptions<'static> {
    /// Full decoding, standard registry, default embedded decoder.
    pub fn new() -> ParseOptions<'static> {
        ParseOptions {
            metadata_only: false,
            composite_order: CompositeOrder::InStream,
            strict_length: false,
            registry: FormatRegistry::standard(),
            decoder: &EmbeddedDecoder,
        }
    }
}

impl<'a> ParseOptions<'a> {
    /// Sets metadata-only mode.
    pub fn with_metadata_only(mut self, metadata_only: bool) -> Self {
        self.metadata_only = metadata_only;
        self
    }

    /// Sets when masks are composited.
    pub fn with_composite_order(mut self, order: CompositeOrder) -> Self {
        self.composite_order = order;
        self
    }

    /// Sets whether the declared file length is enforced.
    pub fn with_strict_length(mut self, strict: bool) -> Self {
        self.strict_length = strict;
        self
    }

    /// Uses a different format registry.
    pub fn with_registry<'b>(self, registry: &'b FormatRegistry) -> ParseOptions<'b>
    where
        'a: 'b,
    {
        ParseOptions {
            metadata_only: self.metadata_only,
            composite_order: self.composite_order,
            strict_length: self.strict_length,
            registry,
            decoder: self.decoder,
        }
    }

    /// Uses a different embedded image decoder.
    pub fn with_decoder<'b>(self, decoder: &'b dyn ImageDecoder) -> ParseOptions<'b>
    where
        'a: 'b,
    {
        ParseOptions {
            metadata_only: self.metadata_only,
            composite_order: self.composite_order,
            strict_length: self.strict_length,
            registry: self.registry,
            decoder,
        }
    }
}

impl Default for ParseOptions<'static> {
    fn default() -> Self {
        ParseOptions::new()
    }
}

/// What happened to one chunk during a parse.
#[derive(Debug)]
pub enum ChunkStatus {
    /// An image chunk was decoded into the asset at this index.  In
    /// metadata-only mode the asset is a placeholder without pixels.
    Decoded { asset: usize },
    /// A mask chunk was decoded and held for its color chunk.
    MaskDecoded,
    /// A mask chunk was skipped because the parse is metadata-only.
    MaskIgnored,
    /// The type code is not in the registry.
    Unsupported,
    /// The payload failed to decode; the chunk was dropped.
    Skipped(Error),
    /// The chunk runs past the end of the input; parsing stopped here.
    Truncated { declared: u32, available: usize },
}

/// The outcome of one chunk, in file order.
#[derive(Debug)]
pub struct ChunkReport {
    /// Offset of the chunk header within the file.
    pub offset: usize,
    /// The chunk's type code, if its header was readable.
    pub ostype: Option<OSType>,
    /// What the parser did with it.
    pub status: ChunkStatus,
}

/// Parses an ICNS file held entirely in memory.
///
/// Only a wrong magic literal (or a length mismatch in strict mode) fails
/// the parse.  Unknown chunks, undecodable chunks and a truncated final
/// chunk are recorded in [`IconFamily::reports`] and otherwise ignored.
pub fn parse(data: &[u8], options: &ParseOptions) -> Result<IconFamily> {
    let header_length = ICON_ELEMENT_HEADER_LENGTH as usize;
    if data.len() < header_length || &data[..4] != ICNS_MAGIC_LITERAL {
        let mut found = [0u8; 4];
        let prefix = &data[..data.len().min(4)];
        found[..prefix.len()].copy_from_slice(prefix);
        return Err(Error::BadMagic { found });
    }
    let declared = BigEndian::read_u32(&data[4..8]);
    if declared as usize != data.len() {
        if options.strict_length {
            return Err(Error::BadLength {
                declared,
                actual: data.len(),
            });
        }
        warn!("icns declares {} bytes but input has {}", declared, data.len());
    }

    let mut parser = Parser {
        options,
        family: IconFamily::empty(),
        masks: HashMap::new(),
    };
    for chunk in ChunkIter::new(data, header_length) {
        match chunk {
            Ok(chunk) => parser.read_chunk(chunk),
            Err(truncated) => {
                warn!("chunk {} at offset {} declares {} bytes but only {} \
                       remain; ignoring the rest of the file",
                      describe(truncated.ostype),
                      truncated.offset,
                      truncated.declared,
                      truncated.available);
                parser.family.reports.push(ChunkReport {
                    offset: truncated.offset,
                    ostype: truncated.ostype,
                    status: ChunkStatus::Truncated {
                        declared: truncated.declared,
                        available: truncated.available,
                    },
                });
            }
        }
    }
    if options.composite_order == CompositeOrder::Deferred {
        parser.composite_deferred();
    }
    debug!("parsed {} assets, {} unsupported codes",
           parser.family.assets.len(),
           parser.family.unsupported.len());
    Ok(parser.family)
}

fn describe(ostype: Option<OSType>) -> String {
    match ostype {
        Some(ostype) => format!("'{}'", ostype),
        None => "<partial header>".to_string(),
    }
}

/// State for one parse call.
struct Parser<'o, 'r> {
    options: &'o ParseOptions<'r>,
    family: IconFamily,
    masks: HashMap<OSType, Image>,
}

impl<'o, 'r> Parser<'o, 'r> {
    fn read_chunk(&mut self, chunk: RawChunk) {
        debug!("chunk '{}' at offset {} ({} byte payload)",
               chunk.ostype,
               chunk.offset,
               chunk.payload.len());
        let registry = self.options.registry;
        let status = if let Some(format) = registry.mask_format(chunk.ostype) {
            self.read_mask(format, chunk.payload)
        } else if let Some(format) = registry.image_format(chunk.ostype) {
            self.read_image(format, chunk.payload)
        } else {
            debug!("unsupported chunk type '{}'", chunk.ostype);
            if !self.family.unsupported.contains(&chunk.ostype) {
                self.family.unsupported.push(chunk.ostype);
            }
            ChunkStatus::Unsupported
        };
        if let ChunkStatus::Skipped(ref err) = status {
            warn!("skipping chunk at offset {}: {}", chunk.offset, err);
        }
        self.family.reports.push(ChunkReport {
            offset: chunk.offset,
            ostype: Some(chunk.ostype),
            status,
        });
    }

    fn read_mask(&mut self, format: &FormatDescriptor, payload: &[u8]) -> ChunkStatus {
        if self.options.metadata_only {
            return ChunkStatus::MaskIgnored;
        }
        match decode_payload(payload, format, self.options.decoder) {
            Ok((image, _)) => {
                self.masks.insert(format.ostype, image);
                self.family.keep_mask_chunk(format.ostype, payload);
                self.note_compatibility(format.compatibility);
                ChunkStatus::MaskDecoded
            }
            Err(err) => skipped(format.ostype, err),
        }
    }

    fn read_image(&mut self, format: &FormatDescriptor, payload: &[u8]) -> ChunkStatus {
        let mut asset = Asset::placeholder(*format);
        if !self.options.metadata_only {
            let (mut image, label) =
                match decode_payload(payload, format, self.options.decoder) {
                    Ok(decoded) => decoded,
                    Err(err) => return skipped(format.ostype, err),
                };
            if self.options.composite_order == CompositeOrder::InStream {
                if let Some(mask_image) = format.paired.and_then(|code| self.masks.get(&code)) {
                    image = match mask::composite(&image, mask_image, format.resolution) {
                        Ok(composited) => composited,
                        Err(err) => return skipped(format.ostype, err),
                    };
                    asset.mask = format.paired;
                }
            }
            asset.image = Some(image);
            asset.label = Some(label);
            asset.data = payload.to_vec();
        }
        self.family.assets.push(asset);
        self.note_compatibility(format.compatibility);
        ChunkStatus::Decoded {
            asset: self.family.assets.len() - 1,
        }
    }

    fn note_compatibility(&mut self, compat: Compatibility) {
        self.family.compat = Some(match self.family.compat {
            Some(range) => range.including(compat),
            None => CompatRange::single(compat),
        });
    }

    /// Second pass for [`CompositeOrder::Deferred`].
    fn composite_deferred(&mut self) {
        for asset in &mut self.family.assets {
            let mask_code = match asset.format.paired {
                Some(code) => code,
                None => continue,
            };
            let (image, mask_image) = match (&asset.image, self.masks.get(&mask_code)) {
                (Some(image), Some(mask_image)) => (image, mask_image),
                _ => continue,
            };
            match mask::composite(image, mask_image, asset.format.resolution) {
                Ok(composited) => {
                    asset.image = Some(composited);
                    asset.mask = Some(mask_code);
                }
                Err(err) => {
                    warn!("could not apply mask '{}' to '{}': {}",
                          mask_code,
                          asset.format.ostype,
                          err);
                }
            }
        }
    }
}

fn skipped(ostype: OSType, err: Error) -> ChunkStatus {
    ChunkStatus::Skipped(Error::ChunkDecode {
        ostype,
        source: Box::new(err),
    })
}
