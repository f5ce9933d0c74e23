//! The table of chunk formats this library understands.
//!
//! A [`FormatRegistry`] maps an [`OSType`] to a [`FormatDescriptor`].  Color
//! formats and mask formats live in separate tables, since the parser treats
//! the two classes differently.  The registry is immutable once built, so one
//! instance can be shared freely between threads.

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::icontype::{Compatibility, Encoding, IconType, OSType};

/// Everything the parser needs to know about one chunk type.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FormatDescriptor {
    /// The icon type this descriptor was built from.
    pub icon_type: IconType,
    /// The chunk type code.
    pub ostype: OSType,
    /// Width and height, in pixels.
    pub resolution: u32,
    /// The platform generation that introduced the format.
    pub compatibility: Compatibility,
    /// How the payload is encoded.
    pub encoding: Encoding,
    /// The paired mask (for a color format) or color (for a mask format)
    /// type code.
    pub paired: Option<OSType>,
}

impl FormatDescriptor {
    /// Builds the descriptor for an icon type.
    pub fn for_icon_type(icon_type: IconType) -> FormatDescriptor {
        FormatDescriptor {
            icon_type,
            ostype: icon_type.ostype(),
            resolution: icon_type.pixel_width(),
            compatibility: icon_type.compatibility(),
            encoding: icon_type.encoding(),
            paired: icon_type.paired_type().map(IconType::ostype),
        }
    }
}

/// Lookup tables from chunk type code to format.
#[derive(Clone, Debug)]
pub struct FormatRegistry {
    images: HashMap<OSType, FormatDescriptor>,
    masks: HashMap<OSType, FormatDescriptor>,
}

impl FormatRegistry {
    /// Builds a registry containing every [`IconType`].
    pub fn new() -> FormatRegistry {
        FormatRegistry::from_icon_types(IconType::ALL.iter().copied())
    }

    /// Builds a registry containing only the given icon types.
    pub fn from_icon_types<I>(icon_types: I) -> FormatRegistry
    where
        I: IntoIterator<Item = IconType>,
    {
        let mut images = HashMap::new();
        let mut masks = HashMap::new();
        for icon_type in icon_types {
            let descriptor = FormatDescriptor::for_icon_type(icon_type);
            if icon_type.is_mask() {
                masks.insert(descriptor.ostype, descriptor);
            } else {
                images.insert(descriptor.ostype, descriptor);
            }
        }
        FormatRegistry { images, masks }
    }

    /// Returns the shared registry of every known format, built on first
    /// use.
    pub fn standard() -> &'static FormatRegistry {
        static STANDARD: OnceLock<FormatRegistry> = OnceLock::new();
        STANDARD.get_or_init(FormatRegistry::new)
    }

    /// Returns a copy of this registry with the given type removed.
    pub fn without(&self, icon_type: IconType) -> FormatRegistry {
        let mut registry = self.clone();
        let ostype = icon_type.ostype();
        registry.images.remove(&ostype);
        registry.masks.remove(&ostype);
        registry
    }

    /// Looks up a color (non-mask) format.
    pub fn image_format(&self, ostype: OSType) -> Option<&FormatDescriptor> {
        self.images.get(&ostype)
    }

    /// Looks up a mask format.
    pub fn mask_format(&self, ostype: OSType) -> Option<&FormatDescriptor> {
        self.masks.get(&ostype)
    }

    /// Looks up either kind of format, masks first.
    pub fn lookup(&self, ostype: OSType) -> Option<&FormatDescriptor> {
        self.mask_format(ostype).or_else(|| self.image_format(ostype))
    }

    /// Iterates over the color formats, in no particular order.
    pub fn image_formats(&self) -> impl Iterator<Item = &FormatDescriptor> {
        self.images.values()
    }
}

impl Default for FormatRegistry {
    fn default() -> FormatRegistry {
        FormatRegistry::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_table_sizes() {
        let registry = FormatRegistry::standard();
        assert_eq!(registry.masks.len(), 4);
        // 4 legacy + 2 ARGB + 11 embedded
        assert_eq!(registry.images.len(), 17);
        assert_eq!(registry.image_formats()
                       .filter(|format| format.encoding == Encoding::Embedded)
                       .count(),
                   11);
    }

    #[test]
    fn legacy_pair_shares_resolution() {
        let registry = FormatRegistry::standard();
        let color = registry.image_format(OSType(*b"ih32")).unwrap();
        let mask = registry.mask_format(OSType(*b"h8mk")).unwrap();
        assert_eq!(color.resolution, 48);
        assert_eq!(mask.resolution, 48);
        assert_eq!(color.paired, Some(mask.ostype));
        assert_eq!(mask.paired, Some(color.ostype));
        assert_eq!(color.encoding, Encoding::Pack);
        assert_eq!(mask.encoding, Encoding::Mask8);
        assert_eq!(color.compatibility, Compatibility::Allegro);
    }

    #[test]
    fn masks_are_not_image_formats() {
        let registry = FormatRegistry::standard();
        assert!(registry.image_format(OSType(*b"s8mk")).is_none());
        assert!(registry.mask_format(OSType(*b"is32")).is_none());
        assert!(registry.lookup(OSType(*b"s8mk")).is_some());
    }

    #[test]
    fn exact_match_only() {
        let registry = FormatRegistry::standard();
        assert!(registry.lookup(OSType(*b"IC08")).is_none());
        assert!(registry.lookup(OSType(*b"ic08")).is_some());
        assert_eq!(registry.image_format(OSType(*b"ic10")).unwrap().resolution,
                   1024);
        assert_eq!(registry.image_format(OSType(*b"ic04")).unwrap().encoding,
                   Encoding::Argb);
    }

    #[test]
    fn registry_without_type() {
        let registry = FormatRegistry::standard().without(IconType::RGBA32_16x16);
        assert!(registry.image_format(OSType(*b"icp4")).is_none());
        assert!(registry.image_format(OSType(*b"icp5")).is_some());
    }
}
