use std::fmt;
use std::str::FromStr;

/// Types of icon elements that this library knows how to decode.
#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum IconType {
    /// 16x16 24-bit icon (without alpha), run-length encoded.
    RGB24_16x16,
    /// 16x16 8-bit alpha mask.
    Mask8_16x16,
    /// 32x32 24-bit icon (without alpha), run-length encoded.
    RGB24_32x32,
    /// 32x32 8-bit alpha mask.
    Mask8_32x32,
    /// 48x48 24-bit icon (without alpha), run-length encoded.
    RGB24_48x48,
    /// 48x48 8-bit alpha mask.
    Mask8_48x48,
    /// 128x128 24-bit icon (without alpha), run-length encoded.
    RGB24_128x128,
    /// 128x128 8-bit alpha mask.
    Mask8_128x128,
    /// 16x16 32-bit ARGB icon.
    ARGB32_16x16,
    /// 32x32 32-bit ARGB icon.
    ARGB32_32x32,
    /// 16x16 embedded PNG/JPEG 2000 icon.
    RGBA32_16x16,
    /// 32x32 embedded PNG/JPEG 2000 icon.
    RGBA32_32x32,
    /// 64x64 embedded PNG/JPEG 2000 icon.
    RGBA32_64x64,
    /// 128x128 embedded PNG/JPEG 2000 icon.
    RGBA32_128x128,
    /// 256x256 embedded PNG/JPEG 2000 icon.
    RGBA32_256x256,
    /// 512x512 embedded PNG/JPEG 2000 icon.
    RGBA32_512x512,
    /// 512x512 icon at 2x "retina" density (so, 1024 by 1024 pixels).
    RGBA32_512x512_2x,
    /// 16x16 icon at 2x "retina" density (so, 32 by 32 pixels).
    RGBA32_16x16_2x,
    /// 32x32 icon at 2x "retina" density (so, 64 by 64 pixels).
    RGBA32_32x32_2x,
    /// 128x128 icon at 2x "retina" density (so, 256 by 256 pixels).
    RGBA32_128x128_2x,
    /// 256x256 icon at 2x "retina" density (so, 512 by 512 pixels).
    RGBA32_256x256_2x,
}

impl IconType {
    /// Every icon type, legacy pairs first.
    pub const ALL: [IconType; 21] = [
        IconType::RGB24_16x16,
        IconType::Mask8_16x16,
        IconType::RGB24_32x32,
        IconType::Mask8_32x32,
        IconType::RGB24_48x48,
        IconType::Mask8_48x48,
        IconType::RGB24_128x128,
        IconType::Mask8_128x128,
        IconType::ARGB32_16x16,
        IconType::ARGB32_32x32,
        IconType::RGBA32_16x16,
        IconType::RGBA32_32x32,
        IconType::RGBA32_64x64,
        IconType::RGBA32_128x128,
        IconType::RGBA32_256x256,
        IconType::RGBA32_512x512,
        IconType::RGBA32_512x512_2x,
        IconType::RGBA32_16x16_2x,
        IconType::RGBA32_32x32_2x,
        IconType::RGBA32_128x128_2x,
        IconType::RGBA32_256x256_2x,
    ];

    /// Get the icon type associated with the given OSType, if any.
    pub fn from_ostype(ostype: OSType) -> Option<IconType> {
        let OSType(raw_ostype) = ostype;
        match &raw_ostype {
            b"is32" => Some(IconType::RGB24_16x16),
            b"s8mk" => Some(IconType::Mask8_16x16),
            b"il32" => Some(IconType::RGB24_32x32),
            b"l8mk" => Some(IconType::Mask8_32x32),
            b"ih32" => Some(IconType::RGB24_48x48),
            b"h8mk" => Some(IconType::Mask8_48x48),
            b"it32" => Some(IconType::RGB24_128x128),
            b"t8mk" => Some(IconType::Mask8_128x128),
            b"ic04" => Some(IconType::ARGB32_16x16),
            b"ic05" => Some(IconType::ARGB32_32x32),
            b"icp4" => Some(IconType::RGBA32_16x16),
            b"icp5" => Some(IconType::RGBA32_32x32),
            b"icp6" => Some(IconType::RGBA32_64x64),
            b"ic07" => Some(IconType::RGBA32_128x128),
            b"ic08" => Some(IconType::RGBA32_256x256),
            b"ic09" => Some(IconType::RGBA32_512x512),
            b"ic10" => Some(IconType::RGBA32_512x512_2x),
            b"ic11" => Some(IconType::RGBA32_16x16_2x),
            b"ic12" => Some(IconType::RGBA32_32x32_2x),
            b"ic13" => Some(IconType::RGBA32_128x128_2x),
            b"ic14" => Some(IconType::RGBA32_256x256_2x),
            _ => None,
        }
    }

    /// Get the OSType that represents this icon type.
    pub fn ostype(self) -> OSType {
        match self {
            IconType::RGB24_16x16 => OSType(*b"is32"),
            IconType::Mask8_16x16 => OSType(*b"s8mk"),
            IconType::RGB24_32x32 => OSType(*b"il32"),
            IconType::Mask8_32x32 => OSType(*b"l8mk"),
            IconType::RGB24_48x48 => OSType(*b"ih32"),
            IconType::Mask8_48x48 => OSType(*b"h8mk"),
            IconType::RGB24_128x128 => OSType(*b"it32"),
            IconType::Mask8_128x128 => OSType(*b"t8mk"),
            IconType::ARGB32_16x16 => OSType(*b"ic04"),
            IconType::ARGB32_32x32 => OSType(*b"ic05"),
            IconType::RGBA32_16x16 => OSType(*b"icp4"),
            IconType::RGBA32_32x32 => OSType(*b"icp5"),
            IconType::RGBA32_64x64 => OSType(*b"icp6"),
            IconType::RGBA32_128x128 => OSType(*b"ic07"),
            IconType::RGBA32_256x256 => OSType(*b"ic08"),
            IconType::RGBA32_512x512 => OSType(*b"ic09"),
            IconType::RGBA32_512x512_2x => OSType(*b"ic10"),
            IconType::RGBA32_16x16_2x => OSType(*b"ic11"),
            IconType::RGBA32_32x32_2x => OSType(*b"ic12"),
            IconType::RGBA32_128x128_2x => OSType(*b"ic13"),
            IconType::RGBA32_256x256_2x => OSType(*b"ic14"),
        }
    }

    /// Returns the pixel data width (and height; icons are square) of this
    /// icon type.  For 2x "retina" density icons this is twice the screen
    /// width.
    ///
    /// # Examples
    /// ```
    /// use icns_chunks::IconType;
    /// assert_eq!(IconType::Mask8_128x128.pixel_width(), 128);
    /// assert_eq!(IconType::RGBA32_256x256.pixel_width(), 256);
    /// assert_eq!(IconType::RGBA32_256x256_2x.pixel_width(), 512);
    /// ```
    pub fn pixel_width(self) -> u32 {
        self.screen_width() * self.pixel_density()
    }

    /// Returns the pixel density for this icon type -- that is, 2 for 2x
    /// "retina" density icons, or 1 for other icon types.
    pub fn pixel_density(self) -> u32 {
        match self {
            IconType::RGBA32_512x512_2x
            | IconType::RGBA32_16x16_2x
            | IconType::RGBA32_32x32_2x
            | IconType::RGBA32_128x128_2x
            | IconType::RGBA32_256x256_2x => 2,
            _ => 1,
        }
    }

    /// Returns the screen width of this icon type.
    pub fn screen_width(self) -> u32 {
        match self {
            IconType::RGB24_16x16
            | IconType::Mask8_16x16
            | IconType::ARGB32_16x16
            | IconType::RGBA32_16x16
            | IconType::RGBA32_16x16_2x => 16,
            IconType::RGB24_32x32
            | IconType::Mask8_32x32
            | IconType::ARGB32_32x32
            | IconType::RGBA32_32x32
            | IconType::RGBA32_32x32_2x => 32,
            IconType::RGB24_48x48 | IconType::Mask8_48x48 => 48,
            IconType::RGBA32_64x64 => 64,
            IconType::RGB24_128x128
            | IconType::Mask8_128x128
            | IconType::RGBA32_128x128
            | IconType::RGBA32_128x128_2x => 128,
            IconType::RGBA32_256x256 | IconType::RGBA32_256x256_2x => 256,
            IconType::RGBA32_512x512 | IconType::RGBA32_512x512_2x => 512,
        }
    }

    /// Returns the encoding used within an ICNS file for this icon type.
    pub fn encoding(self) -> Encoding {
        match self {
            IconType::RGB24_16x16
            | IconType::RGB24_32x32
            | IconType::RGB24_48x48
            | IconType::RGB24_128x128 => Encoding::Pack,
            IconType::Mask8_16x16
            | IconType::Mask8_32x32
            | IconType::Mask8_48x48
            | IconType::Mask8_128x128 => Encoding::Mask8,
            IconType::ARGB32_16x16 | IconType::ARGB32_32x32 => Encoding::Argb,
            _ => Encoding::Embedded,
        }
    }

    /// Returns the oldest platform generation that understands this icon
    /// type.
    pub fn compatibility(self) -> Compatibility {
        match self.encoding() {
            Encoding::Pack | Encoding::Mask8 => Compatibility::Allegro,
            // Provisional; see DESIGN.md.
            Encoding::Argb => Compatibility::Cheetah,
            Encoding::Embedded => match self {
                IconType::RGBA32_256x256 | IconType::RGBA32_512x512 => {
                    Compatibility::Leopard
                }
                IconType::RGBA32_16x16_2x
                | IconType::RGBA32_32x32_2x
                | IconType::RGBA32_128x128_2x
                | IconType::RGBA32_256x256_2x => Compatibility::MountainLion,
                _ => Compatibility::Lion,
            },
        }
    }

    /// Returns true if this is an alpha mask type.
    pub fn is_mask(self) -> bool {
        self.encoding() == Encoding::Mask8
    }

    /// For a color type, returns the mask type that supplies its alpha
    /// channel; for a mask type, returns the color type it belongs to.
    /// Returns `None` for types that carry their own alpha.
    ///
    /// # Examples
    /// ```
    /// use icns_chunks::IconType;
    /// assert_eq!(IconType::RGB24_32x32.paired_type(),
    ///            Some(IconType::Mask8_32x32));
    /// assert_eq!(IconType::Mask8_32x32.paired_type(),
    ///            Some(IconType::RGB24_32x32));
    /// assert_eq!(IconType::RGBA32_32x32.paired_type(), None);
    /// ```
    pub fn paired_type(self) -> Option<IconType> {
        match self {
            IconType::RGB24_16x16 => Some(IconType::Mask8_16x16),
            IconType::Mask8_16x16 => Some(IconType::RGB24_16x16),
            IconType::RGB24_32x32 => Some(IconType::Mask8_32x32),
            IconType::Mask8_32x32 => Some(IconType::RGB24_32x32),
            IconType::RGB24_48x48 => Some(IconType::Mask8_48x48),
            IconType::Mask8_48x48 => Some(IconType::RGB24_48x48),
            IconType::RGB24_128x128 => Some(IconType::Mask8_128x128),
            IconType::Mask8_128x128 => Some(IconType::RGB24_128x128),
            _ => None,
        }
    }
}

/// A Macintosh OSType (also known as a ResType), used in ICNS files to
/// identify the type of each chunk.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct OSType(pub [u8; 4]);

impl OSType {
    /// Returns the OSType as a big-endian integer.
    pub fn to_u32(self) -> u32 {
        u32::from_be_bytes(self.0)
    }
}

impl From<u32> for OSType {
    fn from(code: u32) -> OSType {
        OSType(code.to_be_bytes())
    }
}

impl fmt::Display for OSType {
    fn fmt(&self, out: &mut fmt::Formatter) -> fmt::Result {
        let &OSType(raw) = self;
        for &byte in &raw {
            // Latin-1 maps every byte to a char.
            write!(out, "{}", char::from(byte))?;
        }
        Ok(())
    }
}

impl FromStr for OSType {
    type Err = String;

    fn from_str(input: &str) -> Result<OSType, String> {
        let bytes = input.as_bytes();
        if bytes.len() != 4 {
            Err(format!("OSType string must be 4 bytes (was {})", bytes.len()))
        } else {
            let mut raw = [0u8; 4];
            raw.clone_from_slice(bytes);
            Ok(OSType(raw))
        }
    }
}

/// Method of encoding an image within an icon element.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Encoding {
    /// Run-length compressed 24-bit RGB, one plane per channel.
    Pack,
    /// Uncompressed 8-bit alpha mask.
    Mask8,
    /// 32-bit ARGB planes, run-length compressed behind an `ARGB` tag.
    Argb,
    /// An embedded PNG or JPEG 2000 file.
    Embedded,
}

/// Platform generations, oldest first.  Each icon type was introduced for
/// one of these, and a parsed family spans a range of them.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Compatibility {
    /// Mac OS 8.5.
    Allegro,
    /// Mac OS X 10.0.
    Cheetah,
    /// Mac OS X 10.5.
    Leopard,
    /// Mac OS X 10.7.
    Lion,
    /// OS X 10.8.
    MountainLion,
}

impl Compatibility {
    /// The oldest generation.
    pub const OLDEST: Compatibility = Compatibility::Allegro;
    /// The newest generation.
    pub const NEWEST: Compatibility = Compatibility::MountainLion;
}

/// An inclusive range of platform generations.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CompatRange {
    /// Oldest generation in the range.
    pub min: Compatibility,
    /// Newest generation in the range.
    pub max: Compatibility,
}

impl CompatRange {
    /// The range covering every generation.
    pub const FULL: CompatRange = CompatRange {
        min: Compatibility::OLDEST,
        max: Compatibility::NEWEST,
    };

    /// A range containing exactly one generation.
    pub fn single(compat: Compatibility) -> CompatRange {
        CompatRange { min: compat, max: compat }
    }

    /// Returns this range widened to include `compat`.
    pub fn including(self, compat: Compatibility) -> CompatRange {
        CompatRange {
            min: self.min.min(compat),
            max: self.max.max(compat),
        }
    }

    /// Returns true if `compat` lies within the range.
    pub fn contains(&self, compat: Compatibility) -> bool {
        self.min <= compat && compat <= self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn icon_type_ostype_round_trip() {
        for icon_type in &IconType::ALL {
            let ostype = icon_type.ostype();
            let from = IconType::from_ostype(ostype);
            assert_eq!(Some(*icon_type), from);
        }
    }

    #[test]
    fn mask_pairs_are_symmetric() {
        for icon_type in &IconType::ALL {
            if let Some(paired) = icon_type.paired_type() {
                assert_eq!(paired.paired_type(), Some(*icon_type));
                assert_ne!(paired.is_mask(), icon_type.is_mask());
                assert_eq!(paired.pixel_width(), icon_type.pixel_width());
            }
        }
    }

    #[test]
    fn compatibility_is_ordered() {
        assert!(Compatibility::Allegro < Compatibility::Cheetah);
        assert!(Compatibility::Leopard < Compatibility::Lion);
        assert_eq!(IconType::RGBA32_256x256.compatibility(),
                   Compatibility::Leopard);
        assert_eq!(IconType::RGBA32_16x16_2x.compatibility(),
                   Compatibility::MountainLion);
        assert_eq!(IconType::RGB24_48x48.compatibility(),
                   Compatibility::Allegro);
    }

    #[test]
    fn compat_range_widens() {
        let range = CompatRange::single(Compatibility::Lion)
            .including(Compatibility::Allegro);
        assert_eq!(range.min, Compatibility::Allegro);
        assert_eq!(range.max, Compatibility::Lion);
        assert!(range.contains(Compatibility::Cheetah));
        assert!(!range.contains(Compatibility::MountainLion));
    }

    #[test]
    fn ostype_to_and_from_str() {
        let ostype = OSType::from_str("abcd").expect("failed to parse OSType");
        assert_eq!(ostype.to_string(), "abcd".to_string());
        assert_eq!(OSType::from(0x69636e73), OSType(*b"icns"));
        assert_eq!(OSType(*b"icns").to_u32(), 0x69636e73);
    }

    #[test]
    fn ostype_from_str_failure() {
        assert_eq!(OSType::from_str("abc"),
                   Err("OSType string must be 4 bytes (was 3)".to_string()));
        assert_eq!(OSType::from_str("abcde"),
                   Err("OSType string must be 4 bytes (was 5)".to_string()));
    }
}
