/// A decoded icon image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Image {
    pub(crate) format: PixelFormat,
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) data: Box<[u8]>,
}

impl Image {
    /// Creates a new image with all pixel data set to zero.
    ///
    /// # Panics
    ///
    /// Panics if the pixel data size does not fit in memory; see
    /// [`Image::data_length`].
    pub fn new(format: PixelFormat, width: u32, height: u32) -> Image {
        let data_bytes = match Image::data_length(format, width, height) {
            Some(length) => length,
            None => panic!("image of {}x{} pixels is too large", width, height),
        };
        Image {
            format,
            width,
            height,
            data: vec![0u8; data_bytes].into_boxed_slice(),
        }
    }

    /// Returns the number of bytes of pixel data an image of the given
    /// format and dimensions holds, or `None` if that overflows.
    pub fn data_length(format: PixelFormat, width: u32, height: u32) -> Option<usize> {
        let bits = u64::from(format.bits_per_pixel())
            .checked_mul(u64::from(width))?
            .checked_mul(u64::from(height))?;
        usize::try_from((bits + 7) / 8).ok()
    }

    /// Creates a new image using the given pixel data.  Returns `None` if
    /// the data has the wrong length for the format and dimensions.
    pub fn from_data(format: PixelFormat,
                     width: u32,
                     height: u32,
                     data: Vec<u8>)
                     -> Option<Image> {
        if Image::data_length(format, width, height)? != data.len() {
            return None;
        }
        Some(Image {
            format,
            width,
            height,
            data: data.into_boxed_slice(),
        })
    }

    /// Creates a copy of this image converted to the given pixel format.
    /// Color is reduced to luma when dropping to a gray format, and alpha is
    /// fully opaque when the source has none.
    pub fn convert_to(&self, format: PixelFormat) -> Image {
        if format == self.format {
            return self.clone();
        }
        let num_pixels = (self.width * self.height) as usize;
        let mut data = Vec::with_capacity(num_pixels *
                                          format.bytes_per_pixel());
        for index in 0..num_pixels {
            let [r, g, b, a] = self.rgba_at(index);
            match format {
                PixelFormat::RGBA => data.extend_from_slice(&[r, g, b, a]),
                PixelFormat::RGB => data.extend_from_slice(&[r, g, b]),
                PixelFormat::GrayAlpha => {
                    data.extend_from_slice(&[luma(r, g, b), a])
                }
                PixelFormat::Gray => data.push(luma(r, g, b)),
                PixelFormat::Alpha => data.push(a),
            }
        }
        Image {
            format,
            width: self.width,
            height: self.height,
            data: data.into_boxed_slice(),
        }
    }

    /// Returns the pixel at `index` (row-major) as RGBA.
    fn rgba_at(&self, index: usize) -> [u8; 4] {
        let bytes = self.format.bytes_per_pixel();
        let px = &self.data[index * bytes..(index + 1) * bytes];
        match self.format {
            PixelFormat::RGBA => [px[0], px[1], px[2], px[3]],
            PixelFormat::RGB => [px[0], px[1], px[2], u8::MAX],
            PixelFormat::GrayAlpha => [px[0], px[0], px[0], px[1]],
            PixelFormat::Gray => [px[0], px[0], px[0], u8::MAX],
            // An alpha-only image is black with that alpha.
            PixelFormat::Alpha => [0, 0, 0, px[0]],
        }
    }

    /// Returns the format in which this image's pixel data is stored.
    pub fn pixel_format(&self) -> PixelFormat {
        self.format
    }

    /// Returns the width of the image, in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the height of the image, in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns a reference to the image's pixel data.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns a mutable reference to the image's pixel data.
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Splits the image into one plane per channel of `format`.
    pub(crate) fn planes(&self, format: PixelFormat) -> Vec<Vec<u8>> {
        let converted = self.convert_to(format);
        let channels = format.bytes_per_pixel();
        (0..channels)
            .map(|channel| {
                converted.data
                         .iter()
                         .skip(channel)
                         .step_by(channels)
                         .copied()
                         .collect()
            })
            .collect()
    }

    /// Interleaves equally sized planes into an image of `format`.
    pub(crate) fn from_planes(format: PixelFormat,
                              width: u32,
                              height: u32,
                              planes: &[&[u8]])
                              -> Image {
        let mut image = Image::new(format, width, height);
        let channels = planes.len();
        debug_assert_eq!(channels, format.bytes_per_pixel());
        for (channel, plane) in planes.iter().enumerate() {
            for (pixel, &value) in plane.iter().enumerate() {
                image.data[pixel * channels + channel] = value;
            }
        }
        image
    }
}

/// A format for storing pixel data in an image.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum PixelFormat {
    /// 32-bit color with alpha channel.
    RGBA,
    /// 24-bit color with no alpha.
    RGB,
    /// 16-bit grayscale-with-alpha.
    GrayAlpha,
    /// 8-bit grayscale with no alpha.
    Gray,
    /// 8-bit alpha mask with no color.
    Alpha,
}

impl PixelFormat {
    /// Returns the number of bits needed to store a single pixel in this
    /// format.
    pub fn bits_per_pixel(self) -> u32 {
        match self {
            PixelFormat::RGBA => 32,
            PixelFormat::RGB => 24,
            PixelFormat::GrayAlpha => 16,
            PixelFormat::Gray => 8,
            PixelFormat::Alpha => 8,
        }
    }

    fn bytes_per_pixel(self) -> usize {
        (self.bits_per_pixel() / 8) as usize
    }
}

fn luma(r: u8, g: u8, b: u8) -> u8 {
    ((u32::from(r) * 299 + u32::from(g) * 587 + u32::from(b) * 114) / 1000) as u8
}
