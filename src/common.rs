//! Common types shared between the pipeline stages

use crate::error::{self, Result};
use snafu::ensure;

/// The first eight bytes of a PNG file always contain the following (decimal) values.
pub const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// Largest width or height a PNG header may carry.
pub const MAX_DIMENSION: i64 = (1 << 31) - 1;

/// Describes how a pixel is encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum ColorType {
    /// 1 grayscale sample.
    #[default]
    Grayscale = 0,
    /// 1 red sample, 1 green sample, 1 blue sample.
    Rgb = 2,
}

impl ColorType {
    /// Returns the number of samples used per pixel encoded in this way.
    pub fn samples(self) -> usize {
        match self {
            ColorType::Grayscale => 1,
            ColorType::Rgb => 3,
        }
    }
}

/// Bit depth of the PNG file.
/// Specifies the number of bits per sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum BitDepth {
    #[default]
    Eight = 8,
    Sixteen = 16,
}

impl BitDepth {
    pub(crate) fn into_u8(self) -> u8 {
        self as u8
    }

    /// Number of bytes one sample occupies in a scanline.
    pub fn bytes_per_sample(self) -> usize {
        match self {
            BitDepth::Eight => 1,
            BitDepth::Sixteen => 2,
        }
    }

    /// Largest sample value representable at this depth.
    pub fn max_value(self) -> u16 {
        match self {
            BitDepth::Eight => u16::from(u8::MAX),
            BitDepth::Sixteen => u16::MAX,
        }
    }
}

/// Internal count of bytes per pixel.
/// This is used for filtering which never uses sub-byte units. For the supported color types this
/// reduces the number of possible byte chunk lengths to four, appropriate to be defined as an
/// enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum BytesPerPixel {
    One = 1,
    Two = 2,
    Three = 3,
    Six = 6,
}

impl BytesPerPixel {
    pub fn new(color_type: ColorType, bit_depth: BitDepth) -> Self {
        match (color_type, bit_depth) {
            (ColorType::Grayscale, BitDepth::Eight) => BytesPerPixel::One,
            (ColorType::Grayscale, BitDepth::Sixteen) => BytesPerPixel::Two,
            (ColorType::Rgb, BitDepth::Eight) => BytesPerPixel::Three,
            (ColorType::Rgb, BitDepth::Sixteen) => BytesPerPixel::Six,
        }
    }

    pub fn into_usize(self) -> usize {
        self as usize
    }
}

/// The type and strength of applied compression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Compression {
    /// Only stored blocks. The output is larger than the input, but encoding is very fast.
    NoCompression,
    /// Short match searches and fixed Huffman codes only.
    Fast,
    /// Moderate match searches, dynamic Huffman codes where they pay off.
    #[default]
    Balanced,
    /// Long match searches. Slower, usually a few percent smaller than `Balanced`.
    High,
}

impl Compression {
    /// The two-bit `FLEVEL` field of a zlib header for this level.
    pub(crate) fn zlib_level(self) -> u8 {
        match self {
            Compression::NoCompression => 0,
            Compression::Fast => 1,
            Compression::Balanced => 2,
            Compression::High => 3,
        }
    }
}

/// Validated image geometry and sample format.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Info {
    pub width: u32,
    pub height: u32,
    pub bit_depth: BitDepth,
    /// How colors are stored in the image.
    pub color_type: ColorType,
}

impl Info {
    /// Checks caller supplied dimensions and builds the header description.
    ///
    /// Both dimensions have to be in `1..=2^31 - 1`.
    pub fn new(width: i64, height: i64, color_type: ColorType, bit_depth: BitDepth) -> Result<Info> {
        ensure!(
            (1..=MAX_DIMENSION).contains(&width) && (1..=MAX_DIMENSION).contains(&height),
            error::InvalidDimensionsSnafu { width, height }
        );

        // Both values are in 1..2^31 here, the casts are lossless.
        Ok(Info {
            width: width as u32,
            height: height as u32,
            bit_depth,
            color_type,
        })
    }

    /// Returns the number of bytes per pixel.
    pub fn bytes_per_pixel(&self) -> usize {
        self.color_type.samples() * self.bit_depth.bytes_per_sample()
    }

    pub(crate) fn bpp_in_prediction(&self) -> BytesPerPixel {
        BytesPerPixel::new(self.color_type, self.bit_depth)
    }

    /// Number of pixels, or `None` if it does not fit a `usize`.
    pub fn checked_pixel_count(&self) -> Option<usize> {
        usize::try_from(self.width)
            .ok()?
            .checked_mul(usize::try_from(self.height).ok()?)
    }

    /// Returns the number of image bytes in one row, without the filter type byte.
    pub fn row_bytes(&self) -> usize {
        self.width as usize * self.bytes_per_pixel()
    }

    /// Returns the number of bytes needed for one filtered row, including its filter type byte.
    pub fn raw_row_length(&self) -> usize {
        1 + self.row_bytes()
    }

    /// Total size of the filtered scanline stream, or `None` on overflow.
    pub(crate) fn checked_filtered_len(&self) -> Option<usize> {
        (self.width as usize)
            .checked_mul(self.bytes_per_pixel())?
            .checked_add(1)?
            .checked_mul(self.height as usize)
    }

    /// Serializes the 13 byte `IHDR` payload.
    pub fn ihdr_data(&self) -> [u8; 13] {
        let mut data = [0; 13];
        data[..4].copy_from_slice(&self.width.to_be_bytes());
        data[4..8].copy_from_slice(&self.height.to_be_bytes());
        data[8] = self.bit_depth.into_u8();
        data[9] = self.color_type as u8;
        // compression method, filter method and interlace method are always 0
        data
    }
}
