use log::debug;
use snafu::ensure;

use crate::chunk;
use crate::common::{BitDepth, ColorType, Compression, Info, PNG_SIGNATURE};
use crate::error::{self, Result};
use crate::filter::{filter_scanlines, AdaptiveFilterType, FilterType};
use crate::quantize::{quantize_grid, SampleGrid, SampleRange};
use crate::zlib;

/// Default upper bound for the payload of one `IDAT` chunk.
pub const DEFAULT_IDAT_SIZE: usize = 256 * 1024;

/// PNG Encoder
///
/// Turns a grid of `f32` samples into a complete PNG file in memory.
///
/// ```
/// use depthpng::{BitDepth, ColorType, Encoder};
///
/// let depth = vec![0.25f32; 64 * 48];
/// let mut encoder = Encoder::new(64, 48);
/// encoder.set_color(ColorType::Grayscale);
/// encoder.set_depth(BitDepth::Sixteen);
/// let png = encoder.encode(&depth)?;
/// assert_eq!(&png[1..4], b"PNG");
/// # Ok::<(), depthpng::EncodingError>(())
/// ```
#[derive(Clone, Debug)]
pub struct Encoder {
    width: i64,
    height: i64,
    color_type: ColorType,
    bit_depth: BitDepth,
    filter: FilterType,
    adaptive_filter: AdaptiveFilterType,
    compression: Compression,
    idat_size: usize,
    sample_range: SampleRange,
}

impl Encoder {
    /// Creates an encoder for a `width` x `height` image with default options.
    ///
    /// The dimensions are checked when encoding.
    pub fn new(width: i64, height: i64) -> Encoder {
        Encoder {
            width,
            height,
            color_type: ColorType::default(),
            bit_depth: BitDepth::default(),
            filter: FilterType::default(),
            adaptive_filter: AdaptiveFilterType::default(),
            compression: Compression::default(),
            idat_size: DEFAULT_IDAT_SIZE,
            sample_range: SampleRange::default(),
        }
    }

    /// Set the color of the encoded image.
    pub fn set_color(&mut self, color: ColorType) -> &mut Self {
        self.color_type = color;
        self
    }

    /// Set the bit depth of the encoded image.
    pub fn set_depth(&mut self, depth: BitDepth) -> &mut Self {
        self.bit_depth = depth;
        self
    }

    /// Set the filter used for every row when adaptive filtering is off.
    ///
    /// The default filter is [`FilterType::Sub`]. It only takes effect together with
    /// [`AdaptiveFilterType::NonAdaptive`].
    pub fn set_filter(&mut self, filter: FilterType) -> &mut Self {
        self.filter = filter;
        self
    }

    /// Set the adaptive filter type.
    ///
    /// Adaptive filtering tries every filter on each row and keeps the one with the smallest sum
    /// of absolute (signed) bytes. It is on by default.
    pub fn set_adaptive_filter(&mut self, adaptive_filter: AdaptiveFilterType) -> &mut Self {
        self.adaptive_filter = adaptive_filter;
        self
    }

    /// Set compression parameters.
    pub fn set_compression(&mut self, compression: Compression) -> &mut Self {
        self.compression = compression;
        self
    }

    /// Set the maximum payload of a single `IDAT` chunk. Must not be zero.
    pub fn set_idat_size(&mut self, idat_size: usize) -> &mut Self {
        self.idat_size = idat_size;
        self
    }

    /// Set the span of input values mapped onto the full sample range.
    pub fn set_sample_range(&mut self, range: SampleRange) -> &mut Self {
        self.sample_range = range;
        self
    }

    /// The header this encoder writes, if the dimensions are valid.
    pub fn info(&self) -> Result<Info> {
        Info::new(self.width, self.height, self.color_type, self.bit_depth)
    }

    /// Encodes `samples`, one per pixel in row-major order.
    ///
    /// An RGB image also accepts three interleaved samples per pixel. With one sample per pixel
    /// the value is written to all three channels.
    pub fn encode(&self, samples: &[f32]) -> Result<Vec<u8>> {
        let info = self.info()?;
        let channels = match (info.color_type, info.checked_pixel_count()) {
            (ColorType::Rgb, Some(pixels)) if pixels.checked_mul(3) == Some(samples.len()) => 3,
            _ => 1,
        };
        let grid = SampleGrid::with_channels(samples, self.width, self.height, channels)?;
        self.encode_info(&grid, info)
    }

    /// Encodes a grid whose dimensions match the encoder's.
    pub fn encode_grid(&self, grid: &SampleGrid<'_>) -> Result<Vec<u8>> {
        let info = self.info()?;
        self.encode_info(grid, info)
    }

    fn encode_info(&self, grid: &SampleGrid<'_>, info: Info) -> Result<Vec<u8>> {
        ensure!(
            self.idat_size > 0,
            error::UnsupportedConfigurationSnafu {
                reason: "IDAT chunk size of zero",
            }
        );
        ensure!(
            info.checked_filtered_len().is_some(),
            error::InvalidDimensionsSnafu {
                width: self.width,
                height: self.height,
            }
        );

        let mut raw = Vec::new();
        quantize_grid(grid, &info, self.sample_range, &mut raw)?;

        let mut filtered = Vec::new();
        filter_scanlines(
            &raw,
            &info,
            self.filter,
            self.adaptive_filter,
            &mut filtered,
        );
        drop(raw);

        let zlib_data = zlib::compress(&filtered, self.compression)?;
        let out = self.assemble(&info, &zlib_data);

        debug!(
            "encoded {}x{} {:?} {}-bit image: {} filtered bytes, {} compressed, {} total",
            info.width,
            info.height,
            info.color_type,
            info.bit_depth.into_u8(),
            filtered.len(),
            zlib_data.len(),
            out.len()
        );

        Ok(out)
    }

    fn assemble(&self, info: &Info, zlib_data: &[u8]) -> Vec<u8> {
        // Chunk lengths are limited to 2^31 - 1.
        let idat_size = self.idat_size.min(i32::MAX as usize);
        let idat_chunks = zlib_data.len().div_ceil(idat_size).max(1);
        let mut out = Vec::with_capacity(8 + 25 + zlib_data.len() + 12 * idat_chunks + 12);

        out.extend_from_slice(&PNG_SIGNATURE);
        chunk::write_chunk(&mut out, chunk::IHDR, &info.ihdr_data());
        for data in zlib_data.chunks(idat_size) {
            chunk::write_chunk(&mut out, chunk::IDAT, data);
        }
        chunk::write_chunk(&mut out, chunk::IEND, &[]);
        out
    }
}
