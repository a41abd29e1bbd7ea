//! # PNG encoder for floating point sample grids
//!
//! This crate turns a row-major grid of `f32` samples, typically a depth or height map, into a
//! complete PNG file held in memory. Images are grayscale or RGB with 8 or 16 bits per sample.
//! Every part of the pipeline is implemented in the crate itself:
//!
//! 1. samples are clamped to a [`SampleRange`] and quantized,
//! 2. each scanline is filtered, adaptively by default,
//! 3. the filtered data is compressed into a zlib stream by a DEFLATE encoder,
//! 4. the stream is split into `IDAT` chunks between `IHDR` and `IEND`.
//!
//! ## Using the encoder
//!
//! ```
//! use depthpng::{BitDepth, ColorType};
//!
//! // A 4x2 ramp.
//! let samples = [0.0, 0.25, 0.5, 1.0, 1.0, 0.5, 0.25, 0.0];
//! let png = depthpng::encode(&samples, 4, 2, ColorType::Grayscale, BitDepth::Eight)?;
//! assert_eq!(&png[..8], &[137, 80, 78, 71, 13, 10, 26, 10]);
//! # Ok::<(), depthpng::EncodingError>(())
//! ```
//!
//! Metric data, such as depth in metres, is mapped onto the sample range first:
//!
//! ```
//! use depthpng::{BitDepth, Encoder, SampleRange};
//!
//! let depth_m = vec![1.5f32; 16 * 16];
//! let mut encoder = Encoder::new(16, 16);
//! encoder
//!     .set_depth(BitDepth::Sixteen)
//!     .set_sample_range(SampleRange::new(0.0, 5.0)?);
//! let png = encoder.encode(&depth_m)?;
//! # assert!(!png.is_empty());
//! # Ok::<(), depthpng::EncodingError>(())
//! ```
//!
//! ## Features
//!
//! - `rayon`: filter scanlines in parallel.

#![forbid(unsafe_code)]

pub mod chunk;
mod common;
pub mod deflate;
mod encoder;
mod error;
pub mod filter;
pub mod hash;
pub mod quantize;
mod utils;
pub mod zlib;

pub use crate::common::{BitDepth, BytesPerPixel, ColorType, Compression, Info, PNG_SIGNATURE};
pub use crate::encoder::{Encoder, DEFAULT_IDAT_SIZE};
pub use crate::error::{EncodingError, Result};
pub use crate::filter::{AdaptiveFilterType, FilterType};
pub use crate::quantize::{SampleGrid, SampleRange};

/// Encodes `samples` as a PNG image with default options.
///
/// `samples` holds `width * height` values in row-major order. For [`ColorType::Rgb`] each value
/// is written to all three channels, or `samples` holds three interleaved values per pixel.
/// Values are clamped to `[0.0, 1.0]` with `NaN` read as `0.0`.
///
/// On error no output is produced.
pub fn encode(
    samples: &[f32],
    width: i64,
    height: i64,
    color: ColorType,
    depth: BitDepth,
) -> Result<Vec<u8>> {
    let mut encoder = Encoder::new(width, height);
    encoder.set_color(color).set_depth(depth);
    encoder.encode(samples)
}
