//! Conversion of floating point samples to integer PNG samples.
//!
//! This is the only lossy step of the pipeline. Every sample is
//!
//! 1. mapped from the configured [`SampleRange`] onto `[0.0, 1.0]`,
//! 2. clamped to that interval, with `NaN` treated as `0.0` and infinities saturating,
//! 3. scaled to `0..=2^depth - 1` and rounded to the nearest integer, ties away from zero.
//!
//! 16-bit samples are stored big-endian, as PNG requires.
use snafu::ensure;

use crate::common::{BitDepth, ColorType, Info};
use crate::error::{self, Result};

/// Row-major view over caller owned samples.
///
/// A grid holds either one sample per pixel or three interleaved samples (red, green, blue) per
/// pixel.
#[derive(Clone, Copy, Debug)]
pub struct SampleGrid<'a> {
    samples: &'a [f32],
    width: u32,
    height: u32,
    channels: usize,
}

impl<'a> SampleGrid<'a> {
    /// Creates a single channel grid, e.g. a depth map.
    pub fn new(samples: &'a [f32], width: i64, height: i64) -> Result<Self> {
        Self::with_channels(samples, width, height, 1)
    }

    /// Creates a grid with `channels` interleaved samples per pixel.
    ///
    /// `channels` has to be 1 or 3.
    pub fn with_channels(
        samples: &'a [f32],
        width: i64,
        height: i64,
        channels: usize,
    ) -> Result<Self> {
        ensure!(
            channels == 1 || channels == 3,
            error::UnsupportedConfigurationSnafu {
                reason: format!("{channels} channels per pixel"),
            }
        );

        let info = Info::new(width, height, ColorType::Grayscale, BitDepth::Eight)?;
        let expected = info
            .checked_pixel_count()
            .and_then(|pixels| pixels.checked_mul(channels))
            .ok_or(error::EncodingError::InvalidDimensions { width, height })?;
        ensure!(
            samples.len() == expected,
            error::SampleCountMismatchSnafu {
                expected,
                actual: samples.len(),
            }
        );

        Ok(SampleGrid {
            samples,
            width: info.width,
            height: info.height,
            channels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Samples per pixel, 1 or 3.
    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn samples(&self) -> &'a [f32] {
        self.samples
    }

    /// Returns the samples of row `y`, or `None` past the last row.
    pub fn row(&self, y: u32) -> Option<&'a [f32]> {
        if y >= self.height {
            return None;
        }
        let len = self.width as usize * self.channels;
        let start = y as usize * len;
        self.samples.get(start..start + len)
    }
}

/// The span of input values mapped onto the full sample range.
///
/// `min` maps to 0 and `max` to the largest value of the bit depth. The default is `[0.0, 1.0]`,
/// which leaves samples unchanged before clamping.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SampleRange {
    min: f32,
    max: f32,
}

impl Default for SampleRange {
    fn default() -> Self {
        SampleRange { min: 0.0, max: 1.0 }
    }
}

impl SampleRange {
    /// Both bounds have to be finite and `min < max`.
    pub fn new(min: f32, max: f32) -> Result<Self> {
        ensure!(
            min.is_finite() && max.is_finite() && min < max,
            error::UnsupportedConfigurationSnafu {
                reason: format!("sample range [{min}, {max}]"),
            }
        );
        Ok(SampleRange { min, max })
    }

    pub fn min(&self) -> f32 {
        self.min
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    /// Maps `sample` onto `[0, 1]`, clamping and treating `NaN` as 0.
    pub fn normalize(&self, sample: f32) -> f64 {
        if sample.is_nan() {
            return 0.0;
        }
        let min = f64::from(self.min);
        let max = f64::from(self.max);
        // Infinities survive the subtraction and are caught by the clamp.
        let unit = (f64::from(sample) - min) / (max - min);
        if unit.is_nan() {
            0.0
        } else {
            unit.clamp(0.0, 1.0)
        }
    }
}

/// Quantizes one sample from the unit range to `depth`.
pub fn quantize(sample: f32, depth: BitDepth) -> u16 {
    quantize_in_range(sample, SampleRange::default(), depth)
}

/// Quantizes one sample from `range` to `depth`.
pub fn quantize_in_range(sample: f32, range: SampleRange, depth: BitDepth) -> u16 {
    let max = f64::from(depth.max_value());
    // `f64::round` rounds half-way cases away from zero.
    (range.normalize(sample) * max).round() as u16
}

/// Writes the unfiltered scanline bytes of `grid` for the format described by `info`.
///
/// The output has `height * info.row_bytes()` bytes and no filter type bytes. A single channel
/// grid is replicated into all three channels of an RGB image.
pub(crate) fn quantize_grid(
    grid: &SampleGrid<'_>,
    info: &Info,
    range: SampleRange,
    out: &mut Vec<u8>,
) -> Result<()> {
    ensure!(
        grid.width == info.width && grid.height == info.height,
        error::InvalidDimensionsSnafu {
            width: i64::from(grid.width),
            height: i64::from(grid.height),
        }
    );
    ensure!(
        grid.channels == 1 || info.color_type == ColorType::Rgb,
        error::UnsupportedConfigurationSnafu {
            reason: "three channel samples for a grayscale image",
        }
    );

    let repeat = info.color_type.samples() / grid.channels;
    out.clear();
    out.reserve(grid.samples.len() * repeat * info.bit_depth.bytes_per_sample());

    match info.bit_depth {
        BitDepth::Eight => {
            for &sample in grid.samples {
                let value = quantize_in_range(sample, range, BitDepth::Eight) as u8;
                out.extend(std::iter::repeat(value).take(repeat));
            }
        }
        BitDepth::Sixteen => {
            for &sample in grid.samples {
                let value = quantize_in_range(sample, range, BitDepth::Sixteen).to_be_bytes();
                for _ in 0..repeat {
                    out.extend_from_slice(&value);
                }
            }
        }
    }

    Ok(())
}
