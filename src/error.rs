//! Contains detailed error representation.
//!
//! Every failure is detected before the first output byte is produced, so an `Err` never comes
//! with a partially written image. Retrying with the same input gives the same error: encoding is
//! deterministic.

use snafu::prelude::*;

/// The error type for encoding operations.
#[derive(Snafu, Debug, Clone, PartialEq, Eq)]
#[snafu(visibility(pub(crate)))]
#[non_exhaustive]
pub enum EncodingError {
    /// Width or height is not positive, or does not fit the 31-bit range a PNG header allows.
    #[snafu(display("invalid image dimensions {width}x{height}"))]
    InvalidDimensions { width: i64, height: i64 },

    /// The number of samples does not match `width * height * channels`.
    #[snafu(display("expected {expected} samples, got {actual}"))]
    SampleCountMismatch { expected: usize, actual: usize },

    /// A combination of options that this encoder does not implement.
    #[snafu(display("unsupported configuration: {reason}"))]
    UnsupportedConfiguration { reason: String },

    /// The compressor reached a state that valid input cannot produce.
    ///
    /// This indicates a bug in the encoder rather than bad input.
    #[snafu(display("internal compression error: {reason}"))]
    CompressionInternal { reason: String },
}

/// Result of an encoding process.
pub type Result<T> = std::result::Result<T, EncodingError>;
