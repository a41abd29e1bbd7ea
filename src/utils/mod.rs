//!  Utilities

pub(crate) mod bitstream;
