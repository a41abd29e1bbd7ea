//! Chunk types and functions
use core::fmt;

use crate::hash::Crc32;

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkType(pub [u8; 4]);

// -- Critical chunks --

/// Image header
pub const IHDR: ChunkType = ChunkType(*b"IHDR");
/// Image data
pub const IDAT: ChunkType = ChunkType(*b"IDAT");
/// Image trailer
pub const IEND: ChunkType = ChunkType(*b"IEND");

/// Returns true if the chunk is critical.
pub fn is_critical(ChunkType(type_): ChunkType) -> bool {
    type_[0] & 32 == 0
}

/// Appends a complete chunk to `out`: length, type, payload and the CRC over type and payload.
///
/// The payload must be shorter than 2^31 bytes.
pub(crate) fn write_chunk(out: &mut Vec<u8>, type_: ChunkType, data: &[u8]) {
    debug_assert!(data.len() <= i32::MAX as usize);
    out.reserve(12 + data.len());
    out.extend_from_slice(&(data.len() as u32).to_be_bytes());
    out.extend_from_slice(&type_.0);
    out.extend_from_slice(data);

    let mut crc = Crc32::new();
    crc.update(&type_.0);
    crc.update(data);
    out.extend_from_slice(&crc.checksum().to_be_bytes());
}

impl fmt::Debug for ChunkType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        struct DebugType([u8; 4]);

        impl fmt::Debug for DebugType {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                for &c in &self.0[..] {
                    write!(f, "{}", char::from(c).escape_debug())?;
                }
                Ok(())
            }
        }

        f.debug_struct("ChunkType")
            .field("type", &DebugType(self.0))
            .field("critical", &is_critical(*self))
            .finish()
    }
}
