//! zlib stream framing (RFC 1950) around the DEFLATE encoder.
use crate::common::Compression;
use crate::deflate;
use crate::error::Result;
use crate::hash::Adler32;
use crate::utils::bitstream::LsbWriter;

/// Compression method 8 (deflate) with a 32 KiB window.
const CMF: u8 = 0x78;

/// Builds the two header bytes, with `FLEVEL` taken from `level` and no preset dictionary.
pub(crate) fn header(level: Compression) -> [u8; 2] {
    let flg = level.zlib_level() << 6;
    let check = (u16::from(CMF) << 8 | u16::from(flg)) % 31;
    [CMF, flg + ((31 - check) % 31) as u8]
}

/// Compresses `data` into a complete zlib stream: header, DEFLATE data and the big-endian
/// Adler-32 of `data`.
pub fn compress(data: &[u8], level: Compression) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(data.len() / 2 + 64);
    out.extend_from_slice(&header(level));

    let mut writer = LsbWriter::new(out);
    deflate::deflate_into(data, level, &mut writer)?;
    let mut out = writer.finish();

    let mut adler = Adler32::new();
    adler.update(data);
    out.extend_from_slice(&adler.checksum().to_be_bytes());
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::adler32;
    use miniz_oxide::inflate::decompress_to_vec_zlib;

    #[test]
    fn header_bytes() {
        assert_eq!(header(Compression::NoCompression), [0x78, 0x01]);
        assert_eq!(header(Compression::Fast), [0x78, 0x5E]);
        assert_eq!(header(Compression::Balanced), [0x78, 0x9C]);
        assert_eq!(header(Compression::High), [0x78, 0xDA]);
    }

    #[test]
    fn header_check_bits() {
        for level in [
            Compression::NoCompression,
            Compression::Fast,
            Compression::Balanced,
            Compression::High,
        ] {
            let [cmf, flg] = header(level);
            assert_eq!((u16::from(cmf) << 8 | u16::from(flg)) % 31, 0);
            // FDICT stays clear.
            assert_eq!(flg & 0x20, 0);
            assert_eq!(flg >> 6, level.zlib_level());
        }
    }

    #[test]
    fn trailer_is_adler32() {
        let data: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();
        let out = compress(&data, Compression::Balanced).unwrap();
        let trailer: [u8; 4] = out[out.len() - 4..].try_into().unwrap();
        assert_eq!(u32::from_be_bytes(trailer), adler32(&data));
    }

    #[test]
    fn empty_stream() {
        let out = compress(&[], Compression::Balanced).unwrap();
        assert_eq!(out, vec![0x78, 0x9C, 0x03, 0x00, 0x00, 0x00, 0x00, 0x01]);
        assert!(decompress_to_vec_zlib(&out).unwrap().is_empty());
    }

    #[test]
    fn inflates_with_miniz() {
        let data: Vec<u8> = (0..100_000u32).map(|i| ((i * 7) ^ (i >> 5)) as u8).collect();
        for level in [
            Compression::NoCompression,
            Compression::Fast,
            Compression::Balanced,
            Compression::High,
        ] {
            let out = compress(&data, level).unwrap();
            assert_eq!(decompress_to_vec_zlib(&out).unwrap(), data, "{:?}", level);
        }
    }
}
