//! A DEFLATE encoder (RFC 1951).
//!
//! The input is tokenized by a greedy hash chain match finder. Tokens are collected into blocks
//! and every block is written with whichever of the three block types (stored, fixed Huffman,
//! dynamic Huffman) costs the fewest bits, within what the [`Compression`] level allows.
use log::trace;
use snafu::ensure;

use crate::common::Compression;
use crate::error::{self, Result};
use crate::utils::bitstream::{BitWriter, LsbWriter};

use self::huffman::{
    HuffmanCode, MAX_CODE_LENGTH, MAX_CODE_LENGTH_CODE_LENGTH, NUM_DISTANCE_SYMBOLS,
    NUM_LITLEN_SYMBOLS,
};
use self::lz77::{MatchFinder, SearchParams, Token, MAX_MATCH, MIN_MATCH, WINDOW_SIZE};

mod huffman;
mod lz77;

/// Tokens collected before a block is emitted.
const BLOCK_TOKENS: usize = 1 << 14;

/// Largest payload of a single stored block.
const MAX_STORED_BLOCK: usize = u16::MAX as usize;

const END_OF_BLOCK: usize = 256;

/// Length code base values (codes 257-285).
const LENGTH_BASE: [u16; 29] = [
    3, 4, 5, 6, 7, 8, 9, 10, 11, 13, 15, 17, 19, 23, 27, 31, 35, 43, 51, 59, 67, 83, 99, 115, 131,
    163, 195, 227, 258,
];

/// Extra bits for length codes.
const LENGTH_EXTRA: [u8; 29] = [
    0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 2, 3, 3, 3, 3, 4, 4, 4, 4, 5, 5, 5, 5, 0,
];

/// Distance code base values (codes 0-29).
const DISTANCE_BASE: [u16; 30] = [
    1, 2, 3, 4, 5, 7, 9, 13, 17, 25, 33, 49, 65, 97, 129, 193, 257, 385, 513, 769, 1025, 1537,
    2049, 3073, 4097, 6145, 8193, 12289, 16385, 24577,
];

/// Extra bits for distance codes.
const DISTANCE_EXTRA: [u8; 30] = [
    0, 0, 0, 0, 1, 1, 2, 2, 3, 3, 4, 4, 5, 5, 6, 6, 7, 7, 8, 8, 9, 9, 10, 10, 11, 11, 12, 12, 13,
    13,
];

/// Order in which code length code lengths are transmitted.
const CODE_LENGTH_ORDER: [usize; 19] = [
    16, 17, 18, 0, 8, 7, 9, 6, 10, 5, 11, 4, 12, 3, 13, 2, 14, 1, 15,
];

/// A symbol together with the extra bits following its code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Coded {
    symbol: usize,
    extra_bits: u8,
    extra_value: u16,
}

/// Maps a match length to its literal/length symbol.
fn length_code(length: u16) -> Result<Coded> {
    ensure!(
        (MIN_MATCH..=MAX_MATCH).contains(&usize::from(length)),
        error::CompressionInternalSnafu {
            reason: format!("match length {length} out of range"),
        }
    );
    let index = LENGTH_BASE.partition_point(|&base| base <= length) - 1;
    Ok(Coded {
        symbol: 257 + index,
        extra_bits: LENGTH_EXTRA[index],
        extra_value: length - LENGTH_BASE[index],
    })
}

/// Maps a match distance to its distance symbol.
fn distance_code(distance: u16) -> Result<Coded> {
    ensure!(
        distance >= 1 && usize::from(distance) <= WINDOW_SIZE,
        error::CompressionInternalSnafu {
            reason: format!("match distance {distance} out of range"),
        }
    );
    let index = DISTANCE_BASE.partition_point(|&base| base <= distance) - 1;
    Ok(Coded {
        symbol: index,
        extra_bits: DISTANCE_EXTRA[index],
        extra_value: distance - DISTANCE_BASE[index],
    })
}

/// A token resolved into the symbols that get written.
#[derive(Clone, Copy, Debug)]
enum Symbol {
    Literal(u8),
    Match { length: Coded, distance: Coded },
}

impl Symbol {
    fn from_token(token: Token) -> Result<Symbol> {
        Ok(match token {
            Token::Literal(byte) => Symbol::Literal(byte),
            Token::Match { length, distance } => Symbol::Match {
                length: length_code(length)?,
                distance: distance_code(distance)?,
            },
        })
    }
}

fn search_params(level: Compression) -> SearchParams {
    match level {
        Compression::NoCompression | Compression::Fast => SearchParams {
            max_chain: 8,
            nice_length: 32,
        },
        Compression::Balanced => SearchParams {
            max_chain: 128,
            nice_length: 128,
        },
        Compression::High => SearchParams {
            max_chain: 1024,
            nice_length: MAX_MATCH,
        },
    }
}

/// Which block types a level may emit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum BlockKind {
    Stored,
    Fixed,
    Dynamic,
}

/// Compresses `data` into a raw DEFLATE stream.
pub fn deflate(data: &[u8], level: Compression) -> Result<Vec<u8>> {
    let mut writer = LsbWriter::new(Vec::with_capacity(data.len() / 2 + 64));
    deflate_into(data, level, &mut writer)?;
    Ok(writer.finish())
}

/// Writes the DEFLATE stream for `data` to `writer`, ending at a byte boundary.
pub(crate) fn deflate_into(data: &[u8], level: Compression, writer: &mut LsbWriter) -> Result<()> {
    if level == Compression::NoCompression {
        write_stored(writer, data, true);
        writer.align_to_byte();
        return Ok(());
    }

    let fixed = FixedCodes::new();
    let mut finder = MatchFinder::new(data, search_params(level));
    let mut symbols = Vec::with_capacity(BLOCK_TOKENS);

    loop {
        let block_start = finder.position();
        symbols.clear();
        for token in finder.by_ref().take(BLOCK_TOKENS) {
            symbols.push(Symbol::from_token(token)?);
        }
        let block_end = finder.position();
        let last = block_end == data.len();

        write_block(
            writer,
            &data[block_start..block_end],
            &symbols,
            level,
            &fixed,
            last,
        )?;

        if last {
            break;
        }
    }

    writer.align_to_byte();
    Ok(())
}

/// The two fixed codes, built once per stream.
struct FixedCodes {
    litlen: HuffmanCode,
    distance: HuffmanCode,
}

impl FixedCodes {
    fn new() -> Self {
        FixedCodes {
            litlen: HuffmanCode::fixed_litlen(),
            distance: HuffmanCode::fixed_distance(),
        }
    }
}

/// Symbol frequencies of one block.
struct Histogram {
    litlen: Vec<u32>,
    distance: Vec<u32>,
}

impl Histogram {
    fn new(symbols: &[Symbol]) -> Self {
        let mut litlen = vec![0u32; NUM_LITLEN_SYMBOLS];
        let mut distance = vec![0u32; NUM_DISTANCE_SYMBOLS];
        for symbol in symbols {
            match *symbol {
                Symbol::Literal(byte) => litlen[usize::from(byte)] += 1,
                Symbol::Match {
                    length,
                    distance: dist,
                } => {
                    litlen[length.symbol] += 1;
                    distance[dist.symbol] += 1;
                }
            }
        }
        litlen[END_OF_BLOCK] += 1;
        Histogram { litlen, distance }
    }

    /// Bits needed to write the block body, end of block included, with the given codes.
    fn cost(&self, litlen: &HuffmanCode, distance: &HuffmanCode) -> u64 {
        let mut bits = 0u64;
        for (symbol, &count) in self.litlen.iter().enumerate() {
            if count == 0 {
                continue;
            }
            let mut len = u64::from(litlen.lengths[symbol]);
            if symbol > END_OF_BLOCK {
                len += u64::from(LENGTH_EXTRA[symbol - 257]);
            }
            bits += u64::from(count) * len;
        }
        for (symbol, &count) in self.distance.iter().enumerate() {
            if count == 0 {
                continue;
            }
            let len = u64::from(distance.lengths[symbol]) + u64::from(DISTANCE_EXTRA[symbol]);
            bits += u64::from(count) * len;
        }
        bits
    }
}

/// Makes sure a code has at least two symbols, so that every tree is a complete prefix code.
fn ensure_two_symbols(freqs: &mut [u32]) {
    let mut used = freqs.iter().filter(|&&f| f > 0).count();
    for freq in freqs.iter_mut() {
        if used >= 2 {
            break;
        }
        if *freq == 0 {
            *freq = 1;
            used += 1;
        }
    }
}

/// The description of a dynamic block's codes, ready to be written.
struct DynamicHeader {
    litlen: HuffmanCode,
    distance: HuffmanCode,
    code_length_code: HuffmanCode,
    /// Run-length coded code lengths: symbol 0..=18 and its extra bits.
    runs: Vec<(u8, u8)>,
    hlit: usize,
    hdist: usize,
    hclen: usize,
}

impl DynamicHeader {
    fn new(histogram: &Histogram) -> Self {
        // Symbols 286, 287 and distances 30, 31 never occur in a valid stream.
        let mut litlen_freqs = histogram.litlen[..286].to_vec();
        let mut distance_freqs = histogram.distance[..30].to_vec();
        ensure_two_symbols(&mut litlen_freqs);
        ensure_two_symbols(&mut distance_freqs);

        let litlen = HuffmanCode::from_frequencies(&litlen_freqs, MAX_CODE_LENGTH);
        let distance = HuffmanCode::from_frequencies(&distance_freqs, MAX_CODE_LENGTH);

        let hlit = trimmed_len(&litlen.lengths, 257);
        let hdist = trimmed_len(&distance.lengths, 1);

        let mut all_lengths = litlen.lengths[..hlit].to_vec();
        all_lengths.extend_from_slice(&distance.lengths[..hdist]);
        let runs = run_length_encode(&all_lengths);

        let mut cl_freqs = vec![0u32; 19];
        for &(symbol, _) in &runs {
            cl_freqs[usize::from(symbol)] += 1;
        }
        ensure_two_symbols(&mut cl_freqs);
        let code_length_code =
            HuffmanCode::from_frequencies(&cl_freqs, MAX_CODE_LENGTH_CODE_LENGTH);

        let hclen = CODE_LENGTH_ORDER
            .iter()
            .rposition(|&symbol| code_length_code.lengths[symbol] != 0)
            .map_or(4, |last| (last + 1).max(4));

        DynamicHeader {
            litlen,
            distance,
            code_length_code,
            runs,
            hlit,
            hdist,
            hclen,
        }
    }

    /// Bits for the header fields after the three block header bits.
    fn cost(&self) -> u64 {
        let mut bits = 5 + 5 + 4 + 3 * self.hclen as u64;
        for &(symbol, _) in &self.runs {
            bits += u64::from(self.code_length_code.lengths[usize::from(symbol)]);
            bits += match symbol {
                16 => 2,
                17 => 3,
                18 => 7,
                _ => 0,
            };
        }
        bits
    }

    fn write(&self, writer: &mut LsbWriter) {
        writer.write_bits((self.hlit - 257) as u32, 5);
        writer.write_bits((self.hdist - 1) as u32, 5);
        writer.write_bits((self.hclen - 4) as u32, 4);
        for &symbol in &CODE_LENGTH_ORDER[..self.hclen] {
            writer.write_bits(u32::from(self.code_length_code.lengths[symbol]), 3);
        }
        for &(symbol, extra) in &self.runs {
            let (code, len) = self.code_length_code.code(usize::from(symbol));
            writer.write_bits(code, len);
            match symbol {
                16 => writer.write_bits(u32::from(extra), 2),
                17 => writer.write_bits(u32::from(extra), 3),
                18 => writer.write_bits(u32::from(extra), 7),
                _ => {}
            }
        }
    }
}

/// Length of `lengths` without trailing zeros, but at least `min`.
fn trimmed_len(lengths: &[u8], min: usize) -> usize {
    lengths
        .iter()
        .rposition(|&len| len != 0)
        .map_or(min, |last| (last + 1).max(min))
}

/// Run-length codes a code length sequence with symbols 16 (repeat previous 3-6 times),
/// 17 (3-10 zeros) and 18 (11-138 zeros).
fn run_length_encode(lengths: &[u8]) -> Vec<(u8, u8)> {
    let mut runs = Vec::new();
    let mut i = 0;

    while i < lengths.len() {
        let value = lengths[i];
        let run = lengths[i..].iter().take_while(|&&l| l == value).count();

        if value == 0 {
            let mut left = run;
            while left >= 11 {
                let n = left.min(138);
                runs.push((18, (n - 11) as u8));
                left -= n;
            }
            if left >= 3 {
                runs.push((17, (left - 3) as u8));
                left = 0;
            }
            runs.extend(std::iter::repeat((0, 0)).take(left));
        } else {
            runs.push((value, 0));
            let mut left = run - 1;
            while left >= 3 {
                let n = left.min(6);
                runs.push((16, (n - 3) as u8));
                left -= n;
            }
            runs.extend(std::iter::repeat((value, 0)).take(left));
        }

        i += run;
    }

    runs
}

/// Bits needed to store `len` bytes as stored blocks, starting at bit offset `bit_pos`.
fn stored_cost(len: usize, bit_pos: u64) -> u64 {
    let blocks = len.div_ceil(MAX_STORED_BLOCK).max(1) as u64;
    // The first header may need padding to reach a byte boundary, later ones always pad 5 bits.
    let first_pad = (8 - (bit_pos + 3) % 8) % 8;
    3 + first_pad + 32 + (blocks - 1) * (3 + 5 + 32) + 8 * len as u64
}

fn write_stored(writer: &mut LsbWriter, data: &[u8], last: bool) {
    let mut chunks = data.chunks(MAX_STORED_BLOCK).peekable();
    if chunks.peek().is_none() {
        write_stored_block(writer, &[], last);
        return;
    }
    while let Some(chunk) = chunks.next() {
        let final_chunk = last && chunks.peek().is_none();
        write_stored_block(writer, chunk, final_chunk);
    }
}

fn write_stored_block(writer: &mut LsbWriter, chunk: &[u8], last: bool) {
    writer.write_bits(u32::from(last), 1);
    writer.write_bits(0b00, 2);
    writer.align_to_byte();
    let len = chunk.len() as u16;
    writer.write_bytes(&len.to_le_bytes());
    writer.write_bytes(&(!len).to_le_bytes());
    writer.write_bytes(chunk);
}

fn write_symbols(
    writer: &mut LsbWriter,
    symbols: &[Symbol],
    litlen: &HuffmanCode,
    distance: &HuffmanCode,
) -> Result<()> {
    for symbol in symbols {
        match *symbol {
            Symbol::Literal(byte) => {
                let (code, len) = litlen.code(usize::from(byte));
                writer.write_bits(code, len);
            }
            Symbol::Match {
                length,
                distance: dist,
            } => {
                let (code, len) = litlen.code(length.symbol);
                let (dcode, dlen) = distance.code(dist.symbol);
                ensure!(
                    len > 0 && dlen > 0,
                    error::CompressionInternalSnafu {
                        reason: "symbol without a code",
                    }
                );
                writer.write_bits(code, len);
                writer.write_bits(u32::from(length.extra_value), length.extra_bits);
                writer.write_bits(dcode, dlen);
                writer.write_bits(u32::from(dist.extra_value), dist.extra_bits);
            }
        }
    }

    let (code, len) = litlen.code(END_OF_BLOCK);
    writer.write_bits(code, len);
    Ok(())
}

fn write_block(
    writer: &mut LsbWriter,
    raw: &[u8],
    symbols: &[Symbol],
    level: Compression,
    fixed: &FixedCodes,
    last: bool,
) -> Result<()> {
    let histogram = Histogram::new(symbols);

    let stored_bits = stored_cost(raw.len(), writer.bit_len());
    let fixed_bits = 3 + histogram.cost(&fixed.litlen, &fixed.distance);

    let mut kind = BlockKind::Fixed;
    let mut best_bits = fixed_bits;

    let dynamic = if level == Compression::Fast {
        None
    } else {
        let header = DynamicHeader::new(&histogram);
        let bits = 3 + header.cost() + histogram.cost(&header.litlen, &header.distance);
        if bits < best_bits {
            kind = BlockKind::Dynamic;
            best_bits = bits;
        }
        Some(header)
    };

    if stored_bits < best_bits {
        kind = BlockKind::Stored;
        best_bits = stored_bits;
    }

    trace!(
        "deflate block: {} bytes, {} tokens, {:?}, {} bits (stored {}, fixed {})",
        raw.len(),
        symbols.len(),
        kind,
        best_bits,
        stored_bits,
        fixed_bits
    );

    match (kind, dynamic) {
        (BlockKind::Stored, _) => write_stored(writer, raw, last),
        (BlockKind::Dynamic, Some(header)) => {
            writer.write_bits(u32::from(last), 1);
            writer.write_bits(0b10, 2);
            header.write(writer);
            write_symbols(writer, symbols, &header.litlen, &header.distance)?;
        }
        _ => {
            writer.write_bits(u32::from(last), 1);
            writer.write_bits(0b01, 2);
            write_symbols(writer, symbols, &fixed.litlen, &fixed.distance)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use miniz_oxide::inflate::decompress_to_vec;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const LEVELS: [Compression; 4] = [
        Compression::NoCompression,
        Compression::Fast,
        Compression::Balanced,
        Compression::High,
    ];

    fn assert_roundtrip(data: &[u8]) {
        for level in LEVELS {
            let compressed = deflate(data, level).unwrap();
            let inflated = decompress_to_vec(&compressed).unwrap();
            assert!(inflated == data, "{:?} does not roundtrip", level);
        }
    }

    /// Writes `data` as one final block and returns the block type bits, the number of bits
    /// written and the whole stream.
    fn single_block(data: &[u8], level: Compression) -> (u8, u64, Vec<u8>) {
        let symbols: Vec<Symbol> = MatchFinder::new(data, search_params(level))
            .map(|token| Symbol::from_token(token).unwrap())
            .collect();
        assert!(symbols.len() <= BLOCK_TOKENS);

        let mut writer = LsbWriter::default();
        let before = writer.bit_len();
        write_block(&mut writer, data, &symbols, level, &FixedCodes::new(), true).unwrap();
        let written = writer.bit_len() - before;

        let stream = writer.finish();
        assert_eq!(decompress_to_vec(&stream).unwrap(), data);
        ((stream[0] >> 1) & 0b11, written, stream)
    }

    fn histogram_of(data: &[u8], level: Compression) -> Histogram {
        let symbols: Vec<Symbol> = MatchFinder::new(data, search_params(level))
            .map(|token| Symbol::from_token(token).unwrap())
            .collect();
        Histogram::new(&symbols)
    }

    #[test]
    fn tiny_input_uses_fixed_block() {
        let data = b"abc";
        let (btype, written, _) = single_block(data, Compression::Balanced);
        assert_eq!(btype, 0b01);

        let fixed = FixedCodes::new();
        let histogram = histogram_of(data, Compression::Balanced);
        assert_eq!(written, 3 + histogram.cost(&fixed.litlen, &fixed.distance));
        // Three 8 bit literals and a 7 bit end-of-block.
        assert_eq!(written, 3 + 3 * 8 + 7);
    }

    #[test]
    fn repetitive_input_uses_dynamic_block() {
        let data: Vec<u8> = (0..50_000u32).map(|i| (i % 17) as u8).collect();
        let (btype, written, _) = single_block(&data, Compression::Balanced);
        assert_eq!(btype, 0b10);

        let histogram = histogram_of(&data, Compression::Balanced);
        let header = DynamicHeader::new(&histogram);
        assert_eq!(
            written,
            3 + header.cost() + histogram.cost(&header.litlen, &header.distance)
        );

        let fixed = FixedCodes::new();
        assert!(written < 3 + histogram.cost(&fixed.litlen, &fixed.distance));
    }

    #[test]
    fn fast_level_never_uses_dynamic_block() {
        let data: Vec<u8> = (0..50_000u32).map(|i| (i % 17) as u8).collect();
        let (btype, written, _) = single_block(&data, Compression::Fast);
        assert_eq!(btype, 0b01);

        let fixed = FixedCodes::new();
        let histogram = histogram_of(&data, Compression::Fast);
        assert_eq!(written, 3 + histogram.cost(&fixed.litlen, &fixed.distance));
    }

    #[test]
    fn random_input_uses_stored_block() {
        let mut rng = StdRng::seed_from_u64(5);
        let data: Vec<u8> = (0..2000).map(|_| rng.gen()).collect();
        let (btype, written, stream) = single_block(&data, Compression::High);
        assert_eq!(btype, 0b00);
        assert_eq!(written, stored_cost(data.len(), 0));
        assert_eq!(stream.len(), data.len() + 5);
    }

    #[test]
    fn empty_input() {
        // A single fixed block holding only end-of-block: 1, 01, 0000000.
        assert_eq!(deflate(&[], Compression::Balanced).unwrap(), vec![0x03, 0x00]);
        assert_roundtrip(&[]);
    }

    #[test]
    fn stored_only_layout() {
        let out = deflate(b"abc", Compression::NoCompression).unwrap();
        assert_eq!(out, vec![0x01, 0x03, 0x00, 0xFC, 0xFF, b'a', b'b', b'c']);
    }

    #[test]
    fn length_codes() {
        let code = length_code(3).unwrap();
        assert_eq!((code.symbol, code.extra_bits, code.extra_value), (257, 0, 0));
        let code = length_code(13).unwrap();
        assert_eq!((code.symbol, code.extra_bits, code.extra_value), (266, 1, 0));
        let code = length_code(257).unwrap();
        assert_eq!((code.symbol, code.extra_bits, code.extra_value), (284, 5, 30));
        let code = length_code(258).unwrap();
        assert_eq!((code.symbol, code.extra_bits, code.extra_value), (285, 0, 0));
        assert!(length_code(2).is_err());
        assert!(length_code(259).is_err());
    }

    #[test]
    fn distance_codes() {
        let code = distance_code(1).unwrap();
        assert_eq!((code.symbol, code.extra_bits, code.extra_value), (0, 0, 0));
        let code = distance_code(6).unwrap();
        assert_eq!((code.symbol, code.extra_bits, code.extra_value), (4, 1, 1));
        let code = distance_code(32768).unwrap();
        assert_eq!((code.symbol, code.extra_bits, code.extra_value), (29, 13, 8191));
        assert!(distance_code(0).is_err());
    }

    #[test]
    fn run_length_encoding() {
        assert_eq!(run_length_encode(&[0; 2]), vec![(0, 0), (0, 0)]);
        assert_eq!(run_length_encode(&[0; 10]), vec![(17, 7)]);
        assert_eq!(run_length_encode(&[0; 140]), vec![(18, 127), (0, 0), (0, 0)]);
        assert_eq!(run_length_encode(&[5; 8]), vec![(5, 0), (16, 3), (5, 0)]);
        assert_eq!(
            run_length_encode(&[8, 8, 8, 8, 0, 0, 0]),
            vec![(8, 0), (16, 0), (17, 0)]
        );
    }

    #[test]
    fn stored_cost_accounts_for_padding() {
        assert_eq!(stored_cost(0, 0), 3 + 5 + 32);
        assert_eq!(stored_cost(1, 5), 3 + 0 + 32 + 8);
        assert_eq!(
            stored_cost(MAX_STORED_BLOCK + 1, 0),
            2 * (3 + 5 + 32) + 8 * (MAX_STORED_BLOCK as u64 + 1)
        );
    }

    #[test]
    fn roundtrip_text() {
        let text = b"It was the best of times, it was the worst of times, it was the age of \
                     wisdom, it was the age of foolishness, it was the epoch of belief";
        assert_roundtrip(text);
    }

    #[test]
    fn roundtrip_runs_and_random() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut data = vec![0u8; 70_000];
        data.extend((0..50_000).map(|_| rng.gen::<u8>()));
        data.extend((0..100_000u32).map(|i| (i / 300) as u8));
        data.extend((0..10_000).map(|_| rng.gen_range(0..4u8)));
        assert_roundtrip(&data);
    }

    #[test]
    fn repetitive_input_shrinks() {
        let data: Vec<u8> = (0..200_000u32).map(|i| (i % 17) as u8).collect();
        for level in [Compression::Fast, Compression::Balanced, Compression::High] {
            let compressed = deflate(&data, level).unwrap();
            assert!(compressed.len() < data.len() / 50, "{:?}", level);
        }
    }

    #[test]
    fn incompressible_input_falls_back_to_stored() {
        let mut rng = StdRng::seed_from_u64(99);
        let data: Vec<u8> = (0..4096).map(|_| rng.gen()).collect();
        let compressed = deflate(&data, Compression::High).unwrap();
        // One stored block: 5 header bytes.
        assert_eq!(compressed.len(), data.len() + 5);
        assert_eq!(decompress_to_vec(&compressed).unwrap(), data);
    }

    #[test]
    fn deterministic_output() {
        let data: Vec<u8> = (0..50_000u32).map(|i| (i * i % 251) as u8).collect();
        assert_eq!(
            deflate(&data, Compression::Balanced).unwrap(),
            deflate(&data, Compression::Balanced).unwrap()
        );
    }
}
