//! Canonical, length-limited Huffman codes (RFC 1951, section 3.2.2).
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Longest code allowed for the literal/length and distance alphabets.
pub(crate) const MAX_CODE_LENGTH: u8 = 15;

/// Longest code allowed for the code length alphabet.
pub(crate) const MAX_CODE_LENGTH_CODE_LENGTH: u8 = 7;

/// Number of literal/length symbols, including the two reserved ones of the fixed code.
pub(crate) const NUM_LITLEN_SYMBOLS: usize = 288;

/// Number of distance symbols, including the two reserved ones of the fixed code.
pub(crate) const NUM_DISTANCE_SYMBOLS: usize = 32;

/// A prefix code ready for an LSB-first bit writer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct HuffmanCode {
    /// Bit length per symbol, 0 for unused symbols.
    pub(crate) lengths: Vec<u8>,
    /// Bit-reversed code per symbol.
    pub(crate) codes: Vec<u16>,
}

impl HuffmanCode {
    pub(crate) fn from_lengths(lengths: Vec<u8>) -> HuffmanCode {
        let codes = canonical_codes(&lengths);
        HuffmanCode { lengths, codes }
    }

    /// Builds an optimal code limited to `max_len` bits for the given symbol frequencies.
    pub(crate) fn from_frequencies(freqs: &[u32], max_len: u8) -> HuffmanCode {
        Self::from_lengths(code_lengths(freqs, max_len))
    }

    /// The fixed literal/length code of block type 1.
    pub(crate) fn fixed_litlen() -> HuffmanCode {
        let mut lengths = vec![0u8; NUM_LITLEN_SYMBOLS];
        lengths[..144].fill(8);
        lengths[144..256].fill(9);
        lengths[256..280].fill(7);
        lengths[280..].fill(8);
        Self::from_lengths(lengths)
    }

    /// The fixed distance code of block type 1.
    pub(crate) fn fixed_distance() -> HuffmanCode {
        Self::from_lengths(vec![5u8; NUM_DISTANCE_SYMBOLS])
    }

    #[inline]
    pub(crate) fn code(&self, symbol: usize) -> (u32, u8) {
        (u32::from(self.codes[symbol]), self.lengths[symbol])
    }
}

/// Assigns canonical codes to `lengths` and returns them bit-reversed.
///
/// Shorter codes precede longer ones and codes of equal length are ordered by symbol.
pub(crate) fn canonical_codes(lengths: &[u8]) -> Vec<u16> {
    let mut bl_count = [0u16; MAX_CODE_LENGTH as usize + 1];
    for &len in lengths {
        bl_count[usize::from(len)] += 1;
    }
    bl_count[0] = 0;

    let mut next_code = [0u16; MAX_CODE_LENGTH as usize + 1];
    let mut code = 0u16;
    for bits in 1..=MAX_CODE_LENGTH as usize {
        code = (code + bl_count[bits - 1]) << 1;
        next_code[bits] = code;
    }

    lengths
        .iter()
        .map(|&len| {
            if len == 0 {
                return 0;
            }
            let code = next_code[usize::from(len)];
            next_code[usize::from(len)] += 1;
            code.reverse_bits() >> (16 - len)
        })
        .collect()
}

/// Computes code lengths for `freqs`, none longer than `max_len`.
///
/// Symbols with zero frequency get length 0. A single used symbol gets length 1.
pub(crate) fn code_lengths(freqs: &[u32], max_len: u8) -> Vec<u8> {
    let mut lengths = vec![0u8; freqs.len()];

    // Most frequent first; equal frequencies keep symbol order, so the result is deterministic.
    let mut symbols: Vec<usize> = (0..freqs.len()).filter(|&s| freqs[s] > 0).collect();
    symbols.sort_by_key(|&s| Reverse(freqs[s]));

    match symbols.len() {
        0 => return lengths,
        1 => {
            lengths[symbols[0]] = 1;
            return lengths;
        }
        _ => {}
    }

    let mut counts = length_histogram(&symbols, freqs, max_len);
    limit_lengths(&mut counts, max_len);

    // Hand out the shortest lengths to the most frequent symbols.
    let mut ranked = symbols.iter();
    for len in 1..=max_len {
        for _ in 0..counts[usize::from(len)] {
            if let Some(&symbol) = ranked.next() {
                lengths[symbol] = len;
            }
        }
    }

    lengths
}

/// Builds an unrestricted Huffman tree and returns how many leaves end up at each depth, with
/// everything deeper than `max_len` counted at `max_len`.
fn length_histogram(symbols: &[usize], freqs: &[u32], max_len: u8) -> Vec<u32> {
    let n = symbols.len();
    // Leaves are nodes `0..n`, internal nodes follow in creation order. A parent is always
    // created after its children and so has a larger index.
    let mut parent = vec![0usize; 2 * n - 1];
    let mut heap: BinaryHeap<Reverse<(u64, usize)>> = symbols
        .iter()
        .enumerate()
        .map(|(node, &s)| Reverse((u64::from(freqs[s]), node)))
        .collect();

    let mut next = n;
    while let Some(Reverse((weight_a, a))) = heap.pop() {
        let Some(Reverse((weight_b, b))) = heap.pop() else {
            // `a` is the root.
            break;
        };
        parent[a] = next;
        parent[b] = next;
        heap.push(Reverse((weight_a + weight_b, next)));
        next += 1;
    }

    let root = 2 * n - 2;
    let mut depth = vec![0u32; 2 * n - 1];
    for node in (0..root).rev() {
        depth[node] = depth[parent[node]] + 1;
    }

    let mut counts = vec![0u32; usize::from(max_len) + 1];
    for &d in &depth[..n] {
        let d = d.min(u32::from(max_len)) as usize;
        counts[d] += 1;
    }
    counts
}

/// Rebalances a length histogram whose deepest levels were clamped to `max_len` until it
/// describes a complete prefix code again.
///
/// Each step drops one leaf from the deepest level and splits a shallower leaf in two, which
/// lowers the Kraft sum by exactly one unit of `2^-max_len`.
fn limit_lengths(counts: &mut [u32], max_len: u8) {
    let max = usize::from(max_len);
    let mut total: u64 = (1..=max)
        .map(|len| u64::from(counts[len]) << (max - len))
        .sum();

    while total > 1u64 << max {
        counts[max] -= 1;
        for len in (1..max).rev() {
            if counts[len] != 0 {
                counts[len] -= 1;
                counts[len + 1] += 2;
                break;
            }
        }
        total -= 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kraft_sum(lengths: &[u8], max_len: u8) -> u64 {
        lengths
            .iter()
            .filter(|&&l| l > 0)
            .map(|&l| 1u64 << (max_len - l))
            .sum()
    }

    #[test]
    fn rfc1951_example_codes() {
        // Lengths (3, 3, 3, 3, 3, 2, 4, 4) for symbols A..H from section 3.2.2.
        let lengths = [3, 3, 3, 3, 3, 2, 4, 4];
        let codes = canonical_codes(&lengths);
        let expected = [0b010, 0b011, 0b100, 0b101, 0b110, 0b00, 0b1110, 0b1111];
        for ((&code, &len), &want) in codes.iter().zip(&lengths).zip(&expected) {
            let want: u16 = want;
            assert_eq!(code, want.reverse_bits() >> (16 - len));
        }
    }

    #[test]
    fn fixed_litlen_matches_rfc() {
        let fixed = HuffmanCode::fixed_litlen();
        // Literal 0 is 00110000, end of block (256) is 0000000, 280 is 11000000.
        assert_eq!(fixed.code(0), (0b0011_0000u16.reverse_bits() as u32 >> 8, 8));
        assert_eq!(fixed.code(256), (0, 7));
        assert_eq!(fixed.code(280), (0b1100_0000u16.reverse_bits() as u32 >> 8, 8));
        assert_eq!(fixed.code(144).1, 9);
        assert_eq!(kraft_sum(&fixed.lengths, 9), 1 << 9);
    }

    #[test]
    fn unused_and_single_symbols() {
        assert_eq!(code_lengths(&[0, 0, 0], 15), vec![0, 0, 0]);
        assert_eq!(code_lengths(&[0, 7, 0], 15), vec![0, 1, 0]);
        assert_eq!(code_lengths(&[3, 7, 0], 15), vec![1, 1, 0]);
    }

    #[test]
    fn frequent_symbols_get_shorter_codes() {
        let freqs = [40, 1, 1, 2, 5, 10, 20, 0];
        let lengths = code_lengths(&freqs, 15);
        assert_eq!(kraft_sum(&lengths, 15), 1 << 15);
        assert_eq!(lengths[7], 0);
        for a in 0..7 {
            for b in 0..7 {
                if freqs[a] > freqs[b] {
                    assert!(lengths[a] <= lengths[b], "{:?}", lengths);
                }
            }
        }
        assert_eq!(lengths[0], 1);
    }

    #[test]
    fn lengths_are_limited() {
        // Fibonacci frequencies produce a maximally skewed tree of depth 24.
        let mut freqs = vec![1u32, 1];
        while freqs.len() < 25 {
            let n = freqs.len();
            freqs.push(freqs[n - 1] + freqs[n - 2]);
        }

        let unlimited = code_lengths(&freqs, 30);
        assert!(unlimited.iter().copied().max().unwrap() > 15);

        for max_len in [7, 9, 15] {
            let lengths = code_lengths(&freqs, max_len);
            assert!(lengths.iter().all(|&l| l >= 1 && l <= max_len));
            assert_eq!(kraft_sum(&lengths, max_len), 1 << max_len);
        }
    }

    #[test]
    fn canonical_codes_are_prefix_free() {
        let freqs: Vec<u32> = (0..40).map(|i| (i * i) % 17 + 1).collect();
        let code = HuffmanCode::from_frequencies(&freqs, 7);
        for a in 0..freqs.len() {
            for b in 0..freqs.len() {
                if a == b {
                    continue;
                }
                let (ca, la) = code.code(a);
                let (cb, lb) = code.code(b);
                if la <= lb {
                    // Reversed codes: a prefix shows up in the low bits.
                    assert_ne!(cb & ((1 << la) - 1), ca, "{} is a prefix of {}", a, b);
                }
            }
        }
    }
}
