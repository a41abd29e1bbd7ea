//! This module provides a bit writer

/// Bit writer
pub(crate) trait BitWriter {
    /// Writes the low `n` bits of `v`.
    fn write_bits(&mut self, v: u32, n: u8);

    /// Pads with zero bits up to the next byte boundary.
    fn align_to_byte(&mut self);

    /// Number of bits written so far, including those not yet flushed to a whole byte.
    fn bit_len(&self) -> u64;
}

/// Writes bits to a byte vector, LSB first, as DEFLATE requires.
#[derive(Debug, Default)]
pub(crate) struct LsbWriter {
    out: Vec<u8>,
    bits: u8,
    acc: u64,
}

impl LsbWriter {
    /// Creates a writer appending to `out`.
    pub(crate) fn new(out: Vec<u8>) -> LsbWriter {
        LsbWriter {
            out,
            bits: 0,
            acc: 0,
        }
    }

    /// Returns true if the writer is aligned to a byte of the underlying byte stream.
    #[inline(always)]
    pub(crate) fn is_aligned(&self) -> bool {
        self.bits == 0
    }

    /// Appends whole bytes. The writer has to be byte aligned.
    pub(crate) fn write_bytes(&mut self, buf: &[u8]) {
        debug_assert!(self.is_aligned());
        self.out.extend_from_slice(buf);
    }

    /// Pads the last partial byte and returns the underlying vector.
    pub(crate) fn finish(mut self) -> Vec<u8> {
        self.align_to_byte();
        self.out
    }
}

impl BitWriter for LsbWriter {
    #[inline]
    fn write_bits(&mut self, v: u32, n: u8) {
        debug_assert!(n <= 32);
        // At most 7 bits are pending, so 32 more always fit the accumulator.
        self.acc |= (u64::from(v) & ((1u64 << n) - 1)) << self.bits;
        self.bits += n;
        while self.bits >= 8 {
            self.out.push(self.acc as u8);
            self.acc >>= 8;
            self.bits -= 8;
        }
    }

    fn align_to_byte(&mut self) {
        if self.bits > 0 {
            self.write_bits(0, 8 - self.bits);
        }
    }

    fn bit_len(&self) -> u64 {
        self.out.len() as u64 * 8 + u64::from(self.bits)
    }
}
