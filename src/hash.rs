//! Checksums used by the container formats.
//!
//! * [`Crc32`] protects every PNG chunk (type tag and payload).
//! * [`Adler32`] trails the zlib stream and covers the uncompressed scanline data.

/// Largest prime smaller than 2^16.
const ADLER_MODULO: u32 = 65521;

/// Number of bytes that can be summed before `s2` could overflow a `u32`.
const ADLER_NMAX: usize = 5552;

/// Running Adler-32 checksum (RFC 1950, section 8.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Adler32 {
    s1: u32,
    s2: u32,
}

impl Default for Adler32 {
    fn default() -> Self {
        Self::new()
    }
}

impl Adler32 {
    pub fn new() -> Adler32 {
        Adler32 { s1: 1, s2: 0 }
    }

    pub fn update(&mut self, buf: &[u8]) {
        // The modulo is deferred until just before the sums could overflow.
        for block in buf.chunks(ADLER_NMAX) {
            for &byte in block {
                self.s1 += u32::from(byte);
                self.s2 += self.s1;
            }

            self.s1 %= ADLER_MODULO;
            self.s2 %= ADLER_MODULO;
        }
    }

    pub fn checksum(&self) -> u32 {
        (self.s2 << 16) | self.s1
    }
}

/// Computes the Adler-32 of `buf` in one call.
pub fn adler32(buf: &[u8]) -> u32 {
    let mut adler = Adler32::new();
    adler.update(buf);
    adler.checksum()
}

const IEEE_POLYNOMIAL: u32 = 0xEDB8_8320;

/// Lookup table for the reflected IEEE polynomial, built at compile time.
static CRC_TABLE: [u32; 256] = make_crc_table();

const fn make_crc_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut n = 0;

    while n < 256 {
        let mut c = n as u32;
        let mut k = 0;
        while k < 8 {
            c = if c & 1 == 1 {
                IEEE_POLYNOMIAL ^ (c >> 1)
            } else {
                c >> 1
            };
            k += 1;
        }
        table[n] = c;
        n += 1;
    }

    table
}

/// Running CRC-32 (ISO 3309 / ITU-T V.42), as required for PNG chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Crc32 {
    crc: u32,
}

impl Default for Crc32 {
    fn default() -> Self {
        Self::new()
    }
}

impl Crc32 {
    pub fn new() -> Crc32 {
        Crc32 { crc: 0xFFFF_FFFF }
    }

    pub fn update(&mut self, buf: &[u8]) {
        let mut crc = self.crc;
        for &byte in buf {
            crc = CRC_TABLE[((crc ^ u32::from(byte)) & 0xFF) as usize] ^ (crc >> 8);
        }
        self.crc = crc;
    }

    pub fn checksum(&self) -> u32 {
        self.crc ^ 0xFFFF_FFFF
    }
}

/// Computes the CRC-32 of `buf` in one call.
pub fn crc32(buf: &[u8]) -> u32 {
    let mut crc = Crc32::new();
    crc.update(buf);
    crc.checksum()
}
