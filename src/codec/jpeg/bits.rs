
//! Reads bits from jpeg scan data, most significant bit first.

use crate::error::{Error, Result};


/// A cursor over entropy coded bytes.
///
/// With escapes enabled, `0xFF 0x00` is read as a literal `0xFF`,
/// and `0xFF` followed by any other byte is a marker.
/// The reader stops in front of a marker and only yields zero bits
/// until the marker is consumed by `read_marker`.
///
/// After the end of the input, the reader yields zero bits as well,
/// but remembers if any of those were consumed.
#[derive(Debug, Clone)]
pub struct BitReader<'b> {
    bytes: &'b [u8],
    position: usize,
    escapes: bool,

    buffer: u64,
    buffered_bits: u32,

    /// How many of the least significant buffered bits were invented after the input ended.
    padding_bits: u32,

    marker: Option<u8>,
    overrun: bool,
}

/// The buffer is refilled until it holds more than this many bits.
const REFILL_THRESHOLD: u32 = 32;


impl<'b> BitReader<'b> {

    /// Start reading at the first byte.
    pub fn new(bytes: &'b [u8], escapes: bool) -> Self {
        BitReader {
            bytes, position: 0, escapes,
            buffer: 0, buffered_bits: 0, padding_bits: 0,
            marker: None, overrun: false,
        }
    }

    /// Look at the next `count` bits without consuming them. Allows up to 24 bits.
    #[inline]
    pub fn peek(&mut self, count: u32) -> u32 {
        debug_assert!(count > 0 && count <= 24, "bit count out of range");

        if self.buffered_bits < count {
            self.refill();
        }

        ((self.buffer >> (self.buffered_bits - count)) & ((1_u64 << count) - 1)) as u32
    }

    /// Drop bits that were peeked before.
    #[inline]
    pub fn consume(&mut self, count: u32) {
        debug_assert!(count <= self.buffered_bits, "consumed bits that were never peeked");

        self.buffered_bits -= count;

        if self.buffered_bits < self.padding_bits {
            self.overrun = true;
            self.padding_bits = self.buffered_bits;
        }
    }

    /// Read and consume the next `count` bits. Allows up to 24 bits.
    #[inline]
    pub fn read(&mut self, count: u32) -> u32 {
        if count == 0 { return 0; }

        let bits = self.peek(count);
        self.consume(count);
        bits
    }

    /// Whether bits after the end of the input were consumed.
    /// Zero bits decode to valid symbols, so this is the only sign of a truncated frame.
    pub fn overrun(&self) -> bool {
        self.overrun
    }

    /// Fails if bits after the end of the input were consumed.
    pub fn check_overrun(&self) -> Result<()> {
        if self.overrun { Err(Error::truncated("scan data ended inside a coding unit")) }
        else { Ok(()) }
    }

    /// Consume the marker that stopped the reader, discarding all bits in front of it.
    /// Returns none if there is no marker at the current position.
    pub fn read_marker(&mut self) -> Option<u8> {
        self.refill();

        let marker = self.marker.take()?;
        self.buffer = 0;
        self.buffered_bits = 0;
        self.padding_bits = 0;
        Some(marker)
    }

    fn refill(&mut self) {
        while self.buffered_bits <= REFILL_THRESHOLD {
            let byte = if self.marker.is_some() { 0 } else {
                match self.next_byte() {
                    Some(byte) => byte,
                    None if self.marker.is_some() => 0,
                    None => {
                        self.padding_bits += 8;
                        0
                    }
                }
            };

            self.buffer = (self.buffer << 8) | u64::from(byte);
            self.buffered_bits += 8;
        }
    }

    /// Returns none after the end of the input, and also when a marker was found.
    fn next_byte(&mut self) -> Option<u8> {
        let byte = *self.bytes.get(self.position)?;
        self.position += 1;

        if self.escapes && byte == 0xFF {
            let next = *self.bytes.get(self.position)?;
            self.position += 1;

            if next != 0 {
                self.marker = Some(next);
                return None;
            }
        }

        Some(byte)
    }
}


/// Packs bit strings like `"010 1"` into bytes, padding the last byte with ones.
#[cfg(test)]
pub fn pack_bits(bits: &str) -> Vec<u8> {
    let bits: Vec<u8> = bits.bytes().filter(|&bit| bit != b' ').map(|bit| bit - b'0').collect();

    bits.chunks(8).map(|chunk| {
        (0 .. 8).fold(0_u8, |byte, index| (byte << 1) | chunk.get(index).copied().unwrap_or(1))
    }).collect()
}
