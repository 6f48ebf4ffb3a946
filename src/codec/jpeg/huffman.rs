
//! Decodes the run and size symbols of jpeg scan data.
//! Short codes are resolved with a single table lookup,
//! which for most coefficients also includes the value bits.

use crate::error::{Error, Result};
use super::bits::BitReader;
use super::tables::CanonicalTable;


/// The longest code a baseline jpeg table can contain.
const MAX_CODE_LENGTH: usize = 16;

/// Greater than any code of up to 16 bits, even after one more bit was appended.
const MAX_CODE_SENTINEL: i32 = 0x20000;

/// Smallest supported width of the lookup table.
pub const MIN_LOOKUP_BITS: u32 = 8;

/// Largest supported width of the lookup table.
pub const MAX_LOOKUP_BITS: u32 = 10;


/// A decoding table built from a canonical huffman table.
#[derive(Clone, Debug)]
pub struct HuffmanTable {
    lookup_bits: u32,

    /// Indexed by the next `lookup_bits` bits of the input.
    lookup: Vec<LookupEntry>,

    /// For each code length minus one, the first code that is too large for that length.
    max_code: [i32; MAX_CODE_LENGTH + 1],

    /// For each code length minus one, the index of its first symbol.
    first_symbol: [usize; MAX_CODE_LENGTH],

    symbols: Vec<u8>,
}

/// What the next few bits of the input reveal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LookupEntry {

    /// The code is longer than the lookup width.
    LongCode,

    /// The code is known, but the value bits do not fit into the lookup width.
    Symbol { run: u8, size: u8, code_length: u8 },

    /// The code and its value bits fit into the lookup width.
    Value { run: u8, value: i32, total_length: u8 },
}


impl HuffmanTable {

    /// Build the lookup table. The width is clamped to the supported range.
    /// Missing symbols in a malformed table leave their codes undecodable.
    pub fn new(table: &CanonicalTable<'_>, lookup_bits: u32) -> Self {
        let lookup_bits = lookup_bits.clamp(MIN_LOOKUP_BITS, MAX_LOOKUP_BITS);
        let lookup_width = lookup_bits as usize;

        let mut lookup = vec![LookupEntry::LongCode; 1 << lookup_width];
        let mut max_code = [0_i32; MAX_CODE_LENGTH + 1];
        let mut first_symbol = [0_usize; MAX_CODE_LENGTH];
        let mut symbols = Vec::with_capacity(table.symbols.len());

        let mut code: i32 = 0;

        for length_index in 0 .. MAX_CODE_LENGTH {
            first_symbol[length_index] = symbols.len();
            let code_length = length_index + 1;

            for _ in 0 .. table.counts[length_index] {
                let symbol = match table.symbols.get(symbols.len()) {
                    Some(&symbol) => symbol,
                    None => break,
                };

                symbols.push(symbol);

                if code_length <= lookup_width {
                    let run = symbol >> 4;
                    let size = usize::from(symbol & 0x0F);
                    let spare_bits = lookup_width - code_length;
                    let prefix = (code as usize) << spare_bits;

                    for suffix in 0 .. 1_usize << spare_bits {
                        lookup[prefix | suffix] = if size + code_length <= lookup_width {
                            let raw_value = (suffix >> (spare_bits - size)) as u32;

                            LookupEntry::Value {
                                run,
                                value: extend_sign(raw_value, size as u32),
                                total_length: (code_length + size) as u8,
                            }
                        }
                        else {
                            LookupEntry::Symbol { run, size: size as u8, code_length: code_length as u8 }
                        };
                    }
                }

                code += 1;
            }

            max_code[length_index] = code;
            code <<= 1;
        }

        max_code[MAX_CODE_LENGTH] = MAX_CODE_SENTINEL;

        HuffmanTable { lookup_bits, lookup, max_code, first_symbol, symbols }
    }

    /// Decode the next symbol and its value bits.
    /// Returns the run of zeroes and the signed value.
    /// An end of block is a zero run with a zero value.
    #[inline]
    pub fn decode(&self, reader: &mut BitReader<'_>) -> Result<(u8, i32)> {
        let prefix = reader.peek(self.lookup_bits) as usize;

        match self.lookup[prefix] {
            LookupEntry::Value { run, value, total_length } => {
                reader.consume(u32::from(total_length));
                Ok((run, value))
            },

            LookupEntry::Symbol { run, size, code_length } => {
                reader.consume(u32::from(code_length));
                Ok((run, receive(reader, u32::from(size))))
            },

            LookupEntry::LongCode => {
                let symbol = self.decode_long_code(reader)?;
                Ok((symbol >> 4, receive(reader, u32::from(symbol & 0x0F))))
            },
        }
    }

    /// Walk the code bit by bit. The sentinel guarantees
    /// that this stops after at most 16 bits, even for corrupt data.
    fn decode_long_code(&self, reader: &mut BitReader<'_>) -> Result<u8> {
        let mut code = reader.read(self.lookup_bits) as i32;
        let mut length_index = self.lookup_bits as usize;

        loop {
            code = (code << 1) | reader.read(1) as i32;

            if code < self.max_code[length_index] { break; }
            if length_index == MAX_CODE_LENGTH { return Err(Error::BadHuffmanCode); }
            length_index += 1;
        }

        if length_index >= MAX_CODE_LENGTH {
            return Err(Error::BadHuffmanCode);
        }

        let first_code_of_length = self.max_code[length_index - 1] * 2;
        let symbol_index = self.first_symbol[length_index] as i64 + i64::from(code - first_code_of_length);

        usize::try_from(symbol_index).ok()
            .and_then(|index| self.symbols.get(index))
            .copied()
            .ok_or(Error::BadHuffmanCode)
    }

    /// The first code that is too large for each code length.
    /// The last entry is the sentinel.
    pub fn max_codes(&self) -> &[i32; MAX_CODE_LENGTH + 1] {
        &self.max_code
    }
}


/// Read the value bits that follow a symbol.
#[inline]
fn receive(reader: &mut BitReader<'_>, size: u32) -> i32 {
    if size == 0 { 0 }
    else { extend_sign(reader.read(size), size) }
}

/// Values with a leading zero bit are negative: `0` of size 1 means `-1`.
#[inline]
pub fn extend_sign(bits: u32, size: u32) -> i32 {
    if size == 0 { return 0; }

    let bits = bits as i32;
    if bits < 1 << (size - 1) { bits - (1 << size) + 1 }
    else { bits }
}
