
//! Unpacks the compressed bayer frames of Sonix bridges.
//! Each sample is predicted from its neighbours of the same color,
//! and a short prefix code either corrects the prediction or replaces it.

use std::borrow::Cow;
use std::sync::atomic::AtomicBool;
use crate::error::{Error, Result};
use crate::math::{Vec2, clip};
use crate::meta::{FrameGeometry, NativeEncoding};
use super::{BayerMosaic, Bytes, SampleDecoder, Samples, check_abort};


/// What a code means for the sample.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CodeValue {

    /// Added to the prediction.
    Delta(i32),

    /// Replaces the prediction.
    Absolute(u8),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Code {
    value: CodeValue,
    length: u8,
}

/// Maps the next eight bits of the stream to the code they start with.
/// Built once and shared by all frames.
#[derive(Clone, PartialEq, Eq)]
pub struct SonixTable {
    codes: [Code; 256],
}

/// Decodes Sonix frames into a bayer mosaic.
#[derive(Clone, Copy, Debug)]
pub struct SonixDecoder<'t> {
    table: &'t SonixTable,
}

/// Reads codes that may start at any bit.
/// Bytes after the end of the input read as zero.
struct BitCursor<'b> {
    bytes: &'b [u8],
    bit_position: usize,
}


impl SonixTable {

    /// Compute the meaning of every eight bit prefix.
    pub fn new() -> Self {
        let mut codes = [Code { value: CodeValue::Delta(0), length: 1 }; 256];

        for (prefix, code) in codes.iter_mut().enumerate() {
            let prefix = prefix as u8;

            let (value, length) = {
                if prefix & 0x80 == 0 { (CodeValue::Delta(0), 1) }             // 0
                else if prefix & 0xE0 == 0x80 { (CodeValue::Delta(4), 3) }     // 100
                else if prefix & 0xE0 == 0xA0 { (CodeValue::Delta(-4), 3) }    // 101
                else if prefix & 0xF0 == 0xD0 { (CodeValue::Delta(11), 4) }    // 1101
                else if prefix & 0xF0 == 0xF0 { (CodeValue::Delta(-11), 4) }   // 1111
                else if prefix & 0xF8 == 0xC8 { (CodeValue::Delta(20), 5) }    // 11001
                else if prefix & 0xFC == 0xC0 { (CodeValue::Delta(-20), 6) }   // 110000
                else if prefix & 0xFC == 0xC4 { (CodeValue::Delta(0), 8) }     // 110001xx
                else { (CodeValue::Absolute((prefix & 0x0F) << 4), 8) }        // 1110xxxx
            };

            *code = Code { value, length };
        }

        SonixTable { codes }
    }
}

impl Default for SonixTable {
    fn default() -> Self { Self::new() }
}

impl std::fmt::Debug for SonixTable {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.debug_struct("SonixTable").finish_non_exhaustive()
    }
}

impl<'t> SonixDecoder<'t> {

    /// Decode frames using this code table.
    pub fn new(table: &'t SonixTable) -> Self {
        SonixDecoder { table }
    }

    /// Unpack the whole frame, which is stored row by row.
    pub fn unpack(&self, input: &[u8], size: Vec2<usize>, abort: &AtomicBool) -> Result<Vec<u8>> {
        let Vec2(width, height) = size;
        let mut samples = vec![0_u8; size.area()];
        let mut cursor = BitCursor { bytes: input, bit_position: 0 };

        for row in 0 .. height {
            check_abort(abort)?;

            let row_start = row * width;
            let mut column = 0;

            // the first two samples of the first two rows have no neighbours of their color
            if row < 2 {
                samples[row_start] = cursor.peek();
                samples[row_start + 1] = cursor.peek_after(8);
                cursor.bit_position += 16;
                column = 2;
            }

            while column < width {
                let index = row_start + column;
                let code = self.table.codes[usize::from(cursor.peek())];
                cursor.bit_position += usize::from(code.length);

                let value = match code.value {
                    CodeValue::Absolute(value) => i32::from(value),
                    CodeValue::Delta(delta) => delta + {
                        let left = || i32::from(samples[index - 2]);
                        let above = || i32::from(samples[index - 2 * width]);

                        if column < 2 { above() }
                        else if row < 2 { left() }
                        else { (left() + above()) / 2 }
                    },
                };

                samples[index] = clip(value);
                column += 1;
            }

            if cursor.bit_position > input.len() * 8 {
                return Err(Error::truncated(format!(
                    "sonix frame ended in row {} of {}", row, height
                )));
            }
        }

        Ok(samples)
    }
}

impl SampleDecoder for SonixDecoder<'_> {
    fn decode<'f>(&self, input: Bytes<'f>, geometry: &FrameGeometry, abort: &AtomicBool) -> Result<Samples<'f>> {
        geometry.validate(NativeEncoding::SonixPacked)?;

        let samples = self.unpack(input, geometry.hardware, abort)?;
        Ok(Samples::Bayer(BayerMosaic::new(geometry.hardware, Cow::Owned(samples))?))
    }
}

impl BitCursor<'_> {

    /// The eight bits at the cursor.
    #[inline]
    fn peek(&self) -> u8 {
        self.peek_after(0)
    }

    /// The eight bits that start a few bits after the cursor.
    #[inline]
    fn peek_after(&self, offset: usize) -> u8 {
        let position = self.bit_position + offset;
        let byte = |index: usize| u16::from(self.bytes.get(index).copied().unwrap_or(0));

        let shift = (position % 8) as u32;
        let first = byte(position / 8) << shift;
        let second = byte(position / 8 + 1) >> (8 - shift);
        ((first | second) & 0xFF) as u8
    }
}
