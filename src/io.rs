
//! Bounds checked access to raw frame bytes.
//! Uses the error handling for this crate.

use lebe::prelude::*;
use crate::error::{Error, Result, UnitResult};


/// Read a single byte at a fixed offset.
#[inline]
pub fn byte_at(bytes: &[u8], offset: usize) -> Result<u8> {
    bytes.get(offset).copied()
        .ok_or_else(|| Error::truncated(format!("missing byte at offset {}", offset)))
}

/// Read a big endian `u16` at a fixed offset, as found in jpeg and vendor headers.
pub fn u16_be_at(bytes: &[u8], offset: usize) -> Result<u16> {
    let mut remaining = bytes.get(offset ..)
        .ok_or_else(|| Error::truncated(format!("missing u16 at offset {}", offset)))?;

    Ok(u16::read_from_big_endian(&mut remaining)?)
}

/// Overwrite a big endian `u16` at a fixed offset.
pub fn put_u16_be(bytes: &mut [u8], offset: usize, value: u16) -> UnitResult {
    let mut target = bytes.get_mut(offset ..)
        .ok_or_else(|| Error::truncated(format!("cannot write u16 at offset {}", offset)))?;

    target.write_as_big_endian(&value)?;
    Ok(())
}

/// Overwrite a little endian `u16` at a fixed offset.
#[inline]
pub fn put_u16_le(bytes: &mut [u8], offset: usize, value: u16) -> UnitResult {
    let mut target = bytes.get_mut(offset ..)
        .ok_or_else(|| Error::truncated(format!("cannot write u16 at offset {}", offset)))?;

    target.write_as_little_endian(&value)?;
    Ok(())
}

/// Returns the sub slice, or an error naming the missing part.
#[inline]
pub fn slice_at<'b>(bytes: &'b [u8], start: usize, length: usize, what: &'static str) -> Result<&'b [u8]> {
    start.checked_add(length)
        .and_then(|end| bytes.get(start .. end))
        .ok_or_else(|| Error::truncated(format!(
            "{} needs {} bytes at offset {}, but the frame has {} bytes",
            what, length, start, bytes.len()
        )))
}
