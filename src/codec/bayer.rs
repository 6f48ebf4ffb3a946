
//! Uncompressed bayer mosaics, either sent as they are
//! or wrapped in the line framing of the TV8532 bridge.

use std::borrow::Cow;
use std::sync::atomic::AtomicBool;
use crate::error::{Error, Result};
use crate::io::{byte_at, slice_at};
use crate::math::Vec2;
use crate::meta::{FrameGeometry, NativeEncoding};
use super::{BayerMosaic, Bytes, SampleDecoder, Samples, check_abort};


/// Reads a plain mosaic without copying it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RawBayerDecoder;

/// Removes the line framing of TV8532 frames.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Tv8532Decoder;

/// How many framing bytes precede the first line and follow the second line of a line pair.
/// The two values always add up to seven.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct LinePhase {
    before: usize,
    after: usize,
}


impl SampleDecoder for RawBayerDecoder {
    fn decode<'f>(&self, input: Bytes<'f>, geometry: &FrameGeometry, _: &AtomicBool) -> Result<Samples<'f>> {
        geometry.validate(NativeEncoding::BayerGbrg)?;
        Ok(Samples::Bayer(BayerMosaic::new(geometry.hardware, Cow::Borrowed(input))?))
    }
}

impl Tv8532Decoder {

    /// Copy the lines of the mosaic out of the framed input.
    pub fn unframe(input: &[u8], size: Vec2<usize>, abort: &AtomicBool) -> Result<Vec<u8>> {
        let Vec2(width, height) = size;
        let phase = LinePhase::detect(input, width)?;

        let mut samples = Vec::with_capacity(size.area());
        let mut source = 0;

        for _ in 0 .. height / 2 {
            check_abort(abort)?;

            source += phase.before;
            samples.extend_from_slice(slice_at(input, source, width, "tv8532 line")?);

            source += width + 3;
            samples.extend_from_slice(slice_at(input, source, width, "tv8532 line")?);

            source += width + phase.after;
        }

        Ok(samples)
    }
}

impl SampleDecoder for Tv8532Decoder {
    fn decode<'f>(&self, input: Bytes<'f>, geometry: &FrameGeometry, abort: &AtomicBool) -> Result<Samples<'f>> {
        geometry.validate(NativeEncoding::BayerTv8532)?;

        let samples = Self::unframe(input, geometry.hardware, abort)?;
        Ok(Samples::Bayer(BayerMosaic::new(geometry.hardware, Cow::Owned(samples))?))
    }
}

impl LinePhase {

    /// Guess where the green samples start by comparing
    /// the neighbourhoods of the two candidate positions.
    fn detect(input: &[u8], width: usize) -> Result<Self> {
        if input.len() < width + 8 {
            return Err(Error::truncated(format!(
                "tv8532 frame of width {} has only {} bytes", width, input.len()
            )));
        }

        let at = |offset: usize| byte_at(input, offset).map(u32::from);

        let late = ((at(3)? + at(width + 7)?) >> 1) + (at(4)? >> 2) + (at(width + 6)? >> 1);
        let early = ((at(2)? + at(width + 6)?) >> 1) + (at(3)? >> 2) + (at(width + 5)? >> 1);

        Ok(if late >= early { LinePhase { before: 3, after: 4 } }
           else { LinePhase { before: 2, after: 5 } })
    }
}
