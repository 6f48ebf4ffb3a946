
//! Contains one decoder per family of native encodings.
//! A decoder turns the raw bytes of a frame into samples,
//! which a compositor then converts to the requested output format.


// private modules make non-breaking changes easier
pub mod jpeg;
mod yuv;
mod bayer;
mod sonix;

pub use self::yuv::{YuvDecoder, YuvLayout};
pub use self::bayer::{RawBayerDecoder, Tv8532Decoder};
pub use self::sonix::{SonixDecoder, SonixTable};

use std::borrow::Cow;
use std::sync::atomic::{AtomicBool, Ordering};
use crate::error::{Error, Result, UnitResult};
use crate::math::Vec2;
use crate::meta::FrameGeometry;


/// A byte vector.
pub type ByteVec = Vec<u8>;

/// A byte slice.
pub type Bytes<'s> = &'s [u8];


/// Decodes the native bytes of a frame into samples.
/// One decoder is selected per frame, based on the native encoding.
pub trait SampleDecoder {

    /// Decode the samples of at least the window of the geometry.
    /// Samples outside the window may be left undecoded.
    /// Checks the abort flag between rows of coding units.
    fn decode<'f>(&self, input: Bytes<'f>, geometry: &FrameGeometry, abort: &AtomicBool) -> Result<Samples<'f>>;
}

/// The decoded but not yet color converted contents of a frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Samples<'f> {

    /// Luma with two subsampled chroma planes.
    YCbCr(YCbCrPlanes),

    /// One byte per pixel, in green-blue / red-green order.
    /// Borrows the input if the camera sends a plain mosaic.
    Bayer(BayerMosaic<'f>),
}

/// Luma at full resolution and chroma at half resolution in both directions,
/// covering the whole native grid.
/// Samples are not clipped: jpeg luma is centered at 128 and may leave the byte range,
/// chroma is centered at zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YCbCrPlanes {

    /// The dimensions of the luma plane.
    pub size: Vec2<usize>,

    /// Row major, `size.area()` samples.
    pub luma: Vec<i32>,

    /// The chroma component that is decoded first, which the cameras use for red differences.
    pub first_chroma: Vec<i32>,

    /// The chroma component that is decoded second, which the cameras use for blue differences.
    pub second_chroma: Vec<i32>,
}

/// A bayer mosaic covering the whole native grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BayerMosaic<'f> {

    /// The dimensions of the mosaic.
    pub size: Vec2<usize>,

    /// Row major, at least `size.area()` bytes.
    pub samples: Cow<'f, [u8]>,
}


impl YCbCrPlanes {

    /// Planes filled with neutral gray.
    pub fn new(size: Vec2<usize>) -> Self {
        let chroma_size = Vec2(size.width() / 2, size.height() / 2).area();

        YCbCrPlanes {
            size,
            luma: vec![128; size.area()],
            first_chroma: vec![0; chroma_size],
            second_chroma: vec![0; chroma_size],
        }
    }

    /// The width of a chroma plane.
    #[inline]
    pub fn chroma_width(&self) -> usize {
        self.size.width() / 2
    }
}

impl<'f> BayerMosaic<'f> {

    /// Ensure the mosaic contains the whole native grid.
    pub fn new(size: Vec2<usize>, samples: Cow<'f, [u8]>) -> Result<Self> {
        if samples.len() < size.area() {
            return Err(Error::truncated(format!(
                "bayer frame of {} needs {} bytes, but has {} bytes", size, size.area(), samples.len()
            )));
        }

        Ok(BayerMosaic { size, samples })
    }

    /// The sample at this pixel of the native grid.
    #[inline]
    pub fn at(&self, pixel: Vec2<usize>) -> u8 {
        self.samples[pixel.y() * self.size.width() + pixel.x()]
    }
}


/// Fails if the caller asked to abort the frame.
#[inline]
pub fn check_abort(abort: &AtomicBool) -> UnitResult {
    if abort.load(Ordering::Relaxed) { Err(Error::Aborted) }
    else { Ok(()) }
}
