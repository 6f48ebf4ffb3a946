
//! Converts decoded samples to the requested output format.
//! One compositor exists per output format, and each one knows how to handle
//! both kinds of samples. Only the window of the frame geometry is read,
//! and the output always has exactly the requested size.

pub mod color;
mod packed;
mod planar;

pub use self::packed::{Rgb565Compositor, RgbCompositor};
pub use self::planar::Yuv420pCompositor;

use std::sync::atomic::AtomicBool;
use crate::codec::{BayerMosaic, Samples, YCbCrPlanes, check_abort};
use crate::error::UnitResult;
use crate::math::Vec2;
use crate::meta::{OutputFormat, Window};
use crate::picture::GammaTables;


/// Writes the samples of the window into a pixel buffer.
/// The compositor is selected once per frame, based on the output format.
pub trait Compositor {

    /// Convert luma and chroma planes.
    /// The output must have exactly the byte size of the output format for the window size.
    fn ycbcr(&self, planes: &YCbCrPlanes, options: CompositeOptions<'_>, output: &mut [u8]) -> UnitResult;

    /// Convert a gbrg bayer mosaic.
    /// The output must have exactly the byte size of the output format for the window size.
    fn bayer(&self, mosaic: &BayerMosaic<'_>, options: CompositeOptions<'_>, output: &mut [u8]) -> UnitResult;

    /// Convert any kind of samples.
    fn composite(&self, samples: &Samples<'_>, options: CompositeOptions<'_>, output: &mut [u8]) -> UnitResult {
        match samples {
            Samples::YCbCr(planes) => self.ycbcr(planes, options, output),
            Samples::Bayer(mosaic) => self.bayer(mosaic, options, output),
        }
    }
}

/// Everything a compositor needs to know besides the samples.
#[derive(Clone, Copy, Debug)]
pub struct CompositeOptions<'o> {

    /// The part of the native grid that ends up in the output.
    pub window: Window,

    /// The current color correction.
    pub tables: &'o GammaTables,

    /// Swap red and blue, or the two chroma planes.
    pub force_rgb: bool,

    /// Checked once per row of 2x2 blocks.
    pub abort: &'o AtomicBool,
}

/// The four luma samples of a 2x2 block and the chroma pair they share.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct YCbCrBlock {

    /// Top left, top right, bottom left, bottom right.
    pub luma: [i32; 4],

    pub first_chroma: i32,
    pub second_chroma: i32,
}

/// The four samples of a 2x2 block of a gbrg mosaic.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BayerBlock {

    /// The green sample on the blue line.
    pub top_left: u8,

    pub top_right: u8,
    pub bottom_left: u8,

    /// The green sample on the red line.
    pub bottom_right: u8,
}


/// The compositor for an output format, or none for jpeg passthrough,
/// which copies the compressed scan instead of decoding it.
pub fn compositor_for(format: OutputFormat) -> Option<&'static dyn Compositor> {
    match format {
        OutputFormat::Rgb565 => Some(&Rgb565Compositor),
        OutputFormat::Rgb24 => Some(&RgbCompositor { bytes_per_pixel: 3 }),
        OutputFormat::Rgb32 => Some(&RgbCompositor { bytes_per_pixel: 4 }),
        OutputFormat::Yuv420p => Some(&Yuv420pCompositor),
        OutputFormat::Jpeg => None,
    }
}

/// Visit the 2x2 blocks of the window row by row.
/// The callback receives the top left pixel of the block
/// on the native grid and in the output.
pub(crate) fn for_each_block(
    window: Window, abort: &AtomicBool,
    mut visit: impl FnMut(Vec2<usize>, Vec2<usize>) -> UnitResult
) -> UnitResult
{
    for y in (0 .. window.size.height()).step_by(2) {
        check_abort(abort)?;

        for x in (0 .. window.size.width()).step_by(2) {
            let target = Vec2(x, y);
            visit(window.position + target, target)?;
        }
    }

    Ok(())
}

impl YCbCrBlock {

    /// Read the block whose top left pixel is at this position of the native grid.
    #[inline]
    pub fn read(planes: &YCbCrPlanes, pixel: Vec2<usize>) -> Self {
        let width = planes.size.width();
        let top = pixel.y() * width + pixel.x();
        let bottom = top + width;
        let chroma = (pixel.y() / 2) * planes.chroma_width() + pixel.x() / 2;

        YCbCrBlock {
            luma: [ planes.luma[top], planes.luma[top + 1], planes.luma[bottom], planes.luma[bottom + 1] ],
            first_chroma: planes.first_chroma[chroma],
            second_chroma: planes.second_chroma[chroma],
        }
    }
}

impl BayerBlock {

    /// Read the block whose top left pixel is at this position of the native grid.
    #[inline]
    pub fn read(mosaic: &BayerMosaic<'_>, pixel: Vec2<usize>) -> Self {
        BayerBlock {
            top_left: mosaic.at(pixel),
            top_right: mosaic.at(pixel + Vec2(1, 0)),
            bottom_left: mosaic.at(pixel + Vec2(0, 1)),
            bottom_right: mosaic.at(pixel + Vec2(1, 1)),
        }
    }

    /// The mean of both raw green samples, used for the two pixels without their own green.
    #[inline]
    pub fn mean_green(self) -> u8 {
        ((u16::from(self.top_left) + u16::from(self.bottom_right)) >> 1) as u8
    }
}
