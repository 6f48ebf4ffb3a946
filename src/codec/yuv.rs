
//! Uncompressed yuv 4:2:0, sent as pairs of luma lines
//! together with one line of both chroma components.

use std::sync::atomic::AtomicBool;
use crate::error::Result;
use crate::io::slice_at;
use crate::math::Vec2;
use crate::meta::{FrameGeometry, NativeEncoding};
use super::{Bytes, SampleDecoder, Samples, YCbCrPlanes, check_abort};


/// How a camera arranges the lines of one row pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum YuvLayout {

    /// Upper luma line, first chroma, second chroma, lower luma line.
    Yuvy,

    /// Upper luma line, first chroma, lower luma line, second chroma.
    Yuyv,

    /// Upper luma line, lower luma line, first chroma, second chroma.
    Yyuv,
}

/// Byte offsets inside one row pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct RowPairOffsets {
    upper_luma: usize,
    lower_luma: usize,
    first_chroma: usize,
    second_chroma: usize,
}

/// Splits uncompressed yuv frames into planes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct YuvDecoder {
    layout: YuvLayout,
}


impl YuvLayout {

    /// The layout of a yuv encoding, or none for other encodings.
    pub fn from_encoding(encoding: NativeEncoding) -> Option<Self> {
        match encoding {
            NativeEncoding::Yuvy => Some(YuvLayout::Yuvy),
            NativeEncoding::Yuyv => Some(YuvLayout::Yuyv),
            NativeEncoding::Yyuv => Some(YuvLayout::Yyuv),
            _ => None,
        }
    }

    /// The native encoding with this layout.
    pub fn encoding(self) -> NativeEncoding {
        match self {
            YuvLayout::Yuvy => NativeEncoding::Yuvy,
            YuvLayout::Yuyv => NativeEncoding::Yuyv,
            YuvLayout::Yyuv => NativeEncoding::Yyuv,
        }
    }

    /// The number of bytes of one row pair: two luma lines and two half chroma lines.
    pub fn row_pair_len(width: usize) -> usize {
        3 * width
    }

    fn offsets(self, width: usize) -> RowPairOffsets {
        let half = width / 2;

        match self {
            YuvLayout::Yuvy => RowPairOffsets {
                upper_luma: 0, first_chroma: width,
                second_chroma: width + half, lower_luma: 2 * width,
            },

            YuvLayout::Yuyv => RowPairOffsets {
                upper_luma: 0, first_chroma: width,
                lower_luma: width + half, second_chroma: 2 * width + half,
            },

            YuvLayout::Yyuv => RowPairOffsets {
                upper_luma: 0, lower_luma: width,
                first_chroma: 2 * width, second_chroma: 2 * width + half,
            },
        }
    }
}

impl YuvDecoder {

    /// Decode frames with this layout.
    pub fn new(layout: YuvLayout) -> Self {
        YuvDecoder { layout }
    }
}

impl SampleDecoder for YuvDecoder {
    fn decode<'f>(&self, input: Bytes<'f>, geometry: &FrameGeometry, abort: &AtomicBool) -> Result<Samples<'f>> {
        geometry.validate(self.layout.encoding())?;

        let Vec2(width, height) = geometry.hardware;
        let row_pair_len = YuvLayout::row_pair_len(width);
        let input = slice_at(input, 0, row_pair_len * (height / 2), "yuv frame")?;

        let offsets = self.layout.offsets(width);
        let window = geometry.window();
        let mut planes = YCbCrPlanes::new(geometry.hardware);
        let chroma_width = planes.chroma_width();

        let first_pair = window.position.y() / 2;
        let pair_count = window.size.height() / 2;

        for (pair_index, row_pair) in input.chunks_exact(row_pair_len).enumerate().skip(first_pair).take(pair_count) {
            check_abort(abort)?;

            let upper_row = pair_index * 2 * width;
            let lower_row = upper_row + width;
            let chroma_row = pair_index * chroma_width;

            for x in (window.position.x() .. window.end().x()).step_by(2) {
                let chroma_x = x / 2;

                for column in x .. x + 2 {
                    planes.luma[upper_row + column] = luma(row_pair[offsets.upper_luma + column]);
                    planes.luma[lower_row + column] = luma(row_pair[offsets.lower_luma + column]);
                }

                planes.first_chroma[chroma_row + chroma_x] = chroma(row_pair[offsets.first_chroma + chroma_x]);
                planes.second_chroma[chroma_row + chroma_x] = chroma(row_pair[offsets.second_chroma + chroma_x]);
            }
        }

        Ok(Samples::YCbCr(planes))
    }
}

/// Luma is sent as a signed byte centered at zero.
#[inline]
fn luma(byte: u8) -> i32 {
    i32::from(byte.wrapping_add(128))
}

/// Chroma is sent as a signed byte.
#[inline]
fn chroma(byte: u8) -> i32 {
    i32::from(byte as i8)
}
