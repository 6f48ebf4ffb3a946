
//! Describes what a camera sends and what a caller wants to receive.

use std::fmt;
use crate::math::Vec2;


/// The pixel encoding of a raw frame, as it arrives from the camera bridge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NativeEncoding {

    /// Baseline jpeg scan data with 4:1:1 sampling and 16x16 pixel blocks.
    /// The bridge strips the jpeg header and does not escape `0xFF` bytes.
    Jpeg411,

    /// Jpeg scan data with 4:2:2 sampling behind a 16 byte vendor header.
    /// The header contains the frame width and height.
    Jpeg422Tagged,

    /// Jpeg scan data with 4:2:2 sampling behind a 39 byte Conexant header.
    /// The header contains the frame dimensions and the restart interval.
    Jpeg422Conexant,

    /// Jpeg scan data with 4:2:2 sampling and no header at all.
    Jpeg422Bare,

    /// Planar yuv in line pairs: luma line, chroma line, luma line.
    Yuvy,

    /// Planar yuv in line pairs: luma line, first chroma, luma line, second chroma.
    Yuyv,

    /// Planar yuv in line pairs: two luma lines, then both chroma lines.
    Yyuv,

    /// Raw bayer mosaic in green-blue / red-green order.
    BayerGbrg,

    /// Bayer mosaic from the TV8532 bridge, where each line carries a header and an end marker.
    BayerTv8532,

    /// Bayer mosaic compressed with the predictive prefix code of Sonix bridges.
    SonixPacked,
}

/// The chroma sampling of a jpeg encoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Sampling {

    /// Four luma blocks share one pair of chroma blocks, 16x16 pixels per unit.
    FourOneOne,

    /// Two luma blocks share one pair of chroma blocks, 16x8 pixels per unit.
    FourTwoTwo,
}

/// The pixel format a caller wants to receive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OutputFormat {

    /// 16 bits per pixel, stored as little endian words.
    Rgb565,

    /// 24 bits per pixel. The channel order depends on `force_rgb` and on the camera.
    Rgb24,

    /// 32 bits per pixel. The fourth byte is always zero.
    Rgb32,

    /// A full resolution luma plane, followed by two chroma planes of a quarter size each.
    Yuv420p,

    /// A complete jpeg file, reconstructed from the scan data without decoding it.
    Jpeg,
}


impl NativeEncoding {

    /// All encodings in declaration order.
    pub const ALL: [NativeEncoding; 10] = [
        NativeEncoding::Jpeg411, NativeEncoding::Jpeg422Tagged,
        NativeEncoding::Jpeg422Conexant, NativeEncoding::Jpeg422Bare,
        NativeEncoding::Yuvy, NativeEncoding::Yuyv, NativeEncoding::Yyuv,
        NativeEncoding::BayerGbrg, NativeEncoding::BayerTv8532, NativeEncoding::SonixPacked,
    ];

    /// The jpeg sampling, or none if this is not a jpeg encoding.
    pub fn sampling(self) -> Option<Sampling> {
        match self {
            NativeEncoding::Jpeg411 => Some(Sampling::FourOneOne),

            NativeEncoding::Jpeg422Tagged
            | NativeEncoding::Jpeg422Conexant
            | NativeEncoding::Jpeg422Bare => Some(Sampling::FourTwoTwo),

            _ => None,
        }
    }

    /// Whether the frames contain jpeg scan data.
    pub fn is_jpeg(self) -> bool {
        self.sampling().is_some()
    }

    /// Whether the frames contain a bayer mosaic, compressed or not.
    pub fn is_bayer(self) -> bool {
        matches!(self, NativeEncoding::BayerGbrg | NativeEncoding::BayerTv8532 | NativeEncoding::SonixPacked)
    }

    /// The size of the smallest unit that can be cropped away.
    /// Jpeg frames are cropped in whole coding units, everything else in 2x2 pixel blocks.
    pub fn block_size(self) -> Vec2<usize> {
        match self.sampling() {
            Some(sampling) => sampling.unit_size(),
            None => Vec2(2, 2),
        }
    }

    /// Number of vendor header bytes in front of the scan data.
    pub fn vendor_header_len(self) -> usize {
        match self {
            NativeEncoding::Jpeg422Tagged => 16,
            NativeEncoding::Jpeg422Conexant => 39,
            _ => 0,
        }
    }

    /// The quantization quality index the camera bridges of this encoding use.
    pub fn default_quality(self) -> usize {
        match self {
            NativeEncoding::Jpeg411 => 2,
            NativeEncoding::Jpeg422Tagged | NativeEncoding::Jpeg422Conexant => 1,
            _ => 0,
        }
    }
}

impl Sampling {

    /// Pixel size of one minimum coded unit.
    pub fn unit_size(self) -> Vec2<usize> {
        match self {
            Sampling::FourOneOne => Vec2(16, 16),
            Sampling::FourTwoTwo => Vec2(16, 8),
        }
    }

    /// Number of luma blocks per unit. Each unit also has two chroma blocks.
    pub fn luma_blocks(self) -> usize {
        match self {
            Sampling::FourOneOne => 4,
            Sampling::FourTwoTwo => 2,
        }
    }

    /// The sampling factor byte of the jpeg frame header.
    pub fn frame_header_byte(self) -> u8 {
        match self {
            Sampling::FourOneOne => 0x22,
            Sampling::FourTwoTwo => 0x21,
        }
    }
}

impl OutputFormat {

    /// Bytes per pixel for packed formats, none for planar and jpeg output.
    pub fn bytes_per_pixel(self) -> Option<usize> {
        match self {
            OutputFormat::Rgb565 => Some(2),
            OutputFormat::Rgb24 => Some(3),
            OutputFormat::Rgb32 => Some(4),
            OutputFormat::Yuv420p | OutputFormat::Jpeg => None,
        }
    }

    /// The number of bytes a decoded frame of this size occupies.
    /// Returns none for jpeg output, whose length depends on the content.
    pub fn byte_size(self, size: Vec2<usize>) -> Option<usize> {
        match self {
            OutputFormat::Yuv420p => Some(size.area() * 3 / 2),
            OutputFormat::Jpeg => None,
            packed => packed.bytes_per_pixel().map(|bytes| size.area() * bytes),
        }
    }
}


impl fmt::Display for NativeEncoding {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(match self {
            NativeEncoding::Jpeg411 => "jpeg 4:1:1",
            NativeEncoding::Jpeg422Tagged => "tagged jpeg 4:2:2",
            NativeEncoding::Jpeg422Conexant => "conexant jpeg 4:2:2",
            NativeEncoding::Jpeg422Bare => "bare jpeg 4:2:2",
            NativeEncoding::Yuvy => "yuvy",
            NativeEncoding::Yuyv => "yuyv",
            NativeEncoding::Yyuv => "yyuv",
            NativeEncoding::BayerGbrg => "gbrg bayer",
            NativeEncoding::BayerTv8532 => "tv8532 bayer",
            NativeEncoding::SonixPacked => "sonix packed bayer",
        })
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(match self {
            OutputFormat::Rgb565 => "rgb565",
            OutputFormat::Rgb24 => "rgb24",
            OutputFormat::Rgb32 => "rgb32",
            OutputFormat::Yuv420p => "yuv420p",
            OutputFormat::Jpeg => "jpeg passthrough",
        })
    }
}
