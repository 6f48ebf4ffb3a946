
//! The integer color arithmetic shared by all compositors.

use crate::picture::GammaTables;


/// Where the three channels go inside one packed pixel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChannelOffsets {
    pub red: usize,
    pub green: usize,
    pub blue: usize,
}

/// The chroma contribution to each rgb channel, computed once per 2x2 block
/// and added to the luma of each of its four pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChromaTerms {
    red: i64,
    green: i64,
    blue: i64,
}


impl ChannelOffsets {

    /// Red in the first byte.
    pub const RGB: Self = ChannelOffsets { red: 0, green: 1, blue: 2 };

    /// Blue in the first byte.
    pub const BGR: Self = ChannelOffsets { red: 2, green: 1, blue: 0 };

    /// Store the three channels into a pixel that has at least three bytes.
    #[inline]
    pub fn store(self, pixel: &mut [u8], [red, green, blue]: [u8; 3]) {
        pixel[self.red] = red;
        pixel[self.green] = green;
        pixel[self.blue] = blue;
    }
}

impl ChromaTerms {

    /// Approximates the YCbCr rotation with shifts of the two chroma values.
    /// `v` drives red, `u` drives blue.
    #[inline]
    pub fn new(v: i32, u: i32) -> Self {
        let (v, u) = (i64::from(v), i64::from(u));

        ChromaTerms {
            red: (v * 1536) >> 10,
            green: (u * 384 + v * 528) >> 10,
            blue: (u * 2064) >> 10,
        }
    }

    /// Corrected red, green and blue of a pixel with this luma.
    #[inline]
    pub fn rgb(self, luma: i32, tables: &GammaTables) -> [u8; 3] {
        let luma = i64::from(luma);

        [
            tables.red[usize::from(clip_wide(luma + self.red))],
            tables.green[usize::from(clip_wide(luma - self.green))],
            tables.blue[usize::from(clip_wide(luma + self.blue))],
        ]
    }
}

/// Keep the upper five, six and five bits of each channel.
/// Red ends up in the least significant bits.
#[inline]
pub fn pack_rgb565([red, green, blue]: [u8; 3]) -> u16 {
    (u16::from(red) & 0xF8) >> 3
        | (u16::from(green) & 0xFC) << 3
        | (u16::from(blue) & 0xF8) << 8
}

/// Saturate to the byte range.
#[inline]
pub fn clip_wide(value: i64) -> u8 {
    value.clamp(0, 255) as u8
}

/// A chroma sample centered at zero, as stored in a yuv 4:2:0 plane centered at 128.
#[inline]
pub fn planar_chroma(chroma: i32) -> u8 {
    clip_wide(128 + i64::from(chroma))
}
