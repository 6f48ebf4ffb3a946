
//! Packed rgb output with two, three or four bytes per pixel.

use crate::codec::{BayerMosaic, YCbCrPlanes};
use crate::error::UnitResult;
use crate::io::put_u16_le;
use crate::math::Vec2;
use super::color::{ChannelOffsets, ChromaTerms, pack_rgb565};
use super::{BayerBlock, Compositor, CompositeOptions, YCbCrBlock, for_each_block};


/// Five bits of red, six bits of green, five bits of blue, stored as little endian `u16`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rgb565Compositor;

/// One byte per channel. With four bytes per pixel, the last byte is zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RgbCompositor {

    /// Either three or four.
    pub bytes_per_pixel: usize,
}


/// The byte index of the pixels of a 2x2 block in a packed output,
/// in the order top left, top right, bottom left, bottom right.
#[inline]
fn block_pixel_indices(target: Vec2<usize>, output_width: usize, bytes_per_pixel: usize) -> [usize; 4] {
    let top = (target.y() * output_width + target.x()) * bytes_per_pixel;
    let bottom = top + output_width * bytes_per_pixel;
    [top, top + bytes_per_pixel, bottom, bottom + bytes_per_pixel]
}

impl Compositor for Rgb565Compositor {
    fn ycbcr(&self, planes: &YCbCrPlanes, options: CompositeOptions<'_>, output: &mut [u8]) -> UnitResult {
        let output_width = options.window.size.width();

        for_each_block(options.window, options.abort, |source, target| {
            let block = YCbCrBlock::read(planes, source);

            // this format swaps chroma instead of the store positions
            let (v, u) = if options.force_rgb { (block.second_chroma, block.first_chroma) }
                         else { (block.first_chroma, block.second_chroma) };

            let terms = ChromaTerms::new(v, u);
            let indices = block_pixel_indices(target, output_width, 2);

            for (&luma, index) in block.luma.iter().zip(indices) {
                put_u16_le(output, index, pack_rgb565(terms.rgb(luma, options.tables)))?;
            }

            Ok(())
        })
    }

    fn bayer(&self, mosaic: &BayerMosaic<'_>, options: CompositeOptions<'_>, output: &mut [u8]) -> UnitResult {
        let output_width = options.window.size.width();
        let tables = options.tables;

        for_each_block(options.window, options.abort, |source, target| {
            let block = BayerBlock::read(mosaic, source);

            let (red, blue) = if options.force_rgb { (block.bottom_left, block.top_right) }
                              else { (block.top_right, block.bottom_left) };

            let red = tables.red[usize::from(red)];
            let blue = tables.blue[usize::from(blue)];
            let mean_green = block.mean_green();
            let greens = [block.top_left, mean_green, mean_green, block.bottom_right];

            let indices = block_pixel_indices(target, output_width, 2);
            for (green, index) in greens.into_iter().zip(indices) {
                let green = tables.green[usize::from(green)];
                put_u16_le(output, index, pack_rgb565([red, green, blue]))?;
            }

            Ok(())
        })
    }
}

impl Compositor for RgbCompositor {
    fn ycbcr(&self, planes: &YCbCrPlanes, options: CompositeOptions<'_>, output: &mut [u8]) -> UnitResult {
        let output_width = options.window.size.width();
        let offsets = if options.force_rgb { ChannelOffsets::BGR } else { ChannelOffsets::RGB };

        for_each_block(options.window, options.abort, |source, target| {
            let block = YCbCrBlock::read(planes, source);
            let terms = ChromaTerms::new(block.first_chroma, block.second_chroma);
            let indices = block_pixel_indices(target, output_width, self.bytes_per_pixel);

            for (&luma, index) in block.luma.iter().zip(indices) {
                self.store(output, index, offsets, terms.rgb(luma, options.tables));
            }

            Ok(())
        })
    }

    /// Bayer frames are stored in blue first order unless rgb order is forced,
    /// the opposite of luma and chroma frames.
    fn bayer(&self, mosaic: &BayerMosaic<'_>, options: CompositeOptions<'_>, output: &mut [u8]) -> UnitResult {
        let output_width = options.window.size.width();
        let offsets = if options.force_rgb { ChannelOffsets::RGB } else { ChannelOffsets::BGR };
        let tables = options.tables;

        for_each_block(options.window, options.abort, |source, target| {
            let block = BayerBlock::read(mosaic, source);

            let red = tables.red[usize::from(block.bottom_left)];
            let blue = tables.blue[usize::from(block.top_right)];
            let mean_green = block.mean_green();
            let greens = [block.top_left, mean_green, mean_green, block.bottom_right];

            let indices = block_pixel_indices(target, output_width, self.bytes_per_pixel);
            for (green, index) in greens.into_iter().zip(indices) {
                self.store(output, index, offsets, [red, tables.green[usize::from(green)], blue]);
            }

            Ok(())
        })
    }
}

impl RgbCompositor {

    #[inline]
    fn store(&self, output: &mut [u8], index: usize, offsets: ChannelOffsets, rgb: [u8; 3]) {
        let pixel = &mut output[index .. index + self.bytes_per_pixel];
        offsets.store(pixel, rgb);

        if let Some(padding) = pixel.get_mut(3) {
            *padding = 0;
        }
    }
}


#[cfg(test)]
mod test {
    use super::*;
    use std::borrow::Cow;
    use std::sync::atomic::AtomicBool;
    use crate::meta::{FrameGeometry, NativeEncoding, OutputFormat};
    use crate::picture::GammaTables;

    fn options<'o>(geometry: &FrameGeometry, tables: &'o GammaTables, force_rgb: bool, abort: &'o AtomicBool) -> CompositeOptions<'o> {
        CompositeOptions { window: geometry.window(), tables, force_rgb, abort }
    }

    fn mosaic() -> BayerMosaic<'static> {
        // one gbrg block: green 100 and 50, blue 30, red 200
        BayerMosaic::new(Vec2(2, 2), Cow::Owned(vec![100, 30, 200, 50])).unwrap()
    }

    #[test]
    fn bayer_rgb24_is_blue_first(){
        let tables = GammaTables::identity();
        let abort = AtomicBool::new(false);
        let geometry = FrameGeometry::uncropped(Vec2(2, 2));
        let compositor = RgbCompositor { bytes_per_pixel: 3 };

        let mut output = vec![0; 12];
        compositor.bayer(&mosaic(), options(&geometry, &tables, false, &abort), &mut output).unwrap();
        assert_eq!(output, vec![30, 100, 200,  30, 75, 200,  30, 75, 200,  30, 50, 200]);

        compositor.bayer(&mosaic(), options(&geometry, &tables, true, &abort), &mut output).unwrap();
        assert_eq!(&output[.. 3], &[200, 100, 30]);
    }

    #[test]
    fn bayer_rgb565_swaps_sites(){
        let tables = GammaTables::identity();
        let abort = AtomicBool::new(false);
        let geometry = FrameGeometry::uncropped(Vec2(2, 2));

        let mut output = vec![0; 8];
        Rgb565Compositor.bayer(&mosaic(), options(&geometry, &tables, false, &abort), &mut output).unwrap();

        // without forcing, the top right sample is treated as red
        let expected = pack_rgb565([30, 100, 200]).to_le_bytes();
        assert_eq!(&output[.. 2], &expected);

        Rgb565Compositor.bayer(&mosaic(), options(&geometry, &tables, true, &abort), &mut output).unwrap();
        let expected = pack_rgb565([200, 50, 30]).to_le_bytes();
        assert_eq!(&output[6 ..], &expected);
    }

    #[test]
    fn ycbcr_rgb32_pads_with_zero(){
        let tables = GammaTables::identity();
        let abort = AtomicBool::new(false);
        let geometry = FrameGeometry::uncropped(Vec2(2, 2));

        let mut planes = YCbCrPlanes::new(Vec2(2, 2));
        planes.luma = vec![100, 110, 120, 130];
        planes.first_chroma = vec![10];
        planes.second_chroma = vec![-10];

        let mut output = vec![0xAA; 16];
        RgbCompositor { bytes_per_pixel: 4 }
            .ycbcr(&planes, options(&geometry, &tables, false, &abort), &mut output).unwrap();

        // red + 15, green - 1, blue - 21
        assert_eq!(&output[.. 4], &[115, 99, 79, 0]);
        assert_eq!(&output[12 ..], &[145, 129, 109, 0]);
    }

    #[test]
    fn ycbcr_rgb565_swaps_chroma(){
        let tables = GammaTables::identity();
        let abort = AtomicBool::new(false);
        let geometry = FrameGeometry::uncropped(Vec2(2, 2));

        let mut planes = YCbCrPlanes::new(Vec2(2, 2));
        planes.first_chroma = vec![40];

        let mut output = vec![0; 8];
        Rgb565Compositor.ycbcr(&planes, options(&geometry, &tables, false, &abort), &mut output).unwrap();
        let reddish = pack_rgb565(ChromaTerms::new(40, 0).rgb(128, &tables));
        assert_eq!(&output[.. 2], &reddish.to_le_bytes());

        Rgb565Compositor.ycbcr(&planes, options(&geometry, &tables, true, &abort), &mut output).unwrap();
        let bluish = pack_rgb565(ChromaTerms::new(0, 40).rgb(128, &tables));
        assert_eq!(&output[.. 2], &bluish.to_le_bytes());
        assert_ne!(reddish, bluish);
    }

    #[test]
    fn writes_only_the_window(){
        let tables = GammaTables::identity();
        let abort = AtomicBool::new(false);
        let geometry = FrameGeometry::centered(NativeEncoding::BayerGbrg, Vec2(6, 4), Vec2(2, 2)).unwrap();

        // the window is the block at (2, 0), every sample outside is bright
        let mut samples = vec![255_u8; 24];
        for index in [2, 3, 8, 9] { samples[index] = 0; }
        let mosaic = BayerMosaic::new(Vec2(6, 4), Cow::Owned(samples)).unwrap();

        let format = OutputFormat::Rgb24;
        let mut output = vec![0; format.byte_size(geometry.requested).unwrap()];
        RgbCompositor { bytes_per_pixel: 3 }
            .bayer(&mosaic, options(&geometry, &tables, false, &abort), &mut output).unwrap();

        assert!(output.iter().all(|&byte| byte == 0));
    }

    #[test]
    fn honors_the_abort_flag(){
        let tables = GammaTables::identity();
        let abort = AtomicBool::new(true);
        let geometry = FrameGeometry::uncropped(Vec2(2, 2));

        let mut output = vec![0; 8];
        let result = Rgb565Compositor.bayer(&mosaic(), options(&geometry, &tables, false, &abort), &mut output);
        assert!(matches!(result, Err(crate::error::Error::Aborted)));
    }
}
