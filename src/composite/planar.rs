
//! Planar yuv 4:2:0 output: a full resolution luma plane
//! followed by two chroma planes of half the width and half the height.

use crate::codec::{BayerMosaic, YCbCrPlanes};
use crate::error::UnitResult;
use crate::math::{Vec2, clip};
use super::color::planar_chroma;
use super::{BayerBlock, Compositor, CompositeOptions, YCbCrBlock, for_each_block};


/// Writes three planes. Bayer frames are converted with a rough approximation
/// of the rgb to yuv matrix, which existing captures depend on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Yuv420pCompositor;

/// Where the planes of the output begin.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct PlaneLayout {
    width: usize,
    first_chroma: usize,
    second_chroma: usize,
}


impl PlaneLayout {
    fn new(size: Vec2<usize>) -> Self {
        let luma_len = size.area();
        let chroma_len = luma_len / 4;

        PlaneLayout {
            width: size.width(),
            first_chroma: luma_len,
            second_chroma: luma_len + chroma_len,
        }
    }

    /// The luma indices of a 2x2 block and the chroma index within a chroma plane.
    #[inline]
    fn indices(self, target: Vec2<usize>) -> ([usize; 4], usize) {
        let top = target.y() * self.width + target.x();
        let bottom = top + self.width;
        let chroma = (target.y() / 2) * (self.width / 2) + target.x() / 2;
        ([top, top + 1, bottom, bottom + 1], chroma)
    }
}

impl Compositor for Yuv420pCompositor {

    /// The first chroma plane receives the first chroma component, unless rgb order is forced.
    fn ycbcr(&self, planes: &YCbCrPlanes, options: CompositeOptions<'_>, output: &mut [u8]) -> UnitResult {
        let layout = PlaneLayout::new(options.window.size);

        for_each_block(options.window, options.abort, |source, target| {
            let block = YCbCrBlock::read(planes, source);
            let (luma_indices, chroma_index) = layout.indices(target);

            for (&luma, index) in block.luma.iter().zip(luma_indices) {
                output[index] = clip(luma);
            }

            let (first, second) = if options.force_rgb { (block.second_chroma, block.first_chroma) }
                                  else { (block.first_chroma, block.second_chroma) };

            output[layout.first_chroma + chroma_index] = planar_chroma(first);
            output[layout.second_chroma + chroma_index] = planar_chroma(second);
            Ok(())
        })
    }

    /// The first chroma plane receives the blue difference, unless rgb order is forced.
    /// The chroma values wrap around instead of saturating.
    fn bayer(&self, mosaic: &BayerMosaic<'_>, options: CompositeOptions<'_>, output: &mut [u8]) -> UnitResult {
        let layout = PlaneLayout::new(options.window.size);
        let tables = options.tables;

        let scale_green = |green: i32| (green * 672) >> 10;

        for_each_block(options.window, options.abort, |source, target| {
            let block = BayerBlock::read(mosaic, source);

            let top_green = i32::from(tables.green[usize::from(block.top_left)]);
            let blue = i32::from(tables.blue[usize::from(block.top_right)]);
            let red = i32::from(tables.red[usize::from(block.bottom_left)]);
            let bottom_green = i32::from(tables.green[usize::from(block.bottom_right)]);
            let mean_green = (top_green + bottom_green) >> 1;

            let red_part = (red * 232) >> 10;
            let blue_part = (blue * 128) >> 10;
            let luma = |green: i32| clip(red_part + scale_green(green) + blue_part);

            let mean_luma = luma(mean_green);
            let lumas = [luma(top_green), mean_luma, mean_luma, luma(bottom_green)];

            let (luma_indices, chroma_index) = layout.indices(target);
            for (luma, index) in lumas.into_iter().zip(luma_indices) {
                output[index] = luma;
            }

            let average = lumas.iter().map(|&luma| i32::from(luma)).sum::<i32>() >> 2;
            let red_difference = ((red - average) * 672) >> 10;
            let blue_difference = (blue - average) >> 1;

            let (first, second) = if options.force_rgb { (red_difference, blue_difference) }
                                  else { (blue_difference, red_difference) };

            output[layout.first_chroma + chroma_index] = (128 + first) as u8;
            output[layout.second_chroma + chroma_index] = (128 + second) as u8;
            Ok(())
        })
    }
}


#[cfg(test)]
mod test {
    use super::*;
    use std::borrow::Cow;
    use std::sync::atomic::AtomicBool;
    use crate::meta::{FrameGeometry, OutputFormat};
    use crate::picture::GammaTables;

    fn composite_bayer(samples: Vec<u8>, size: Vec2<usize>, force_rgb: bool) -> Vec<u8> {
        let tables = GammaTables::identity();
        let abort = AtomicBool::new(false);
        let geometry = FrameGeometry::uncropped(size);
        let mosaic = BayerMosaic::new(size, Cow::Owned(samples)).unwrap();

        let mut output = vec![0; OutputFormat::Yuv420p.byte_size(size).unwrap()];
        let options = CompositeOptions { window: geometry.window(), tables: &tables, force_rgb, abort: &abort };
        Yuv420pCompositor.bayer(&mosaic, options, &mut output).unwrap();
        output
    }

    #[test]
    fn gray_bayer_has_neutral_chroma(){
        let output = composite_bayer(vec![100; 16], Vec2(4, 4), false);
        assert_eq!(&output[.. 16], &[99; 16]);
        assert_eq!(&output[16 ..], &[128; 8]);
    }

    #[test]
    fn bayer_chroma_keeps_the_approximate_matrix(){
        let red = vec![0, 0, 255, 0];

        let output = composite_bayer(red.clone(), Vec2(2, 2), false);
        assert_eq!(output, vec![57, 57, 57, 57, 99, 1]);

        let output = composite_bayer(red, Vec2(2, 2), true);
        assert_eq!(&output[4 ..], &[1, 99]);
    }

    #[test]
    fn ycbcr_planes_are_clipped(){
        let tables = GammaTables::identity();
        let abort = AtomicBool::new(false);
        let geometry = FrameGeometry::uncropped(Vec2(2, 2));

        let mut planes = YCbCrPlanes::new(Vec2(2, 2));
        planes.luma = vec![-5, 300, 128, 0];
        planes.first_chroma = vec![10];
        planes.second_chroma = vec![-200];

        let mut output = vec![0; 6];
        let options = CompositeOptions { window: geometry.window(), tables: &tables, force_rgb: false, abort: &abort };
        Yuv420pCompositor.ycbcr(&planes, options, &mut output).unwrap();
        assert_eq!(output, vec![0, 255, 128, 0, 138, 0]);

        let options = CompositeOptions { force_rgb: true, ..options };
        Yuv420pCompositor.ycbcr(&planes, options, &mut output).unwrap();
        assert_eq!(&output[4 ..], &[0, 138]);
    }
}
