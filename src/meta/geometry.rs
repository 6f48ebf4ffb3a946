
//! Frame dimensions and the crop rectangle that maps
//! the hardware resolution to the requested resolution.

use crate::math::Vec2;
use crate::error::{Error, Result, UnitResult};
use super::encoding::NativeEncoding;


/// Margins removed from each side of the hardware frame, in pixels of the native grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Crop {

    /// Pixel columns removed on the left.
    pub left: usize,

    /// Pixel columns removed on the right.
    pub right: usize,

    /// Pixel rows removed at the top.
    pub top: usize,

    /// Pixel rows removed at the bottom.
    pub bottom: usize,
}

/// The size of the frame that the camera sends,
/// the size of the frame that the caller wants,
/// and the margins that make up the difference.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameGeometry {

    /// The dimensions of the arriving bitstream.
    pub hardware: Vec2<usize>,

    /// The dimensions of the decoded output.
    pub requested: Vec2<usize>,

    /// Removes the difference between hardware and requested dimensions.
    pub crop: Crop,
}

/// The part of the native grid that ends up in the output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Window {

    /// The top left pixel of the window on the native grid.
    pub position: Vec2<usize>,

    /// The width and height of the window, which equals the requested size.
    pub size: Vec2<usize>,
}


impl FrameGeometry {

    /// Decode the whole frame without cropping.
    pub fn uncropped(size: Vec2<usize>) -> Self {
        FrameGeometry { hardware: size, requested: size, crop: Crop::default() }
    }

    /// Cut equal margins from opposite sides, leaving the requested size in the center.
    /// If the margins cannot be equal, the right or bottom margin is one unit larger.
    /// Jpeg frames are cropped in units of whole coding units,
    /// all other frames in units of 2x2 pixel blocks.
    pub fn centered(encoding: NativeEncoding, hardware: Vec2<usize>, requested: Vec2<usize>) -> Result<Self> {
        if requested.0 > hardware.0 || requested.1 > hardware.1 {
            return Err(Error::bad_dimensions(format!(
                "requested size {} exceeds hardware size {}", requested, hardware
            )));
        }

        let unit = encoding.block_size();

        let split = |difference: usize, unit: usize| -> Result<(usize, usize)> {
            if difference % unit != 0 {
                return Err(Error::bad_dimensions(format!(
                    "cannot crop {} pixels in steps of {} pixels", difference, unit
                )));
            }

            let units = difference / unit;
            let first = units / 2;
            let second = first + units % 2;
            Ok((first * unit, second * unit))
        };

        let (left, right) = split(hardware.0 - requested.0, unit.0)?;
        let (top, bottom) = split(hardware.1 - requested.1, unit.1)?;

        let geometry = FrameGeometry { hardware, requested, crop: Crop { left, right, top, bottom } };
        geometry.validate(encoding)?;
        Ok(geometry)
    }

    /// Check that the frame can be decoded with this encoding.
    /// Jpeg frames must consist of whole coding units,
    /// all other frames of whole 2x2 blocks.
    /// The crop margins must remove exactly the difference between hardware and requested size,
    /// and must not cut through a unit.
    pub fn validate(&self, encoding: NativeEncoding) -> UnitResult {
        let unit = encoding.block_size();
        let Vec2(width, height) = self.hardware;

        if width == 0 || height == 0 || self.requested.0 == 0 || self.requested.1 == 0 {
            return Err(Error::bad_dimensions("frame must not be empty"));
        }

        if width % unit.0 != 0 || height % unit.1 != 0 {
            return Err(Error::bad_dimensions(format!(
                "{} frame of {} is not a multiple of {}", encoding, self.hardware, unit
            )));
        }

        if self.requested.0 > width || self.requested.1 > height {
            return Err(Error::bad_dimensions(format!(
                "requested size {} exceeds hardware size {}", self.requested, self.hardware
            )));
        }

        if self.requested.0 % 2 != 0 || self.requested.1 % 2 != 0 {
            return Err(Error::bad_dimensions(format!("requested size {} is odd", self.requested)));
        }

        let Crop { left, right, top, bottom } = self.crop;
        let horizontal = left.checked_add(right).and_then(|margins| margins.checked_add(self.requested.0));
        let vertical = top.checked_add(bottom).and_then(|margins| margins.checked_add(self.requested.1));

        if horizontal != Some(width) || vertical != Some(height) {
            return Err(Error::bad_dimensions(format!(
                "crop margins {:?} do not reduce {} to {}", self.crop, self.hardware, self.requested
            )));
        }

        if left % unit.0 != 0 || right % unit.0 != 0 || top % unit.1 != 0 || bottom % unit.1 != 0 {
            return Err(Error::bad_dimensions(format!(
                "crop margins {:?} are not aligned to {}", self.crop, unit
            )));
        }

        Ok(())
    }

    /// The rectangle of the native grid that is decoded into the output.
    pub fn window(&self) -> Window {
        Window {
            position: Vec2(self.crop.left, self.crop.top),
            size: self.requested,
        }
    }
}

impl Window {

    /// The first pixel column and row after the window.
    pub fn end(&self) -> Vec2<usize> {
        self.position + self.size
    }

    /// Whether the block at this pixel position lies inside the window.
    pub fn contains(&self, pixel: Vec2<usize>) -> bool {
        let end = self.end();
        pixel.0 >= self.position.0 && pixel.0 < end.0
            && pixel.1 >= self.position.1 && pixel.1 < end.1
    }
}


#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn centered_jpeg_crop_uses_whole_units(){
        let geometry = FrameGeometry::centered(
            NativeEncoding::Jpeg411, Vec2(352, 288), Vec2(320, 240)
        ).unwrap();

        // 2 units horizontally, 3 units vertically
        assert_eq!(geometry.crop, Crop { left: 16, right: 16, top: 16, bottom: 32 });
        assert_eq!(geometry.window().position, Vec2(16, 16));
        assert_eq!(geometry.window().end(), Vec2(336, 256));

        let geometry = FrameGeometry::centered(
            NativeEncoding::Jpeg422Tagged, Vec2(352, 288), Vec2(320, 240)
        ).unwrap();

        assert_eq!(geometry.crop, Crop { left: 16, right: 16, top: 24, bottom: 24 });
    }

    #[test]
    fn centered_pixel_crop_keeps_blocks_even(){
        let geometry = FrameGeometry::centered(
            NativeEncoding::BayerGbrg, Vec2(352, 288), Vec2(346, 288)
        ).unwrap();

        assert_eq!(geometry.crop, Crop { left: 2, right: 4, top: 0, bottom: 0 });
    }

    #[test]
    fn rejects_bad_grids(){
        assert!(matches!(
            FrameGeometry::uncropped(Vec2(352, 280)).validate(NativeEncoding::Jpeg411),
            Err(Error::BadDimensions(_))
        ));

        assert!(FrameGeometry::uncropped(Vec2(352, 280)).validate(NativeEncoding::Jpeg422Bare).is_ok());
        assert!(FrameGeometry::uncropped(Vec2(351, 280)).validate(NativeEncoding::Yuyv).is_err());
        assert!(FrameGeometry::uncropped(Vec2(0, 0)).validate(NativeEncoding::Yuyv).is_err());

        assert!(FrameGeometry::centered(NativeEncoding::Jpeg411, Vec2(352, 288), Vec2(336, 280)).is_err());
        assert!(FrameGeometry::centered(NativeEncoding::Yuyv, Vec2(320, 240), Vec2(352, 288)).is_err());
    }

    #[test]
    fn rejects_margins_that_do_not_add_up(){
        let geometry = FrameGeometry {
            hardware: Vec2(64, 64), requested: Vec2(32, 32),
            crop: Crop { left: 16, right: 0, top: 16, bottom: 16 },
        };

        assert!(geometry.validate(NativeEncoding::Jpeg411).is_err());

        let misaligned = FrameGeometry {
            hardware: Vec2(64, 64), requested: Vec2(32, 32),
            crop: Crop { left: 8, right: 24, top: 16, bottom: 16 },
        };

        assert!(misaligned.validate(NativeEncoding::Jpeg411).is_err());
        assert!(misaligned.validate(NativeEncoding::BayerGbrg).is_ok());
    }
}
