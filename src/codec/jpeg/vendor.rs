
//! The headers that the camera bridges put in front of their jpeg scan data.

use crate::error::{Error, Result, UnitResult};
use crate::io::{byte_at, u16_be_at};
use crate::math::Vec2;
use crate::meta::NativeEncoding;


/// Offset of the restart interval in the Conexant header.
const CONEXANT_RESTART_INTERVAL_OFFSET: usize = 5;
const CONEXANT_HEIGHT_OFFSET: usize = 11;
const CONEXANT_WIDTH_OFFSET: usize = 13;

const TAGGED_WIDTH_OFFSET: usize = 10;
const TAGGED_HEIGHT_OFFSET: usize = 12;


/// Where the entropy coded data of a frame starts, and how it is structured.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScanData<'b> {

    /// The entropy coded bytes.
    pub bytes: &'b [u8],

    /// The number of coding units between restart markers, or zero.
    pub restart_interval: usize,
}


/// Inspect the vendor header of a jpeg frame and locate the scan data behind it.
/// Fails if the header announces other dimensions than the configured hardware size.
pub fn locate_scan(encoding: NativeEncoding, frame: &[u8], hardware: Vec2<usize>) -> Result<ScanData<'_>> {
    check_dimensions(encoding, frame, hardware)?;

    let restart_interval = match encoding {
        NativeEncoding::Jpeg422Conexant => usize::from(byte_at(frame, CONEXANT_RESTART_INTERVAL_OFFSET)?),
        _ => 0,
    };

    let bytes = frame.get(encoding.vendor_header_len() ..)
        .ok_or_else(|| Error::truncated(format!("{} frame is shorter than its header", encoding)))?;

    Ok(ScanData { bytes, restart_interval })
}

/// Compare the dimensions announced by the vendor header with the configured hardware size.
/// Some tagged cameras misreport their height, so only the width of those is checked.
pub fn check_dimensions(encoding: NativeEncoding, frame: &[u8], hardware: Vec2<usize>) -> UnitResult {
    match encoding {
        NativeEncoding::Jpeg422Conexant => {
            let height = usize::from(u16_be_at(frame, CONEXANT_HEIGHT_OFFSET)?);
            let width = usize::from(u16_be_at(frame, CONEXANT_WIDTH_OFFSET)?);

            if width != hardware.width() {
                return Err(Error::HeaderWidthMismatch { expected: hardware.width(), found: width });
            }

            if height != hardware.height() {
                return Err(Error::bad_dimensions(format!(
                    "header announces height {} instead of {}", height, hardware.height()
                )));
            }
        },

        NativeEncoding::Jpeg422Tagged => {
            let width = usize::from(u16_be_at(frame, TAGGED_WIDTH_OFFSET)?);

            if width != hardware.width() {
                return Err(Error::HeaderWidthMismatch { expected: hardware.width(), found: width });
            }

            log::trace!(
                "tagged frame announces height {:?}, configured height is {}",
                u16_be_at(frame, TAGGED_HEIGHT_OFFSET).ok(), hardware.height()
            );
        },

        _ => {}
    }

    Ok(())
}
