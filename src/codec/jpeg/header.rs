
//! Restores a complete jpeg file from the stripped scan data of a camera,
//! so that the frame can be stored or handed to any jpeg decoder.

use std::convert::TryFrom;
use crate::error::{Error, UnitResult};
use crate::io::put_u16_be;
use crate::math::Vec2;
use crate::meta::{NativeEncoding, Sampling};
use super::tables::*;


/// Marks the end of a jpeg file.
const END_OF_IMAGE: [u8; 2] = [0xFF, 0xD9];


/// Write a jpeg file that contains the scan data of the frame.
/// The frame is the complete native input, including any vendor header.
/// The quantization pair must be the one the camera compressed the frame with.
/// Replaces the contents of `output`.
pub fn synthesize_jpeg(
    encoding: NativeEncoding, frame: &[u8], hardware: Vec2<usize>,
    quantization: &[[u8; 64]; 2], output: &mut Vec<u8>
) -> UnitResult
{
    let sampling = encoding.sampling().ok_or(Error::UnsupportedCombination {
        encoding, format: crate::meta::OutputFormat::Jpeg
    })?;

    output.clear();

    if encoding == NativeEncoding::Jpeg422Conexant {
        // the camera sends its own frame and scan headers
        output.extend_from_slice(&JPEG_HEADER[.. CONEXANT_HEADER_LEN]);
        write_quantization(output, quantization);
        output.extend_from_slice(frame);
        return Ok(());
    }

    output.extend_from_slice(&JPEG_HEADER);
    write_quantization(output, quantization);

    let dimension = |value: usize| u16::try_from(value).map_err(|_| Error::bad_dimensions(format!(
        "jpeg files cannot be {} pixels large", value
    )));

    put_u16_be(output, HEIGHT_OFFSET, dimension(hardware.height())?)?;
    put_u16_be(output, WIDTH_OFFSET, dimension(hardware.width())?)?;
    output[SAMPLING_OFFSET] = sampling.frame_header_byte();

    let scan = frame.get(encoding.vendor_header_len() ..)
        .ok_or_else(|| Error::truncated("frame is shorter than its vendor header"))?;

    let scan = &scan[.. scan.len().min(hardware.area())];

    match sampling {
        Sampling::FourOneOne => copy_unescaped_scan(scan, output),
        Sampling::FourTwoTwo => copy_terminated_scan(scan, output),
    }
}

fn write_quantization(output: &mut [u8], quantization: &[[u8; 64]; 2]) {
    output[LUMA_QUANTIZATION_ID_OFFSET] = 0;
    output[LUMA_QUANTIZATION_OFFSET .. LUMA_QUANTIZATION_OFFSET + 64].copy_from_slice(&quantization[0]);
    output[CHROMA_QUANTIZATION_ID_OFFSET] = 1;
    output[CHROMA_QUANTIZATION_OFFSET .. CHROMA_QUANTIZATION_OFFSET + 64].copy_from_slice(&quantization[1]);
}

/// The 4:1:1 bridges do not stuff their `0xFF` bytes and pad the frame with zeroes.
/// The copy ends after the first byte that starts four zero bytes.
fn copy_unescaped_scan(scan: &[u8], output: &mut Vec<u8>) -> UnitResult {
    for (index, &byte) in scan.iter().enumerate() {
        output.push(byte);

        let padding_starts = (index .. index + 4)
            .all(|position| scan.get(position).map_or(true, |&byte| byte == 0));

        if padding_starts { break; }
        if byte == 0xFF { output.push(0); }
    }

    output.extend_from_slice(&END_OF_IMAGE);
    Ok(())
}

/// The 4:2:2 bridges send stuffed scan data which already ends with a marker.
fn copy_terminated_scan(scan: &[u8], output: &mut Vec<u8>) -> UnitResult {
    let end = scan.windows(2).position(|pair| pair == END_OF_IMAGE)
        .ok_or_else(|| Error::truncated("scan data has no end of image marker"))?;

    output.extend_from_slice(&scan[.. end + 2]);
    Ok(())
}
