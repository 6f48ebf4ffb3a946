
//! Decodes the baseline jpeg scans of the 4:1:1 and 4:2:2 bridges.
//! The bridges strip all headers, so the tables are fixed
//! and the scan data is all that arrives.

pub mod tables;
pub mod bits;
pub mod huffman;
pub mod entropy;
pub mod idct;
pub mod header;
pub mod vendor;

use std::sync::atomic::AtomicBool;
use crate::error::Result;
use crate::math::Vec2;
use crate::meta::{FrameGeometry, NativeEncoding, Sampling};
use super::{Bytes, SampleDecoder, Samples, YCbCrPlanes, check_abort};
use self::entropy::{EntropyDecoder, HuffmanTables, UnitBlocks};
use self::huffman::HuffmanTable;
use self::idct::{DequantizationTable, inverse_dct, LUMA_OFFSET, CHROMA_OFFSET};


/// The tables shared by all jpeg frames.
/// Built once when the decoder context is created, and never modified.
#[derive(Clone, Debug)]
pub struct JpegTables {

    /// The four huffman tables of the header template.
    pub huffman: HuffmanTables,

    /// One entry per step of the quality ladder.
    qualities: Vec<QualityLevel>,
}

/// The quantization tables of one quality setting.
#[derive(Clone, Debug)]
pub struct QualityLevel {

    /// The luma and chroma tables in zigzag order, as written into jpeg files.
    pub quantization: [[u8; 64]; 2],

    /// Prepared for the inverse dct of luma blocks.
    pub luma: DequantizationTable,

    /// Prepared for the inverse dct of chroma blocks.
    pub chroma: DequantizationTable,
}

/// Decodes the scan of one jpeg frame into planes.
#[derive(Clone, Copy, Debug)]
pub struct JpegDecoder<'t> {
    encoding: NativeEncoding,
    sampling: Sampling,
    huffman: &'t HuffmanTables,
    quality: &'t QualityLevel,
}


impl JpegTables {

    /// Build the huffman lookup tables with the specified width,
    /// and prepare every step of the quality ladder.
    pub fn new(lookup_bits: u32) -> Self {
        let huffman = HuffmanTables {
            luma_dc: HuffmanTable::new(&tables::LUMA_DC, lookup_bits),
            luma_ac: HuffmanTable::new(&tables::LUMA_AC, lookup_bits),
            chroma_dc: HuffmanTable::new(&tables::CHROMA_DC, lookup_bits),
            chroma_ac: HuffmanTable::new(&tables::CHROMA_AC, lookup_bits),
        };

        let qualities = (0 .. tables::QUALITY_LADDER.len())
            .map(|index| QualityLevel::new(tables::quantization_pair(index)))
            .collect();

        JpegTables { huffman, qualities }
    }

    /// The quantization tables of a step of the quality ladder.
    /// Indices past the end select the highest quality.
    pub fn quality(&self, index: usize) -> &QualityLevel {
        &self.qualities[index.min(self.qualities.len() - 1)]
    }
}

impl QualityLevel {

    /// Prepare the dequantization tables.
    pub fn new(quantization: [[u8; 64]; 2]) -> Self {
        QualityLevel {
            luma: DequantizationTable::new(&quantization[0]),
            chroma: DequantizationTable::new(&quantization[1]),
            quantization,
        }
    }
}

impl<'t> JpegDecoder<'t> {

    /// Decode frames of a jpeg encoding, which were compressed with the specified quality.
    pub fn new(encoding: NativeEncoding, sampling: Sampling, tables: &'t JpegTables, quality_index: usize) -> Self {
        JpegDecoder {
            encoding, sampling,
            huffman: &tables.huffman,
            quality: tables.quality(quality_index),
        }
    }

    /// Transform the blocks of one coding unit and store the samples in the planes.
    fn reconstruct_unit(&self, blocks: &UnitBlocks, position: Vec2<usize>, planes: &mut YCbCrPlanes) {
        let luma_blocks = self.sampling.luma_blocks();
        let luma_width = planes.size.width();

        for (index, block) in blocks[.. luma_blocks].iter().enumerate() {
            let samples = inverse_dct(&block.coefficients, &self.quality.luma, LUMA_OFFSET, block.extent);
            let origin = position + Vec2((index % 2) * 8, (index / 2) * 8);

            for (row, samples) in samples.chunks_exact(8).enumerate() {
                let start = (origin.y() + row) * luma_width + origin.x();
                planes.luma[start .. start + 8].copy_from_slice(samples);
            }
        }

        // 4:2:2 units only use the upper half of their chroma blocks
        let chroma_rows = self.sampling.unit_size().height() / 2;
        let chroma_width = planes.chroma_width();
        let chroma_origin = Vec2(position.x() / 2, position.y() / 2);
        let chroma_planes = [&mut planes.first_chroma, &mut planes.second_chroma];

        for (plane, block) in chroma_planes.into_iter().zip(&blocks[luma_blocks ..]) {
            let samples = inverse_dct(&block.coefficients, &self.quality.chroma, CHROMA_OFFSET, block.extent);

            for (row, samples) in samples.chunks_exact(8).take(chroma_rows).enumerate() {
                let start = (chroma_origin.y() + row) * chroma_width + chroma_origin.x();
                plane[start .. start + 8].copy_from_slice(samples);
            }
        }
    }
}

impl SampleDecoder for JpegDecoder<'_> {

    /// Every coding unit is entropy decoded, as the dc predictions depend on all previous units,
    /// but only units inside the window are transformed.
    fn decode<'f>(&self, input: Bytes<'f>, geometry: &FrameGeometry, abort: &AtomicBool) -> Result<Samples<'f>> {
        geometry.validate(self.encoding)?;

        let scan = vendor::locate_scan(self.encoding, input, geometry.hardware)?;

        // the 4:1:1 bridges neither stuff bytes nor send restart markers
        let (escapes, restart_interval) = match self.sampling {
            Sampling::FourOneOne => (false, 0),
            Sampling::FourTwoTwo => (true, scan.restart_interval),
        };

        let mut entropy = EntropyDecoder::new(scan.bytes, escapes, self.huffman, self.sampling, restart_interval);
        let mut planes = YCbCrPlanes::new(geometry.hardware);
        let mut blocks = UnitBlocks::new();

        let unit_size = self.sampling.unit_size();
        let window = geometry.window();

        for unit_y in 0 .. geometry.hardware.height() / unit_size.height() {
            check_abort(abort)?;

            for unit_x in 0 .. geometry.hardware.width() / unit_size.width() {
                entropy.decode_unit(&mut blocks)?;

                let position = Vec2(unit_x * unit_size.width(), unit_y * unit_size.height());
                if window.contains(position) {
                    self.reconstruct_unit(&blocks, position, &mut planes);
                }
            }
        }

        Ok(Samples::YCbCr(planes))
    }
}
