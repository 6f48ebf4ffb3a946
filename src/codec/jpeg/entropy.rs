
//! Decodes the huffman coded coefficients of one coding unit after another.

use smallvec::SmallVec;
use crate::error::{Error, Result, UnitResult};
use crate::meta::Sampling;
use super::bits::BitReader;
use super::huffman::HuffmanTable;


/// The first restart marker, `RST0`.
pub const FIRST_RESTART_MARKER: u8 = 0xD0;

/// A unit has at most four luma blocks and two chroma blocks.
pub const MAX_BLOCKS_PER_UNIT: usize = 6;

/// The coefficients of all blocks of one coding unit.
/// Luma blocks come first, followed by the first and the second chroma block.
pub type UnitBlocks = SmallVec<[CoefficientBlock; MAX_BLOCKS_PER_UNIT]>;


/// Quantized coefficients of one 8x8 block, in zigzag order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CoefficientBlock {

    /// The dc coefficient is at index zero.
    pub coefficients: [i32; 64],

    /// The number of leading coefficients that may be non zero.
    /// A value of one means only the dc coefficient is set.
    pub extent: usize,
}

/// The four huffman tables of a baseline scan with three components.
#[derive(Clone, Debug)]
pub struct HuffmanTables {

    /// Decodes the dc differences of the luma component.
    pub luma_dc: HuffmanTable,

    /// Decodes the ac coefficients of the luma component.
    pub luma_ac: HuffmanTable,

    /// Decodes the dc differences of both chroma components.
    pub chroma_dc: HuffmanTable,

    /// Decodes the ac coefficients of both chroma components.
    pub chroma_ac: HuffmanTable,
}

/// Reads the coding units of a scan in order,
/// keeping track of the dc predictions and restart intervals.
#[derive(Debug)]
pub struct EntropyDecoder<'b, 't> {
    reader: BitReader<'b>,
    tables: &'t HuffmanTables,
    sampling: Sampling,

    /// Luma, first chroma, second chroma.
    predictions: [i32; 3],

    /// Zero if the scan has no restart markers.
    restart_interval: usize,

    units_until_restart: usize,
    expected_marker: u8,
}


impl Default for CoefficientBlock {
    fn default() -> Self {
        CoefficientBlock { coefficients: [0; 64], extent: 1 }
    }
}

impl<'b, 't> EntropyDecoder<'b, 't> {

    /// Start decoding at the first byte of the scan.
    /// A restart interval of zero means the scan contains no restart markers.
    pub fn new(
        scan: &'b [u8], escapes: bool, tables: &'t HuffmanTables,
        sampling: Sampling, restart_interval: usize
    ) -> Self {
        EntropyDecoder {
            reader: BitReader::new(scan, escapes),
            tables, sampling,
            predictions: [0; 3],
            restart_interval,
            units_until_restart: restart_interval,
            expected_marker: FIRST_RESTART_MARKER,
        }
    }

    /// Decode all blocks of the next coding unit, replacing the contents of `blocks`.
    /// Fails if the unit needed bits after the end of the scan.
    pub fn decode_unit(&mut self, blocks: &mut UnitBlocks) -> UnitResult {
        if self.restart_interval > 0 {
            if self.units_until_restart == 0 {
                self.restart()?;
            }

            self.units_until_restart -= 1;
        }

        blocks.clear();

        for _ in 0 .. self.sampling.luma_blocks() {
            blocks.push(self.decode_block(0)?);
        }

        blocks.push(self.decode_block(1)?);
        blocks.push(self.decode_block(2)?);

        self.reader.check_overrun()
    }

    /// Expects the next restart marker and resets the predictions.
    fn restart(&mut self) -> UnitResult {
        let found = self.reader.read_marker();

        if found != Some(self.expected_marker) {
            return Err(Error::WrongRestartMarker { expected: self.expected_marker, found });
        }

        self.units_until_restart = self.restart_interval;
        self.expected_marker = (self.expected_marker + 1) & !0x08;
        self.predictions = [0; 3];
        Ok(())
    }

    fn decode_block(&mut self, component: usize) -> Result<CoefficientBlock> {
        let (dc_table, ac_table) = if component == 0 { (&self.tables.luma_dc, &self.tables.luma_ac) }
                                   else { (&self.tables.chroma_dc, &self.tables.chroma_ac) };

        let mut block = CoefficientBlock::default();

        let (_, difference) = dc_table.decode(&mut self.reader)?;
        let prediction = &mut self.predictions[component];
        *prediction = prediction.wrapping_add(difference);
        block.coefficients[0] = *prediction;

        let mut remaining = 63_usize;

        while remaining > 0 {
            let (run, value) = ac_table.decode(&mut self.reader)?;
            if run == 0 && value == 0 { break; }

            let skipped = usize::from(run) + 1;
            if skipped > remaining { return Err(Error::BadHuffmanCode); }

            let index = 64 - remaining + usize::from(run);
            block.coefficients[index] = value;
            remaining -= skipped;
        }

        block.extent = 64 - remaining;
        Ok(block)
    }
}


#[cfg(test)]
mod test {
    use super::*;
    use crate::codec::jpeg::tables::{LUMA_DC, LUMA_AC, CHROMA_DC, CHROMA_AC};
    use crate::codec::jpeg::bits::pack_bits as pack;

    fn tables() -> HuffmanTables {
        HuffmanTables {
            luma_dc: HuffmanTable::new(&LUMA_DC, 9),
            luma_ac: HuffmanTable::new(&LUMA_AC, 9),
            chroma_dc: HuffmanTable::new(&CHROMA_DC, 9),
            chroma_ac: HuffmanTable::new(&CHROMA_AC, 9),
        }
    }

    // luma dc: zero is `00`, size 1 is `010`. luma ac: end of block is `1010`, `0/1` is `00`.
    // chroma dc: zero is `00`. chroma ac: end of block is `00`.
    const FLAT_422_UNIT: &str = "00 1010  00 1010  00 00  00 00";

    #[test]
    fn predicts_dc_across_units(){
        let tables = tables();
        let scan = pack("010 1 1010  010 1 1010  00 00  00 00   010 0 1010  00 1010  00 00  00 00");
        let mut decoder = EntropyDecoder::new(&scan, false, &tables, Sampling::FourTwoTwo, 0);
        let mut blocks = UnitBlocks::new();

        decoder.decode_unit(&mut blocks).unwrap();
        assert_eq!(blocks.len(), 4);
        assert_eq!(blocks[0].coefficients[0], 1);
        assert_eq!(blocks[1].coefficients[0], 2);
        assert_eq!(blocks[2].coefficients[0], 0);
        assert!(blocks.iter().all(|block| block.extent == 1));

        decoder.decode_unit(&mut blocks).unwrap();
        assert_eq!(blocks[0].coefficients[0], 1);
        assert_eq!(blocks[1].coefficients[0], 1);
    }

    #[test]
    fn places_ac_coefficients_in_zigzag_order(){
        let tables = tables();

        // `0/1` value 1, then `15/0` zero run, then `0/1` value -1, end of block
        let scan = pack("00 00 1 11111111001 00 0 1010  00 1010  00 00  00 00");
        let mut decoder = EntropyDecoder::new(&scan, false, &tables, Sampling::FourTwoTwo, 0);
        let mut blocks = UnitBlocks::new();

        decoder.decode_unit(&mut blocks).unwrap();
        assert_eq!(blocks[0].coefficients[1], 1);
        assert_eq!(blocks[0].coefficients[18], -1);
        assert_eq!(blocks[0].extent, 19);
        assert_eq!(blocks[0].coefficients.iter().filter(|&&value| value != 0).count(), 2);
    }

    #[test]
    fn runs_must_stay_inside_the_block(){
        let tables = tables();

        // five zero runs of sixteen leave the block
        let scan = pack("00  11111111001 11111111001 11111111001 11111111001 11111111001");
        let mut decoder = EntropyDecoder::new(&scan, false, &tables, Sampling::FourOneOne, 0);
        let mut blocks = UnitBlocks::new();

        assert!(matches!(decoder.decode_unit(&mut blocks), Err(Error::BadHuffmanCode)));
    }

    #[test]
    fn checks_restart_markers(){
        let tables = tables();
        let mut scan = pack(FLAT_422_UNIT);
        scan.extend_from_slice(&[0xFF, 0xD0]);
        scan.extend(pack(FLAT_422_UNIT));
        scan.extend_from_slice(&[0xFF, 0xD3]);
        scan.extend(pack(FLAT_422_UNIT));

        let mut decoder = EntropyDecoder::new(&scan, true, &tables, Sampling::FourTwoTwo, 1);
        let mut blocks = UnitBlocks::new();

        decoder.decode_unit(&mut blocks).unwrap();
        decoder.decode_unit(&mut blocks).unwrap();

        assert!(matches!(
            decoder.decode_unit(&mut blocks),
            Err(Error::WrongRestartMarker { expected: 0xD1, found: Some(0xD3) })
        ));
    }

    #[test]
    fn restart_resets_predictions(){
        let tables = tables();
        let mut scan = pack("010 1 1010  00 1010  00 00  00 00");
        scan.extend_from_slice(&[0xFF, 0xD0]);
        scan.extend(pack(FLAT_422_UNIT));

        let mut decoder = EntropyDecoder::new(&scan, true, &tables, Sampling::FourTwoTwo, 1);
        let mut blocks = UnitBlocks::new();

        decoder.decode_unit(&mut blocks).unwrap();
        assert_eq!(blocks[1].coefficients[0], 1);

        decoder.decode_unit(&mut blocks).unwrap();
        assert_eq!(blocks[0].coefficients[0], 0);
    }

    #[test]
    fn reports_truncation(){
        let tables = tables();
        let scan = pack("00 1010  00 1010");
        let mut decoder = EntropyDecoder::new(&scan[..1], false, &tables, Sampling::FourOneOne, 0);
        let mut blocks = UnitBlocks::new();

        assert!(matches!(decoder.decode_unit(&mut blocks), Err(Error::Truncated(_))));
    }
}
