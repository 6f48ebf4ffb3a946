
//! Constant tables of the jpeg encodings:
//! the header template that camera bridges strip from their frames,
//! the canonical huffman tables, the quantization tables,
//! and the coefficient orders of the inverse dct.


/// Length of the jpeg header template.
pub const HEADER_LEN: usize = 589;

/// Conexant frames contain their own frame and scan headers,
/// so only this prefix of the template is used for them.
pub const CONEXANT_HEADER_LEN: usize = HEADER_LEN - 33;

/// The byte before the first quantization table, holding its table id.
pub const LUMA_QUANTIZATION_ID_OFFSET: usize = 6;

/// Start of the 64 byte luma quantization table.
pub const LUMA_QUANTIZATION_OFFSET: usize = 7;

/// The byte before the second quantization table, holding its table id.
pub const CHROMA_QUANTIZATION_ID_OFFSET: usize = 71;

/// Start of the 64 byte chroma quantization table.
pub const CHROMA_QUANTIZATION_OFFSET: usize = 72;

/// Big endian frame height in the frame header.
pub const HEIGHT_OFFSET: usize = 561;

/// Big endian frame width in the frame header.
pub const WIDTH_OFFSET: usize = 563;

/// The sampling factors of the first component in the frame header.
pub const SAMPLING_OFFSET: usize = 567;

/// A complete baseline jpeg header for 640x480 pixels with 4:2:2 sampling,
/// as captured from a camera that does send headers.
/// Contains two quantization tables, all four huffman tables, the frame header and the scan header.
pub const JPEG_HEADER: [u8; HEADER_LEN] = [
    0xff, 0xd8, 0xff, 0xdb, 0x00, 0x84, 0x00, 0x06, 0x04, 0x05, 0x06, 0x05, 0x04, 0x06, 0x06, 0x05,
    0x06, 0x07, 0x07, 0x06, 0x08, 0x0a, 0x10, 0x0a, 0x0a, 0x09, 0x09, 0x0a, 0x14, 0x0e, 0x0f, 0x0c,
    0x10, 0x17, 0x14, 0x18, 0x18, 0x17, 0x14, 0x16, 0x16, 0x1a, 0x1d, 0x25, 0x1f, 0x1a, 0x1b, 0x23,
    0x1c, 0x16, 0x16, 0x20, 0x2c, 0x20, 0x23, 0x26, 0x27, 0x29, 0x2a, 0x29, 0x19, 0x1f, 0x2d, 0x30,
    0x2d, 0x28, 0x30, 0x25, 0x28, 0x29, 0x28, 0x01, 0x07, 0x07, 0x07, 0x0a, 0x08, 0x0a, 0x13, 0x0a,
    0x0a, 0x13, 0x28, 0x1a, 0x16, 0x1a, 0x28, 0x28, 0x28, 0x28, 0x28, 0x28, 0x28, 0x28, 0x28, 0x28,
    0x28, 0x28, 0x28, 0x28, 0x28, 0x28, 0x28, 0x28, 0x28, 0x28, 0x28, 0x28, 0x28, 0x28, 0x28, 0x28,
    0x28, 0x28, 0x28, 0x28, 0x28, 0x28, 0x28, 0x28, 0x28, 0x28, 0x28, 0x28, 0x28, 0x28, 0x28, 0x28,
    0x28, 0x28, 0x28, 0x28, 0x28, 0x28, 0x28, 0x28, 0xff, 0xc4, 0x01, 0xa2, 0x00, 0x00, 0x01, 0x05,
    0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, 0x02,
    0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b, 0x01, 0x00, 0x03, 0x01, 0x01, 0x01, 0x01,
    0x01, 0x01, 0x01, 0x01, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, 0x02, 0x03, 0x04, 0x05,
    0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b, 0x10, 0x00, 0x02, 0x01, 0x03, 0x03, 0x02, 0x04, 0x03, 0x05,
    0x05, 0x04, 0x04, 0x00, 0x00, 0x01, 0x7d, 0x01, 0x02, 0x03, 0x00, 0x04, 0x11, 0x05, 0x12, 0x21,
    0x31, 0x41, 0x06, 0x13, 0x51, 0x61, 0x07, 0x22, 0x71, 0x14, 0x32, 0x81, 0x91, 0xa1, 0x08, 0x23,
    0x42, 0xb1, 0xc1, 0x15, 0x52, 0xd1, 0xf0, 0x24, 0x33, 0x62, 0x72, 0x82, 0x09, 0x0a, 0x16, 0x17,
    0x18, 0x19, 0x1a, 0x25, 0x26, 0x27, 0x28, 0x29, 0x2a, 0x34, 0x35, 0x36, 0x37, 0x38, 0x39, 0x3a,
    0x43, 0x44, 0x45, 0x46, 0x47, 0x48, 0x49, 0x4a, 0x53, 0x54, 0x55, 0x56, 0x57, 0x58, 0x59, 0x5a,
    0x63, 0x64, 0x65, 0x66, 0x67, 0x68, 0x69, 0x6a, 0x73, 0x74, 0x75, 0x76, 0x77, 0x78, 0x79, 0x7a,
    0x83, 0x84, 0x85, 0x86, 0x87, 0x88, 0x89, 0x8a, 0x92, 0x93, 0x94, 0x95, 0x96, 0x97, 0x98, 0x99,
    0x9a, 0xa2, 0xa3, 0xa4, 0xa5, 0xa6, 0xa7, 0xa8, 0xa9, 0xaa, 0xb2, 0xb3, 0xb4, 0xb5, 0xb6, 0xb7,
    0xb8, 0xb9, 0xba, 0xc2, 0xc3, 0xc4, 0xc5, 0xc6, 0xc7, 0xc8, 0xc9, 0xca, 0xd2, 0xd3, 0xd4, 0xd5,
    0xd6, 0xd7, 0xd8, 0xd9, 0xda, 0xe1, 0xe2, 0xe3, 0xe4, 0xe5, 0xe6, 0xe7, 0xe8, 0xe9, 0xea, 0xf1,
    0xf2, 0xf3, 0xf4, 0xf5, 0xf6, 0xf7, 0xf8, 0xf9, 0xfa, 0x11, 0x00, 0x02, 0x01, 0x02, 0x04, 0x04,
    0x03, 0x04, 0x07, 0x05, 0x04, 0x04, 0x00, 0x01, 0x02, 0x77, 0x00, 0x01, 0x02, 0x03, 0x11, 0x04,
    0x05, 0x21, 0x31, 0x06, 0x12, 0x41, 0x51, 0x07, 0x61, 0x71, 0x13, 0x22, 0x32, 0x81, 0x08, 0x14,
    0x42, 0x91, 0xa1, 0xb1, 0xc1, 0x09, 0x23, 0x33, 0x52, 0xf0, 0x15, 0x62, 0x72, 0xd1, 0x0a, 0x16,
    0x24, 0x34, 0xe1, 0x25, 0xf1, 0x17, 0x18, 0x19, 0x1a, 0x26, 0x27, 0x28, 0x29, 0x2a, 0x35, 0x36,
    0x37, 0x38, 0x39, 0x3a, 0x43, 0x44, 0x45, 0x46, 0x47, 0x48, 0x49, 0x4a, 0x53, 0x54, 0x55, 0x56,
    0x57, 0x58, 0x59, 0x5a, 0x63, 0x64, 0x65, 0x66, 0x67, 0x68, 0x69, 0x6a, 0x73, 0x74, 0x75, 0x76,
    0x77, 0x78, 0x79, 0x7a, 0x82, 0x83, 0x84, 0x85, 0x86, 0x87, 0x88, 0x89, 0x8a, 0x92, 0x93, 0x94,
    0x95, 0x96, 0x97, 0x98, 0x99, 0x9a, 0xa2, 0xa3, 0xa4, 0xa5, 0xa6, 0xa7, 0xa8, 0xa9, 0xaa, 0xb2,
    0xb3, 0xb4, 0xb5, 0xb6, 0xb7, 0xb8, 0xb9, 0xba, 0xc2, 0xc3, 0xc4, 0xc5, 0xc6, 0xc7, 0xc8, 0xc9,
    0xca, 0xd2, 0xd3, 0xd4, 0xd5, 0xd6, 0xd7, 0xd8, 0xd9, 0xda, 0xe2, 0xe3, 0xe4, 0xe5, 0xe6, 0xe7,
    0xe8, 0xe9, 0xea, 0xf2, 0xf3, 0xf4, 0xf5, 0xf6, 0xf7, 0xf8, 0xf9, 0xfa, 0xff, 0xc0, 0x00, 0x11,
    0x08, 0x01, 0xe0, 0x02, 0x80, 0x03, 0x01, 0x21, 0x00, 0x02, 0x11, 0x01, 0x03, 0x11, 0x01, 0xff,
    0xda, 0x00, 0x0c, 0x03, 0x01, 0x00, 0x02, 0x11, 0x03, 0x11, 0x00, 0x3f, 0x00,
];


/// A huffman table in the form it is stored in jpeg files.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CanonicalTable<'t> {

    /// The number of codes of each length, from 1 to 16 bits.
    pub counts: [u8; 16],

    /// The symbols in code order. Each symbol holds a run of zeroes in the high nibble
    /// and the bit size of the following value in the low nibble.
    pub symbols: &'t [u8],
}

/// Codes the size of the luma dc differences.
pub const LUMA_DC: CanonicalTable<'static> = CanonicalTable {
    counts: [0, 1, 5, 1, 1, 1, 1, 1, 1, 0, 0, 0, 0, 0, 0, 0],
    symbols: &[
        0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b,
    ],
};

/// Codes the size of the chroma dc differences.
pub const CHROMA_DC: CanonicalTable<'static> = CanonicalTable {
    counts: [0, 3, 1, 1, 1, 1, 1, 1, 1, 1, 1, 0, 0, 0, 0, 0],
    symbols: &[
        0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b,
    ],
};

/// Codes run and size of the luma ac coefficients.
pub const LUMA_AC: CanonicalTable<'static> = CanonicalTable {
    counts: [0, 2, 1, 3, 3, 2, 4, 3, 5, 5, 4, 4, 0, 0, 1, 125],
    symbols: &[
        0x01, 0x02, 0x03, 0x00, 0x04, 0x11, 0x05, 0x12, 0x21, 0x31, 0x41, 0x06, 0x13, 0x51, 0x61, 0x07,
        0x22, 0x71, 0x14, 0x32, 0x81, 0x91, 0xa1, 0x08, 0x23, 0x42, 0xb1, 0xc1, 0x15, 0x52, 0xd1, 0xf0,
        0x24, 0x33, 0x62, 0x72, 0x82, 0x09, 0x0a, 0x16, 0x17, 0x18, 0x19, 0x1a, 0x25, 0x26, 0x27, 0x28,
        0x29, 0x2a, 0x34, 0x35, 0x36, 0x37, 0x38, 0x39, 0x3a, 0x43, 0x44, 0x45, 0x46, 0x47, 0x48, 0x49,
        0x4a, 0x53, 0x54, 0x55, 0x56, 0x57, 0x58, 0x59, 0x5a, 0x63, 0x64, 0x65, 0x66, 0x67, 0x68, 0x69,
        0x6a, 0x73, 0x74, 0x75, 0x76, 0x77, 0x78, 0x79, 0x7a, 0x83, 0x84, 0x85, 0x86, 0x87, 0x88, 0x89,
        0x8a, 0x92, 0x93, 0x94, 0x95, 0x96, 0x97, 0x98, 0x99, 0x9a, 0xa2, 0xa3, 0xa4, 0xa5, 0xa6, 0xa7,
        0xa8, 0xa9, 0xaa, 0xb2, 0xb3, 0xb4, 0xb5, 0xb6, 0xb7, 0xb8, 0xb9, 0xba, 0xc2, 0xc3, 0xc4, 0xc5,
        0xc6, 0xc7, 0xc8, 0xc9, 0xca, 0xd2, 0xd3, 0xd4, 0xd5, 0xd6, 0xd7, 0xd8, 0xd9, 0xda, 0xe1, 0xe2,
        0xe3, 0xe4, 0xe5, 0xe6, 0xe7, 0xe8, 0xe9, 0xea, 0xf1, 0xf2, 0xf3, 0xf4, 0xf5, 0xf6, 0xf7, 0xf8,
        0xf9, 0xfa,
    ],
};

/// Codes run and size of the chroma ac coefficients.
pub const CHROMA_AC: CanonicalTable<'static> = CanonicalTable {
    counts: [0, 2, 1, 2, 4, 4, 3, 4, 7, 5, 4, 4, 0, 1, 2, 119],
    symbols: &[
        0x00, 0x01, 0x02, 0x03, 0x11, 0x04, 0x05, 0x21, 0x31, 0x06, 0x12, 0x41, 0x51, 0x07, 0x61, 0x71,
        0x13, 0x22, 0x32, 0x81, 0x08, 0x14, 0x42, 0x91, 0xa1, 0xb1, 0xc1, 0x09, 0x23, 0x33, 0x52, 0xf0,
        0x15, 0x62, 0x72, 0xd1, 0x0a, 0x16, 0x24, 0x34, 0xe1, 0x25, 0xf1, 0x17, 0x18, 0x19, 0x1a, 0x26,
        0x27, 0x28, 0x29, 0x2a, 0x35, 0x36, 0x37, 0x38, 0x39, 0x3a, 0x43, 0x44, 0x45, 0x46, 0x47, 0x48,
        0x49, 0x4a, 0x53, 0x54, 0x55, 0x56, 0x57, 0x58, 0x59, 0x5a, 0x63, 0x64, 0x65, 0x66, 0x67, 0x68,
        0x69, 0x6a, 0x73, 0x74, 0x75, 0x76, 0x77, 0x78, 0x79, 0x7a, 0x82, 0x83, 0x84, 0x85, 0x86, 0x87,
        0x88, 0x89, 0x8a, 0x92, 0x93, 0x94, 0x95, 0x96, 0x97, 0x98, 0x99, 0x9a, 0xa2, 0xa3, 0xa4, 0xa5,
        0xa6, 0xa7, 0xa8, 0xa9, 0xaa, 0xb2, 0xb3, 0xb4, 0xb5, 0xb6, 0xb7, 0xb8, 0xb9, 0xba, 0xc2, 0xc3,
        0xc4, 0xc5, 0xc6, 0xc7, 0xc8, 0xc9, 0xca, 0xd2, 0xd3, 0xd4, 0xd5, 0xd6, 0xd7, 0xd8, 0xd9, 0xda,
        0xe2, 0xe3, 0xe4, 0xe5, 0xe6, 0xe7, 0xe8, 0xe9, 0xea, 0xf2, 0xf3, 0xf4, 0xf5, 0xf6, 0xf7, 0xf8,
        0xf9, 0xfa,
    ],
};


/// The quality levels selectable by the quantization index.
/// Index 2 reproduces the tables of the header template.
pub const QUALITY_LADDER: [u32; 4] = [50, 70, 80, 90];

/// The example luma quantization table of the jpeg standard, in zigzag order.
const BASE_LUMA_QUANTIZATION: [u8; 64] = [
    16, 11, 12, 14, 12, 10, 16, 14,
    13, 14, 18, 17, 16, 19, 24, 40,
    26, 24, 22, 22, 24, 49, 35, 37,
    29, 40, 58, 51, 61, 60, 57, 51,
    56, 55, 64, 72, 92, 78, 64, 68,
    87, 69, 55, 56, 80, 109, 81, 87,
    95, 98, 103, 104, 103, 62, 77, 113,
    121, 112, 100, 120, 92, 101, 103, 99,
];

/// The example chroma quantization table of the jpeg standard, in zigzag order.
const BASE_CHROMA_QUANTIZATION: [u8; 64] = [
    17, 18, 18, 24, 21, 24, 47, 26,
    26, 47, 99, 66, 56, 66, 99, 99,
    99, 99, 99, 99, 99, 99, 99, 99,
    99, 99, 99, 99, 99, 99, 99, 99,
    99, 99, 99, 99, 99, 99, 99, 99,
    99, 99, 99, 99, 99, 99, 99, 99,
    99, 99, 99, 99, 99, 99, 99, 99,
    99, 99, 99, 99, 99, 99, 99, 99,
];

/// Maps a row major position in an 8x8 block to its zigzag index.
pub const ZIGZAG: [u8; 64] = [
    0, 1, 5, 6, 14, 15, 27, 28,
    2, 4, 7, 13, 16, 26, 29, 42,
    3, 8, 12, 17, 25, 30, 41, 43,
    9, 11, 18, 24, 31, 40, 44, 53,
    10, 19, 23, 32, 39, 45, 52, 54,
    20, 22, 33, 38, 46, 51, 55, 60,
    21, 34, 37, 47, 50, 56, 59, 61,
    35, 36, 48, 49, 57, 58, 62, 63,
];

/// The zigzag indices in the order the column pass of the inverse dct reads them.
/// Each row lists one column from top to bottom,
/// and the columns appear in the order 0, 4, 2, 6, 5, 1, 7, 3.
pub const IDCT_READ_ORDER: [u8; 64] = [
    0, 2, 3, 9, 10, 20, 21, 35,
    14, 16, 25, 31, 39, 46, 50, 57,
    5, 7, 12, 18, 23, 33, 37, 48,
    27, 29, 41, 44, 52, 55, 59, 62,
    15, 26, 30, 40, 45, 51, 56, 58,
    1, 4, 8, 11, 19, 22, 34, 36,
    28, 42, 43, 53, 54, 60, 61, 63,
    6, 13, 17, 24, 32, 38, 47, 49,
];

/// The scale factors of the separable inverse dct, `cos(k * pi / 16) / 2`
/// with the first entry `1 / (2 * sqrt(2))`, in fixed point.
pub const AAN_SCALE_FACTORS: [i64; 8] = [724, 1004, 946, 851, 724, 569, 392, 200];


/// Scale one of the standard quantization tables to a quality between 1 and 100.
/// The result is clamped to the range of baseline quantization values.
pub fn scaled_quantization(base: &[u8; 64], quality: u32) -> [u8; 64] {
    let quality = quality.clamp(1, 100);
    let scale = if quality < 50 { 5000 / quality } else { 200 - quality * 2 };

    let mut table = [0_u8; 64];
    for (scaled, &value) in table.iter_mut().zip(base.iter()) {
        *scaled = ((u32::from(value) * scale + 50) / 100).clamp(1, 255) as u8;
    }

    table
}

/// The luma and chroma quantization tables selected by a quality index, in zigzag order.
/// Indices beyond the last quality select the last quality.
pub fn quantization_pair(index: usize) -> [[u8; 64]; 2] {
    let quality = QUALITY_LADDER[index.min(QUALITY_LADDER.len() - 1)];

    [
        scaled_quantization(&BASE_LUMA_QUANTIZATION, quality),
        scaled_quantization(&BASE_CHROMA_QUANTIZATION, quality),
    ]
}


#[cfg(test)]
mod test {
    use super::*;

    /// Walk the huffman segment of the template.
    fn template_huffman_tables() -> Vec<(u8, CanonicalTable<'static>)> {
        assert_eq!(&JPEG_HEADER[136 .. 138], &[0xff, 0xc4]);

        let segment_end = 138 + usize::from(u16::from_be_bytes([JPEG_HEADER[138], JPEG_HEADER[139]]));
        let mut position = 140;
        let mut tables = Vec::new();

        while position < segment_end {
            let class_and_id = JPEG_HEADER[position];

            let mut counts = [0_u8; 16];
            counts.copy_from_slice(&JPEG_HEADER[position + 1 .. position + 17]);

            let symbol_count: usize = counts.iter().map(|&count| usize::from(count)).sum();
            let symbols = &JPEG_HEADER[position + 17 .. position + 17 + symbol_count];

            tables.push((class_and_id, CanonicalTable { counts, symbols }));
            position += 17 + symbol_count;
        }

        assert_eq!(position, CONEXANT_HEADER_LEN);
        tables
    }

    #[test]
    fn huffman_tables_match_template(){
        let tables = template_huffman_tables();

        assert_eq!(tables, vec![
            (0x00, LUMA_DC), (0x01, CHROMA_DC),
            (0x10, LUMA_AC), (0x11, CHROMA_AC),
        ]);
    }

    #[test]
    fn quality_index_two_matches_template(){
        let [luma, chroma] = quantization_pair(2);

        assert_eq!(JPEG_HEADER[LUMA_QUANTIZATION_ID_OFFSET], 0);
        assert_eq!(&JPEG_HEADER[LUMA_QUANTIZATION_OFFSET .. LUMA_QUANTIZATION_OFFSET + 64], &luma[..]);

        assert_eq!(JPEG_HEADER[CHROMA_QUANTIZATION_ID_OFFSET], 1);
        assert_eq!(&JPEG_HEADER[CHROMA_QUANTIZATION_OFFSET .. CHROMA_QUANTIZATION_OFFSET + 64], &chroma[..]);
    }

    #[test]
    fn quality_ladder_is_ordered(){
        let coarsest = quantization_pair(0);
        let finest = quantization_pair(QUALITY_LADDER.len() + 3);

        assert_eq!(coarsest[0], BASE_LUMA_QUANTIZATION);
        assert!(finest[0].iter().zip(coarsest[0].iter()).all(|(fine, coarse)| fine <= coarse));
        assert!(scaled_quantization(&BASE_CHROMA_QUANTIZATION, 1).iter().all(|&value| value == 255));
    }

    #[test]
    fn template_frame_header(){
        assert_eq!(&JPEG_HEADER[CONEXANT_HEADER_LEN .. CONEXANT_HEADER_LEN + 2], &[0xff, 0xc0]);
        assert_eq!(&JPEG_HEADER[HEIGHT_OFFSET .. HEIGHT_OFFSET + 2], &[0x01, 0xe0]);
        assert_eq!(&JPEG_HEADER[WIDTH_OFFSET .. WIDTH_OFFSET + 2], &[0x02, 0x80]);
        assert_eq!(JPEG_HEADER[SAMPLING_OFFSET], 0x21);
        assert_eq!(&JPEG_HEADER[HEADER_LEN - 14 .. HEADER_LEN - 12], &[0xff, 0xda]);
    }

    #[test]
    fn read_order_lists_columns(){
        let columns = [0, 4, 2, 6, 5, 1, 7, 3];

        for (pass, &column) in columns.iter().enumerate() {
            for row in 0..8 {
                assert_eq!(IDCT_READ_ORDER[pass * 8 + row], ZIGZAG[row * 8 + column]);
            }
        }
    }
}
