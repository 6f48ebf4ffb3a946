
//! Separable fixed point inverse dct, using the scaled butterfly of Arai, Agui and Nakajima.
//! The scale factors of the butterfly are folded into the dequantization tables.

use crate::math::{Fixed, fixed_mul, fixed_to_int};
use super::tables::{AAN_SCALE_FACTORS, IDCT_READ_ORDER, ZIGZAG};


/// `2 * cos(3 pi / 8)` in fixed point.
const S22: Fixed = 1567;

/// `2 * cos(pi / 8)` in fixed point.
const C22: Fixed = 3784;

/// `sqrt(2)` in fixed point.
const IC4: Fixed = 2896;

/// All decoded samples are multiplied with `0.7`.
const OUTPUT_SCALE: Fixed = 1434;

/// Baseline coefficients fit into 16 bits. Larger values only come from corrupt data,
/// and are saturated to keep the transform within 64 bits.
const COEFFICIENT_LIMIT: i32 = 0x7FFF;

/// Added to every luma sample: `128.5` in fixed point, which centers and rounds the sample.
pub const LUMA_OFFSET: Fixed = 263_168;

/// Added to every chroma sample: `0.5` in fixed point, which rounds the sample.
pub const CHROMA_OFFSET: Fixed = 1024;


/// Quantization values multiplied with the butterfly scale factors, in zigzag order.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct DequantizationTable(pub [Fixed; 64]);

impl DequantizationTable {

    /// Prepare a quantization table from the frame header, which is in zigzag order.
    pub fn new(quantization: &[u8; 64]) -> Self {
        let mut table = [0; 64];

        for row in 0 .. 8 {
            for column in 0 .. 8 {
                let index = usize::from(ZIGZAG[row * 8 + column]);
                let scale = fixed_mul(AAN_SCALE_FACTORS[row], AAN_SCALE_FACTORS[column]);
                table[index] = fixed_mul(Fixed::from(quantization[index]) * scale, OUTPUT_SCALE);
            }
        }

        DequantizationTable(table)
    }
}

impl std::fmt::Debug for DequantizationTable {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.debug_tuple("DequantizationTable").field(&&self.0[..]).finish()
    }
}


/// Transform one block of quantized coefficients in zigzag order
/// into 64 samples in row major order.
///
/// `extent` is the number of leading zigzag coefficients that may be non zero.
/// A block with only a dc coefficient takes a shortcut.
/// The samples are not clipped.
pub fn inverse_dct(coefficients: &[i32; 64], table: &DequantizationTable, offset: Fixed, extent: usize) -> [i32; 64] {
    let dequantized = |index: u8| -> Fixed {
        let index = usize::from(index);
        let coefficient = coefficients[index].clamp(-COEFFICIENT_LIMIT, COEFFICIENT_LIMIT);
        Fixed::from(coefficient) * table.0[index]
    };

    if extent <= 1 {
        return [fixed_to_int(offset + dequantized(0)); 64];
    }

    let mut columns = [0 as Fixed; 64];
    let mut bias = offset;

    for (pass, order) in IDCT_READ_ORDER.chunks_exact(8).enumerate() {
        let inputs = [
            bias + dequantized(order[0]), dequantized(order[4]),
            dequantized(order[2]), dequantized(order[6]),
            dequantized(order[5]), dequantized(order[1]),
            dequantized(order[7]), dequantized(order[3]),
        ];

        bias = 0;

        let outputs = if inputs[1..].iter().all(|&input| input == 0) { [inputs[0]; 8] }
                      else { butterfly(inputs) };

        for (row, output) in outputs.iter().enumerate() {
            columns[row * 8 + pass] = *output;
        }
    }

    let mut samples = [0_i32; 64];

    for (row, samples) in columns.chunks_exact(8).zip(samples.chunks_exact_mut(8)) {
        let mut inputs = [0 as Fixed; 8];
        inputs.copy_from_slice(row);

        if inputs[1..].iter().all(|&input| input == 0) {
            let sample = fixed_to_int(inputs[0]);
            for target in samples.iter_mut() { *target = sample; }
        }
        else {
            for (target, output) in samples.iter_mut().zip(butterfly(inputs).iter()) {
                *target = fixed_to_int(*output);
            }
        }
    }

    samples
}

/// One dimensional transform of eight values.
/// The inputs are ordered by frequency 0, 4, 2, 6, 5, 1, 7, 3,
/// the outputs are ordered by position.
#[inline]
fn butterfly([t0, t1, t2, t3, t4, t5, t6, t7]: [Fixed; 8]) -> [Fixed; 8] {
    let even_sum = t0 + t1;
    let even_difference = t0 - t1;
    let t3_sum = t2 + t3;
    let t2_difference = fixed_mul(t2 - t3, IC4) - t3_sum;

    let even0 = even_sum + t3_sum;
    let even3 = even_sum - t3_sum;
    let even1 = even_difference + t2_difference;
    let even2 = even_difference - t2_difference;

    let odd_difference = t4 - t7;
    let odd_sum = t4 + t7;
    let high_sum = t5 + t6;
    let high_difference = t5 - t6;

    let odd0 = high_sum + odd_sum;
    let rotated = fixed_mul(high_sum - odd_sum, IC4);
    let shared = fixed_mul(odd_difference + high_difference, S22);
    let odd_rotated = fixed_mul(odd_difference, C22 - S22) + shared;

    let odd1 = fixed_mul(high_difference, C22 + S22) - shared - odd0;
    let odd2 = rotated - odd1;
    let odd3 = odd_rotated - odd2;

    [
        even0 + odd0, even1 + odd1, even2 + odd2, even3 + odd3,
        even3 - odd3, even2 - odd2, even1 - odd1, even0 - odd0,
    ]
}
