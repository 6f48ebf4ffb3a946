//! A small baseline jpeg encoder that produces frames
//! the way the camera bridges send them, and helpers to inspect decoded planes.

#![allow(dead_code)]

use spcadec::codec::jpeg::tables::{
    CanonicalTable, CHROMA_AC, CHROMA_DC, LUMA_AC, LUMA_DC, ZIGZAG, quantization_pair
};

use rand::Rng;
use spcadec::codec::YuvLayout;
use spcadec::meta::Sampling;
use spcadec::prelude::*;


/// All samples decoded by this crate are scaled with this factor.
pub const DECODER_GAIN: f64 = 0.7;

/// Standard jpeg decoders do not scale samples.
pub const STANDARD_GAIN: f64 = 1.0;

pub const ALL_ENCODINGS: [NativeEncoding; 10] = [
    NativeEncoding::Jpeg411,
    NativeEncoding::Jpeg422Tagged,
    NativeEncoding::Jpeg422Conexant,
    NativeEncoding::Jpeg422Bare,
    NativeEncoding::Yuvy,
    NativeEncoding::Yuyv,
    NativeEncoding::Yyuv,
    NativeEncoding::BayerGbrg,
    NativeEncoding::BayerTv8532,
    NativeEncoding::SonixPacked,
];

pub const PIXEL_FORMATS: [OutputFormat; 4] = [
    OutputFormat::Rgb565,
    OutputFormat::Rgb24,
    OutputFormat::Rgb32,
    OutputFormat::Yuv420p,
];


pub fn random_bytes(random: &mut impl Rng, len: usize) -> Vec<u8> {
    let mut bytes = vec![0_u8; len];
    random.fill(&mut bytes[..]);
    bytes
}

/// A frame that decodes successfully with the hardware size.
/// Uncompressed encodings are filled with noise.
pub fn valid_input(encoding: NativeEncoding, hardware: Vec2<usize>, random: &mut impl Rng) -> Vec<u8> {
    let Vec2(width, height) = hardware;

    match encoding {
        NativeEncoding::Jpeg411 | NativeEncoding::Jpeg422Tagged
        | NativeEncoding::Jpeg422Conexant | NativeEncoding::Jpeg422Bare =>
            native_frame(&Image::smooth(hardware), encoding, 2, DECODER_GAIN, 2),

        NativeEncoding::Yuvy | NativeEncoding::Yuyv | NativeEncoding::Yyuv =>
            random_bytes(random, YuvLayout::row_pair_len(width) * height / 2),

        NativeEncoding::BayerGbrg => random_bytes(random, hardware.area()),

        // each pair of lines is framed by ten bytes
        NativeEncoding::BayerTv8532 => random_bytes(random, height / 2 * (2 * width + 10)),

        // no code is longer than a byte
        NativeEncoding::SonixPacked => random_bytes(random, hardware.area() + 16),
    }
}

/// Cut the pixels of the crop window out of an uncropped output.
pub fn window_of(full: &[u8], format: OutputFormat, geometry: &FrameGeometry) -> Vec<u8> {
    let copy_rows = |plane: &[u8], width: usize, left: usize, top: usize, size: Vec2<usize>, bytes_per_pixel: usize, target: &mut Vec<u8>| {
        for row in top .. top + size.1 {
            let start = (row * width + left) * bytes_per_pixel;
            target.extend_from_slice(&plane[start .. start + size.0 * bytes_per_pixel]);
        }
    };

    let hardware = geometry.hardware;
    let requested = geometry.requested;
    let (left, top) = (geometry.crop.left, geometry.crop.top);
    let mut window = Vec::new();

    match format.bytes_per_pixel() {
        Some(bytes_per_pixel) => copy_rows(full, hardware.0, left, top, requested, bytes_per_pixel, &mut window),

        None => {
            let (luma, first, second) = planes(full, hardware);
            let half = |size: Vec2<usize>| Vec2(size.0 / 2, size.1 / 2);

            copy_rows(luma, hardware.0, left, top, requested, 1, &mut window);
            copy_rows(first, hardware.0 / 2, left / 2, top / 2, half(requested), 1, &mut window);
            copy_rows(second, hardware.0 / 2, left / 2, top / 2, half(requested), 1, &mut window);
        }
    }

    window
}


/// Pixels in planar yuv 4:2:0 form, chroma centered at zero.
#[derive(Clone, Debug, PartialEq)]
pub struct Image {
    pub size: Vec2<usize>,
    pub luma: Vec<u8>,
    pub first_chroma: Vec<i32>,
    pub second_chroma: Vec<i32>,
}

impl Image {

    /// The chroma functions receive coordinates of the half resolution chroma planes.
    pub fn from_fn(
        size: Vec2<usize>,
        luma: impl Fn(usize, usize) -> u8,
        first_chroma: impl Fn(usize, usize) -> i32,
        second_chroma: impl Fn(usize, usize) -> i32,
    ) -> Self
    {
        let chroma_size = Vec2(size.0 / 2, size.1 / 2);

        let plane = |size: Vec2<usize>, function: &dyn Fn(usize, usize) -> i32| -> Vec<i32> {
            (0 .. size.1).flat_map(|y| (0 .. size.0).map(move |x| (x, y)))
                .map(|(x, y)| function(x, y)).collect()
        };

        Image {
            size,
            luma: plane(size, &|x, y| i32::from(luma(x, y))).into_iter().map(|value| value as u8).collect(),
            first_chroma: plane(chroma_size, &first_chroma),
            second_chroma: plane(chroma_size, &second_chroma),
        }
    }

    /// Gentle gradients in every plane.
    pub fn smooth(size: Vec2<usize>) -> Self {
        Image::from_fn(
            size,
            |x, y| (64 + 2 * x + y).min(255) as u8,
            |x, _| 2 * (x as i32 - 8),
            |_, y| 12 - (3 * y as i32) / 2,
        )
    }

    /// No color at all.
    pub fn gray(size: Vec2<usize>, luma: impl Fn(usize, usize) -> u8) -> Self {
        Image::from_fn(size, luma, |_, _| 0, |_, _| 0)
    }

    /// The same color everywhere.
    pub fn flat(size: Vec2<usize>, luma: u8, first_chroma: i32, second_chroma: i32) -> Self {
        Image::from_fn(size, |_, _| luma, |_, _| first_chroma, |_, _| second_chroma)
    }

    pub fn luma_at(&self, x: usize, y: usize) -> u8 {
        self.luma[y * self.size.0 + x]
    }
}


/// Encode an image into a complete native frame, including vendor header and trailer.
/// `gain` is the factor the decoder will apply to the samples.
pub fn native_frame(image: &Image, encoding: NativeEncoding, quality: usize, gain: f64, restart_interval: u8) -> Vec<u8> {
    let sampling = encoding.sampling().expect("jpeg encoding");
    let Vec2(width, height) = image.size.map(|value| value as u16);

    let mut frame = match encoding {
        NativeEncoding::Jpeg422Tagged => {
            let mut header = vec![0_u8; 16];
            header[0] = 0xFF;
            header[10 .. 12].copy_from_slice(&width.to_be_bytes());
            header[12 .. 14].copy_from_slice(&height.to_be_bytes());
            header
        },

        NativeEncoding::Jpeg422Conexant => conexant_header(width, height, restart_interval),
        _ => Vec::new(),
    };

    let restart_interval = if encoding == NativeEncoding::Jpeg422Conexant { usize::from(restart_interval) } else { 0 };
    frame.extend(encode_scan(image, sampling, quality, gain, restart_interval));

    match sampling {
        Sampling::FourOneOne => frame.extend_from_slice(&[0; 8]),
        Sampling::FourTwoTwo => frame.extend_from_slice(&[0xFF, 0xD9]),
    }

    frame
}

/// The restart interval, frame header and scan header, exactly 39 bytes.
pub fn conexant_header(width: u16, height: u16, restart_interval: u8) -> Vec<u8> {
    let mut header = vec![0xFF, 0xDD, 0x00, 0x04, 0x00, restart_interval];

    header.extend_from_slice(&[0xFF, 0xC0, 0x00, 0x11, 0x08]);
    header.extend_from_slice(&height.to_be_bytes());
    header.extend_from_slice(&width.to_be_bytes());
    header.extend_from_slice(&[0x03, 0x01, 0x21, 0x00, 0x02, 0x11, 0x01, 0x03, 0x11, 0x01]);

    header.extend_from_slice(&[0xFF, 0xDA, 0x00, 0x0C, 0x03, 0x01, 0x00, 0x02, 0x11, 0x03, 0x11, 0x00, 0x3F, 0x00]);

    assert_eq!(header.len(), 39);
    header
}

/// Entropy coded data of all units. 4:2:2 scans are byte stuffed, 4:1:1 scans are not.
pub fn encode_scan(image: &Image, sampling: Sampling, quality: usize, gain: f64, restart_interval: usize) -> Vec<u8> {
    let quantization = quantization_pair(quality);
    let luma_codes = (CodeTable::new(&LUMA_DC), CodeTable::new(&LUMA_AC));
    let chroma_codes = (CodeTable::new(&CHROMA_DC), CodeTable::new(&CHROMA_AC));

    let unit = sampling.unit_size();
    let units_x = image.size.0 / unit.0;
    let units_y = image.size.1 / unit.1;
    let chroma_width = image.size.0 / 2;
    let chroma_rows = unit.1 / 2;

    let mut writer = BitWriter::new(sampling == Sampling::FourTwoTwo);
    let mut predictions = [0_i32; 3];

    for unit_index in 0 .. units_x * units_y {
        if restart_interval > 0 && unit_index > 0 && unit_index % restart_interval == 0 {
            let marker = 0xD0 + ((unit_index / restart_interval - 1) % 8) as u8;
            writer.marker(marker);
            predictions = [0; 3];
        }

        let position = Vec2((unit_index % units_x) * unit.0, (unit_index / units_x) * unit.1);

        for block in 0 .. sampling.luma_blocks() {
            let origin = Vec2(position.0 + (block % 2) * 8, position.1 + (block / 2) * 8);
            let samples = block_samples(|x, y| f64::from(image.luma_at(origin.0 + x, origin.1 + y)) - 128.0);

            let coefficients = quantize(&samples, &quantization[0], gain);
            encode_block(&mut writer, &coefficients, &luma_codes, &mut predictions[0]);
        }

        let chroma_origin = Vec2(position.0 / 2, position.1 / 2);
        let planes = [&image.first_chroma, &image.second_chroma];

        for (component, plane) in planes.iter().enumerate() {
            // 4:2:2 units only use the upper rows of the block, the lower rows repeat the last one
            let samples = block_samples(|x, y| {
                let row = chroma_origin.1 + y.min(chroma_rows - 1);
                f64::from(plane[row * chroma_width + chroma_origin.0 + x])
            });

            let coefficients = quantize(&samples, &quantization[1], gain);
            encode_block(&mut writer, &coefficients, &chroma_codes, &mut predictions[component + 1]);
        }
    }

    writer.finish()
}

fn block_samples(sample: impl Fn(usize, usize) -> f64) -> [f64; 64] {
    let mut samples = [0.0; 64];

    for (index, target) in samples.iter_mut().enumerate() {
        *target = sample(index % 8, index / 8);
    }

    samples
}

/// Forward dct, divided by the quantization and the gain of the decoder, in zigzag order.
fn quantize(samples: &[f64; 64], quantization: &[u8; 64], gain: f64) -> [i32; 64] {
    let weight = |frequency: usize| if frequency == 0 { std::f64::consts::FRAC_1_SQRT_2 } else { 1.0 };
    let basis = |position: usize, frequency: usize| {
        ((2 * position + 1) as f64 * frequency as f64 * std::f64::consts::PI / 16.0).cos()
    };

    let mut coefficients = [0_i32; 64];

    for v in 0 .. 8 {
        for u in 0 .. 8 {
            let mut sum = 0.0;

            for y in 0 .. 8 {
                for x in 0 .. 8 {
                    sum += samples[y * 8 + x] * basis(x, u) * basis(y, v);
                }
            }

            let index = usize::from(ZIGZAG[v * 8 + u]);
            let value = weight(u) * weight(v) / 4.0 * sum;
            coefficients[index] = (value / (gain * f64::from(quantization[index]))).round() as i32;
        }
    }

    coefficients
}

fn encode_block(writer: &mut BitWriter, coefficients: &[i32; 64], (dc, ac): &(CodeTable, CodeTable), prediction: &mut i32) {
    let (size, bits) = magnitude(coefficients[0] - *prediction);
    *prediction = coefficients[0];

    writer.code(dc.0[size as usize]);
    writer.write(bits, size);

    let mut run = 0;

    for &coefficient in &coefficients[1 ..] {
        if coefficient == 0 {
            run += 1;
            continue;
        }

        while run > 15 {
            writer.code(ac.0[0xF0]);
            run -= 16;
        }

        let (size, bits) = magnitude(coefficient);
        writer.code(ac.0[(run << 4) | size as usize]);
        writer.write(bits, size);
        run = 0;
    }

    if run > 0 {
        writer.code(ac.0[0x00]);
    }
}

/// The bit size of a value and its bits, with negative values stored as their ones complement.
fn magnitude(value: i32) -> (u32, u32) {
    let size = 32 - value.unsigned_abs().leading_zeros();
    let mask = (1_u32 << size) - 1;
    let bits = if value < 0 { (value - 1) as u32 & mask } else { value as u32 };
    (size, bits)
}


#[derive(Clone, Copy, Debug, Default)]
struct Code {
    bits: u32,
    length: u32,
}

/// The code of each symbol.
struct CodeTable([Code; 256]);

impl CodeTable {
    fn new(table: &CanonicalTable<'_>) -> Self {
        let mut codes = [Code::default(); 256];
        let mut symbols = table.symbols.iter();
        let mut code = 0_u32;

        for (index, &count) in table.counts.iter().enumerate() {
            for _ in 0 .. count {
                let &symbol = symbols.next().expect("huffman table has fewer symbols than counted");
                codes[usize::from(symbol)] = Code { bits: code, length: index as u32 + 1 };
                code += 1;
            }

            code <<= 1;
        }

        CodeTable(codes)
    }
}


struct BitWriter {
    bytes: Vec<u8>,
    accumulator: u32,
    count: u32,
    stuffing: bool,
}

impl BitWriter {
    fn new(stuffing: bool) -> Self {
        BitWriter { bytes: Vec::new(), accumulator: 0, count: 0, stuffing }
    }

    fn code(&mut self, code: Code) {
        assert_ne!(code.length, 0, "symbol has no code");
        self.write(code.bits, code.length);
    }

    fn write(&mut self, bits: u32, length: u32) {
        for shift in (0 .. length).rev() {
            self.accumulator = (self.accumulator << 1) | ((bits >> shift) & 1);
            self.count += 1;

            if self.count == 8 {
                let byte = self.accumulator as u8;
                self.push(byte);
                self.accumulator = 0;
                self.count = 0;
            }
        }
    }

    fn push(&mut self, byte: u8) {
        self.bytes.push(byte);
        if self.stuffing && byte == 0xFF { self.bytes.push(0); }
    }

    /// Fill the last byte with one bits.
    fn pad(&mut self) {
        while self.count != 0 {
            self.write(1, 1);
        }
    }

    fn marker(&mut self, marker: u8) {
        self.pad();
        self.bytes.extend_from_slice(&[0xFF, marker]);
    }

    fn finish(mut self) -> Vec<u8> {
        self.pad();
        self.bytes
    }
}


/// Split a yuv 4:2:0 output into its luma and chroma planes.
pub fn planes(output: &[u8], size: Vec2<usize>) -> (&[u8], &[u8], &[u8]) {
    let luma_len = size.area();
    let chroma_len = luma_len / 4;

    assert_eq!(output.len(), luma_len + 2 * chroma_len);
    let (luma, chroma) = output.split_at(luma_len);
    let (first, second) = chroma.split_at(chroma_len);
    (luma, first, second)
}

/// The largest difference between decoded bytes and expected values.
pub fn max_difference(actual: &[u8], expected: impl IntoIterator<Item = i32>) -> i32 {
    actual.iter().zip(expected)
        .map(|(&actual, expected)| (i32::from(actual) - expected).abs())
        .max().unwrap_or(0)
}
