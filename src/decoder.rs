
//! Decodes whole frames: selects the sample decoder and the compositor,
//! and keeps the state that is shared by all frames of one camera session.

use std::sync::{Arc, PoisonError, RwLock};
use std::sync::atomic::AtomicBool;
use crate::codec::{
    SampleDecoder, YuvDecoder, YuvLayout, RawBayerDecoder, Tv8532Decoder,
    SonixDecoder, SonixTable, check_abort,
};
use crate::codec::jpeg::{JpegDecoder, JpegTables, header, vendor};
use crate::codec::jpeg::huffman::{MIN_LOOKUP_BITS, MAX_LOOKUP_BITS};
use crate::composite::{CompositeOptions, compositor_for};
use crate::error::{Error, UnitResult};
use crate::frame::Frame;
use crate::meta::{NativeEncoding, OutputFormat, Sampling};
use crate::picture::{ChangeMask, GammaTables, PictureSettings};


/// Configuration that is fixed for the lifetime of a decoder context.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DecoderOptions {

    /// Index into the quality ladder `[50, 70, 80, 90]`,
    /// which must match the quality the camera compresses with.
    /// If none, each jpeg encoding uses the quality its bridge is known to use.
    pub quality: Option<usize>,

    /// Width of the huffman lookup tables in bits, within `8 ..= 10`.
    /// Wider tables resolve more codes at once, but take longer to build.
    pub fast_lookup_bits: u32,
}

/// Owns everything that is shared by the frames of one camera session.
/// Can be shared between threads. Decoding only needs a shared reference,
/// while changing the picture settings briefly locks the gamma tables.
#[derive(Debug)]
pub struct DecoderContext {
    options: DecoderOptions,
    jpeg: JpegTables,
    sonix: SonixTable,
    picture: RwLock<PictureState>,
}

/// The color correction used for one frame.
/// Changing the settings while the frame is decoded does not affect it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PictureSnapshot {

    /// The settings the tables were computed from.
    pub settings: PictureSettings,

    /// The lookup tables for all three channels.
    pub tables: Arc<GammaTables>,
}

#[derive(Debug)]
struct PictureState {
    settings: PictureSettings,

    /// Collects changes until the next frame is decoded.
    changes: ChangeMask,

    tables: Arc<GammaTables>,
}


impl Default for DecoderOptions {
    fn default() -> Self {
        DecoderOptions { quality: None, fast_lookup_bits: 9 }
    }
}

impl DecoderOptions {

    /// Use the same quality for every jpeg encoding.
    pub fn with_quality(self, quality: usize) -> Self {
        DecoderOptions { quality: Some(quality), ..self }
    }

    /// Change the width of the huffman lookup tables. The width is clamped to `8 ..= 10`.
    pub fn with_fast_lookup_bits(self, bits: u32) -> Self {
        DecoderOptions { fast_lookup_bits: bits.clamp(MIN_LOOKUP_BITS, MAX_LOOKUP_BITS), ..self }
    }

    /// The quality index for frames of this encoding.
    pub fn quality_for(&self, encoding: NativeEncoding) -> usize {
        self.quality.unwrap_or_else(|| encoding.default_quality())
    }
}

impl Default for DecoderContext {
    fn default() -> Self {
        Self::new(DecoderOptions::default())
    }
}

impl DecoderContext {

    /// Build the huffman and quantization tables.
    /// The gamma tables are computed when the first frame is decoded.
    pub fn new(options: DecoderOptions) -> Self {
        Self::with_settings(options, PictureSettings::default())
    }

    /// Start with custom picture settings.
    pub fn with_settings(options: DecoderOptions, settings: PictureSettings) -> Self {
        DecoderContext {
            jpeg: JpegTables::new(options.fast_lookup_bits),
            sonix: SonixTable::new(),
            options,

            picture: RwLock::new(PictureState {
                settings,
                changes: ChangeMask::everything(),
                tables: Arc::new(GammaTables::identity()),
            }),
        }
    }

    /// The options this context was created with.
    pub fn options(&self) -> DecoderOptions {
        self.options
    }

    /// The tables used by jpeg frames.
    pub fn jpeg_tables(&self) -> &JpegTables {
        &self.jpeg
    }

    /// The settings that the next frame will use.
    pub fn picture_settings(&self) -> PictureSettings {
        self.picture.read().unwrap_or_else(PoisonError::into_inner).settings
    }

    /// Replace the picture settings. The tables are recomputed before the next frame.
    /// Frames that are currently being decoded keep their previous tables.
    pub fn change_settings(&self, settings: PictureSettings) {
        let mut state = self.picture.write().unwrap_or_else(PoisonError::into_inner);
        let changes = settings.changes_since(&state.settings);

        state.changes.merge(changes);
        state.settings = settings;
    }

    /// The current settings with their tables, recomputing the tables if the settings changed.
    pub fn snapshot(&self) -> PictureSnapshot {
        {
            let state = self.picture.read().unwrap_or_else(PoisonError::into_inner);
            if state.changes.is_empty() { return state.snapshot(); }
        }

        let mut state = self.picture.write().unwrap_or_else(PoisonError::into_inner);

        // another thread may have rebuilt the tables in the meantime
        if state.changes.requires_rebuild() {
            log::trace!("rebuilding gamma tables for {:?}", state.settings);
            state.tables = Arc::new(GammaTables::new(&state.settings));
        }

        state.changes = ChangeMask::default();
        state.snapshot()
    }

    /// Decode one frame into its output buffer.
    /// On failure, the frame has no output and should be dropped.
    pub fn decode_frame(&self, frame: &mut Frame) -> UnitResult {
        self.decode_frame_with_abort(frame, &AtomicBool::new(false))
    }

    /// Decode one frame, stopping early once the flag is raised.
    /// The flag is checked between rows of coding units and rows of output pixels.
    pub fn decode_frame_with_abort(&self, frame: &mut Frame, abort: &AtomicBool) -> UnitResult {
        let result = self.decode_into(frame, abort);

        if let Err(error) = &result {
            frame.invalidate();

            if error.drops_frame() {
                log::debug!("dropping {} frame of {}: {}", frame.encoding, frame.geometry.hardware, error);
            }
        }

        result
    }

    fn decode_into(&self, frame: &mut Frame, abort: &AtomicBool) -> UnitResult {
        let (encoding, format, geometry) = (frame.encoding, frame.format, frame.geometry);
        let unsupported = Error::UnsupportedCombination { encoding, format };
        let quality = self.options.quality_for(encoding);

        geometry.validate(encoding)?;
        let picture = self.snapshot();

        log::trace!(
            "decoding {} frame of {} into {} of {}",
            encoding, geometry.hardware, format, geometry.requested
        );

        let (input, output) = frame.begin_decode();

        let scan_length = match format {
            OutputFormat::Jpeg => {
                if !encoding.is_jpeg() { return Err(unsupported); }

                check_abort(abort)?;
                vendor::check_dimensions(encoding, input, geometry.hardware)?;

                let quantization = &self.jpeg.quality(quality).quantization;
                header::synthesize_jpeg(encoding, input, geometry.hardware, quantization, output)?;
                output.len()
            },

            format => {
                let compositor = compositor_for(format).ok_or(unsupported)?;
                let length = format.byte_size(geometry.requested)
                    .ok_or(Error::UnsupportedCombination { encoding, format })?;

                let samples = self.sample_decoder(encoding, quality).decode(input, &geometry, abort)?;
                output.resize(length, 0);

                let options = CompositeOptions {
                    window: geometry.window(),
                    tables: &picture.tables,
                    force_rgb: picture.settings.force_rgb,
                    abort,
                };

                compositor.composite(&samples, options, output)?;
                length
            },
        };

        frame.finish_decode(scan_length);
        Ok(())
    }

    /// Select the decoder for a native encoding.
    fn sample_decoder(&self, encoding: NativeEncoding, quality: usize) -> Box<dyn SampleDecoder + '_> {
        let jpeg = |sampling| Box::new(JpegDecoder::new(encoding, sampling, &self.jpeg, quality));

        match encoding {
            NativeEncoding::Jpeg411 => jpeg(Sampling::FourOneOne),

            NativeEncoding::Jpeg422Tagged
            | NativeEncoding::Jpeg422Conexant
            | NativeEncoding::Jpeg422Bare => jpeg(Sampling::FourTwoTwo),

            NativeEncoding::Yuvy => Box::new(YuvDecoder::new(YuvLayout::Yuvy)),
            NativeEncoding::Yuyv => Box::new(YuvDecoder::new(YuvLayout::Yuyv)),
            NativeEncoding::Yyuv => Box::new(YuvDecoder::new(YuvLayout::Yyuv)),

            NativeEncoding::BayerGbrg => Box::new(RawBayerDecoder),
            NativeEncoding::BayerTv8532 => Box::new(Tv8532Decoder),
            NativeEncoding::SonixPacked => Box::new(SonixDecoder::new(&self.sonix)),
        }
    }
}

impl PictureState {
    fn snapshot(&self) -> PictureSnapshot {
        PictureSnapshot { settings: self.settings, tables: Arc::clone(&self.tables) }
    }
}
