
//! Error type definitions.

use std::borrow::Cow;
use std::fmt;
use crate::meta::{NativeEncoding, OutputFormat};

pub use std::io::Error as IoError;
pub use std::io::Result as IoResult;

/// A result that may contain a decoding error.
pub type Result<T> = std::result::Result<T, Error>;

/// A result that, if ok, contains nothing, and otherwise contains a decoding error.
pub type UnitResult = Result<()>;


/// An error that may happen while decoding a camera frame.
/// Corrupted usb payloads are a normal occurrence,
/// so none of these indicate a bug in the caller or in this crate,
/// except `UnsupportedCombination`.
#[derive(Debug)]
pub enum Error {

    /// The hardware dimensions violate the block grid of the encoding,
    /// or the requested dimensions and crop margins do not fit into the hardware dimensions.
    BadDimensions(Cow<'static, str>),

    /// The vendor header embedded in the frame announces a different width
    /// than the camera was configured for.
    HeaderWidthMismatch {

        /// The configured hardware width.
        expected: usize,

        /// The width found in the frame.
        found: usize,
    },

    /// The entropy coded data did not contain the expected restart marker.
    WrongRestartMarker {

        /// The marker code that should have been next, `0xD0` to `0xD7`.
        expected: u8,

        /// The marker found instead, if any marker was found at all.
        found: Option<u8>,
    },

    /// A huffman code did not match any symbol within 16 bits,
    /// or a run of zero coefficients left the 8x8 block.
    BadHuffmanCode,

    /// The input ended before the frame was complete.
    Truncated(Cow<'static, str>),

    /// There is no way to produce the requested output format from the native encoding.
    UnsupportedCombination {

        /// The native encoding of the frame.
        encoding: NativeEncoding,

        /// The requested output format.
        format: OutputFormat,
    },

    /// The caller raised the abort flag while the frame was being decoded.
    Aborted,
}


impl Error {

    /// Create an error of the variant `BadDimensions`.
    pub(crate) fn bad_dimensions(message: impl Into<Cow<'static, str>>) -> Self {
        Error::BadDimensions(message.into())
    }

    /// Create an error of the variant `Truncated`.
    pub(crate) fn truncated(message: impl Into<Cow<'static, str>>) -> Self {
        Error::Truncated(message.into())
    }

    /// Whether this error was caused by the contents of this one frame.
    /// Such frames are silently dropped and the capture buffer is reused.
    /// Returns false for errors caused by the configuration of the caller.
    pub fn drops_frame(&self) -> bool {
        !matches!(self, Error::UnsupportedCombination { .. } | Error::Aborted)
    }
}


/// Enable using the `?` operator on io::Result.
/// Reading or writing frame bytes only fails when a slice ends too early.
impl From<IoError> for Error {
    fn from(error: IoError) -> Self {
        Error::truncated(error.to_string())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BadDimensions(message) => write!(formatter, "bad frame dimensions: {}", message),
            Error::HeaderWidthMismatch { expected, found } => write!(
                formatter, "corrupt frame: header announces width {} instead of {}", found, expected
            ),
            Error::WrongRestartMarker { expected, found: Some(found) } => write!(
                formatter, "wrong restart marker: expected 0x{:02X}, found 0x{:02X}", expected, found
            ),
            Error::WrongRestartMarker { expected, found: None } => write!(
                formatter, "wrong restart marker: expected 0x{:02X}, found no marker", expected
            ),
            Error::BadHuffmanCode => write!(formatter, "corrupt frame: invalid huffman code"),
            Error::Truncated(message) => write!(formatter, "truncated frame: {}", message),
            Error::UnsupportedCombination { encoding, format } => write!(
                formatter, "cannot produce {} from {}", format, encoding
            ),
            Error::Aborted => write!(formatter, "decoding aborted"),
        }
    }
}

impl std::error::Error for Error {}
