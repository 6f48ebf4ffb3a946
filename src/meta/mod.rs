
//! Describes a frame without looking at its pixels:
//! the native encoding, the requested output format, and the frame geometry.

pub mod encoding;
pub mod geometry;

pub use self::encoding::{NativeEncoding, OutputFormat, Sampling};
pub use self::geometry::{Crop, FrameGeometry, Window};
