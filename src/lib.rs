
//! Decode the raw frames of spca5xx webcam bridges.
//!
//! The cameras send baseline jpeg scans without headers, uncompressed yuv,
//! plain or line framed bayer mosaics, and delta coded Sonix mosaics.
//! This crate turns such a frame into rgb565, rgb24, rgb32 or planar yuv 4:2:0 pixels,
//! applying gamma and color correction and cropping the hardware frame to the requested size.
//! Jpeg frames can also be restored to complete jpeg files instead.
//!
//! Create one `DecoderContext` per camera session and pass every `Frame` to `decode_frame`.

#![forbid(unsafe_code)]
#![warn(
    rust_2018_idioms,
    future_incompatible,
    unused_extern_crates,
    unused_must_use,
)]


pub mod io;
pub mod math;
pub mod meta;
pub mod error;
pub mod picture;
pub mod codec;
pub mod composite;
pub mod frame;
pub mod decoder;

#[cfg(feature = "rayon")]
pub mod parallel;


pub mod prelude {
    // main exports
    pub use crate::decoder::{DecoderContext, DecoderOptions, PictureSnapshot};
    pub use crate::frame::Frame;

    #[cfg(feature = "rayon")]
    pub use crate::parallel::ParallelFrameDecoder;

    // core data types
    pub use crate::meta::{NativeEncoding, OutputFormat, FrameGeometry, Crop};
    pub use crate::picture::{PictureSettings, ChannelCorrection};
    pub use crate::math::Vec2;

    // secondary data types
    pub use crate::meta;
    pub use crate::error::{self, Error, Result, UnitResult};
}
