
//! The unit of work: one captured frame with its input and output buffers.

use crate::codec::ByteVec;
use crate::meta::{FrameGeometry, NativeEncoding, OutputFormat};


/// One frame of a camera, owning the bytes that arrived
/// and the pixels decoded from them.
/// The buffers are kept when the frame is recycled for the next capture.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {

    /// How the camera encoded the input.
    pub encoding: NativeEncoding,

    /// What the output should contain.
    pub format: OutputFormat,

    /// Hardware and requested size, and the crop margins between them.
    pub geometry: FrameGeometry,

    input: ByteVec,
    output: ByteVec,

    /// The number of valid output bytes, or none if the frame was not decoded successfully.
    scan_length: Option<usize>,
}


impl Frame {

    /// Prepare a frame for decoding. Does not look at the input yet.
    pub fn new(encoding: NativeEncoding, format: OutputFormat, geometry: FrameGeometry, input: ByteVec) -> Self {
        Frame { encoding, format, geometry, input, output: ByteVec::new(), scan_length: None }
    }

    /// The raw bytes received from the camera.
    pub fn input(&self) -> &[u8] {
        &self.input
    }

    /// The decoded bytes, if the last decode succeeded.
    pub fn output(&self) -> Option<&[u8]> {
        self.scan_length.map(|length| &self.output[.. length])
    }

    /// The number of valid output bytes, if the last decode succeeded.
    pub fn scan_length(&self) -> Option<usize> {
        self.scan_length
    }

    /// Replace the input with the next capture and return the previous input.
    /// Invalidates the output but keeps its allocation.
    pub fn recycle(&mut self, input: ByteVec) -> ByteVec {
        self.invalidate();
        std::mem::replace(&mut self.input, input)
    }

    /// Take the decoded bytes out of the frame, if the last decode succeeded.
    pub fn take_output(&mut self) -> Option<ByteVec> {
        let length = self.scan_length.take()?;
        let mut output = std::mem::take(&mut self.output);
        output.truncate(length);
        Some(output)
    }

    /// Split the frame into its input and output buffers.
    /// The output is empty unless the last decode succeeded.
    pub fn into_buffers(mut self) -> (ByteVec, ByteVec) {
        let output = self.take_output().unwrap_or_default();
        (self.input, output)
    }

    /// Forget the previous result and hand out both buffers for decoding.
    /// The output is emptied, so no bytes of an earlier frame can survive a failed decode.
    pub(crate) fn begin_decode(&mut self) -> (&[u8], &mut ByteVec) {
        self.invalidate();
        (&self.input, &mut self.output)
    }

    /// Mark the first bytes of the output as valid.
    pub(crate) fn finish_decode(&mut self, scan_length: usize) {
        debug_assert!(scan_length <= self.output.len(), "scan length exceeds output");
        self.scan_length = Some(scan_length);
    }

    /// Discard the output contents.
    pub(crate) fn invalidate(&mut self) {
        self.scan_length = None;
        self.output.clear();
    }
}
