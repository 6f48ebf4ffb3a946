
//! Decodes batches of independent frames on a thread pool.
//! Each frame is still decoded by a single thread.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::mpsc;
use crate::decoder::DecoderContext;
use crate::error::UnitResult;
use crate::frame::Frame;


/// Decodes many frames at once, sharing one decoder context.
/// Falls back to decoding one frame after another
/// if no thread pool can be created on this platform.
#[derive(Debug)]
pub struct ParallelFrameDecoder {
    context: Arc<DecoderContext>,
    pool: Option<rayon_core::ThreadPool>,
}


impl ParallelFrameDecoder {

    /// Create a thread pool with one thread per cpu.
    pub fn new(context: Arc<DecoderContext>) -> Self {
        let pool = rayon_core::ThreadPoolBuilder::new()
            .thread_name(|index| format!("spcadec frame decoder #{}", index))
            .build();

        let pool = match pool {
            Ok(pool) => Some(pool),
            Err(error) => {
                log::debug!("decoding frames sequentially, as no thread pool could be created: {}", error);
                None
            }
        };

        ParallelFrameDecoder { context, pool }
    }

    /// The shared context, which can be used to change the picture settings.
    pub fn context(&self) -> &Arc<DecoderContext> {
        &self.context
    }

    /// Whether frames are actually decoded on multiple threads.
    pub fn is_parallel(&self) -> bool {
        self.pool.is_some()
    }

    /// Decode all frames. The results are in the same order as the frames.
    pub fn decode_frames(&self, frames: &mut [Frame]) -> Vec<UnitResult> {
        self.decode_frames_with_abort(frames, &AtomicBool::new(false))
    }

    /// Decode all frames, stopping every unfinished frame once the flag is raised.
    pub fn decode_frames_with_abort(&self, frames: &mut [Frame], abort: &AtomicBool) -> Vec<UnitResult> {
        let context: &DecoderContext = &self.context;

        let pool = match &self.pool {
            Some(pool) if frames.len() > 1 => pool,
            _ => return frames.iter_mut()
                .map(|frame| context.decode_frame_with_abort(frame, abort))
                .collect(),
        };

        let (sender, receiver) = mpsc::channel();

        // the sender is moved into the scope, so the channel closes once all jobs are done
        pool.scope_fifo(move |scope| {
            for (index, frame) in frames.iter_mut().enumerate() {
                let sender = sender.clone();

                scope.spawn_fifo(move |_| {
                    let result = context.decode_frame_with_abort(frame, abort);

                    // the receiver outlives the scope
                    let _ = sender.send((index, result));
                });
            }
        });

        let mut results: Vec<(usize, UnitResult)> = receiver.into_iter().collect();
        results.sort_by_key(|&(index, _)| index);
        results.into_iter().map(|(_, result)| result).collect()
    }
}
