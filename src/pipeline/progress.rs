//! Incremental progress reporting for long frame sequences.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Which per-frame stage is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Encoding: bit chunks are painted into frames.
    Rendering,
    /// Decoding: frames are read back into bits.
    Sampling,
}

/// One progress update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// Stage reporting the update.
    pub stage: Stage,
    /// Frames finished so far.
    pub done: usize,
    /// Frames in this stage.
    pub total: usize,
}

/// Progress callback. Called from rayon worker threads, so updates may
/// arrive out of order.
pub type ProgressFn<'a> = &'a (dyn Fn(Progress) + Sync);

/// Counts completed frames for one stage.
pub(crate) struct Tracker<'a> {
    stage: Stage,
    total: usize,
    done: AtomicUsize,
    callback: Option<ProgressFn<'a>>,
}

impl<'a> Tracker<'a> {
    pub(crate) fn new(stage: Stage, total: usize, callback: Option<ProgressFn<'a>>) -> Self {
        Self {
            stage,
            total,
            done: AtomicUsize::new(0),
            callback,
        }
    }

    pub(crate) fn advance(&self) {
        let done = self.done.fetch_add(1, Ordering::Relaxed) + 1;
        if let Some(callback) = self.callback {
            callback(Progress {
                stage: self.stage,
                done,
                total: self.total,
            });
        }
    }

    #[cfg(test)]
    pub(crate) fn done(&self) -> usize {
        self.done.load(Ordering::Relaxed)
    }
}
