use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

//------------ AbortFlag -----------------------------------------------------

/// Cooperative cancellation handle for a mining run.
///
/// Cloning is cheap and all clones observe the same flag, so one clone
/// can be moved into a signal handler while another is passed to
/// [`mine_with_flag`](crate::mine_with_flag). Setting the flag is
/// async-signal-safe: it is a single atomic store, nothing else.
///
/// The miner checks the flag at every top-level branch and on entry to
/// every recursive projection, and unwinds with
/// [`MineError::Aborted`](crate::MineError::Aborted) once it is set.
#[derive(Clone, Debug, Default)]
pub struct AbortFlag(Arc<AtomicBool>);

impl AbortFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Safe to call from a signal handler.
    pub fn set(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}
