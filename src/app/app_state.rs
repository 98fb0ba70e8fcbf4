//! Usage: Shared Tauri state types used by `commands/*` and the launch sequence.

use crate::backend;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

#[derive(Default)]
pub(crate) struct BackendState {
    pub(crate) manager: Mutex<backend::BackendManager>,
    launch_in_flight: AtomicBool,
}

impl BackendState {
    /// Claim the single launch slot. `true` means the caller owns the
    /// sequence until it calls [`finish_launch`](Self::finish_launch).
    pub(crate) fn try_begin_launch(&self) -> bool {
        !self.launch_in_flight.swap(true, Ordering::SeqCst)
    }

    pub(crate) fn finish_launch(&self) {
        self.launch_in_flight.store(false, Ordering::SeqCst);
    }

    pub(crate) fn launch_in_progress(&self) -> bool {
        self.launch_in_flight.load(Ordering::SeqCst)
    }
}
