//! Executor module for filesystem side effects

pub mod mkdir;
pub mod rsync;

pub use mkdir::{create_parent, ensure_parent, ParentStatus};
pub use rsync::{sync_path, SyncInvocation};

/// Statistics for one reconciliation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Records processed.
    pub records: usize,
    /// Sync tool invocations attempted.
    pub invocations: usize,
    /// Parent directories created (or that would be, in a dry run).
    pub directories_created: usize,
    /// Directory creations and invocations that failed.
    pub failed_steps: usize,
}

impl RunStats {
    /// Fold one step's outcome into the totals
    pub fn record_step(&mut self, ok: bool) {
        if !ok {
            self.failed_steps += 1;
        }
    }

    /// True only if every step of every record succeeded
    pub fn is_success(&self) -> bool {
        self.failed_steps == 0
    }
}
