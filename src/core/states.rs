//! # Worker lifecycle table.
//!
//! One atomic cell per worker, written only by that worker and read by
//! anyone. Used for snapshots and to name stuck workers when a graceful
//! shutdown runs out of time.
//!
//! ```text
//! Idle ──recv item──► Processing ──handler done──► Idle
//!   └──────────channel closed & drained─────────────► Terminated
//! ```

use std::sync::atomic::{AtomicU8, Ordering};

/// Lifecycle state of a pool worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    /// Waiting for the next item.
    Idle,
    /// Running the handler on an item.
    Processing,
    /// Observed closure, drained, and exited.
    Terminated,
}

impl WorkerState {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => WorkerState::Idle,
            1 => WorkerState::Processing,
            _ => WorkerState::Terminated,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            WorkerState::Idle => 0,
            WorkerState::Processing => 1,
            WorkerState::Terminated => 2,
        }
    }
}

/// Per-worker state cells, indexed by worker id.
pub(crate) struct WorkerStates {
    cells: Vec<AtomicU8>,
}

impl WorkerStates {
    pub(crate) fn new(workers: usize) -> Self {
        Self {
            cells: (0..workers)
                .map(|_| AtomicU8::new(WorkerState::Idle.as_u8()))
                .collect(),
        }
    }

    pub(crate) fn set(&self, id: usize, state: WorkerState) {
        if let Some(cell) = self.cells.get(id) {
            cell.store(state.as_u8(), Ordering::Release);
        }
    }

    pub(crate) fn snapshot(&self) -> Vec<WorkerState> {
        self.cells
            .iter()
            .map(|c| WorkerState::from_u8(c.load(Ordering::Acquire)))
            .collect()
    }

    /// Ids of workers that have not terminated, ascending.
    pub(crate) fn running(&self) -> Vec<usize> {
        self.snapshot()
            .into_iter()
            .enumerate()
            .filter(|(_, s)| *s != WorkerState::Terminated)
            .map(|(id, _)| id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_running_excludes_terminated() {
        let states = WorkerStates::new(3);
        states.set(0, WorkerState::Terminated);
        states.set(1, WorkerState::Processing);
        assert_eq!(states.running(), vec![1, 2]);
        assert_eq!(
            states.snapshot(),
            vec![
                WorkerState::Terminated,
                WorkerState::Processing,
                WorkerState::Idle
            ]
        );
    }
}
