use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Hands out generation tickets. Only the most recently issued ticket is
/// current. `begin` supersedes the previous ticket; `cancel` retires the
/// current one and marks it cancelled.
#[derive(Debug, Clone, Default)]
pub struct RunCoordinator {
    generation: Arc<AtomicU64>,
    latest_cancelled: Arc<Mutex<Arc<AtomicBool>>>,
}

impl RunCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) -> RunTicket {
        let cancelled = Arc::new(AtomicBool::new(false));
        let mut latest = self
            .latest_cancelled
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *latest = Arc::clone(&cancelled);

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!("Starting run generation {}", generation);
        RunTicket {
            generation,
            current: Arc::clone(&self.generation),
            cancelled,
        }
    }

    pub fn cancel(&self) {
        let latest = self
            .latest_cancelled
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        latest.store(true, Ordering::SeqCst);

        let retired = self.generation.fetch_add(1, Ordering::SeqCst);
        tracing::debug!("Cancelled run generation {}", retired);
    }
}

#[derive(Debug, Clone)]
pub struct RunTicket {
    generation: u64,
    current: Arc<AtomicU64>,
    cancelled: Arc<AtomicBool>,
}

impl RunTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_current(&self) -> bool {
        self.current.load(Ordering::SeqCst) == self.generation
    }

    /// True only when this ticket was retired by `cancel`, not by a newer `begin`.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
