//! Runtime control handles shared with the control plane

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use contracts::JobId;

/// Enable/disable switch for batch generation
///
/// Cloned handles share one flag. The generator reads it once per cycle;
/// a control-plane handler flips it at any time.
#[derive(Debug, Clone)]
pub struct BatchSwitch {
    enabled: Arc<AtomicBool>,
}

impl BatchSwitch {
    /// New switch, enabled
    pub fn new() -> Self {
        Self {
            enabled: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn enable(&self) {
        self.set(true);
    }

    pub fn disable(&self) {
        self.set(false);
    }

    pub fn set(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }
}

impl Default for BatchSwitch {
    fn default() -> Self {
        Self::new()
    }
}

/// Current job id, shared between the worker and the generator
#[derive(Debug, Clone, Default)]
pub struct JobTracker {
    current: Arc<AtomicU64>,
}

impl JobTracker {
    pub fn new(initial: JobId) -> Self {
        Self {
            current: Arc::new(AtomicU64::new(initial)),
        }
    }

    pub fn current(&self) -> JobId {
        self.current.load(Ordering::SeqCst)
    }

    pub fn set(&self, job_id: JobId) {
        self.current.store(job_id, Ordering::SeqCst);
    }

    /// Move to the next job and return its id
    pub fn advance(&self) -> JobId {
        self.current.fetch_add(1, Ordering::SeqCst) + 1
    }
}
