//! Shared handler state.

use std::sync::Arc;
use std::time::Instant;

use payproof_store::ConsumptionStore;
use payproof_verification::VerificationEngine;

/// Everything a request handler needs. Cheap to clone behind an `Arc`.
pub struct AppState {
    pub engine: Arc<VerificationEngine>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(engine: Arc<VerificationEngine>) -> Self {
        Self {
            engine,
            started_at: Instant::now(),
        }
    }

    pub fn store(&self) -> &Arc<dyn ConsumptionStore> {
        self.engine.store()
    }
}
