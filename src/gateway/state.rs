use std::sync::Arc;

use crate::engine::LedgerEngine;

/// Shared gateway state.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<LedgerEngine>,
}

impl AppState {
    pub fn new(engine: Arc<LedgerEngine>) -> Self {
        Self { engine }
    }
}
