//! # Application State
//!
//! Shared state passed to route handlers via the `State` extractor. Both
//! members sit behind trait objects so tests can swap in stubs.

use std::sync::Arc;

use agentops_schema::{EventValidator, PayloadValidator};

use crate::store::EventStore;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub validator: Arc<dyn PayloadValidator>,
    pub store: Arc<dyn EventStore>,
}

impl AppState {
    pub fn new(validator: Arc<dyn PayloadValidator>, store: Arc<dyn EventStore>) -> Self {
        Self { validator, store }
    }

    /// State with no schema loaded. Every payload is rejected with the
    /// not-configured violation at the document root.
    pub fn unconfigured(store: Arc<dyn EventStore>) -> Self {
        Self::new(Arc::new(None::<EventValidator>), store)
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}
