//! Test utilities for running the site against the in-memory backend.
//!
//! Shared by unit tests and the router tests under `tests/`, so the wiring
//! matches what `main` builds apart from the gateway.

use axum::Router;
use std::sync::Arc;

use crate::config::SiteConfig;
use crate::gateway::MemoryGateway;
use crate::routes;
use crate::state::AppState;

/// PNG signature followed by a few bytes; enough for the type and size checks
pub const TINY_PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0, 0, 0, 0x0d];

/// Application wired to a [`MemoryGateway`] the test keeps a handle to.
pub struct TestApp {
    /// Backend handle for injecting failures and inspecting writes
    pub gateway: Arc<MemoryGateway>,
    pub state: AppState,
}

impl TestApp {
    /// Site backed by the demo catalog
    pub fn new() -> Self {
        Self::with_gateway(MemoryGateway::demo())
    }

    pub fn with_gateway(gateway: MemoryGateway) -> Self {
        let gateway = Arc::new(gateway);
        let state = AppState::new(SiteConfig::default(), gateway.clone());
        Self { gateway, state }
    }

    pub fn router(&self) -> Router {
        routes::router(self.state.clone())
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}
