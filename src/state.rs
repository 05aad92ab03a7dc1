//! Application state shared by all handlers.

use std::sync::Arc;

use crate::config::SiteConfig;
use crate::gateway::DataGateway;
use crate::session::VisitorStore;

/// Application state passed to all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<SiteConfig>,

    /// Remote backend (Supabase in production, in-memory in demo mode and tests)
    pub gateway: Arc<dyn DataGateway>,

    /// Per-visitor wizard state
    pub visitors: VisitorStore,
}

impl AppState {
    pub fn new(config: SiteConfig, gateway: Arc<dyn DataGateway>) -> Self {
        let visitors = VisitorStore::new(chrono::Duration::minutes(config.wizard_ttl_minutes));
        Self {
            config: Arc::new(config),
            gateway,
            visitors,
        }
    }

    /// Bucket receiving payment proofs
    pub fn proof_bucket(&self) -> &str {
        &self.config.proof_bucket
    }
}
