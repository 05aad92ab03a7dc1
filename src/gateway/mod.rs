//! Boundary to the hosted backend (relational tables + object storage).
//!
//! Everything the site reads or writes remotely goes through [`DataGateway`].
//! [`SupabaseGateway`] talks to a Supabase project over its REST APIs;
//! [`MemoryGateway`] keeps everything in process for tests and offline demos.

pub mod memory;
pub mod supabase;

use async_trait::async_trait;

use crate::domain::{Banner, ProofAsset, RegistrationRecord, Service, Testimony};

pub use memory::MemoryGateway;
pub use supabase::SupabaseGateway;

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
  #[error("request failed: {0}")]
  Http(#[from] reqwest::Error),
  #[error("{message} (HTTP {status})")]
  Status { status: u16, message: String },
  #[error("unexpected response: {0}")]
  Decode(#[from] serde_json::Error),
  #[error("{0}")]
  Unavailable(String),
}

/// Object written to storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
  /// Key of the object inside its bucket
  pub path: String,
}

#[async_trait]
pub trait DataGateway: Send + Sync {
  /// All services with nested packages, ordered by id ascending
  async fn fetch_services(&self) -> Result<Vec<Service>, GatewayError>;

  /// Store a new object; fails if the key already exists
  async fn upload_object(
    &self,
    bucket: &str,
    key: &str,
    proof: &ProofAsset,
  ) -> Result<StoredObject, GatewayError>;

  /// Publicly resolvable URL of a stored object
  fn public_url(&self, bucket: &str, path: &str) -> String;

  async fn insert_registration(&self, record: &RegistrationRecord) -> Result<(), GatewayError>;

  async fn fetch_active_banners(&self) -> Result<Vec<Banner>, GatewayError>;

  async fn fetch_public_testimonies(&self) -> Result<Vec<Testimony>, GatewayError>;

  /// Raw `value` of a site_meta row, `None` when the key is absent
  async fn fetch_site_meta(&self, key: &str) -> Result<Option<String>, GatewayError>;
}
