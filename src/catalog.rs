//! Catalog loading for the Services page.

use crate::gateway::{DataGateway, GatewayError};
use crate::domain::Service;

#[derive(Debug, thiserror::Error)]
#[error("Failed to load services: {0}")]
pub struct CatalogLoadError(#[from] pub GatewayError);

/// Outcome of one catalog read
#[derive(Debug, Clone, PartialEq)]
pub enum Catalog {
  Loaded(Vec<Service>),
  /// The read succeeded but returned no services
  Empty,
  /// The read failed; the page offers a manual refresh
  Unavailable,
}

impl Catalog {
  pub fn services(&self) -> &[Service] {
    match self {
      Self::Loaded(services) => services,
      Self::Empty | Self::Unavailable => &[],
    }
  }

  pub fn into_services(self) -> Vec<Service> {
    match self {
      Self::Loaded(services) => services,
      Self::Empty | Self::Unavailable => Vec::new(),
    }
  }

  pub fn is_empty(&self) -> bool {
    self.services().is_empty()
  }
}

/// Read all services with their packages.
///
/// Errors are propagated so callers can decide how to surface them; see
/// [`load_catalog`] for the page-level behavior.
pub async fn fetch_catalog(gateway: &dyn DataGateway) -> Result<Vec<Service>, CatalogLoadError> {
  Ok(gateway.fetch_services().await?)
}

/// Load the catalog once for a page activation. No retry: a failed read
/// leaves the catalog empty until the visitor reloads.
pub async fn load_catalog(gateway: &dyn DataGateway) -> Catalog {
  match fetch_catalog(gateway).await {
    Ok(services) if services.is_empty() => Catalog::Empty,
    Ok(services) => {
      tracing::debug!("Loaded {} services", services.len());
      Catalog::Loaded(services)
    }
    Err(e) => {
      tracing::warn!("{}", e);
      Catalog::Unavailable
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::gateway::MemoryGateway;
  use crate::gateway::memory::{Operation, demo_services};

  #[tokio::test]
  async fn test_load_catalog_success() {
    let gateway = MemoryGateway::new().with_services(demo_services());
    let catalog = load_catalog(&gateway).await;
    assert_eq!(catalog.services().len(), 3);
    assert_eq!(gateway.calls(Operation::FetchServices), 1);
  }

  #[tokio::test]
  async fn test_load_catalog_empty() {
    let gateway = MemoryGateway::new();
    let catalog = load_catalog(&gateway).await;
    assert_eq!(catalog, Catalog::Empty);
    assert!(catalog.is_empty());
  }

  #[tokio::test]
  async fn test_load_catalog_failure_is_not_retried() {
    let gateway = MemoryGateway::demo();
    gateway.fail(Operation::FetchServices);
    let catalog = load_catalog(&gateway).await;
    assert_eq!(catalog, Catalog::Unavailable);
    assert!(catalog.into_services().is_empty());
    assert_eq!(gateway.calls(Operation::FetchServices), 1);
  }
}
