//! In-process [`DataGateway`] used by tests and by the site when no backend
//! is configured.
//!
//! Records every upload and insert so callers can assert on them, and can be
//! told to fail individual operations.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{DataGateway, GatewayError, StoredObject};
use crate::domain::{
  Banner, Package, PriceValue, ProofAsset, RecordId, RegistrationRecord, Service, Testimony,
};

/// Gateway operations that can be made to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
  FetchServices,
  Upload,
  Insert,
  FetchBanners,
  FetchTestimonies,
  FetchSiteMeta,
}

#[derive(Default)]
struct Inner {
  services: Vec<Service>,
  banners: Vec<Banner>,
  testimonies: Vec<Testimony>,
  site_meta: HashMap<String, String>,
  objects: HashMap<(String, String), ProofAsset>,
  registrations: Vec<RegistrationRecord>,
  failing: HashSet<Operation>,
  calls: HashMap<Operation, usize>,
}

#[derive(Default)]
pub struct MemoryGateway {
  inner: Mutex<Inner>,
}

impl MemoryGateway {
  pub fn new() -> Self {
    Self::default()
  }

  /// Gateway pre-filled with a small sample catalog for running the site locally
  pub fn demo() -> Self {
    Self::new().with_services(demo_services())
  }

  pub fn with_services(self, services: Vec<Service>) -> Self {
    self.lock().services = services;
    self
  }

  pub fn with_banners(self, banners: Vec<Banner>) -> Self {
    self.lock().banners = banners;
    self
  }

  pub fn with_testimonies(self, testimonies: Vec<Testimony>) -> Self {
    self.lock().testimonies = testimonies;
    self
  }

  pub fn with_site_meta(self, key: &str, value: &str) -> Self {
    self.lock().site_meta.insert(key.to_string(), value.to_string());
    self
  }

  /// Make `operation` fail until [`MemoryGateway::recover`] is called
  pub fn fail(&self, operation: Operation) {
    self.lock().failing.insert(operation);
  }

  pub fn recover(&self, operation: Operation) {
    self.lock().failing.remove(&operation);
  }

  pub fn registrations(&self) -> Vec<RegistrationRecord> {
    self.lock().registrations.clone()
  }

  pub fn stored_keys(&self) -> Vec<String> {
    let mut keys: Vec<String> = self.lock().objects.keys().map(|(_, key)| key.clone()).collect();
    keys.sort();
    keys
  }

  /// Number of times `operation` was attempted, including failed attempts
  pub fn calls(&self, operation: Operation) -> usize {
    self.lock().calls.get(&operation).copied().unwrap_or(0)
  }

  fn lock(&self) -> MutexGuard<'_, Inner> {
    self.inner.lock().unwrap_or_else(PoisonError::into_inner)
  }

  /// Count the call and report an injected failure
  fn begin(&self, operation: Operation) -> Result<MutexGuard<'_, Inner>, GatewayError> {
    let mut inner = self.lock();
    *inner.calls.entry(operation).or_default() += 1;
    if inner.failing.contains(&operation) {
      return Err(GatewayError::Unavailable(format!("{:?} is unavailable", operation)));
    }
    Ok(inner)
  }
}

#[async_trait]
impl DataGateway for MemoryGateway {
  async fn fetch_services(&self) -> Result<Vec<Service>, GatewayError> {
    let inner = self.begin(Operation::FetchServices)?;
    let mut services = inner.services.clone();
    services.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(services)
  }

  async fn upload_object(
    &self,
    bucket: &str,
    key: &str,
    proof: &ProofAsset,
  ) -> Result<StoredObject, GatewayError> {
    let mut inner = self.begin(Operation::Upload)?;
    let slot = (bucket.to_string(), key.to_string());
    if inner.objects.contains_key(&slot) {
      return Err(GatewayError::Status {
        status: 409,
        message: "The resource already exists".to_string(),
      });
    }
    inner.objects.insert(slot, proof.clone());
    Ok(StoredObject {
      path: key.to_string(),
    })
  }

  fn public_url(&self, bucket: &str, path: &str) -> String {
    format!("memory://{}/{}", bucket, path)
  }

  async fn insert_registration(&self, record: &RegistrationRecord) -> Result<(), GatewayError> {
    let mut inner = self.begin(Operation::Insert)?;
    inner.registrations.push(record.clone());
    Ok(())
  }

  async fn fetch_active_banners(&self) -> Result<Vec<Banner>, GatewayError> {
    Ok(self.begin(Operation::FetchBanners)?.banners.clone())
  }

  async fn fetch_public_testimonies(&self) -> Result<Vec<Testimony>, GatewayError> {
    Ok(self.begin(Operation::FetchTestimonies)?.testimonies.clone())
  }

  async fn fetch_site_meta(&self, key: &str) -> Result<Option<String>, GatewayError> {
    Ok(self.begin(Operation::FetchSiteMeta)?.site_meta.get(key).cloned())
  }
}

fn package(id: i64, name: &str, price: &str, desc: &str) -> Package {
  Package {
    id: RecordId::Int(id),
    name: name.to_string(),
    price: PriceValue::Text(price.to_string()),
    price_label: None,
    desc: Some(desc.to_string()),
  }
}

/// Sample catalog mirroring the services BerryRay offers
pub fn demo_services() -> Vec<Service> {
  vec![
    Service {
      id: RecordId::Int(1),
      title: "POST-UTME Registration".to_string(),
      summary: Some("Guided university screening registration, basic to premium.".to_string()),
      description: Some(
        "We handle your POST-UTME form, document uploads and follow-up so you never miss a deadline."
          .to_string(),
      ),
      packages: vec![
        package(1, "Basic", "5,000", "Form filling and submission"),
        package(2, "Standard", "10,000", "Basic plus document review"),
        package(3, "Premium", "15,000", "Standard plus on-site follow-up"),
      ],
    },
    Service {
      id: RecordId::Int(2),
      title: "CCTV & Surveillance Setup".to_string(),
      summary: Some("Camera installation for homes and small businesses.".to_string()),
      description: Some("Site survey, installation and remote viewing setup.".to_string()),
      packages: vec![
        package(4, "Home", "45,000", "Up to two cameras"),
        package(5, "Business", "120,000", "Up to six cameras with recorder"),
      ],
    },
    Service {
      id: RecordId::Int(3),
      title: "Web Development".to_string(),
      summary: Some("Landing pages and small business websites.".to_string()),
      description: Some("Design, build and deployment of responsive websites.".to_string()),
      packages: vec![package(6, "Landing Page", "60,000", "Single page with contact form")],
    },
  ]
}
