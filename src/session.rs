//! In-memory visitor storage for the registration wizard.
//!
//! Each browser gets a random visitor id in a cookie. The id keys the
//! visitor's wizard, the catalog loaded on their last Services page view and
//! a one-shot flash message. Entries expire after a period of inactivity,
//! sooner while they hold an unsent proof image, and the number of entries is
//! capped.

use axum_extra::extract::cookie::{Cookie, CookieJar};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::config;
use crate::domain::{RegistrationForm, Service};
use crate::wizard::Wizard;

pub const VISITOR_COOKIE_NAME: &str = "berryray_visitor";

/// One-shot message shown on the next Services page render
#[derive(Debug, Clone, PartialEq)]
pub enum Flash {
  Notice(String),
  Error(String),
  /// Registration form rejected; input is echoed back for correction
  FormRejected {
    message: String,
    input: RegistrationForm,
  },
}

/// Per-visitor state
#[derive(Debug, Default)]
pub struct VisitorEntry {
  pub wizard: Wizard,
  /// Catalog from the visitor's last page load; wizard choices resolve against it
  pub catalog: Vec<Service>,
  pub flash: Option<Flash>,
}

struct Slot {
  entry: VisitorEntry,
  last_access: DateTime<Utc>,
}

#[derive(Clone)]
pub struct VisitorStore {
  slots: Arc<Mutex<HashMap<String, Slot>>>,
  ttl: Duration,
  /// Shorter TTL for entries holding a proof image
  proof_ttl: Duration,
  capacity: usize,
}

impl VisitorStore {
  pub fn new(ttl: Duration) -> Self {
    Self::with_limits(
      ttl,
      Duration::minutes(config::PROOF_TTL_MINUTES),
      config::MAX_VISITORS,
    )
  }

  /// `proof_ttl` never exceeds `ttl`; a zero capacity is treated as one
  pub fn with_limits(ttl: Duration, proof_ttl: Duration, capacity: usize) -> Self {
    Self {
      slots: Arc::new(Mutex::new(HashMap::new())),
      ttl,
      proof_ttl: proof_ttl.min(ttl),
      capacity: capacity.max(1),
    }
  }

  fn lock(&self) -> MutexGuard<'_, HashMap<String, Slot>> {
    self.slots.lock().unwrap_or_else(PoisonError::into_inner)
  }

  /// Run `f` against the visitor's entry, creating it when missing.
  ///
  /// The store lock is held for the duration of `f`, so `f` must not block.
  pub fn with_visitor<R>(&self, visitor_id: &str, f: impl FnOnce(&mut VisitorEntry) -> R) -> R {
    let mut slots = self.lock();

    // Clean up expired visitors occasionally (~10% chance)
    if rand::random::<u8>() < config::VISITOR_CLEANUP_THRESHOLD {
      self.cleanup_expired(&mut slots);
    }

    if !slots.contains_key(visitor_id) && slots.len() >= self.capacity {
      self.make_room(&mut slots);
    }

    let slot = slots.entry(visitor_id.to_string()).or_insert_with(|| Slot {
      entry: VisitorEntry::default(),
      last_access: Utc::now(),
    });
    slot.last_access = Utc::now();
    f(&mut slot.entry)
  }

  pub fn len(&self) -> usize {
    self.lock().len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Drop visitors idle for longer than the TTL
  pub fn prune(&self) -> usize {
    let mut slots = self.lock();
    self.cleanup_expired(&mut slots)
  }

  fn cleanup_expired(&self, slots: &mut HashMap<String, Slot>) -> usize {
    let now = Utc::now();
    let expiry = now - self.ttl;
    let proof_expiry = now - self.proof_ttl;
    let before = slots.len();
    slots.retain(|_, slot| {
      if slot.entry.wizard.holds_proof() {
        slot.last_access > proof_expiry
      } else {
        slot.last_access > expiry
      }
    });
    let removed = before - slots.len();
    if removed > 0 {
      tracing::debug!("Pruned {} idle visitors", removed);
    }
    removed
  }

  /// Free one slot: expired entries first, else the least recently seen visitor
  fn make_room(&self, slots: &mut HashMap<String, Slot>) {
    if self.cleanup_expired(slots) > 0 && slots.len() < self.capacity {
      return;
    }
    let oldest = slots
      .iter()
      .min_by_key(|(_, slot)| slot.last_access)
      .map(|(id, _)| id.clone());
    if let Some(id) = oldest {
      slots.remove(&id);
      tracing::warn!("Visitor store full ({}), evicted least recent visitor", self.capacity);
    }
  }
}

/// Generate a new visitor ID
pub fn generate_visitor_id() -> String {
  use rand::Rng;
  let mut rng = rand::rng();
  (0..32)
    .map(|_| {
      let idx = rng.random_range(0..36);
      if idx < 10 {
        (b'0' + idx) as char
      } else {
        (b'a' + idx - 10) as char
      }
    })
    .collect()
}

fn is_well_formed(id: &str) -> bool {
  id.len() == 32 && id.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase())
}

/// Return the visitor id from the cookie jar, issuing a new cookie when absent
pub fn ensure_visitor(jar: CookieJar) -> (CookieJar, String) {
  if let Some(id) = jar
    .get(VISITOR_COOKIE_NAME)
    .map(|c| c.value().to_string())
    .filter(|id| is_well_formed(id))
  {
    return (jar, id);
  }

  let id = generate_visitor_id();
  let cookie = Cookie::build((VISITOR_COOKIE_NAME, id.clone()))
    .path("/")
    .http_only(true)
    .secure(false) // Set to true in production with HTTPS
    .same_site(axum_extra::extract::cookie::SameSite::Lax)
    .max_age(time::Duration::days(30))
    .build();
  (jar.add(cookie), id)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::{ProofAsset, RegistrationForm};
  use crate::gateway::memory::demo_services;
  use crate::wizard::WizardEvent;

  fn hold_proof(entry: &mut VisitorEntry) {
    let wizard = &mut entry.wizard;
    wizard
      .apply(WizardEvent::ChooseService(demo_services().remove(0)))
      .unwrap();
    wizard.apply(WizardEvent::ChoosePackage("1".into())).unwrap();
    wizard
      .apply(WizardEvent::SubmitForm(RegistrationForm {
        name: "Ada Obi".into(),
        email: "ada@example.com".into(),
        phone: String::new(),
        additional_info: String::new(),
      }))
      .unwrap();
    wizard
      .apply(WizardEvent::AttachProof(ProofAsset::new(
        "receipt.png",
        "image/png",
        vec![1, 2, 3],
      )))
      .unwrap();
  }

  #[test]
  fn test_visitor_id_format() {
    let id = generate_visitor_id();
    assert!(is_well_formed(&id));
    assert_ne!(id, generate_visitor_id());
  }

  #[test]
  fn test_ensure_visitor_issues_cookie_once() {
    let (jar, id) = ensure_visitor(CookieJar::new());
    assert_eq!(jar.get(VISITOR_COOKIE_NAME).map(|c| c.value()), Some(id.as_str()));

    let (_, again) = ensure_visitor(jar);
    assert_eq!(again, id);
  }

  #[test]
  fn test_ensure_visitor_replaces_malformed_cookie() {
    let jar = CookieJar::new().add(Cookie::new(VISITOR_COOKIE_NAME, "../../etc"));
    let (_, id) = ensure_visitor(jar);
    assert!(is_well_formed(&id));
  }

  #[test]
  fn test_visitors_are_isolated() {
    let store = VisitorStore::new(Duration::minutes(5));
    store.with_visitor("a", |entry| {
      entry
        .wizard
        .apply(WizardEvent::ChooseService(demo_services().remove(0)))
        .unwrap();
    });
    assert!(!store.with_visitor("a", |entry| entry.wizard.is_idle()));
    assert!(store.with_visitor("b", |entry| entry.wizard.is_idle()));
    assert_eq!(store.len(), 2);
  }

  #[test]
  fn test_prune_expired() {
    let store = VisitorStore::new(Duration::zero());
    store.with_visitor("a", |_| ());
    std::thread::sleep(std::time::Duration::from_millis(5));
    assert_eq!(store.prune(), 1);
    assert!(store.is_empty());
  }

  #[test]
  fn test_proof_entries_expire_sooner() {
    let store = VisitorStore::with_limits(Duration::minutes(60), Duration::milliseconds(200), 10);
    store.with_visitor("with-proof", hold_proof);
    store.with_visitor("browsing", |_| ());
    assert!(store.with_visitor("with-proof", |entry| entry.wizard.holds_proof()));

    std::thread::sleep(std::time::Duration::from_millis(300));
    assert_eq!(store.prune(), 1);
    assert_eq!(store.len(), 1);
    // The proof holder starts over; the browsing visitor is untouched
    assert!(store.with_visitor("with-proof", |entry| entry.wizard.is_idle()));
    assert_eq!(store.len(), 2);
  }

  #[test]
  fn test_capacity_evicts_least_recent() {
    let store = VisitorStore::with_limits(Duration::minutes(60), Duration::minutes(15), 2);
    store.with_visitor("a", |entry| entry.flash = Some(Flash::Notice("a".into())));
    std::thread::sleep(std::time::Duration::from_millis(5));
    store.with_visitor("b", |entry| entry.flash = Some(Flash::Notice("b".into())));
    std::thread::sleep(std::time::Duration::from_millis(5));
    // Touch "a" so "b" becomes the oldest
    store.with_visitor("a", |_| ());
    std::thread::sleep(std::time::Duration::from_millis(5));

    store.with_visitor("c", |_| ());
    assert_eq!(store.len(), 2);
    assert!(store.with_visitor("a", |entry| entry.flash.is_some()));
    assert!(store.with_visitor("b", |entry| entry.flash.is_none()));
  }
}
