pub mod catalog;
pub mod content;
pub mod registration;

pub use catalog::{find_service, Package, PriceValue, RecordId, Service};
pub use content::{Banner, Quote, Testimony};
pub use registration::{
  ProofAsset, RegistrationDraft, RegistrationForm, RegistrationRecord, RegistrationStatus,
};
