//! Proof upload and registration submission.
//!
//! The sequence is all-or-nothing from the visitor's point of view: a
//! registration row is only inserted after the proof image has been stored
//! and its public URL resolved.
//!
//! ```text
//! validate file -> storage key -> upload -> public url -> normalize price -> insert
//! ```

use chrono::Utc;

use crate::domain::{
  Package, ProofAsset, RegistrationDraft, RegistrationRecord, RegistrationStatus, Service,
};
use crate::gateway::{DataGateway, GatewayError};
use crate::validation::{self, FileConstraintError};

pub const SUCCESS_NOTICE: &str = "Registration submitted successfully! We will verify your payment soon.";

/// Everything needed to submit one registration
#[derive(Debug, Clone)]
pub struct SubmissionRequest {
  pub service: Service,
  pub package: Package,
  pub draft: RegistrationDraft,
  pub proof: ProofAsset,
}

#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
  #[error(transparent)]
  File(#[from] FileConstraintError),
  #[error("File upload failed: {0}")]
  Upload(#[source] GatewayError),
  #[error("Price data is corrupted or missing.")]
  Price { raw: String },
  #[error("Database insert failed: {0}")]
  Insert(#[source] GatewayError),
}

impl SubmissionError {
  /// Message shown to the visitor after an aborted submission
  pub fn user_message(&self) -> String {
    match self {
      Self::File(e) => e.to_string(),
      other => format!(
        "Submission failed. Please try again or contact support. Error: {}",
        other
      ),
    }
  }
}

/// Strip everything except ASCII digits and `.` and parse the rest.
///
/// `"15,000"` -> 15000, `"₦2,500.50"` -> 2500.5; text without digits fails.
pub fn normalize_price(raw: &str) -> Option<f64> {
  let cleaned: String = raw.chars().filter(|c| c.is_ascii_digit() || *c == '.').collect();
  cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Object key for a proof: `{serviceId}-{packageId}-{epochMillis}.{ext}`
pub fn storage_key(service: &Service, package: &Package, proof: &ProofAsset, epoch_millis: i64) -> String {
  format!(
    "{}-{}-{}.{}",
    service.id,
    package.id,
    epoch_millis,
    proof.extension()
  )
}

/// Run the full upload + insert sequence using the current time for the key
pub async fn submit_registration(
  gateway: &dyn DataGateway,
  bucket: &str,
  request: &SubmissionRequest,
) -> Result<RegistrationRecord, SubmissionError> {
  submit_registration_at(gateway, bucket, request, Utc::now().timestamp_millis()).await
}

pub async fn submit_registration_at(
  gateway: &dyn DataGateway,
  bucket: &str,
  request: &SubmissionRequest,
  epoch_millis: i64,
) -> Result<RegistrationRecord, SubmissionError> {
  let SubmissionRequest {
    service,
    package,
    draft,
    proof,
  } = request;

  validation::validate_proof(proof)?;

  let key = storage_key(service, package, proof, epoch_millis);
  let stored = gateway
    .upload_object(bucket, &key, proof)
    .await
    .map_err(SubmissionError::Upload)?;
  let payment_proof_url = gateway.public_url(bucket, &stored.path);
  tracing::debug!("Stored payment proof {} ({} bytes)", stored.path, proof.size());

  let raw_price = package.price.to_string();
  let package_price = match normalize_price(&raw_price) {
    Some(price) => price,
    None => {
      // The object stays in storage; nothing references it.
      tracing::error!(
        "Package {} has unusable price {:?}; proof {} left unreferenced",
        package.id,
        raw_price,
        stored.path
      );
      return Err(SubmissionError::Price { raw: raw_price });
    }
  };

  let record = RegistrationRecord {
    full_name: draft.name.clone(),
    email: draft.email.clone(),
    phone: draft.phone.clone(),
    additional_info: draft.additional_info.clone(),
    service_id: service.id.clone(),
    service_title: service.title.clone(),
    package_id: package.id.clone(),
    package_name: package.name.clone(),
    package_price,
    payment_proof_url,
    status: RegistrationStatus::Pending,
  };

  gateway
    .insert_registration(&record)
    .await
    .map_err(SubmissionError::Insert)?;

  tracing::info!(
    "Registration received for {} / {} ({})",
    service.title,
    package.name,
    stored.path
  );
  Ok(record)
}
