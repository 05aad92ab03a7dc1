//! Input validation for the registration wizard.
//!
//! Two gates guard progression:
//! - the registration form (name, email, optional phone) before payment opens
//! - the proof-of-payment file (size and image type) before any upload

use regex::Regex;
use std::sync::LazyLock;

use crate::config::{ALLOWED_PROOF_TYPES, MAX_PROOF_BYTES};
use crate::domain::{ProofAsset, RegistrationDraft, RegistrationForm};

/// `local@domain.tld`: no whitespace, exactly one `@`, a dot in the domain part
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

// ============================================================================
// Error types
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
  #[error("Please enter your full name.")]
  MissingName,
  #[error("Please enter your email address.")]
  MissingEmail,
  #[error("Please enter a valid email address.")]
  InvalidEmail,
  #[error("Phone number may only contain digits, spaces, + and -.")]
  InvalidPhone,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FileConstraintError {
  #[error("Please upload proof of payment.")]
  Missing,
  /// `size` is the rejected length, or the body limit when the upload was cut off
  #[error("Proof of payment must be 5 MB or smaller.")]
  TooLarge { size: usize },
  #[error("Proof of payment must be a JPEG, PNG, WebP or GIF image.")]
  UnsupportedType { content_type: String },
}

// ============================================================================
// Registration form
// ============================================================================

pub fn is_valid_email(email: &str) -> bool {
  EMAIL_PATTERN.is_match(email)
}

pub fn is_valid_phone(phone: &str) -> bool {
  phone
    .chars()
    .all(|c| c.is_ascii_digit() || c == ' ' || c == '+' || c == '-')
}

/// Validate posted form input, producing the draft carried to the payment step.
///
/// Fields are trimmed; empty optional fields become `None`.
pub fn validate_registration(form: &RegistrationForm) -> Result<RegistrationDraft, ValidationError> {
  let name = form.name.trim();
  let email = form.email.trim();
  let phone = form.phone.trim();
  let additional_info = form.additional_info.trim();

  if name.is_empty() {
    return Err(ValidationError::MissingName);
  }
  if email.is_empty() {
    return Err(ValidationError::MissingEmail);
  }
  if !is_valid_email(email) {
    return Err(ValidationError::InvalidEmail);
  }
  if !is_valid_phone(phone) {
    return Err(ValidationError::InvalidPhone);
  }

  Ok(RegistrationDraft {
    name: name.to_string(),
    email: email.to_string(),
    phone: (!phone.is_empty()).then(|| phone.to_string()),
    additional_info: (!additional_info.is_empty()).then(|| additional_info.to_string()),
  })
}

// ============================================================================
// Proof file
// ============================================================================

/// Normalize a MIME type for comparison (`Image/JPEG; charset=x` -> `image/jpeg`)
fn essence(content_type: &str) -> String {
  content_type
    .split(';')
    .next()
    .unwrap_or_default()
    .trim()
    .to_ascii_lowercase()
}

pub fn validate_proof(proof: &ProofAsset) -> Result<(), FileConstraintError> {
  if proof.bytes.is_empty() {
    return Err(FileConstraintError::Missing);
  }
  if proof.size() > MAX_PROOF_BYTES {
    return Err(FileConstraintError::TooLarge { size: proof.size() });
  }
  let content_type = essence(&proof.content_type);
  if !ALLOWED_PROOF_TYPES.contains(&content_type.as_str()) {
    return Err(FileConstraintError::UnsupportedType { content_type });
  }
  Ok(())
}
