use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use super::catalog::RecordId;

/// Raw registration form input, exactly as posted by the browser
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct RegistrationForm {
  #[serde(default)]
  pub name: String,
  #[serde(default)]
  pub email: String,
  #[serde(default)]
  pub phone: String,
  #[serde(default)]
  pub additional_info: String,
}

/// Validated registration details held between the form and payment steps
#[derive(Debug, Clone, PartialEq)]
pub struct RegistrationDraft {
  pub name: String,
  pub email: String,
  pub phone: Option<String>,
  pub additional_info: Option<String>,
}

/// Uploaded proof-of-payment image, held in memory until submission
#[derive(Clone, PartialEq)]
pub struct ProofAsset {
  pub file_name: String,
  pub content_type: String,
  pub bytes: Vec<u8>,
}

impl ProofAsset {
  pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
    Self {
      file_name: file_name.into(),
      content_type: content_type.into(),
      bytes,
    }
  }

  pub fn size(&self) -> usize {
    self.bytes.len()
  }

  /// File extension for the storage key.
  ///
  /// Taken from the original file name; falls back to the MIME subtype when
  /// the name carries none. Only 1-5 ASCII alphanumerics ever reach the key.
  pub fn extension(&self) -> String {
    let from_name = self
      .file_name
      .rsplit_once('.')
      .filter(|(stem, _)| !stem.is_empty())
      .map(|(_, ext)| ext)
      .filter(|ext| is_safe_extension(ext));
    if let Some(ext) = from_name {
      return ext.to_ascii_lowercase();
    }

    let essence = self.content_type.split(';').next().unwrap_or_default().trim();
    match essence.rsplit_once('/').map(|(_, sub)| sub.to_ascii_lowercase()) {
      Some(sub) if sub == "jpeg" => "jpg".to_string(),
      Some(sub) if is_safe_extension(&sub) => sub,
      _ => "bin".to_string(),
    }
  }

  /// Display-only `data:` URL for previewing the image before it is uploaded
  pub fn preview_data_url(&self) -> String {
    format!("data:{};base64,{}", self.content_type, STANDARD.encode(&self.bytes))
  }
}

fn is_safe_extension(ext: &str) -> bool {
  (1..=5).contains(&ext.len()) && ext.bytes().all(|b| b.is_ascii_alphanumeric())
}

impl std::fmt::Debug for ProofAsset {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ProofAsset")
      .field("file_name", &self.file_name)
      .field("content_type", &self.content_type)
      .field("size", &self.bytes.len())
      .finish()
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationStatus {
  Pending,
}

/// Row written to `service_registrations`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegistrationRecord {
  pub full_name: String,
  pub email: String,
  pub phone: Option<String>,
  pub additional_info: Option<String>,
  pub service_id: RecordId,
  pub service_title: String,
  pub package_id: RecordId,
  pub package_name: String,
  pub package_price: f64,
  pub payment_proof_url: String,
  pub status: RegistrationStatus,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_extension_from_file_name() {
    let proof = ProofAsset::new("receipt.final.PNG", "image/png", vec![]);
    assert_eq!(proof.extension(), "png");
  }

  #[test]
  fn test_extension_falls_back_to_mime() {
    assert_eq!(ProofAsset::new("receipt", "image/jpeg", vec![]).extension(), "jpg");
    assert_eq!(ProofAsset::new(".hidden", "image/webp", vec![]).extension(), "webp");
  }

  #[test]
  fn test_extension_ignores_path_characters() {
    let proof = ProofAsset::new("receipt.png/../x?y#z", "image/png", vec![]);
    assert_eq!(proof.extension(), "png");

    let proof = ProofAsset::new("scan.jpeg2000x", "image/jpeg; charset=binary", vec![]);
    assert_eq!(proof.extension(), "jpg");

    let proof = ProofAsset::new("a.p%2F", "image/x-icon", vec![]);
    assert_eq!(proof.extension(), "bin");

    let proof = ProofAsset::new("photo.WebP", "image/webp", vec![]);
    assert_eq!(proof.extension(), "webp");
  }

  #[test]
  fn test_preview_data_url() {
    let proof = ProofAsset::new("a.gif", "image/gif", b"GIF89a".to_vec());
    assert_eq!(proof.preview_data_url(), "data:image/gif;base64,R0lGODlh");
  }

  #[test]
  fn test_record_serializes_pending_status() {
    let record = RegistrationRecord {
      full_name: "Ada".into(),
      email: "ada@example.com".into(),
      phone: None,
      additional_info: None,
      service_id: RecordId::Int(1),
      service_title: "Online Registration".into(),
      package_id: RecordId::Int(3),
      package_name: "Basic".into(),
      package_price: 15000.0,
      payment_proof_url: "https://x/y.png".into(),
      status: RegistrationStatus::Pending,
    };
    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json["status"], "pending");
    assert_eq!(json["service_id"], 1);
    assert!(json["phone"].is_null());
  }
}
