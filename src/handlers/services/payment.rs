//! Payment modal: proof upload, preview and the final submission.

use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum_extra::extract::cookie::CookieJar;

use crate::config::UPLOAD_BODY_LIMIT;
use crate::domain::ProofAsset;
use crate::session::{self, Flash};
use crate::state::AppState;
use crate::submission::{self, SUCCESS_NOTICE};
use crate::validation::FileConstraintError;
use crate::wizard::{Effect, WizardEvent};

use super::{back_to_services, flash};

/// User-facing message for a multipart read failure.
///
/// Bodies over the request limit are reported like any other oversized proof.
fn read_error(e: MultipartError) -> String {
  if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
    FileConstraintError::TooLarge {
      size: UPLOAD_BODY_LIMIT,
    }
    .to_string()
  } else {
    format!("Failed to read upload: {}", e)
  }
}

/// Extract the `proof` file from a multipart upload.
///
/// Browsers send an empty part when no file was picked; that reads as `None`.
async fn extract_proof(multipart: &mut Multipart) -> Result<Option<ProofAsset>, String> {
  while let Some(field) = multipart.next_field().await.map_err(read_error)? {
    if field.name().unwrap_or_default() != "proof" {
      continue;
    }
    let file_name = field.file_name().unwrap_or_default().to_string();
    let content_type = field
      .content_type()
      .unwrap_or("application/octet-stream")
      .to_string();
    let bytes = field.bytes().await.map_err(read_error)?;

    if file_name.is_empty() && bytes.is_empty() {
      return Ok(None);
    }
    return Ok(Some(ProofAsset::new(file_name, content_type, bytes.to_vec())));
  }
  Ok(None)
}

/// Attach (or replace) the proof image and show its preview
pub async fn attach_proof(
  State(state): State<AppState>,
  jar: CookieJar,
  mut multipart: Multipart,
) -> impl IntoResponse {
  let (jar, visitor) = session::ensure_visitor(jar);

  let proof = match extract_proof(&mut multipart).await {
    Ok(Some(proof)) => proof,
    Ok(None) => {
      flash(&state, &visitor, Flash::Error(FileConstraintError::Missing.to_string()));
      return back_to_services(jar);
    }
    Err(e) => {
      tracing::warn!("Proof upload failed: {}", e);
      flash(&state, &visitor, Flash::Error(e));
      return back_to_services(jar);
    }
  };

  let file_name = proof.file_name.clone();
  let result = state
    .visitors
    .with_visitor(&visitor, |entry| entry.wizard.apply(WizardEvent::AttachProof(proof)));

  match result {
    Ok(_) => tracing::debug!("Attached proof {} for visitor", file_name),
    Err(e) => {
      tracing::debug!("Proof {} rejected: {}", file_name, e);
      flash(&state, &visitor, Flash::Error(e.to_string()));
    }
  }

  back_to_services(jar)
}

/// "Submit & Finish": upload the proof, insert the registration, reset the wizard.
///
/// The form may carry the proof itself; otherwise the previously attached one
/// is used. The visitor lock is released while the gateway calls run.
pub async fn submit_payment(
  State(state): State<AppState>,
  jar: CookieJar,
  mut multipart: Multipart,
) -> impl IntoResponse {
  let (jar, visitor) = session::ensure_visitor(jar);

  let proof = match extract_proof(&mut multipart).await {
    Ok(proof) => proof,
    Err(e) => {
      tracing::warn!("Proof upload failed: {}", e);
      flash(&state, &visitor, Flash::Error(e));
      return back_to_services(jar);
    }
  };

  let begun = state.visitors.with_visitor(&visitor, |entry| {
    if let Some(proof) = proof {
      entry.wizard.apply(WizardEvent::AttachProof(proof))?;
    }
    entry.wizard.apply(WizardEvent::BeginSubmission)
  });

  let (ticket, request) = match begun {
    Ok(Effect::Submit { ticket, request }) => (ticket, request),
    Ok(Effect::None) => return back_to_services(jar),
    Err(e) => {
      tracing::debug!("Submission not started: {}", e);
      flash(&state, &visitor, Flash::Error(e.to_string()));
      return back_to_services(jar);
    }
  };

  let outcome =
    submission::submit_registration(state.gateway.as_ref(), state.proof_bucket(), &request).await;

  let message = match outcome {
    Ok(_) => Flash::Notice(SUCCESS_NOTICE.to_string()),
    Err(e) => {
      tracing::error!("Submission failed: {}", e);
      Flash::Error(e.user_message())
    }
  };

  state.visitors.with_visitor(&visitor, |entry| {
    // Cleanup runs whatever the outcome, unless the visitor has moved on
    if let Err(e) = entry.wizard.apply(WizardEvent::FinishSubmission(ticket)) {
      tracing::debug!("Submission finished after the wizard changed: {}", e);
    }
    entry.flash = Some(message);
  });

  back_to_services(jar)
}
