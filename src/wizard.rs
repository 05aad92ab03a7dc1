//! Registration wizard state machine.
//!
//! One [`Wizard`] per visitor tracks which step of the Services flow is open:
//!
//! ```text
//! Idle -> PackagesOpen -> FormOpen -> PaymentOpen -> Idle
//!   ^________________________|____________|  (cancel / backdrop)
//! ```
//!
//! Exactly one state is active at a time and it only changes through
//! [`Wizard::apply`]. A rejected event leaves the state untouched.
//! `FinishSubmission` only lands on the submission that issued its ticket.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::domain::{Package, ProofAsset, RegistrationDraft, RegistrationForm, Service};
use crate::submission::SubmissionRequest;
use crate::validation::{self, FileConstraintError, ValidationError};

#[derive(Debug, Clone, Default, PartialEq)]
pub enum WizardState {
  #[default]
  Idle,
  PackagesOpen {
    service: Service,
  },
  FormOpen {
    service: Service,
    package: Package,
  },
  PaymentOpen {
    service: Service,
    package: Package,
    draft: RegistrationDraft,
    proof: Option<ProofAsset>,
    submitting: bool,
  },
}

impl WizardState {
  pub fn name(&self) -> &'static str {
    match self {
      Self::Idle => "idle",
      Self::PackagesOpen { .. } => "packages_open",
      Self::FormOpen { .. } => "form_open",
      Self::PaymentOpen { .. } => "payment_open",
    }
  }
}

#[derive(Debug, Clone)]
pub enum WizardEvent {
  ChooseService(Service),
  /// Package id as it appears in the route
  ChoosePackage(String),
  SubmitForm(RegistrationForm),
  AttachProof(ProofAsset),
  BeginSubmission,
  /// Upload + insert for the given submission finished, successfully or not
  FinishSubmission(SubmissionTicket),
  /// Explicit cancel or backdrop click
  Cancel,
}

impl WizardEvent {
  fn name(&self) -> &'static str {
    match self {
      Self::ChooseService(_) => "choose_service",
      Self::ChoosePackage(_) => "choose_package",
      Self::SubmitForm(_) => "submit_form",
      Self::AttachProof(_) => "attach_proof",
      Self::BeginSubmission => "begin_submission",
      Self::FinishSubmission(_) => "finish_submission",
      Self::Cancel => "cancel",
    }
  }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WizardError {
  #[error("That action is not available right now.")]
  InvalidTransition {
    state: &'static str,
    event: &'static str,
  },
  #[error("That service is no longer available. Please refresh the page.")]
  UnknownService,
  #[error("The selected package is not part of this service.")]
  UnknownPackage,
  #[error("A submission is already in progress.")]
  AlreadySubmitting,
  /// The finishing submission was cancelled and replaced by a newer one
  #[error("That submission is no longer active.")]
  StaleSubmission,
  #[error(transparent)]
  Validation(#[from] ValidationError),
  #[error(transparent)]
  File(#[from] FileConstraintError),
}

/// Identifies one started submission; only its own ticket can finish it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionTicket(u64);

/// Tickets are unique per process, so a recreated wizard never reuses one
static NEXT_TICKET: AtomicU64 = AtomicU64::new(1);

impl SubmissionTicket {
  fn next() -> Self {
    Self(NEXT_TICKET.fetch_add(1, Ordering::Relaxed))
  }
}

/// What the caller must do after a successful transition
#[derive(Debug)]
pub enum Effect {
  None,
  /// Run the upload + insert sequence, then apply `FinishSubmission(ticket)`
  Submit {
    ticket: SubmissionTicket,
    request: Box<SubmissionRequest>,
  },
}

#[derive(Debug, Clone, Default)]
pub struct Wizard {
  state: WizardState,
  /// Ticket of the submission currently running, if any
  in_flight: Option<SubmissionTicket>,
}

impl Wizard {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn state(&self) -> &WizardState {
    &self.state
  }

  pub fn is_idle(&self) -> bool {
    matches!(self.state, WizardState::Idle)
  }

  /// Whether a proof image is held in memory
  pub fn holds_proof(&self) -> bool {
    matches!(self.state, WizardState::PaymentOpen { proof: Some(_), .. })
  }

  pub fn apply(&mut self, event: WizardEvent) -> Result<Effect, WizardError> {
    let from = self.state.name();
    let event_name = event.name();
    let result = self.transition(event);
    match &result {
      Ok(_) => tracing::debug!("wizard {} --{}--> {}", from, event_name, self.state.name()),
      Err(e) => tracing::debug!("wizard {} rejected {}: {:?}", from, event_name, e),
    }
    result
  }

  fn transition(&mut self, event: WizardEvent) -> Result<Effect, WizardError> {
    let state = std::mem::take(&mut self.state);
    match (state, event) {
      (_, WizardEvent::Cancel) => {
        // Selections, draft and proof are dropped; a running submission
        // can no longer finish this wizard
        self.in_flight = None;
        Ok(Effect::None)
      }

      (
        state @ WizardState::PaymentOpen {
          submitting: true, ..
        },
        WizardEvent::FinishSubmission(ticket),
      ) => {
        if self.in_flight == Some(ticket) {
          // Cleanup regardless of outcome
          self.in_flight = None;
          Ok(Effect::None)
        } else {
          self.state = state;
          Err(WizardError::StaleSubmission)
        }
      }

      (WizardState::Idle, WizardEvent::ChooseService(service)) => {
        self.state = WizardState::PackagesOpen { service };
        Ok(Effect::None)
      }

      (WizardState::PackagesOpen { service }, WizardEvent::ChoosePackage(package_id)) => {
        match service.find_package(&package_id).cloned() {
          Some(package) => {
            self.state = WizardState::FormOpen { service, package };
            Ok(Effect::None)
          }
          None => {
            self.state = WizardState::PackagesOpen { service };
            Err(WizardError::UnknownPackage)
          }
        }
      }

      (WizardState::FormOpen { service, package }, WizardEvent::SubmitForm(form)) => {
        match validation::validate_registration(&form) {
          Ok(draft) => {
            self.state = WizardState::PaymentOpen {
              service,
              package,
              draft,
              proof: None,
              submitting: false,
            };
            Ok(Effect::None)
          }
          Err(e) => {
            self.state = WizardState::FormOpen { service, package };
            Err(e.into())
          }
        }
      }

      (
        WizardState::PaymentOpen {
          service,
          package,
          draft,
          proof,
          submitting,
        },
        WizardEvent::AttachProof(new_proof),
      ) => {
        let checked = if submitting {
          Err(WizardError::AlreadySubmitting)
        } else {
          validation::validate_proof(&new_proof).map_err(WizardError::from)
        };
        let proof = match checked {
          Ok(()) => Some(new_proof),
          Err(_) => proof,
        };
        self.state = WizardState::PaymentOpen {
          service,
          package,
          draft,
          proof,
          submitting,
        };
        checked.map(|()| Effect::None)
      }

      (
        WizardState::PaymentOpen {
          service,
          package,
          draft,
          proof,
          submitting,
        },
        WizardEvent::BeginSubmission,
      ) => {
        let request = match (&proof, submitting) {
          (_, true) => Err(WizardError::AlreadySubmitting),
          (None, false) => Err(FileConstraintError::Missing.into()),
          (Some(asset), false) => Ok(SubmissionRequest {
            service: service.clone(),
            package: package.clone(),
            draft: draft.clone(),
            proof: asset.clone(),
          }),
        };
        let effect = request.map(|request| {
          let ticket = SubmissionTicket::next();
          self.in_flight = Some(ticket);
          Effect::Submit {
            ticket,
            request: Box::new(request),
          }
        });
        self.state = WizardState::PaymentOpen {
          service,
          package,
          draft,
          proof,
          submitting: submitting || effect.is_ok(),
        };
        effect
      }

      (state, event) => {
        let err = WizardError::InvalidTransition {
          state: state.name(),
          event: event.name(),
        };
        self.state = state;
        Err(err)
      }
    }
  }
}
