use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Form;
use axum_extra::extract::cookie::CookieJar;

use crate::domain::{find_service, RegistrationForm};
use crate::session::{self, Flash, VisitorEntry};
use crate::state::AppState;
use crate::wizard::{WizardError, WizardEvent, WizardState};

use super::{back_to_services, flash};

/// Resolve a route service id against the visitor's loaded catalog
fn apply_choose_service(entry: &mut VisitorEntry, service_id: &str) -> Result<(), WizardError> {
  let service = find_service(&entry.catalog, service_id)
    .cloned()
    .ok_or(WizardError::UnknownService)?;
  entry.wizard.apply(WizardEvent::ChooseService(service))?;
  Ok(())
}

/// "Start Registration" on a service card: open the packages modal
pub async fn choose_service(
  State(state): State<AppState>,
  jar: CookieJar,
  Path(service_id): Path<String>,
) -> impl IntoResponse {
  let (jar, visitor) = session::ensure_visitor(jar);

  let result = state
    .visitors
    .with_visitor(&visitor, |entry| apply_choose_service(entry, &service_id));

  if let Err(e) = result {
    tracing::warn!("Could not open packages for service {}: {:?}", service_id, e);
    flash(&state, &visitor, Flash::Error(e.to_string()));
  }

  back_to_services(jar)
}

/// "Fill Form" for a package, either from the packages modal or straight
/// from a card's details panel
pub async fn choose_package(
  State(state): State<AppState>,
  jar: CookieJar,
  Path((service_id, package_id)): Path<(String, String)>,
) -> impl IntoResponse {
  let (jar, visitor) = session::ensure_visitor(jar);

  let result = state.visitors.with_visitor(&visitor, |entry| {
    let from_details = entry.wizard.is_idle();
    if from_details {
      apply_choose_service(entry, &service_id)?;
    } else if let WizardState::PackagesOpen { service } = entry.wizard.state() {
      if !service.id.matches(&service_id) {
        return Err(WizardError::InvalidTransition {
          state: "packages_open",
          event: "choose_package",
        });
      }
    }

    let chosen = entry.wizard.apply(WizardEvent::ChoosePackage(package_id.clone()));
    if chosen.is_err() && from_details {
      // The shortcut is all or nothing
      let _ = entry.wizard.apply(WizardEvent::Cancel);
    }
    chosen.map(|_| ())
  });

  if let Err(e) = result {
    tracing::warn!(
      "Could not choose package {} of service {}: {:?}",
      package_id,
      service_id,
      e
    );
    flash(&state, &visitor, Flash::Error(e.to_string()));
  }

  back_to_services(jar)
}

/// Registration form submit ("Proceed to Payment")
pub async fn register(
  State(state): State<AppState>,
  jar: CookieJar,
  Form(form): Form<RegistrationForm>,
) -> impl IntoResponse {
  let (jar, visitor) = session::ensure_visitor(jar);

  state.visitors.with_visitor(&visitor, |entry| {
    match entry.wizard.apply(WizardEvent::SubmitForm(form.clone())) {
      Ok(_) => {}
      Err(WizardError::Validation(e)) => {
        tracing::debug!("Registration form rejected: {}", e);
        entry.flash = Some(Flash::FormRejected {
          message: e.to_string(),
          input: form,
        });
      }
      Err(e) => {
        tracing::warn!("Registration form ignored: {:?}", e);
        entry.flash = Some(Flash::Error(e.to_string()));
      }
    }
  });

  back_to_services(jar)
}

/// Close button, cancel button and backdrop click all land here
pub async fn cancel(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
  let (jar, visitor) = session::ensure_visitor(jar);

  state.visitors.with_visitor(&visitor, |entry| {
    // Cancel is accepted from every state
    let _ = entry.wizard.apply(WizardEvent::Cancel);
  });

  back_to_services(jar)
}
