//! Services page: catalog cards plus the registration wizard modals.
//!
//! Every wizard step is a form POST that updates the visitor's wizard and
//! redirects back to `GET /services`, which renders whichever modal the
//! current state calls for. Messages travel through the visitor's flash slot.

mod payment;
mod wizard;

use askama::Template;
use axum::extract::{Query, State};
use axum::response::{Html, IntoResponse, Redirect};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

use crate::catalog::{self, Catalog};
use crate::config::BankDetails;
use crate::domain::{Package, RegistrationForm, Service};
use crate::filters;
use crate::session::{self, Flash};
use crate::state::AppState;
use crate::wizard::{WizardEvent, WizardState};

use super::NavContext;

pub use payment::{attach_proof, submit_payment};
pub use wizard::{cancel, choose_package, choose_service, register};

pub const SERVICES_PATH: &str = "/services";

/// Package as shown on cards and in modals
#[derive(Debug, Clone)]
pub struct PackageView {
  pub id: String,
  pub name: String,
  pub price: String,
  pub desc: String,
}

impl From<&Package> for PackageView {
  fn from(package: &Package) -> Self {
    Self {
      id: package.id.to_string(),
      name: package.name.clone(),
      price: package.display_price(),
      desc: package.description().to_string(),
    }
  }
}

#[derive(Debug, Clone)]
pub struct ServiceCard {
  pub id: String,
  pub title: String,
  pub summary: String,
  pub description: String,
  pub packages: Vec<PackageView>,
  /// Details panel open (`?details={id}`)
  pub expanded: bool,
}

impl ServiceCard {
  fn new(service: &Service, expanded: bool) -> Self {
    Self {
      id: service.id.to_string(),
      title: service.title.clone(),
      summary: service.summary.clone().unwrap_or_default(),
      description: service.description.clone().unwrap_or_default(),
      packages: service.packages.iter().map(PackageView::from).collect(),
      expanded,
    }
  }
}

pub struct PackagesModal {
  pub service_id: String,
  pub title: String,
  pub packages: Vec<PackageView>,
}

pub struct FormModal {
  pub package_name: String,
  pub package_desc: String,
  pub input: RegistrationForm,
  pub error: Option<String>,
}

pub struct PaymentModal {
  pub package_name: String,
  pub price: String,
  pub bank: BankDetails,
  pub proof_name: Option<String>,
  /// `data:` URL of the attached proof
  pub preview: Option<String>,
  pub submitting: bool,
  pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "services.html")]
pub struct ServicesTemplate {
  pub nav: NavContext,
  pub services: Vec<ServiceCard>,
  /// Catalog read failed (as opposed to returning no rows)
  pub catalog_unavailable: bool,
  pub notice: Option<String>,
  /// Page-level error when no modal is open to show it in
  pub error: Option<String>,
  pub packages_modal: Option<PackagesModal>,
  pub form_modal: Option<FormModal>,
  pub payment_modal: Option<PaymentModal>,
}

#[derive(Debug, Deserialize)]
pub struct ServicesQuery {
  pub details: Option<String>,
}

impl ServicesTemplate {
  fn build(
    nav: NavContext,
    services: &[Service],
    catalog_unavailable: bool,
    details: Option<&str>,
    wizard: &WizardState,
    flash: Option<Flash>,
    bank: &BankDetails,
  ) -> Self {
    let cards = services
      .iter()
      .map(|s| ServiceCard::new(s, details.is_some_and(|id| s.id.matches(id))))
      .collect();

    let (mut notice, mut error, mut rejected_input) = (None, None, None);
    match flash {
      Some(Flash::Notice(message)) => notice = Some(message),
      Some(Flash::Error(message)) => error = Some(message),
      Some(Flash::FormRejected { message, input }) => {
        error = Some(message);
        rejected_input = Some(input);
      }
      None => {}
    }

    let mut template = Self {
      nav,
      services: cards,
      catalog_unavailable,
      notice,
      error: None,
      packages_modal: None,
      form_modal: None,
      payment_modal: None,
    };

    match wizard {
      WizardState::Idle => template.error = error,
      WizardState::PackagesOpen { service } => {
        template.error = error;
        template.packages_modal = Some(PackagesModal {
          service_id: service.id.to_string(),
          title: service.title.clone(),
          packages: service.packages.iter().map(PackageView::from).collect(),
        });
      }
      WizardState::FormOpen { package, .. } => {
        template.form_modal = Some(FormModal {
          package_name: package.name.clone(),
          package_desc: package.description().to_string(),
          input: rejected_input.unwrap_or_default(),
          error,
        });
      }
      WizardState::PaymentOpen {
        package,
        proof,
        submitting,
        ..
      } => {
        template.payment_modal = Some(PaymentModal {
          package_name: package.name.clone(),
          price: package.display_price(),
          bank: bank.clone(),
          proof_name: proof.as_ref().map(|p| p.file_name.clone()),
          preview: proof.as_ref().map(|p| p.preview_data_url()),
          submitting: *submitting,
          error,
        });
      }
    }

    template
  }
}

pub async fn services_page(
  State(state): State<AppState>,
  jar: CookieJar,
  Query(query): Query<ServicesQuery>,
) -> impl IntoResponse {
  let (jar, visitor) = session::ensure_visitor(jar);

  let catalog = catalog::load_catalog(state.gateway.as_ref()).await;
  let catalog_unavailable = matches!(catalog, Catalog::Unavailable);
  let services = catalog.into_services();

  let (wizard, flash) = state.visitors.with_visitor(&visitor, |entry| {
    entry.catalog = services.clone();
    // With nothing to choose from, no modal stays reachable
    if entry.catalog.is_empty() && !entry.wizard.is_idle() {
      let _ = entry.wizard.apply(WizardEvent::Cancel);
    }
    (entry.wizard.state().clone(), entry.flash.take())
  });

  let template = ServicesTemplate::build(
    NavContext::new(&state, "services"),
    &services,
    catalog_unavailable,
    query.details.as_deref(),
    &wizard,
    flash,
    &state.config.bank,
  );

  (jar, Html(template.render().unwrap_or_default()))
}

/// Store a flash for the visitor's next page render
fn flash(state: &AppState, visitor: &str, flash: Flash) {
  state.visitors.with_visitor(visitor, |entry| entry.flash = Some(flash));
}

fn back_to_services(jar: CookieJar) -> (CookieJar, Redirect) {
  (jar, Redirect::to(SERVICES_PATH))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::ProofAsset;
  use crate::gateway::memory::demo_services;

  fn nav() -> NavContext {
    NavContext {
      active: "services",
      contact_email: "hello@example.com".into(),
      year: 2026,
    }
  }

  #[test]
  fn test_idle_page_has_no_modal() {
    let services = demo_services();
    let template = ServicesTemplate::build(
      nav(),
      &services,
      false,
      Some("2"),
      &WizardState::Idle,
      Some(Flash::Notice("done".into())),
      &BankDetails::default(),
    );
    assert_eq!(template.services.len(), 3);
    assert!(template.services[1].expanded);
    assert!(!template.services[0].expanded);
    assert_eq!(template.notice.as_deref(), Some("done"));
    assert!(template.packages_modal.is_none());
    assert!(template.form_modal.is_none());
    assert!(template.payment_modal.is_none());
  }

  #[test]
  fn test_rejected_form_is_echoed_in_modal() {
    let services = demo_services();
    let service = services[0].clone();
    let package = service.packages[0].clone();
    let input = RegistrationForm {
      name: "Ada".into(),
      email: "ada.example.com".into(),
      ..Default::default()
    };
    let template = ServicesTemplate::build(
      nav(),
      &services,
      false,
      None,
      &WizardState::FormOpen { service, package },
      Some(Flash::FormRejected {
        message: "Please enter a valid email address.".into(),
        input: input.clone(),
      }),
      &BankDetails::default(),
    );
    let modal = template.form_modal.unwrap();
    assert_eq!(modal.input, input);
    assert!(modal.error.is_some());
    assert!(template.error.is_none());
  }

  #[test]
  fn test_payment_modal_shows_preview() {
    let services = demo_services();
    let service = services[0].clone();
    let package = service.packages[2].clone();
    let state = WizardState::PaymentOpen {
      service,
      package,
      draft: crate::domain::RegistrationDraft {
        name: "Ada".into(),
        email: "ada@example.com".into(),
        phone: None,
        additional_info: None,
      },
      proof: Some(ProofAsset::new("r.png", "image/png", vec![1, 2, 3])),
      submitting: false,
    };
    let template = ServicesTemplate::build(nav(), &services, false, None, &state, None, &BankDetails::default());
    let modal = template.payment_modal.unwrap();
    assert_eq!(modal.price, "₦15,000");
    assert_eq!(modal.proof_name.as_deref(), Some("r.png"));
    assert_eq!(modal.preview.as_deref(), Some("data:image/png;base64,AQID"));
  }
}
