pub mod home;
pub mod pages;
pub mod services;

use askama::Template;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse};
use chrono::{Datelike, Utc};

use crate::filters;
use crate::state::AppState;

/// Navigation context shared by every page template
pub struct NavContext {
  /// Which top-level link is highlighted ("home", "services", ...)
  pub active: &'static str,
  pub contact_email: String,
  pub year: i32,
}

impl NavContext {
  pub fn new(state: &AppState, active: &'static str) -> Self {
    Self {
      active,
      contact_email: state.config.contact_email.clone(),
      year: Utc::now().year(),
    }
  }
}

#[derive(Template)]
#[template(path = "not_found.html")]
pub struct NotFoundTemplate {
  pub nav: NavContext,
}

pub async fn not_found(State(state): State<AppState>) -> impl IntoResponse {
  let template = NotFoundTemplate {
    nav: NavContext::new(&state, ""),
  };
  (StatusCode::NOT_FOUND, Html(template.render().unwrap_or_default()))
}

pub use home::home;
pub use pages::{about, portfolio};
pub use services::{
  attach_proof, cancel, choose_package, choose_service, register, services_page, submit_payment,
};
