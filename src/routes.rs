use axum::extract::DefaultBodyLimit;
use axum::{routing::get, routing::post, Router};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config;
use crate::handlers;
use crate::state::AppState;

/// Build the site router
pub fn router(state: AppState) -> Router {
  Router::new()
    .route("/", get(handlers::home))
    .route("/about", get(handlers::about))
    .route("/portfolio", get(handlers::portfolio))
    .route("/services", get(handlers::services_page))
    .route("/services/cancel", post(handlers::cancel))
    .route("/services/register", post(handlers::register))
    .route("/services/payment", post(handlers::submit_payment))
    .route("/services/payment/proof", post(handlers::attach_proof))
    .route("/services/{service_id}/packages", post(handlers::choose_service))
    .route(
      "/services/{service_id}/packages/{package_id}",
      post(handlers::choose_package),
    )
    .nest_service("/static", ServeDir::new(config::STATIC_DIR))
    .fallback(handlers::not_found)
    .layer(DefaultBodyLimit::max(config::UPLOAD_BODY_LIMIT))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}
