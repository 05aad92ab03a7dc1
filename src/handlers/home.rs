use askama::Template;
use axum::extract::State;
use axum::response::Html;

use crate::content::{self, HomeContent};
use crate::filters;
use crate::state::AppState;

use super::NavContext;

#[derive(Template)]
#[template(path = "home.html")]
pub struct HomeTemplate {
  pub nav: NavContext,
  pub content: HomeContent,
}

pub async fn home(State(state): State<AppState>) -> Html<String> {
  let content = content::load_home_content(state.gateway.as_ref()).await;

  let template = HomeTemplate {
    nav: NavContext::new(&state, "home"),
    content,
  };

  Html(template.render().unwrap_or_default())
}
