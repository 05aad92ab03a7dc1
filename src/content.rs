//! Home page content: news banners, testimonies and the quote of the day.
//!
//! The three reads run concurrently and fail independently. Banners and
//! testimonies fall back to empty lists with a visible warning; the quote
//! always degrades to the built-in default.

use crate::config::HOME_QUOTE_KEY;
use crate::domain::{Banner, Quote, Testimony};
use crate::gateway::{DataGateway, GatewayError};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HomeWarnings {
  pub banners: Option<&'static str>,
  pub testimonies: Option<&'static str>,
  pub quote: Option<&'static str>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HomeContent {
  pub banners: Vec<Banner>,
  pub testimonies: Vec<Testimony>,
  pub quote: Quote,
  pub warnings: HomeWarnings,
}

/// Parse the stored quote value; anything unusable yields `None`
fn parse_quote(value: &str) -> Option<Quote> {
  match serde_json::from_str::<Quote>(value) {
    Ok(quote) if !quote.text.trim().is_empty() => Some(quote),
    Ok(_) => None,
    Err(e) => {
      tracing::debug!("Ignoring malformed home quote: {}", e);
      None
    }
  }
}

async fn fetch_quote(gateway: &dyn DataGateway) -> Result<Quote, GatewayError> {
  let value = gateway.fetch_site_meta(HOME_QUOTE_KEY).await?;
  if value.is_none() {
    tracing::debug!("No custom quote found, using default");
  }
  Ok(value.as_deref().and_then(parse_quote).unwrap_or_default())
}

pub async fn load_home_content(gateway: &dyn DataGateway) -> HomeContent {
  let (banners, testimonies, quote) = tokio::join!(
    gateway.fetch_active_banners(),
    gateway.fetch_public_testimonies(),
    fetch_quote(gateway),
  );

  let mut content = HomeContent::default();

  match banners {
    Ok(banners) => content.banners = banners,
    Err(e) => {
      tracing::warn!("Error loading banners: {}", e);
      content.warnings.banners = Some("Failed to load news banners");
    }
  }

  match testimonies {
    Ok(testimonies) => content.testimonies = testimonies,
    Err(e) => {
      tracing::warn!("Error loading testimonies: {}", e);
      content.warnings.testimonies = Some("Failed to load testimonials");
    }
  }

  match quote {
    Ok(quote) => content.quote = quote,
    Err(e) => {
      tracing::debug!("Error loading quote: {}", e);
      content.warnings.quote = Some("Using default quote");
    }
  }

  content
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::RecordId;
  use crate::gateway::MemoryGateway;
  use crate::gateway::memory::Operation;

  fn testimony() -> Testimony {
    Testimony {
      id: RecordId::Int(1),
      name: "Chiamaka".into(),
      message: "Registration was smooth.".into(),
      role: Some("Student".into()),
    }
  }

  #[tokio::test]
  async fn test_all_sources_loaded() {
    let gateway = MemoryGateway::new()
      .with_testimonies(vec![testimony()])
      .with_site_meta(HOME_QUOTE_KEY, r#"{"text": "Keep learning.", "author": "BerryRay"}"#);

    let content = load_home_content(&gateway).await;
    assert_eq!(content.testimonies.len(), 1);
    assert_eq!(content.quote.author, "BerryRay");
    assert_eq!(content.warnings, HomeWarnings::default());
  }

  #[tokio::test]
  async fn test_failures_are_independent() {
    let gateway = MemoryGateway::new().with_testimonies(vec![testimony()]);
    gateway.fail(Operation::FetchBanners);

    let content = load_home_content(&gateway).await;
    assert!(content.banners.is_empty());
    assert_eq!(content.warnings.banners, Some("Failed to load news banners"));
    assert_eq!(content.testimonies.len(), 1);
    assert_eq!(content.warnings.testimonies, None);
  }

  #[tokio::test]
  async fn test_quote_degrades_to_default() {
    let gateway = MemoryGateway::new().with_site_meta(HOME_QUOTE_KEY, "not json");
    assert_eq!(load_home_content(&gateway).await.quote, Quote::default());

    let gateway = MemoryGateway::new();
    let content = load_home_content(&gateway).await;
    assert_eq!(content.quote, Quote::default());
    assert_eq!(content.warnings.quote, None);

    gateway.fail(Operation::FetchSiteMeta);
    let content = load_home_content(&gateway).await;
    assert_eq!(content.quote, Quote::default());
    assert_eq!(content.warnings.quote, Some("Using default quote"));
  }
}
