use serde::{Deserialize, Serialize};
use std::fmt;

/// Row identifier as returned by the backend.
///
/// Tables may use integer or text (uuid) keys, so both are accepted and
/// written back in the same shape they were read.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
  Int(i64),
  Text(String),
}

impl RecordId {
  /// Compare against an id taken from a URL path segment
  pub fn matches(&self, raw: &str) -> bool {
    match self {
      Self::Int(n) => raw.trim().parse::<i64>().is_ok_and(|v| v == *n),
      Self::Text(s) => s == raw,
    }
  }
}

impl fmt::Display for RecordId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Int(n) => write!(f, "{}", n),
      Self::Text(s) => f.write_str(s),
    }
  }
}

impl From<i64> for RecordId {
  fn from(value: i64) -> Self {
    Self::Int(value)
  }
}

/// Package price as stored: either a numeric column or free text such as "15,000".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PriceValue {
  Number(f64),
  Text(String),
}

impl Default for PriceValue {
  fn default() -> Self {
    Self::Text(String::new())
  }
}

impl fmt::Display for PriceValue {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Number(n) => write!(f, "{}", n),
      Self::Text(s) => f.write_str(s),
    }
  }
}

/// A priced tier within a service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Package {
  pub id: RecordId,
  pub name: String,
  #[serde(default)]
  pub price: PriceValue,
  #[serde(rename = "priceLabel", default)]
  pub price_label: Option<String>,
  #[serde(default)]
  pub desc: Option<String>,
}

impl Package {
  /// Human-facing price: the pre-formatted label when set, otherwise `₦{price}`
  pub fn display_price(&self) -> String {
    match self.price_label.as_deref().map(str::trim) {
      Some(label) if !label.is_empty() => label.to_string(),
      _ => format!("₦{}", self.price),
    }
  }

  pub fn description(&self) -> &str {
    self.desc.as_deref().unwrap_or_default()
  }
}

/// A category of offering with its purchasable packages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
  pub id: RecordId,
  pub title: String,
  #[serde(default)]
  pub summary: Option<String>,
  #[serde(default)]
  pub description: Option<String>,
  /// Nested `service_packages` rows; the backend returns null when none exist
  #[serde(default, deserialize_with = "null_as_empty")]
  pub packages: Vec<Package>,
}

impl Service {
  pub fn find_package(&self, raw_id: &str) -> Option<&Package> {
    self.packages.iter().find(|p| p.id.matches(raw_id))
  }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Package>, D::Error>
where
  D: serde::Deserializer<'de>,
{
  Ok(Option::<Vec<Package>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Find a service in a loaded catalog by the id used in routes
pub fn find_service<'a>(catalog: &'a [Service], raw_id: &str) -> Option<&'a Service> {
  catalog.iter().find(|s| s.id.matches(raw_id))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn package(price: PriceValue, label: Option<&str>) -> Package {
    Package {
      id: RecordId::Int(1),
      name: "Basic".into(),
      price,
      price_label: label.map(String::from),
      desc: None,
    }
  }

  #[test]
  fn test_display_price_prefers_label() {
    let p = package(PriceValue::Number(5000.0), Some("₦5,000 only"));
    assert_eq!(p.display_price(), "₦5,000 only");
  }

  #[test]
  fn test_display_price_falls_back_to_naira() {
    assert_eq!(package(PriceValue::Number(5000.0), None).display_price(), "₦5000");
    assert_eq!(package(PriceValue::Text("15,000".into()), Some("  ")).display_price(), "₦15,000");
  }

  #[test]
  fn test_record_id_matches_route_segment() {
    assert!(RecordId::Int(7).matches("7"));
    assert!(!RecordId::Int(7).matches("07x"));
    assert!(RecordId::Text("abc".into()).matches("abc"));
  }

  #[test]
  fn test_service_deserializes_nested_packages() {
    let json = r#"{
      "id": 2,
      "title": "Online Registration",
      "summary": "We register for you",
      "description": null,
      "packages": [
        {"id": 10, "name": "Basic", "price": "15,000", "priceLabel": null, "desc": "Form only"},
        {"id": 11, "name": "Premium", "price": 25000, "priceLabel": "₦25k", "desc": null}
      ]
    }"#;
    let service: Service = serde_json::from_str(json).unwrap();
    assert_eq!(service.id, RecordId::Int(2));
    assert_eq!(service.packages.len(), 2);
    assert_eq!(service.packages[0].price, PriceValue::Text("15,000".into()));
    assert_eq!(service.packages[1].price, PriceValue::Number(25000.0));
    assert!(service.find_package("11").is_some());
    assert!(service.find_package("12").is_none());
  }

  #[test]
  fn test_service_null_packages() {
    let json = r#"{"id": "svc-1", "title": "CCTV Setup", "packages": null}"#;
    let service: Service = serde_json::from_str(json).unwrap();
    assert!(service.packages.is_empty());
    assert_eq!(service.id.to_string(), "svc-1");
  }
}
