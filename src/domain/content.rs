use serde::{Deserialize, Serialize};

use super::catalog::RecordId;

/// News banner shown at the top of the home page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Banner {
  pub id: RecordId,
  #[serde(default)]
  pub title: String,
  #[serde(default)]
  pub message: String,
  #[serde(default)]
  pub link_url: Option<String>,
}

/// Approved student testimony
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Testimony {
  pub id: RecordId,
  pub name: String,
  pub message: String,
  #[serde(default)]
  pub role: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
  pub text: String,
  pub author: String,
}

impl Default for Quote {
  fn default() -> Self {
    Self {
      text: "Science is a way of thinking much more than it is a body of knowledge.".to_string(),
      author: "Carl Sagan".to_string(),
    }
  }
}
