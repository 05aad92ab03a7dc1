//! Supabase implementation of [`DataGateway`].
//!
//! Tables are read and written through PostgREST (`/rest/v1`), proof images
//! through the Storage API (`/storage/v1`). Every request carries the project's
//! anon key as both `apikey` and bearer token; row-level security on the
//! project decides what the anon role may do.
//!
//! The anon key is held as a [`SecretString`] and never appears in logs.

use async_trait::async_trait;
use reqwest::header::{CACHE_CONTROL, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

use super::{DataGateway, GatewayError, StoredObject};
use crate::config::{
  BANNERS_TABLE, PROOF_CACHE_CONTROL, REGISTRATIONS_TABLE, SERVICES_TABLE, SITE_META_TABLE,
  SupabaseSettings, TESTIMONIES_TABLE,
};
use crate::domain::{Banner, ProofAsset, RegistrationRecord, Service, Testimony};

/// Services with their packages joined through the `service_packages` foreign key
const SERVICES_SELECT: &str =
  "id,title,summary,description,packages:service_packages(id,name,price,priceLabel,desc)";

pub struct SupabaseGateway {
  client: Client,
  base_url: String,
  anon_key: SecretString,
}

impl SupabaseGateway {
  pub fn new(base_url: impl Into<String>, anon_key: SecretString) -> Result<Self, GatewayError> {
    let client = Client::builder()
      .connect_timeout(Duration::from_secs(10))
      .build()?;

    Ok(Self {
      client,
      base_url: base_url.into().trim_end_matches('/').to_string(),
      anon_key,
    })
  }

  pub fn from_settings(settings: &SupabaseSettings) -> Result<Self, GatewayError> {
    Self::new(
      settings.url.clone(),
      SecretString::from(settings.anon_key.expose_secret().to_string()),
    )
  }

  fn rest_url(&self, table: &str) -> String {
    format!("{}/rest/v1/{}", self.base_url, table)
  }

  fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
    let key = self.anon_key.expose_secret();
    request.header("apikey", key).bearer_auth(key)
  }

  async fn get_rows<T: DeserializeOwned>(
    &self,
    table: &str,
    query: &[(&str, &str)],
  ) -> Result<Vec<T>, GatewayError> {
    let response = self
      .authorized(self.client.get(self.rest_url(table)))
      .query(query)
      .send()
      .await?;
    let body = check_status(response).await?.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
  }
}

/// Turn a non-2xx response into [`GatewayError::Status`] with the backend's message
async fn check_status(response: Response) -> Result<Response, GatewayError> {
  let status = response.status();
  if status.is_success() {
    return Ok(response);
  }
  let body = response.text().await.unwrap_or_default();
  Err(GatewayError::Status {
    status: status.as_u16(),
    message: error_message(&body).unwrap_or_else(|| {
      status.canonical_reason().unwrap_or("request failed").to_string()
    }),
  })
}

/// Extract the human-readable message from a PostgREST or Storage error body
fn error_message(body: &str) -> Option<String> {
  let value: serde_json::Value = serde_json::from_str(body).ok()?;
  ["message", "error_description", "msg", "error"]
    .iter()
    .find_map(|field| value.get(field).and_then(|v| v.as_str()))
    .map(String::from)
}

#[derive(Deserialize)]
struct MetaRow {
  value: serde_json::Value,
}

#[async_trait]
impl DataGateway for SupabaseGateway {
  async fn fetch_services(&self) -> Result<Vec<Service>, GatewayError> {
    self
      .get_rows(
        SERVICES_TABLE,
        &[
          ("select", SERVICES_SELECT),
          ("order", "id.asc"),
          ("packages.order", "id.asc"),
        ],
      )
      .await
  }

  async fn upload_object(
    &self,
    bucket: &str,
    key: &str,
    proof: &ProofAsset,
  ) -> Result<StoredObject, GatewayError> {
    let url = format!("{}/storage/v1/object/{}/{}", self.base_url, bucket, key);
    let response = self
      .authorized(self.client.post(url))
      .header(CONTENT_TYPE, proof.content_type.as_str())
      .header(CACHE_CONTROL, format!("max-age={}", PROOF_CACHE_CONTROL))
      .header("x-upsert", "false")
      .body(proof.bytes.clone())
      .send()
      .await?;
    check_status(response).await?;

    Ok(StoredObject {
      path: key.to_string(),
    })
  }

  fn public_url(&self, bucket: &str, path: &str) -> String {
    format!("{}/storage/v1/object/public/{}/{}", self.base_url, bucket, path)
  }

  async fn insert_registration(&self, record: &RegistrationRecord) -> Result<(), GatewayError> {
    let response = self
      .authorized(self.client.post(self.rest_url(REGISTRATIONS_TABLE)))
      .header("Prefer", "return=minimal")
      .json(record)
      .send()
      .await?;
    check_status(response).await?;
    Ok(())
  }

  async fn fetch_active_banners(&self) -> Result<Vec<Banner>, GatewayError> {
    self
      .get_rows(
        BANNERS_TABLE,
        &[("select", "*"), ("is_active", "eq.true"), ("order", "id.asc")],
      )
      .await
  }

  async fn fetch_public_testimonies(&self) -> Result<Vec<Testimony>, GatewayError> {
    self
      .get_rows(
        TESTIMONIES_TABLE,
        &[("select", "*"), ("is_approved", "eq.true"), ("order", "id.desc")],
      )
      .await
  }

  async fn fetch_site_meta(&self, key: &str) -> Result<Option<String>, GatewayError> {
    let filter = format!("eq.{}", key);
    let rows: Vec<MetaRow> = self
      .get_rows(
        SITE_META_TABLE,
        &[("select", "value"), ("key", filter.as_str()), ("limit", "1")],
      )
      .await?;

    Ok(rows.into_iter().next().map(|row| match row.value {
      serde_json::Value::String(s) => s,
      other => other.to_string(),
    }))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::{RecordId, RegistrationStatus};
  use httpmock::prelude::*;

  fn gateway(server: &MockServer) -> SupabaseGateway {
    SupabaseGateway::new(server.base_url(), SecretString::from("anon-test-key")).unwrap()
  }

  fn record() -> RegistrationRecord {
    RegistrationRecord {
      full_name: "Ada Obi".into(),
      email: "ada@example.com".into(),
      phone: Some("+234 803".into()),
      additional_info: None,
      service_id: RecordId::Int(1),
      service_title: "Online Registration".into(),
      package_id: RecordId::Int(2),
      package_name: "Basic".into(),
      package_price: 15000.0,
      payment_proof_url: "https://example.supabase.co/storage/v1/object/public/payment-proofs/1-2-5.png".into(),
      status: RegistrationStatus::Pending,
    }
  }

  #[tokio::test]
  async fn test_fetch_services_sends_join_and_order() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
      when
        .method(GET)
        .path("/rest/v1/services")
        .query_param("select", SERVICES_SELECT)
        .query_param("order", "id.asc")
        .header("apikey", "anon-test-key")
        .header("authorization", "Bearer anon-test-key");
      then.status(200).json_body(serde_json::json!([
        {"id": 1, "title": "CCTV Setup", "summary": "s", "description": "d",
         "packages": [{"id": 4, "name": "Home", "price": "45,000", "priceLabel": null, "desc": "2 cams"}]}
      ]));
    });

    let services = gateway(&server).fetch_services().await.unwrap();
    mock.assert();
    assert_eq!(services.len(), 1);
    assert_eq!(services[0].packages[0].name, "Home");
  }

  #[tokio::test]
  async fn test_fetch_services_error_message() {
    let server = MockServer::start();
    server.mock(|when, then| {
      when.method(GET).path("/rest/v1/services");
      then
        .status(401)
        .json_body(serde_json::json!({"message": "Invalid API key"}));
    });

    let err = gateway(&server).fetch_services().await.unwrap_err();
    match err {
      GatewayError::Status { status, message } => {
        assert_eq!(status, 401);
        assert_eq!(message, "Invalid API key");
      }
      other => panic!("unexpected error: {:?}", other),
    }
  }

  #[tokio::test]
  async fn test_upload_object_without_overwrite() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
      when
        .method(POST)
        .path("/storage/v1/object/payment-proofs/1-2-1700000000000.png")
        .header("x-upsert", "false")
        .header("content-type", "image/png")
        .body("png-bytes");
      then
        .status(200)
        .json_body(serde_json::json!({"Key": "payment-proofs/1-2-1700000000000.png"}));
    });

    let proof = ProofAsset::new("receipt.png", "image/png", b"png-bytes".to_vec());
    let stored = gateway(&server)
      .upload_object("payment-proofs", "1-2-1700000000000.png", &proof)
      .await
      .unwrap();
    mock.assert();
    assert_eq!(stored.path, "1-2-1700000000000.png");
  }

  #[tokio::test]
  async fn test_upload_conflict_is_an_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
      when.method(POST).path_contains("/storage/v1/object/payment-proofs/");
      then.status(409).json_body(serde_json::json!({
        "statusCode": "409", "error": "Duplicate", "message": "The resource already exists"
      }));
    });

    let proof = ProofAsset::new("a.png", "image/png", vec![1]);
    let err = gateway(&server)
      .upload_object("payment-proofs", "a.png", &proof)
      .await
      .unwrap_err();
    assert_eq!(err.to_string(), "The resource already exists (HTTP 409)");
  }

  #[tokio::test]
  async fn test_insert_registration_body() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
      when
        .method(POST)
        .path("/rest/v1/service_registrations")
        .header("prefer", "return=minimal")
        .json_body_partial(r#"{"full_name": "Ada Obi", "package_price": 15000.0, "status": "pending"}"#);
      then.status(201);
    });

    gateway(&server).insert_registration(&record()).await.unwrap();
    mock.assert();
  }

  #[test]
  fn test_public_url() {
    let gw = SupabaseGateway::new("https://abc.supabase.co/", SecretString::from("k")).unwrap();
    assert_eq!(
      gw.public_url("payment-proofs", "1-2-3.jpg"),
      "https://abc.supabase.co/storage/v1/object/public/payment-proofs/1-2-3.jpg"
    );
  }

  #[tokio::test]
  async fn test_site_meta_missing_row() {
    let server = MockServer::start();
    server.mock(|when, then| {
      when.method(GET).path("/rest/v1/site_meta").query_param("key", "eq.home_quote");
      then.status(200).json_body(serde_json::json!([]));
    });

    assert_eq!(gateway(&server).fetch_site_meta("home_quote").await.unwrap(), None);
  }

  #[tokio::test]
  async fn test_site_meta_text_value() {
    let server = MockServer::start();
    server.mock(|when, then| {
      when.method(GET).path("/rest/v1/site_meta");
      then
        .status(200)
        .json_body(serde_json::json!([{"value": "{\"text\":\"Hi\",\"author\":\"Me\"}"}]));
    });

    let value = gateway(&server).fetch_site_meta("home_quote").await.unwrap();
    assert_eq!(value.as_deref(), Some(r#"{"text":"Hi","author":"Me"}"#));
  }

  #[test]
  fn test_error_message_fields() {
    assert_eq!(error_message(r#"{"msg":"bad"}"#).as_deref(), Some("bad"));
    assert_eq!(error_message("not json"), None);
  }
}
