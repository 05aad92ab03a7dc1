//! Application configuration.
//!
//! Values are resolved with priority: config.toml > environment (.env) > default.
//! Fixed limits that are part of the registration contract live here as
//! constants so handlers and services share one definition.

use secrecy::SecretString;
use serde::Deserialize;
use std::path::Path;

// ==================== Server Configuration ====================

/// Default address to bind to
pub const SERVER_ADDR: &str = "0.0.0.0";

/// Default server port
pub const SERVER_PORT: u16 = 3000;

/// Directory served under /static
pub const STATIC_DIR: &str = "static";

// ==================== Registration Configuration ====================

/// Largest accepted proof-of-payment image (5 MiB)
pub const MAX_PROOF_BYTES: usize = 5 * 1024 * 1024;

/// Request body limit for multipart uploads; leaves headroom so oversized
/// images reach validation and get a proper message
pub const UPLOAD_BODY_LIMIT: usize = 8 * 1024 * 1024;

/// Image types accepted as proof of payment
pub const ALLOWED_PROOF_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/webp", "image/gif"];

/// Storage bucket holding proof images
pub const DEFAULT_PROOF_BUCKET: &str = "payment-proofs";

/// Cache lifetime (seconds) attached to uploaded proofs
pub const PROOF_CACHE_CONTROL: &str = "3600";

pub const SERVICES_TABLE: &str = "services";
pub const REGISTRATIONS_TABLE: &str = "service_registrations";
pub const BANNERS_TABLE: &str = "news_banners";
pub const TESTIMONIES_TABLE: &str = "testimonies";
pub const SITE_META_TABLE: &str = "site_meta";

/// site_meta key holding the home page quote as a JSON string
pub const HOME_QUOTE_KEY: &str = "home_quote";

// ==================== Visitor Configuration ====================

/// Default lifetime of an untouched visitor entry (wizard + catalog) in minutes
pub const DEFAULT_WIZARD_TTL_MINUTES: i64 = 60;

/// Visitors idle this long while holding an unsent proof image are dropped
/// early, since the image stays in memory until then
pub const PROOF_TTL_MINUTES: i64 = 15;

/// Upper bound on tracked visitors; the least recently seen one is evicted
pub const MAX_VISITORS: usize = 1_000;

/// Probability threshold for visitor cleanup (0-255, lower = more frequent)
/// Value of 25 means ~10% chance (25/256) on each visitor access
pub const VISITOR_CLEANUP_THRESHOLD: u8 = 25;

// ==================== Loaded Configuration ====================

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  #[error("Failed to read {path}: {source}")]
  Read {
    path: String,
    source: std::io::Error,
  },
  #[error("Invalid config file: {0}")]
  Parse(#[from] toml::de::Error),
  #[error("Invalid value for {key}: {value}")]
  InvalidValue { key: &'static str, value: String },
}

/// config.toml structure; every field is optional so partial files work
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
  server: Option<ServerSection>,
  supabase: Option<SupabaseSection>,
  payments: Option<PaymentsSection>,
  site: Option<SiteSection>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerSection {
  addr: Option<String>,
  port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
struct SupabaseSection {
  url: Option<String>,
  anon_key: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct PaymentsSection {
  bucket: Option<String>,
  account_name: Option<String>,
  account_number: Option<String>,
  bank_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct SiteSection {
  contact_email: Option<String>,
  wizard_ttl_minutes: Option<i64>,
}

/// Bank account shown on the payment step
#[derive(Debug, Clone, PartialEq)]
pub struct BankDetails {
  pub account_name: String,
  pub account_number: String,
  pub bank_name: String,
}

impl Default for BankDetails {
  fn default() -> Self {
    Self {
      account_name: "Chinonso O Osuji-lco".to_string(),
      account_number: "9635952887".to_string(),
      bank_name: "Providus Bank".to_string(),
    }
  }
}

/// Backend connection settings
#[derive(Debug)]
pub struct SupabaseSettings {
  pub url: String,
  pub anon_key: SecretString,
}

#[derive(Debug)]
pub struct SiteConfig {
  pub server_addr: String,
  pub server_port: u16,
  /// `None` runs the site against the built-in demo catalog
  pub supabase: Option<SupabaseSettings>,
  pub proof_bucket: String,
  pub bank: BankDetails,
  pub contact_email: String,
  pub wizard_ttl_minutes: i64,
}

impl Default for SiteConfig {
  fn default() -> Self {
    Self {
      server_addr: SERVER_ADDR.to_string(),
      server_port: SERVER_PORT,
      supabase: None,
      proof_bucket: DEFAULT_PROOF_BUCKET.to_string(),
      bank: BankDetails::default(),
      contact_email: "berryraytechnologies@gmail.com".to_string(),
      wizard_ttl_minutes: DEFAULT_WIZARD_TTL_MINUTES,
    }
  }
}

impl SiteConfig {
  /// Load configuration from `CONFIG_PATH` (default config.toml) and the environment
  pub fn load() -> Result<Self, ConfigError> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    Self::load_from(Path::new(&path), |key| std::env::var(key).ok())
  }

  /// Load from a specific file; a missing file means "defaults + environment"
  pub fn load_from(path: &Path, env: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
    let file = if path.exists() {
      let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
      })?;
      tracing::info!("Using configuration from {}", path.display());
      Some(contents)
    } else {
      None
    };

    Self::resolve(file.as_deref(), env)
  }

  /// Merge an optional config.toml body with an environment lookup
  pub fn resolve(
    toml_body: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
  ) -> Result<Self, ConfigError> {
    let file: FileConfig = match toml_body {
      Some(body) => toml::from_str(body)?,
      None => FileConfig::default(),
    };
    let defaults = Self::default();

    let server = file.server.unwrap_or_default();
    let supabase = file.supabase.unwrap_or_default();
    let payments = file.payments.unwrap_or_default();
    let site = file.site.unwrap_or_default();

    let server_port = match server.port {
      Some(port) => port,
      None => match env("PORT") {
        Some(raw) => raw
          .parse()
          .map_err(|_| ConfigError::InvalidValue { key: "PORT", value: raw })?,
        None => defaults.server_port,
      },
    };

    let url = non_empty(supabase.url).or_else(|| non_empty(env("SUPABASE_URL")));
    let anon_key = non_empty(supabase.anon_key).or_else(|| non_empty(env("SUPABASE_ANON_KEY")));
    let supabase = match (url, anon_key) {
      (Some(url), Some(key)) => Some(SupabaseSettings {
        url: url.trim_end_matches('/').to_string(),
        anon_key: SecretString::from(key),
      }),
      (Some(_), None) | (None, Some(_)) => {
        tracing::warn!("Supabase URL and anon key must both be set; backend disabled");
        None
      }
      (None, None) => None,
    };

    let wizard_ttl_minutes = site.wizard_ttl_minutes.unwrap_or(defaults.wizard_ttl_minutes);
    if wizard_ttl_minutes <= 0 {
      return Err(ConfigError::InvalidValue {
        key: "site.wizard_ttl_minutes",
        value: wizard_ttl_minutes.to_string(),
      });
    }

    Ok(Self {
      server_addr: non_empty(server.addr).unwrap_or(defaults.server_addr),
      server_port,
      supabase,
      proof_bucket: non_empty(payments.bucket).unwrap_or(defaults.proof_bucket),
      bank: BankDetails {
        account_name: non_empty(payments.account_name).unwrap_or(defaults.bank.account_name),
        account_number: non_empty(payments.account_number).unwrap_or(defaults.bank.account_number),
        bank_name: non_empty(payments.bank_name).unwrap_or(defaults.bank.bank_name),
      },
      contact_email: non_empty(site.contact_email).unwrap_or(defaults.contact_email),
      wizard_ttl_minutes,
    })
  }

  /// Get the full server bind address
  pub fn bind_addr(&self) -> String {
    format!("{}:{}", self.server_addr, self.server_port)
  }
}

fn non_empty(value: Option<String>) -> Option<String> {
  value.filter(|v| !v.trim().is_empty())
}
