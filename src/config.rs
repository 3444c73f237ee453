//! Run configuration: storage addressing and paging, from flags with env overrides.

use thiserror::Error;
use tracing::debug;

use crate::storage::PagingParameters;
use crate::types::DataImportEventPayload;

pub const ENV_OKAPI_URL: &str = "INVENTORY_IMPORT_OKAPI_URL";
pub const ENV_TENANT: &str = "INVENTORY_IMPORT_TENANT";
pub const ENV_TOKEN: &str = "INVENTORY_IMPORT_TOKEN";
pub const ENV_PAGE_LIMIT: &str = "INVENTORY_IMPORT_PAGE_LIMIT";

pub const DEFAULT_PAGE_LIMIT: u32 = 10;

/// Name reported when the page limit came from the command line.
pub const FLAG_PAGE_LIMIT: &str = "--page-limit";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
  #[error("{var} must be a positive integer, got '{value}'")]
  InvalidPageLimit { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportConfig {
  pub okapi_url: Option<String>,
  pub tenant: Option<String>,
  pub token: Option<String>,
  /// Page size for loader queries and the duplicate check.
  pub page_limit: u32,
}

impl Default for ImportConfig {
  fn default() -> Self {
    Self {
      okapi_url: None,
      tenant: None,
      token: None,
      page_limit: DEFAULT_PAGE_LIMIT,
    }
  }
}

impl ImportConfig {
  /// Applies environment overrides from the process environment.
  pub fn with_env(self) -> Result<Self, ConfigError> {
    self.with_env_from(|k| std::env::var(k).ok())
  }

  /// Applies overrides from `lookup`; set variables win over current values.
  pub fn with_env_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
    if let Some(v) = lookup(ENV_OKAPI_URL) {
      self.okapi_url = Some(v);
    }
    if let Some(v) = lookup(ENV_TENANT) {
      self.tenant = Some(v);
    }
    if let Some(v) = lookup(ENV_TOKEN) {
      self.token = Some(v);
    }
    match lookup(ENV_PAGE_LIMIT) {
      Some(v) => {
        self.page_limit = match v.trim().parse::<u32>() {
          Ok(n) if n > 0 => n,
          _ => {
            return Err(ConfigError::InvalidPageLimit {
              var: ENV_PAGE_LIMIT,
              value: v,
            });
          }
        };
      }
      None if self.page_limit == 0 => {
        return Err(ConfigError::InvalidPageLimit {
          var: FLAG_PAGE_LIMIT,
          value: self.page_limit.to_string(),
        });
      }
      None => {}
    }
    debug!(
      okapi_url = ?self.okapi_url,
      tenant = ?self.tenant,
      page_limit = self.page_limit,
      "import config"
    );
    Ok(self)
  }

  pub fn paging(&self) -> PagingParameters {
    PagingParameters::new(self.page_limit, 0)
  }

  /// Fills storage addressing the payload does not carry itself.
  pub fn apply_to(&self, payload: &mut DataImportEventPayload) {
    if payload.okapi_url.is_none() {
      payload.okapi_url = self.okapi_url.clone();
    }
    if payload.tenant.is_none() {
      payload.tenant = self.tenant.clone();
    }
    if payload.token.is_none() {
      payload.token = self.token.clone();
    }
  }
}
