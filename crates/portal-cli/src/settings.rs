//! Layered configuration: optional TOML file, then `PORTAL_*` environment
//! variables. Command-line flags are applied on top by `main`.

use std::{path::Path, time::Duration};

use anyhow::Context as _;
use config::{Config, ConfigBuilder, Environment, File, builder::DefaultState};
use serde::Deserialize;

use crate::client::{ApiConfig, DEFAULT_TIMEOUT};

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
  /// Root of the portal API, e.g. `https://portal.example.com/api`.
  #[serde(default = "default_base_url")]
  pub base_url:     String,
  /// Bearer token issued at login.
  #[serde(default)]
  pub token:        Option<String>,
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
}

fn default_base_url() -> String { "http://localhost:8000/api".to_string() }

fn default_timeout_secs() -> u64 { DEFAULT_TIMEOUT.as_secs() }

impl Settings {
  /// Read `path` (if it exists) and the environment.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    Self::from_builder(
      Config::builder()
        .add_source(File::from(path).required(false))
        .add_source(Environment::with_prefix("PORTAL").try_parsing(true)),
    )
  }

  pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> anyhow::Result<Self> {
    builder
      .build()
      .context("failed to read configuration")?
      .try_deserialize()
      .context("failed to deserialise settings")
  }

  pub fn api_config(&self) -> ApiConfig {
    ApiConfig {
      base_url: self.base_url.clone(),
      token:    self.token.clone().filter(|t| !t.is_empty()),
      timeout:  Duration::from_secs(self.timeout_secs),
    }
  }
}

#[cfg(test)]
mod tests {
  use config::FileFormat;

  use super::*;

  #[test]
  fn defaults_apply_to_empty_config() {
    let settings = Settings::from_builder(Config::builder()).unwrap();
    assert_eq!(settings.base_url, "http://localhost:8000/api");
    assert!(settings.token.is_none());
    assert_eq!(settings.api_config().timeout, Duration::from_secs(10));
  }

  #[test]
  fn reads_toml_source() {
    let toml = r#"
      base_url = "https://portal.example.com/api"
      token = "abc123"
      timeout_secs = 3
    "#;
    let settings = Settings::from_builder(
      Config::builder().add_source(File::from_str(toml, FileFormat::Toml)),
    )
    .unwrap();
    let api = settings.api_config();
    assert_eq!(api.base_url, "https://portal.example.com/api");
    assert_eq!(api.token.as_deref(), Some("abc123"));
    assert_eq!(api.timeout, Duration::from_secs(3));
  }

  #[test]
  fn empty_token_means_unauthenticated() {
    let settings = Settings::from_builder(
      Config::builder().add_source(File::from_str(r#"token = """#, FileFormat::Toml)),
    )
    .unwrap();
    assert!(settings.api_config().token.is_none());
  }

  #[test]
  fn missing_file_is_not_an_error() {
    let settings = Settings::load(Path::new("/nonexistent/portal.toml")).unwrap();
    assert!(!settings.base_url.is_empty());
  }
}
