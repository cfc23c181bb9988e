//! Runtime configuration: `config.toml` layered under `OUTCOMES_*` variables.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use outcomes_csv::EncodingChain;
use serde::Deserialize;

/// Runtime server configuration. Every key is optional.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:             String,
  #[serde(default = "default_port")]
  pub port:             u16,
  #[serde(default = "default_store_path")]
  pub store_path:       PathBuf,
  #[serde(default = "default_max_upload_bytes")]
  pub max_upload_bytes: usize,
  /// Candidate encodings for uploads, tried in order.
  #[serde(default)]
  pub encodings:        EncodingChain,
}

fn default_host() -> String { "127.0.0.1".into() }

fn default_port() -> u16 { 5000 }

fn default_store_path() -> PathBuf { PathBuf::from("data.sqlite3") }

fn default_max_upload_bytes() -> usize { 16 * 1024 * 1024 }

impl ServerConfig {
  /// Read `path` if it exists, then apply `OUTCOMES_*` environment overrides.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path.to_path_buf()).required(false))
      .add_source(config::Environment::with_prefix("OUTCOMES"))
      .build()
      .context("failed to read config file")?;

    settings
      .try_deserialize()
      .context("failed to deserialise ServerConfig")
  }

  /// `store_path` with a leading `~` expanded to the user's home directory.
  pub fn resolved_store_path(&self) -> PathBuf { expand_tilde(&self.store_path) }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
