use color_eyre::{eyre::eyre, Result};
use reqwest::header::CACHE_CONTROL;
use url::Url;

use crate::cache::RequestKey;

/// HTTP transport for the directory server.
///
/// Fetches always ask intermediaries for fresh bytes; offline behavior is
/// the cache manager's job, not the transport's.
#[derive(Clone)]
pub struct DirectoryClient {
  http: reqwest::Client,
  base: Url,
}

impl DirectoryClient {
  pub fn new(base: Url) -> Self {
    Self {
      http: reqwest::Client::new(),
      base,
    }
  }

  /// Resolve a server-relative asset path against the base URL.
  pub fn url_for(&self, path: &str) -> Result<Url> {
    self
      .base
      .join(path)
      .map_err(|e| eyre!("Invalid asset path {}: {}", path, e))
  }

  /// Cache identity of a GET for the given asset path.
  pub fn request_key(&self, path: &str) -> Result<RequestKey> {
    Ok(RequestKey::get(&self.url_for(path)?))
  }

  /// GET an asset. Non-success statuses are errors.
  pub async fn get(&self, path: &str) -> Result<Vec<u8>> {
    let url = self.url_for(path)?;

    let response = self
      .http
      .get(url.clone())
      .header(CACHE_CONTROL, "no-store")
      .send()
      .await
      .map_err(|e| eyre!("Request to {} failed: {}", url, e))?
      .error_for_status()
      .map_err(|e| eyre!("Request to {} failed: {}", url, e))?;

    let body = response
      .bytes()
      .await
      .map_err(|e| eyre!("Reading {} failed: {}", url, e))?;

    Ok(body.to_vec())
  }
}
