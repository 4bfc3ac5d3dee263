use async_trait::async_trait;
use url::Url;

use super::{MaybeBytes, ReadableStore, StorageError};

/// Store over an HTTP(S) base URL.
///
/// A 404 response is a missing key; any other non-success status or
/// connection failure is a transport error.
#[derive(Debug, Clone)]
pub struct HttpStore {
    base: Url,
    client: reqwest::Client,
}

impl HttpStore {
    pub fn new(base: &str) -> Result<Self, StorageError> {
        let mut base = Url::parse(base)
            .map_err(|e| StorageError::Transport(format!("invalid base url {base:?}: {e}")))?;
        // Url::join treats a path without a trailing slash as a file.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self {
            base,
            client: reqwest::Client::new(),
        })
    }

    fn key_url(&self, key: &str) -> Result<Url, StorageError> {
        self.base
            .join(key)
            .map_err(|e| StorageError::Transport(format!("invalid key {key:?}: {e}")))
    }
}

#[async_trait]
impl ReadableStore for HttpStore {
    async fn get(&self, key: &str) -> Result<MaybeBytes, StorageError> {
        let url = self.key_url(key)?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| StorageError::Transport(e.to_string()))?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = response
            .error_for_status()
            .map_err(|e| StorageError::Transport(e.to_string()))?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| StorageError::Transport(e.to_string()))?;
        Ok(Some(bytes))
    }
}
