//! Fetch boundary implementations: HTTP, local files, and the XOR-obfuscated
//! variant wrapper.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use log::debug;
use url::Url;

use crate::error::LoadError;
use crate::loaders::obfuscate::{xor_bytes, OBFUSCATION_KEY};
use crate::traits::AssetFetcher;

/// User agent for asset requests.
const USER_AGENT_VALUE: &str = concat!("chair-loader/", env!("CARGO_PKG_VERSION"));

/// Fetches assets over HTTP, resolving keys against a base URL.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpFetcher {
    pub fn new(base_url: &str) -> Result<Self, LoadError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| LoadError::transport(base_url, format!("invalid base URL: {e}")))?;

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT_VALUE)
            .build()
            .map_err(|e| {
                LoadError::transport(base_url.as_str(), format!("failed to create HTTP client: {e}"))
            })?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Absolute URL for a key; absolute keys are used as-is.
    pub fn resolve(&self, key: &str) -> Result<Url, LoadError> {
        self.base_url
            .join(key)
            .map_err(|e| LoadError::transport(key, format!("invalid asset address: {e}")))
    }
}

#[async_trait(?Send)]
impl AssetFetcher for HttpFetcher {
    async fn fetch(&self, key: &str) -> Result<Vec<u8>, LoadError> {
        let url = self.resolve(key)?;
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| LoadError::transport(key, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::transport(key, format!("HTTP {status}")));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| LoadError::transport(key, format!("failed to read response body: {e}")))?;

        Ok(body.to_vec())
    }
}

/// Serves keys from a local asset directory, the way a static dev server
/// maps `/chair.glb.gz` onto `public/chair.glb.gz`.
#[derive(Debug, Clone)]
pub struct FileFetcher {
    root: PathBuf,
}

impl FileFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn resolve(&self, key: &str) -> PathBuf {
        self.root.join(key.trim_start_matches('/'))
    }
}

#[async_trait(?Send)]
impl AssetFetcher for FileFetcher {
    async fn fetch(&self, key: &str) -> Result<Vec<u8>, LoadError> {
        let path = self.resolve(key);
        debug!("reading {:?}", path);

        tokio::fs::read(&path)
            .await
            .map_err(|e| LoadError::transport(key, format!("{}: {e}", path.display())))
    }
}

/// Reverses the single-byte XOR obfuscation after the inner fetch.
#[derive(Debug, Clone)]
pub struct XorFetcher<F> {
    inner: F,
    key: u8,
}

impl<F> XorFetcher<F> {
    pub fn new(inner: F) -> Self {
        Self::with_key(inner, OBFUSCATION_KEY)
    }

    pub fn with_key(inner: F, key: u8) -> Self {
        Self { inner, key }
    }
}

#[async_trait(?Send)]
impl<F: AssetFetcher> AssetFetcher for XorFetcher<F> {
    async fn fetch(&self, key: &str) -> Result<Vec<u8>, LoadError> {
        let mut bytes = self.inner.fetch(key).await?;
        xor_bytes(&mut bytes, self.key);
        Ok(bytes)
    }
}
