use async_trait::async_trait;

use crate::error::LoadError;

/// Fetch boundary - resolves an asset key to its raw bytes
#[async_trait(?Send)]
pub trait AssetFetcher {
    /// Fetch the payload stored at `key`
    async fn fetch(&self, key: &str) -> Result<Vec<u8>, LoadError>;
}
