use async_trait::async_trait;

use crate::error::LoadError;
use crate::scene::SceneNode;

/// Scene parser boundary - turns a decompressed payload into a scene root
#[async_trait(?Send)]
pub trait SceneParser {
    /// Parse the payload; no format marker is required
    async fn parse(&self, bytes: Vec<u8>) -> Result<SceneNode, LoadError>;
}
