//! Error types for asset loading.

use std::io;

/// Why a load session failed.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// Fetch failed or the server answered with a non-success status.
    #[error("failed to fetch {key}: {message}")]
    Transport { key: String, message: String },

    /// Payload carried the gzip signature but the stream was malformed.
    #[error("failed to decompress payload: {0}")]
    Decompression(#[source] io::Error),

    /// Payload is not a valid scene description.
    #[error("failed to parse scene: {message}")]
    Parse { message: String },
}

impl LoadError {
    pub fn transport(key: &str, message: impl Into<String>) -> Self {
        Self::Transport {
            key: key.to_string(),
            message: message.into(),
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Short machine-readable category.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport { .. } => "transport",
            Self::Decompression(_) => "decompression",
            Self::Parse { .. } => "parse",
        }
    }
}

impl From<gltf::Error> for LoadError {
    fn from(err: gltf::Error) -> Self {
        Self::parse(err.to_string())
    }
}
