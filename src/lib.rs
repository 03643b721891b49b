pub mod cli;
pub mod core;
pub mod error;
pub mod loaders;
pub mod math;
pub mod models;
pub mod scene;
pub mod traits;

pub use self::core::{AssetBinding, AssetCache, AssetLoader, CancelToken, LoadState};
pub use error::LoadError;
pub use scene::{SceneNode, SceneSummary};
