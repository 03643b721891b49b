pub mod binding;
pub mod cache;
pub mod cancel;
pub mod session;

pub use binding::AssetBinding;
pub use cache::{AssetCache, CacheEntrySummary, CacheSnapshot, Subscription};
pub use cancel::CancelToken;
pub use session::{AssetLoader, LoadState};
