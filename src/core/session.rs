//! One load session: cache lookup, fetch, decompress, parse, cache insert,
//! delivery.

use std::rc::Rc;
use std::sync::Arc;

use log::{debug, error, info};
use tokio::sync::watch;

use super::cache::AssetCache;
use super::cancel::CancelToken;
use crate::error::LoadError;
use crate::loaders::maybe_decompress;
use crate::scene::SceneNode;
use crate::traits::{AssetFetcher, SceneParser};

/// Load result observed by a consumer.
#[derive(Debug, Clone, Default)]
pub enum LoadState {
    #[default]
    Pending,
    Ready(SceneNode),
    Failed(Arc<LoadError>),
}

impl LoadState {
    pub fn scene(&self) -> Option<&SceneNode> {
        match self {
            Self::Ready(scene) => Some(scene),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&Arc<LoadError>> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Pending)
    }

    pub fn into_scene(self) -> Option<SceneNode> {
        match self {
            Self::Ready(scene) => Some(scene),
            _ => None,
        }
    }
}

/// Runs load sessions against a shared cache, fetcher and parser
pub struct AssetLoader {
    cache: Rc<AssetCache>,
    fetcher: Rc<dyn AssetFetcher>,
    parser: Rc<dyn SceneParser>,
}

impl AssetLoader {
    pub fn new(
        cache: Rc<AssetCache>,
        fetcher: Rc<dyn AssetFetcher>,
        parser: Rc<dyn SceneParser>,
    ) -> Rc<Self> {
        Rc::new(Self {
            cache,
            fetcher,
            parser,
        })
    }

    pub fn cache(&self) -> &Rc<AssetCache> {
        &self.cache
    }

    /// Runs one session for `key`, publishing into `status`.
    ///
    /// Nothing is published and nothing is cached once `token` is cancelled.
    /// The cache is consulted exactly once, before fetching.
    pub async fn run(&self, key: &str, token: &CancelToken, status: &watch::Sender<LoadState>) {
        let publish = |state: LoadState| {
            if !token.is_cancelled() {
                status.send_replace(state);
            }
        };
        let fail = |err: LoadError| {
            if token.is_cancelled() {
                debug!("Ignoring failure of cancelled load {}: {}", key, err);
                return;
            }
            error!("Model load failed: {}: {}", key, err);
            publish(LoadState::Failed(Arc::new(err)));
        };

        publish(LoadState::Pending);

        if let Some(scene) = self.cache.get(key) {
            info!("Using cached model: {}", key);
            publish(LoadState::Ready(scene));
            return;
        }

        info!("Fetching model: {}", key);
        let bytes = match self.fetcher.fetch(key).await {
            Ok(bytes) => bytes,
            Err(err) => return fail(err),
        };

        if token.is_cancelled() {
            debug!("Load cancelled after fetch: {}", key);
            return;
        }

        let payload = match maybe_decompress(&bytes) {
            Ok(payload) => payload.into_owned(),
            Err(err) => return fail(err),
        };
        drop(bytes);

        if token.is_cancelled() {
            debug!("Load cancelled after decompression: {}", key);
            return;
        }

        let scene = match self.parser.parse(payload).await {
            Ok(scene) => scene,
            Err(err) => return fail(err),
        };

        if token.is_cancelled() {
            debug!("Discarding parsed model for cancelled load: {}", key);
            return;
        }

        // The cache keeps its own copy; `scene` goes to the consumer
        self.cache.put(key, &scene);

        // Cache observers run synchronously inside `put` and may detach us
        if token.is_cancelled() {
            debug!("Load cancelled while caching: {}", key);
            return;
        }

        info!("Model loaded successfully: {}", key);
        publish(LoadState::Ready(scene));
    }
}

impl std::fmt::Debug for AssetLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetLoader")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}
