use std::rc::Rc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::cancel::CancelToken;
use super::session::{AssetLoader, LoadState};

/// A consumer's live view of one asset.
///
/// Every key change starts a fresh, independent session and cancels the
/// previous one; dropping the binding cancels the current one. Sessions run
/// on the current `LocalSet`, so bindings must be created inside one.
pub struct AssetBinding {
    loader: Rc<AssetLoader>,
    key: String,
    token: CancelToken,
    status: Rc<watch::Sender<LoadState>>,
    receiver: watch::Receiver<LoadState>,
    task: Option<JoinHandle<()>>,
}

impl AssetLoader {
    /// Starts loading `key` for a new consumer.
    ///
    /// # Panics
    ///
    /// Panics when called outside a `tokio::task::LocalSet`.
    pub fn bind(self: &Rc<Self>, key: impl Into<String>) -> AssetBinding {
        let (status, receiver) = watch::channel(LoadState::Pending);
        let mut binding = AssetBinding {
            loader: Rc::clone(self),
            key: key.into(),
            token: CancelToken::new(),
            status: Rc::new(status),
            receiver,
            task: None,
        };
        binding.start();
        binding
    }
}

impl AssetBinding {
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Copy of the current state
    pub fn state(&self) -> LoadState {
        self.receiver.borrow().clone()
    }

    pub fn is_loading(&self) -> bool {
        self.receiver.borrow().is_loading()
    }

    /// Receiver that observes every state change of this binding
    pub fn subscribe(&self) -> watch::Receiver<LoadState> {
        self.receiver.clone()
    }

    /// Points the binding at a new key. The same key is a no-op.
    pub fn set_key(&mut self, key: impl Into<String>) {
        let key = key.into();
        if key == self.key {
            return;
        }
        self.token.cancel();
        self.key = key;
        self.token = CancelToken::new();
        self.start();
    }

    /// Waits until the current session leaves the pending state
    pub async fn settled(&self) -> LoadState {
        let mut receiver = self.receiver.clone();
        if let Ok(state) = receiver.wait_for(|state| !state.is_loading()).await {
            return state.clone();
        }
        // Sender lives as long as the binding
        self.state()
    }

    /// Stops observing; an in-flight session finishes without publishing.
    /// Returns the session task so callers can wait for it to wind down.
    pub fn detach(mut self) -> Option<JoinHandle<()>> {
        self.token.cancel();
        self.task.take()
    }

    fn start(&mut self) {
        // Pending is visible before the session task first runs
        self.status.send_replace(LoadState::Pending);

        let loader = Rc::clone(&self.loader);
        let key = self.key.clone();
        let token = self.token.clone();
        let status = Rc::clone(&self.status);

        self.task = Some(tokio::task::spawn_local(async move {
            loader.run(&key, &token, &status).await;
        }));
    }
}

impl Drop for AssetBinding {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

impl std::fmt::Debug for AssetBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetBinding")
            .field("key", &self.key)
            .field("cancelled", &self.token.is_cancelled())
            .finish_non_exhaustive()
    }
}
