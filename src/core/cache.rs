//! In-memory scene cache keyed by asset address.
//!
//! The cache owns canonical copies and hands out clones: `put` stores a copy
//! of the caller's scene and `get` returns a fresh copy on every call, so no
//! two consumers ever attach the same scene object.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use chrono::{DateTime, Utc};
use log::info;
use serde::Serialize;

use crate::scene::SceneNode;

type Observer = Rc<dyn Fn()>;

#[derive(Debug)]
struct CacheEntry {
    scene: SceneNode,
    cached_at: DateTime<Utc>,
}

/// Process-scoped scene cache with a global enable switch.
///
/// Single-threaded by construction (`Rc`/`RefCell`); share it as
/// `Rc<AssetCache>` between loaders and UI observers on one thread.
pub struct AssetCache {
    entries: RefCell<HashMap<String, CacheEntry>>,
    enabled: Cell<bool>,
    observers: RefCell<Vec<(u64, Observer)>>,
    next_observer_id: Cell<u64>,
}

impl AssetCache {
    /// Creates an empty, enabled cache.
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            entries: RefCell::new(HashMap::new()),
            enabled: Cell::new(true),
            observers: RefCell::new(Vec::new()),
            next_observer_id: Cell::new(0),
        })
    }

    /// Copy of the cached scene; always `None` while caching is disabled.
    pub fn get(&self, key: &str) -> Option<SceneNode> {
        if !self.enabled.get() {
            return None;
        }
        self.entries
            .borrow()
            .get(key)
            .map(|entry| entry.scene.clone())
    }

    /// Stores a copy of `scene` under `key`, replacing any previous entry.
    /// Does nothing while caching is disabled.
    pub fn put(&self, key: &str, scene: &SceneNode) {
        if !self.enabled.get() {
            return;
        }
        self.entries.borrow_mut().insert(
            key.to_string(),
            CacheEntry {
                scene: scene.clone(),
                cached_at: Utc::now(),
            },
        );
        self.notify();
    }

    /// Toggling never touches existing entries.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.set(enabled);
        info!("Cache {}", if enabled { "enabled" } else { "disabled" });
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.get()
    }

    /// Drops every entry and notifies observers.
    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
        info!("Cache cleared");
        self.notify();
    }

    /// Drops a single entry. Observers are notified only if it existed.
    pub fn evict(&self, key: &str) -> bool {
        let removed = self.entries.borrow_mut().remove(key).is_some();
        if removed {
            info!("Cache evicted: {}", key);
            self.notify();
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Registers a callback fired after every `put`, `clear` and effective
    /// `evict`. The callback is removed when the returned guard is dropped.
    pub fn subscribe(self: &Rc<Self>, callback: impl Fn() + 'static) -> Subscription {
        let id = self.next_observer_id.get();
        self.next_observer_id.set(id + 1);
        self.observers.borrow_mut().push((id, Rc::new(callback)));

        Subscription {
            cache: Rc::downgrade(self),
            id,
        }
    }

    pub fn observer_count(&self) -> usize {
        self.observers.borrow().len()
    }

    /// Read-only listing of retained entries, ordered by key.
    ///
    /// Lists entries even while caching is disabled.
    pub fn snapshot(&self) -> CacheSnapshot {
        let entries = self.entries.borrow();
        let mut summaries: Vec<CacheEntrySummary> = entries
            .iter()
            .map(|(key, entry)| CacheEntrySummary {
                key: key.clone(),
                nodes: entry.scene.descendant_count(),
                meshes: entry.scene.mesh_count(),
                vertices: entry.scene.vertex_count(),
                cached_at: entry.cached_at,
            })
            .collect();
        summaries.sort_by(|a, b| a.key.cmp(&b.key));

        CacheSnapshot {
            enabled: self.enabled.get(),
            entries: summaries,
        }
    }

    fn unsubscribe(&self, id: u64) {
        self.observers
            .borrow_mut()
            .retain(|(observer_id, _)| *observer_id != id);
    }

    fn notify(&self) {
        // Observers may call back into the cache, so no borrow is held while
        // they run
        let observers: Vec<(u64, Observer)> = self
            .observers
            .borrow()
            .iter()
            .map(|(id, observer)| (*id, Rc::clone(observer)))
            .collect();

        for (id, observer) in observers {
            // An earlier observer may have unsubscribed this one
            if self.is_registered(id) {
                observer();
            }
        }
    }

    fn is_registered(&self, id: u64) -> bool {
        self.observers
            .borrow()
            .iter()
            .any(|(observer_id, _)| *observer_id == id)
    }
}

impl std::fmt::Debug for AssetCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetCache")
            .field("enabled", &self.enabled.get())
            .field("entries", &self.len())
            .field("observers", &self.observer_count())
            .finish()
    }
}

/// Keeps a cache observer registered until dropped.
#[must_use = "dropping the subscription unregisters the observer"]
#[derive(Debug)]
pub struct Subscription {
    cache: Weak<AssetCache>,
    id: u64,
}

impl Subscription {
    pub fn unsubscribe(self) {
        // Drop does the work
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cache) = self.cache.upgrade() {
            cache.unsubscribe(self.id);
        }
    }
}

/// Diagnostic view of the cache
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CacheSnapshot {
    pub enabled: bool,
    pub entries: Vec<CacheEntrySummary>,
}

impl CacheSnapshot {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CacheEntrySummary {
    pub key: String,
    /// Number of objects below the scene root
    pub nodes: usize,
    pub meshes: usize,
    pub vertices: usize,
    pub cached_at: DateTime<Utc>,
}
