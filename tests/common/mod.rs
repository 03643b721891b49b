#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::io::Write;
use std::rc::Rc;
use std::time::Duration;

use async_trait::async_trait;
use chair_loader::core::{AssetCache, AssetLoader};
use chair_loader::loaders::GltfParser;
use chair_loader::traits::{AssetFetcher, SceneParser};
use chair_loader::{LoadError, SceneNode};
use flate2::write::GzEncoder;
use flate2::Compression;
use tokio::sync::Notify;

pub const CHAIR_KEY: &str = "/chair.glb.gz";
pub const STOOL_KEY: &str = "/stool.glb";
pub const TABLE_KEY: &str = "/table.glb.gz";
pub const DRACO_KEY: &str = "/blender-compressed/chair-transformed.glb.gz";

/// Scene "Chair Scene": Chair -> (Seat, Back), one 24-vertex cube mesh each
pub const CHAIR_GLTF: &str = r#"{
    "asset": { "version": "2.0" },
    "scene": 0,
    "scenes": [ { "name": "Chair Scene", "nodes": [0] } ],
    "nodes": [
        { "name": "Chair", "children": [1, 2] },
        { "name": "Seat", "mesh": 0 },
        { "name": "Back", "mesh": 0, "translation": [0.0, 2.0, 0.0] }
    ],
    "meshes": [ { "name": "Cube", "primitives": [ { "attributes": { "POSITION": 0 } } ] } ],
    "accessors": [
        {
            "componentType": 5126,
            "count": 24,
            "type": "VEC3",
            "min": [-1.0, -1.0, -1.0],
            "max": [1.0, 1.0, 1.0]
        }
    ]
}"#;

/// Scene "Stool Scene" with a single empty node
pub const STOOL_GLTF: &str = r#"{
    "asset": { "version": "2.0" },
    "scenes": [ { "name": "Stool Scene", "nodes": [0] } ],
    "nodes": [ { "name": "Stool" } ]
}"#;

/// JSON chunk of `table_glb()`: one triangle whose positions live in the BIN chunk
pub const TABLE_GLB_JSON: &str = r#"{
    "asset": { "version": "2.0" },
    "scene": 0,
    "scenes": [ { "name": "Table Scene", "nodes": [0] } ],
    "nodes": [ { "name": "Table", "mesh": 0 } ],
    "meshes": [ { "name": "Top", "primitives": [ { "attributes": { "POSITION": 0 } } ] } ],
    "accessors": [
        {
            "bufferView": 0,
            "componentType": 5126,
            "count": 3,
            "type": "VEC3",
            "min": [0.0, 0.0, 0.0],
            "max": [2.0, 1.0, 0.0]
        }
    ],
    "bufferViews": [ { "buffer": 0, "byteLength": 36 } ],
    "buffers": [ { "byteLength": 36 } ]
}"#;

/// JSON chunk of `draco_glb()`, shaped like a glTF-Transform Draco export
pub const DRACO_GLB_JSON: &str = r#"{
    "asset": { "version": "2.0", "generator": "glTF-Transform v4" },
    "extensionsUsed": ["KHR_draco_mesh_compression"],
    "extensionsRequired": ["KHR_draco_mesh_compression"],
    "scene": 0,
    "scenes": [ { "name": "Draco Chair", "nodes": [0] } ],
    "nodes": [ { "name": "Chair", "children": [1] }, { "name": "Cushion", "mesh": 0 } ],
    "meshes": [ {
        "name": "Cushion",
        "primitives": [ {
            "attributes": { "POSITION": 0 },
            "extensions": {
                "KHR_draco_mesh_compression": { "bufferView": 0, "attributes": { "POSITION": 0 } }
            }
        } ]
    } ],
    "accessors": [
        { "componentType": 5126, "count": 507, "type": "VEC3", "min": [-0.5, 0.0, -0.5], "max": [0.5, 1.2, 0.5] }
    ],
    "bufferViews": [ { "buffer": 0, "byteLength": 16 } ],
    "buffers": [ { "byteLength": 16 } ]
}"#;

/// Binary glTF container: header, JSON chunk, BIN chunk
pub fn glb(json: &str, bin: &[u8]) -> Vec<u8> {
    let mut json = json.as_bytes().to_vec();
    while json.len() % 4 != 0 {
        json.push(b' ');
    }
    let mut bin = bin.to_vec();
    while bin.len() % 4 != 0 {
        bin.push(0);
    }

    let total = 12 + 8 + json.len() + 8 + bin.len();
    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(b"glTF");
    out.extend_from_slice(&2u32.to_le_bytes());
    out.extend_from_slice(&(total as u32).to_le_bytes());
    out.extend_from_slice(&(json.len() as u32).to_le_bytes());
    out.extend_from_slice(b"JSON");
    out.extend_from_slice(&json);
    out.extend_from_slice(&(bin.len() as u32).to_le_bytes());
    out.extend_from_slice(b"BIN\0");
    out.extend_from_slice(&bin);
    out
}

pub fn table_glb() -> Vec<u8> {
    let positions: [f32; 9] = [0.0, 0.0, 0.0, 2.0, 0.0, 0.0, 0.0, 1.0, 0.0];
    let bin: Vec<u8> = positions.iter().flat_map(|v| v.to_le_bytes()).collect();
    glb(TABLE_GLB_JSON, &bin)
}

/// The BIN chunk stands in for the compressed stream; it is never decoded
pub fn draco_glb() -> Vec<u8> {
    glb(DRACO_GLB_JSON, b"DRACO\x02\x02\x01\x01\x00\x00\x00\x00\x00\x00\x00")
}

pub fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// In-memory fetcher with call counters and optional per-key gates
#[derive(Default)]
pub struct FakeFetcher {
    assets: RefCell<HashMap<String, Vec<u8>>>,
    gates: RefCell<HashMap<String, Rc<Notify>>>,
    calls: Cell<usize>,
    completed: Cell<usize>,
}

impl FakeFetcher {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn insert(&self, key: &str, bytes: Vec<u8>) {
        self.assets.borrow_mut().insert(key.to_string(), bytes);
    }

    /// Holds fetches of `key` until the returned gate is notified
    pub fn gate(&self, key: &str) -> Rc<Notify> {
        let gate = Rc::new(Notify::new());
        self.gates
            .borrow_mut()
            .insert(key.to_string(), Rc::clone(&gate));
        gate
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }

    pub fn completed(&self) -> usize {
        self.completed.get()
    }
}

#[async_trait(?Send)]
impl AssetFetcher for FakeFetcher {
    async fn fetch(&self, key: &str) -> Result<Vec<u8>, LoadError> {
        self.calls.set(self.calls.get() + 1);

        let gate = self.gates.borrow().get(key).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        self.completed.set(self.completed.get() + 1);
        self.assets
            .borrow()
            .get(key)
            .cloned()
            .ok_or_else(|| LoadError::transport(key, "HTTP 404 Not Found"))
    }
}

/// Real glTF parser that counts calls and can be held on a gate
#[derive(Default)]
pub struct CountingParser {
    inner: GltfParser,
    gate: RefCell<Option<Rc<Notify>>>,
    calls: Cell<usize>,
}

impl CountingParser {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn gate(&self) -> Rc<Notify> {
        let gate = Rc::new(Notify::new());
        *self.gate.borrow_mut() = Some(Rc::clone(&gate));
        gate
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

#[async_trait(?Send)]
impl SceneParser for CountingParser {
    async fn parse(&self, bytes: Vec<u8>) -> Result<SceneNode, LoadError> {
        self.calls.set(self.calls.get() + 1);
        let result = self.inner.parse(bytes).await;

        let gate = self.gate.borrow().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        result
    }
}

pub struct Harness {
    pub cache: Rc<AssetCache>,
    pub fetcher: Rc<FakeFetcher>,
    pub parser: Rc<CountingParser>,
    pub loader: Rc<AssetLoader>,
}

/// Loader over a fresh cache with the chair (gzipped JSON), stool (plain),
/// table (gzipped GLB) and Draco chair (gzipped GLB) assets
pub fn harness() -> Harness {
    let cache = AssetCache::new();
    let fetcher = FakeFetcher::new();
    fetcher.insert(CHAIR_KEY, gzip(CHAIR_GLTF.as_bytes()));
    fetcher.insert(STOOL_KEY, STOOL_GLTF.as_bytes().to_vec());
    fetcher.insert(TABLE_KEY, gzip(&table_glb()));
    fetcher.insert(DRACO_KEY, gzip(&draco_glb()));
    let parser = CountingParser::new();

    let loader = AssetLoader::new(
        Rc::clone(&cache),
        Rc::clone(&fetcher) as Rc<dyn AssetFetcher>,
        Rc::clone(&parser) as Rc<dyn SceneParser>,
    );

    Harness {
        cache,
        fetcher,
        parser,
        loader,
    }
}

/// Lets other tasks (and blocking parse workers) run until `done` holds
pub async fn run_until(mut done: impl FnMut() -> bool) {
    for _ in 0..5000 {
        if done() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
    panic!("condition never became true");
}
