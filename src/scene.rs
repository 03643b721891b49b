use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use glam::Mat4;
use serde::Serialize;

use crate::math::AABB;

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a scene node
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    fn next() -> Self {
        NodeId(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Mesh metadata attached to a node
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MeshInfo {
    pub name: Option<String>,
    pub primitives: usize,
    pub vertices: usize,
    /// Local-space bounds, when the position accessors declare min/max
    pub bounds: Option<AABB>,
}

/// A node of a parsed scene graph.
///
/// Nodes are mutable and owned by exactly one parent. `clone()` produces an
/// independent copy with fresh [`NodeId`]s for the whole subtree, and
/// equality compares structure only, so two clones compare equal while
/// keeping distinct identities.
#[derive(Debug)]
pub struct SceneNode {
    id: NodeId,
    pub name: String,
    pub transform: Mat4,
    pub mesh: Option<MeshInfo>,
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: NodeId::next(),
            name: name.into(),
            transform: Mat4::IDENTITY,
            mesh: None,
            children: Vec::new(),
        }
    }

    pub fn with_transform(mut self, transform: Mat4) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_mesh(mut self, mesh: MeshInfo) -> Self {
        self.mesh = Some(mesh);
        self
    }

    pub fn with_child(mut self, child: SceneNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Depth-first walk over this node and all descendants
    pub fn visit(&self, f: &mut impl FnMut(&SceneNode)) {
        f(self);
        for child in &self.children {
            child.visit(f);
        }
    }

    /// Number of nodes below this one
    pub fn descendant_count(&self) -> usize {
        self.children
            .iter()
            .map(|child| 1 + child.descendant_count())
            .sum()
    }

    pub fn mesh_count(&self) -> usize {
        let mut count = 0;
        self.visit(&mut |node| {
            if node.mesh.is_some() {
                count += 1;
            }
        });
        count
    }

    pub fn vertex_count(&self) -> usize {
        let mut count = 0;
        self.visit(&mut |node| {
            if let Some(mesh) = &node.mesh {
                count += mesh.vertices;
            }
        });
        count
    }

    /// World-space bounds of every mesh in the subtree
    pub fn bounds(&self) -> Option<AABB> {
        self.bounds_under(&Mat4::IDENTITY)
    }

    fn bounds_under(&self, parent_transform: &Mat4) -> Option<AABB> {
        let global_transform = *parent_transform * self.transform;

        let own = self
            .mesh
            .as_ref()
            .and_then(|mesh| mesh.bounds)
            .map(|local| local.transform(&global_transform));

        self.children
            .iter()
            .filter_map(|child| child.bounds_under(&global_transform))
            .fold(own, |acc, b| Some(acc.map_or(b, |a| a.union(&b))))
    }

    pub fn summary(&self) -> SceneSummary {
        SceneSummary {
            name: self.name.clone(),
            nodes: self.descendant_count(),
            meshes: self.mesh_count(),
            vertices: self.vertex_count(),
            bounds: self.bounds(),
        }
    }
}

impl Clone for SceneNode {
    fn clone(&self) -> Self {
        Self {
            id: NodeId::next(),
            name: self.name.clone(),
            transform: self.transform,
            mesh: self.mesh.clone(),
            children: self.children.clone(),
        }
    }
}

impl PartialEq for SceneNode {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.transform == other.transform
            && self.mesh == other.mesh
            && self.children == other.children
    }
}

/// Read-only description of a scene, safe to hand to diagnostics
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SceneSummary {
    pub name: String,
    pub nodes: usize,
    pub meshes: usize,
    pub vertices: usize,
    pub bounds: Option<AABB>,
}
