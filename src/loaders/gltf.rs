use async_trait::async_trait;
use glam::{Mat4, Vec3};

use crate::error::LoadError;
use crate::math::AABB;
use crate::scene::{MeshInfo, SceneNode};
use crate::traits::SceneParser;

/// Parses GLB / glTF-JSON payloads into a scene graph on a blocking worker
#[derive(Debug, Clone, Copy, Default)]
pub struct GltfParser;

impl GltfParser {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait(?Send)]
impl SceneParser for GltfParser {
    async fn parse(&self, bytes: Vec<u8>) -> Result<SceneNode, LoadError> {
        tokio::task::spawn_blocking(move || parse_gltf_scene(&bytes))
            .await
            .map_err(|e| LoadError::parse(format!("parser task failed: {e}")))?
    }
}

/// Converts a glTF document into a scene root.
///
/// Only the document structure and accessor metadata are read, so payloads
/// whose geometry lives in external or Draco-compressed buffers still parse.
/// Index and value errors are still rejected before the graph is walked.
pub fn parse_gltf_scene(bytes: &[u8]) -> Result<SceneNode, LoadError> {
    let gltf = gltf::Gltf::from_slice_without_validation(bytes)?;
    validate_structure(gltf.document.as_json())?;

    log::debug!(
        "glTF parsed: {} scenes, {} nodes, {} meshes",
        gltf.scenes().count(),
        gltf.nodes().count(),
        gltf.meshes().count()
    );

    let scene = gltf
        .default_scene()
        .or_else(|| gltf.scenes().next())
        .ok_or_else(|| LoadError::parse("document contains no scenes"))?;

    let mut root = SceneNode::new(scene.name().unwrap_or("Scene"));
    for node in scene.nodes() {
        root.children.push(convert_node(&node));
    }

    Ok(root)
}

/// Runs glTF validation, tolerating missing buffer data and unsupported
/// extensions. Compressed primitives leave their accessors without a
/// `bufferView`, and `KHR_draco_mesh_compression` is listed as required.
fn validate_structure(root: &gltf::json::Root) -> Result<(), LoadError> {
    use gltf::json::validation::{Error, Validate};

    let mut problems = Vec::new();
    root.validate(root, gltf::json::Path::new, &mut |path, error| match error {
        Error::Missing | Error::Unsupported => {
            log::trace!("glTF validation tolerated: {}: {}", path(), error)
        }
        _ => problems.push(format!("{}: {}", path(), error)),
    });

    if problems.is_empty() {
        Ok(())
    } else {
        Err(LoadError::parse(format!("invalid glTF: {}", problems.join("; "))))
    }
}

/// Recursively converts glTF nodes
fn convert_node(node: &gltf::Node) -> SceneNode {
    let transform = Mat4::from_cols_array_2d(&node.transform().matrix());
    let mut converted = SceneNode::new(node.name().unwrap_or_default()).with_transform(transform);

    if let Some(mesh) = node.mesh() {
        converted.mesh = Some(convert_mesh(&mesh));
    }

    for child in node.children() {
        converted.children.push(convert_node(&child));
    }

    converted
}

fn convert_mesh(mesh: &gltf::Mesh) -> MeshInfo {
    let mut primitives = 0;
    let mut vertices = 0;
    let mut bounds: Option<AABB> = None;

    for primitive in mesh.primitives() {
        primitives += 1;

        let Some(positions) = primitive.get(&gltf::Semantic::Positions) else {
            continue;
        };
        vertices += positions.count();

        let min = positions.min().as_ref().and_then(vec3_from_json);
        let max = positions.max().as_ref().and_then(vec3_from_json);
        if let (Some(min), Some(max)) = (min, max) {
            let primitive_bounds = AABB::new(min, max);
            bounds = Some(bounds.map_or(primitive_bounds, |b| b.union(&primitive_bounds)));
        }
    }

    MeshInfo {
        name: mesh.name().map(str::to_string),
        primitives,
        vertices,
        bounds,
    }
}

fn vec3_from_json(value: &gltf::json::Value) -> Option<Vec3> {
    let components = value.as_array()?;
    if components.len() != 3 {
        return None;
    }
    let x = components[0].as_f64()? as f32;
    let y = components[1].as_f64()? as f32;
    let z = components[2].as_f64()? as f32;
    Some(Vec3::new(x, y, z))
}
