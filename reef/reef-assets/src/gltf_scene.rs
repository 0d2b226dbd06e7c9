//! glTF front end for the hierarchical import path.
//!
//! The document's node tree is copied as-is under a synthetic root whose children are the scene's
//! root nodes. Each primitive becomes its own mesh; a node referencing a glTF mesh references all
//! of that mesh's primitives, in order.

use std::path::Path;

use glam::Mat4;
use gltf::mesh::Mode;

use crate::scene::{ImportedMaterial, ImportedMesh, ImportedScene, SceneNode};
use crate::triangulate::{fan_to_list, strip_to_list};
use crate::ImportError;

pub(crate) fn load_gltf_scene(path: &Path) -> Result<ImportedScene, ImportError> {
    let (document, buffers, _images) = gltf::import(path)?;

    let materials = document
        .materials()
        .map(|m| {
            let c = m.pbr_metallic_roughness().base_color_factor();
            ImportedMaterial {
                name: m.name().unwrap_or_default().to_string(),
                diffuse: Some([c[0], c[1], c[2]]),
            }
        })
        .collect();

    // glTF mesh index -> imported mesh indices (one per primitive)
    let mut meshes = Vec::new();
    let mut primitives_of = Vec::new();
    for mesh in document.meshes() {
        let mut ids = Vec::new();
        for primitive in mesh.primitives() {
            let name = format!("{}#{}", mesh.name().unwrap_or("mesh"), primitive.index());
            if let Some(imported) = convert_primitive(&name, &primitive, &buffers) {
                ids.push(meshes.len());
                meshes.push(imported);
            }
        }
        primitives_of.push(ids);
    }

    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or(ImportError::EmptyScene)?;

    // index 0 is the synthetic root, glTF node i lives at i + 1
    let mut nodes = Vec::new();
    let mut root = SceneNode::new(scene.name().unwrap_or("scene"));
    root.children = scene.nodes().map(|n| n.index() + 1).collect();
    nodes.push(root);
    for node in document.nodes() {
        nodes.push(SceneNode {
            name: node.name().unwrap_or_default().to_string(),
            transform: Mat4::from_cols_array_2d(&node.transform().matrix()),
            meshes: node
                .mesh()
                .and_then(|m| primitives_of.get(m.index()).cloned())
                .unwrap_or_default(),
            children: node.children().map(|c| c.index() + 1).collect(),
        });
    }

    Ok(ImportedScene {
        meshes,
        materials,
        nodes,
        root: 0,
    })
}

fn convert_primitive(
    name: &str,
    primitive: &gltf::Primitive,
    buffers: &[gltf::buffer::Data],
) -> Option<ImportedMesh> {
    let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));

    let Some(positions) = reader.read_positions() else {
        log::warn!("primitive '{}' has no positions, skipping", name);
        return None;
    };
    let positions: Vec<[f32; 3]> = positions.collect();
    let normals: Vec<[f32; 3]> = reader.read_normals().map(|n| n.collect()).unwrap_or_default();
    let texcoords: Vec<[f32; 2]> = reader
        .read_tex_coords(0)
        .map(|t| t.into_f32().collect())
        .unwrap_or_default();
    let indices: Vec<u32> = match reader.read_indices() {
        Some(i) => i.into_u32().collect(),
        None => (0..positions.len() as u32).collect(),
    };

    let indices = match primitive.mode() {
        Mode::Triangles => indices,
        Mode::TriangleStrip => strip_to_list(&indices),
        Mode::TriangleFan => fan_to_list(&indices),
        other => {
            log::warn!("primitive '{}' uses {:?}, only triangles are drawn", name, other);
            return None;
        }
    };

    let has_normals = normals.len() == positions.len();
    let has_texcoords = texcoords.len() == positions.len();
    let mut mesh = ImportedMesh {
        name: name.to_string(),
        positions: Vec::with_capacity(indices.len()),
        normals: Vec::new(),
        texcoords: Vec::new(),
        material: primitive.material().index(),
    };
    for i in indices.into_iter().map(|i| i as usize) {
        let Some(p) = positions.get(i) else {
            continue;
        };
        mesh.positions.push(*p);
        if has_normals {
            mesh.normals.push(normals[i]);
        }
        if has_texcoords {
            mesh.texcoords.push(texcoords[i]);
        }
    }
    Some(mesh)
}
