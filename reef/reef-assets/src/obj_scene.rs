//! OBJ front end: every OBJ object becomes one mesh hung off a single identity root node.

use std::path::Path;

use render_api::SourceTopology;

use crate::scene::{ImportedMaterial, ImportedMesh, ImportedScene, SceneNode};
use crate::triangulate::fan_triangulate;
use crate::ImportError;

pub(crate) fn load_obj_scene(path: &Path, topology: SourceTopology) -> Result<ImportedScene, ImportError> {
    // Quad-wound sources keep their face arities so the fan conversion below is explicit.
    let options = tobj::LoadOptions {
        single_index: true,
        triangulate: topology == SourceTopology::Triangles,
        ignore_points: true,
        ignore_lines: true,
        ..Default::default()
    };
    let (models, materials) = tobj::load_obj(path, &options)?;
    let materials = match materials {
        Ok(m) => m,
        Err(e) => {
            log::warn!("{}: materials unavailable ({}), using default colour", path.display(), e);
            Vec::new()
        }
    };

    let mut root = SceneNode::new(path.display().to_string());
    let mut meshes = Vec::with_capacity(models.len());
    for model in &models {
        root.meshes.push(meshes.len());
        meshes.push(convert_mesh(&model.name, &model.mesh));
    }

    Ok(ImportedScene {
        meshes,
        materials: materials
            .into_iter()
            .map(|m| ImportedMaterial {
                name: m.name,
                diffuse: m.diffuse,
            })
            .collect(),
        nodes: vec![root],
        root: 0,
    })
}

fn convert_mesh(name: &str, mesh: &tobj::Mesh) -> ImportedMesh {
    let indices = if mesh.face_arities.is_empty() {
        mesh.indices.clone()
    } else {
        fan_triangulate(&mesh.indices, &mesh.face_arities)
    };

    let vertex_count = mesh.positions.len() / 3;
    let has_normals = mesh.normals.len() / 3 == vertex_count && vertex_count > 0;
    let has_texcoords = mesh.texcoords.len() / 2 == vertex_count && vertex_count > 0;

    let mut out = ImportedMesh {
        name: name.to_string(),
        positions: Vec::with_capacity(indices.len()),
        normals: Vec::with_capacity(if has_normals { indices.len() } else { 0 }),
        texcoords: Vec::with_capacity(if has_texcoords { indices.len() } else { 0 }),
        material: mesh.material_id,
    };
    for &i in &indices {
        let i = i as usize;
        if i >= vertex_count {
            log::warn!("mesh '{}': index {} out of range, skipping", name, i);
            continue;
        }
        out.positions.push([
            mesh.positions[i * 3],
            mesh.positions[i * 3 + 1],
            mesh.positions[i * 3 + 2],
        ]);
        if has_normals {
            out.normals.push([mesh.normals[i * 3], mesh.normals[i * 3 + 1], mesh.normals[i * 3 + 2]]);
        }
        if has_texcoords {
            out.texcoords.push([mesh.texcoords[i * 2], mesh.texcoords[i * 2 + 1]]);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_obj(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".obj").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    const QUAD_OBJ: &str = "\
o ground
v 0 0 0
v 1 0 0
v 1 0 1
v 0 0 1
vn 0 1 0
vt 0 0
vt 1 0
vt 1 1
vt 0 1
f 1/1/1 2/2/1 3/3/1 4/4/1
";

    #[test]
    fn quads_are_fan_triangulated() {
        let file = write_obj(QUAD_OBJ);
        let scene = load_obj_scene(file.path(), SourceTopology::Quads).unwrap();
        assert_eq!(scene.meshes.len(), 1);
        let mesh = &scene.meshes[0];
        assert_eq!(mesh.positions.len(), 6);
        assert_eq!(mesh.normals.len(), 6);
        assert_eq!(mesh.texcoords.len(), 6);
        assert_eq!(mesh.positions[0], mesh.positions[3]);
        assert_eq!(mesh.positions[2], [1.0, 0.0, 1.0]);
    }

    #[test]
    fn triangles_path_matches_vertex_count() {
        let file = write_obj(QUAD_OBJ);
        let scene = load_obj_scene(file.path(), SourceTopology::Triangles).unwrap();
        assert_eq!(scene.meshes[0].positions.len(), 6);
        assert_eq!(scene.nodes.len(), 1);
        assert_eq!(scene.nodes[0].meshes, vec![0]);
    }

    #[test]
    fn missing_channels_stay_empty() {
        let file = write_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n");
        let scene = load_obj_scene(file.path(), SourceTopology::Triangles).unwrap();
        let mesh = &scene.meshes[0];
        assert_eq!(mesh.positions.len(), 3);
        assert!(mesh.normals.is_empty());
        assert!(mesh.texcoords.is_empty());
        assert!(mesh.material.is_none());
    }

    #[test]
    fn missing_file_is_an_error() {
        let result = load_obj_scene(Path::new("does/not/exist.obj"), SourceTopology::Triangles);
        assert!(matches!(result, Err(ImportError::Obj(_))));
    }
}
