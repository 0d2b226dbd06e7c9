use std::path::Path;

use render_api::{ModelData, SourceTopology, SubMesh};

use crate::gltf_scene::load_gltf_scene;
use crate::obj_scene::load_obj_scene;
use crate::scene::ImportedScene;
use crate::{is_obj_path, ImportError};

fn load_scene(path: &Path, topology: SourceTopology) -> Result<ImportedScene, ImportError> {
    if is_obj_path(path) {
        load_obj_scene(path, topology)
    } else {
        load_gltf_scene(path)
    }
}

/// Imports every mesh of the file into one flattened vertex run, node transforms baked in.
/// Colour is last-writer-wins across meshes. Returns an empty ModelData on failure.
pub fn import_flat_mesh(path: impl AsRef<Path>) -> ModelData {
    import_flat_mesh_with(path, SourceTopology::Triangles)
}

/// As [`import_flat_mesh`], for a source whose faces are wound as quads (or other polygons).
pub fn import_flat_mesh_with(path: impl AsRef<Path>, topology: SourceTopology) -> ModelData {
    let path = path.as_ref();
    match load_scene(path, topology) {
        Ok(scene) => {
            let mut data = ModelData::from_vertex_run(SubMesh::concat(&scene.sub_meshes()));
            data.source_topology = topology;
            log::info!("imported {} (flat): {} points", path.display(), data.point_count);
            data
        }
        Err(e) => {
            log::error!("import of {} failed: {}", path.display(), e);
            ModelData {
                source_topology: topology,
                ..ModelData::default()
            }
        }
    }
}

/// Imports the file keeping one SubMesh per reachable (node, mesh) pair, node transforms baked in.
/// Returns an empty ModelData on failure.
pub fn import_hierarchical_mesh(path: impl AsRef<Path>) -> ModelData {
    let path = path.as_ref();
    match load_scene(path, SourceTopology::Triangles) {
        Ok(scene) => {
            let data = ModelData::from_sub_meshes(scene.sub_meshes());
            log::info!(
                "imported {} (hierarchical): {} sub-meshes, {} points",
                path.display(),
                data.sub_meshes.len(),
                data.point_count
            );
            data
        }
        Err(e) => {
            log::error!("import of {} failed: {}", path.display(), e);
            ModelData::default()
        }
    }
}

/// Dispatch by extension: `.obj` takes the flat path, everything else the hierarchical one.
pub fn load_model_data(path: impl AsRef<Path>, topology: SourceTopology) -> ModelData {
    let path = path.as_ref();
    if is_obj_path(path) {
        import_flat_mesh_with(path, topology)
    } else {
        import_hierarchical_mesh(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    const TWO_OBJECTS: &str = "\
o a
v 0 0 0
v 1 0 0
v 0 1 0
vn 0 0 1
f 1//1 2//1 3//1
o b
v 0 0 1
v 1 0 1
v 1 1 1
v 0 1 1
f 4 5 6 7
";

    #[test]
    fn flat_import_concatenates_meshes() {
        let file = write_file(".obj", TWO_OBJECTS);
        let data = import_flat_mesh(file.path());
        assert!(!data.is_hierarchical());
        assert_eq!(data.point_count, 3 + 6);
        assert_eq!(data.positions.len(), data.point_count);
        // second object has no normals, padded so the run stays index-aligned
        assert_eq!(data.normals.len(), data.point_count);
        assert_eq!(data.normals[5], [0.0, 0.0, 0.0]);
        assert!(data.texcoords.is_empty());
        assert!(!data.has_color);
        assert_eq!(data.diffuse_color, [1.0, 1.0, 1.0]);
    }

    #[test]
    fn quad_topology_is_recorded() {
        let file = write_file(".obj", TWO_OBJECTS);
        let data = load_model_data(file.path(), SourceTopology::Quads);
        assert_eq!(data.source_topology, SourceTopology::Quads);
        assert_eq!(data.point_count, 9);
    }

    #[test]
    fn missing_file_yields_empty_model() {
        let data = import_flat_mesh("no/such/terrain.obj");
        assert!(data.is_empty());
        assert_eq!(data.point_count, 0);
        let data = import_hierarchical_mesh("no/such/shark.gltf");
        assert!(data.is_empty());
        assert!(data.sub_meshes.is_empty());
    }

    #[test]
    fn non_obj_goes_hierarchical() {
        let file = write_file(
            ".gltf",
            r#"{
  "asset": { "version": "2.0" },
  "scenes": [ { "nodes": [0, 1] } ],
  "nodes": [ { "mesh": 0 }, { "mesh": 0, "translation": [2.0, 0.0, 0.0] } ],
  "meshes": [ { "primitives": [ { "attributes": { "POSITION": 0 } } ] } ],
  "accessors": [
    { "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
      "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0] }
  ],
  "bufferViews": [ { "buffer": 0, "byteLength": 36 } ],
  "buffers": [
    { "byteLength": 36,
      "uri": "data:application/octet-stream;base64,AAAAAAAAAAAAAAAAAACAPwAAAAAAAAAAAAAAAAAAgD8AAAAA" }
  ]
}"#,
        );
        let data = load_model_data(file.path(), SourceTopology::Triangles);
        assert!(data.is_hierarchical());
        assert_eq!(data.sub_meshes.len(), 2);
        assert_eq!(data.point_count, 6);
        assert_eq!(data.sub_meshes[1].positions[1], [3.0, 0.0, 0.0]);
        assert!(!data.has_color);
    }
}
