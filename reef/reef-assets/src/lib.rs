//! Asset importer adapter: turns one scene file into a ModelData.
//!
//! `.obj` files go through the flat path (every mesh concatenated into one run), anything else
//! through the hierarchical path (one SubMesh per reachable (node, mesh) pair). Both bake node
//! transforms into the vertices, so callers never apply scene-graph transforms themselves.
//! Import failures are logged and produce an empty ModelData; they never propagate.

mod gltf_scene;
mod import;
mod obj_scene;
mod scene;
pub mod triangulate;

use std::path::Path;

pub use import::{
    import_flat_mesh, import_flat_mesh_with, import_hierarchical_mesh, load_model_data,
};
pub use scene::{ImportedMaterial, ImportedMesh, ImportedScene, SceneNode};

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("failed to load OBJ: {0}")]
    Obj(#[from] tobj::LoadError),

    #[error("failed to load glTF: {0}")]
    Gltf(#[from] gltf::Error),

    #[error("scene contains no nodes")]
    EmptyScene,
}

/// True when the file takes the flat (OBJ) import path.
pub fn is_obj_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("obj"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_by_extension() {
        assert!(is_obj_path(Path::new("terrain1.obj")));
        assert!(is_obj_path(Path::new("assets/QST.OBJ")));
        assert!(!is_obj_path(Path::new("assets/shark3.dae")));
        assert!(!is_obj_path(Path::new("assets/fish.glb")));
        assert!(!is_obj_path(Path::new("no_extension")));
    }
}
