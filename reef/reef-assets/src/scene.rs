//! Importer-agnostic scene graph: meshes in local space, materials, and a node tree.
//! Both the OBJ and glTF front ends produce this; the flat and hierarchical paths consume it.

use glam::{Mat3, Mat4, Vec3};
use render_api::{SubMesh, DEFAULT_DIFFUSE};

/// One de-indexed triangle list in mesh-local space.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ImportedMesh {
    pub name: String,
    pub positions: Vec<[f32; 3]>,
    /// Empty when the source has no normal channel.
    pub normals: Vec<[f32; 3]>,
    /// Empty when the source has no first UV channel.
    pub texcoords: Vec<[f32; 2]>,
    pub material: Option<usize>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ImportedMaterial {
    pub name: String,
    pub diffuse: Option<[f32; 3]>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SceneNode {
    pub name: String,
    /// Local transform relative to the parent node.
    pub transform: Mat4,
    /// Indices into `ImportedScene::meshes`.
    pub meshes: Vec<usize>,
    /// Indices into `ImportedScene::nodes`, in stored order.
    pub children: Vec<usize>,
}

impl SceneNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transform: Mat4::IDENTITY,
            meshes: Vec::new(),
            children: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ImportedScene {
    pub meshes: Vec<ImportedMesh>,
    pub materials: Vec<ImportedMaterial>,
    pub nodes: Vec<SceneNode>,
    pub root: usize,
}

impl ImportedScene {
    /// Depth-first pre-order walk from the root: a node is reported before its children, children
    /// in stored order. `visit` receives the node index and its accumulated world transform.
    /// A node reachable twice (malformed, cyclic input) is reported once.
    pub fn visit(&self, mut visit: impl FnMut(usize, &Mat4)) {
        if self.root >= self.nodes.len() {
            return;
        }
        let mut seen = vec![false; self.nodes.len()];
        self.visit_node(self.root, &Mat4::IDENTITY, &mut seen, &mut visit);
    }

    fn visit_node(
        &self,
        index: usize,
        parent: &Mat4,
        seen: &mut [bool],
        visit: &mut impl FnMut(usize, &Mat4),
    ) {
        if seen[index] {
            log::warn!("scene node {} reached twice, skipping", index);
            return;
        }
        seen[index] = true;
        let node = &self.nodes[index];
        let world = *parent * node.transform;
        visit(index, &world);
        for &child in &node.children {
            if child < self.nodes.len() {
                self.visit_node(child, &world, seen, visit);
            }
        }
    }

    /// One SubMesh per (node, mesh-index) pair, in walk order, with node transforms baked in.
    pub fn sub_meshes(&self) -> Vec<SubMesh> {
        let mut out = Vec::new();
        self.visit(|index, world| {
            for &mesh_index in &self.nodes[index].meshes {
                if let Some(mesh) = self.meshes.get(mesh_index) {
                    out.push(self.bake(mesh, world));
                }
            }
        });
        out
    }

    fn bake(&self, mesh: &ImportedMesh, world: &Mat4) -> SubMesh {
        let identity = *world == Mat4::IDENTITY;
        let positions = if identity {
            mesh.positions.clone()
        } else {
            mesh.positions
                .iter()
                .map(|p| world.transform_point3(Vec3::from_array(*p)).to_array())
                .collect()
        };
        let normals = if identity {
            mesh.normals.clone()
        } else {
            let normal_matrix = normal_matrix(world);
            mesh.normals
                .iter()
                .map(|n| (normal_matrix * Vec3::from_array(*n)).normalize_or_zero().to_array())
                .collect()
        };
        let diffuse = mesh
            .material
            .and_then(|m| self.materials.get(m))
            .and_then(|m| m.diffuse);
        SubMesh {
            vertex_count: positions.len(),
            positions,
            normals,
            texcoords: mesh.texcoords.clone(),
            diffuse_color: diffuse.unwrap_or(DEFAULT_DIFFUSE),
            has_color: diffuse.is_some(),
        }
    }

    /// Number of (node, mesh) pairs reachable from the root.
    pub fn reachable_mesh_instances(&self) -> usize {
        let mut count = 0;
        self.visit(|index, _| count += self.nodes[index].meshes.len());
        count
    }
}

fn normal_matrix(world: &Mat4) -> Mat3 {
    let m = Mat3::from_mat4(*world);
    if m.determinant().abs() < 1e-12 {
        m
    } else {
        m.inverse().transpose()
    }
}
