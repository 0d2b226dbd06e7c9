//! Render-agnostic mesh representation produced by the importer and consumed by the upload layer.

/// Opaque white; the diffuse colour used when no material colour was resolved.
pub const DEFAULT_DIFFUSE: [f32; 3] = [1.0, 1.0, 1.0];

/// Face winding of the source file before the importer converted it to a triangle list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SourceTopology {
    #[default]
    Triangles,
    /// Quad-wound source data, re-triangulated at load time.
    Quads,
}

/// One contiguous primitive batch from one (node, mesh) pair of the source scene graph.
///
/// `positions.len() == normals.len() == vertex_count`; `texcoords` is empty or `vertex_count` long.
#[derive(Clone, Debug, PartialEq)]
pub struct SubMesh {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub texcoords: Vec<[f32; 2]>,
    pub diffuse_color: [f32; 3],
    pub has_color: bool,
    pub vertex_count: usize,
}

impl Default for SubMesh {
    fn default() -> Self {
        Self {
            positions: Vec::new(),
            normals: Vec::new(),
            texcoords: Vec::new(),
            diffuse_color: DEFAULT_DIFFUSE,
            has_color: false,
            vertex_count: 0,
        }
    }
}

impl SubMesh {
    pub fn has_texcoords(&self) -> bool {
        !self.texcoords.is_empty()
    }

    /// Concatenates parts, in order, into one vertex run.
    /// A channel that only some parts carry is zero-padded for the others so runs stay index-aligned.
    pub fn concat(parts: &[SubMesh]) -> SubMesh {
        let vertex_count: usize = parts.iter().map(|p| p.vertex_count).sum();
        let any_normals = parts.iter().any(|p| !p.normals.is_empty());
        let any_texcoords = parts.iter().any(|p| p.has_texcoords());
        let mut out = SubMesh {
            positions: Vec::with_capacity(vertex_count),
            normals: Vec::with_capacity(if any_normals { vertex_count } else { 0 }),
            texcoords: Vec::with_capacity(if any_texcoords { vertex_count } else { 0 }),
            vertex_count,
            ..SubMesh::default()
        };
        for part in parts {
            out.positions.extend_from_slice(&part.positions);
            if any_normals {
                extend_padded(&mut out.normals, &part.normals, part.vertex_count);
            }
            if any_texcoords {
                extend_padded(&mut out.texcoords, &part.texcoords, part.vertex_count);
            }
            if part.has_color {
                out.diffuse_color = part.diffuse_color;
                out.has_color = true;
            }
        }
        out
    }
}

fn extend_padded<T: Copy + Default>(dst: &mut Vec<T>, src: &[T], count: usize) {
    if src.len() == count {
        dst.extend_from_slice(src);
    } else {
        dst.extend(src.iter().copied().chain(std::iter::repeat(T::default())).take(count));
    }
}

/// Aggregate of sub-meshes plus a flattened view for entities without per-node granularity.
///
/// Either `sub_meshes` is populated (hierarchical import) and `point_count` is the sum of their
/// vertex counts, or the flattened `positions`/`normals`/`texcoords` runs are populated and
/// `point_count` equals their length.
#[derive(Clone, Debug, PartialEq)]
pub struct ModelData {
    pub sub_meshes: Vec<SubMesh>,
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub texcoords: Vec<[f32; 2]>,
    pub point_count: usize,
    pub diffuse_color: [f32; 3],
    pub has_color: bool,
    pub source_topology: SourceTopology,
}

impl Default for ModelData {
    fn default() -> Self {
        Self {
            sub_meshes: Vec::new(),
            positions: Vec::new(),
            normals: Vec::new(),
            texcoords: Vec::new(),
            point_count: 0,
            diffuse_color: DEFAULT_DIFFUSE,
            has_color: false,
            source_topology: SourceTopology::Triangles,
        }
    }
}

impl ModelData {
    /// Builds a hierarchical ModelData; the entity colour is the last sub-mesh colour present.
    pub fn from_sub_meshes(sub_meshes: Vec<SubMesh>) -> Self {
        let point_count = sub_meshes.iter().map(|s| s.vertex_count).sum();
        let mut data = Self {
            point_count,
            ..Self::default()
        };
        for sub in sub_meshes.iter().filter(|s| s.has_color) {
            data.diffuse_color = sub.diffuse_color;
            data.has_color = true;
        }
        data.sub_meshes = sub_meshes;
        data
    }

    /// Flattened (legacy) view over one merged vertex run.
    pub fn from_vertex_run(run: SubMesh) -> Self {
        Self {
            sub_meshes: Vec::new(),
            point_count: run.vertex_count,
            diffuse_color: run.diffuse_color,
            has_color: run.has_color,
            positions: run.positions,
            normals: run.normals,
            texcoords: run.texcoords,
            source_topology: SourceTopology::Triangles,
        }
    }

    /// The single vertex stream a draw call sees: sub-meshes concatenated in order,
    /// or the flattened arrays as they are.
    pub fn vertex_run(&self) -> SubMesh {
        if self.is_hierarchical() {
            return SubMesh::concat(&self.sub_meshes);
        }
        SubMesh {
            positions: self.positions.clone(),
            normals: self.normals.clone(),
            texcoords: self.texcoords.clone(),
            diffuse_color: self.diffuse_color,
            has_color: self.has_color,
            vertex_count: self.point_count,
        }
    }

    /// A single-part ModelData, used for the body/fin parts of composite actors.
    pub fn from_sub_mesh(sub_mesh: SubMesh) -> Self {
        Self::from_sub_meshes(vec![sub_mesh])
    }

    pub fn is_empty(&self) -> bool {
        self.point_count == 0
    }

    pub fn is_hierarchical(&self) -> bool {
        !self.sub_meshes.is_empty()
    }

    /// Colour the renderer feeds to `diffuseColor`: the material colour, or opaque white.
    pub fn resolved_color(&self) -> [f32; 3] {
        if self.has_color {
            self.diffuse_color
        } else {
            DEFAULT_DIFFUSE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sub(count: usize, color: Option<[f32; 3]>) -> SubMesh {
        SubMesh {
            positions: vec![[0.0; 3]; count],
            normals: vec![[0.0, 1.0, 0.0]; count],
            texcoords: Vec::new(),
            diffuse_color: color.unwrap_or(DEFAULT_DIFFUSE),
            has_color: color.is_some(),
            vertex_count: count,
        }
    }

    #[test]
    fn point_count_is_sum_of_sub_meshes() {
        let data = ModelData::from_sub_meshes(vec![sub(3, None), sub(6, None), sub(0, None)]);
        assert_eq!(data.point_count, 9);
        assert!(data.is_hierarchical());
        assert!(!data.has_color);
        assert_eq!(data.resolved_color(), DEFAULT_DIFFUSE);
    }

    #[test]
    fn color_comes_from_last_colored_sub_mesh() {
        let data = ModelData::from_sub_meshes(vec![
            sub(3, Some([1.0, 0.0, 0.0])),
            sub(3, None),
            sub(3, Some([0.0, 0.0, 1.0])),
        ]);
        assert!(data.has_color);
        assert_eq!(data.resolved_color(), [0.0, 0.0, 1.0]);
    }

    #[test]
    fn concat_preserves_order_and_pads_missing_channels() {
        let mut a = sub(2, None);
        a.positions = vec![[1.0, 0.0, 0.0], [2.0, 0.0, 0.0]];
        a.texcoords = vec![[0.5, 0.5], [1.0, 1.0]];
        let mut b = sub(1, Some([0.2, 0.3, 0.4]));
        b.positions = vec![[3.0, 0.0, 0.0]];
        let run = SubMesh::concat(&[a, b]);
        assert_eq!(run.vertex_count, 3);
        assert_eq!(run.positions, vec![[1.0, 0.0, 0.0], [2.0, 0.0, 0.0], [3.0, 0.0, 0.0]]);
        assert_eq!(run.texcoords, vec![[0.5, 0.5], [1.0, 1.0], [0.0, 0.0]]);
        assert_eq!(run.normals.len(), 3);
        assert!(run.has_color);
    }

    #[test]
    fn vertex_run_of_flat_data_is_the_flat_arrays() {
        let mut run = sub(4, None);
        run.texcoords = vec![[0.25, 0.75]; 4];
        let data = ModelData::from_vertex_run(run.clone());
        assert!(!data.is_hierarchical());
        assert_eq!(data.point_count, 4);
        assert_eq!(data.vertex_run(), run);
    }

    #[test]
    fn default_is_empty_and_white() {
        let data = ModelData::default();
        assert!(data.is_empty());
        assert_eq!(data.diffuse_color, DEFAULT_DIFFUSE);
        assert_eq!(data.source_topology, SourceTopology::Triangles);
    }
}
