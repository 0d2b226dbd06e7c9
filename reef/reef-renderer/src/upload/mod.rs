//! GPU upload layer: ModelData -> one buffer per vertex attribute plus the attribute bindings the
//! shared program declares (the wgpu stand-in for a vertex-array object).

use render_api::ModelData;

use crate::shader::ShaderInterface;

/// Vertex attributes the scene program may consume, in vertex-buffer slot order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Attribute {
    Position,
    Normal,
    TexCoord,
}

impl Attribute {
    pub const ALL: [Attribute; 3] = [Attribute::Position, Attribute::Normal, Attribute::TexCoord];

    /// Input name looked up in the shader.
    pub fn shader_name(self) -> &'static str {
        match self {
            Attribute::Position => "vertex_position",
            Attribute::Normal => "vertex_normal",
            Attribute::TexCoord => "vertex_texcoord",
        }
    }

    pub fn format(self) -> wgpu::VertexFormat {
        match self {
            Attribute::Position | Attribute::Normal => wgpu::VertexFormat::Float32x3,
            Attribute::TexCoord => wgpu::VertexFormat::Float32x2,
        }
    }

    pub fn stride(self) -> u64 {
        self.format().size()
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Where one attribute stream is fed: shader `@location` and vertex-buffer slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AttributeBinding {
    pub attribute: Attribute,
    pub location: u32,
    pub slot: u32,
}

/// Attributes the program declares, each on its own slot. Undeclared attributes get no binding.
/// The scene pipeline's vertex layout and every VertexArray use this same list.
pub fn attribute_bindings(interface: &ShaderInterface) -> Vec<AttributeBinding> {
    let mut bindings = Vec::with_capacity(Attribute::ALL.len());
    for attribute in Attribute::ALL {
        match interface.attribute_location(attribute.shader_name()) {
            Some(location) => bindings.push(AttributeBinding {
                attribute,
                location,
                slot: bindings.len() as u32,
            }),
            None => log::debug!("attribute {} not declared, left unbound", attribute.shader_name()),
        }
    }
    bindings
}

/// CPU-side streams ready for upload: one flat run, UVs already scaled.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VertexStreams {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub texcoords: Vec<[f32; 2]>,
}

impl VertexStreams {
    /// Concatenates sub-meshes in order (or takes the flat run) and scales UVs by `texture_repeat`.
    /// A non-empty run always carries all three streams; absent channels are zero-filled.
    pub fn from_model_data(data: &ModelData, texture_repeat: f32) -> Self {
        let run = data.vertex_run();
        let count = run.positions.len();
        if count == 0 {
            return Self::default();
        }
        let mut normals = run.normals;
        normals.resize(count, [0.0; 3]);
        let mut texcoords: Vec<[f32; 2]> = run
            .texcoords
            .into_iter()
            .map(|[u, v]| [u * texture_repeat, v * texture_repeat])
            .collect();
        texcoords.resize(count, [0.0; 2]);
        Self {
            positions: run.positions,
            normals,
            texcoords,
        }
    }

    pub fn vertex_count(&self) -> u32 {
        self.positions.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn bytes(&self, attribute: Attribute) -> &[u8] {
        match attribute {
            Attribute::Position => bytemuck::cast_slice(&self.positions),
            Attribute::Normal => bytemuck::cast_slice(&self.normals),
            Attribute::TexCoord => bytemuck::cast_slice(&self.texcoords),
        }
    }
}

/// Device-resident vertex streams of one entity plus their bindings.
pub struct VertexArray {
    label: String,
    vertex_count: u32,
    buffers: [Option<wgpu::Buffer>; 3],
    bindings: Vec<AttributeBinding>,
}

impl VertexArray {
    /// Uploads every stream as immutable vertex data. Empty streams create nothing and bind nothing.
    pub fn upload(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        streams: &VertexStreams,
        interface: &ShaderInterface,
    ) -> Self {
        if streams.is_empty() {
            log::debug!("{}: no vertices, vertex array left unbound", label);
            return Self::empty(label);
        }
        let buffers = Attribute::ALL.map(|attribute| {
            let data = streams.bytes(attribute);
            let buffer = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(&format!("{label}:{}", attribute.shader_name())),
                size: data.len() as u64,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            queue.write_buffer(&buffer, 0, data);
            Some(buffer)
        });
        Self {
            label: label.to_string(),
            vertex_count: streams.vertex_count(),
            buffers,
            bindings: attribute_bindings(interface),
        }
    }

    pub fn empty(label: &str) -> Self {
        Self {
            label: label.to_string(),
            vertex_count: 0,
            buffers: [None, None, None],
            bindings: Vec::new(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    pub fn bindings(&self) -> &[AttributeBinding] {
        &self.bindings
    }

    pub fn buffer(&self, attribute: Attribute) -> Option<&wgpu::Buffer> {
        self.buffers[attribute.index()].as_ref()
    }

    pub fn is_drawable(&self) -> bool {
        self.vertex_count > 0 && !self.bindings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use render_api::SubMesh;

    fn interface(names: &[(&str, u32)]) -> ShaderInterface {
        ShaderInterface {
            attributes: names.iter().map(|(n, l)| (n.to_string(), *l)).collect(),
            ..Default::default()
        }
    }

    fn sub(first_x: f32, count: usize, uvs: bool) -> SubMesh {
        SubMesh {
            positions: (0..count).map(|i| [first_x + i as f32, 0.0, 0.0]).collect(),
            normals: vec![[0.0, 1.0, 0.0]; count],
            texcoords: if uvs { vec![[0.5, 0.25]; count] } else { Vec::new() },
            vertex_count: count,
            ..SubMesh::default()
        }
    }

    #[test]
    fn sub_meshes_are_concatenated_in_order() {
        let data = ModelData::from_sub_meshes(vec![sub(0.0, 3, true), sub(100.0, 2, true), sub(200.0, 4, true)]);
        let streams = VertexStreams::from_model_data(&data, 1.0);
        assert_eq!(streams.vertex_count(), 9);
        assert_eq!(streams.positions[0][0], 0.0);
        assert_eq!(streams.positions[3][0], 100.0);
        assert_eq!(streams.positions[5][0], 200.0);
        assert_eq!(streams.normals.len(), 9);
    }

    #[test]
    fn uvs_are_scaled_by_repeat() {
        let data = ModelData::from_sub_meshes(vec![sub(0.0, 3, true)]);
        let streams = VertexStreams::from_model_data(&data, 8.0);
        assert_eq!(streams.texcoords, vec![[4.0, 2.0]; 3]);
    }

    #[test]
    fn missing_channels_are_zero_filled() {
        let mut part = sub(0.0, 3, false);
        part.normals.clear();
        let data = ModelData::from_vertex_run(part);
        let streams = VertexStreams::from_model_data(&data, 2.0);
        assert_eq!(streams.normals, vec![[0.0; 3]; 3]);
        assert_eq!(streams.texcoords, vec![[0.0; 2]; 3]);
        assert_eq!(streams.bytes(Attribute::TexCoord).len(), 3 * 8);
        assert_eq!(streams.bytes(Attribute::Position).len(), 3 * 12);
    }

    #[test]
    fn empty_model_has_no_streams() {
        let streams = VertexStreams::from_model_data(&ModelData::default(), 1.0);
        assert!(streams.is_empty());
        assert!(streams.normals.is_empty());
        assert!(streams.texcoords.is_empty());
    }

    #[test]
    fn bindings_follow_declared_attributes() {
        let full = attribute_bindings(&interface(&[
            ("vertex_position", 0),
            ("vertex_normal", 1),
            ("vertex_texcoord", 2),
        ]));
        assert_eq!(full.len(), 3);
        assert_eq!(full[2], AttributeBinding { attribute: Attribute::TexCoord, location: 2, slot: 2 });

        let partial = attribute_bindings(&interface(&[("vertex_texcoord", 5), ("vertex_position", 4)]));
        assert_eq!(
            partial,
            vec![
                AttributeBinding { attribute: Attribute::Position, location: 4, slot: 0 },
                AttributeBinding { attribute: Attribute::TexCoord, location: 5, slot: 1 },
            ]
        );
        assert!(attribute_bindings(&ShaderInterface::default()).is_empty());
    }

    #[test]
    fn attribute_strides() {
        assert_eq!(Attribute::Position.stride(), 12);
        assert_eq!(Attribute::TexCoord.stride(), 8);
    }

    #[test]
    fn empty_vertex_array_is_not_drawable() {
        let va = VertexArray::empty("nothing");
        assert!(!va.is_drawable());
        assert!(va.buffer(Attribute::Position).is_none());
        assert_eq!(va.label(), "nothing");
    }
}
