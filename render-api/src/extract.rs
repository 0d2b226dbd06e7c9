//! Data types for extraction from the scene into the render world.
//! The scene side fills an ExtractedFrame each frame; backends only read it.

/// Column-major identity matrix (WGSL/wgpu convention).
pub const IDENTITY_MATRIX: [f32; 16] = [
    1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0,
];

/// Backend-issued id of an uploaded vertex array (the VAO of the shared program).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshHandle(pub u64);

/// Backend-issued id of a decoded, mipmapped 2D texture.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureHandle(pub u64);

/// Which registry entry a draw belongs to. Static models come first, then fish body/fin pairs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrawSource {
    Model(usize),
    FishBody(usize),
    FishFin(usize),
}

/// One draw call of the shared shader program.
#[derive(Clone, Debug, PartialEq)]
pub struct DrawItem {
    pub source: DrawSource,
    pub mesh: MeshHandle,
    /// Bound to `objectTexture` when present; `useTexture` follows `texture.is_some()`.
    pub texture: Option<TextureHandle>,
    /// `model` uniform, column-major 4x4.
    pub model: [f32; 16],
    /// `diffuseColor` uniform.
    pub diffuse_color: [f32; 3],
    /// `fishColor` uniform. White for static models.
    pub fish_color: [f32; 3],
    /// Number of vertices drawn as a triangle list, starting at vertex 0.
    pub vertex_count: u32,
}

impl DrawItem {
    pub fn use_texture(&self) -> bool {
        self.texture.is_some()
    }
}

/// Linear distance fog applied in the fragment stage.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fog {
    pub color: [f32; 3],
    pub start: f32,
    pub end: f32,
}

impl Default for Fog {
    fn default() -> Self {
        Self {
            color: [0.0, 0.2, 0.3],
            start: 5.0,
            end: 50.0,
        }
    }
}

/// Everything a backend needs to render one frame.
#[derive(Clone, Debug)]
pub struct ExtractedFrame {
    /// `view` uniform, column-major.
    pub view: [f32; 16],
    /// `proj` uniform, column-major, depth range [0, 1].
    pub proj: [f32; 16],
    pub viewport_size: (u32, u32),
    pub clear_color: [f32; 4],
    pub fog: Fog,
    pub draws: Vec<DrawItem>,
}

impl Default for ExtractedFrame {
    fn default() -> Self {
        Self {
            view: IDENTITY_MATRIX,
            proj: IDENTITY_MATRIX,
            viewport_size: (800, 600),
            clear_color: [0.0, 0.0, 0.3, 1.0],
            fog: Fog::default(),
            draws: Vec::new(),
        }
    }
}
