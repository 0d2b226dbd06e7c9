//! Reef renderer configuration: target formats and the shader program to build.

use std::path::PathBuf;

/// Bundled vertex stage of the "model" program.
pub const MODEL_VERTEX_SHADER: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/shaders/model_vertex.wgsl");
/// Bundled fragment stage of the "model" program.
pub const MODEL_FRAGMENT_SHADER: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/shaders/model_fragment.wgsl");

#[derive(Clone, Debug)]
pub struct RendererConfig {
    /// Colour target format (swapchain or off-screen).
    pub swapchain_format: wgpu::TextureFormat,
    pub depth_format: wgpu::TextureFormat,
    /// Name the scene program is registered under.
    pub program_name: String,
    /// Stage files, read from disk at start-up.
    pub vertex_shader: PathBuf,
    pub fragment_shader: PathBuf,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            swapchain_format: wgpu::TextureFormat::Rgba8UnormSrgb,
            depth_format: wgpu::TextureFormat::Depth32Float,
            program_name: "model".to_string(),
            vertex_shader: PathBuf::from(MODEL_VERTEX_SHADER),
            fragment_shader: PathBuf::from(MODEL_FRAGMENT_SHADER),
        }
    }
}
