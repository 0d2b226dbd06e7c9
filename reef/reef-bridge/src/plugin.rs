//! Reef plugin: implements RenderBackend for the host.

use std::collections::HashMap;
use std::path::Path;

use reef_renderer::{GpuTexture, Renderer, RendererConfig, SceneDraw, VertexArray};
use render_api::{ExtractedFrame, MeshHandle, ModelData, RenderBackend, TextureHandle};

/// Owns the renderer and every device resource the scene uploaded. Handles index the tables below;
/// resources live until the plugin is dropped.
pub struct ReefPlugin {
    renderer: Renderer,
    meshes: HashMap<u64, VertexArray>,
    textures: HashMap<u64, GpuTexture>,
    next_id: u64,
}

impl ReefPlugin {
    /// Create with wgpu device and queue (default config).
    pub fn new(device: wgpu::Device, queue: wgpu::Queue) -> Result<Self, String> {
        Self::new_with_config(device, queue, RendererConfig::default())
    }

    pub fn new_with_config(device: wgpu::Device, queue: wgpu::Queue, config: RendererConfig) -> Result<Self, String> {
        let renderer = Renderer::new_with_config(device, queue, config)?;
        Ok(Self {
            renderer,
            meshes: HashMap::new(),
            textures: HashMap::new(),
            next_id: 1,
        })
    }

    pub fn device(&self) -> &wgpu::Device {
        self.renderer.device()
    }
    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Render one frame into `target` (a swapchain view) or off-screen when `None`, and submit.
    pub fn render_frame_to(&mut self, frame: &ExtractedFrame, target: Option<&wgpu::TextureView>) -> Result<(), String> {
        let mut draws = Vec::with_capacity(frame.draws.len());
        for item in &frame.draws {
            let Some(vertex_array) = self.meshes.get(&item.mesh.0) else {
                log::warn!("draw {:?}: unknown mesh {:?}", item.source, item.mesh);
                continue;
            };
            draws.push(SceneDraw {
                item,
                vertex_array,
                texture: item.texture.and_then(|t| self.textures.get(&t.0)),
            });
        }
        let cmd = self.renderer.render_frame(frame, &draws, target)?;
        self.renderer.submit([cmd]);
        Ok(())
    }
}

impl RenderBackend for ReefPlugin {
    fn upload_mesh(&mut self, label: &str, data: &ModelData, texture_repeat: f32) -> MeshHandle {
        let vertex_array = match self.renderer.upload_model(label, data, texture_repeat) {
            Ok(va) => va,
            Err(e) => {
                log::error!("{}: upload failed: {}", label, e);
                VertexArray::empty(label)
            }
        };
        let id = self.next_id();
        self.meshes.insert(id, vertex_array);
        MeshHandle(id)
    }

    fn load_texture(&mut self, path: &Path) -> Option<TextureHandle> {
        match self.renderer.load_texture(path) {
            Ok(texture) => {
                log::info!("texture {} loaded ({}x{}, {} mips)", path.display(), texture.size.0, texture.size.1, texture.mip_levels);
                let id = self.next_id();
                self.textures.insert(id, texture);
                Some(TextureHandle(id))
            }
            Err(e) => {
                log::warn!("texture {}: {}, drawing untextured", path.display(), e);
                None
            }
        }
    }

    fn render_frame(&mut self, frame: &ExtractedFrame) -> Result<(), String> {
        self.render_frame_to(frame, None)
    }
}
