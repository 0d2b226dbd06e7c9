//! Reef Renderer: wgpu upload layer, texture loader, shader registry and the forward scene pass.

pub mod config;
pub mod resources;
pub mod scene_pass;
pub mod shader;
pub mod texture;
pub mod upload;

use std::path::Path;

use render_api::{ExtractedFrame, ModelData};

pub use config::{RendererConfig, MODEL_FRAGMENT_SHADER, MODEL_VERTEX_SHADER};
pub use resources::FrameResources;
pub use scene_pass::{SceneDraw, ScenePass};
pub use shader::{ShaderError, ShaderInterface, ShaderProgram, ShaderRegistry};
pub use texture::{GpuTexture, TextureError, TextureLoader};
pub use upload::{Attribute, AttributeBinding, VertexArray, VertexStreams};

pub struct Renderer {
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: RendererConfig,
    shaders: ShaderRegistry,
    textures: TextureLoader,
    scene_pass: ScenePass,
    frame_resources: Option<FrameResources>,
}

impl Renderer {
    pub fn new(device: wgpu::Device, queue: wgpu::Queue) -> Result<Self, String> {
        Self::new_with_config(device, queue, RendererConfig::default())
    }

    /// Builds the scene program from the configured stage files. A shader failure is returned with
    /// the full diagnostic; the host cannot render without it.
    pub fn new_with_config(device: wgpu::Device, queue: wgpu::Queue, config: RendererConfig) -> Result<Self, String> {
        let mut shaders = ShaderRegistry::new();
        shaders
            .compile_program(&device, &config.program_name, &config.vertex_shader, &config.fragment_shader)
            .map_err(|e| e.to_string())?;
        let textures = TextureLoader::new(&device, &queue);
        let program = shaders.get(&config.program_name).map_err(|e| e.to_string())?;
        let scene_pass = ScenePass::new(&device, program, config.swapchain_format, config.depth_format, &textures)
            .map_err(|e| e.to_string())?;
        Ok(Self {
            device,
            queue,
            config,
            shaders,
            textures,
            scene_pass,
            frame_resources: None,
        })
    }

    pub fn device(&self) -> &wgpu::Device { &self.device }
    pub fn queue(&self) -> &wgpu::Queue { &self.queue }
    pub fn config(&self) -> &RendererConfig { &self.config }
    pub fn shaders(&self) -> &ShaderRegistry { &self.shaders }

    /// Flattens `data`, scales its UVs and uploads it, binding attributes the scene program declares.
    pub fn upload_model(&self, label: &str, data: &ModelData, texture_repeat: f32) -> Result<VertexArray, String> {
        let program = self.shaders.get(&self.config.program_name).map_err(|e| e.to_string())?;
        let streams = VertexStreams::from_model_data(data, texture_repeat);
        Ok(VertexArray::upload(&self.device, &self.queue, label, &streams, &program.interface))
    }

    pub fn load_texture(&self, path: &Path) -> Result<GpuTexture, TextureError> {
        self.textures.load(&self.device, &self.queue, path)
    }

    pub fn ensure_frame_resources(&mut self, width: u32, height: u32) -> Result<(), String> {
        let existing = self.frame_resources.take();
        let new_res = FrameResources::ensure_size(
            &self.device,
            existing,
            width,
            height,
            self.config.swapchain_format,
            self.config.depth_format,
        )?;
        self.frame_resources = Some(new_res);
        Ok(())
    }

    /// Encode the scene pass. Draws into `target` when given, otherwise into the off-screen colour target.
    pub fn encode_frame(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        frame: &ExtractedFrame,
        draws: &[SceneDraw<'_>],
        target: Option<&wgpu::TextureView>,
    ) -> Result<(), String> {
        let (width, height) = frame.viewport_size;
        self.ensure_frame_resources(width.max(1), height.max(1))?;
        let resources = self.frame_resources.as_ref().ok_or("encode_frame: no frame resources")?;
        let offscreen;
        let color_view = match target {
            Some(view) => view,
            None => {
                offscreen = resources.color_view();
                &offscreen
            }
        };
        let depth_view = resources.depth_view();
        self.scene_pass.encode(
            encoder,
            &self.device,
            &self.queue,
            color_view,
            &depth_view,
            frame,
            draws,
            &self.textures,
        )
    }

    pub fn render_frame(
        &mut self,
        frame: &ExtractedFrame,
        draws: &[SceneDraw<'_>],
        target: Option<&wgpu::TextureView>,
    ) -> Result<wgpu::CommandBuffer, String> {
        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some("reef_frame") });
        self.encode_frame(&mut encoder, frame, draws, target)?;
        Ok(encoder.finish())
    }

    pub fn submit(&self, command_buffers: impl IntoIterator<Item = wgpu::CommandBuffer>) {
        self.queue.submit(command_buffers);
    }
}
