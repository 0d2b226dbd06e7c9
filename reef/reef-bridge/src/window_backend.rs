//! Window-capable backend: created from a window, implements RenderBackendWindow.

use std::path::Path;

use raw_window_handle::{HasDisplayHandle, HasWindowHandle, RawDisplayHandle, RawWindowHandle};
use reef_renderer::RendererConfig;
use render_api::{ExtractedFrame, MeshHandle, ModelData, RenderBackend, RenderBackendWindow, TextureHandle};
use wgpu::SurfaceTargetUnsafe;

use crate::plugin::ReefPlugin;

/// Backend that owns the wgpu Instance and a ReefPlugin; can present to a window.
/// Created via `ReefWindowBackend::from_window(window)`; each frame use
/// `render_frame_to_window(frame, raw_window_handle, raw_display_handle)`.
/// The surface is recreated each frame so it never outlives the window it was made from.
pub struct ReefWindowBackend {
    instance: wgpu::Instance,
    plugin: ReefPlugin,
}

impl ReefWindowBackend {
    /// Create a window-capable backend from a window (e.g. winit). The window is only used to get
    /// raw handles and an initial surface for adapter and format selection. Fails when no adapter
    /// is available or the scene program does not build.
    pub fn from_window(window: &(impl HasWindowHandle + HasDisplayHandle)) -> Result<Self, String> {
        Self::from_window_with_config(window, RendererConfig::default())
    }

    pub fn from_window_with_config(
        window: &(impl HasWindowHandle + HasDisplayHandle),
        config: RendererConfig,
    ) -> Result<Self, String> {
        let (raw_window, raw_display) = {
            let wh = window.window_handle().map_err(|e| e.to_string())?;
            let dh = window.display_handle().map_err(|e| e.to_string())?;
            (wh.as_raw(), dh.as_raw())
        };
        pollster::block_on(Self::from_raw_handles_async(raw_window, raw_display, config))
    }

    async fn from_raw_handles_async(
        raw_window_handle: RawWindowHandle,
        raw_display_handle: RawDisplayHandle,
        config: RendererConfig,
    ) -> Result<Self, String> {
        let instance = wgpu::Instance::default();
        let target = SurfaceTargetUnsafe::RawHandle {
            raw_window_handle,
            raw_display_handle,
        };
        let surface = unsafe { instance.create_surface_unsafe(target).map_err(|e| e.to_string())? };
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or("No adapter")?;
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor::default(), None)
            .await
            .map_err(|e| e.to_string())?;
        let caps = surface.get_capabilities(&adapter);
        // sRGB first so the shader output is encoded on write
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .unwrap_or(config.swapchain_format);
        let config = RendererConfig {
            swapchain_format: format,
            ..config
        };
        log::info!("adapter: {} ({:?}), surface format {:?}", adapter.get_info().name, adapter.get_info().backend, format);
        let plugin = ReefPlugin::new_with_config(device, queue, config)?;
        drop(surface);
        Ok(Self { instance, plugin })
    }

    fn surface_config(format: wgpu::TextureFormat, width: u32, height: u32) -> wgpu::SurfaceConfiguration {
        wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: wgpu::CompositeAlphaMode::Opaque,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        }
    }
}

impl RenderBackend for ReefWindowBackend {
    fn upload_mesh(&mut self, label: &str, data: &ModelData, texture_repeat: f32) -> MeshHandle {
        self.plugin.upload_mesh(label, data, texture_repeat)
    }

    fn load_texture(&mut self, path: &Path) -> Option<TextureHandle> {
        self.plugin.load_texture(path)
    }

    fn render_frame(&mut self, frame: &ExtractedFrame) -> Result<(), String> {
        self.plugin.render_frame(frame)
    }
}

impl RenderBackendWindow for ReefWindowBackend {
    fn render_frame_to_window(
        &mut self,
        frame: &ExtractedFrame,
        raw_window_handle: RawWindowHandle,
        raw_display_handle: RawDisplayHandle,
    ) -> Result<(), String> {
        let target = SurfaceTargetUnsafe::RawHandle {
            raw_window_handle,
            raw_display_handle,
        };
        let surface = unsafe {
            self.instance
                .create_surface_unsafe(target)
                .map_err(|e| e.to_string())?
        };
        let (width, height) = frame.viewport_size;
        let config = Self::surface_config(
            self.plugin.renderer().config().swapchain_format,
            width.max(1),
            height.max(1),
        );
        surface.configure(self.plugin.device(), &config);

        let output = match surface.get_current_texture() {
            Ok(f) => f,
            Err(wgpu::SurfaceError::Outdated) | Err(wgpu::SurfaceError::Lost) => {
                surface.configure(self.plugin.device(), &config);
                surface.get_current_texture().map_err(|e| e.to_string())?
            }
            Err(wgpu::SurfaceError::Timeout) => return Err("Surface get_current_texture timeout".to_string()),
            Err(e) => return Err(e.to_string()),
        };
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());
        self.plugin.render_frame_to(frame, Some(&view))?;
        output.present();
        Ok(())
    }
}
