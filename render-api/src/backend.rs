//! Traits for render backends. The scene registry uploads through `RenderBackend` and the host
//! calls render_frame uniformly, whether the implementation is wgpu or a test recorder.

use std::path::Path;

use crate::{ExtractedFrame, MeshHandle, ModelData, TextureHandle};
use raw_window_handle::{RawDisplayHandle, RawWindowHandle};

pub trait RenderBackend: Send {
    /// GPU upload: flatten `data`, scale its UVs by `texture_repeat` and create the vertex array.
    /// Empty data yields a handle to a vertex array with no bound attributes.
    fn upload_mesh(&mut self, label: &str, data: &ModelData, texture_repeat: f32) -> MeshHandle;

    /// Decode an image into a mipmapped, repeat-wrapped texture. `None` when decoding fails.
    fn load_texture(&mut self, path: &Path) -> Option<TextureHandle>;

    /// Render one frame off-screen. Submits work internally.
    fn render_frame(&mut self, frame: &ExtractedFrame) -> Result<(), String>;
}

/// Extension for backends that can present to a window. Host passes raw handles (e.g. from winit);
/// the backend owns the surface and performs get_current_texture + present internally.
pub trait RenderBackendWindow: RenderBackend + Send {
    /// Render one frame and present it. The surface is configured from `frame.viewport_size`.
    fn render_frame_to_window(
        &mut self,
        frame: &ExtractedFrame,
        raw_window_handle: RawWindowHandle,
        raw_display_handle: RawDisplayHandle,
    ) -> Result<(), String>;
}
