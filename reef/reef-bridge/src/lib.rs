//! Reef bridge: implements render_api::RenderBackend using reef-renderer.

mod plugin;
mod window_backend;

pub use plugin::ReefPlugin;
pub use window_backend::ReefWindowBackend;
