//! Shared render backend API for the underwater viewer.
//! Defines the render-agnostic mesh data model, Extract types and the RenderBackend trait so
//! the scene side can populate and draw through any backend (wgpu, or an in-memory recorder in tests).

mod backend;
mod extract;
mod mesh;

pub use backend::{RenderBackend, RenderBackendWindow};
pub use extract::{
    DrawItem, DrawSource, ExtractedFrame, Fog, MeshHandle, TextureHandle, IDENTITY_MATRIX,
};
pub use mesh::{ModelData, SourceTopology, SubMesh, DEFAULT_DIFFUSE};
pub use raw_window_handle::{RawDisplayHandle, RawWindowHandle};
