//! Scene side of the underwater viewer: what is in the scene, how it moves, where the camera is,
//! and what one frame draws. Nothing here touches the GPU; uploads and draws go through
//! `render_api::RenderBackend`.

pub mod camera;
pub mod context;
pub mod frame;
pub mod kind;
pub mod manifest;
pub mod model;
pub mod registry;
pub mod simulation;

pub use camera::{CameraConfig, CameraController, CameraState, ScrollDirection};
pub use context::{SceneConfig, SceneContext};
pub use frame::{FrameConfig, FrameRenderer};
pub use kind::EntityKind;
pub use manifest::{FishSchool, ManifestEntry, SceneManifest};
pub use model::{FishModel, Model, ModelPart};
pub use registry::SceneRegistry;
pub use simulation::{advance, Motion, PatrolConfig, SimulationConfig, Simulator};
