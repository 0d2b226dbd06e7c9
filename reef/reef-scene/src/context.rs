//! Everything the run loop owns about the scene, in one place.

use std::path::PathBuf;

use rand::rngs::StdRng;
use rand::SeedableRng;
use render_api::{ExtractedFrame, RenderBackend};

use crate::camera::{CameraConfig, CameraController, ScrollDirection};
use crate::frame::{FrameConfig, FrameRenderer};
use crate::manifest::SceneManifest;
use crate::registry::SceneRegistry;
use crate::simulation::{SimulationConfig, Simulator};

#[derive(Clone, Debug, PartialEq)]
pub struct SceneConfig {
    pub camera: CameraConfig,
    pub simulation: SimulationConfig,
    pub frame: FrameConfig,
    /// Seed for fish spawn and jitter; a fixed seed reproduces the same scene.
    pub seed: u64,
    pub asset_root: PathBuf,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            camera: CameraConfig::default(),
            simulation: SimulationConfig::default(),
            frame: FrameConfig::default(),
            seed: 0x5eed,
            asset_root: PathBuf::from("."),
        }
    }
}

pub struct SceneContext {
    pub registry: SceneRegistry,
    pub camera: CameraController,
    simulator: Simulator,
    renderer: FrameRenderer,
    rng: StdRng,
}

impl SceneContext {
    /// Loads the manifest through `backend` and sets up camera, clock and frame traversal.
    pub fn load(config: SceneConfig, manifest: &SceneManifest, backend: &mut dyn RenderBackend) -> Self {
        let mut rng = StdRng::seed_from_u64(config.seed);
        let registry = SceneRegistry::populate(
            manifest,
            &config.asset_root,
            backend,
            &config.simulation,
            &mut rng,
        );
        Self {
            registry,
            camera: CameraController::new(config.camera),
            simulator: Simulator::new(config.simulation),
            renderer: FrameRenderer::new(config.frame),
            rng,
        }
    }

    /// One simulation step with the wall time elapsed since the previous call.
    pub fn tick(&mut self) {
        self.simulator.tick(&mut self.registry, &mut self.rng);
    }

    pub fn extract(&self, viewport: (u32, u32)) -> ExtractedFrame {
        self.renderer.extract(&self.registry, self.camera.state(), viewport)
    }

    pub fn key_press(&mut self, key: char) -> bool {
        self.camera.key_press(key)
    }

    pub fn mouse_button(&mut self, pressed: bool, x: f64, y: f64) {
        self.camera.mouse_button(pressed, x, y);
    }

    pub fn mouse_motion(&mut self, x: f64, y: f64) {
        self.camera.mouse_motion(x, y);
    }

    pub fn scroll(&mut self, direction: ScrollDirection) {
        self.camera.scroll(direction);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::ManifestEntry;
    use crate::registry::tests::{cube_dir, RecordingBackend};
    use glam::Vec3;

    #[test]
    fn load_extract_and_render() {
        let dir = cube_dir();
        let config = SceneConfig {
            asset_root: dir.path().to_path_buf(),
            ..SceneConfig::default()
        };
        let manifest = SceneManifest::new()
            .with_model(ManifestEntry::new("cube.obj", Vec3::new(0.0, -3.0, 0.0), 0.0));
        let mut backend = RecordingBackend::default();
        let mut ctx = SceneContext::load(config, &manifest, &mut backend);
        ctx.tick();
        ctx.key_press('w');
        ctx.scroll(ScrollDirection::Down);
        let frame = ctx.extract((800, 600));
        assert_eq!(frame.draws.len(), 1);
        assert_eq!(ctx.camera.state().distance, 11.0);
        backend.render_frame(&frame).unwrap();
        assert_eq!(backend.frames, 1);
    }
}
