//! Frame renderer traversal: turns the registry and camera into an ExtractedFrame.
//!
//! Draw order is fixed: every static model in registry order, then for each fish its body followed
//! by its fin. The backend only encodes what it is given.

use glam::Mat4;
use render_api::{DrawItem, DrawSource, ExtractedFrame, Fog, DEFAULT_DIFFUSE};

use crate::camera::CameraState;
use crate::registry::SceneRegistry;

#[derive(Clone, Debug, PartialEq)]
pub struct FrameConfig {
    /// Vertical field of view, degrees.
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
    pub clear_color: [f32; 4],
    pub fog: Fog,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            fov_y: 45.0,
            near: 0.1,
            far: 1000.0,
            clear_color: [0.0, 0.0, 0.3, 1.0],
            fog: Fog::default(),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct FrameRenderer {
    config: FrameConfig,
}

impl FrameRenderer {
    pub fn new(config: FrameConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FrameConfig {
        &self.config
    }

    pub fn projection(&self, viewport: (u32, u32)) -> Mat4 {
        let aspect = viewport.0.max(1) as f32 / viewport.1.max(1) as f32;
        Mat4::perspective_rh(self.config.fov_y.to_radians(), aspect, self.config.near, self.config.far)
    }

    pub fn extract(&self, registry: &SceneRegistry, camera: &CameraState, viewport: (u32, u32)) -> ExtractedFrame {
        let mut draws = Vec::with_capacity(registry.models().len() + registry.fish().len() * 2);

        for (i, model) in registry.models().iter().enumerate() {
            draws.push(DrawItem {
                source: DrawSource::Model(i),
                mesh: model.mesh,
                texture: model.texture,
                model: model.model_matrix().to_cols_array(),
                diffuse_color: model.data.resolved_color(),
                fish_color: DEFAULT_DIFFUSE,
                vertex_count: model.data.point_count as u32,
            });
        }

        for (i, fish) in registry.fish().iter().enumerate() {
            let tint = fish.color.to_array();
            let parts = [
                (DrawSource::FishBody(i), &fish.body, fish.body_matrix()),
                (DrawSource::FishFin(i), &fish.fin, fish.fin_matrix()),
            ];
            for (source, part, matrix) in parts {
                let Some(mesh) = part.mesh else {
                    continue;
                };
                draws.push(DrawItem {
                    source,
                    mesh,
                    texture: None,
                    model: matrix.to_cols_array(),
                    diffuse_color: part.data.resolved_color(),
                    fish_color: tint,
                    vertex_count: part.vertex_count(),
                });
            }
        }

        ExtractedFrame {
            view: camera.view_matrix().to_cols_array(),
            proj: self.projection(viewport).to_cols_array(),
            viewport_size: viewport,
            clear_color: self.config.clear_color,
            fog: self.config.fog,
            draws,
        }
    }
}
