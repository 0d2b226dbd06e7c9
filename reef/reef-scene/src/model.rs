//! Drawable records held by the registry.

use std::sync::Arc;

use glam::{Mat4, Vec3};
use render_api::{MeshHandle, ModelData, TextureHandle};

use crate::kind::EntityKind;
use crate::simulation::Motion;

/// A static (or script-animated) drawable.
#[derive(Clone, Debug)]
pub struct Model {
    pub name: String,
    pub kind: EntityKind,
    pub data: ModelData,
    pub position: Vec3,
    /// Manifest yaw in degrees.
    pub rotation_y: f32,
    pub mesh: MeshHandle,
    pub texture: Option<TextureHandle>,
    pub motion: Motion,
}

impl Model {
    pub fn has_texture(&self) -> bool {
        self.texture.is_some()
    }

    /// Yaw actually drawn, after patrol turns or spinning.
    pub fn yaw(&self) -> f32 {
        self.motion.yaw(self.rotation_y)
    }

    /// translate(position) * rotate_y(yaw): rotate about the own origin, then place.
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_translation(self.position) * Mat4::from_rotation_y(self.yaw().to_radians())
    }
}

/// A GPU-resident part of a composite actor.
#[derive(Clone, Debug, Default)]
pub struct ModelPart {
    pub data: ModelData,
    pub mesh: Option<MeshHandle>,
}

impl ModelPart {
    pub fn vertex_count(&self) -> u32 {
        if self.mesh.is_some() {
            self.data.point_count as u32
        } else {
            0
        }
    }
}

/// A fish: body and fin parts, shared with the rest of its school.
#[derive(Clone, Debug)]
pub struct FishModel {
    pub name: String,
    pub body: Arc<ModelPart>,
    pub fin: Arc<ModelPart>,
    pub position: Vec3,
    pub rotation_y: f32,
    pub direction: Vec3,
    /// Degrees, about the body's local Z axis.
    pub fin_angle: f32,
    /// Loaded with the school, not bound when drawing.
    pub texture: Option<TextureHandle>,
    pub color: Vec3,
}

impl FishModel {
    pub fn body_matrix(&self) -> Mat4 {
        Mat4::from_translation(self.position) * Mat4::from_rotation_y(self.rotation_y.to_radians())
    }

    /// The fin swings in the body's frame.
    pub fn fin_matrix(&self) -> Mat4 {
        self.body_matrix() * Mat4::from_rotation_z(self.fin_angle.to_radians())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn fish() -> FishModel {
        FishModel {
            name: "fish".into(),
            body: Arc::new(ModelPart::default()),
            fin: Arc::new(ModelPart::default()),
            position: Vec3::new(1.0, 2.0, 3.0),
            rotation_y: 90.0,
            direction: Vec3::X,
            fin_angle: 0.0,
            texture: None,
            color: Vec3::ONE,
        }
    }

    #[test]
    fn model_rotates_before_translating() {
        let m = Model {
            name: "cube".into(),
            kind: EntityKind::Generic,
            data: ModelData::default(),
            position: Vec3::new(5.0, 0.0, 0.0),
            rotation_y: 90.0,
            mesh: MeshHandle(1),
            texture: None,
            motion: Motion::Static,
        };
        let p = m.model_matrix().transform_point3(Vec3::X);
        assert_relative_eq!(p.x, 5.0, epsilon = 1e-5);
        assert_relative_eq!(p.z, -1.0, epsilon = 1e-5);
    }

    #[test]
    fn fin_is_local_to_body() {
        let mut f = fish();
        assert_eq!(f.fin_matrix(), f.body_matrix());
        f.fin_angle = 90.0;
        // local +X rotates to local +Y, which the body yaw leaves untouched
        let p = f.fin_matrix().transform_point3(Vec3::X);
        assert_relative_eq!(p.x, 1.0, epsilon = 1e-5);
        assert_relative_eq!(p.y, 3.0, epsilon = 1e-5);
        assert_relative_eq!(p.z, 3.0, epsilon = 1e-5);
    }

    #[test]
    fn part_without_mesh_draws_nothing() {
        let part = ModelPart {
            data: ModelData {
                point_count: 12,
                ..ModelData::default()
            },
            mesh: None,
        };
        assert_eq!(part.vertex_count(), 0);
    }
}
