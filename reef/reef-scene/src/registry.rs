//! Scene model registry: every Model and FishModel of the session, in load order.
//! Populated once from a manifest; entities are never removed.

use std::path::Path;
use std::sync::Arc;

use glam::Vec3;
use rand::Rng;
use reef_assets::{import_hierarchical_mesh, load_model_data};
use render_api::{ModelData, RenderBackend};

use crate::manifest::{FishSchool, ManifestEntry, SceneManifest};
use crate::model::{FishModel, Model, ModelPart};
use crate::simulation::{Motion, SimulationConfig};

/// Sub-mesh order inside a fish asset.
const FISH_BODY: usize = 0;
const FISH_FIN: usize = 1;

#[derive(Debug, Default)]
pub struct SceneRegistry {
    models: Vec<Model>,
    fish: Vec<FishModel>,
}

impl SceneRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Imports, uploads and spawns everything in `manifest`. Asset paths resolve against `asset_root`.
    pub fn populate(
        manifest: &SceneManifest,
        asset_root: &Path,
        backend: &mut dyn RenderBackend,
        simulation: &SimulationConfig,
        rng: &mut impl Rng,
    ) -> Self {
        let mut registry = Self::new();
        for entry in &manifest.models {
            registry.load_model(entry, asset_root, backend, simulation);
        }
        for school in &manifest.schools {
            registry.spawn_school(school, asset_root, backend, rng);
        }
        log::info!(
            "scene populated: {} models, {} fish",
            registry.models.len(),
            registry.fish.len()
        );
        registry
    }

    pub fn load_model(
        &mut self,
        entry: &ManifestEntry,
        asset_root: &Path,
        backend: &mut dyn RenderBackend,
        simulation: &SimulationConfig,
    ) {
        let data = load_model_data(asset_root.join(&entry.path), entry.topology);
        let mesh = backend.upload_mesh(&entry.path, &data, entry.texture_repeat);
        let texture = entry
            .texture
            .as_ref()
            .and_then(|t| backend.load_texture(&asset_root.join(t)));
        self.push_model(Model {
            name: entry.path.clone(),
            kind: entry.kind,
            data,
            position: entry.position,
            rotation_y: entry.rotation_deg,
            mesh,
            texture,
            motion: Motion::for_kind(entry.kind, simulation),
        });
    }

    /// Imports the school's mesh once; every fish shares the uploaded body and fin.
    pub fn spawn_school(
        &mut self,
        school: &FishSchool,
        asset_root: &Path,
        backend: &mut dyn RenderBackend,
        rng: &mut impl Rng,
    ) {
        if school.count == 0 {
            return;
        }
        let data = import_hierarchical_mesh(asset_root.join(&school.path));
        let body = Arc::new(upload_part(backend, &format!("{} body", school.path), &data, FISH_BODY));
        let fin = Arc::new(upload_part(backend, &format!("{} fin", school.path), &data, FISH_FIN));
        let texture = school
            .texture
            .as_ref()
            .and_then(|t| backend.load_texture(&asset_root.join(t)));

        for _ in 0..school.count {
            let position = sample_vec3(rng, school.spawn_min, school.spawn_max);
            let rotation_y = rng.gen_range(0..school.max_initial_yaw.max(1)) as f32;
            let direction = sample_vec3(rng, school.direction_min, school.direction_max);
            let color = Vec3::new(
                rng.gen_range(0.0..=1.0),
                rng.gen_range(0.0..=1.0),
                rng.gen_range(0.0..=1.0),
            );
            log::debug!("fish {} spawned at {} tint {}", self.fish.len(), position, color);
            self.push_fish(FishModel {
                name: school.path.clone(),
                body: Arc::clone(&body),
                fin: Arc::clone(&fin),
                position,
                rotation_y,
                direction,
                fin_angle: 0.0,
                texture,
                color,
            });
        }
    }

    pub fn push_model(&mut self, model: Model) {
        self.models.push(model);
    }

    pub fn push_fish(&mut self, fish: FishModel) {
        self.fish.push(fish);
    }

    pub fn models(&self) -> &[Model] {
        &self.models
    }

    pub fn models_mut(&mut self) -> &mut [Model] {
        &mut self.models
    }

    pub fn fish(&self) -> &[FishModel] {
        &self.fish
    }

    pub fn fish_mut(&mut self) -> &mut [FishModel] {
        &mut self.fish
    }

    /// Static models plus fish.
    pub fn len(&self) -> usize {
        self.models.len() + self.fish.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn upload_part(backend: &mut dyn RenderBackend, label: &str, data: &ModelData, index: usize) -> ModelPart {
    match data.sub_meshes.get(index) {
        Some(sub) => {
            let data = ModelData::from_sub_mesh(sub.clone());
            let mesh = backend.upload_mesh(label, &data, 1.0);
            ModelPart {
                data,
                mesh: Some(mesh),
            }
        }
        None => {
            log::warn!("{}: no sub-mesh {}, part left empty", label, index);
            ModelPart::default()
        }
    }
}

fn sample(rng: &mut impl Rng, min: f32, max: f32) -> f32 {
    if max <= min {
        min
    } else {
        rng.gen_range(min..=max)
    }
}

fn sample_vec3(rng: &mut impl Rng, min: Vec3, max: Vec3) -> Vec3 {
    Vec3::new(
        sample(rng, min.x, max.x),
        sample(rng, min.y, max.y),
        sample(rng, min.z, max.z),
    )
}
