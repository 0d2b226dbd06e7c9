//! The fixed list of assets a scene is built from.

use glam::Vec3;
use render_api::SourceTopology;

use crate::kind::EntityKind;

/// One static (or scripted) model.
#[derive(Clone, Debug, PartialEq)]
pub struct ManifestEntry {
    /// Asset path relative to the asset root; also the entity name.
    pub path: String,
    pub position: Vec3,
    /// Yaw in degrees.
    pub rotation_deg: f32,
    pub texture: Option<String>,
    /// UV scale applied at upload; controls tiling density.
    pub texture_repeat: f32,
    pub kind: EntityKind,
    pub topology: SourceTopology,
}

impl ManifestEntry {
    pub fn new(path: impl Into<String>, position: Vec3, rotation_deg: f32) -> Self {
        let path = path.into();
        let kind = EntityKind::classify(&path);
        Self {
            path,
            position,
            rotation_deg,
            texture: None,
            texture_repeat: 1.0,
            kind,
            topology: kind.source_topology(),
        }
    }

    pub fn textured(mut self, texture: impl Into<String>, repeat: f32) -> Self {
        self.texture = Some(texture.into());
        self.texture_repeat = repeat;
        self
    }

    /// Marks the source as quad-wound regardless of its kind.
    pub fn quads(mut self) -> Self {
        self.topology = SourceTopology::Quads;
        self
    }
}

/// A school of identical fish sharing one body/fin mesh pair. Spawn values are drawn uniformly.
#[derive(Clone, Debug, PartialEq)]
pub struct FishSchool {
    pub path: String,
    pub texture: Option<String>,
    pub count: usize,
    pub spawn_min: Vec3,
    pub spawn_max: Vec3,
    pub direction_min: Vec3,
    pub direction_max: Vec3,
    /// Initial yaw is a whole number of degrees in `[0, max_initial_yaw)`.
    pub max_initial_yaw: u32,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SceneManifest {
    pub models: Vec<ManifestEntry>,
    pub schools: Vec<FishSchool>,
}

impl SceneManifest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model(mut self, entry: ManifestEntry) -> Self {
        self.models.push(entry);
        self
    }

    pub fn with_school(mut self, school: FishSchool) -> Self {
        self.schools.push(school);
        self
    }

    /// The underwater scene: terrain, landmarks, corals, weeds, scripted animals and a fish school.
    pub fn underwater() -> Self {
        let mut m = Self::new()
            .with_model(
                ManifestEntry::new("terrain1.obj", Vec3::new(0.0, -12.0, -10.0), 30.0)
                    .textured("assets/stone2.jpg", 8.0),
            )
            .with_model(ManifestEntry::new("assets/aincrad.glb", Vec3::new(10.0, 30.0, -70.0), 0.0))
            .with_model(
                ManifestEntry::new("assets/tkr.glb", Vec3::new(-8.0, -10.0, -9.0), 275.0)
                    .textured("assets/metal1.jpg", 1.0),
            );
        for i in 0..5 {
            let i = i as f32;
            m = m.with_model(ManifestEntry::new(
                "assets/white_coral.glb",
                Vec3::new(i + 10.0, -10.0, -(10.0 + i)),
                30.0 + i,
            ));
        }
        for i in 0..3 {
            let i = i as f32;
            m = m.with_model(ManifestEntry::new(
                "assets/red_coral.glb",
                Vec3::new(i + 8.0, -10.0, -(15.0 + i)),
                30.0 + i,
            ));
        }
        m.with_model(
            ManifestEntry::new("assets/qst.obj", Vec3::new(10.0, -24.0, 18.0), 45.0)
                .textured("assets/qst.png", 1.0)
                .quads(),
        )
        .with_model(ManifestEntry::new("assets/weed.glb", Vec3::new(-10.0, -12.0, -30.0), 45.0))
        .with_model(ManifestEntry::new("assets/weed.glb", Vec3::new(5.0, -12.0, -30.0), 15.0))
        .with_model(ManifestEntry::new("assets/shark3.glb", Vec3::new(0.0, 0.0, -3.0), 45.0))
        .with_model(ManifestEntry::new("assets/seahorse.glb", Vec3::new(30.0, 20.0, -40.0), 15.0))
        .with_model(ManifestEntry::new("assets/squid.glb", Vec3::new(0.0, 10.0, -10.0), 45.0))
        .with_model(ManifestEntry::new("assets/squid.glb", Vec3::new(-3.0, 14.0, -12.0), 45.0))
        .with_model(ManifestEntry::new("assets/jiangyou.glb", Vec3::new(12.0, -12.0, 3.0), 45.0))
        .with_school(FishSchool {
            path: "assets/fish.glb".into(),
            texture: Some("assets/fish.png".into()),
            count: 100,
            spawn_min: Vec3::new(-30.0, -10.0, -10.0),
            spawn_max: Vec3::new(15.0, 5.0, -3.0),
            direction_min: Vec3::new(1.0, -4.0, 0.0),
            direction_max: Vec3::new(10.0, 4.0, 0.0),
            max_initial_yaw: 45,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn underwater_scene_contents() {
        let m = SceneManifest::underwater();
        assert_eq!(m.models.len(), 3 + 5 + 3 + 1 + 2 + 1 + 1 + 2 + 1);
        assert_eq!(m.schools.len(), 1);
        assert_eq!(m.schools[0].count, 100);

        let terrain = &m.models[0];
        assert_eq!(terrain.kind, EntityKind::Terrain);
        assert_eq!(terrain.topology, SourceTopology::Quads);
        assert_eq!(terrain.texture_repeat, 8.0);

        let qst = m.models.iter().find(|e| e.path == "assets/qst.obj").unwrap();
        assert_eq!(qst.topology, SourceTopology::Quads);
        assert_eq!(qst.kind, EntityKind::Prop);

        let kinds: Vec<EntityKind> = m.models.iter().map(|e| e.kind).collect();
        assert_eq!(kinds.iter().filter(|k| **k == EntityKind::Squid).count(), 2);
        assert_eq!(kinds.iter().filter(|k| **k == EntityKind::Shark).count(), 1);
        assert_eq!(kinds.iter().filter(|k| **k == EntityKind::Spinner).count(), 1);
    }

    #[test]
    fn entry_defaults() {
        let e = ManifestEntry::new("cube", Vec3::new(0.0, -3.0, 0.0), 0.0);
        assert_eq!(e.kind, EntityKind::Generic);
        assert_eq!(e.topology, SourceTopology::Triangles);
        assert!(e.texture.is_none());
        assert_eq!(e.texture_repeat, 1.0);
    }
}
