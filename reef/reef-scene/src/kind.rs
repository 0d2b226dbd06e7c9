//! Entity classification, computed once from the asset path at load time.

use std::path::Path;

use render_api::SourceTopology;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// Quad-wound ground mesh.
    Terrain,
    /// Static decoration.
    Prop,
    /// Patrols along X, turning around at each end.
    Shark,
    /// Jitters vertically around a fixed anchor height.
    Seahorse,
    /// Patrols along X without turning.
    Squid,
    /// Landmark spinning about its Y axis.
    Spinner,
    Generic,
}

impl EntityKind {
    pub fn classify(path: &str) -> Self {
        let stem = Path::new(path)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        if stem.starts_with("terrain") {
            EntityKind::Terrain
        } else if stem.starts_with("shark") {
            EntityKind::Shark
        } else if stem.starts_with("seahorse") {
            EntityKind::Seahorse
        } else if stem.starts_with("squid") {
            EntityKind::Squid
        } else if stem == "aincrad" {
            EntityKind::Spinner
        } else if ["coral", "weed", "tkr", "qst", "jiangyou", "stone"]
            .iter()
            .any(|p| stem.contains(p))
        {
            EntityKind::Prop
        } else {
            EntityKind::Generic
        }
    }

    /// Face winding the importer should expect for this kind of entity.
    pub fn source_topology(self) -> SourceTopology {
        match self {
            EntityKind::Terrain => SourceTopology::Quads,
            _ => SourceTopology::Triangles,
        }
    }
}
