//! Shader registry: programs built from a vertex and a fragment WGSL file, validated with naga and
//! reflected so the upload layer and the scene pass can resolve attributes and uniforms by name.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use naga::{AddressSpace, Binding, ShaderStage, TypeInner};

/// Uniforms and resources the scene pass feeds every draw.
pub const REQUIRED_UNIFORMS: [&str; 7] = [
    "view",
    "proj",
    "model",
    "diffuseColor",
    "useTexture",
    "objectTexture",
    "fishColor",
];

#[derive(Debug, thiserror::Error)]
pub enum ShaderError {
    #[error("cannot read shader {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}: WGSL parse error\n{message}")]
    Parse { path: PathBuf, message: String },

    #[error("{path}: validation failed: {message}")]
    Validation { path: PathBuf, message: String },

    #[error("{path}: no {stage:?} entry point")]
    MissingEntryPoint { path: PathBuf, stage: ShaderStage },

    #[error("program '{program}': pipeline creation failed: {message}")]
    Pipeline { program: String, message: String },

    #[error("no program named '{0}'")]
    UnknownProgram(String),
}

/// Names the program exposes, as declared in the WGSL source.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ShaderInterface {
    /// Vertex input name -> `@location`.
    pub attributes: HashMap<String, u32>,
    /// Uniform block names, their member names, and texture/sampler names.
    pub uniforms: HashSet<String>,
}

impl ShaderInterface {
    pub fn attribute_location(&self, name: &str) -> Option<u32> {
        self.attributes.get(name).copied()
    }

    pub fn has_uniform(&self, name: &str) -> bool {
        self.uniforms.contains(name)
    }

    pub fn missing_uniforms(&self) -> Vec<&'static str> {
        REQUIRED_UNIFORMS
            .iter()
            .copied()
            .filter(|u| !self.has_uniform(u))
            .collect()
    }
}

/// One parsed and validated stage.
#[derive(Debug)]
pub struct StageSource {
    pub path: PathBuf,
    pub source: String,
    pub module: naga::Module,
    pub entry_point: String,
}

impl StageSource {
    pub fn load(path: &Path, stage: ShaderStage) -> Result<Self, ShaderError> {
        let source = std::fs::read_to_string(path).map_err(|source| ShaderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, source, stage)
    }

    pub fn parse(path: &Path, source: String, stage: ShaderStage) -> Result<Self, ShaderError> {
        let module = naga::front::wgsl::parse_str(&source).map_err(|e| ShaderError::Parse {
            path: path.to_path_buf(),
            message: e.emit_to_string(&source),
        })?;
        naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::default(),
        )
        .validate(&module)
        .map_err(|e| ShaderError::Validation {
            path: path.to_path_buf(),
            message: e.emit_to_string(&source),
        })?;
        let entry_point = module
            .entry_points
            .iter()
            .find(|ep| ep.stage == stage)
            .map(|ep| ep.name.clone())
            .ok_or_else(|| ShaderError::MissingEntryPoint {
                path: path.to_path_buf(),
                stage,
            })?;
        Ok(Self {
            path: path.to_path_buf(),
            source,
            module,
            entry_point,
        })
    }
}

/// Collects vertex inputs of the vertex stage and uniform/resource names of both stages.
pub fn reflect(vertex: &StageSource, fragment: &StageSource) -> ShaderInterface {
    let mut interface = ShaderInterface::default();

    let module = &vertex.module;
    if let Some(ep) = module.entry_points.iter().find(|ep| ep.name == vertex.entry_point) {
        for arg in &ep.function.arguments {
            match (&arg.binding, &arg.name) {
                (Some(Binding::Location { location, .. }), Some(name)) => {
                    interface.attributes.insert(name.clone(), *location);
                }
                (None, _) => {
                    if let TypeInner::Struct { members, .. } = &module.types[arg.ty].inner {
                        for member in members {
                            if let (Some(Binding::Location { location, .. }), Some(name)) =
                                (&member.binding, &member.name)
                            {
                                interface.attributes.insert(name.clone(), *location);
                            }
                        }
                    }
                }
                _ => {}
            }
        }
    }

    for stage in [vertex, fragment] {
        for (_, global) in stage.module.global_variables.iter() {
            let Some(name) = &global.name else {
                continue;
            };
            match global.space {
                AddressSpace::Uniform => {
                    interface.uniforms.insert(name.clone());
                    if let TypeInner::Struct { members, .. } = &stage.module.types[global.ty].inner {
                        interface
                            .uniforms
                            .extend(members.iter().filter_map(|m| m.name.clone()));
                    }
                }
                AddressSpace::Handle => {
                    interface.uniforms.insert(name.clone());
                }
                _ => {}
            }
        }
    }
    interface
}

/// A compiled program: both stage modules plus the reflected interface.
pub struct ShaderProgram {
    pub name: String,
    pub vertex: wgpu::ShaderModule,
    pub vertex_entry: String,
    pub fragment: wgpu::ShaderModule,
    pub fragment_entry: String,
    pub interface: ShaderInterface,
}

#[derive(Default)]
pub struct ShaderRegistry {
    programs: HashMap<String, ShaderProgram>,
}

impl ShaderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads, validates and compiles both stages, registering the program under `name`.
    pub fn compile_program(
        &mut self,
        device: &wgpu::Device,
        name: &str,
        vertex_path: &Path,
        fragment_path: &Path,
    ) -> Result<&ShaderProgram, ShaderError> {
        let vertex = StageSource::load(vertex_path, ShaderStage::Vertex)?;
        let fragment = StageSource::load(fragment_path, ShaderStage::Fragment)?;
        let interface = reflect(&vertex, &fragment);

        for missing in interface.missing_uniforms() {
            if missing == "diffuseColor" {
                log::warn!("program '{}': diffuseColor uniform not found", name);
            } else {
                log::debug!("program '{}': uniform {} not declared", name, missing);
            }
        }

        let program = ShaderProgram {
            name: name.to_string(),
            vertex: create_module(device, name, "vertex", &vertex.source),
            vertex_entry: vertex.entry_point,
            fragment: create_module(device, name, "fragment", &fragment.source),
            fragment_entry: fragment.entry_point,
            interface,
        };
        log::info!(
            "program '{}' compiled ({} attributes)",
            name,
            program.interface.attributes.len()
        );
        self.programs.insert(name.to_string(), program);
        self.get(name)
    }

    pub fn get(&self, name: &str) -> Result<&ShaderProgram, ShaderError> {
        self.programs
            .get(name)
            .ok_or_else(|| ShaderError::UnknownProgram(name.to_string()))
    }
}

fn create_module(device: &wgpu::Device, program: &str, stage: &str, source: &str) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(&format!("{program}_{stage}")),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const VERTEX: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/shaders/model_vertex.wgsl"));
    const FRAGMENT: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/shaders/model_fragment.wgsl"));

    fn stage(src: &str, stage: ShaderStage) -> Result<StageSource, ShaderError> {
        StageSource::parse(Path::new("test.wgsl"), src.to_string(), stage)
    }

    #[test]
    fn bundled_program_declares_everything() {
        let vertex = stage(VERTEX, ShaderStage::Vertex).unwrap();
        let fragment = stage(FRAGMENT, ShaderStage::Fragment).unwrap();
        assert_eq!(vertex.entry_point, "vs_main");
        assert_eq!(fragment.entry_point, "fs_main");
        let interface = reflect(&vertex, &fragment);
        assert_eq!(interface.attribute_location("vertex_position"), Some(0));
        assert_eq!(interface.attribute_location("vertex_normal"), Some(1));
        assert_eq!(interface.attribute_location("vertex_texcoord"), Some(2));
        assert_eq!(interface.attributes.len(), 3);
        assert!(interface.missing_uniforms().is_empty(), "{:?}", interface.missing_uniforms());
    }

    #[test]
    fn loose_vertex_arguments_are_reflected() {
        let src = "
struct Globals { view: mat4x4<f32>, proj: mat4x4<f32> };
@group(0) @binding(0) var<uniform> globals: Globals;
@vertex
fn main(@location(3) vertex_position: vec3<f32>) -> @builtin(position) vec4<f32> {
    return globals.proj * globals.view * vec4<f32>(vertex_position, 1.0);
}";
        let vertex = stage(src, ShaderStage::Vertex).unwrap();
        let fragment = stage(FRAGMENT, ShaderStage::Fragment).unwrap();
        let interface = reflect(&vertex, &fragment);
        assert_eq!(interface.attribute_location("vertex_position"), Some(3));
        assert_eq!(interface.attribute_location("vertex_normal"), None);
        assert!(interface.has_uniform("view"));
    }

    #[test]
    fn missing_uniforms_are_reported() {
        let src = "
@group(0) @binding(0) var<uniform> tint: vec4<f32>;
@fragment
fn main() -> @location(0) vec4<f32> { return tint; }";
        let vertex = stage(VERTEX, ShaderStage::Vertex).unwrap();
        let fragment = stage(src, ShaderStage::Fragment).unwrap();
        let interface = reflect(&vertex, &fragment);
        let missing = interface.missing_uniforms();
        assert!(missing.contains(&"objectTexture"));
        assert!(!missing.contains(&"diffuseColor"));
        assert!(interface.has_uniform("tint"));
    }

    #[test]
    fn parse_errors_carry_the_diagnostic() {
        let err = stage("fn broken( {", ShaderStage::Vertex).unwrap_err();
        match err {
            ShaderError::Parse { message, .. } => assert!(!message.is_empty()),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn wrong_stage_is_rejected() {
        let err = stage(FRAGMENT, ShaderStage::Vertex).unwrap_err();
        assert!(matches!(err, ShaderError::MissingEntryPoint { .. }));
    }

    #[test]
    fn unreadable_file() {
        let err = StageSource::load(Path::new("no/such/shader.wgsl"), ShaderStage::Vertex).unwrap_err();
        assert!(matches!(err, ShaderError::Io { .. }));
    }
}
