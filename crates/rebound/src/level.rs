//! Level loading
//!
//! A level is a RON map from integer instance id to a static model
//! record. Records are realized in ascending id order, which fixes the
//! draw order of the arena statics.

use quartz_engine::foundation::math::Vec3;
use quartz_engine::render::technique::ShaderKind;
use quartz_engine::scene::SceneInstance;

use log::info;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

/// Level loading failure
#[derive(Debug, Error)]
pub enum LevelError {
    /// Level file could not be read
    #[error("failed to read level file: {0}")]
    Io(#[from] std::io::Error),
    /// Level payload did not parse
    #[error("failed to parse level file: {0}")]
    Parse(#[from] ron::error::SpannedError),
}

/// On-disk level description
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelDesc {
    /// Display name used in logs
    #[serde(default)]
    pub name: String,
    /// Static instances keyed by id
    pub instances: BTreeMap<u32, StaticRecord>,
}

/// One static model instance in a level file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaticRecord {
    /// Model identifier
    pub model: String,
    #[serde(default)]
    pub translation: [f32; 3],
    #[serde(default)]
    pub rotation: [f32; 3],
    #[serde(default = "default_scale")]
    pub scale: [f32; 3],
    #[serde(default)]
    pub shader: ShaderKind,
    /// Diffuse texture override for this instance
    #[serde(default)]
    pub diffuse: Option<String>,
    /// Normal map override for this instance
    #[serde(default)]
    pub normal: Option<String>,
    #[serde(default = "default_true")]
    pub casts_shadow: bool,
    #[serde(default)]
    pub invisible: bool,
}

fn default_scale() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

fn default_true() -> bool {
    true
}

impl StaticRecord {
    fn to_instance(&self) -> SceneInstance {
        let mut instance = SceneInstance::new(&self.model).with_shader(self.shader);
        instance.transform.translation = Vec3::from(self.translation);
        instance.transform.rotation = Vec3::from(self.rotation);
        instance.transform.scale = Vec3::from(self.scale);
        instance.diffuse_override = self.diffuse.clone();
        instance.normal_override = self.normal.clone();
        instance.set_casts_shadow(self.casts_shadow);
        instance.set_invisible(self.invisible);
        instance
    }
}

/// Load a level file and realize its instances in ascending id order
pub fn load_level(path: &Path) -> Result<Vec<SceneInstance>, LevelError> {
    let text = std::fs::read_to_string(path)?;
    let desc: LevelDesc = ron::from_str(&text)?;
    let instances: Vec<SceneInstance> = desc
        .instances
        .values()
        .map(StaticRecord::to_instance)
        .collect();
    info!(
        "Loaded level '{}' with {} static instances",
        desc.name,
        instances.len()
    );
    Ok(instances)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"(
        name: "sample",
        instances: {
            4: (model: "pillar", translation: (4.0, 0.0, 0.0)),
            0: (
                model: "floor",
                shader: BasicNoLighting,
                diffuse: Some("stone"),
                casts_shadow: false,
            ),
            2: (model: "pillar", translation: (2.0, 0.0, 0.0), invisible: true),
        },
    )"#;

    #[test]
    fn test_instances_realize_in_ascending_id_order() {
        let desc: LevelDesc = ron::from_str(SAMPLE).unwrap();
        let instances: Vec<SceneInstance> =
            desc.instances.values().map(StaticRecord::to_instance).collect();

        assert_eq!(instances.len(), 3);
        assert_eq!(instances[0].model, "floor");
        assert_eq!(instances[1].model, "pillar");
        assert!((instances[1].transform.translation.x - 2.0).abs() < f32::EPSILON);
        assert!((instances[2].transform.translation.x - 4.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_record_defaults() {
        let desc: LevelDesc = ron::from_str(SAMPLE).unwrap();
        let floor = desc.instances[&0].to_instance();
        assert!(!floor.casts_shadow());
        assert!(!floor.is_invisible());
        assert_eq!(floor.shader, ShaderKind::BasicNoLighting);
        assert_eq!(floor.diffuse_override.as_deref(), Some("stone"));

        let pillar = desc.instances[&4].to_instance();
        assert!(pillar.casts_shadow());
        assert_eq!(pillar.shader, ShaderKind::BasicTextured);
        assert_eq!(pillar.transform.scale, Vec3::new(1.0, 1.0, 1.0));

        let hidden = desc.instances[&2].to_instance();
        assert!(hidden.is_invisible());
    }

    #[test]
    fn test_malformed_level_is_a_parse_error() {
        let result: Result<LevelDesc, _> = ron::from_str("(instances: wrong)");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_level_reads_a_file() {
        let dir = std::env::temp_dir().join("rebound_level_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("sample.ron");
        std::fs::write(&path, SAMPLE).unwrap();

        let instances = load_level(&path).unwrap();
        assert_eq!(instances.len(), 3);

        let missing = load_level(&dir.join("absent.ron"));
        assert!(matches!(missing, Err(LevelError::Io(_))));
        std::fs::remove_dir_all(&dir).ok();
    }
}
