use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::engine::config::transform::{TransformParams, parse_vec3};

/// One configured 3D model bound to an image target. Mirrors the
/// `ar.models[]` entries of `config.json` exactly; the transform fields keep
/// the `"x y z"` string encoding of the source document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelDescriptor {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Zero-based image-target slot. Not required to be unique; several
    /// models may attach to the same target.
    pub target_index: u32,
    /// Asset URL of the glTF model.
    pub path: String,
    #[serde(default = "default_scale")]
    pub scale: String,
    #[serde(default = "default_vector")]
    pub position: String,
    #[serde(default = "default_vector")]
    pub rotation: String,
}

fn default_scale() -> String {
    "1 1 1".to_string()
}

fn default_vector() -> String {
    "0 0 0".to_string()
}

impl ModelDescriptor {
    /// Structured defaults for this model, parsed once at the config boundary.
    pub fn default_params(&self) -> TransformParams {
        TransformParams {
            scale: parse_vec3(&self.scale),
            position: parse_vec3(&self.position),
            rotation: parse_vec3(&self.rotation),
        }
    }
}

/// The `ar` section of the site configuration. A missing mind file or an
/// empty model list is a valid "no AR content" condition, never an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArConfig {
    #[serde(default)]
    pub mind_file: Option<String>,
    #[serde(default)]
    pub models: Vec<ModelDescriptor>,
}

impl ArConfig {
    /// Whether there is anything for the scene compiler to build.
    pub fn has_content(&self) -> bool {
        self.mind_file.as_deref().is_some_and(|f| !f.is_empty()) && !self.models.is_empty()
    }

    pub fn model_by_id(&self, id: &str) -> Option<&ModelDescriptor> {
        self.models.iter().find(|m| m.id == id)
    }
}

/// Site configuration document as a Bevy asset. Fetched once at startup and
/// immutable for the lifetime of the AR page. The marketing sections of the
/// document are tolerated and ignored; only `ar` is read here.
#[derive(Asset, Debug, Clone, Default, Serialize, Deserialize, TypePath, Resource)]
pub struct SiteConfig {
    #[serde(default)]
    pub ar: ArConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "site": { "title": "ignored by the engine" },
        "ar": {
            "mindFile": "/targets/temple.mind",
            "models": [
                {
                    "id": "temple",
                    "name": "Temple",
                    "targetIndex": 0,
                    "path": "/models/temple.glb",
                    "scale": "1 1 1",
                    "position": "0 0 0",
                    "rotation": "0 0 0"
                },
                {
                    "id": "gate",
                    "targetIndex": 1,
                    "path": "/models/gate.glb"
                }
            ]
        }
    }"#;

    #[test]
    fn deserialises_ar_section_and_ignores_the_rest() {
        let config: SiteConfig = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(config.ar.mind_file.as_deref(), Some("/targets/temple.mind"));
        assert_eq!(config.ar.models.len(), 2);
        assert!(config.ar.has_content());
        assert_eq!(config.ar.model_by_id("temple").unwrap().target_index, 0);
        assert!(config.ar.model_by_id("missing").is_none());
    }

    #[test]
    fn omitted_transform_fields_take_scene_format_defaults() {
        let config: SiteConfig = serde_json::from_str(SAMPLE).unwrap();
        let gate = config.ar.model_by_id("gate").unwrap();
        assert_eq!(gate.scale, "1 1 1");
        assert_eq!(gate.position, "0 0 0");
        let params = gate.default_params();
        assert_eq!(params.scale, Vec3::ONE);
        assert_eq!(params.position, Vec3::ZERO);
    }

    #[test]
    fn missing_ar_section_means_no_content() {
        let config: SiteConfig = serde_json::from_str("{}").unwrap();
        assert!(!config.ar.has_content());
        assert!(config.ar.models.is_empty());
    }

    #[test]
    fn mind_file_without_models_is_still_no_content() {
        let config: SiteConfig =
            serde_json::from_str(r#"{"ar": {"mindFile": "/targets/x.mind", "models": []}}"#)
                .unwrap();
        assert!(!config.ar.has_content());
    }
}
