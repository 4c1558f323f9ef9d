use bevy::prelude::*;

use crate::engine::config::{ArConfig, TransformParams};
use crate::tools::tuning::ModelParams;

/// One model bound to an image target in the compiled scene, carrying the
/// parameters that were current at compile time.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneEntityDesc {
    pub model_id: String,
    pub name: String,
    pub target_index: u32,
    pub path: String,
    pub params: TransformParams,
}

/// Declarative description of the scene handed to the AR runtime.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneDescription {
    pub mind_file: String,
    pub entities: Vec<SceneEntityDesc>,
}

impl SceneDescription {
    pub fn entity_by_id(&self, model_id: &str) -> Option<&SceneEntityDesc> {
        self.entities.iter().find(|e| e.model_id == model_id)
    }
}

/// Compile the configuration and the current parameter map into a scene
/// description. Returns `None` when there is nothing to build (no mind file
/// or no models) — a valid demo-mode condition, not an error.
///
/// Each model is bound to its declared target index with the current params
/// for its id, falling back to the model's own config defaults when no
/// override exists. A model whose index matches no trained target is still
/// emitted; the runtime simply never reports that index, so the model never
/// shows.
pub fn build_scene(config: &ArConfig, params: &ModelParams) -> Option<SceneDescription> {
    if !config.has_content() {
        return None;
    }
    let mind_file = config.mind_file.clone()?;

    let entities = config
        .models
        .iter()
        .map(|model| SceneEntityDesc {
            model_id: model.id.clone(),
            name: model.name.clone(),
            target_index: model.target_index,
            path: model.path.clone(),
            params: params
                .get(&model.id)
                .copied()
                .unwrap_or_else(|| model.default_params()),
        })
        .collect();

    Some(SceneDescription { mind_file, entities })
}

/// Handle to the currently mounted scene, if any. `None` means no scene has
/// been built yet (still loading, demo mode, or torn down after a fault).
#[derive(Resource, Default)]
pub struct MountedScene {
    pub description: Option<SceneDescription>,
}

impl MountedScene {
    pub fn is_mounted(&self) -> bool {
        self.description.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::{ModelDescriptor, SiteConfig};

    fn config_with_models(models: Vec<ModelDescriptor>) -> ArConfig {
        ArConfig {
            mind_file: Some("/targets/site.mind".to_string()),
            models,
        }
    }

    fn descriptor(id: &str, target_index: u32) -> ModelDescriptor {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "name": id,
            "targetIndex": target_index,
            "path": format!("/models/{id}.glb"),
            "scale": "1 1 1",
            "position": "0 0 0",
            "rotation": "0 0 0",
        }))
        .unwrap()
    }

    #[test]
    fn empty_models_compile_to_no_scene() {
        let params = ModelParams::default();
        assert!(build_scene(&config_with_models(vec![]), &params).is_none());
    }

    #[test]
    fn missing_mind_file_compiles_to_no_scene() {
        let config: SiteConfig = serde_json::from_str("{}").unwrap();
        let params = ModelParams::default();
        assert!(build_scene(&config.ar, &params).is_none());
    }

    #[test]
    fn current_params_win_over_config_defaults() {
        let config = config_with_models(vec![descriptor("temple", 0)]);
        let mut params = ModelParams::default();
        params.seed_from(&config);
        params.set_axis(
            "temple",
            crate::tools::tuning::ParamGroup::Position,
            1,
            2.5,
        );

        let scene = build_scene(&config, &params).unwrap();
        let entity = scene.entity_by_id("temple").unwrap();
        assert_eq!(entity.params.position, Vec3::new(0.0, 2.5, 0.0));
        assert_eq!(entity.params.scale, Vec3::ONE);
    }

    #[test]
    fn unseeded_models_fall_back_to_their_own_defaults() {
        let config = config_with_models(vec![descriptor("gate", 1)]);
        let scene = build_scene(&config, &ModelParams::default()).unwrap();
        assert_eq!(scene.entities[0].params, TransformParams::default());
    }

    #[test]
    fn unmatched_target_index_is_still_emitted() {
        // Target 9 is never trained into the descriptor; the model is bound
        // anyway and simply never shown.
        let config = config_with_models(vec![descriptor("ghost", 9)]);
        let scene = build_scene(&config, &ModelParams::default()).unwrap();
        assert_eq!(scene.entities[0].target_index, 9);
    }

    #[test]
    fn models_may_share_a_target() {
        let config = config_with_models(vec![descriptor("a", 0), descriptor("b", 0)]);
        let scene = build_scene(&config, &ModelParams::default()).unwrap();
        assert_eq!(scene.entities.len(), 2);
        assert!(scene.entities.iter().all(|e| e.target_index == 0));
    }
}
