//! Live parameter tuning channel.
//!
//! Operator-only tooling: adjust per-model transforms while the scene is
//! running, then export the result as a JSON snippet to paste back into
//! `config.json`. There is no programmatic write-back path.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::engine::config::{ArConfig, TransformParams, format_vec3, parse_vec3};

/// Transform group being edited. Each group is edited per axis; editing one
/// axis never perturbs the other two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamGroup {
    Scale,
    Position,
    Rotation,
}

impl ParamGroup {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "scale" => Some(Self::Scale),
            "position" => Some(Self::Position),
            "rotation" => Some(Self::Rotation),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scale => "scale",
            Self::Position => "position",
            Self::Rotation => "rotation",
        }
    }
}

/// Per-model transform overrides. Seeded from config defaults when the
/// configuration resolves; every declared model id has an entry from then
/// on. Mutated only through the tuning channel.
#[derive(Resource, Default, Debug, Clone, PartialEq)]
pub struct ModelParams {
    entries: HashMap<String, TransformParams>,
}

impl ModelParams {
    /// Seed one entry per declared model from its config defaults. Existing
    /// overrides for still-declared ids are preserved.
    pub fn seed_from(&mut self, config: &ArConfig) {
        for model in &config.models {
            self.entries
                .entry(model.id.clone())
                .or_insert_with(|| model.default_params());
        }
    }

    pub fn get(&self, model_id: &str) -> Option<&TransformParams> {
        self.entries.get(model_id)
    }

    pub fn contains(&self, model_id: &str) -> bool {
        self.entries.contains_key(model_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replace one axis of one transform group. Returns false (a silent
    /// no-op) for an unknown model id or axis: malformed input here means a
    /// tooling bug, not a user-facing failure. Values outside the advisory
    /// UI ranges are accepted as-is.
    pub fn set_axis(&mut self, model_id: &str, group: ParamGroup, axis: usize, value: f32) -> bool {
        if axis > 2 {
            return false;
        }
        let Some(params) = self.entries.get_mut(model_id) else {
            return false;
        };
        let vector = match group {
            ParamGroup::Scale => &mut params.scale,
            ParamGroup::Position => &mut params.position,
            ParamGroup::Rotation => &mut params.rotation,
        };
        vector[axis] = value;
        true
    }

    /// Replace a whole transform group vector. Last write wins.
    pub fn set_vector(&mut self, model_id: &str, group: ParamGroup, value: Vec3) -> bool {
        let Some(params) = self.entries.get_mut(model_id) else {
            return false;
        };
        match group {
            ParamGroup::Scale => params.scale = value,
            ParamGroup::Position => params.position = value,
            ParamGroup::Rotation => params.rotation = value,
        }
        true
    }

    /// Serialise one model's current transforms in exactly the
    /// `ar.models[]` shape, for manual copy-back into the configuration.
    /// Read-only; persistence itself is a human operation.
    pub fn export_json(&self, model_id: &str) -> Option<String> {
        let params = self.entries.get(model_id)?;
        let snippet = ExportSnippet {
            id: model_id.to_string(),
            scale: format_vec3(params.scale),
            position: format_vec3(params.position),
            rotation: format_vec3(params.rotation),
        };
        serde_json::to_string_pretty(&snippet).ok()
    }
}

/// Exported tuning snippet, matching the `ar.models[]` entry shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportSnippet {
    pub id: String,
    pub scale: String,
    pub position: String,
    pub rotation: String,
}

impl ExportSnippet {
    pub fn to_params(&self) -> TransformParams {
        TransformParams {
            scale: parse_vec3(&self.scale),
            position: parse_vec3(&self.position),
            rotation: parse_vec3(&self.rotation),
        }
    }
}

/// Whether the tuning channel is active for this session. Read once at
/// startup from the `debug=true` query parameter (web) or the `AR_DEBUG`
/// environment variable (native). When inactive the channel is entirely
/// inert: no panel, no listeners.
#[derive(Resource, Default, Clone, Copy)]
pub struct DebugMode(pub bool);

pub fn detect_debug_mode() -> bool {
    #[cfg(target_arch = "wasm32")]
    {
        web_sys::window()
            .and_then(|w| w.location().search().ok())
            .is_some_and(|search| search.contains("debug=true"))
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        std::env::var("AR_DEBUG").is_ok_and(|v| v == "1" || v == "true")
    }
}

/// Requested change to one model's transforms.
#[derive(Event, Debug, Clone)]
pub struct ParamChangeEvent {
    pub model_id: String,
    pub group: ParamGroup,
    pub change: ParamChange,
}

#[derive(Debug, Clone, Copy)]
pub enum ParamChange {
    Axis { axis: usize, value: f32 },
    Vector(Vec3),
}

/// Confirmation that a model's params changed and the live scene must be
/// updated.
#[derive(Event, Debug, Clone)]
pub struct ParamsApplied {
    pub model_id: String,
}

/// Fold requested changes into the parameter map and schedule the in-place
/// scene update. Unknown model ids are dropped silently.
pub fn apply_param_changes(
    mut events: EventReader<ParamChangeEvent>,
    mut params: ResMut<ModelParams>,
    mut applied: EventWriter<ParamsApplied>,
) {
    for event in events.read() {
        let changed = match event.change {
            ParamChange::Axis { axis, value } => {
                params.set_axis(&event.model_id, event.group, axis, value)
            }
            ParamChange::Vector(value) => params.set_vector(&event.model_id, event.group, value),
        };

        if changed {
            applied.write(ParamsApplied {
                model_id: event.model_id.clone(),
            });
        } else {
            debug!(
                "ignoring tuning input for unknown model '{}'",
                event.model_id
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::ModelDescriptor;

    fn temple_config() -> ArConfig {
        let temple: ModelDescriptor = serde_json::from_value(serde_json::json!({
            "id": "temple",
            "name": "Temple",
            "targetIndex": 0,
            "path": "/models/temple.glb",
            "scale": "1 1 1",
            "position": "0 0 0",
            "rotation": "0 0 0",
        }))
        .unwrap();
        ArConfig {
            mind_file: Some("/targets/temple.mind".to_string()),
            models: vec![temple],
        }
    }

    #[test]
    fn seeding_copies_config_defaults_exactly() {
        let mut params = ModelParams::default();
        params.seed_from(&temple_config());
        assert_eq!(params.len(), 1);
        let temple = params.get("temple").unwrap();
        assert_eq!(temple.scale, Vec3::ONE);
        assert_eq!(temple.position, Vec3::ZERO);
        assert_eq!(temple.rotation, Vec3::ZERO);
    }

    #[test]
    fn reseeding_preserves_live_overrides() {
        let config = temple_config();
        let mut params = ModelParams::default();
        params.seed_from(&config);
        params.set_axis("temple", ParamGroup::Scale, 0, 3.0);
        params.seed_from(&config);
        assert_eq!(params.get("temple").unwrap().scale.x, 3.0);
    }

    #[test]
    fn axis_edit_leaves_other_axes_and_groups_untouched() {
        let mut params = ModelParams::default();
        params.seed_from(&temple_config());

        assert!(params.set_axis("temple", ParamGroup::Position, 1, 2.5));
        let temple = params.get("temple").unwrap();
        assert_eq!(temple.position, Vec3::new(0.0, 2.5, 0.0));
        assert_eq!(temple.scale, Vec3::ONE);
        assert_eq!(temple.rotation, Vec3::ZERO);
        assert_eq!(format_vec3(temple.position), "0 2.5 0");
    }

    #[test]
    fn set_axis_is_idempotent() {
        let mut params = ModelParams::default();
        params.seed_from(&temple_config());

        params.set_axis("temple", ParamGroup::Rotation, 2, 90.0);
        let once = params.clone();
        params.set_axis("temple", ParamGroup::Rotation, 2, 90.0);
        assert_eq!(params, once);
    }

    #[test]
    fn unknown_model_and_bad_axis_are_no_ops() {
        let mut params = ModelParams::default();
        params.seed_from(&temple_config());
        let before = params.clone();

        assert!(!params.set_axis("phantom", ParamGroup::Scale, 0, 2.0));
        assert!(!params.set_axis("temple", ParamGroup::Scale, 3, 2.0));
        assert!(!params.set_vector("phantom", ParamGroup::Position, Vec3::ONE));
        assert_eq!(params, before);
    }

    #[test]
    fn out_of_range_values_are_accepted_as_is() {
        // Slider bounds are advisory; a non-UI caller may exceed them.
        let mut params = ModelParams::default();
        params.seed_from(&temple_config());
        assert!(params.set_axis("temple", ParamGroup::Scale, 0, 40.0));
        assert_eq!(params.get("temple").unwrap().scale.x, 40.0);
    }

    #[test]
    fn export_round_trips_to_the_live_params() {
        let mut params = ModelParams::default();
        params.seed_from(&temple_config());
        params.set_axis("temple", ParamGroup::Position, 1, 2.5);
        params.set_axis("temple", ParamGroup::Rotation, 1, 180.0);

        let json = params.export_json("temple").unwrap();
        let snippet: ExportSnippet = serde_json::from_str(&json).unwrap();
        assert_eq!(snippet.id, "temple");
        assert_eq!(snippet.position, "0 2.5 0");
        assert_eq!(&snippet.to_params(), params.get("temple").unwrap());
    }

    #[test]
    fn export_of_unknown_model_is_none() {
        let params = ModelParams::default();
        assert!(params.export_json("phantom").is_none());
    }
}
