//! Scene markup emission.
//!
//! The AR runtime consumes a declarative DOM scene; this module is the only
//! place where structured transforms serialise back to the `"x y z"`
//! attribute encoding.

use crate::constants::IDLE_ROTATION_SECS;
use crate::engine::config::format_vec3;
use crate::engine::scene::compiler::{SceneDescription, SceneEntityDesc};

impl SceneDescription {
    /// Emit the full scene markup: the image-target descriptor binding, one
    /// preloaded asset item per model, a fixed camera and one entity per
    /// model bound to its target index.
    pub fn to_markup(&self) -> String {
        let assets = self
            .entities
            .iter()
            .map(|e| {
                format!(
                    r#"<a-asset-item id="model-{}" src="{}"></a-asset-item>"#,
                    e.model_id, e.path
                )
            })
            .collect::<Vec<_>>()
            .join("\n");

        let entities = self
            .entities
            .iter()
            .map(entity_markup)
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            r#"<a-scene mindar-image="imageTargetSrc: {mind}; autoStart: true; uiLoading: no; uiScanning: no; uiError: no;" color-space="sRGB" renderer="colorManagement: true; physicallyCorrectLights: true" vr-mode-ui="enabled: false" device-orientation-permission-ui="enabled: false" embedded>
<a-assets>
{assets}
</a-assets>
<a-camera position="0 0 0" look-controls="enabled: false"></a-camera>
{entities}
</a-scene>"#,
            mind = self.mind_file,
        )
    }
}

/// One target-bound model entity. The `data-model-id` attribute is the
/// lookup key for live parameter updates; the original index-based lookup
/// breaks down when several models share a target.
fn entity_markup(entity: &SceneEntityDesc) -> String {
    format!(
        r#"<a-entity mindar-image-target="targetIndex: {index}" data-target-index="{index}">
<a-gltf-model data-model-id="{id}" src="{path}" scale="{scale}" position="{position}" rotation="{rotation}" animation="{animation}"></a-gltf-model>
</a-entity>"#,
        index = entity.target_index,
        id = entity.model_id,
        path = entity.path,
        scale = format_vec3(entity.params.scale),
        position = format_vec3(entity.params.position),
        rotation = format_vec3(entity.params.rotation),
        animation = idle_rotation_attr(),
    )
}

/// Baseline idle spin: full turn, fixed duration, linear easing, infinite
/// loop, independent of user tuning.
fn idle_rotation_attr() -> String {
    format!(
        "property: rotation; to: 0 360 0; loop: true; dur: {}; easing: linear",
        (IDLE_ROTATION_SECS * 1000.0) as u32
    )
}
