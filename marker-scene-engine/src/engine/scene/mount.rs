//! Scene mounting, live parameter application and teardown.
//!
//! On web builds the compiled markup is handed to the DOM container and the
//! runtime's recognition events are bridged back through a shared queue. On
//! native builds one preview entity is spawned per model so the whole
//! pipeline runs headless.

use bevy::prelude::*;
use std::sync::{Arc, Mutex};

use crate::constants::IDLE_ROTATION_SECS;
use crate::engine::config::SiteConfig;
use crate::engine::core::app_state::{ArFault, RecognitionEvent};
use crate::engine::scene::compiler::{MountedScene, build_scene};
use crate::tools::tuning::{ModelParams, ParamsApplied};

/// Marker for a native preview entity mirroring one scene model.
#[derive(Component)]
pub struct ModelEntity {
    pub model_id: String,
}

/// Continuous baseline spin applied to every mounted model.
#[derive(Component)]
pub struct IdleRotation {
    pub secs_per_turn: f32,
}

/// Recognition signals pushed from browser event listeners, drained on the
/// schedule thread.
#[derive(Debug, Clone)]
pub enum RecognitionSignal {
    Found(u32),
    Lost(u32),
    EngineReady,
    EngineFault(String),
}

#[derive(Resource, Clone, Default)]
pub struct RecognitionQueue(pub Arc<Mutex<Vec<RecognitionSignal>>>);

impl RecognitionQueue {
    pub fn push(&self, signal: RecognitionSignal) {
        if let Ok(mut queue) = self.0.lock() {
            queue.push(signal);
        }
    }

    fn drain(&self) -> Vec<RecognitionSignal> {
        self.0
            .lock()
            .map(|mut queue| std::mem::take(&mut *queue))
            .unwrap_or_default()
    }
}

/// Build and mount the scene on entry to `Ready`. With no AR content the
/// scene stays unmounted and the session continues in demo mode: scanning
/// with nothing to find.
pub fn mount_scene(
    mut commands: Commands,
    config: Option<Res<SiteConfig>>,
    params: Res<ModelParams>,
    mut mounted: ResMut<MountedScene>,
    #[cfg(target_arch = "wasm32")] recognition_queue: Res<RecognitionQueue>,
) {
    if mounted.is_mounted() {
        return;
    }
    let Some(config) = config else {
        return;
    };

    match build_scene(&config.ar, &params) {
        Some(description) => {
            info!(
                "mounting scene: {} model(s) bound to {}",
                description.entities.len(),
                description.mind_file
            );

            #[cfg(target_arch = "wasm32")]
            {
                let markup = description.to_markup();
                dom::inject_scene(&markup, &recognition_queue);
            }

            #[cfg(not(target_arch = "wasm32"))]
            {
                for entity in &description.entities {
                    commands.spawn((
                        ModelEntity {
                            model_id: entity.model_id.clone(),
                        },
                        entity.params.to_transform(),
                        IdleRotation {
                            secs_per_turn: IDLE_ROTATION_SECS,
                        },
                    ));
                }
            }

            mounted.description = Some(description);
        }
        None => {
            let _ = &mut commands;
            info!("no AR content configured, continuing in demo mode");
        }
    }
}

/// Drain browser recognition signals into engine events.
pub fn drain_recognition_signals(
    queue: Res<RecognitionQueue>,
    mut recognition: EventWriter<RecognitionEvent>,
    mut faults: EventWriter<ArFault>,
) {
    for signal in queue.drain() {
        match signal {
            RecognitionSignal::Found(index) => {
                recognition.write(RecognitionEvent::TargetFound { index });
            }
            RecognitionSignal::Lost(index) => {
                recognition.write(RecognitionEvent::TargetLost { index });
            }
            RecognitionSignal::EngineReady => {
                recognition.write(RecognitionEvent::EngineReady);
            }
            RecognitionSignal::EngineFault(reason) => {
                faults.write(ArFault { reason });
            }
        }
    }
}

/// Re-apply the live transform of updated models in place, without touching
/// the recognition pipeline. A no-op before the scene exists.
pub fn apply_param_updates(
    mut events: EventReader<ParamsApplied>,
    mounted: Res<MountedScene>,
    params: Res<ModelParams>,
    mut preview: Query<(&ModelEntity, &mut Transform)>,
) {
    for event in events.read() {
        if !mounted.is_mounted() {
            continue;
        }
        let Some(current) = params.get(&event.model_id) else {
            continue;
        };

        #[cfg(target_arch = "wasm32")]
        dom::update_entity_attributes(&event.model_id, current);

        for (model, mut transform) in &mut preview {
            if model.model_id == event.model_id {
                *transform = current.to_transform();
            }
        }
    }
}

/// Baseline presentation effect, independent of user tuning.
pub fn idle_rotation_system(
    time: Res<Time>,
    mut models: Query<(&IdleRotation, &mut Transform)>,
) {
    for (rotation, mut transform) in &mut models {
        let step = std::f32::consts::TAU * time.delta_secs() / rotation.secs_per_turn;
        transform.rotate_y(step);
    }
}

/// Tear the scene down on entry to `Error` so no partially constructed scene
/// stays visible behind the error overlay.
pub fn teardown_scene(
    mut commands: Commands,
    mut mounted: ResMut<MountedScene>,
    preview: Query<Entity, With<ModelEntity>>,
) {
    if mounted.is_mounted() {
        info!("tearing down mounted scene after fault");
    }
    mounted.description = None;

    for entity in &preview {
        commands.entity(entity).despawn();
    }

    #[cfg(target_arch = "wasm32")]
    dom::clear_container();
}

#[cfg(target_arch = "wasm32")]
mod dom {
    use super::{RecognitionQueue, RecognitionSignal};
    use crate::constants::AR_CONTAINER_ID;
    use crate::engine::config::{TransformParams, format_vec3};
    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;

    fn container() -> Option<web_sys::Element> {
        web_sys::window()?
            .document()?
            .get_element_by_id(AR_CONTAINER_ID)
    }

    /// Hand the compiled markup to the container and wire the runtime's
    /// recognition events back into the shared queue.
    pub fn inject_scene(markup: &str, queue: &RecognitionQueue) {
        let Some(container) = container() else {
            queue.push(RecognitionSignal::EngineFault(format!(
                "AR container #{AR_CONTAINER_ID} not found"
            )));
            return;
        };
        container.set_inner_html(markup);

        if let Some(scene) = container.query_selector("a-scene").ok().flatten() {
            listen(&scene, "arReady", queue.clone(), |_| RecognitionSignal::EngineReady);
            listen(&scene, "arError", queue.clone(), |_| {
                RecognitionSignal::EngineFault("AR engine reported an error".to_string())
            });
        }

        let Ok(targets) = container.query_selector_all("[data-target-index]") else {
            return;
        };
        for i in 0..targets.length() {
            let Some(node) = targets.item(i) else { continue };
            let Ok(element) = node.dyn_into::<web_sys::Element>() else {
                continue;
            };
            let index = element
                .get_attribute("data-target-index")
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(0);
            listen(&element, "targetFound", queue.clone(), move |_| {
                RecognitionSignal::Found(index)
            });
            listen(&element, "targetLost", queue.clone(), move |_| {
                RecognitionSignal::Lost(index)
            });
        }
    }

    fn listen<F>(target: &web_sys::Element, event: &str, queue: RecognitionQueue, make: F)
    where
        F: Fn(web_sys::Event) -> RecognitionSignal + 'static,
    {
        let closure = Closure::wrap(Box::new(move |ev: web_sys::Event| {
            queue.push(make(ev));
        }) as Box<dyn FnMut(web_sys::Event)>);
        let _ = target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
        closure.forget();
    }

    /// In-place transform update on the mounted model element.
    pub fn update_entity_attributes(model_id: &str, params: &TransformParams) {
        let Some(container) = container() else { return };
        let selector = format!(r#"[data-model-id="{model_id}"]"#);
        if let Some(element) = container.query_selector(&selector).ok().flatten() {
            let _ = element.set_attribute("scale", &format_vec3(params.scale));
            let _ = element.set_attribute("position", &format_vec3(params.position));
            let _ = element.set_attribute("rotation", &format_vec3(params.rotation));
        }
    }

    pub fn clear_container() {
        if let Some(container) = container() {
            container.set_inner_html("");
        }
    }
}
