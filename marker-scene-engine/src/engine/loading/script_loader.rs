//! Runtime script loader.
//!
//! The AR engine lives in two third-party scripts that attach themselves to
//! global state, so each must be loaded exactly once per page lifetime no
//! matter how many times loading is requested. Completion callbacks land on
//! a shared queue that a Bevy system drains on the next frame, keeping all
//! state mutation on the schedule thread.

use bevy::prelude::*;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::constants::{
    AFRAME_GLOBAL, AFRAME_SCRIPT_URL, MINDAR_GLOBAL, MINDAR_SCRIPT_URL, SETTLE_DELAY_SECS,
};
use crate::engine::core::app_state::{ArFault, RecognitionEvent};

/// Lifecycle of one required script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptLoadState {
    /// Not yet requested.
    Pending,
    /// A loader element is in flight; further requests must not inject again.
    Injected,
    Loaded,
    Failed,
}

#[derive(Debug, Clone)]
pub struct RuntimeScript {
    pub url: String,
    /// Global object the script installs, probed to detect a prior load.
    pub global_name: String,
    pub state: ScriptLoadState,
}

/// Tracks the required runtime scripts and enforces at-most-one injection
/// per URL.
#[derive(Resource, Debug, Clone)]
pub struct RuntimeScripts {
    pub scripts: Vec<RuntimeScript>,
}

impl Default for RuntimeScripts {
    fn default() -> Self {
        Self {
            scripts: vec![
                RuntimeScript {
                    url: AFRAME_SCRIPT_URL.to_string(),
                    global_name: AFRAME_GLOBAL.to_string(),
                    state: ScriptLoadState::Pending,
                },
                RuntimeScript {
                    url: MINDAR_SCRIPT_URL.to_string(),
                    global_name: MINDAR_GLOBAL.to_string(),
                    state: ScriptLoadState::Pending,
                },
            ],
        }
    }
}

impl RuntimeScripts {
    /// Request a script load. Returns true when the caller must inject a
    /// loader element; any concurrent or repeated request for the same URL
    /// returns false and simply shares the outcome of the first.
    pub fn ensure(&mut self, url: &str) -> bool {
        match self.scripts.iter_mut().find(|s| s.url == url) {
            Some(script) if script.state == ScriptLoadState::Pending => {
                script.state = ScriptLoadState::Injected;
                true
            }
            _ => false,
        }
    }

    /// Record a script already present on the page (global object or an
    /// existing script tag), skipping injection entirely.
    pub fn mark_present(&mut self, url: &str) {
        self.set_state(url, ScriptLoadState::Loaded);
    }

    pub fn mark_loaded(&mut self, url: &str) {
        self.set_state(url, ScriptLoadState::Loaded);
    }

    pub fn mark_failed(&mut self, url: &str) {
        self.set_state(url, ScriptLoadState::Failed);
    }

    fn set_state(&mut self, url: &str, state: ScriptLoadState) {
        if let Some(script) = self.scripts.iter_mut().find(|s| s.url == url) {
            script.state = state;
        }
    }

    pub fn all_loaded(&self) -> bool {
        self.scripts
            .iter()
            .all(|s| s.state == ScriptLoadState::Loaded)
    }

    pub fn loaded_count(&self) -> usize {
        self.scripts
            .iter()
            .filter(|s| s.state == ScriptLoadState::Loaded)
            .count()
    }

    /// Per-script readiness for the loading overlay and the frontend.
    pub fn states_for_frontend(&self) -> Vec<(String, i32)> {
        self.scripts
            .iter()
            .map(|s| {
                (
                    s.global_name.clone(),
                    i32::from(s.state == ScriptLoadState::Loaded),
                )
            })
            .collect()
    }
}

/// Outcome of one script load, pushed from the browser callback.
#[derive(Debug, Clone)]
pub struct ScriptOutcome {
    pub url: String,
    pub ok: bool,
}

/// Shared queue bridging script onload/onerror callbacks into the schedule.
#[derive(Resource, Clone, Default)]
pub struct ScriptOutcomeQueue(pub Arc<Mutex<Vec<ScriptOutcome>>>);

impl ScriptOutcomeQueue {
    pub fn push(&self, outcome: ScriptOutcome) {
        if let Ok(mut queue) = self.0.lock() {
            queue.push(outcome);
        }
    }

    fn drain(&self) -> Vec<ScriptOutcome> {
        self.0
            .lock()
            .map(|mut queue| std::mem::take(&mut *queue))
            .unwrap_or_default()
    }
}

/// Gate between "scripts landed" and "engine usable". The engine-emitted
/// ready signal opens it immediately; the settle timer is the backstop for
/// runtimes that never emit one.
#[derive(Resource)]
pub struct SettleGate {
    pub timer: Timer,
    engine_ready: bool,
}

impl Default for SettleGate {
    fn default() -> Self {
        Self {
            timer: Timer::from_seconds(SETTLE_DELAY_SECS, TimerMode::Once),
            engine_ready: false,
        }
    }
}

impl SettleGate {
    pub fn open(&self) -> bool {
        self.engine_ready || self.timer.finished()
    }

    pub fn note_engine_ready(&mut self) {
        self.engine_ready = true;
    }

    /// Advance the backstop timer directly. Used by tests.
    pub fn advance(&mut self, delta: Duration) {
        self.timer.tick(delta);
    }
}

/// Kick off the runtime script loads. Guarded to run at most once per mount
/// even when the triggering effect fires repeatedly. On web builds this
/// probes the page for prior loads and injects loader elements; natively
/// there is no browser to load into, so the scripts resolve immediately and
/// the rest of the machine runs in simulation.
pub fn start_script_loading(
    mut guard: ResMut<crate::engine::core::app_state::SceneInitGuard>,
    mut scripts: ResMut<RuntimeScripts>,
    queue: Res<ScriptOutcomeQueue>,
) {
    if guard.started {
        return;
    }
    guard.started = true;

    #[cfg(target_arch = "wasm32")]
    {
        web::request_all(&mut scripts, &queue);
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = &queue;
        for url in scripts
            .scripts
            .iter()
            .map(|s| s.url.clone())
            .collect::<Vec<_>>()
        {
            scripts.mark_loaded(&url);
        }
        println!("✓ Runtime scripts simulated (native build)");
    }
}

/// Drain completed script loads into tracker state. A failed load is a
/// terminal fault for the session; the remedy is a full page reload.
pub fn drain_script_outcomes(
    queue: Res<ScriptOutcomeQueue>,
    mut scripts: ResMut<RuntimeScripts>,
    mut faults: EventWriter<ArFault>,
) {
    for outcome in queue.drain() {
        if outcome.ok {
            println!("✓ Runtime script loaded: {}", outcome.url);
            scripts.mark_loaded(&outcome.url);
        } else {
            scripts.mark_failed(&outcome.url);
            faults.write(ArFault {
                reason: format!("failed to load runtime script: {}", outcome.url),
            });
        }
    }
}

/// Tick the settle gate once every script has landed, and honour an engine
/// ready signal arriving early.
pub fn tick_settle_gate(
    time: Res<Time>,
    scripts: Res<RuntimeScripts>,
    mut gate: ResMut<SettleGate>,
    mut events: EventReader<RecognitionEvent>,
) {
    for event in events.read() {
        if matches!(event, RecognitionEvent::EngineReady) {
            gate.note_engine_ready();
        }
    }

    if scripts.all_loaded() {
        gate.timer.tick(time.delta());
    }
}

#[cfg(target_arch = "wasm32")]
mod web {
    use super::{RuntimeScripts, ScriptOutcome, ScriptOutcomeQueue};
    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;

    /// Probe and inject every pending script. Presence of the global object
    /// or an existing tag for the same URL counts as loaded without a new
    /// injection.
    pub fn request_all(scripts: &mut RuntimeScripts, queue: &ScriptOutcomeQueue) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            return;
        };

        let requested: Vec<(String, String)> = scripts
            .scripts
            .iter()
            .map(|s| (s.url.clone(), s.global_name.clone()))
            .collect();

        for (url, global_name) in requested {
            let global_present =
                js_sys::Reflect::has(&window, &JsValue::from_str(&global_name)).unwrap_or(false);
            let tag_present = document
                .query_selector(&format!("script[src=\"{url}\"]"))
                .ok()
                .flatten()
                .is_some();

            if global_present || tag_present {
                scripts.mark_present(&url);
                continue;
            }

            if scripts.ensure(&url) {
                inject_script(&document, &url, queue);
            }
        }
    }

    fn inject_script(document: &web_sys::Document, url: &str, queue: &ScriptOutcomeQueue) {
        let Ok(element) = document.create_element("script") else {
            queue.push(ScriptOutcome {
                url: url.to_string(),
                ok: false,
            });
            return;
        };
        let Ok(script) = element.dyn_into::<web_sys::HtmlScriptElement>() else {
            return;
        };
        script.set_src(url);

        let load_queue = queue.clone();
        let load_url = url.to_string();
        let onload = Closure::wrap(Box::new(move || {
            load_queue.push(ScriptOutcome {
                url: load_url.clone(),
                ok: true,
            });
        }) as Box<dyn FnMut()>);
        script.set_onload(Some(onload.as_ref().unchecked_ref()));
        onload.forget();

        let error_queue = queue.clone();
        let error_url = url.to_string();
        let onerror = Closure::wrap(Box::new(move || {
            error_queue.push(ScriptOutcome {
                url: error_url.clone(),
                ok: false,
            });
        }) as Box<dyn FnMut()>);
        script.set_onerror(Some(onerror.as_ref().unchecked_ref()));
        onerror.forget();

        if let Some(head) = document.head() {
            let _ = head.append_child(&script);
        }
    }
}
