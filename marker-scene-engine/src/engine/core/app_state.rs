use bevy::prelude::*;
use std::collections::HashSet;

use crate::engine::loading::progress::LoadingProgress;
use crate::engine::loading::script_loader::{RuntimeScripts, SettleGate};
use crate::rpc::web_rpc::WebRpcInterface;

/// Whole-scene recognition state. Exactly one value is active at a time;
/// which individual targets are held is tracked separately in
/// [`TargetTracking`].
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, States)]
pub enum RecognitionStatus {
    /// Runtime scripts and configuration still arriving.
    #[default]
    Loading,
    /// Everything landed; the scene is mounted during this transient state.
    Ready,
    /// Camera feed active, nothing currently recognised. Also the resting
    /// state after a previously found target is lost.
    Scanning,
    /// At least one bound target is currently recognised.
    Found,
    /// Terminal for the session. The only recovery path is a full reload.
    Error,
}

impl RecognitionStatus {
    /// Identifier used in frontend notifications.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::Scanning => "scanning",
            Self::Found => "found",
            Self::Error => "error",
        }
    }
}

/// Recognition signals emitted by the underlying AR runtime. Payloads beyond
/// the target index are opaque to this engine.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecognitionEvent {
    TargetFound { index: u32 },
    TargetLost { index: u32 },
    EngineReady,
}

/// Unrecoverable fault: a runtime script failed to load or the engine died
/// after loading (camera permission, internal crash). Root causes are not
/// distinguished; every fault ends the session the same way.
#[derive(Event, Debug, Clone)]
pub struct ArFault {
    pub reason: String,
}

/// Set of image-target indices currently recognised. The aggregate status is
/// the logical OR across this set; the per-target view is an additive
/// capability for richer UIs.
#[derive(Resource, Default, Debug)]
pub struct TargetTracking {
    found: HashSet<u32>,
}

impl TargetTracking {
    pub fn note_found(&mut self, index: u32) {
        self.found.insert(index);
    }

    pub fn note_lost(&mut self, index: u32) {
        self.found.remove(&index);
    }

    pub fn any_found(&self) -> bool {
        !self.found.is_empty()
    }

    pub fn is_found(&self, index: u32) -> bool {
        self.found.contains(&index)
    }

    pub fn clear(&mut self) {
        self.found.clear();
    }
}

/// Re-entrant guard: initialisation effects may fire more than once per
/// mount, but the loading pipeline must start at most once.
#[derive(Resource, Default)]
pub struct SceneInitGuard {
    pub started: bool,
}

/// Leave `Loading` once the configuration is resolved, every runtime script
/// has landed and the settle gate is open.
pub fn transition_to_ready(
    progress: Res<LoadingProgress>,
    scripts: Res<RuntimeScripts>,
    gate: Res<SettleGate>,
    mut next_state: ResMut<NextState<RecognitionStatus>>,
) {
    if progress.config_resolved && scripts.all_loaded() && gate.open() {
        println!("→ AR runtime settled, transitioning to Ready");
        next_state.set(RecognitionStatus::Ready);
    }
}

/// `Ready` is transient: the scene is mounted on entry (or skipped in demo
/// mode) and scanning begins on the next transition.
pub fn transition_to_scanning(mut next_state: ResMut<NextState<RecognitionStatus>>) {
    next_state.set(RecognitionStatus::Scanning);
}

/// Fold target found/lost signals into the tracking set and derive the
/// aggregate state. A stray lost signal with nothing held is a harmless
/// no-op. These transitions touch presentation state only; the parameter map
/// and the mounted scene are never rebuilt here.
pub fn track_recognition_events(
    mut events: EventReader<RecognitionEvent>,
    mut tracking: ResMut<TargetTracking>,
    state: Res<State<RecognitionStatus>>,
    mut next_state: ResMut<NextState<RecognitionStatus>>,
) {
    for event in events.read() {
        match event {
            RecognitionEvent::TargetFound { index } => {
                info!("target {} found", index);
                tracking.note_found(*index);
            }
            RecognitionEvent::TargetLost { index } => {
                info!("target {} lost", index);
                tracking.note_lost(*index);
            }
            RecognitionEvent::EngineReady => {}
        }
    }

    let desired = if tracking.any_found() {
        RecognitionStatus::Found
    } else {
        RecognitionStatus::Scanning
    };
    if *state.get() != desired {
        next_state.set(desired);
    }
}

/// Faults reach the terminal `Error` state from anywhere. There is no soft
/// retry: partially loaded third-party runtimes cannot be assumed safe to
/// reinitialise in place, so the affordance offered is a full page reload.
pub fn handle_faults(
    mut events: EventReader<ArFault>,
    state: Res<State<RecognitionStatus>>,
    mut next_state: ResMut<NextState<RecognitionStatus>>,
) {
    let mut faulted = false;
    for fault in events.read() {
        error!("AR session fault: {}", fault.reason);
        faulted = true;
    }
    if faulted && *state.get() != RecognitionStatus::Error {
        next_state.set(RecognitionStatus::Error);
    }
}

/// Notify the frontend on every aggregate state change.
pub fn notify_status_changes(
    state: Res<State<RecognitionStatus>>,
    mut rpc_interface: ResMut<WebRpcInterface>,
    mut last: Local<Option<RecognitionStatus>>,
) {
    let current = *state.get();
    if *last == Some(current) {
        return;
    }
    *last = Some(current);

    rpc_interface.send_notification(
        "status_changed",
        serde_json::json!({ "status": current.as_str() }),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracking_aggregates_across_targets() {
        let mut tracking = TargetTracking::default();
        assert!(!tracking.any_found());

        tracking.note_found(0);
        tracking.note_found(2);
        assert!(tracking.any_found());
        assert!(tracking.is_found(2));

        tracking.note_lost(0);
        assert!(tracking.any_found());
        tracking.note_lost(2);
        assert!(!tracking.any_found());
    }

    #[test]
    fn stray_lost_is_a_no_op() {
        let mut tracking = TargetTracking::default();
        tracking.note_lost(7);
        assert!(!tracking.any_found());
    }
}
