use bevy::prelude::*;

use crate::constants::{
    PROGRESS_ALL_SCRIPTS, PROGRESS_COMPLETE, PROGRESS_FIRST_SCRIPT, PROGRESS_START,
};
use crate::engine::loading::script_loader::{RuntimeScripts, SettleGate};
use crate::rpc::web_rpc::WebRpcInterface;

#[derive(Resource, Default)]
pub struct LoadingProgress {
    /// Config asset resolved and `ModelParams` seeded from its defaults.
    pub config_resolved: bool,
    /// Staged percentage shown on the loading overlay.
    pub percent: u8,
    pub script_states: Vec<(String, i32)>,
}

/// Recompute the staged loading percentage from script and settle state.
pub fn update_loading_progress(
    scripts: Res<RuntimeScripts>,
    gate: Res<SettleGate>,
    mut progress: ResMut<LoadingProgress>,
) {
    progress.script_states = scripts.states_for_frontend();
    progress.percent = match scripts.loaded_count() {
        0 => PROGRESS_START,
        1 => PROGRESS_FIRST_SCRIPT,
        _ if !gate.open() => PROGRESS_ALL_SCRIPTS,
        _ => PROGRESS_COMPLETE,
    };
}

/// Push loading progress to the frontend whenever it changes.
pub fn update_loading_frontend(
    progress: Res<LoadingProgress>,
    mut rpc_interface: ResMut<WebRpcInterface>,
    mut last_sent: Local<Option<u8>>,
) {
    if *last_sent == Some(progress.percent) {
        return;
    }
    *last_sent = Some(progress.percent);

    rpc_interface.send_notification(
        "loading_progress",
        serde_json::json!({
            "percent": progress.percent,
            "scripts": progress.script_states,
        }),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{AFRAME_SCRIPT_URL, MINDAR_SCRIPT_URL};
    use std::time::Duration;

    fn percent_for(scripts: &RuntimeScripts, gate: &SettleGate) -> u8 {
        match scripts.loaded_count() {
            0 => PROGRESS_START,
            1 => PROGRESS_FIRST_SCRIPT,
            _ if !gate.open() => PROGRESS_ALL_SCRIPTS,
            _ => PROGRESS_COMPLETE,
        }
    }

    #[test]
    fn percentage_follows_the_load_stages() {
        let mut scripts = RuntimeScripts::default();
        let mut gate = SettleGate::default();
        assert_eq!(percent_for(&scripts, &gate), PROGRESS_START);

        scripts.mark_loaded(AFRAME_SCRIPT_URL);
        assert_eq!(percent_for(&scripts, &gate), PROGRESS_FIRST_SCRIPT);

        scripts.mark_loaded(MINDAR_SCRIPT_URL);
        assert_eq!(percent_for(&scripts, &gate), PROGRESS_ALL_SCRIPTS);

        gate.advance(Duration::from_secs(1));
        assert_eq!(percent_for(&scripts, &gate), PROGRESS_COMPLETE);
    }
}
