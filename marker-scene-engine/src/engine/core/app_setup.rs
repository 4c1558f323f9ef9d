use bevy::asset::AssetMetaCheck;
use bevy::prelude::*;
use bevy_common_assets::json::JsonAssetPlugin;

use crate::engine::config::SiteConfig;
use crate::engine::core::app_state::{
    ArFault, RecognitionEvent, RecognitionStatus, SceneInitGuard, TargetTracking, handle_faults,
    notify_status_changes, track_recognition_events, transition_to_ready, transition_to_scanning,
};
use crate::engine::core::window_config::create_window_config;
use crate::engine::loading::config_loader::{
    ConfigLoader, poll_config_asset, resolve_config_resource, start_config_loading,
};
use crate::engine::loading::progress::{
    LoadingProgress, update_loading_frontend, update_loading_progress,
};
use crate::engine::loading::script_loader::{
    RuntimeScripts, ScriptOutcomeQueue, SettleGate, drain_script_outcomes, start_script_loading,
    tick_settle_gate,
};
use crate::engine::scene::compiler::MountedScene;
use crate::engine::scene::mount::{
    RecognitionQueue, apply_param_updates, drain_recognition_signals, idle_rotation_system,
    mount_scene, teardown_scene,
};
use crate::engine::systems::status_overlay::{reflect_status_overlay, spawn_status_overlay};
use crate::rpc::web_rpc::WebRpcPlugin;
use crate::tools::simulate::simulate_recognition_keyboard;
use crate::tools::tuning::{
    DebugMode, ModelParams, ParamChangeEvent, ParamsApplied, apply_param_changes,
    detect_debug_mode,
};

#[cfg(not(target_arch = "wasm32"))]
use crate::tools::debug_panel::{
    TuningPanelState, reflect_tuning_panel, spawn_tuning_panel, tuning_panel_keyboard,
};

/// Wire the recognition core: state machine, loader, compiler and tuning
/// channel. Contains everything that runs headless; `create_app` layers the
/// windowed presentation and asset fetch on top. Callers must have the
/// states plugin installed.
pub fn register_core(app: &mut App) {
    app.init_state::<RecognitionStatus>()
        .add_plugins(WebRpcPlugin)
        .init_resource::<RuntimeScripts>()
        .init_resource::<ScriptOutcomeQueue>()
        .init_resource::<SettleGate>()
        .init_resource::<LoadingProgress>()
        .init_resource::<TargetTracking>()
        .init_resource::<SceneInitGuard>()
        .init_resource::<MountedScene>()
        .init_resource::<ModelParams>()
        .init_resource::<RecognitionQueue>()
        .init_resource::<DebugMode>()
        .add_event::<RecognitionEvent>()
        .add_event::<ArFault>()
        .add_event::<ParamChangeEvent>()
        .add_event::<ParamsApplied>();

    // Loading phase: start exactly once, drain script outcomes, settle,
    // then leave for Ready.
    app.add_systems(
        Update,
        (
            start_script_loading,
            resolve_config_resource,
            drain_recognition_signals,
            drain_script_outcomes,
            tick_settle_gate,
            update_loading_progress,
            update_loading_frontend,
            transition_to_ready,
        )
            .chain()
            .run_if(in_state(RecognitionStatus::Loading)),
    );

    // Ready is transient: the scene mounts on entry, scanning starts next.
    app.add_systems(OnEnter(RecognitionStatus::Ready), mount_scene)
        .add_systems(
            Update,
            transition_to_scanning.run_if(in_state(RecognitionStatus::Ready)),
        );

    // Recognition phase.
    app.add_systems(
        Update,
        (drain_recognition_signals, track_recognition_events)
            .chain()
            .run_if(
                in_state(RecognitionStatus::Scanning).or(in_state(RecognitionStatus::Found)),
            ),
    );

    // Cross-state systems: faults end the session from anywhere; tuning
    // edits flow into the parameter map and then into the mounted scene.
    app.add_systems(
        Update,
        (
            handle_faults,
            (apply_param_changes, apply_param_updates).chain(),
            idle_rotation_system,
            notify_status_changes,
        ),
    );

    app.add_systems(OnEnter(RecognitionStatus::Error), teardown_scene);
}

/// Create the full application: windowing, config asset fetch, status
/// overlay and (in debug mode) the tuning panel.
pub fn create_app() -> App {
    let mut app = App::new();

    app.add_plugins(create_default_plugins())
        // Registers SiteConfig as a loadable asset type from JSON files.
        .add_plugins(JsonAssetPlugin::<SiteConfig>::new(&["json"]))
        .init_resource::<ConfigLoader>();

    register_core(&mut app);

    let debug_mode = detect_debug_mode();
    app.insert_resource(DebugMode(debug_mode));

    app.add_systems(Startup, (spawn_status_overlay, start_config_loading))
        .add_systems(
            Update,
            poll_config_asset.run_if(in_state(RecognitionStatus::Loading)),
        )
        .add_systems(Update, (reflect_status_overlay, simulate_recognition_keyboard));

    // The tuning channel is operator tooling: without the debug flag no
    // panel is built and no input listeners are attached.
    #[cfg(not(target_arch = "wasm32"))]
    if debug_mode {
        app.init_resource::<TuningPanelState>()
            .add_systems(Startup, spawn_tuning_panel)
            .add_systems(Update, (tuning_panel_keyboard, reflect_tuning_panel));
    }

    app
}

fn create_default_plugins() -> impl PluginGroup {
    let window_config = WindowPlugin {
        primary_window: Some(create_window_config()),
        ..default()
    };

    let asset_config = AssetPlugin {
        meta_check: AssetMetaCheck::Never,
        ..default()
    };

    DefaultPlugins.set(window_config).set(asset_config)
}
