//! The tuning channel end to end over the RPC bridge: axis and vector
//! edits, debug-mode gating and in-place scene updates.

use std::time::Duration;

use bevy::prelude::*;
use bevy::state::app::StatesPlugin;

use marker_scene_engine::engine::config::SiteConfig;
use marker_scene_engine::engine::core::app_setup::register_core;
use marker_scene_engine::engine::core::app_state::RecognitionStatus;
use marker_scene_engine::engine::loading::script_loader::SettleGate;
use marker_scene_engine::engine::scene::mount::ModelEntity;
use marker_scene_engine::rpc::web_rpc::IncomingRpcMessage;
use marker_scene_engine::tools::tuning::{DebugMode, ModelParams};

fn tuning_app(debug: bool) -> App {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, StatesPlugin));
    register_core(&mut app);
    app.insert_resource(DebugMode(debug));
    app.insert_resource(temple_site());

    // Run loading to completion so the scene is mounted.
    app.update();
    app.world_mut()
        .resource_mut::<SettleGate>()
        .advance(Duration::from_secs(1));
    for _ in 0..3 {
        app.update();
    }
    assert_eq!(
        *app.world().resource::<State<RecognitionStatus>>().get(),
        RecognitionStatus::Scanning
    );
    app
}

fn temple_site() -> SiteConfig {
    serde_json::from_str(
        r#"{
            "ar": {
                "mindFile": "/targets/site.mind",
                "models": [
                    {
                        "id": "temple",
                        "targetIndex": 0,
                        "path": "/models/temple.glb"
                    }
                ]
            }
        }"#,
    )
    .unwrap()
}

fn send_rpc(app: &mut App, content: &str) {
    app.world_mut().send_event(IncomingRpcMessage {
        content: content.to_string(),
    });
    // Dispatch, event fold and state application each take a frame.
    for _ in 0..3 {
        app.update();
    }
}

fn preview_transform(app: &mut App, model_id: &str) -> Transform {
    let world = app.world_mut();
    let mut query = world.query::<(&ModelEntity, &Transform)>();
    query
        .iter(world)
        .find(|(model, _)| model.model_id == model_id)
        .map(|(_, transform)| *transform)
        .unwrap()
}

#[test]
fn axis_edit_flows_into_the_map_and_the_scene() {
    let mut app = tuning_app(true);

    send_rpc(
        &mut app,
        r#"{"jsonrpc":"2.0","method":"set_param",
            "params":{"model":"temple","group":"position","axis":1,"value":2.5},
            "id":1}"#,
    );

    let params = app.world().resource::<ModelParams>();
    let temple = params.get("temple").unwrap();
    assert_eq!(temple.position, Vec3::new(0.0, 2.5, 0.0));
    assert_eq!(temple.scale, Vec3::ONE);

    let transform = preview_transform(&mut app, "temple");
    assert_eq!(transform.translation, Vec3::new(0.0, 2.5, 0.0));
    assert_eq!(transform.scale, Vec3::ONE);
}

#[test]
fn vector_edit_replaces_the_whole_group() {
    let mut app = tuning_app(true);

    send_rpc(
        &mut app,
        r#"{"jsonrpc":"2.0","method":"set_param",
            "params":{"model":"temple","group":"scale","vector":[2.0, 2.0, 2.0]},
            "id":2}"#,
    );

    let params = app.world().resource::<ModelParams>();
    assert_eq!(params.get("temple").unwrap().scale, Vec3::splat(2.0));
    assert_eq!(
        preview_transform(&mut app, "temple").scale,
        Vec3::splat(2.0)
    );
}

#[test]
fn tuning_is_inert_without_debug_mode() {
    let mut app = tuning_app(false);

    send_rpc(
        &mut app,
        r#"{"jsonrpc":"2.0","method":"set_param",
            "params":{"model":"temple","group":"position","axis":1,"value":2.5},
            "id":3}"#,
    );

    let params = app.world().resource::<ModelParams>();
    assert_eq!(params.get("temple").unwrap().position, Vec3::ZERO);
    assert_eq!(preview_transform(&mut app, "temple").translation, Vec3::ZERO);
}

#[test]
fn unknown_model_edit_changes_nothing() {
    let mut app = tuning_app(true);
    let before = app.world().resource::<ModelParams>().clone();

    send_rpc(
        &mut app,
        r#"{"jsonrpc":"2.0","method":"set_param",
            "params":{"model":"phantom","group":"scale","axis":0,"value":3.0},
            "id":4}"#,
    );

    assert_eq!(*app.world().resource::<ModelParams>(), before);
}

#[test]
fn recognition_arrives_over_rpc_too() {
    let mut app = tuning_app(false);

    send_rpc(
        &mut app,
        r#"{"jsonrpc":"2.0","method":"target_found","params":{"index":0}}"#,
    );
    assert_eq!(
        *app.world().resource::<State<RecognitionStatus>>().get(),
        RecognitionStatus::Found
    );

    send_rpc(
        &mut app,
        r#"{"jsonrpc":"2.0","method":"target_lost","params":{"index":0}}"#,
    );
    assert_eq!(
        *app.world().resource::<State<RecognitionStatus>>().get(),
        RecognitionStatus::Scanning
    );
}

#[test]
fn engine_error_over_rpc_faults_the_session() {
    let mut app = tuning_app(false);

    send_rpc(
        &mut app,
        r#"{"jsonrpc":"2.0","method":"engine_error","params":{"message":"tracker crashed"}}"#,
    );
    assert_eq!(
        *app.world().resource::<State<RecognitionStatus>>().get(),
        RecognitionStatus::Error
    );
}

#[test]
fn malformed_rpc_payloads_are_discarded() {
    let mut app = tuning_app(true);
    let before = app.world().resource::<ModelParams>().clone();

    send_rpc(&mut app, "not json at all");
    send_rpc(
        &mut app,
        r#"{"jsonrpc":"2.0","method":"set_param","params":{"model":"temple"},"id":5}"#,
    );

    assert_eq!(*app.world().resource::<ModelParams>(), before);
    assert_eq!(
        *app.world().resource::<State<RecognitionStatus>>().get(),
        RecognitionStatus::Scanning
    );
}
