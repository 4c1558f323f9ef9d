//! JSON-RPC 2.0 bridge between the host page and the engine.
//!
//! The page (or the MindAR glue script) posts requests over
//! `window.postMessage`; the engine answers and broadcasts status and
//! loading notifications the same way. Natively the listener half is a
//! no-op and tests feed [`IncomingRpcMessage`] events directly.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::engine::core::app_state::{ArFault, RecognitionEvent};
use crate::tools::tuning::{DebugMode, ModelParams, ParamChange, ParamChangeEvent, ParamGroup};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsValue;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;
#[cfg(target_arch = "wasm32")]
use web_sys::{MessageEvent, window};

/// JSON-RPC 2.0 request structure.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
    pub id: Option<serde_json::Value>,
}

/// JSON-RPC 2.0 response structure.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcResponse {
    pub jsonrpc: String,
    pub result: Option<serde_json::Value>,
    pub error: Option<RpcError>,
    pub id: Option<serde_json::Value>,
}

/// JSON-RPC 2.0 notification structure for one-way communication.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcNotification {
    pub jsonrpc: String,
    pub method: String,
    pub params: serde_json::Value,
}

/// JSON-RPC error structure following the specification.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
    pub data: Option<serde_json::Value>,
}

impl RpcError {
    pub fn invalid_params(message: &str) -> Self {
        Self {
            code: -32602,
            message: message.to_string(),
            data: None,
        }
    }

    pub fn internal_error(message: &str) -> Self {
        Self {
            code: -32603,
            message: message.to_string(),
            data: None,
        }
    }
}

/// Resource managing bidirectional RPC traffic with the host page.
#[derive(Resource, Default)]
pub struct WebRpcInterface {
    outgoing_notifications: Vec<RpcNotification>,
    outgoing_responses: Vec<RpcResponse>,
}

impl WebRpcInterface {
    /// Send a notification to the host page without expecting a response.
    pub fn send_notification(&mut self, method: &str, params: serde_json::Value) {
        self.outgoing_notifications.push(RpcNotification {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params,
        });
    }

    fn queue_response(&mut self, response: RpcResponse) {
        self.outgoing_responses.push(response);
    }

    /// Pending notifications, visible for tests.
    pub fn pending_notifications(&self) -> &[RpcNotification] {
        &self.outgoing_notifications
    }
}

/// Event representing an incoming RPC message from the host page.
#[derive(Event, Debug, Clone)]
pub struct IncomingRpcMessage {
    pub content: String,
}

/// Plugin establishing the postMessage communication layer.
pub struct WebRpcPlugin;

impl Plugin for WebRpcPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<WebRpcInterface>()
            .add_event::<IncomingRpcMessage>()
            .add_systems(
                Update,
                (
                    process_incoming_messages,
                    handle_rpc_messages,
                    send_outgoing_messages,
                )
                    .chain(),
            );

        #[cfg(target_arch = "wasm32")]
        app.add_systems(Startup, setup_message_listener);
    }
}

#[cfg(target_arch = "wasm32")]
fn setup_message_listener(mut commands: Commands) {
    use std::sync::{Arc, Mutex};

    let message_queue: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let queue_clone = message_queue.clone();

    let closure = Closure::wrap(Box::new(move |event: MessageEvent| {
        if let Ok(data) = event.data().dyn_into::<js_sys::JsString>() {
            let message_str: String = data.into();
            // Cheap pre-filter before JSON parsing on the schedule thread.
            if message_str.contains("jsonrpc") {
                if let Ok(mut queue) = queue_clone.lock() {
                    queue.push(message_str);
                }
            }
        }
    }) as Box<dyn FnMut(MessageEvent)>);

    if let Some(window) = window() {
        window
            .add_event_listener_with_callback("message", closure.as_ref().unchecked_ref())
            .expect("Failed to register message listener");
    }

    closure.forget();
    commands.insert_resource(MessageQueue(message_queue));
}

/// Resource wrapping the thread-safe message queue for WASM event handling.
#[derive(Resource)]
struct MessageQueue(std::sync::Arc<std::sync::Mutex<Vec<String>>>);

fn process_incoming_messages(
    message_queue: Option<Res<MessageQueue>>,
    mut message_events: EventWriter<IncomingRpcMessage>,
) {
    let Some(queue_res) = message_queue else {
        return;
    };

    let messages = if let Ok(mut queue) = queue_res.0.lock() {
        std::mem::take(&mut *queue)
    } else {
        Vec::new()
    };

    for message_str in messages {
        message_events.write(IncomingRpcMessage {
            content: message_str,
        });
    }
}

pub fn handle_rpc_messages(
    mut events: EventReader<IncomingRpcMessage>,
    mut rpc_interface: ResMut<WebRpcInterface>,
    debug_mode: Res<DebugMode>,
    params: Res<ModelParams>,
    mut recognition: EventWriter<RecognitionEvent>,
    mut faults: EventWriter<ArFault>,
    mut param_changes: EventWriter<ParamChangeEvent>,
) {
    for event in events.read() {
        match serde_json::from_str::<RpcRequest>(&event.content) {
            Ok(request) => {
                if let Some(response) = handle_rpc_request(
                    &request,
                    *debug_mode,
                    &params,
                    &mut recognition,
                    &mut faults,
                    &mut param_changes,
                ) {
                    // Exports are also broadcast, so a listening page picks
                    // up snippets it did not request itself.
                    if request.method == "export_params" {
                        if let Some(result) = response.result.clone() {
                            rpc_interface.send_notification("params_exported", result);
                        }
                    }
                    rpc_interface.queue_response(response);
                }
            }
            Err(parse_error) => {
                warn!("discarding malformed RPC message: {}", parse_error);
            }
        }
    }
}

/// Dispatch one request. Requests without an id are notifications: they are
/// processed but never answered.
fn handle_rpc_request(
    request: &RpcRequest,
    debug_mode: DebugMode,
    params: &ModelParams,
    recognition: &mut EventWriter<RecognitionEvent>,
    faults: &mut EventWriter<ArFault>,
    param_changes: &mut EventWriter<ParamChangeEvent>,
) -> Option<RpcResponse> {
    let result = match request.method.as_str() {
        "target_found" => handle_target_event(&request.params, recognition, true),
        "target_lost" => handle_target_event(&request.params, recognition, false),
        "engine_ready" => {
            recognition.write(RecognitionEvent::EngineReady);
            Ok(serde_json::json!({ "success": true }))
        }
        "engine_error" => handle_engine_error(&request.params, faults),
        "set_param" => handle_set_param(&request.params, debug_mode, param_changes),
        "export_params" => handle_export_params(&request.params, debug_mode, params),
        other => {
            warn!("Unknown RPC method: {}", other);
            let id = request.id.clone()?;
            return Some(RpcResponse {
                jsonrpc: "2.0".to_string(),
                result: None,
                error: Some(RpcError {
                    code: -32601,
                    message: "Method not found".to_string(),
                    data: Some(serde_json::json!({ "method": other })),
                }),
                id: Some(id),
            });
        }
    };

    let id = request.id.clone()?;
    Some(match result {
        Ok(result_value) => RpcResponse {
            jsonrpc: "2.0".to_string(),
            result: Some(result_value),
            error: None,
            id: Some(id),
        },
        Err(error) => RpcResponse {
            jsonrpc: "2.0".to_string(),
            result: None,
            error: Some(error),
            id: Some(id),
        },
    })
}

fn handle_target_event(
    params: &serde_json::Value,
    recognition: &mut EventWriter<RecognitionEvent>,
    found: bool,
) -> Result<serde_json::Value, RpcError> {
    #[derive(Deserialize)]
    struct TargetParams {
        index: u32,
    }

    let target = serde_json::from_value::<TargetParams>(params.clone())
        .map_err(|_| RpcError::invalid_params("Expected 'index' parameter"))?;

    recognition.write(if found {
        RecognitionEvent::TargetFound {
            index: target.index,
        }
    } else {
        RecognitionEvent::TargetLost {
            index: target.index,
        }
    });

    Ok(serde_json::json!({ "success": true, "index": target.index }))
}

fn handle_engine_error(
    params: &serde_json::Value,
    faults: &mut EventWriter<ArFault>,
) -> Result<serde_json::Value, RpcError> {
    let reason = params
        .get("message")
        .and_then(|m| m.as_str())
        .unwrap_or("AR engine reported an error")
        .to_string();
    faults.write(ArFault { reason });
    Ok(serde_json::json!({ "success": true }))
}

/// Remote half of the tuning channel. Either a single axis edit
/// (`{model, group, axis, value}`) or a whole-vector replacement
/// (`{model, group, vector: [x, y, z]}`).
fn handle_set_param(
    params: &serde_json::Value,
    debug_mode: DebugMode,
    param_changes: &mut EventWriter<ParamChangeEvent>,
) -> Result<serde_json::Value, RpcError> {
    if !debug_mode.0 {
        return Err(RpcError::internal_error("Tuning channel is not active"));
    }

    #[derive(Deserialize)]
    struct SetParamParams {
        model: String,
        group: String,
        axis: Option<usize>,
        value: Option<f32>,
        vector: Option<[f32; 3]>,
    }

    let set_params = serde_json::from_value::<SetParamParams>(params.clone())
        .map_err(|_| RpcError::invalid_params("Expected 'model' and 'group' parameters"))?;

    let group = ParamGroup::from_str(&set_params.group)
        .ok_or_else(|| RpcError::invalid_params("'group' must be scale, position or rotation"))?;

    let change = match (set_params.axis, set_params.value, set_params.vector) {
        (Some(axis), Some(value), _) => ParamChange::Axis { axis, value },
        (_, _, Some(v)) => ParamChange::Vector(Vec3::from_array(v)),
        _ => {
            return Err(RpcError::invalid_params(
                "Expected 'axis'+'value' or 'vector'",
            ));
        }
    };

    param_changes.write(ParamChangeEvent {
        model_id: set_params.model.clone(),
        group,
        change,
    });

    Ok(serde_json::json!({ "success": true, "model": set_params.model }))
}

fn handle_export_params(
    params: &serde_json::Value,
    debug_mode: DebugMode,
    model_params: &ModelParams,
) -> Result<serde_json::Value, RpcError> {
    if !debug_mode.0 {
        return Err(RpcError::internal_error("Tuning channel is not active"));
    }

    let model = params
        .get("model")
        .and_then(|m| m.as_str())
        .ok_or_else(|| RpcError::invalid_params("Expected 'model' parameter"))?;

    let snippet = model_params
        .export_json(model)
        .ok_or_else(|| RpcError::invalid_params("Unknown model id"))?;

    Ok(serde_json::json!({ "model": model, "snippet": snippet }))
}

/// Send queued notifications and responses to the host page.
fn send_outgoing_messages(mut rpc_interface: ResMut<WebRpcInterface>) {
    for notification in rpc_interface.outgoing_notifications.drain(..) {
        send_message_to_parent(&notification);
    }
    for response in rpc_interface.outgoing_responses.drain(..) {
        send_message_to_parent(&response);
    }
}

/// Serialise a message to the parent window.
fn send_message_to_parent<T: Serialize>(message: &T) {
    #[cfg(target_arch = "wasm32")]
    {
        match serde_json::to_string(message) {
            Ok(json) => {
                if let Some(window) = window() {
                    if let Some(parent) = window.parent().ok().flatten() {
                        if let Err(e) = parent.post_message(&JsValue::from_str(&json), "*") {
                            error!("Failed to send message to parent: {:?}", e);
                        }
                    }
                }
            }
            Err(e) => {
                error!("Failed to serialize message: {}", e);
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = message;
    }
}
