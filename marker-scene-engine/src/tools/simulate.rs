//! Keyboard simulation of the AR runtime for native builds.
//!
//! There is no camera feed natively, so recognition signals are driven by
//! hand: number keys toggle targets, `E` injects an engine fault. WASM
//! builds receive the real signals from the DOM scene instead.

use bevy::prelude::*;

use crate::engine::core::app_state::{ArFault, RecognitionEvent, TargetTracking};

#[cfg(not(target_arch = "wasm32"))]
pub fn simulate_recognition_keyboard(
    keyboard: Res<ButtonInput<KeyCode>>,
    tracking: Res<TargetTracking>,
    mut recognition: EventWriter<RecognitionEvent>,
    mut faults: EventWriter<ArFault>,
) {
    for (key, index) in [(KeyCode::Digit1, 0), (KeyCode::Digit2, 1)] {
        if keyboard.just_pressed(key) {
            if tracking.is_found(index) {
                recognition.write(RecognitionEvent::TargetLost { index });
            } else {
                recognition.write(RecognitionEvent::TargetFound { index });
            }
        }
    }

    if keyboard.just_pressed(KeyCode::KeyE) {
        faults.write(ArFault {
            reason: "engine fault injected from keyboard".to_string(),
        });
    }
}

/// No camera and no keyboard simulation on WASM; recognition arrives from
/// the DOM scene listeners.
#[cfg(target_arch = "wasm32")]
pub fn simulate_recognition_keyboard() {}
