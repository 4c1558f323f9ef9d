//! Shared tuning values for the AR experience.

/// Path of the site configuration document, relative to the asset root.
pub const RELATIVE_CONFIG_PATH: &'static str = "config.json";

/// Third-party runtime scripts required before a scene can be mounted.
/// Each entry pairs the script URL with the global object it installs.
pub const AFRAME_SCRIPT_URL: &'static str = "https://aframe.io/releases/1.5.0/aframe.min.js";
pub const AFRAME_GLOBAL: &'static str = "AFRAME";
pub const MINDAR_SCRIPT_URL: &'static str =
    "https://cdn.jsdelivr.net/npm/mind-ar@1.2.5/dist/mindar-image-aframe.prod.js";
pub const MINDAR_GLOBAL: &'static str = "MINDAR";

/// DOM element that receives the compiled scene markup on web builds.
pub const AR_CONTAINER_ID: &'static str = "ar-container";

/// Settle delay after the runtime scripts land. The engine performs internal
/// async setup with no completion callback, so the ready signal is preferred
/// and this bounded wait is the backstop.
pub const SETTLE_DELAY_SECS: f32 = 0.5;

/// Baseline presentation effect: one full turn per model, linear, looping.
pub const IDLE_ROTATION_SECS: f32 = 20.0;

/// Loading percentages surfaced to the status overlay and the frontend.
pub const PROGRESS_START: u8 = 10;
pub const PROGRESS_FIRST_SCRIPT: u8 = 40;
pub const PROGRESS_ALL_SCRIPTS: u8 = 70;
pub const PROGRESS_COMPLETE: u8 = 100;

/// Advisory slider bounds for the tuning panel. These constrain the panel
/// only; values arriving over RPC are applied as-is.
pub const SCALE_RANGE: (f32, f32) = (0.0, 5.0);
pub const POSITION_RANGE: (f32, f32) = (-5.0, 5.0);
pub const ROTATION_RANGE: (f32, f32) = (0.0, 360.0);

/// Nudge step sizes used by the tuning panel keyboard controls.
pub const SCALE_STEP: f32 = 0.1;
pub const POSITION_STEP: f32 = 0.1;
pub const ROTATION_STEP: f32 = 1.0;
