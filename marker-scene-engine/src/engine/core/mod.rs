/// Application wiring: plugins, resources and state-based scheduling.
pub mod app_setup;

/// Recognition state machine, events and target tracking.
pub mod app_state;

/// Window configuration per platform.
pub mod window_config;
