/// Site configuration fetch and parameter seeding.
pub mod config_loader;

/// Loading percentage shared by the overlay and the frontend bridge.
pub mod progress;

/// Idempotent third-party runtime script loading and the settle gate.
pub mod script_loader;
