/// Site configuration data model.
pub mod config;

/// App wiring and the recognition state machine.
pub mod core;

/// Runtime script loading, config fetch and load progress.
pub mod loading;

/// Scene compilation, mounting and live updates.
pub mod scene;

/// Status overlay presentation.
pub mod systems;
