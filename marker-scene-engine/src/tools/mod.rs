/// Native-only tuning panel UI (debug mode).
pub mod debug_panel;

/// Native keyboard simulation of recognition events.
pub mod simulate;

/// Live parameter tuning channel and export.
pub mod tuning;
