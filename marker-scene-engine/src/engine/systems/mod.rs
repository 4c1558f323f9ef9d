/// Status overlay spawning and per-state presentation.
pub mod status_overlay;
