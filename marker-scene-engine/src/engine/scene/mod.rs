/// Configuration-to-scene compilation and the mounted-scene handle.
pub mod compiler;

/// Declarative markup emission for the AR runtime.
pub mod markup;

/// Mounting, live parameter application, recognition bridging and teardown.
pub mod mount;
