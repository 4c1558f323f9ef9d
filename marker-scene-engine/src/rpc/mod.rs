/// JSON-RPC 2.0 bridge to the host page over `window.postMessage`.
pub mod web_rpc;
