// chargelog - app/mod.rs
//
// Application shell around the core engine: view state, snapshot loading,
// configuration. This is the only layer that touches the filesystem.

pub mod config;
pub mod snapshot;
pub mod state;
