// chargelog - core/mod.rs
//
// Core engine layer: pure functions of the snapshot.
// Must NOT depend on: app, the filesystem, or any I/O beyond the Write
// object handed to the exporter.

pub mod classify;
pub mod correlate;
pub mod direction;
pub mod export;
pub mod filter;
pub mod frame;
pub mod model;
