// chargelog - util/mod.rs
//
// Cross-cutting utilities: constants, error types, logging setup.

pub mod constants;
pub mod error;
pub mod logging;
