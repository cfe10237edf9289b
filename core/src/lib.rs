//! # Cinder Core
//!
//! Utilities shared by the Cinder crates. At the moment this is the profiling
//! instrumentation layer used by the frame-graph executor.

pub mod profiling;

/// Core library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Log the core version. Called once by the graphics crate on startup.
pub fn init() {
    log::info!("Cinder Core v{} initialized", VERSION);
}
