//! # Cinder Graphics
//!
//! Frame-graph execution engine: one frame is split into named passes that
//! are recorded in parallel and submitted in a fixed order, with resource
//! state transitions inserted between them.
//!
//! ## Overview
//!
//! This crate provides:
//! - [`GraphicsDevice`] - Factory for device objects, bound to a [`GpuBackend`]
//! - [`RenderGraph`] - Ordered passes with declared resource footprints
//! - [`FrameExecutor`] - Parallel recording, barrier planning and submission
//! - [`PipelineCache`] - Dense permutation table of pipeline objects
//! - [`ImageRenderer`] - Quad and fullscreen image draws on top of the cache
//! - [`ForwardRenderPath`] - Reference forward frame
//! - [`DummyBackend`] - Recording backend for tests and tools
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use cinder_graphics::{
//!     DeviceParameters, DummyBackend, ExecutorParameters, FrameExecutor, GraphicsDevice,
//!     PassResourceUsage, RenderGraph, ResourceState,
//! };
//!
//! let device = GraphicsDevice::new(Arc::new(DummyBackend::new()), DeviceParameters::new());
//! let mut executor = FrameExecutor::new(device.clone(), ExecutorParameters::new())?;
//! executor.tracker_mut().register(&depth, ResourceState::DepthRead);
//!
//! let mut graph = RenderGraph::new();
//! graph.add_pass(
//!     "depth_prepass",
//!     PassResourceUsage::new()
//!         .write(&depth, ResourceState::DepthWrite)
//!         .release(&depth, ResourceState::DepthRead),
//!     |rec| rec.context().clear_depth_stencil(&depth, 0.0, 0),
//! );
//! let report = executor.execute(graph)?;
//! ```

pub mod backend;
pub mod command;
pub mod device;
pub mod error;
pub mod graph;
pub mod image;
pub mod pipeline;
pub mod render_path;
pub mod resources;
pub mod scheduler;
pub mod types;

// Re-export main types for convenience
pub use backend::{BackendError, DummyBackend, GpuBackend, SubmissionId};
pub use command::{Command, CommandContext, CommandList};
pub use device::{DeviceLimits, DeviceParameters, GraphicsDevice};
pub use error::GraphicsError;
pub use graph::{
    PassHandle, PassRecorder, PassResourceUsage, RenderGraph, ResourceState,
    ResourceStateTracker,
};
pub use image::{ImageParams, ImageQuality, ImageRenderer};
pub use pipeline::{MapShaderProvider, PipelineAxes, PipelineCache, PipelineKey, ShaderProvider};
pub use render_path::{ForwardRenderPath, RenderPathSettings, ScenePass, SceneRenderer};
pub use resources::{Buffer, GpuObject, GpuObjectKind, GpuResource, ResourceId, Texture};
pub use scheduler::{ExecutorParameters, FrameExecutor, FrameReport, JobSystem};
pub use types::{
    BufferDescriptor, BufferUsage, Extent3d, SamplerDescriptor, TextureDescriptor, TextureFormat,
    TextureUsage,
};

/// Graphics library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the graphics subsystem.
///
/// Call once before creating a device.
pub fn init() {
    cinder_core::init();
    log::info!("Cinder Graphics v{} initialized", VERSION);
}
