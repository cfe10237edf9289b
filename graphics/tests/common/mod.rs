//! Common utilities for frame-graph integration tests.
//!
//! Every test runs against the [`DummyBackend`], which records submissions
//! and object lifetimes so the tests can inspect what the engine did.

#![allow(dead_code)]

use std::sync::Arc;

use cinder_graphics::{
    DeviceParameters, DummyBackend, ExecutorParameters, FrameExecutor, GraphicsDevice,
    ResourceState, Texture, TextureDescriptor, TextureFormat, TextureUsage,
};

/// Initialise logging once per test binary.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Device, backend and executor wired together.
pub struct TestContext {
    pub backend: Arc<DummyBackend>,
    pub device: Arc<GraphicsDevice>,
    pub executor: FrameExecutor,
}

impl TestContext {
    /// Create a context with `workers` recording threads.
    pub fn new(workers: usize) -> Self {
        Self::with_parameters(workers, DeviceParameters::new())
    }

    /// Create a context with custom device parameters.
    pub fn with_parameters(workers: usize, parameters: DeviceParameters) -> Self {
        Self::with_backend(workers, DummyBackend::new(), parameters)
    }

    /// Create a context on a preconfigured backend.
    pub fn with_backend(
        workers: usize,
        backend: DummyBackend,
        parameters: DeviceParameters,
    ) -> Self {
        init_logging();
        let backend = Arc::new(backend);
        let device = GraphicsDevice::new(backend.clone(), parameters);
        let executor = FrameExecutor::new(
            device.clone(),
            ExecutorParameters::new()
                .with_worker_threads(workers)
                .with_label("test"),
        )
        .expect("failed to start executor");
        Self {
            backend,
            device,
            executor,
        }
    }

    /// Create a render target and register it in `state`.
    pub fn tracked_target(&mut self, label: &str, state: ResourceState) -> Arc<Texture> {
        let texture = self
            .device
            .create_texture(
                &TextureDescriptor::new_2d(
                    64,
                    64,
                    TextureFormat::Rgba16Float,
                    TextureUsage::RENDER_TARGET | TextureUsage::SHADER_RESOURCE,
                )
                .with_label(label),
            )
            .expect("failed to create target");
        self.executor.tracker_mut().register(&texture, state);
        texture
    }

    /// Create a depth buffer and register it in `state`.
    pub fn tracked_depth(&mut self, label: &str, state: ResourceState) -> Arc<Texture> {
        let texture = self
            .device
            .create_texture(
                &TextureDescriptor::new_2d(
                    64,
                    64,
                    TextureFormat::Depth32FloatStencil8,
                    TextureUsage::DEPTH_STENCIL | TextureUsage::SHADER_RESOURCE,
                )
                .with_label(label),
            )
            .expect("failed to create depth buffer");
        self.executor.tracker_mut().register(&texture, state);
        texture
    }
}
