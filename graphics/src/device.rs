//! Graphics device.
//!
//! The [`GraphicsDevice`] is the main interface for creating GPU objects and
//! the only place command lists enter the queue. It wraps a [`GpuBackend`]
//! and binds every object it creates to that backend, so dropping the last
//! reference destroys the device-side object.

use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use crate::backend::{CreateRequest, GpuBackend, SubmissionId};
use crate::command::{CommandContext, CommandList};
use crate::error::GraphicsError;
use crate::resources::{
    BlendState, Buffer, DepthStencilState, GpuObject, PipelineState, PipelineStateDescriptor,
    RasterizerState, Sampler, Shader, Texture,
};
use crate::types::{
    BlendStateDescriptor, BufferDescriptor, DepthStencilStateDescriptor,
    RasterizerStateDescriptor, SamplerDescriptor, ShaderStage, TextureDescriptor, TextureFormat,
};

/// Limits enforced before a creation request reaches the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceLimits {
    /// Maximum texture dimension.
    pub max_texture_dimension: u32,
    /// Maximum buffer size.
    pub max_buffer_size: u64,
}

impl Default for DeviceLimits {
    fn default() -> Self {
        Self {
            max_texture_dimension: 16384,
            max_buffer_size: 1 << 30, // 1 GB
        }
    }
}

/// Configuration for a [`GraphicsDevice`].
#[derive(Debug, Clone, Default)]
pub struct DeviceParameters {
    /// Device name used in logs.
    pub label: Option<String>,
    /// Creation limits.
    pub limits: DeviceLimits,
    /// Record GPU timing ranges into command lists.
    pub gpu_profiling: bool,
}

impl DeviceParameters {
    /// Create default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the device label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set creation limits.
    pub fn with_limits(mut self, limits: DeviceLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Enable or disable GPU timing ranges.
    pub fn with_gpu_profiling(mut self, enabled: bool) -> Self {
        self.gpu_profiling = enabled;
        self
    }
}

/// A graphics device for creating GPU objects.
///
/// # Thread Safety
///
/// `GraphicsDevice` is `Send + Sync` and can be safely shared across threads.
/// Passes open and fill their contexts on worker threads; submission happens
/// on the executor thread.
///
/// # Example
///
/// ```ignore
/// let device = GraphicsDevice::new(Arc::new(DummyBackend::new()), DeviceParameters::new());
///
/// let buffer = device.create_buffer(&BufferDescriptor::new(1024, BufferUsage::VERTEX))?;
/// let texture = device.create_texture(&TextureDescriptor::new_2d(
///     1920, 1080,
///     TextureFormat::Rgba8Unorm,
///     TextureUsage::RENDER_TARGET,
/// ))?;
/// ```
pub struct GraphicsDevice {
    backend: Arc<dyn GpuBackend>,
    name: String,
    parameters: DeviceParameters,
    // Track allocated resources (weak references for debugging)
    buffers: RwLock<Vec<Weak<Buffer>>>,
    textures: RwLock<Vec<Weak<Texture>>>,
    samplers: RwLock<Vec<Weak<Sampler>>>,
    pipelines: RwLock<Vec<Weak<PipelineState>>>,
}

impl GraphicsDevice {
    /// Create a device on top of a backend.
    pub fn new(backend: Arc<dyn GpuBackend>, parameters: DeviceParameters) -> Arc<Self> {
        let name = parameters
            .label
            .clone()
            .unwrap_or_else(|| backend.name().to_string());
        log::info!(
            "GraphicsDevice: '{}' (back buffer {:?}, samples {:?})",
            name,
            backend.back_buffer_format(),
            backend.supported_sample_counts()
        );
        Arc::new(Self {
            backend,
            name,
            parameters,
            buffers: RwLock::new(Vec::new()),
            textures: RwLock::new(Vec::new()),
            samplers: RwLock::new(Vec::new()),
            pipelines: RwLock::new(Vec::new()),
        })
    }

    /// Get the device name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the backend.
    pub fn backend(&self) -> &Arc<dyn GpuBackend> {
        &self.backend
    }

    /// Get the creation limits.
    pub fn limits(&self) -> &DeviceLimits {
        &self.parameters.limits
    }

    /// Format of the presentable back buffer.
    pub fn back_buffer_format(&self) -> TextureFormat {
        self.backend.back_buffer_format()
    }

    /// Returns true if textures with `count` samples can be created.
    pub fn supports_sample_count(&self, count: u32) -> bool {
        self.backend.supported_sample_counts().contains(&count)
    }

    /// Returns true if contexts record GPU timing ranges.
    pub fn gpu_profiling(&self) -> bool {
        self.parameters.gpu_profiling
    }

    fn create_object(&self, request: CreateRequest<'_>) -> Result<GpuObject, GraphicsError> {
        let raw = self.backend.create_object(&request)?;
        Ok(GpuObject::bound(request.kind(), raw, Arc::clone(&self.backend)))
    }

    /// Create a GPU buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer size exceeds device limits or allocation fails.
    pub fn create_buffer(&self, descriptor: &BufferDescriptor) -> Result<Arc<Buffer>, GraphicsError> {
        let max = self.parameters.limits.max_buffer_size;
        if descriptor.size > max {
            return Err(GraphicsError::InvalidParameter(format!(
                "buffer size {} exceeds maximum {max}",
                descriptor.size
            )));
        }

        if descriptor.size == 0 {
            return Err(GraphicsError::InvalidParameter(
                "buffer size cannot be zero".to_string(),
            ));
        }

        let object = self.create_object(CreateRequest::Buffer(descriptor))?;
        let buffer = Arc::new(Buffer::new(object, descriptor.clone()));
        self.buffers.write().push(Arc::downgrade(&buffer));

        log::trace!(
            "GraphicsDevice: created buffer {:?}, size={}",
            descriptor.label,
            descriptor.size
        );

        Ok(buffer)
    }

    /// Create a GPU texture.
    ///
    /// # Errors
    ///
    /// Returns an error if the dimensions exceed device limits, the sample
    /// count is unsupported, or allocation fails.
    pub fn create_texture(
        &self,
        descriptor: &TextureDescriptor,
    ) -> Result<Arc<Texture>, GraphicsError> {
        let max_dim = self.parameters.limits.max_texture_dimension;
        if descriptor.size.width > max_dim
            || descriptor.size.height > max_dim
            || descriptor.size.depth > max_dim
        {
            return Err(GraphicsError::InvalidParameter(format!(
                "texture dimension exceeds maximum {max_dim}"
            )));
        }

        if descriptor.size.width == 0 || descriptor.size.height == 0 || descriptor.size.depth == 0
        {
            return Err(GraphicsError::InvalidParameter(
                "texture dimensions cannot be zero".to_string(),
            ));
        }

        if !self.supports_sample_count(descriptor.sample_count) {
            return Err(GraphicsError::InvalidParameter(format!(
                "sample count {} is not supported",
                descriptor.sample_count
            )));
        }

        if descriptor.is_multisampled() && descriptor.mip_level_count > 1 {
            return Err(GraphicsError::InvalidParameter(
                "multisampled textures cannot have mip levels".to_string(),
            ));
        }

        let object = self.create_object(CreateRequest::Texture(descriptor))?;
        let texture = Arc::new(Texture::new(object, descriptor.clone()));
        self.textures.write().push(Arc::downgrade(&texture));

        log::trace!(
            "GraphicsDevice: created texture {:?}, size={}x{}",
            descriptor.label,
            descriptor.size.width,
            descriptor.size.height
        );

        Ok(texture)
    }

    /// Create a texture sampler.
    ///
    /// # Errors
    ///
    /// Returns an error if sampler creation fails.
    pub fn create_sampler(
        &self,
        descriptor: &SamplerDescriptor,
    ) -> Result<Arc<Sampler>, GraphicsError> {
        let object = self.create_object(CreateRequest::Sampler(descriptor))?;
        let sampler = Arc::new(Sampler::new(object, descriptor.clone()));
        self.samplers.write().push(Arc::downgrade(&sampler));

        log::trace!("GraphicsDevice: created sampler {:?}", descriptor.label);

        Ok(sampler)
    }

    /// Create a shader from a content name.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot create the shader.
    pub fn create_shader(&self, stage: ShaderStage, name: &str) -> Result<Arc<Shader>, GraphicsError> {
        let object = self.create_object(CreateRequest::Shader { stage, name })?;
        log::trace!("GraphicsDevice: created {stage:?} shader '{name}'");
        Ok(Arc::new(Shader::new(object, stage, name.to_string())))
    }

    /// Create a blend state object.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot create the object.
    pub fn create_blend_state(
        &self,
        descriptor: &BlendStateDescriptor,
    ) -> Result<Arc<BlendState>, GraphicsError> {
        let object = self.create_object(CreateRequest::BlendState(descriptor))?;
        Ok(Arc::new(BlendState::new(object, *descriptor)))
    }

    /// Create a depth/stencil state object.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot create the object.
    pub fn create_depth_stencil_state(
        &self,
        descriptor: &DepthStencilStateDescriptor,
    ) -> Result<Arc<DepthStencilState>, GraphicsError> {
        let object = self.create_object(CreateRequest::DepthStencilState(descriptor))?;
        Ok(Arc::new(DepthStencilState::new(object, *descriptor)))
    }

    /// Create a rasterizer state object.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot create the object.
    pub fn create_rasterizer_state(
        &self,
        descriptor: &RasterizerStateDescriptor,
    ) -> Result<Arc<RasterizerState>, GraphicsError> {
        let object = self.create_object(CreateRequest::RasterizerState(descriptor))?;
        Ok(Arc::new(RasterizerState::new(object, *descriptor)))
    }

    /// Bake a pipeline state object.
    ///
    /// # Errors
    ///
    /// Returns [`GraphicsError::InvalidParameter`] if a shader is bound to
    /// the wrong stage or the sample count is unsupported, or the backend
    /// error if baking fails.
    pub fn create_pipeline_state(
        &self,
        descriptor: &PipelineStateDescriptor,
    ) -> Result<Arc<PipelineState>, GraphicsError> {
        if descriptor.vertex_shader.stage() != ShaderStage::Vertex {
            return Err(GraphicsError::InvalidParameter(format!(
                "'{}' is not a vertex shader",
                descriptor.vertex_shader.name()
            )));
        }
        if descriptor.pixel_shader.stage() != ShaderStage::Pixel {
            return Err(GraphicsError::InvalidParameter(format!(
                "'{}' is not a pixel shader",
                descriptor.pixel_shader.name()
            )));
        }
        if !self.supports_sample_count(descriptor.sample_count) {
            return Err(GraphicsError::InvalidParameter(format!(
                "sample count {} is not supported",
                descriptor.sample_count
            )));
        }

        let object = self.create_object(CreateRequest::PipelineState(descriptor))?;
        let pipeline = Arc::new(PipelineState::new(object, descriptor.clone()));
        self.pipelines.write().push(Arc::downgrade(&pipeline));

        log::trace!("GraphicsDevice: created pipeline {:?}", descriptor.label);

        Ok(pipeline)
    }

    /// Open a fresh, empty command context.
    ///
    /// The backend may reset a per-thread command allocator here.
    pub fn open_context(&self, name: &str) -> CommandContext {
        let id = self.backend.begin_command_list(name);
        CommandContext::new(id, name, self.parameters.gpu_profiling)
    }

    /// Submit a closed command list.
    ///
    /// # Errors
    ///
    /// Propagates backend submission failures such as a lost device.
    ///
    /// # Panics
    ///
    /// The backend panics if the same list is submitted twice.
    pub fn submit(&self, list: &CommandList) -> Result<SubmissionId, GraphicsError> {
        Ok(self.backend.submit(list)?)
    }

    /// Get the number of live buffers created by this device.
    pub fn buffer_count(&self) -> usize {
        live(&self.buffers)
    }

    /// Get the number of live textures created by this device.
    pub fn texture_count(&self) -> usize {
        live(&self.textures)
    }

    /// Get the number of live samplers created by this device.
    pub fn sampler_count(&self) -> usize {
        live(&self.samplers)
    }

    /// Get the number of live pipeline objects created by this device.
    pub fn pipeline_count(&self) -> usize {
        live(&self.pipelines)
    }

    /// Drop tracking entries whose resources are gone. Returns how many
    /// entries were removed.
    pub fn cleanup_dead_resources(&self) -> usize {
        let removed = prune(&self.buffers)
            + prune(&self.textures)
            + prune(&self.samplers)
            + prune(&self.pipelines);
        if removed > 0 {
            log::trace!("GraphicsDevice: pruned {removed} dead tracking entries");
        }
        removed
    }
}

fn live<T>(list: &RwLock<Vec<Weak<T>>>) -> usize {
    list.read().iter().filter(|w| w.strong_count() > 0).count()
}

fn prune<T>(list: &RwLock<Vec<Weak<T>>>) -> usize {
    let mut list = list.write();
    let before = list.len();
    list.retain(|w| w.strong_count() > 0);
    before - list.len()
}

impl std::fmt::Debug for GraphicsDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphicsDevice")
            .field("name", &self.name)
            .field("backend", &self.backend.name())
            .field("buffers", &self.buffer_count())
            .field("textures", &self.texture_count())
            .field("pipelines", &self.pipeline_count())
            .finish()
    }
}

// Ensure GraphicsDevice is Send + Sync
static_assertions::assert_impl_all!(GraphicsDevice: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::DummyBackend;
    use crate::resources::GpuObjectKind;
    use crate::types::{BufferUsage, TextureUsage};

    fn device() -> (Arc<DummyBackend>, Arc<GraphicsDevice>) {
        let backend = Arc::new(DummyBackend::new().with_sample_counts(&[1, 4]));
        let device = GraphicsDevice::new(backend.clone(), DeviceParameters::new());
        (backend, device)
    }

    #[test]
    fn test_buffer_lifetime() {
        let (backend, device) = device();
        let buffer = device
            .create_buffer(&BufferDescriptor::new(64, BufferUsage::CONSTANT))
            .unwrap();
        assert_eq!(device.buffer_count(), 1);
        assert_eq!(backend.live_count_of(GpuObjectKind::Buffer), 1);

        drop(buffer);
        assert_eq!(device.buffer_count(), 0);
        assert_eq!(backend.live_count(), 0);
        assert_eq!(backend.destroyed_count(), 1);
    }

    #[test]
    fn test_cleanup_prunes_dead_entries() {
        let (_backend, device) = device();
        let keep = device
            .create_buffer(&BufferDescriptor::new(64, BufferUsage::CONSTANT))
            .unwrap();
        for _ in 0..3 {
            device
                .create_buffer(&BufferDescriptor::new(64, BufferUsage::VERTEX))
                .unwrap();
        }
        assert_eq!(device.cleanup_dead_resources(), 3);
        assert_eq!(device.cleanup_dead_resources(), 0);
        assert_eq!(device.buffer_count(), 1);
        drop(keep);
        assert_eq!(device.cleanup_dead_resources(), 1);
    }

    #[test]
    fn test_invalid_buffer() {
        let (backend, device) = device();
        let result = device.create_buffer(&BufferDescriptor::new(0, BufferUsage::VERTEX));
        assert!(matches!(result, Err(GraphicsError::InvalidParameter(_))));
        assert_eq!(backend.call_count(), 0);
    }

    #[test]
    fn test_texture_kind_and_sample_count() {
        let (backend, device) = device();
        let desc = TextureDescriptor::new_2d(
            64,
            64,
            TextureFormat::Rgba16Float,
            TextureUsage::RENDER_TARGET,
        );
        let _texture = device.create_texture(&desc).unwrap();
        assert_eq!(backend.created_count(GpuObjectKind::Texture2D), 1);

        let msaa = desc.clone().with_sample_count(8);
        assert!(matches!(
            device.create_texture(&msaa),
            Err(GraphicsError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_out_of_memory_propagates() {
        let backend = Arc::new(DummyBackend::new().with_allocation_limit(0));
        let device = GraphicsDevice::new(backend, DeviceParameters::new());
        let result = device.create_sampler(&SamplerDescriptor::linear());
        assert_eq!(result.unwrap_err(), GraphicsError::OutOfMemory);
    }

    #[test]
    fn test_pipeline_stage_validation() {
        let (_backend, device) = device();
        let vs = device.create_shader(ShaderStage::Vertex, "imageVS").unwrap();
        let ps = device.create_shader(ShaderStage::Pixel, "imagePS").unwrap();
        let descriptor = PipelineStateDescriptor {
            label: None,
            vertex_shader: ps.clone(),
            pixel_shader: vs.clone(),
            blend: device
                .create_blend_state(&BlendStateDescriptor::opaque())
                .unwrap(),
            depth_stencil: device
                .create_depth_stencil_state(&DepthStencilStateDescriptor::disabled())
                .unwrap(),
            rasterizer: device
                .create_rasterizer_state(&RasterizerStateDescriptor::overlay())
                .unwrap(),
            topology: Default::default(),
            color_format: TextureFormat::Rgba8Unorm,
            depth_stencil_format: None,
            sample_count: 1,
        };
        assert!(device.create_pipeline_state(&descriptor).is_err());

        let fixed = PipelineStateDescriptor {
            vertex_shader: vs,
            pixel_shader: ps,
            ..descriptor
        };
        device.create_pipeline_state(&fixed).unwrap();
        assert_eq!(device.pipeline_count(), 0);
    }

    #[test]
    #[should_panic(expected = "submitted twice")]
    fn test_double_submit_panics() {
        let (_backend, device) = device();
        let list = device.open_context("once").close();
        device.submit(&list).unwrap();
        let _ = device.submit(&list);
    }
}
