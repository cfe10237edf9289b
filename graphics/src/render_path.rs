//! Reference forward rendering path.
//!
//! [`ForwardRenderPath`] is the composition root of the engine: it owns the
//! render targets, the [`ImageRenderer`] (and with it the pipeline cache) and
//! turns every frame into the same fixed list of passes:
//!
//! | Pass | Writes | Reads |
//! |------|--------|-------|
//! | `frame_setup` | frame constants | |
//! | `shadows` | shadow map | |
//! | `reflections` | reflection target | |
//! | `depth_prepass` | depth, depth copy | |
//! | `opaque` | depth, main color, normals | shadow map, reflection target |
//! | `post_process` | output (and MSAA resolve target) | main color |
//!
//! What gets drawn inside each pass is decided by a [`SceneRenderer`].

use std::sync::Arc;

use bytemuck::{Pod, Zeroable};

use crate::device::GraphicsDevice;
use crate::error::GraphicsError;
use crate::graph::{PassRecorder, PassResourceUsage, RenderGraph, ResourceState};
use crate::image::{ImageParams, ImageRenderer};
use crate::pipeline::{
    BlendMode, DEPTH_STENCIL_FORMAT, EXTENDED_RANGE_FORMAT, OutputEncoding, PipelineAxes,
    SamplingQuality, ShaderFamily, ShaderProvider, StencilMode, StencilRefMode,
};
use crate::resources::{Buffer, Texture};
use crate::scheduler::{FrameExecutor, FrameReport};
use crate::types::{BufferDescriptor, TextureDescriptor, TextureFormat, TextureUsage, Viewport};

/// Format of the scene normals target.
pub const NORMALS_FORMAT: TextureFormat = TextureFormat::Rgba8Unorm;
/// Format of the shadow map.
pub const SHADOW_MAP_FORMAT: TextureFormat = TextureFormat::Depth32Float;

/// Which part of the frame a [`SceneRenderer`] is asked to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScenePass {
    /// Per-frame uploads before any drawing.
    FrameSetup,
    /// Depth-only draws into the shadow map.
    Shadows,
    /// Scene draws into the reflection target.
    Reflections,
    /// Depth-only draws of opaque geometry.
    DepthOnly,
    /// Shaded opaque geometry.
    Opaque,
}

/// Records scene content into the passes of a [`ForwardRenderPath`].
///
/// Called concurrently from recording threads, one call per pass. Render
/// targets and viewport are already bound when [`render`](Self::render) runs.
pub trait SceneRenderer: Send + Sync {
    /// Record the draws of `pass`.
    fn render(&self, pass: ScenePass, recorder: &mut PassRecorder<'_>);
}

/// Configuration of a [`ForwardRenderPath`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderPathSettings {
    /// Internal resolution width.
    pub width: u32,
    /// Internal resolution height.
    pub height: u32,
    /// MSAA sample count of the scene targets.
    pub msaa_samples: u32,
    /// Whether the shadow map is rendered.
    pub shadows: bool,
    /// Whether planar reflections are rendered.
    pub reflections: bool,
    /// Edge length of the shadow map.
    pub shadow_map_size: u32,
}

impl Default for RenderPathSettings {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            msaa_samples: 1,
            shadows: true,
            reflections: true,
            shadow_map_size: 1024,
        }
    }
}

impl RenderPathSettings {
    /// Default settings at the given resolution.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    /// Set the MSAA sample count.
    pub fn with_msaa(mut self, samples: u32) -> Self {
        self.msaa_samples = samples;
        self
    }

    /// Enable or disable shadows.
    pub fn with_shadows(mut self, enabled: bool) -> Self {
        self.shadows = enabled;
        self
    }

    /// Enable or disable reflections.
    pub fn with_reflections(mut self, enabled: bool) -> Self {
        self.reflections = enabled;
        self
    }

    /// Set the shadow map size.
    pub fn with_shadow_map_size(mut self, size: u32) -> Self {
        self.shadow_map_size = size;
        self
    }

    /// Returns true if the scene targets are multisampled.
    pub fn is_multisampled(&self) -> bool {
        self.msaa_samples > 1
    }
}

/// Constants uploaded once per frame by `frame_setup`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct FrameConstants {
    /// Internal resolution.
    pub resolution: [f32; 2],
    /// Reciprocal of the internal resolution.
    pub inv_resolution: [f32; 2],
    /// Index of the frame.
    pub frame_index: u32,
    /// Padding to a 16-byte multiple.
    pub _padding: [u32; 3],
}

static_assertions::const_assert_eq!(std::mem::size_of::<FrameConstants>(), 32);

/// Resolution-dependent targets, recreated by [`ForwardRenderPath::resize`].
#[derive(Debug)]
pub struct RenderTargets {
    /// Scene depth/stencil buffer.
    pub depth: Arc<Texture>,
    /// Single-sample copy of the depth buffer, readable by shaders.
    pub depth_copy: Arc<Texture>,
    /// HDR scene color.
    pub main_color: Arc<Texture>,
    /// Scene normals.
    pub main_normals: Arc<Texture>,
    /// Single-sample resolve of `main_color` when MSAA is on.
    pub main_resolved: Option<Arc<Texture>>,
    /// Shadow map, when shadows are on.
    pub shadow_map: Option<Arc<Texture>>,
    /// Half-resolution reflection target, when reflections are on.
    pub reflection: Option<Arc<Texture>>,
    /// Final composited image.
    pub output: Arc<Texture>,
}

impl RenderTargets {
    /// The single-sample scene color read by post-processing.
    pub fn scene_read(&self) -> &Arc<Texture> {
        self.main_resolved.as_ref().unwrap_or(&self.main_color)
    }

    fn all(&self) -> impl Iterator<Item = &Arc<Texture>> {
        [&self.depth, &self.depth_copy, &self.main_color, &self.main_normals, &self.output]
            .into_iter()
            .chain(self.main_resolved.iter())
            .chain(self.shadow_map.iter())
            .chain(self.reflection.iter())
    }
}

fn create_target(
    device: &GraphicsDevice,
    label: &str,
    width: u32,
    height: u32,
    format: TextureFormat,
    usage: TextureUsage,
    samples: u32,
) -> Result<Arc<Texture>, GraphicsError> {
    device.create_texture(
        &TextureDescriptor::new_2d(width, height, format, usage)
            .with_label(label)
            .with_sample_count(samples),
    )
}

impl RenderTargets {
    fn create(device: &GraphicsDevice, settings: &RenderPathSettings) -> Result<Self, GraphicsError> {
        let (width, height) = (settings.width, settings.height);
        let samples = settings.msaa_samples;

        let depth = create_target(
            device,
            "depth",
            width,
            height,
            DEPTH_STENCIL_FORMAT,
            TextureUsage::DEPTH_STENCIL | TextureUsage::SHADER_RESOURCE | TextureUsage::COPY_SRC,
            samples,
        )?;
        let depth_copy = if settings.is_multisampled() {
            create_target(
                device,
                "depth_copy",
                width,
                height,
                TextureFormat::R32Float,
                TextureUsage::UNORDERED_ACCESS | TextureUsage::SHADER_RESOURCE,
                1,
            )?
        } else {
            create_target(
                device,
                "depth_copy",
                width,
                height,
                DEPTH_STENCIL_FORMAT,
                TextureUsage::COPY_DST | TextureUsage::SHADER_RESOURCE,
                1,
            )?
        };

        let mut color_usage = TextureUsage::RENDER_TARGET | TextureUsage::SHADER_RESOURCE;
        if settings.is_multisampled() {
            color_usage |= TextureUsage::COPY_SRC;
        } else {
            color_usage |= TextureUsage::UNORDERED_ACCESS;
        }
        let main_color = create_target(
            device,
            "main_color",
            width,
            height,
            EXTENDED_RANGE_FORMAT,
            color_usage,
            samples,
        )?;
        let main_normals =
            create_target(device, "main_normals", width, height, NORMALS_FORMAT, color_usage, samples)?;
        let main_resolved = if settings.is_multisampled() {
            Some(create_target(
                device,
                "main_resolved",
                width,
                height,
                EXTENDED_RANGE_FORMAT,
                TextureUsage::RENDER_TARGET
                    | TextureUsage::SHADER_RESOURCE
                    | TextureUsage::UNORDERED_ACCESS
                    | TextureUsage::COPY_DST,
                1,
            )?)
        } else {
            None
        };

        let shadow_map = if settings.shadows {
            Some(create_target(
                device,
                "shadow_map",
                settings.shadow_map_size,
                settings.shadow_map_size,
                SHADOW_MAP_FORMAT,
                TextureUsage::DEPTH_STENCIL | TextureUsage::SHADER_RESOURCE,
                1,
            )?)
        } else {
            None
        };
        let reflection = if settings.reflections {
            Some(create_target(
                device,
                "reflection",
                (width / 2).max(1),
                (height / 2).max(1),
                EXTENDED_RANGE_FORMAT,
                TextureUsage::RENDER_TARGET | TextureUsage::SHADER_RESOURCE,
                1,
            )?)
        } else {
            None
        };

        let output = create_target(
            device,
            "output",
            width,
            height,
            device.back_buffer_format(),
            TextureUsage::RENDER_TARGET | TextureUsage::SHADER_RESOURCE | TextureUsage::COPY_SRC,
            1,
        )?;

        Ok(Self {
            depth,
            depth_copy,
            main_color,
            main_normals,
            main_resolved,
            shadow_map,
            reflection,
            output,
        })
    }
}

/// The fixed forward frame.
///
/// # Example
///
/// ```ignore
/// let shaders = MapShaderProvider::image_shaders(executor.device())?;
/// let mut path = ForwardRenderPath::new(
///     &mut executor,
///     &shaders,
///     &ForwardRenderPath::pipeline_axes(),
///     RenderPathSettings::new(1920, 1080).with_msaa(4),
/// )?;
/// let report = path.render(&mut executor, &scene)?;
/// ```
#[derive(Debug)]
pub struct ForwardRenderPath {
    settings: RenderPathSettings,
    targets: RenderTargets,
    image: ImageRenderer,
    frame_constants: Arc<Buffer>,
}

impl ForwardRenderPath {
    /// Pipeline axes covering every image draw the path records itself.
    pub fn pipeline_axes() -> PipelineAxes {
        PipelineAxes::new()
            .with_shader_families(&[ShaderFamily::Image, ShaderFamily::Fullscreen])
            .with_blend_modes(&[BlendMode::Alpha, BlendMode::Premultiplied, BlendMode::Opaque])
            .with_stencil_modes(&[StencilMode::Disabled])
            .with_stencil_ref_modes(&[StencilRefMode::All])
            .with_output_encodings(&[OutputEncoding::Standard, OutputEncoding::ExtendedRange])
            .with_sampling_qualities(&[SamplingQuality::Simple])
    }

    fn composite_params() -> ImageParams {
        ImageParams::fullscreen().with_blend(BlendMode::Opaque)
    }

    /// Build the pipeline tables and create the targets for `settings`.
    ///
    /// # Errors
    ///
    /// Returns [`GraphicsError::PipelineBuild`] if `axes` do not cover the
    /// composite draw or a shader is missing, and the device error if a
    /// target cannot be created.
    pub fn new(
        executor: &mut FrameExecutor,
        shaders: &dyn ShaderProvider,
        axes: &PipelineAxes,
        settings: RenderPathSettings,
    ) -> Result<Self, GraphicsError> {
        let composite = Self::composite_params().pipeline_key();
        if !axes.contains(&composite) {
            return Err(GraphicsError::PipelineBuild(format!(
                "pipeline axes do not cover the composite draw {composite:?}"
            )));
        }

        let device = Arc::clone(executor.device());
        let mut image = ImageRenderer::new(&device, shaders, axes)?;
        image.set_screen_size(settings.width, settings.height);
        let frame_constants = device.create_buffer(
            &BufferDescriptor::constants::<FrameConstants>().with_label("frame constants"),
        )?;
        let targets = RenderTargets::create(&device, &settings)?;
        register_targets(executor, &targets);

        log::info!(
            "ForwardRenderPath: {}x{} msaa={} shadows={} reflections={}",
            settings.width,
            settings.height,
            settings.msaa_samples,
            settings.shadows,
            settings.reflections
        );

        Ok(Self {
            settings,
            targets,
            image,
            frame_constants,
        })
    }

    /// Current settings.
    pub fn settings(&self) -> &RenderPathSettings {
        &self.settings
    }

    /// Current render targets.
    pub fn targets(&self) -> &RenderTargets {
        &self.targets
    }

    /// The image renderer used for compositing.
    pub fn image_renderer(&self) -> &ImageRenderer {
        &self.image
    }

    /// Recreate the targets for new settings.
    ///
    /// Old targets are dropped from the state record and released once
    /// nothing else holds them.
    ///
    /// # Errors
    ///
    /// Returns the device error if a target cannot be created; the old
    /// targets stay in place in that case.
    pub fn resize(
        &mut self,
        executor: &mut FrameExecutor,
        settings: RenderPathSettings,
    ) -> Result<(), GraphicsError> {
        let targets = RenderTargets::create(executor.device(), &settings)?;
        for texture in self.targets.all() {
            executor.tracker_mut().forget(texture);
        }
        register_targets(executor, &targets);
        self.targets = targets;
        executor.device().cleanup_dead_resources();
        self.settings = settings;
        self.image.set_screen_size(settings.width, settings.height);
        log::debug!(
            "ForwardRenderPath: resized to {}x{}",
            settings.width,
            settings.height
        );
        Ok(())
    }

    /// Build the pass graph of one frame.
    pub fn build_frame<'a>(
        &'a self,
        scene: &'a dyn SceneRenderer,
        frame_index: u64,
    ) -> RenderGraph<'a> {
        let settings = self.settings;
        let targets = &self.targets;
        let mut graph = RenderGraph::new();

        let frame_constants = &self.frame_constants;
        graph.add_pass("frame_setup", PassResourceUsage::new(), move |rec| {
            let constants = FrameConstants {
                resolution: [settings.width as f32, settings.height as f32],
                inv_resolution: [1.0 / settings.width as f32, 1.0 / settings.height as f32],
                frame_index: frame_index as u32,
                _padding: [0; 3],
            };
            rec.context().update_buffer(frame_constants, &constants);
            scene.render(ScenePass::FrameSetup, rec);
        });

        let mut usage = PassResourceUsage::new();
        if let Some(shadow_map) = &targets.shadow_map {
            usage = usage
                .write(shadow_map, ResourceState::DepthWrite)
                .release(shadow_map, ResourceState::ShaderResource);
        }
        graph.add_pass("shadows", usage, move |rec| {
            let Some(shadow_map) = &targets.shadow_map else {
                return;
            };
            let ctx = rec.context();
            let range = ctx.begin_range("Shadow Maps");
            ctx.bind_render_targets(&[], Some(shadow_map.id()));
            ctx.clear_depth_stencil(shadow_map, 1.0, 0);
            ctx.bind_viewport(Viewport::from_size(shadow_map.width(), shadow_map.height()));
            scene.render(ScenePass::Shadows, rec);
            rec.context().end_range(range);
        });

        let mut usage = PassResourceUsage::new();
        if let Some(reflection) = &targets.reflection {
            usage = usage
                .write(reflection, ResourceState::RenderTarget)
                .release(reflection, ResourceState::ShaderResource);
        }
        graph.add_pass("reflections", usage, move |rec| {
            let Some(reflection) = &targets.reflection else {
                return;
            };
            let ctx = rec.context();
            let range = ctx.begin_range("Planar Reflections");
            ctx.bind_render_targets(&[reflection.id()], None);
            ctx.clear_render_target(reflection, [0.0; 4]);
            ctx.bind_viewport(Viewport::from_size(reflection.width(), reflection.height()));
            scene.render(ScenePass::Reflections, rec);
            rec.context().end_range(range);
        });

        let copy_state = if settings.is_multisampled() {
            ResourceState::UnorderedAccess
        } else {
            ResourceState::CopyDest
        };
        let usage = PassResourceUsage::new()
            .write(&targets.depth, ResourceState::DepthWrite)
            .release(&targets.depth, ResourceState::DepthRead)
            .write(&targets.depth_copy, copy_state)
            .release(&targets.depth_copy, ResourceState::ShaderResource);
        graph.add_pass("depth_prepass", usage, move |rec| {
            let depth = &targets.depth;
            let ctx = rec.context();
            let range = ctx.begin_range("Z-Prepass");
            ctx.bind_render_targets(&[], Some(depth.id()));
            ctx.clear_depth_stencil(depth, 0.0, 0);
            ctx.bind_viewport(Viewport::from_size(depth.width(), depth.height()));
            scene.render(ScenePass::DepthOnly, rec);
            let ctx = rec.context();
            ctx.bind_render_targets(&[], None);
            ctx.end_range(range);

            if settings.is_multisampled() {
                rec.transition(
                    depth,
                    ResourceState::DepthWrite,
                    ResourceState::NonPixelShaderResource,
                );
                rec.context().resolve_texture(depth, &targets.depth_copy);
                rec.transition(
                    depth,
                    ResourceState::NonPixelShaderResource,
                    ResourceState::DepthRead,
                );
            } else {
                rec.transition(depth, ResourceState::DepthWrite, ResourceState::CopySource);
                rec.context().copy_texture(depth, &targets.depth_copy);
                rec.transition(depth, ResourceState::CopySource, ResourceState::DepthRead);
            }
        });

        let mut usage = PassResourceUsage::new()
            .write(&targets.depth, ResourceState::DepthWrite)
            .release(&targets.depth, ResourceState::DepthRead)
            .write(&targets.main_color, ResourceState::RenderTarget)
            .write(&targets.main_normals, ResourceState::RenderTarget);
        if let Some(shadow_map) = &targets.shadow_map {
            usage = usage.read(shadow_map, ResourceState::ShaderResource);
        }
        if let Some(reflection) = &targets.reflection {
            usage = usage.read(reflection, ResourceState::ShaderResource);
        }
        graph.add_pass("opaque", usage, move |rec| {
            let ctx = rec.context();
            let range = ctx.begin_range("Opaque Scene");
            ctx.bind_render_targets(
                &[targets.main_color.id(), targets.main_normals.id()],
                Some(targets.depth.id()),
            );
            ctx.clear_render_target(&targets.main_normals, [0.0; 4]);
            ctx.bind_viewport(Viewport::from_size(settings.width, settings.height));
            if let Some(shadow_map) = &targets.shadow_map {
                ctx.bind_resource(OPAQUE_SHADOW_SLOT, shadow_map);
            }
            if let Some(reflection) = &targets.reflection {
                ctx.bind_resource(OPAQUE_REFLECTION_SLOT, reflection);
            }
            scene.render(ScenePass::Opaque, rec);
            rec.context().end_range(range);
        });

        let image = &self.image;
        let mut usage = PassResourceUsage::new()
            .write(&targets.output, ResourceState::RenderTarget)
            .release(&targets.output, ResourceState::Present);
        usage = match &targets.main_resolved {
            Some(resolved) => usage
                .read(&targets.main_color, ResourceState::CopySource)
                .write(resolved, ResourceState::CopyDest)
                .release(resolved, ResourceState::ShaderResource),
            None => usage.read(&targets.main_color, ResourceState::ShaderResource),
        };
        graph.add_pass("post_process", usage, move |rec| {
            let range = rec.context().begin_range("Post Process");
            if let Some(resolved) = &targets.main_resolved {
                rec.context().resolve_texture(&targets.main_color, resolved);
                rec.transition(resolved, ResourceState::CopyDest, ResourceState::ShaderResource);
            }
            let ctx = rec.context();
            ctx.bind_render_targets(&[targets.output.id()], None);
            ctx.bind_viewport(Viewport::from_size(settings.width, settings.height));
            image.draw(ctx, targets.scene_read(), &Self::composite_params());
            ctx.end_range(range);
        });

        graph
    }

    /// Record and submit one frame.
    ///
    /// # Errors
    ///
    /// Propagates submission failures from the executor.
    pub fn render(
        &self,
        executor: &mut FrameExecutor,
        scene: &dyn SceneRenderer,
    ) -> Result<FrameReport, GraphicsError> {
        cinder_core::profile_function!();
        let graph = self.build_frame(scene, executor.frame_index());
        executor.execute(graph)
    }
}

/// Shader slot of the shadow map in the opaque pass.
pub const OPAQUE_SHADOW_SLOT: u32 = 4;
/// Shader slot of the reflection target in the opaque pass.
pub const OPAQUE_REFLECTION_SLOT: u32 = 5;

fn register_targets(executor: &mut FrameExecutor, targets: &RenderTargets) {
    let tracker = executor.tracker_mut();
    tracker.register(&targets.depth, ResourceState::DepthRead);
    tracker.register(&targets.depth_copy, ResourceState::ShaderResource);
    tracker.register(&targets.main_color, ResourceState::ShaderResource);
    tracker.register(&targets.main_normals, ResourceState::ShaderResource);
    tracker.register(&targets.output, ResourceState::Undefined);
    for texture in [&targets.main_resolved, &targets.shadow_map, &targets.reflection]
        .into_iter()
        .flatten()
    {
        tracker.register(texture, ResourceState::ShaderResource);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::DummyBackend;
    use crate::command::Command;
    use crate::device::DeviceParameters;
    use crate::pipeline::MapShaderProvider;
    use crate::scheduler::ExecutorParameters;

    struct NoScene;

    impl SceneRenderer for NoScene {
        fn render(&self, _pass: ScenePass, _recorder: &mut PassRecorder<'_>) {}
    }

    fn setup(settings: RenderPathSettings) -> (Arc<DummyBackend>, FrameExecutor, ForwardRenderPath) {
        let backend = Arc::new(DummyBackend::new());
        let device = GraphicsDevice::new(
            backend.clone(),
            DeviceParameters::new().with_gpu_profiling(true),
        );
        let mut executor =
            FrameExecutor::new(device.clone(), ExecutorParameters::new().with_worker_threads(2))
                .unwrap();
        let shaders = MapShaderProvider::image_shaders(&device).unwrap();
        let path = ForwardRenderPath::new(
            &mut executor,
            &shaders,
            &ForwardRenderPath::pipeline_axes(),
            settings,
        )
        .unwrap();
        (backend, executor, path)
    }

    #[test]
    fn test_pass_order() {
        let (_, _executor, path) = setup(RenderPathSettings::new(64, 64));
        let graph = path.build_frame(&NoScene, 0);
        let names: Vec<_> = graph.pass_names().collect();
        assert_eq!(
            names,
            [
                "frame_setup",
                "shadows",
                "reflections",
                "depth_prepass",
                "opaque",
                "post_process"
            ]
        );
    }

    #[test]
    fn test_depth_ends_frame_in_depth_read() {
        let (_, mut executor, path) = setup(RenderPathSettings::new(64, 64));
        path.render(&mut executor, &NoScene).unwrap();
        let depth = &path.targets().depth;
        assert_eq!(executor.tracker().state(depth), Some(ResourceState::DepthRead));
        assert_eq!(
            executor.tracker().state(&path.targets().output),
            Some(ResourceState::Present)
        );
    }

    #[test]
    fn test_prepass_copies_depth_without_msaa() {
        let (backend, mut executor, path) = setup(RenderPathSettings::new(64, 64));
        path.render(&mut executor, &NoScene).unwrap();
        let submissions = backend.submissions();
        let prepass = &submissions[3].list;
        assert_eq!(prepass.name(), "depth_prepass");
        assert!(prepass.commands().contains(&Command::CopyTexture {
            src: path.targets().depth.id(),
            dst: path.targets().depth_copy.id(),
        }));
        assert!(prepass.commands().contains(&Command::BeginRange("Z-Prepass".to_string())));
    }

    #[test]
    fn test_msaa_resolves_depth_and_color() {
        let (backend, mut executor, path) =
            setup(RenderPathSettings::new(64, 64).with_msaa(4));
        assert!(path.targets().main_resolved.is_some());
        path.render(&mut executor, &NoScene).unwrap();
        let submissions = backend.submissions();
        let targets = path.targets();
        assert!(submissions[3].list.commands().contains(&Command::ResolveTexture {
            src: targets.depth.id(),
            dst: targets.depth_copy.id(),
        }));
        let resolved = targets.main_resolved.as_ref().unwrap();
        assert!(submissions[5].list.commands().contains(&Command::ResolveTexture {
            src: targets.main_color.id(),
            dst: resolved.id(),
        }));
        assert!(Arc::ptr_eq(targets.scene_read(), resolved));
    }

    #[test]
    fn test_disabled_features_record_nothing() {
        let (backend, mut executor, path) = setup(
            RenderPathSettings::new(32, 32)
                .with_shadows(false)
                .with_reflections(false),
        );
        assert!(path.targets().shadow_map.is_none());
        path.render(&mut executor, &NoScene).unwrap();
        let submissions = backend.submissions();
        assert!(submissions[1].list.is_empty());
        assert!(submissions[2].list.is_empty());
    }

    #[test]
    fn test_resize_replaces_targets() {
        let (_, mut executor, mut path) = setup(RenderPathSettings::new(64, 64));
        let old_depth = path.targets().depth.id();
        path.resize(&mut executor, RenderPathSettings::new(128, 32))
            .unwrap();
        assert!(!executor.tracker().is_tracked(&old_depth));
        assert_eq!(path.targets().depth.width(), 128);
        assert_eq!(
            executor.tracker().state(&path.targets().depth),
            Some(ResourceState::DepthRead)
        );
        path.render(&mut executor, &NoScene).unwrap();
    }

    #[test]
    fn test_resize_prunes_device_tracking() {
        let (_, mut executor, mut path) = setup(RenderPathSettings::new(64, 64));
        let textures = executor.device().texture_count();
        for size in [32, 48, 96] {
            path.resize(&mut executor, RenderPathSettings::new(size, size))
                .unwrap();
            assert_eq!(executor.device().cleanup_dead_resources(), 0);
            assert_eq!(executor.device().texture_count(), textures);
        }
    }

    #[test]
    fn test_axes_without_composite_are_rejected() {
        let device = GraphicsDevice::new(Arc::new(DummyBackend::new()), DeviceParameters::new());
        let mut executor =
            FrameExecutor::new(device.clone(), ExecutorParameters::new().with_worker_threads(1))
                .unwrap();
        let shaders = MapShaderProvider::image_shaders(&device).unwrap();
        let err = ForwardRenderPath::new(
            &mut executor,
            &shaders,
            &PipelineAxes::new(),
            RenderPathSettings::new(16, 16),
        )
        .unwrap_err();
        assert!(matches!(err, GraphicsError::PipelineBuild(_)));
    }
}
