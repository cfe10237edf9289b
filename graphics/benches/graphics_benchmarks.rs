use std::sync::Arc;

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use cinder_graphics::{
    BufferDescriptor, BufferUsage, DeviceParameters, DummyBackend, ExecutorParameters,
    FrameExecutor, ForwardRenderPath, GraphicsDevice, MapShaderProvider, PassRecorder,
    PassResourceUsage, PipelineAxes, PipelineCache, RenderGraph, RenderPathSettings, ResourceId,
    ResourceState, ResourceStateTracker, ScenePass, SceneRenderer, TextureDescriptor,
    TextureFormat, TextureUsage,
};

fn dummy_device() -> (Arc<DummyBackend>, Arc<GraphicsDevice>) {
    let backend = Arc::new(DummyBackend::new());
    let device = GraphicsDevice::new(backend.clone(), DeviceParameters::new());
    (backend, device)
}

// ---------------------------------------------------------------------------
// Pipeline cache
// ---------------------------------------------------------------------------

fn bench_pipeline_cache_build(c: &mut Criterion) {
    let (_backend, device) = dummy_device();
    let shaders = MapShaderProvider::image_shaders(&device).unwrap();
    let axes = PipelineAxes::full();

    c.bench_function("pipeline_cache_build_full", |b| {
        b.iter(|| black_box(PipelineCache::build(&device, &shaders, &axes).unwrap()));
    });
}

fn bench_pipeline_lookup(c: &mut Criterion) {
    let (_backend, device) = dummy_device();
    let shaders = MapShaderProvider::image_shaders(&device).unwrap();
    let axes = PipelineAxes::full();
    let cache = PipelineCache::build(&device, &shaders, &axes).unwrap();
    let keys: Vec<_> = axes.keys().collect();

    c.bench_function("pipeline_lookup_all_keys", |b| {
        b.iter(|| {
            for key in &keys {
                black_box(cache.lookup(key));
            }
        });
    });
}

// ---------------------------------------------------------------------------
// State tracking
// ---------------------------------------------------------------------------

fn bench_tracker_transitions(c: &mut Criterion) {
    let (_backend, device) = dummy_device();
    let resources: Vec<ResourceId> = (0..64).map(|_| ResourceId::new()).collect();

    c.bench_function("tracker_transition_64_resources", |b| {
        b.iter(|| {
            let mut tracker = ResourceStateTracker::new();
            for id in &resources {
                tracker.register(id, ResourceState::ShaderResource);
            }
            let mut ctx = device.open_context("bench");
            for id in &resources {
                tracker.transition_to(id, ResourceState::RenderTarget, &mut ctx);
                tracker.transition_to(id, ResourceState::ShaderResource, &mut ctx);
            }
            black_box(ctx.close());
        });
    });
}

// ---------------------------------------------------------------------------
// Frame execution
// ---------------------------------------------------------------------------

fn bench_execute_independent_passes(c: &mut Criterion) {
    let (backend, device) = dummy_device();
    let mut executor = FrameExecutor::new(device.clone(), ExecutorParameters::new()).unwrap();
    let targets: Vec<_> = (0..16)
        .map(|i| {
            let texture = device
                .create_texture(
                    &TextureDescriptor::new_2d(
                        256,
                        256,
                        TextureFormat::Rgba8Unorm,
                        TextureUsage::RENDER_TARGET | TextureUsage::SHADER_RESOURCE,
                    )
                    .with_label(format!("target_{i}")),
                )
                .unwrap();
            executor
                .tracker_mut()
                .register(&texture, ResourceState::ShaderResource);
            texture
        })
        .collect();

    c.bench_function("execute_16_passes", |b| {
        b.iter(|| {
            let mut graph = RenderGraph::new();
            for (i, target) in targets.iter().enumerate() {
                graph.add_pass(
                    format!("pass_{i}"),
                    PassResourceUsage::new()
                        .write(target, ResourceState::RenderTarget)
                        .release(target, ResourceState::ShaderResource),
                    move |rec| {
                        let ctx = rec.context();
                        ctx.clear_render_target(target, [0.0; 4]);
                        for _ in 0..32 {
                            ctx.draw(3, 0);
                        }
                    },
                );
            }
            black_box(executor.execute(graph).unwrap());
            backend.clear_submissions();
        });
    });
}

struct CubeScene;

impl SceneRenderer for CubeScene {
    fn render(&self, pass: ScenePass, recorder: &mut PassRecorder<'_>) {
        if matches!(pass, ScenePass::Opaque | ScenePass::DepthOnly) {
            for i in 0..64 {
                recorder.context().draw_indexed(36, 0, i);
            }
        }
    }
}

fn bench_forward_frame(c: &mut Criterion) {
    let (backend, device) = dummy_device();
    let mut executor = FrameExecutor::new(device.clone(), ExecutorParameters::new()).unwrap();
    let shaders = MapShaderProvider::image_shaders(&device).unwrap();
    let path = ForwardRenderPath::new(
        &mut executor,
        &shaders,
        &ForwardRenderPath::pipeline_axes(),
        RenderPathSettings::new(1280, 720).with_msaa(4),
    )
    .unwrap();

    c.bench_function("forward_frame_msaa4", |b| {
        b.iter(|| {
            black_box(path.render(&mut executor, &CubeScene).unwrap());
            backend.clear_submissions();
        });
    });
}

// ---------------------------------------------------------------------------
// Dummy backend resource creation
// ---------------------------------------------------------------------------

fn bench_dummy_create_buffer(c: &mut Criterion) {
    let (_backend, device) = dummy_device();

    c.bench_function("dummy_create_buffer_1kb", |b| {
        b.iter(|| {
            black_box(
                device
                    .create_buffer(&BufferDescriptor::new(1024, BufferUsage::VERTEX))
                    .unwrap(),
            );
        });
    });
}

criterion_group!(
    benches,
    bench_pipeline_cache_build,
    bench_pipeline_lookup,
    bench_tracker_transitions,
    bench_execute_independent_passes,
    bench_forward_frame,
    bench_dummy_create_buffer,
);
criterion_main!(benches);
