//! Frame-graph integration tests.
//!
//! These tests drive the public API end to end against the dummy backend and
//! check what was submitted: barrier placement, submission order, pipeline
//! table contents and the fatal usage-error paths.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p cinder-graphics --test frame_graph_tests
//! ```

mod common;

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use rstest::rstest;

use cinder_graphics::command::Command;
use cinder_graphics::graph::StateTransition;
use cinder_graphics::pipeline::{
    BlendMode, DEPTH_STENCIL_FORMAT, PipelineAxis, SamplingQuality, ShaderFamily, StencilMode,
};
use cinder_graphics::scheduler::FrameState;
use cinder_graphics::{
    BufferDescriptor, BufferUsage, DeviceParameters, DummyBackend, ForwardRenderPath, GpuObject,
    GpuObjectKind, GraphicsError, ImageParams, MapShaderProvider, PassRecorder, PassResourceUsage,
    PipelineAxes, PipelineCache, PipelineKey, RenderGraph, RenderPathSettings, ResourceId,
    ResourceState, ResourceStateTracker, ScenePass, SceneRenderer,
};
use common::TestContext;

// ============================================================================
// Barrier Counting
// ============================================================================

fn state_changes(states: &[ResourceState]) -> usize {
    states.windows(2).filter(|w| w[0] != w[1]).count()
}

/// Walking a resource through a state sequence emits one barrier per change.
#[rstest]
#[case::round_trip(&[ResourceState::ShaderResource, ResourceState::RenderTarget, ResourceState::ShaderResource])]
#[case::no_change(&[ResourceState::ShaderResource, ResourceState::ShaderResource, ResourceState::ShaderResource])]
#[case::depth(&[ResourceState::DepthRead, ResourceState::DepthWrite, ResourceState::DepthWrite, ResourceState::DepthRead])]
#[case::copy_chain(&[ResourceState::Undefined, ResourceState::CopyDest, ResourceState::CopySource, ResourceState::ShaderResource])]
fn test_tracker_barrier_count(#[case] states: &[ResourceState]) {
    let ctx = TestContext::new(1);
    let resource = ResourceId::new();
    let mut tracker = ResourceStateTracker::new();
    tracker.register(&resource, states[0]);

    let mut context = ctx.device.open_context("sequence");
    for pair in states.windows(2) {
        tracker.transition(&resource, pair[0], pair[1], &mut context);
    }
    let list = context.close();

    assert_eq!(list.barrier_count(), state_changes(states));
    assert_eq!(tracker.state(&resource), states.last().copied());
}

/// Passes declaring a resource in a sequence of states get one entry
/// transition per change, each placed in the pass that needs it.
#[rstest]
#[case::single_worker(1)]
#[case::four_workers(4)]
fn test_frame_barrier_count(#[case] workers: usize) {
    let mut ctx = TestContext::new(workers);
    let states = [
        ResourceState::RenderTarget,
        ResourceState::ShaderResource,
        ResourceState::ShaderResource,
        ResourceState::CopySource,
    ];
    let target = ctx.tracked_target("target", ResourceState::ShaderResource);

    let mut graph = RenderGraph::new();
    for (i, &state) in states.iter().enumerate() {
        let usage = if state.is_write() {
            PassResourceUsage::new().write(&target, state)
        } else {
            PassResourceUsage::new().read(&target, state)
        };
        graph.add_pass(format!("pass_{i}"), usage, |_| {});
    }
    let report = ctx.executor.execute(graph).unwrap();

    let mut all = vec![ResourceState::ShaderResource];
    all.extend(states);
    assert_eq!(report.transition_count(), state_changes(&all));
    assert_eq!(report.passes[2].barrier_count, 0);
    assert_eq!(
        ctx.executor.tracker().state(&target),
        Some(ResourceState::CopySource)
    );
}

/// A transition to the state already held emits nothing.
#[test]
fn test_transition_idempotence() {
    let ctx = TestContext::new(1);
    let resource = ResourceId::new();
    let mut tracker = ResourceStateTracker::new();
    tracker.register(&resource, ResourceState::DepthRead);

    let mut context = ctx.device.open_context("idempotent");
    assert!(!tracker.transition(
        &resource,
        ResourceState::DepthRead,
        ResourceState::DepthRead,
        &mut context
    ));
    assert!(!tracker.transition_to(&resource, ResourceState::DepthRead, &mut context));
    assert!(context.close().is_empty());
}

// ============================================================================
// Hazards
// ============================================================================

/// Pass A writes X, pass B reads X: B starts with exactly one barrier
/// moving X from A's state into B's.
#[test]
fn test_write_then_read_hazard() {
    let mut ctx = TestContext::new(2);
    let x = ctx.tracked_target("x", ResourceState::RenderTarget);

    let mut graph = RenderGraph::new();
    graph.add_pass(
        "a",
        PassResourceUsage::new().write(&x, ResourceState::RenderTarget),
        |rec| rec.context().clear_render_target(&x, [1.0; 4]),
    );
    graph.add_pass(
        "b",
        PassResourceUsage::new().read(&x, ResourceState::ShaderResource),
        |rec| rec.context().bind_resource(0, &x),
    );
    ctx.executor.execute(graph).unwrap();

    let submissions = ctx.backend.submissions();
    assert_eq!(submissions[0].list.barrier_count(), 0);
    let b = &submissions[1].list;
    assert_eq!(b.barrier_count(), 1);
    assert_eq!(
        b.commands()[0],
        Command::Barrier(vec![StateTransition::new(
            x.id(),
            ResourceState::RenderTarget,
            ResourceState::ShaderResource
        )])
    );
}

/// Constant uploads need neither a registration nor a declaration.
#[test]
fn test_constant_upload_outside_tracking() {
    let mut ctx = TestContext::new(2);
    let constants = ctx
        .device
        .create_buffer(&BufferDescriptor::new(16, BufferUsage::CONSTANT))
        .unwrap();

    let mut graph = RenderGraph::new();
    graph.add_pass("setup", PassResourceUsage::new(), |rec| {
        rec.context().update_buffer(&constants, &[0.5f32; 4]);
    });
    let report = ctx.executor.execute(graph).unwrap();

    assert!(!ctx.executor.tracker().is_tracked(&constants));
    assert_eq!(report.barrier_count(), 0);
    assert!(matches!(
        &ctx.backend.submissions()[0].list.commands()[0],
        Command::UpdateBuffer { buffer, data } if *buffer == constants.id() && data.len() == 16
    ));
}

/// Two passes writing the same resource in different states: the second
/// write is ordered behind the first by its entry barrier.
#[test]
fn test_write_after_write_hazard() {
    let mut ctx = TestContext::new(2);
    let depth = ctx.tracked_depth("depth", ResourceState::DepthRead);

    let mut graph = RenderGraph::new();
    graph.add_pass(
        "prepass",
        PassResourceUsage::new()
            .write(&depth, ResourceState::DepthWrite)
            .release(&depth, ResourceState::DepthRead),
        |_| {},
    );
    graph.add_pass(
        "opaque",
        PassResourceUsage::new()
            .write(&depth, ResourceState::DepthWrite)
            .release(&depth, ResourceState::DepthRead),
        |_| {},
    );
    let report = ctx.executor.execute(graph).unwrap();

    // Entry and closing barrier in each pass.
    assert_eq!(report.pass("prepass").unwrap().barrier_count, 2);
    assert_eq!(report.pass("opaque").unwrap().barrier_count, 2);
    assert_eq!(
        ctx.executor.tracker().state(&depth),
        Some(ResourceState::DepthRead)
    );
}

/// In-body transitions and the closing barrier compose: the closing barrier
/// only moves what the body left out of the exit state.
#[test]
fn test_body_transitions_reach_exit_state() {
    let mut ctx = TestContext::new(2);
    let depth = ctx.tracked_depth("depth", ResourceState::DepthRead);
    let copy = ctx.tracked_target("copy", ResourceState::ShaderResource);

    let mut graph = RenderGraph::new();
    graph.add_pass(
        "depth_prepass",
        PassResourceUsage::new()
            .write(&depth, ResourceState::DepthWrite)
            .release(&depth, ResourceState::DepthRead)
            .write(&copy, ResourceState::CopyDest)
            .release(&copy, ResourceState::ShaderResource),
        |rec| {
            rec.transition(&depth, ResourceState::DepthWrite, ResourceState::CopySource);
            rec.context().copy_texture(&depth, &copy);
            rec.transition(&depth, ResourceState::CopySource, ResourceState::DepthRead);
            assert_eq!(rec.state(&depth), ResourceState::DepthRead);
        },
    );
    let report = ctx.executor.execute(graph).unwrap();

    // Entry, two in-body, closing (copy only).
    let pass = report.pass("depth_prepass").unwrap();
    assert_eq!(pass.barrier_count, 4);
    assert_eq!(pass.transition_count, 5);
    let list = &ctx.backend.submissions()[0].list;
    assert_eq!(
        list.commands().last(),
        Some(&Command::Barrier(vec![StateTransition::new(
            copy.id(),
            ResourceState::CopyDest,
            ResourceState::ShaderResource
        )]))
    );
}

// ============================================================================
// Submission Order
// ============================================================================

/// The first pass finishes recording last, yet is still submitted first.
#[test]
fn test_submission_order_under_reordered_completion() {
    let mut ctx = TestContext::new(4);

    let mut graph = RenderGraph::new();
    graph.add_pass("slow", PassResourceUsage::new(), |rec| {
        thread::sleep(Duration::from_millis(100));
        rec.context().draw(3, 0);
    });
    for name in ["fast_a", "fast_b", "fast_c"] {
        graph.add_pass(name, PassResourceUsage::new(), |rec| rec.context().draw(3, 0));
    }
    let report = ctx.executor.execute(graph).unwrap();

    let names: Vec<_> = ctx
        .backend
        .submissions()
        .iter()
        .map(|s| s.list.name().to_string())
        .collect();
    assert_eq!(names, ["slow", "fast_a", "fast_b", "fast_c"]);

    let slow = report.pass("slow").unwrap();
    assert!(report.passes[1..]
        .iter()
        .all(|p| p.close_sequence < slow.close_sequence));
    assert!(report
        .passes
        .windows(2)
        .all(|w| w[0].submission < w[1].submission));
    assert_eq!(
        report.completion_ticket(),
        Some(report.passes[3].submission)
    );
}

/// A rejected submission leaves the record at the states the queue actually
/// reached: exit states of accepted lists only.
#[rstest]
#[case::first_list_rejected(0)]
#[case::second_list_rejected(1)]
#[case::last_list_rejected(2)]
fn test_rejected_submission_rolls_back_unsubmitted_passes(#[case] accepted: u64) {
    let mut ctx = TestContext::with_backend(
        4,
        DummyBackend::new().with_submit_failure_after(accepted),
        DeviceParameters::new(),
    );
    let targets: Vec<_> = (0..3)
        .map(|i| ctx.tracked_target(&format!("target_{i}"), ResourceState::ShaderResource))
        .collect();

    let mut graph = RenderGraph::new();
    for (i, target) in targets.iter().enumerate() {
        graph.add_pass(
            format!("pass_{i}"),
            PassResourceUsage::new().write(target, ResourceState::RenderTarget),
            |rec| rec.context().draw(3, 0),
        );
    }
    let err = ctx.executor.execute(graph).unwrap_err();

    assert_eq!(err, GraphicsError::DeviceLost);
    assert_eq!(ctx.backend.submissions().len(), accepted as usize);
    for (i, target) in targets.iter().enumerate() {
        let expected = if (i as u64) < accepted {
            ResourceState::RenderTarget
        } else {
            ResourceState::ShaderResource
        };
        assert_eq!(ctx.executor.tracker().state(target), Some(expected));
    }
    assert_eq!(ctx.executor.frame_state(), FrameState::Idle);
}

/// Passes can fork nested work on the job system.
#[test]
fn test_nested_jobs_inside_pass() {
    let mut ctx = TestContext::new(3);
    let counter = AtomicUsize::new(0);

    let mut graph = RenderGraph::new();
    graph.add_pass("fan_out", PassResourceUsage::new(), |rec| {
        rec.jobs().scope(|s| {
            for _ in 0..8 {
                s.execute(|| {
                    counter.fetch_add(1, Ordering::Relaxed);
                });
            }
        });
        rec.context().dispatch(8, 1, 1);
    });
    ctx.executor.execute(graph).unwrap();

    assert_eq!(counter.load(Ordering::Relaxed), 8);
}

// ============================================================================
// Determinism
// ============================================================================

struct CountingScene {
    calls: AtomicUsize,
}

impl SceneRenderer for CountingScene {
    fn render(&self, pass: ScenePass, recorder: &mut PassRecorder<'_>) {
        self.calls.fetch_add(1, Ordering::Relaxed);
        if pass == ScenePass::Opaque {
            recorder.context().draw_indexed(36, 0, 0);
        }
    }
}

/// Steady-state frames of the same path record identical command lists,
/// regardless of the worker count.
#[rstest]
#[case::single_worker(1)]
#[case::many_workers(6)]
fn test_steady_state_frames_are_identical(#[case] workers: usize) {
    let mut ctx = TestContext::with_parameters(workers, DeviceParameters::new().with_gpu_profiling(true));
    let shaders = MapShaderProvider::image_shaders(&ctx.device).unwrap();
    let path = ForwardRenderPath::new(
        &mut ctx.executor,
        &shaders,
        &ForwardRenderPath::pipeline_axes(),
        RenderPathSettings::new(128, 72).with_msaa(4),
    )
    .unwrap();
    let scene = CountingScene {
        calls: AtomicUsize::new(0),
    };

    // The first frame moves targets out of their creation states.
    path.render(&mut ctx.executor, &scene).unwrap();
    ctx.backend.clear_submissions();

    let mut frames = Vec::new();
    for _ in 0..2 {
        path.render(&mut ctx.executor, &scene).unwrap();
        let commands: Vec<Vec<Command>> = ctx
            .backend
            .submissions()
            .iter()
            .map(|s| s.list.commands().to_vec())
            .collect();
        ctx.backend.clear_submissions();
        frames.push(commands);
    }

    // frame_setup uploads the frame index, everything else must match.
    assert_eq!(frames[0][1..], frames[1][1..]);
    assert_eq!(scene.calls.load(Ordering::Relaxed), 3 * 5);
}

// ============================================================================
// Pipeline Cache
// ============================================================================

/// Every declared key maps to its own pipeline object.
#[test]
fn test_full_cache_totality() {
    let ctx = TestContext::new(1);
    let shaders = MapShaderProvider::image_shaders(&ctx.device).unwrap();
    let axes = PipelineAxes::full();
    let cache = PipelineCache::build(&ctx.device, &shaders, &axes).unwrap();

    let expected = ShaderFamily::ALL.len()
        * BlendMode::ALL.len()
        * StencilMode::ALL.len()
        * 3
        * 2
        * SamplingQuality::ALL.len();
    assert_eq!(cache.len(), expected);
    assert_eq!(ctx.device.pipeline_count(), expected);

    let ids: HashSet<_> = axes.keys().map(|key| cache.lookup(&key).id()).collect();
    assert_eq!(ids.len(), expected);
}

/// Two blend modes by two stencil modes yield four distinct pipelines with
/// the right depth/stencil formats.
#[test]
fn test_two_by_two_cache() {
    let ctx = TestContext::new(1);
    let shaders = MapShaderProvider::image_shaders(&ctx.device).unwrap();
    let axes = PipelineAxes::new()
        .with_blend_modes(&[BlendMode::Alpha, BlendMode::Opaque])
        .with_stencil_modes(&[StencilMode::Disabled, StencilMode::Equal]);
    let cache = PipelineCache::build(&ctx.device, &shaders, &axes).unwrap();
    assert_eq!(cache.len(), 4);
    assert_eq!(ctx.backend.live_count_of(GpuObjectKind::PipelineState), 4);

    let mut ids = HashSet::new();
    for blend in [BlendMode::Alpha, BlendMode::Opaque] {
        for stencil in [StencilMode::Disabled, StencilMode::Equal] {
            let key = PipelineKey {
                blend,
                stencil,
                ..Default::default()
            };
            let pipeline = cache.lookup(&key);
            ids.insert(pipeline.id());
            let expected_format = (stencil != StencilMode::Disabled).then_some(DEPTH_STENCIL_FORMAT);
            assert_eq!(pipeline.descriptor().depth_stencil_format, expected_format);
        }
    }
    assert_eq!(ids.len(), 4);
}

/// Dropping the cache releases every pipeline it built.
#[test]
fn test_cache_drop_releases_pipelines() {
    let ctx = TestContext::new(1);
    let shaders = MapShaderProvider::image_shaders(&ctx.device).unwrap();
    let cache = PipelineCache::build(&ctx.device, &shaders, &ForwardRenderPath::pipeline_axes())
        .unwrap();
    let built = cache.len();
    assert!(built > 0);
    drop(cache);
    assert_eq!(ctx.backend.live_count_of(GpuObjectKind::PipelineState), 0);
    assert_eq!(ctx.backend.created_count(GpuObjectKind::PipelineState), built);
}

/// Image draws from parallel passes share one renderer.
#[test]
fn test_image_draws_from_parallel_passes() {
    let mut ctx = TestContext::with_parameters(4, DeviceParameters::new().with_gpu_profiling(true));
    let shaders = MapShaderProvider::image_shaders(&ctx.device).unwrap();
    let renderer = cinder_graphics::ImageRenderer::new(
        &ctx.device,
        &shaders,
        &ForwardRenderPath::pipeline_axes(),
    )
    .unwrap();
    let source = ctx.tracked_target("source", ResourceState::ShaderResource);

    let mut graph = RenderGraph::new();
    for i in 0..4 {
        let renderer = &renderer;
        let source = &source;
        graph.add_pass(
            format!("ui_{i}"),
            PassResourceUsage::new().read(source, ResourceState::ShaderResource),
            move |rec| {
                let params = ImageParams::new(i as f32 * 8.0, 0.0, 8.0, 8.0);
                renderer.draw(rec.context(), source, &params);
            },
        );
    }
    let report = ctx.executor.execute(graph).unwrap();

    assert_eq!(report.passes.len(), 4);
    for submitted in ctx.backend.submissions() {
        assert!(submitted.list.commands().contains(&Command::Draw {
            vertex_count: 4,
            start_vertex: 0
        }));
    }
}

// ============================================================================
// Object Lifetime
// ============================================================================

/// Dropping an unbound handle never reaches a backend.
#[test]
fn test_unbound_destroy_is_noop() {
    let ctx = TestContext::new(1);
    let calls = ctx.backend.call_count();
    drop(GpuObject::default());
    drop(GpuObject::unbound(GpuObjectKind::PipelineState));
    assert_eq!(ctx.backend.call_count(), calls);
    assert_eq!(ctx.backend.destroyed_count(), 0);
}

/// Render-path targets are released when the path is resized.
#[test]
fn test_resize_releases_old_targets() {
    let mut ctx = TestContext::new(2);
    let shaders = MapShaderProvider::image_shaders(&ctx.device).unwrap();
    let mut path = ForwardRenderPath::new(
        &mut ctx.executor,
        &shaders,
        &ForwardRenderPath::pipeline_axes(),
        RenderPathSettings::new(64, 64),
    )
    .unwrap();
    let textures = ctx.device.texture_count();
    let destroyed = ctx.backend.destroyed_count();

    path.resize(&mut ctx.executor, RenderPathSettings::new(32, 32))
        .unwrap();

    assert_eq!(ctx.device.texture_count(), textures);
    assert_eq!(ctx.backend.destroyed_count(), destroyed + textures);
}

// ============================================================================
// Usage Errors
// ============================================================================

#[test]
#[should_panic(expected = "has no recorded state")]
fn test_untracked_resource_is_fatal() {
    let mut ctx = TestContext::new(2);
    let untracked = ResourceId::new();
    let mut graph = RenderGraph::new();
    graph.add_pass(
        "reads_untracked",
        PassResourceUsage::new().read(&untracked, ResourceState::ShaderResource),
        |_| {},
    );
    let _ = ctx.executor.execute(graph);
}

#[test]
#[should_panic(expected = "is not declared by pass")]
fn test_undeclared_resource_is_fatal() {
    let mut ctx = TestContext::new(2);
    let target = ctx.tracked_target("target", ResourceState::ShaderResource);
    let mut graph = RenderGraph::new();
    graph.add_pass("sneaky", PassResourceUsage::new(), |rec| {
        rec.transition_to(&target, ResourceState::RenderTarget);
    });
    let _ = ctx.executor.execute(graph);
}

#[test]
#[should_panic(expected = "illegal state transition")]
fn test_illegal_transition_is_fatal() {
    let mut ctx = TestContext::new(2);
    let target = ctx.tracked_target("target", ResourceState::RenderTarget);
    let mut graph = RenderGraph::new();
    graph.add_pass(
        "present",
        PassResourceUsage::new().read(&target, ResourceState::Present),
        |rec| {
            rec.transition(&target, ResourceState::Present, ResourceState::DepthWrite);
        },
    );
    let _ = ctx.executor.execute(graph);
}

#[test]
#[should_panic(expected = "submitted twice")]
fn test_double_submission_is_fatal() {
    let ctx = TestContext::new(1);
    let mut context = ctx.device.open_context("once");
    context.draw(3, 0);
    let list = context.close();
    ctx.device.submit(&list).unwrap();
    let _ = ctx.device.submit(&list);
}

#[test]
#[should_panic(expected = "outside the declared axes")]
fn test_undeclared_key_lookup_is_fatal() {
    let ctx = TestContext::new(1);
    let shaders = MapShaderProvider::image_shaders(&ctx.device).unwrap();
    let cache = PipelineCache::build(&ctx.device, &shaders, &PipelineAxes::new()).unwrap();
    cache.lookup(&PipelineKey {
        stencil: StencilMode::NotEqual,
        ..Default::default()
    });
}

#[test]
fn test_frame_report_is_shared_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<cinder_graphics::FrameReport>();
    assert_send_sync::<PipelineCache>();
    assert_send_sync::<Arc<cinder_graphics::GraphicsDevice>>();
}
