//! Frame executor.

use std::sync::Arc;
use std::sync::mpsc;

use crate::backend::SubmissionId;
use crate::command::CommandList;
use crate::device::GraphicsDevice;
use crate::error::GraphicsError;
use crate::graph::{BarrierBatch, PassRecorder, RenderGraph, ResourceState, ResourceStateTracker};
use crate::resources::ResourceId;

use super::jobs::JobSystem;

/// Where the executor is in the frame lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameState {
    /// No frame has been recorded yet.
    Idle,
    /// Passes are being recorded.
    Recording,
    /// All passes have finished recording.
    Joined,
    /// The frame's command lists were submitted.
    Submitted,
}

/// Configuration for a [`FrameExecutor`].
#[derive(Debug, Clone, Default)]
pub struct ExecutorParameters {
    /// Worker thread count. `None` uses one per CPU core.
    pub worker_threads: Option<usize>,
    /// Label used in logs.
    pub label: Option<String>,
}

impl ExecutorParameters {
    /// Create default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the worker thread count.
    pub fn with_worker_threads(mut self, count: usize) -> Self {
        self.worker_threads = Some(count);
        self
    }

    /// Set the log label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// What happened to one pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassReport {
    /// Pass name.
    pub name: String,
    /// Queue position of the pass's command list. Also the completion ticket.
    pub submission: SubmissionId,
    /// Process-wide order in which the list finished recording.
    pub close_sequence: u64,
    /// Number of recorded commands.
    pub command_count: usize,
    /// Number of barrier commands in the list.
    pub barrier_count: usize,
    /// Number of individual transitions across those barriers.
    pub transition_count: usize,
}

/// Result of [`FrameExecutor::execute`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameReport {
    /// Index of the frame, starting at 0.
    pub frame_index: u64,
    /// One entry per pass, in declaration (and submission) order.
    pub passes: Vec<PassReport>,
}

impl FrameReport {
    /// Look up a pass by name.
    pub fn pass(&self, name: &str) -> Option<&PassReport> {
        self.passes.iter().find(|p| p.name == name)
    }

    /// Barrier commands across the frame.
    pub fn barrier_count(&self) -> usize {
        self.passes.iter().map(|p| p.barrier_count).sum()
    }

    /// Individual transitions across the frame.
    pub fn transition_count(&self) -> usize {
        self.passes.iter().map(|p| p.transition_count).sum()
    }

    /// Ticket of the last submitted list; the frame is complete on the GPU
    /// once this submission retires.
    pub fn completion_ticket(&self) -> Option<SubmissionId> {
        self.passes.last().map(|p| p.submission)
    }
}

/// Records and submits frames.
///
/// Owns the persistent resource state record. Register every resource with
/// [`tracker_mut`](Self::tracker_mut) before a pass declares it.
///
/// # Example
///
/// ```ignore
/// let mut executor = FrameExecutor::new(device.clone(), ExecutorParameters::new())?;
/// executor.tracker_mut().register(&depth, ResourceState::DepthRead);
///
/// let mut graph = RenderGraph::new();
/// graph.add_pass("depth_prepass", usage, |rec| { /* ... */ });
/// let report = executor.execute(graph)?;
/// ```
#[derive(Debug)]
pub struct FrameExecutor {
    device: Arc<GraphicsDevice>,
    jobs: JobSystem,
    tracker: ResourceStateTracker,
    state: FrameState,
    frame_index: u64,
    label: String,
}

impl FrameExecutor {
    /// Create an executor.
    ///
    /// # Errors
    ///
    /// Fails if the job system cannot start.
    pub fn new(
        device: Arc<GraphicsDevice>,
        parameters: ExecutorParameters,
    ) -> Result<Self, GraphicsError> {
        let jobs = JobSystem::new(parameters.worker_threads)?;
        let label = parameters.label.unwrap_or_else(|| "frame".to_string());
        log::info!(
            "FrameExecutor '{}': {} workers on {}",
            label,
            jobs.worker_count(),
            device.name()
        );
        Ok(Self {
            device,
            jobs,
            tracker: ResourceStateTracker::new(),
            state: FrameState::Idle,
            frame_index: 0,
            label,
        })
    }

    /// The device command lists are submitted to.
    pub fn device(&self) -> &Arc<GraphicsDevice> {
        &self.device
    }

    /// The job system passes are recorded on.
    pub fn jobs(&self) -> &JobSystem {
        &self.jobs
    }

    /// The persistent resource state record.
    pub fn tracker(&self) -> &ResourceStateTracker {
        &self.tracker
    }

    /// Mutable access to the state record, for registering resources.
    pub fn tracker_mut(&mut self) -> &mut ResourceStateTracker {
        &mut self.tracker
    }

    /// Current lifecycle state.
    pub fn frame_state(&self) -> FrameState {
        self.state
    }

    /// Number of frames submitted so far.
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    fn enter(&mut self, next: FrameState) {
        let legal = matches!(
            (self.state, next),
            (FrameState::Idle | FrameState::Submitted, FrameState::Recording)
                | (FrameState::Recording, FrameState::Joined)
                | (FrameState::Joined, FrameState::Submitted)
                | (_, FrameState::Idle)
        );
        assert!(
            legal,
            "executor '{}': cannot move from {:?} to {:?}",
            self.label, self.state, next
        );
        self.state = next;
    }

    /// Record every pass in parallel and submit in declaration order.
    ///
    /// # Errors
    ///
    /// Returns the device error if a submission fails. The executor is back
    /// in [`FrameState::Idle`] afterwards and the state record holds the exit
    /// states of the lists that were submitted before the failure only.
    ///
    /// # Panics
    ///
    /// Panics on usage errors (an undeclared or untracked resource, an
    /// illegal transition) and if any pass body panics.
    pub fn execute(&mut self, graph: RenderGraph<'_>) -> Result<FrameReport, GraphicsError> {
        cinder_core::profile_scope!("FrameExecutor::execute");
        self.enter(FrameState::Recording);

        let passes = graph.into_passes();
        let pass_count = passes.len();

        // Plan entry barriers and open contexts in declaration order. Exit
        // states reach the persistent record only once a list is submitted.
        let mut planning = self.tracker.clone();
        let mut exits: Vec<Vec<(ResourceId, ResourceState)>> = Vec::with_capacity(pass_count);
        let mut planned = Vec::with_capacity(pass_count);
        for (index, pass) in passes.into_iter().enumerate() {
            let (name, usage, body) = pass.into_parts();
            let mut entry = BarrierBatch::new();
            let mut pass_exits = Vec::with_capacity(usage.len());
            for decl in usage.decls() {
                let current = planning.expect_state(decl.resource);
                entry.add(decl.resource, current, decl.entry);
                planning.set(decl.resource, decl.exit_state());
                pass_exits.push((decl.resource, decl.exit_state()));
            }
            exits.push(pass_exits);

            let mut context = self.device.open_context(&name);
            if entry.flush(&mut context) {
                log::trace!("FrameExecutor: '{name}' entry barrier planned");
            }
            planned.push((index, name, usage, body, context));
        }
        log::debug!(
            "FrameExecutor '{}': frame {} planned {} passes",
            self.label,
            self.frame_index,
            pass_count
        );

        // Fork one recording job per pass and wait for all of them.
        let (list_tx, list_rx) = mpsc::channel::<(usize, CommandList)>();
        let jobs = &self.jobs;
        jobs.scope(|s| {
            for (index, name, usage, body, context) in planned {
                let list_tx = list_tx.clone();
                s.execute(move || {
                    cinder_core::profile_scope_dynamic!(name);
                    let mut recorder = PassRecorder::new(name, context, usage, jobs);
                    body(&mut recorder);
                    let list = recorder.finish();
                    let _ = list_tx.send((index, list));
                });
            }
        });
        drop(list_tx);

        let mut lists: Vec<(usize, CommandList)> = list_rx.into_iter().collect();
        assert_eq!(lists.len(), pass_count, "a pass did not produce a command list");
        lists.sort_by_key(|(index, _)| *index);
        self.enter(FrameState::Joined);

        let mut reports = Vec::with_capacity(pass_count);
        for (index, list) in &lists {
            let submission = match self.device.submit(list) {
                Ok(submission) => submission,
                Err(e) => {
                    log::warn!(
                        "FrameExecutor '{}': submitting '{}' failed after {} of {} lists: {e}",
                        self.label,
                        list.name(),
                        reports.len(),
                        pass_count
                    );
                    self.enter(FrameState::Idle);
                    return Err(e);
                }
            };
            for &(id, state) in &exits[*index] {
                self.tracker.set(id, state);
            }
            reports.push(PassReport {
                name: list.name().to_string(),
                submission,
                close_sequence: list.close_sequence(),
                command_count: list.len(),
                barrier_count: list.barrier_count(),
                transition_count: list.transitions().count(),
            });
        }
        self.enter(FrameState::Submitted);

        let report = FrameReport {
            frame_index: self.frame_index,
            passes: reports,
        };
        cinder_core::profile_plot!("barriers", report.barrier_count());
        log::debug!(
            "FrameExecutor '{}': frame {} submitted ({} barriers)",
            self.label,
            self.frame_index,
            report.barrier_count()
        );
        self.frame_index += 1;
        cinder_core::frame_mark!();
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::DummyBackend;
    use crate::device::DeviceParameters;
    use crate::graph::{PassResourceUsage, ResourceState};
    use crate::resources::ResourceId;

    fn executor() -> FrameExecutor {
        let device = GraphicsDevice::new(Arc::new(DummyBackend::new()), DeviceParameters::new());
        FrameExecutor::new(device, ExecutorParameters::new().with_worker_threads(2)).unwrap()
    }

    #[test]
    fn test_empty_frame() {
        let mut executor = executor();
        assert_eq!(executor.frame_state(), FrameState::Idle);
        let report = executor.execute(RenderGraph::new()).unwrap();
        assert!(report.passes.is_empty());
        assert_eq!(report.completion_ticket(), None);
        assert_eq!(executor.frame_state(), FrameState::Submitted);
        assert_eq!(executor.frame_index(), 1);
    }

    #[test]
    fn test_entry_and_exit_states_persist() {
        let mut executor = executor();
        let depth = ResourceId::new();
        executor.tracker_mut().register(&depth, ResourceState::DepthRead);

        let mut graph = RenderGraph::new();
        graph.add_pass(
            "prepass",
            PassResourceUsage::new()
                .write(&depth, ResourceState::DepthWrite)
                .release(&depth, ResourceState::DepthRead),
            |_| {},
        );
        let report = executor.execute(graph).unwrap();

        // DepthRead -> DepthWrite at entry, DepthWrite -> DepthRead at exit.
        assert_eq!(report.pass("prepass").unwrap().barrier_count, 2);
        assert_eq!(
            executor.tracker().state(&depth),
            Some(ResourceState::DepthRead)
        );
    }

    #[test]
    fn test_rejected_submission_keeps_submitted_exit_states() {
        let backend = Arc::new(DummyBackend::new().with_submit_failure_after(1));
        let device = GraphicsDevice::new(backend.clone(), DeviceParameters::new());
        let mut executor =
            FrameExecutor::new(device, ExecutorParameters::new().with_worker_threads(2)).unwrap();
        let first = ResourceId::new();
        let second = ResourceId::new();
        executor.tracker_mut().register(&first, ResourceState::ShaderResource);
        executor.tracker_mut().register(&second, ResourceState::ShaderResource);

        let mut graph = RenderGraph::new();
        graph.add_pass(
            "a",
            PassResourceUsage::new().write(&first, ResourceState::RenderTarget),
            |_| {},
        );
        graph.add_pass(
            "b",
            PassResourceUsage::new().write(&second, ResourceState::RenderTarget),
            |_| {},
        );
        let err = executor.execute(graph).unwrap_err();

        assert_eq!(err, GraphicsError::DeviceLost);
        assert_eq!(backend.submissions().len(), 1);
        assert_eq!(
            executor.tracker().state(&first),
            Some(ResourceState::RenderTarget)
        );
        assert_eq!(
            executor.tracker().state(&second),
            Some(ResourceState::ShaderResource)
        );
        assert_eq!(executor.frame_state(), FrameState::Idle);
        assert_eq!(executor.frame_index(), 0);
    }

    #[test]
    #[should_panic(expected = "has no recorded state")]
    fn test_untracked_declaration_panics() {
        let mut executor = executor();
        let mut graph = RenderGraph::new();
        graph.add_pass(
            "bad",
            PassResourceUsage::new().read(&ResourceId::new(), ResourceState::ShaderResource),
            |_| {},
        );
        let _ = executor.execute(graph);
    }

    #[test]
    #[should_panic(expected = "cannot move from")]
    fn test_illegal_frame_state_panics() {
        let mut executor = executor();
        executor.enter(FrameState::Joined);
    }
}
