//! Dummy GPU backend for testing and development.
//!
//! This backend doesn't perform actual GPU operations. It hands out unique
//! handles, remembers which objects are alive and keeps a copy of every
//! submitted command list so tests can inspect exactly what the engine sent.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use parking_lot::Mutex;

use crate::command::{CommandList, CommandListId};
use crate::resources::{GpuObjectKind, RawHandle};
use crate::types::TextureFormat;

use super::{BackendError, CreateRequest, GpuBackend, SubmissionId};

/// A command list as received by [`DummyBackend::submit`].
#[derive(Debug, Clone)]
pub struct SubmittedList {
    /// Queue position assigned at submission.
    pub submission: SubmissionId,
    /// The submitted list.
    pub list: CommandList,
}

/// Dummy GPU backend.
#[derive(Debug)]
pub struct DummyBackend {
    back_buffer_format: TextureFormat,
    sample_counts: Vec<u32>,
    allocation_limit: Option<usize>,
    submit_failure_after: Option<u64>,
    next_handle: AtomicU64,
    next_list: AtomicU64,
    next_submission: AtomicU64,
    calls: AtomicUsize,
    live: Mutex<HashMap<RawHandle, GpuObjectKind>>,
    created: Mutex<Vec<(GpuObjectKind, RawHandle)>>,
    destroyed: Mutex<Vec<(GpuObjectKind, RawHandle)>>,
    submitted_ids: Mutex<HashSet<CommandListId>>,
    submissions: Mutex<Vec<SubmittedList>>,
}

impl Default for DummyBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl DummyBackend {
    /// Create a new dummy backend with an `Rgba8Unorm` back buffer and
    /// 1/2/4/8x MSAA support.
    pub fn new() -> Self {
        Self {
            back_buffer_format: TextureFormat::Rgba8Unorm,
            sample_counts: vec![1, 2, 4, 8],
            allocation_limit: None,
            submit_failure_after: None,
            next_handle: AtomicU64::new(1),
            next_list: AtomicU64::new(1),
            next_submission: AtomicU64::new(0),
            calls: AtomicUsize::new(0),
            live: Mutex::new(HashMap::new()),
            created: Mutex::new(Vec::new()),
            destroyed: Mutex::new(Vec::new()),
            submitted_ids: Mutex::new(HashSet::new()),
            submissions: Mutex::new(Vec::new()),
        }
    }

    /// Report a different back-buffer format.
    pub fn with_back_buffer_format(mut self, format: TextureFormat) -> Self {
        self.back_buffer_format = format;
        self
    }

    /// Report a different set of supported sample counts.
    pub fn with_sample_counts(mut self, counts: &[u32]) -> Self {
        self.sample_counts = counts.to_vec();
        self.sample_counts.sort_unstable();
        self
    }

    /// Fail creation with [`BackendError::OutOfMemory`] once `limit` objects
    /// are alive.
    pub fn with_allocation_limit(mut self, limit: usize) -> Self {
        self.allocation_limit = Some(limit);
        self
    }

    /// Reject every submission with [`BackendError::DeviceLost`] once `count`
    /// lists have been accepted.
    pub fn with_submit_failure_after(mut self, count: u64) -> Self {
        self.submit_failure_after = Some(count);
        self
    }

    /// Total number of trait calls received.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }

    /// Number of objects currently alive.
    pub fn live_count(&self) -> usize {
        self.live.lock().len()
    }

    /// Number of live objects of one kind.
    pub fn live_count_of(&self, kind: GpuObjectKind) -> usize {
        self.live.lock().values().filter(|k| **k == kind).count()
    }

    /// Number of objects of one kind ever created.
    pub fn created_count(&self, kind: GpuObjectKind) -> usize {
        self.created.lock().iter().filter(|(k, _)| *k == kind).count()
    }

    /// Every destruction received, in order.
    pub fn destroyed(&self) -> Vec<(GpuObjectKind, RawHandle)> {
        self.destroyed.lock().clone()
    }

    /// Number of destructions received.
    pub fn destroyed_count(&self) -> usize {
        self.destroyed.lock().len()
    }

    /// Every submitted list, in queue order.
    pub fn submissions(&self) -> Vec<SubmittedList> {
        self.submissions.lock().clone()
    }

    /// Forget recorded submissions. Live object tracking is kept.
    pub fn clear_submissions(&self) {
        self.submissions.lock().clear();
    }

    fn count_call(&self) {
        self.calls.fetch_add(1, Ordering::Relaxed);
    }
}

impl GpuBackend for DummyBackend {
    fn name(&self) -> &str {
        "Dummy Backend"
    }

    fn create_object(&self, request: &CreateRequest<'_>) -> Result<RawHandle, BackendError> {
        self.count_call();
        let kind = request.kind();
        let mut live = self.live.lock();
        if let Some(limit) = self.allocation_limit
            && live.len() >= limit
        {
            log::trace!("DummyBackend: allocation limit {limit} reached creating {kind:?}");
            return Err(BackendError::OutOfMemory);
        }

        let raw = RawHandle(self.next_handle.fetch_add(1, Ordering::Relaxed));
        live.insert(raw, kind);
        self.created.lock().push((kind, raw));
        log::trace!("DummyBackend: created {kind:?} {raw:?}");
        Ok(raw)
    }

    fn destroy_object(&self, kind: GpuObjectKind, raw: RawHandle) {
        self.count_call();
        match self.live.lock().remove(&raw) {
            Some(live_kind) => assert_eq!(
                live_kind, kind,
                "{raw:?} was created as {live_kind:?} but destroyed as {kind:?}"
            ),
            None => panic!("{kind:?} {raw:?} destroyed twice or never created"),
        }
        self.destroyed.lock().push((kind, raw));
        log::trace!("DummyBackend: destroyed {kind:?} {raw:?}");
    }

    fn begin_command_list(&self, name: &str) -> CommandListId {
        self.count_call();
        let id = CommandListId(self.next_list.fetch_add(1, Ordering::Relaxed));
        log::trace!("DummyBackend: begin command list {id:?} '{name}'");
        id
    }

    fn submit(&self, list: &CommandList) -> Result<SubmissionId, BackendError> {
        self.count_call();
        if let Some(count) = self.submit_failure_after
            && self.next_submission.load(Ordering::Relaxed) >= count
        {
            log::trace!("DummyBackend: rejecting '{}', device lost", list.name());
            return Err(BackendError::DeviceLost);
        }
        assert!(
            self.submitted_ids.lock().insert(list.id()),
            "command list {:?} '{}' submitted twice",
            list.id(),
            list.name()
        );

        // Hold the log lock while numbering so queue order matches sequence order.
        let mut submissions = self.submissions.lock();
        let submission = SubmissionId(self.next_submission.fetch_add(1, Ordering::Relaxed));
        log::trace!(
            "DummyBackend: submitted '{}' ({} commands) as {:?}",
            list.name(),
            list.len(),
            submission
        );
        submissions.push(SubmittedList {
            submission,
            list: list.clone(),
        });
        Ok(submission)
    }

    fn back_buffer_format(&self) -> TextureFormat {
        self.back_buffer_format
    }

    fn supported_sample_counts(&self) -> &[u32] {
        &self.sample_counts
    }
}

static_assertions::assert_impl_all!(DummyBackend: Send, Sync);
