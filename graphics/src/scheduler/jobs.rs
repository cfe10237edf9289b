//! Fork-join job system.

use crate::error::GraphicsError;

/// A fork-join job system backed by a rayon thread pool.
///
/// The executor forks one job per pass; passes may fork nested work of their
/// own through [`PassRecorder::jobs`](crate::graph::PassRecorder::jobs). A
/// scope returns only when every job spawned in it has finished, which is the
/// single blocking point of a frame.
#[derive(Debug)]
pub struct JobSystem {
    pool: rayon::ThreadPool,
}

impl JobSystem {
    /// Create a job system. `None` uses one worker per CPU core.
    ///
    /// # Errors
    ///
    /// Returns [`GraphicsError::JobSystem`] if the pool cannot be built.
    pub fn new(worker_threads: Option<usize>) -> Result<Self, GraphicsError> {
        let mut builder = rayon::ThreadPoolBuilder::new()
            .thread_name(|i| format!("cinder-worker-{i}"))
            .start_handler(|_| {
                cinder_core::set_thread_name!("cinder-worker");
            });

        if let Some(num) = worker_threads {
            builder = builder.num_threads(num);
        }

        let pool = builder
            .build()
            .map_err(|e| GraphicsError::JobSystem(e.to_string()))?;

        log::debug!(
            "JobSystem: started {} worker threads",
            pool.current_num_threads()
        );
        Ok(Self { pool })
    }

    /// Number of worker threads.
    pub fn worker_count(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Run `f` with a scope that jobs can be forked into, then wait for all
    /// of them.
    ///
    /// A panic in any job is propagated to the caller once all jobs finish.
    pub fn scope<'s, F, R>(&self, f: F) -> R
    where
        F: FnOnce(&JobScope<'_, 's>) -> R + Send,
        R: Send,
    {
        self.pool.scope(|scope| f(&JobScope { scope }))
    }

    /// Run two closures, potentially in parallel, and return both results.
    pub fn join<A, B, RA, RB>(&self, a: A, b: B) -> (RA, RB)
    where
        A: FnOnce() -> RA + Send,
        B: FnOnce() -> RB + Send,
        RA: Send,
        RB: Send,
    {
        self.pool.install(|| rayon::join(a, b))
    }
}

/// Fork point handed out by [`JobSystem::scope`].
pub struct JobScope<'a, 's> {
    scope: &'a rayon::Scope<'s>,
}

impl<'s> JobScope<'_, 's> {
    /// Fork a job. It may borrow anything that outlives the scope.
    pub fn execute(&self, job: impl FnOnce() + Send + 's) {
        self.scope.spawn(move |_| job());
    }
}
