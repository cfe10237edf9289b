//! Frame scheduling.
//!
//! The scheduler records a [`RenderGraph`] with one job per pass and submits
//! the results in declaration order.
//!
//! # Frame lifecycle
//!
//! ```text
//! Idle -> Recording -> Joined -> Submitted -> (next frame) Recording ...
//! ```
//!
//! 1. **Plan** (executor thread): walk passes in declaration order, batch
//!    each pass's entry transitions and install its exit states in the
//!    persistent state record.
//! 2. **Record** (worker threads): every pass records into its own context.
//!    Nothing mutable is shared between passes.
//! 3. **Join**: wait for all passes. This is the only blocking point.
//! 4. **Submit**: hand the closed lists to the device in declaration order,
//!    regardless of which pass finished first.
//!
//! # Module Contents
//!
//! - [`JobSystem`] - Fork-join pool
//! - [`FrameExecutor`] - Plans, records and submits one frame at a time
//! - [`FrameReport`] - Per-pass submission order and barrier counts

mod executor;
mod jobs;

pub use executor::{ExecutorParameters, FrameExecutor, FrameReport, FrameState, PassReport};
pub use jobs::{JobScope, JobSystem};
