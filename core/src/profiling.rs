//! CPU profiling instrumentation.
//!
//! The macros in this module forward to the [Tracy profiler](https://github.com/wolfpld/tracy)
//! when the `profiling` feature is enabled and expand to nothing otherwise, so
//! instrumented code pays no runtime cost in regular builds.
//!
//! ```ignore
//! use cinder_core::profiling::{frame_mark, profile_scope};
//!
//! fn record_frame() {
//!     profile_scope!("record_frame");
//!     // ... fork passes, wait, submit ...
//!     frame_mark!();
//! }
//! ```
//!
//! Pass names are only known at runtime, so the executor uses
//! [`profile_scope_dynamic!`] for per-pass spans.

#[cfg(feature = "profiling")]
pub use tracy_client::{self, Client, frame_mark as tracy_frame_mark, plot as tracy_plot, span};

/// Mark the end of a frame.
#[macro_export]
#[cfg(feature = "profiling")]
macro_rules! frame_mark {
    () => {
        $crate::profiling::tracy_frame_mark()
    };
}

/// Mark the end of a frame (no-op when profiling disabled).
#[macro_export]
#[cfg(not(feature = "profiling"))]
macro_rules! frame_mark {
    () => {};
}

/// Open a span that lasts until the end of the enclosing scope.
///
/// The span is only created while a Tracy client is running, so calling this
/// from tests or tools that never start one is fine.
#[macro_export]
#[cfg(feature = "profiling")]
macro_rules! profile_scope {
    ($name:expr) => {
        let _profile_span = $crate::profiling::Client::running()
            .map(|c| c.span_alloc(Some($name), "", file!(), line!(), 0));
    };
}

/// Open a scope span (no-op when profiling disabled).
#[macro_export]
#[cfg(not(feature = "profiling"))]
macro_rules! profile_scope {
    ($name:expr) => {};
}

/// Open a span covering the enclosing function.
#[macro_export]
#[cfg(feature = "profiling")]
macro_rules! profile_function {
    () => {
        let _profile_span = $crate::profiling::span!();
    };
}

/// Open a function span (no-op when profiling disabled).
#[macro_export]
#[cfg(not(feature = "profiling"))]
macro_rules! profile_function {
    () => {};
}

/// Open a span whose name is computed at runtime (e.g. a pass name).
#[macro_export]
#[cfg(feature = "profiling")]
macro_rules! profile_scope_dynamic {
    ($name:expr) => {
        let _profile_span = $crate::profiling::Client::running()
            .map(|c| c.span_alloc(Some(&*$name), "", file!(), line!(), 0));
    };
}

/// Open a dynamically named span (no-op when profiling disabled).
#[macro_export]
#[cfg(not(feature = "profiling"))]
macro_rules! profile_scope_dynamic {
    ($name:expr) => {
        let _ = &$name;
    };
}

/// Plot a numeric value over time.
#[macro_export]
#[cfg(feature = "profiling")]
macro_rules! profile_plot {
    ($name:expr, $value:expr) => {
        $crate::profiling::tracy_plot!($name, $value as f64)
    };
}

/// Plot a value (no-op when profiling disabled).
#[macro_export]
#[cfg(not(feature = "profiling"))]
macro_rules! profile_plot {
    ($name:expr, $value:expr) => {
        let _ = $value;
    };
}

/// Name the current thread in the profiler.
#[macro_export]
#[cfg(feature = "profiling")]
macro_rules! set_thread_name {
    ($name:expr) => {
        $crate::profiling::tracy_client::set_thread_name!($name)
    };
}

/// Name the current thread (no-op when profiling disabled).
#[macro_export]
#[cfg(not(feature = "profiling"))]
macro_rules! set_thread_name {
    ($name:expr) => {};
}

pub use frame_mark;
pub use profile_function;
pub use profile_plot;
pub use profile_scope;
pub use profile_scope_dynamic;
pub use set_thread_name;
