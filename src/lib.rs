mod model;
mod runner;
pub mod workload;

pub use model::*;
pub use runner::WorkloadRunner;

use std::collections::TryReserveError;
use std::io;
use thiserror::Error;

/// Errors possibly returned by `WorkloadRunner`
#[derive(Debug, Error)]
pub enum Error {
    /// Iteration count can't be represented as an `i32` buffer index
    #[error("iteration count {0} exceeds the maximum of {max}", max = i32::MAX)]
    InvalidIterations(usize),
    /// Memory worker failed to allocate its buffer
    #[error("failed to allocate buffer of {elements} elements: {source}")]
    Alloc {
        elements: usize,
        #[source]
        source: TryReserveError,
    },
    /// OS refused to start a worker thread
    #[error("failed to spawn {kind} worker: {source}")]
    Spawn {
        kind: Kind,
        #[source]
        source: io::Error,
    },
    /// Failed to write a completion line
    #[error("error writing output: {0}")]
    Output(#[from] io::Error),
    /// A worker thread panicked before reporting
    #[error("{0} worker panicked")]
    WorkerPanicked(Kind),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Kernel thread ID of the calling thread, as shown by `top -H` or taskstats.
#[cfg(target_os = "linux")]
pub(crate) fn current_tid() -> Option<u32> {
    Some(unsafe { libc::syscall(libc::SYS_gettid) } as u32)
}

#[cfg(not(target_os = "linux"))]
pub(crate) fn current_tid() -> Option<u32> {
    None
}
