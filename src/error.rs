//! Error and status types for the muxer core.

use thiserror::Error;

/// Main error type returned by fallible muxer operations.
#[derive(Error, Debug)]
pub enum MuxError {
    /// Allocating a per-stream runtime structure failed during `init`.
    #[error("allocation failed: {0}")]
    AllocFailed(String),

    /// A host-supplied configuration value was invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// A `MediaFilter` or `BufferFilter` call returned an error; propagated as-is.
    #[error("filter error: {0}")]
    Filter(String),

    /// A `WriteQueue` call returned an error; propagated as-is.
    #[error("write queue error: {0}")]
    Queue(String),

    /// A `WriteCallback` failed.
    #[error("write callback error: {0}")]
    Io(#[from] std::io::Error),

    /// The block cache could not satisfy progress and no bytes were produced
    /// this call — signals a truncated source. Terminal; the `BAD_DATA`
    /// status of spec.md §6.
    #[error("truncated source: no data produced before a cache miss")]
    Truncated,

    /// `simulate_get_segment_size` / `simulate_get_iframes` were called but
    /// at least one stream's filter chain declared simulation unsupported at
    /// init.
    #[error("simulation is not supported for this asset")]
    SimulationUnsupported,

    /// Something the core should never observe happened (e.g. a scheduler
    /// invariant was violated). Distinct from `Filter`/`Queue` so callers can
    /// tell "a collaborator failed" from "our own bookkeeping is broken".
    #[error("unexpected internal state: {0}")]
    Unexpected(String),
}

/// Result of a `process()` call that completed without error.
///
/// Mirrors spec.md §6's status codes, minus `ALLOC_FAILED` and `UNEXPECTED`
/// which become `MuxError` variants instead of peers of `Ok` — Rust already
/// has a typed error channel for "this call failed", so there is no need for
/// a caller to additionally inspect a status enum for those two cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MuxStatus {
    /// The segment is complete; the write queue has been fully flushed.
    Ok,
    /// A block the pump needs is not yet resident in the cache. The host
    /// should re-call `process` once the cache reports the block is ready.
    Again,
}

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, MuxError>;
