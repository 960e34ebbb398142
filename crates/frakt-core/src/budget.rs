//! Memory accounting interfaces.
//!
//! The concrete registry/allocator lives in `frakt-mem`. Only the probe
//! trait and the priority vocabulary live here so any crate can depend on
//! the API without pulling the allocation machinery.

use serde::{Deserialize, Serialize};

/// Source of system memory figures.
///
/// Implemented by `frakt-mem` (a `/proc/meminfo` probe for production, a
/// fixed-value probe for tests). Implementations must be cheap enough to
/// call before every large allocation.
pub trait MemoryProbe: Send + Sync {
    /// Total physical memory in bytes.
    fn total_bytes(&self) -> u64;

    /// Memory currently available to this process in bytes.
    fn available_bytes(&self) -> u64;
}

/// Reclamation ordering for tracked allocations. Under memory pressure,
/// `Low` buffers are revoked first; `Critical` ones never are.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum AllocationPriority {
    Low,
    Normal,
    High,
    Critical,
}

// NOTE: no default `MemoryProbe` impl here that would silently report
// unlimited memory. The mem crate is the only place probes are constructed.
