#![forbid(unsafe_code)]
//! frakt-mem: memory estimation, allocation tracking, and reclamation.
//!
//! Every large buffer in the engine flows through [`ResourceManager`] so
//! the process stays inside its memory budget: allocations are estimated
//! and checked against probed system memory before they happen, recorded in
//! a registry while they live, and released through RAII guards. Under
//! pressure the manager sweeps dead records, revokes low-priority
//! allocations, and runs registered reclamation callbacks.
//!
//! The manager is an explicitly constructed, `Arc`-shared service: callers
//! create one and pass it to every computation entry point. There is no
//! global instance.

pub mod error;
pub mod manager;
pub mod probe;
pub mod registry;

pub use error::{AllocationError, Result};
pub use manager::{
    MaintenanceReport, MemoryStatistics, OptimizationPlan, ResourceManager, TrackedGrid,
};
pub use probe::{FixedProbe, SystemProbe};
pub use registry::{AllocationGuard, AllocationId, AllocationRegistry, AllocationSnapshot};
