use thiserror::Error;

/// Result type local to frakt-mem.
pub type Result<T> = std::result::Result<T, AllocationError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AllocationError {
    #[error("allocation of {requested} bytes exceeds the single-buffer ceiling of {ceiling} bytes")]
    OversizedAllocation { requested: u64, ceiling: u64 },

    #[error("insufficient system memory: {required} bytes required (with safety margin), {available} available")]
    SystemOutOfMemory { required: u64, available: u64 },

    #[error("memory budget exceeded for '{description}': requested {requested} bytes, {used} of {capacity} accounted")]
    OutOfBudget {
        description: String,
        requested: u64,
        used: u64,
        capacity: u64,
    },
}
