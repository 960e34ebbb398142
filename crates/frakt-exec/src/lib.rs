#![forbid(unsafe_code)]
//! frakt-exec: the parallel work-partitioning and cancellation engine.
//!
//! Partitioning is one task per image row: rows vary widely in cost, so
//! per-row granularity over a fixed-size worker pool load-balances far
//! better than static N-way chunking. Each row task writes exclusively to
//! its own row slice of the pre-allocated output grid — no locking, and the
//! finished grid is identical no matter the completion order.
//!
//! Cancellation is cooperative: a shared flag checked at row boundaries.
//! In-flight rows finish, the pool drains, and the call reports
//! `Cancelled`; a partial grid never escapes as a result.

pub mod cancel;
pub mod error;
pub mod executor;
mod progress;

pub use cancel::CancelToken;
pub use error::ComputeError;
pub use executor::Executor;
pub use progress::ProgressCallback;
