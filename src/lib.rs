//! Order-preserving parallel maps over a scoped worker pool.
//!
//! [`squared_random`] distributes a large seed sequence across the pool in
//! chunks. [`paired_sum_cube`] submits one task at a time and waits on each.

pub mod error;
pub mod mapper;
pub mod parallel;
pub mod progress;
pub mod tasks;

pub use error::MapError;
pub use mapper::{paired_sum_cube, squared_random, BulkRun, ParallelMapper};
pub use parallel::{PoolConfig, WorkerPool};
