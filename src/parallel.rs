use rayon::ThreadPool;
use tracing::debug;

use crate::error::MapError;

/// Default number of inputs handed to a worker at a time in a bulk map.
pub const DEFAULT_CHUNK_SIZE: usize = 64;

#[derive(Debug, Clone, Copy, Default)]
pub struct PoolConfig {
    num_workers: Option<usize>,
    chunk_size: Option<usize>,
}

impl PoolConfig {
    pub fn new(num_workers: Option<usize>, chunk_size: Option<usize>) -> Self {
        Self {
            num_workers,
            chunk_size,
        }
    }

    /// Worker count, one per logical core unless overridden.
    pub fn num_workers(&self) -> usize {
        self.num_workers.unwrap_or_else(num_cpus::get)
    }

    /// Chunk size for a bulk map over `total` inputs.
    ///
    /// A pinned chunk size is used as is. Otherwise inputs are split so each
    /// worker gets several chunks, never fewer than [`DEFAULT_CHUNK_SIZE`]
    /// inputs per chunk.
    pub fn chunk_size(&self, total: usize) -> usize {
        if let Some(size) = self.chunk_size {
            return size;
        }

        let workers = self.num_workers().max(1);
        (total / (workers * 16)).max(DEFAULT_CHUNK_SIZE)
    }

    fn validate(&self) -> Result<(), MapError> {
        if self.num_workers == Some(0) {
            return Err(MapError::InvalidConfig("worker count must be at least 1"));
        }
        if self.chunk_size == Some(0) {
            return Err(MapError::InvalidConfig("chunk size must be at least 1"));
        }
        Ok(())
    }
}

/// A fixed-size set of worker threads.
///
/// Workers are signalled to exit when the pool is dropped. The pool does not
/// join them, so a thread may outlive the drop briefly.
pub struct WorkerPool {
    pool: ThreadPool,
    config: PoolConfig,
}

impl WorkerPool {
    pub fn new(config: PoolConfig) -> Result<Self, MapError> {
        config.validate()?;

        let num_workers = config.num_workers();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_workers)
            .thread_name(|i| format!("poolmap-worker-{i}"))
            .build()?;

        debug!(num_workers, "started worker pool");

        Ok(Self { pool, config })
    }

    pub fn num_workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Run `op` inside the pool, blocking until it returns.
    ///
    /// A panic in `op` is re-raised on the calling thread.
    pub fn install<OP, R>(&self, op: OP) -> R
    where
        OP: FnOnce() -> R + Send,
        R: Send,
    {
        self.pool.install(op)
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        debug!(num_workers = self.num_workers(), "releasing worker pool");
    }
}
