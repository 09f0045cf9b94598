use std::time::{Duration, Instant};

use indicatif::ProgressBar;
use rayon::prelude::*;
use tracing::{debug, info, trace};

use crate::error::MapError;
use crate::parallel::{PoolConfig, WorkerPool};
use crate::tasks::{plus_cube, random_square};

/// Maps functions over inputs on a worker pool, keeping results in input order.
pub struct ParallelMapper {
    pool: WorkerPool,
}

impl ParallelMapper {
    pub fn new(config: PoolConfig) -> Result<Self, MapError> {
        Ok(Self {
            pool: WorkerPool::new(config)?,
        })
    }

    pub fn num_workers(&self) -> usize {
        self.pool.num_workers()
    }

    /// Apply `f` to every input, splitting the inputs into chunks that the
    /// workers pick up as they become free.
    ///
    /// `progress` advances by the chunk length as each chunk finishes.
    pub fn bulk_map<T, R, F>(
        &self,
        inputs: &[T],
        f: F,
        progress: Option<&ProgressBar>,
    ) -> Vec<R>
    where
        T: Sync,
        R: Send,
        F: Fn(&T) -> R + Sync,
    {
        let chunk_size = self.pool.config().chunk_size(inputs.len());
        debug!(
            inputs = inputs.len(),
            chunk_size,
            num_workers = self.num_workers(),
            "distributing bulk map"
        );

        // collect keeps input order across chunks
        self.pool.install(|| {
            inputs
                .par_chunks(chunk_size)
                .flat_map_iter(|chunk| {
                    let out: Vec<R> = chunk.iter().map(&f).collect();
                    if let Some(pb) = progress {
                        pb.inc(chunk.len() as u64);
                    }
                    out
                })
                .collect()
        })
    }

    /// Run one task on a worker and block until it returns.
    pub fn apply<F, R>(&self, task: F) -> R
    where
        F: FnOnce() -> R + Send,
        R: Send,
    {
        self.pool.install(task)
    }
}

/// Outcome of a timed bulk run.
#[derive(Debug, Clone)]
pub struct BulkRun {
    pub values: Vec<u64>,
    pub elapsed: Duration,
}

/// Square a seeded random draw for every seed on a fresh pool, timing the
/// whole run including pool startup.
pub fn squared_random(
    seeds: &[u64],
    config: PoolConfig,
    progress: Option<&ProgressBar>,
) -> Result<BulkRun, MapError> {
    let start = Instant::now();

    let mapper = ParallelMapper::new(config)?;
    let values = mapper.bulk_map(seeds, |&seed| random_square(seed), progress);
    drop(mapper);

    let elapsed = start.elapsed();
    info!(seeds = seeds.len(), ?elapsed, "bulk squared-random complete");

    Ok(BulkRun { values, elapsed })
}

/// Cube the sum of every pair on a fresh pool.
///
/// Pairs are submitted one at a time and each result is awaited before the
/// next submission. The first failing pair aborts the run.
pub fn paired_sum_cube(
    pairs: &[(i64, i64)],
    config: PoolConfig,
) -> Result<Vec<i64>, MapError> {
    let mapper = ParallelMapper::new(config)?;

    let mut results = Vec::with_capacity(pairs.len());
    for (i, &(x, y)) in pairs.iter().enumerate() {
        trace!(task = i, x, y, "submitting cube task");
        results.push(mapper.apply(|| plus_cube(x, y))?);
    }

    info!(pairs = pairs.len(), "paired-sum-cube complete");
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::SQUARES_BELOW_TEN;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn small_pool() -> PoolConfig {
        PoolConfig::new(Some(4), Some(7))
    }

    #[test]
    fn test_bulk_map_preserves_order() {
        let mapper = ParallelMapper::new(small_pool()).unwrap();
        let inputs: Vec<u64> = (0..1000).collect();

        let out = mapper.bulk_map(&inputs, |&x| x * 2, None);

        assert_eq!(out, (0..1000).map(|x| x * 2).collect::<Vec<_>>());
    }

    #[test]
    fn test_bulk_map_empty_input() {
        let mapper = ParallelMapper::new(small_pool()).unwrap();
        let out: Vec<u64> = mapper.bulk_map(&[] as &[u64], |&x| x, None);
        assert!(out.is_empty());
    }

    #[test]
    fn test_bulk_map_advances_progress() {
        let mapper = ParallelMapper::new(small_pool()).unwrap();
        let inputs: Vec<u64> = (0..100).collect();
        let pb = ProgressBar::hidden();

        mapper.bulk_map(&inputs, |&x| x, Some(&pb));

        assert_eq!(pb.position(), 100);
    }

    #[test]
    fn test_apply_runs_on_worker_thread() {
        let mapper = ParallelMapper::new(small_pool()).unwrap();
        let name = mapper.apply(|| std::thread::current().name().map(str::to_owned));
        assert!(name.unwrap().starts_with("poolmap-worker-"));
    }

    #[test]
    #[should_panic(expected = "task failed")]
    fn test_apply_propagates_panic() {
        let mapper = ParallelMapper::new(small_pool()).unwrap();
        mapper.apply(|| -> u64 { panic!("task failed") });
    }

    #[test]
    fn test_apply_runs_one_task_at_a_time() {
        let mapper = ParallelMapper::new(PoolConfig::new(Some(8), None)).unwrap();
        let in_flight = AtomicUsize::new(0);
        let max_in_flight = AtomicUsize::new(0);

        for i in 0..200u64 {
            let out = mapper.apply(|| {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                max_in_flight.fetch_max(now, Ordering::SeqCst);
                std::thread::yield_now();
                in_flight.fetch_sub(1, Ordering::SeqCst);
                i * 2
            });
            assert_eq!(out, i * 2);
        }

        assert_eq!(max_in_flight.load(Ordering::SeqCst), 1);
    }

    #[test]
    #[should_panic(expected = "bad input 57")]
    fn test_bulk_map_propagates_panic() {
        let mapper = ParallelMapper::new(PoolConfig::new(Some(4), Some(3))).unwrap();
        let inputs: Vec<u64> = (0..200).collect();

        mapper.bulk_map(
            &inputs,
            |&x| {
                if x == 57 {
                    panic!("bad input {x}");
                }
                x
            },
            None,
        );
    }

    #[test]
    fn test_squared_random_matches_sequential() {
        let seeds: Vec<u64> = (0..5000).collect();
        let run = squared_random(&seeds, small_pool(), None).unwrap();

        let expected: Vec<u64> = seeds.iter().map(|&s| random_square(s)).collect();
        assert_eq!(run.values, expected);
        assert!(run.values.iter().all(|v| SQUARES_BELOW_TEN.contains(v)));
    }

    #[test]
    fn test_squared_random_elapsed_within_outer_clock() {
        let seeds: Vec<u64> = (0..1000).collect();
        let outer = Instant::now();
        let run = squared_random(&seeds, small_pool(), None).unwrap();
        assert!(run.elapsed <= outer.elapsed());
    }

    #[test]
    fn test_paired_sum_cube_scenarios() {
        assert_eq!(
            paired_sum_cube(&[(0, 0), (1, 2), (3, 4)], small_pool()).unwrap(),
            vec![0, 27, 343]
        );
        assert_eq!(
            paired_sum_cube(&[(100, 100)], small_pool()).unwrap(),
            vec![8_000_000]
        );
    }

    #[test]
    fn test_paired_sum_cube_aborts_on_overflow() {
        let pairs = [(1, 1), (i64::MAX, 1), (2, 2)];
        let err = paired_sum_cube(&pairs, small_pool()).unwrap_err();
        assert!(matches!(err, MapError::Overflow { x: i64::MAX, y: 1 }));
    }
}
