//! Runners decide how the independent per-partition tasks of a stage are
//! executed.  Stages hand a runner one input per partition and get the
//! outputs back in partition order, so results are identical no matter which
//! runner ran them.

use log::debug;
use rayon::prelude::*;

use crate::error::Error;

/// Executes a batch of independent tasks, one per partition.
pub trait Runner: Send + Sync {
    /// Applies `task` to every partition input, returning outputs in
    /// partition order.
    fn map_parts<A, B, F>(&self, parts: Vec<A>, task: F) -> Vec<B>
    where
        A: Send,
        B: Send,
        F: Fn(usize, A) -> B + Send + Sync;
}

/// Runs every task on the calling thread, in partition order.
///
/// ```rust
/// use multicount_flow::runner::{Runner, SequentialRunner};
///
/// let out = SequentialRunner.map_parts(vec![1, 2, 3usize], |idx, x| x + idx);
/// assert_eq!(out, vec![1, 3, 5]);
/// ```
pub struct SequentialRunner;

impl Runner for SequentialRunner {
    fn map_parts<A, B, F>(&self, parts: Vec<A>, task: F) -> Vec<B>
    where
        A: Send,
        B: Send,
        F: Fn(usize, A) -> B + Send + Sync,
    {
        debug!("running {} tasks sequentially", parts.len());
        parts
            .into_iter()
            .enumerate()
            .map(|(idx, part)| task(idx, part))
            .collect()
    }
}

/// Fans tasks out over a dedicated thread pool.
pub struct ThreadedRunner {
    pool: rayon::ThreadPool,
}

impl ThreadedRunner {
    /// Builds a runner with `threads` worker threads.
    pub fn new(threads: usize) -> Result<Self, Error> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()?;
        Ok(ThreadedRunner { pool })
    }
}

impl Runner for ThreadedRunner {
    fn map_parts<A, B, F>(&self, parts: Vec<A>, task: F) -> Vec<B>
    where
        A: Send,
        B: Send,
        F: Fn(usize, A) -> B + Send + Sync,
    {
        debug!(
            "running {} tasks on {} threads",
            parts.len(),
            self.pool.current_num_threads()
        );
        self.pool.install(|| {
            parts
                .into_par_iter()
                .enumerate()
                .map(|(idx, part)| task(idx, part))
                .collect()
        })
    }
}

#[cfg(test)]
mod runner_test {
    use super::*;

    #[test]
    fn test_sequential_preserves_order() {
        let out = SequentialRunner.map_parts(vec!["a", "b", "c"], |idx, s| format!("{}{}", idx, s));
        assert_eq!(out, vec!["0a", "1b", "2c"]);
    }

    #[test]
    fn test_threaded_preserves_order() {
        let runner = ThreadedRunner::new(4).unwrap();
        let parts: Vec<usize> = (0..64).collect();
        let out = runner.map_parts(parts, |idx, x| {
            assert_eq!(idx, x);
            x * 2
        });
        let expected: Vec<usize> = (0..64).map(|x| x * 2).collect();
        assert_eq!(out, expected);
    }

    #[test]
    fn test_threaded_matches_sequential() {
        let parts: Vec<usize> = (0..16).collect();
        let seq = SequentialRunner.map_parts(parts.clone(), |_idx, x| x * x);
        let par = ThreadedRunner::new(2)
            .unwrap()
            .map_parts(parts, |_idx, x| x * x);
        assert_eq!(seq, par);
    }
}
