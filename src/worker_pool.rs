// THEORY:
// The `worker_pool` module is the single seam through which every parallel stage
// in the engine runs. Tokenization and trend detection have the same shape: a
// batch of independent, read-only task inputs, one pure job function, and a
// result vector that must line up with the input order. This module owns that
// shape so the call sites stay sequential-looking.
//
// Key architectural principles:
// 1.  **Stateless Workers**: Jobs are pure functions over immutable inputs shared
//     through an `Arc`. Workers never exchange state and never mutate their input,
//     so results are independent of scheduling.
// 2.  **Deterministic Merge**: Results come back in input order (`join_all`
//     preserves future order), so concatenating them reproduces exactly what a
//     sequential loop would have produced.
// 3.  **Transparent Degradation**: Parallelism is an optimization, never a
//     requirement. Any failure — the runtime refusing to build, a worker task
//     dying, or being invoked from inside an existing tokio runtime where a
//     nested `block_on` would panic — surfaces as `None`, and the call site runs
//     its sequential path instead. No error from this module ever reaches a
//     caller of the engine.

use std::sync::Arc;
use tokio::runtime::{Builder, Handle, Runtime};

/// A pool of stateless workers backed by a private multi-thread tokio runtime.
pub struct WorkerPool {
    runtime: Runtime,
}

impl WorkerPool {
    /// Builds a pool with up to `workers` threads. Returns `None` if the runtime
    /// cannot be constructed.
    pub fn with_workers(workers: usize) -> Option<Self> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(workers.max(1))
            .thread_name("mosaic-worker")
            .build()
            .ok()?;
        Some(Self { runtime })
    }

    /// Runs `job` over every input on the pool and returns the results in input
    /// order. Returns `None` if any worker task fails.
    pub fn run_ordered<T, R, F>(&self, inputs: Arc<Vec<T>>, job: Arc<F>) -> Option<Vec<R>>
    where
        T: Send + Sync + 'static,
        R: Send + 'static,
        F: Fn(&T) -> R + Send + Sync + 'static,
    {
        let handles: Vec<_> = (0..inputs.len())
            .map(|i| {
                let inputs = Arc::clone(&inputs);
                let job = Arc::clone(&job);
                self.runtime.spawn(async move { job(&inputs[i]) })
            })
            .collect();

        let joined = self.runtime.block_on(futures::future::join_all(handles));
        let mut results = Vec::with_capacity(joined.len());
        for outcome in joined {
            match outcome {
                Ok(result) => results.push(result),
                Err(_) => return None,
            }
        }
        Some(results)
    }
}

/// Supervising entry point: fans `inputs` out over a fresh pool of at most
/// `workers` threads and merges the results in input order.
///
/// Returns `None` whenever the parallel path is unavailable; the caller is
/// expected to fall back to its sequential equivalent, which must produce the
/// same result set.
pub fn dispatch_ordered<T, R, F>(workers: usize, inputs: Vec<T>, job: F) -> Option<Vec<R>>
where
    T: Send + Sync + 'static,
    R: Send + 'static,
    F: Fn(&T) -> R + Send + Sync + 'static,
{
    if inputs.is_empty() {
        return Some(Vec::new());
    }
    // A nested block_on panics inside an existing runtime; degrade instead.
    if Handle::try_current().is_ok() {
        return None;
    }
    let pool = WorkerPool::with_workers(workers.min(inputs.len()))?;
    pool.run_ordered(Arc::new(inputs), Arc::new(job))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merges_results_in_input_order() {
        let inputs: Vec<u64> = (0..100).collect();
        let expected: Vec<u64> = inputs.iter().map(|n| n * n).collect();
        let results = dispatch_ordered(8, inputs, |n: &u64| n * n).expect("pool runs");
        assert_eq!(results, expected);
    }

    #[test]
    fn empty_input_yields_empty_output() {
        let results = dispatch_ordered(4, Vec::<u32>::new(), |n: &u32| *n);
        assert_eq!(results, Some(Vec::new()));
    }

    #[test]
    fn declines_inside_an_existing_runtime() {
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .build()
            .expect("test runtime");
        let result = runtime.block_on(async { dispatch_ordered(4, vec![1u32, 2, 3], |n: &u32| *n) });
        assert_eq!(result, None);
    }

    #[test]
    fn matches_the_sequential_path() {
        let inputs: Vec<String> = (0..32).map(|i| format!("chunk {i}")).collect();
        let sequential: Vec<usize> = inputs.iter().map(|s| s.len()).collect();
        let parallel =
            dispatch_ordered(4, inputs, |s: &String| s.len()).expect("pool runs");
        assert_eq!(parallel, sequential);
    }
}
