//! Per-city tasks and the schedulers that run them.
//!
//! Both benchmarks describe their work as a task that maps one city name to
//! one output, then hand it to a scheduler. Every scheduler returns one
//! `TaskOutcome` per input city. A task that panics becomes a failed outcome
//! for its city; the other cities are unaffected.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc;

use futures::future::join_all;
use futures::FutureExt;
use thiserror::Error;

use super::BenchError;

// ---------------------------------------------------------------------------
// Task descriptions
// ---------------------------------------------------------------------------

/// Work for one city that occupies the calling thread until done.
pub trait CityTask: Sync {
    type Output: Send;

    fn run(&self, city: &str) -> Self::Output;
}

/// Work for one city that yields while waiting.
pub trait AsyncCityTask {
    type Output;

    fn run(&self, city: &str) -> impl Future<Output = Self::Output>;
}

/// A task that panicked instead of returning.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("task panicked: {message}")]
pub struct TaskFailure {
    pub message: String,
}

impl TaskFailure {
    fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        TaskFailure { message }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaskOutcome<O> {
    pub city: String,
    pub result: Result<O, TaskFailure>,
}

impl<O> TaskOutcome<O> {
    pub fn output(&self) -> Option<&O> {
        self.result.as_ref().ok()
    }
}

fn run_isolated<T: CityTask>(task: &T, city: &str) -> TaskOutcome<T::Output> {
    let result =
        panic::catch_unwind(AssertUnwindSafe(|| task.run(city))).map_err(TaskFailure::from_panic);
    TaskOutcome {
        city: city.to_string(),
        result,
    }
}

// ---------------------------------------------------------------------------
// Schedulers
// ---------------------------------------------------------------------------

/// One city at a time on the calling thread, in input order.
#[derive(Debug, Clone, Copy, Default)]
pub struct Serial;

impl Serial {
    pub fn run<T: CityTask>(&self, task: &T, cities: &[String]) -> Vec<TaskOutcome<T::Output>> {
        cities.iter().map(|city| run_isolated(task, city)).collect()
    }
}

/// One task per city on a dedicated pool of `workers` threads.
///
/// The pool is built for each call and torn down when it returns. Outcomes
/// come back in completion order.
#[derive(Debug, Clone, Copy)]
pub struct WorkerPool {
    workers: usize,
}

impl WorkerPool {
    /// A worker count of 0 is treated as 1.
    pub fn new(workers: usize) -> Self {
        WorkerPool {
            workers: workers.max(1),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn run<T: CityTask>(
        &self,
        task: &T,
        cities: &[String],
    ) -> Result<Vec<TaskOutcome<T::Output>>, BenchError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .thread_name(|i| format!("tempmon-worker-{}", i))
            .build()
            .map_err(|e| BenchError::Runtime(e.to_string()))?;

        let (tx, rx) = mpsc::channel();
        pool.scope(|scope| {
            for city in cities {
                let tx = tx.clone();
                scope.spawn(move |_| {
                    // The receiver outlives the scope, so this cannot fail.
                    let _ = tx.send(run_isolated(task, city));
                });
            }
        });
        drop(tx);

        Ok(rx.into_iter().collect())
    }
}

/// All cities interleaved on one thread by a cooperative event loop.
///
/// Outcomes are in input order.
#[derive(Debug, Clone, Copy, Default)]
pub struct Cooperative;

impl Cooperative {
    /// Build a single-threaded runtime for this call and drive every task
    /// to completion on it.
    pub fn run<T: AsyncCityTask>(
        &self,
        task: &T,
        cities: &[String],
    ) -> Result<Vec<TaskOutcome<T::Output>>, BenchError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| BenchError::Runtime(e.to_string()))?;
        Ok(runtime.block_on(self.run_all(task, cities)))
    }

    /// Launch every task at once and wait for all of them.
    pub async fn run_all<T: AsyncCityTask>(
        &self,
        task: &T,
        cities: &[String],
    ) -> Vec<TaskOutcome<T::Output>> {
        let pending = cities.iter().map(|city| async move {
            let result = AssertUnwindSafe(task.run(city))
                .catch_unwind()
                .await
                .map_err(TaskFailure::from_panic);
            TaskOutcome {
                city: city.clone(),
                result,
            }
        });
        join_all(pending).await
    }
}
