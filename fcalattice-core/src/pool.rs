// Copyright 2025 Sushanth (https://github.com/sushanthpy)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Fixed-size worker pool
//!
//! Scoped workers pull task indices from a shared channel and send back
//! `(index, result)` pairs; results land in a slot per task, so the output
//! order is the input order no matter how many workers ran or how tasks
//! interleaved. The call blocks until every worker has joined.

use crossbeam_channel::unbounded;
use std::any::Any;
use std::thread;
use tracing::debug;

use crate::error::{LatticeError, Result};

#[derive(Debug, Clone, Copy)]
pub struct WorkerPool {
    workers: usize,
}

impl WorkerPool {
    /// Pool with `workers` threads (at least one)
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Apply `f` to every item, returning results in item order.
    ///
    /// A panic in any worker is reported as `WorkerPanicked` once all
    /// workers have stopped.
    pub fn map<T, R, F>(&self, items: &[T], f: F) -> Result<Vec<R>>
    where
        T: Sync,
        R: Send,
        F: Fn(usize, &T) -> R + Sync,
    {
        if self.workers == 1 || items.len() <= 1 {
            return Ok(items.iter().enumerate().map(|(i, item)| f(i, item)).collect());
        }

        let workers = self.workers.min(items.len());
        debug!(workers, tasks = items.len(), "Dispatching pool tasks");

        let (task_tx, task_rx) = unbounded::<usize>();
        for i in 0..items.len() {
            task_tx
                .send(i)
                .map_err(|e| LatticeError::WorkerPanicked(e.to_string()))?;
        }
        drop(task_tx);

        let (result_tx, result_rx) = unbounded::<(usize, R)>();
        let f = &f;

        let panics: Vec<String> = thread::scope(|scope| {
            let handles: Vec<_> = (0..workers)
                .map(|_| {
                    let tasks = task_rx.clone();
                    let results = result_tx.clone();
                    scope.spawn(move || {
                        for i in tasks.iter() {
                            if results.send((i, f(i, &items[i]))).is_err() {
                                break;
                            }
                        }
                    })
                })
                .collect();

            handles
                .into_iter()
                .filter_map(|handle| handle.join().err())
                .map(panic_message)
                .collect()
        });
        drop(result_tx);

        if !panics.is_empty() {
            return Err(LatticeError::WorkerPanicked(panics.join("; ")));
        }

        let mut slots: Vec<Option<R>> = (0..items.len()).map(|_| None).collect();
        for (i, result) in result_rx.try_iter() {
            slots[i] = Some(result);
        }
        slots
            .into_iter()
            .enumerate()
            .map(|(i, slot)| {
                slot.ok_or_else(|| LatticeError::WorkerPanicked(format!("task {i} produced no result")))
            })
            .collect()
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "worker panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_results_in_item_order() {
        let items: Vec<u64> = (0..200).collect();
        let expected: Vec<u64> = items.iter().map(|x| x * x).collect();

        for workers in [1, 2, 7] {
            let pool = WorkerPool::new(workers);
            let out = pool.map(&items, |_, x| x * x).unwrap();
            assert_eq!(out, expected, "workers = {}", workers);
        }
    }

    #[test]
    fn test_panics_are_aggregated() {
        let items: Vec<usize> = (0..16).collect();
        let pool = WorkerPool::new(4);
        let err = pool
            .map(&items, |_, &x| {
                if x == 9 {
                    panic!("task nine failed");
                }
                x
            })
            .unwrap_err();

        match err {
            LatticeError::WorkerPanicked(msg) => assert!(msg.contains("task nine failed")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_zero_workers_clamped() {
        let pool = WorkerPool::new(0);
        assert_eq!(pool.workers(), 1);
        let items: Vec<usize> = vec![1, 2, 3];
        assert_eq!(pool.map(&items, |i, x| i + x).unwrap(), vec![1, 3, 5]);
    }
}
