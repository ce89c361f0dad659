// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Splits a run of work units into contiguous blocks, one per worker,
//! and runs a job over every block on its own scoped thread.  The
//! runners return only after every worker has been joined, which is
//! what separates the phases of a render.

use log::{debug, warn};
use std::ops::Range;

use crate::error::RenderError;

/// A contiguous run of work units handed to one worker.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Block {
    /// The first unit of the block.
    pub start: usize,
    /// The number of units in the block.  Never zero.
    pub len: usize,
}

impl Block {
    /// The units of the block as a range.
    pub fn range(&self) -> Range<usize> {
        self.start..self.start + self.len
    }
}

/// Splits `[0, units)` into at most `workers` contiguous blocks of
/// `units / workers` units each, the last block absorbing the
/// remainder.  Asking for more workers than there are units yields one
/// block per unit; zero units yields no blocks at all.
pub fn partition(units: usize, workers: usize) -> Result<Vec<Block>, RenderError> {
    if workers == 0 {
        return Err(RenderError::NoThreads);
    }
    if units == 0 {
        return Ok(vec![]);
    }
    let workers = if workers > units {
        warn!(
            "{} workers requested for {} units of work; using {}",
            workers, units, units
        );
        units
    } else {
        workers
    };

    let size = units / workers;
    let blocks: Vec<Block> = (0..workers)
        .map(|i| Block {
            start: i * size,
            len: if i + 1 == workers {
                units - i * size
            } else {
                size
            },
        })
        .collect();
    debug!(
        "{} units in {} blocks of {} (last block {})",
        units,
        blocks.len(),
        size,
        blocks.last().map_or(0, |b| b.len)
    );
    Ok(blocks)
}

/// Runs `job` once per block of `[0, units)`, each on its own thread,
/// and waits for all of them.  The job is told its worker index along
/// with its block.
pub fn run_blocks<F>(units: usize, workers: usize, job: F) -> Result<(), RenderError>
where
    F: Fn(usize, Block) + Sync,
{
    let blocks = partition(units, workers)?;
    let job = &job;
    crossbeam::scope(|spawner| {
        for (worker, block) in blocks.into_iter().enumerate() {
            spawner.spawn(move |_| job(worker, block));
        }
    })
    .map_err(|_| RenderError::WorkerPanicked)
}

/// Like `run_blocks`, but over a buffer: each worker receives the
/// disjoint slice of `buffer` that its block covers, so no two workers
/// can ever write the same element.
pub fn run_slices<T, F>(buffer: &mut [T], workers: usize, job: F) -> Result<(), RenderError>
where
    T: Send,
    F: Fn(Block, &mut [T]) + Sync,
{
    let blocks = partition(buffer.len(), workers)?;
    let job = &job;
    crossbeam::scope(|spawner| {
        let mut rest = buffer;
        for block in blocks {
            let (region, tail) = std::mem::take(&mut rest).split_at_mut(block.len);
            rest = tail;
            spawner.spawn(move |_| job(block, region));
        }
    })
    .map_err(|_| RenderError::WorkerPanicked)
}
