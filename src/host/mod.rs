//! A reference interpreter of resolved strategies on the host.
//!
//! Host strategies run directly on the caller (and on `rayon` with the `rayon` feature).
//! Accelerator strategies are emulated block by block on a Tokio blocking thread: the call
//! only enqueues the work and returns a pending [`Completion`], which must be synchronized
//! before the results are observed. Partial tiles at the edge of an extent are masked.

use std::ops::Range;

use itertools::Itertools;
use thiserror::Error;

use crate::policy::{LaunchMode, LoopDim, LoopExec, LoopNest, ScalarStrategy};

pub mod reduce;

pub use reduce::{Max, Min, Product, ReduceOp, Sum, reduce};

#[derive(Debug, Error)]
pub enum HostError {
    #[error("asynchronous launch outside of a tokio runtime: {0}")]
    Runtime(#[from] tokio::runtime::TryCurrentError),
    #[error("kernel body panicked during an asynchronous launch")]
    Panicked,
    #[error("asynchronous launch failed: {0}")]
    Launch(tokio::task::JoinError),
}

impl From<tokio::task::JoinError> for HostError {
    fn from(err: tokio::task::JoinError) -> Self {
        if err.is_panic() {
            Self::Panicked
        } else {
            Self::Launch(err)
        }
    }
}

/// Completion of a launch. Synchronous launches are complete on return.
#[derive(Debug)]
#[must_use = "asynchronous launches must be synchronized before their results are observed"]
pub struct Completion(Option<tokio::task::JoinHandle<()>>);

impl Completion {
    #[inline]
    fn ready() -> Self {
        Self(None)
    }

    #[inline]
    pub fn is_pending(&self) -> bool {
        self.0.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// Waits until every iteration of the launch has run.
    pub async fn synchronize(self) -> Result<(), HostError> {
        if let Some(handle) = self.0 {
            handle.await?;
        }
        Ok(())
    }

    /// Blocking version of [`Completion::synchronize`]. Must not be called from async code.
    pub fn wait(self) -> Result<(), HostError> {
        futures::executor::block_on(self.synchronize())
    }
}

fn launch(f: impl FnOnce() + Send + 'static) -> Result<Completion, HostError> {
    let runtime = tokio::runtime::Handle::try_current()?;
    Ok(Completion(Some(runtime.spawn_blocking(f))))
}

#[cfg(feature = "rayon")]
fn par_each(range: Range<usize>, f: impl Fn(usize) + Send + Sync) {
    use rayon::prelude::*;
    range.into_par_iter().for_each(f)
}

#[cfg(not(feature = "rayon"))]
fn par_each(range: Range<usize>, f: impl Fn(usize) + Send + Sync) {
    range.for_each(f)
}

/// Runs `body` for every index in `0..len` under a flat strategy.
#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", skip(body)))]
pub fn forall<F>(strategy: ScalarStrategy, len: usize, body: F) -> Result<Completion, HostError>
where
    F: Fn(usize) + Send + Sync + 'static,
{
    log::trace!("forall {strategy} over {len}");
    match strategy {
        ScalarStrategy::Sequential => {
            (0..len).for_each(body);
            Ok(Completion::ready())
        }
        ScalarStrategy::HostLoop => {
            par_each(0..len, body);
            Ok(Completion::ready())
        }
        ScalarStrategy::Accelerator { threads } => {
            let threads = threads.get() as usize;
            launch(move || {
                par_each(0..len.div_ceil(threads), |block| {
                    let start = block * threads;
                    (start..len.min(start + threads)).for_each(&body)
                })
            })
        }
    }
}

/// Runs `body` for every index of `extent` under a loop nest.
#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", skip(body)))]
pub fn kernel<const N: usize, F>(
    nest: &LoopNest<N>,
    extent: [usize; N],
    body: F,
) -> Result<Completion, HostError>
where
    F: Fn([usize; N]) + Send + Sync + 'static,
{
    log::trace!("kernel {nest} over {extent:?}");
    match nest.launch() {
        LaunchMode::Synchronous => {
            walk(nest.loops(), extent, &body);
            Ok(Completion::ready())
        }
        LaunchMode::Asynchronous { .. } => {
            let nest = *nest;
            launch(move || tiles(&nest, extent, &body))
        }
    }
}

/// Untiled loops; only the outermost loop of a host-loop nest is spread across threads.
fn walk<const N: usize>(
    loops: &[LoopDim; N],
    extent: [usize; N],
    body: &(impl Fn([usize; N]) + Sync),
) {
    let [outer, inner @ ..] = loops.as_slice() else {
        return;
    };
    let visit = |i: usize| {
        let mut index = [0; N];
        index[outer.dim] = i;
        if inner.is_empty() {
            body(index);
            return;
        }
        for rest in inner
            .iter()
            .map(|l| 0..extent[l.dim])
            .multi_cartesian_product()
        {
            for (l, &j) in inner.iter().zip_eq(&rest) {
                index[l.dim] = j;
            }
            body(index);
        }
    };
    match outer.exec {
        LoopExec::HostLoop => par_each(0..extent[outer.dim], visit),
        _ => (0..extent[outer.dim]).for_each(visit),
    }
}

/// Tiles become blocks, in-tile offsets become threads.
fn tiles<const N: usize>(
    nest: &LoopNest<N>,
    extent: [usize; N],
    body: &(impl Fn([usize; N]) + Sync),
) {
    let loops = nest.loops();
    let Some(grid) = nest.grid(extent) else {
        return walk(loops, extent, body);
    };
    let sizes = nest.tile_sizes().map(|size| size.unwrap_or(1) as usize);

    let blocks = loops
        .iter()
        .map(|l| 0..grid[l.dim])
        .multi_cartesian_product()
        .collect_vec();
    par_each(0..blocks.len(), |b| {
        let block = &blocks[b];
        for thread in loops
            .iter()
            .map(|l| 0..sizes[l.dim])
            .multi_cartesian_product()
        {
            let mut index = [0; N];
            let inside = loops.iter().enumerate().all(|(k, l)| {
                index[l.dim] = block[k] * sizes[l.dim] + thread[k];
                index[l.dim] < extent[l.dim]
            });
            if inside {
                body(index);
            }
        }
    });
}
