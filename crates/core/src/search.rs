//! Partitioned nonce search
//!
//! The range `[start, stop)` is cut into one contiguous partition per worker
//! before any work starts. Each worker scans its partition sequentially and
//! keeps a running best; the per-worker bests are then folded in partition
//! order with the same comparator, so the answer does not depend on
//! scheduling and matches a single-threaded scan of the whole range.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, info};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::corpus::StringCorpus;
use crate::error::SearchError;
use crate::evaluator::{EvaluationResult, NonceEvaluator};
use crate::params::{MAX_WORKERS, NONCE_SPACE, Nonce};
use crate::primitives::KeyedHash;
use crate::reducers::ReducerBank;

/// Half-open interval of nonces
///
/// Bounds are held as `u64` so that the full space `[0, 2^32)` fits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SearchRange {
    start: u64,
    stop: u64,
}

impl SearchRange {
    pub fn new(start: Nonce, stop: u64) -> Result<Self, SearchError> {
        let start = start as u64;
        if stop > NONCE_SPACE {
            return Err(SearchError::RangeOutOfBounds { stop });
        }
        if start > stop {
            return Err(SearchError::InvalidRange { start, stop });
        }
        Ok(Self { start, stop })
    }

    /// The whole 32-bit nonce space
    pub fn full() -> Self {
        Self {
            start: 0,
            stop: NONCE_SPACE,
        }
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn stop(&self) -> u64 {
        self.stop
    }

    pub fn len(&self) -> u64 {
        self.stop - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.stop
    }

    pub fn contains(&self, nonce: Nonce) -> bool {
        (self.start..self.stop).contains(&(nonce as u64))
    }

    /// Nonces in ascending order
    pub fn nonces(&self) -> impl Iterator<Item = Nonce> {
        (self.start..self.stop).map(|n| n as Nonce)
    }

    /// Split into `workers` contiguous partitions
    ///
    /// The first `workers - 1` partitions get `len / workers` nonces each; the
    /// last one runs up to `stop` and absorbs the remainder. Partitions may be
    /// empty when the range is shorter than the worker count.
    pub fn partition(&self, workers: usize) -> Result<Vec<SearchRange>, SearchError> {
        check_workers(workers)?;

        let share = self.len() / workers as u64;
        let last = workers as u64 - 1;
        let mut parts = Vec::with_capacity(workers);

        for i in 0..last {
            let start = self.start + share * i;
            parts.push(SearchRange {
                start,
                stop: start + share,
            });
        }
        parts.push(SearchRange {
            start: self.start + share * last,
            stop: self.stop,
        });

        Ok(parts)
    }
}

fn check_workers(workers: usize) -> Result<(), SearchError> {
    if workers == 0 {
        return Err(SearchError::ZeroWorkers);
    }
    if workers > MAX_WORKERS {
        return Err(SearchError::TooManyWorkers {
            workers,
            max: MAX_WORKERS,
        });
    }
    Ok(())
}

/// Shared cancellation flag
///
/// Workers poll it before every nonce. A cancelled search discards all
/// partial results.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Scan `range` sequentially and return its best result
///
/// The running best starts all-sentinel and is replaced only by a strictly
/// better result, so on ties the lowest nonce is kept.
pub fn nonce_search_loop<H: KeyedHash>(
    evaluator: &NonceEvaluator<'_, H>,
    range: SearchRange,
    cancel: &CancelToken,
) -> Result<EvaluationResult, SearchError> {
    let mut scratch = evaluator.scratch();
    let mut best = EvaluationResult::default();

    for nonce in range.nonces() {
        if cancel.is_cancelled() {
            return Err(SearchError::Cancelled);
        }
        let result = evaluator.evaluate_with(nonce, &mut scratch);
        if result.is_better_than(&best) {
            best = result;
        }
    }

    Ok(best)
}

/// Fold per-worker bests in the given order with the two-level comparator
pub fn aggregate<I>(results: I) -> EvaluationResult
where
    I: IntoIterator<Item = EvaluationResult>,
{
    results
        .into_iter()
        .fold(EvaluationResult::default(), |best, result| {
            if result.is_better_than(&best) {
                result
            } else {
                best
            }
        })
}

/// Runs a partitioned search over a fixed worker count
pub struct SearchCoordinator<'a, H: KeyedHash> {
    evaluator: NonceEvaluator<'a, H>,
    workers: usize,
}

impl<'a, H: KeyedHash> SearchCoordinator<'a, H> {
    pub fn new(evaluator: NonceEvaluator<'a, H>, workers: usize) -> Result<Self, SearchError> {
        check_workers(workers)?;
        Ok(Self { evaluator, workers })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn evaluator(&self) -> &NonceEvaluator<'a, H> {
        &self.evaluator
    }

    /// Search `range` to completion
    ///
    /// Returns `Ok(None)` when no nonce in the range produced a valid
    /// reduced span, and `Err(SearchError::Cancelled)` if `cancel` fired
    /// before every partition finished.
    pub fn run(
        &self,
        range: SearchRange,
        cancel: &CancelToken,
    ) -> Result<Option<EvaluationResult>, SearchError> {
        // No more workers than nonces; empty partitions add nothing
        let nonces = usize::try_from(range.len()).unwrap_or(usize::MAX);
        let workers = self.workers.min(nonces.max(1));
        if workers < self.workers {
            debug!(
                "Range has {} nonce(s), using {} of {} workers",
                range.len(),
                workers,
                self.workers
            );
        }

        let partitions = range.partition(workers)?;
        info!(
            "Searching [{:#x}, {:#x}) with {} worker(s), {} strings, {} reducers",
            range.start(),
            range.stop(),
            workers,
            self.evaluator.corpus().len(),
            self.evaluator.bank().len()
        );

        let bests = if workers == 1 {
            vec![self.scan_partition(0, partitions[0], cancel)?]
        } else {
            self.scan_partitions(&partitions, cancel)?
        };

        let best = aggregate(bests);
        if best.is_valid() {
            info!(
                "Best nonce {:#010x}: reducer {} reduced span {}",
                best.nonce, best.reducer, best.reduced_span
            );
            Ok(Some(best))
        } else {
            info!("No nonce in range separates the corpus under any reducer");
            Ok(None)
        }
    }

    fn scan_partition(
        &self,
        worker: usize,
        range: SearchRange,
        cancel: &CancelToken,
    ) -> Result<EvaluationResult, SearchError> {
        debug!(
            "Worker {}: scanning [{:#x}, {:#x})",
            worker,
            range.start(),
            range.stop()
        );
        let best = nonce_search_loop(&self.evaluator, range, cancel)?;
        debug!("Worker {}: best {:?}", worker, best);
        Ok(best)
    }

    /// Scan every partition on a dedicated pool with one thread per worker
    #[cfg(feature = "parallel")]
    fn scan_partitions(
        &self,
        partitions: &[SearchRange],
        cancel: &CancelToken,
    ) -> Result<Vec<EvaluationResult>, SearchError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(partitions.len())
            .thread_name(|i| format!("spanpow-worker-{}", i))
            .build()
            .map_err(|e| SearchError::ThreadPool(e.to_string()))?;

        pool.install(|| {
            partitions
                .par_iter()
                .enumerate()
                .map(|(worker, &range)| self.scan_partition(worker, range, cancel))
                .collect()
        })
    }

    /// Scan every partition on the calling thread (sequential fallback)
    #[cfg(not(feature = "parallel"))]
    fn scan_partitions(
        &self,
        partitions: &[SearchRange],
        cancel: &CancelToken,
    ) -> Result<Vec<EvaluationResult>, SearchError> {
        partitions
            .iter()
            .enumerate()
            .map(|(worker, &range)| self.scan_partition(worker, range, cancel))
            .collect()
    }
}

/// Convenience wrapper: build an evaluator and coordinator and run once
pub fn search<H: KeyedHash>(
    hasher: &H,
    corpus: &StringCorpus,
    bank: &ReducerBank,
    range: SearchRange,
    workers: usize,
    cancel: &CancelToken,
) -> Result<Option<EvaluationResult>, SearchError> {
    let evaluator = NonceEvaluator::new(hasher, corpus, bank);
    SearchCoordinator::new(evaluator, workers)?.run(range, cancel)
}
