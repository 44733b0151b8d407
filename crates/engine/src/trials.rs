//! Independent trial execution for the resampling simulations.
//!
//! Every trial owns its random stream: the run's base seed selects a
//! `ChaCha8Rng` key and the trial index selects the stream. A trial's draws
//! therefore depend only on `(seed, index)`, so sequential and parallel runs
//! with the same seed produce identical results in identical order.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use trade_analytics_core::{AnalyticsError, Result};

/// Trial count at or above which trials run on the rayon pool.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 2_000;

/// Trials between cancellation checks.
pub const CANCEL_CHECK_INTERVAL: usize = 256;

/// Cooperative cancellation shared between a caller and a running simulation.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation; the run stops at its next check.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Runs `num_trials` independent trials, sequentially or on rayon.
#[derive(Debug, Clone)]
pub struct TrialRunner {
    num_trials: usize,
    seed: u64,
    parallel_threshold: usize,
    cancel: Option<CancelFlag>,
}

impl TrialRunner {
    /// Creates a runner. Without a seed one is drawn from entropy.
    #[must_use]
    pub fn new(num_trials: usize, seed: Option<u64>, parallel_threshold: usize) -> Self {
        Self {
            num_trials,
            seed: seed.unwrap_or_else(|| rand::thread_rng().gen()),
            parallel_threshold,
            cancel: None,
        }
    }

    /// Attaches a cancellation flag.
    #[must_use]
    pub fn with_cancel(mut self, cancel: Option<CancelFlag>) -> Self {
        self.cancel = cancel;
        self
    }

    /// The base seed actually used for this run.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    #[must_use]
    pub fn is_parallel(&self) -> bool {
        self.num_trials >= self.parallel_threshold
    }

    /// Runs every trial and returns the outputs indexed by trial.
    ///
    /// # Errors
    /// `Cancelled` if the cancellation flag is observed; no partial output is
    /// returned.
    pub fn run<T, F>(&self, trial: F) -> Result<Vec<T>>
    where
        T: Send,
        F: Fn(&mut ChaCha8Rng) -> T + Sync,
    {
        let one = |index: usize| -> Result<T> {
            if index % CANCEL_CHECK_INTERVAL == 0 && self.cancelled() {
                return Err(AnalyticsError::Cancelled);
            }
            let mut rng = trial_rng(self.seed, index);
            Ok(trial(&mut rng))
        };

        if self.is_parallel() {
            (0..self.num_trials).into_par_iter().map(one).collect()
        } else {
            (0..self.num_trials).map(one).collect()
        }
    }

    fn cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelFlag::is_cancelled)
    }
}

/// The random stream for trial `index` under `seed`.
#[must_use]
pub fn trial_rng(seed: u64, index: usize) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(index as u64);
    rng
}

/// Draws one value uniformly from a non-empty `pool`.
pub fn draw(pool: &[f64], rng: &mut ChaCha8Rng) -> f64 {
    pool[rng.gen_range(0..pool.len())]
}

/// Draws `k` values uniformly with replacement from a non-empty `pool`.
pub fn sample_with_replacement(pool: &[f64], k: usize, rng: &mut ChaCha8Rng) -> Vec<f64> {
    (0..k).map(|_| draw(pool, rng)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_outputs() {
        let a = TrialRunner::new(50, Some(42), usize::MAX)
            .run(|rng| rng.gen::<u64>())
            .unwrap();
        let b = TrialRunner::new(50, Some(42), usize::MAX)
            .run(|rng| rng.gen::<u64>())
            .unwrap();

        assert_eq!(a, b);
    }

    #[test]
    fn trials_use_distinct_streams() {
        let outputs = TrialRunner::new(20, Some(7), usize::MAX)
            .run(|rng| rng.gen::<u64>())
            .unwrap();

        let mut unique = outputs.clone();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), outputs.len());
    }

    #[test]
    fn parallel_matches_sequential() {
        let pool = [1.0, 2.0, 3.0, 4.0, 5.0];
        let sequential = TrialRunner::new(600, Some(99), usize::MAX)
            .run(|rng| sample_with_replacement(&pool, 10, rng))
            .unwrap();
        let parallel = TrialRunner::new(600, Some(99), 1)
            .run(|rng| sample_with_replacement(&pool, 10, rng))
            .unwrap();

        assert!(TrialRunner::new(600, Some(99), 1).is_parallel());
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn cancelled_flag_stops_run() {
        let flag = CancelFlag::new();
        flag.cancel();

        let result = TrialRunner::new(1_000, Some(1), usize::MAX)
            .with_cancel(Some(flag))
            .run(|rng| rng.gen::<f64>());

        assert_eq!(result, Err(AnalyticsError::Cancelled));
    }

    #[test]
    fn samples_come_from_pool() {
        let pool = [10.0, -5.0];
        let mut rng = trial_rng(3, 0);
        let sample = sample_with_replacement(&pool, 100, &mut rng);

        assert_eq!(sample.len(), 100);
        assert!(sample.iter().all(|v| pool.contains(v)));
    }
}
