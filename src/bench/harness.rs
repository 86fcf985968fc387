use std::time::{Duration, Instant};

use rand::{SeedableRng, rngs::StdRng};
use tracing::{debug, info, warn};

use crate::{
    strategy::{AdditionStrategy, Strategies},
    tensor::Tensor,
    utils::{error::TensorError, math::first_mismatch},
};

use super::{
    config::BenchmarkConfig,
    report::{BenchmarkReport, StrategyOutcome, StrategyReport, TimingSample},
};

// Both sides follow IEEE-754 add, so results may differ by at most rounding
const MAX_ULPS: u32 = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HarnessState {
    Idle,
    GeneratingWorkload,
    Running { trial: usize },
    Aggregating,
    Done,
}

struct Workload {
    a: Tensor,
    b: Tensor,
    reference: Option<Vec<f32>>,
}

/// Times every strategy over one shared, read-only workload.
///
/// A harness runs once. Strategies that fail are reported unavailable and the
/// others keep running.
pub struct BenchmarkHarness {
    config: BenchmarkConfig,
    strategies: Vec<Box<dyn AdditionStrategy>>,
    state: HarnessState,
    samples: Vec<TimingSample>,
}

impl BenchmarkHarness {
    pub fn new(config: BenchmarkConfig, strategies: Vec<Box<dyn AdditionStrategy>>) -> Self {
        Self {
            config,
            strategies,
            state: HarnessState::Idle,
            samples: Vec::new(),
        }
    }

    /// Harness over all three strategies, using the configured native library.
    pub fn with_default_strategies(config: BenchmarkConfig) -> Self {
        let strategies = Strategies::all(config.native_library.as_deref());
        Self::new(config, strategies)
    }

    pub fn state(&self) -> HarnessState {
        self.state
    }

    pub fn config(&self) -> &BenchmarkConfig {
        &self.config
    }

    pub fn run(&mut self) -> Result<BenchmarkReport, TensorError> {
        if self.state != HarnessState::Idle {
            return Err(TensorError::HarnessFinished);
        }

        let result = self.run_trials();

        // Samples only live until the averages are computed
        self.samples.clear();
        self.state = HarnessState::Done;

        result
    }

    fn run_trials(&mut self) -> Result<BenchmarkReport, TensorError> {
        self.state = HarnessState::GeneratingWorkload;
        let workload = self.generate_workload()?;

        let mut failures: Vec<Option<String>> = vec![None; self.strategies.len()];
        self.samples
            .reserve(self.config.trials.saturating_mul(self.strategies.len()));

        info!(trials = self.config.trials, "Running trials");

        for trial in 1..=self.config.trials {
            self.state = HarnessState::Running { trial };

            for (idx, strategy) in self.strategies.iter().enumerate() {
                if failures[idx].is_some() {
                    continue;
                }

                let start = Instant::now();
                let result = strategy.add(workload.a.buffer(), workload.b.buffer());
                let elapsed = start.elapsed();

                let output = match result {
                    Ok(output) => output,
                    Err(e) => {
                        warn!(strategy = strategy.name(), trial, error = %e, "Strategy failed, marking unavailable");
                        failures[idx] = Some(e.to_string());
                        continue;
                    }
                };

                if trial == 1 {
                    if let Some(reference) = &workload.reference {
                        if let Err(e) = verify_output(reference, &output.to_vec()?) {
                            warn!(strategy = strategy.name(), error = %e, "Strategy produced a wrong sum, marking unavailable");
                            failures[idx] = Some(e.to_string());
                            continue;
                        }
                    }
                }

                self.samples.push(TimingSample {
                    strategy: idx,
                    kind: strategy.kind(),
                    elapsed,
                });
            }

            debug!(trial, "Trial complete");
        }

        self.state = HarnessState::Aggregating;
        self.aggregate(failures)
    }

    fn generate_workload(&self) -> Result<Workload, TensorError> {
        let length = self.config.length;
        let shape = [i64::try_from(length)
            .map_err(|_| TensorError::InvalidConfig(format!("length {} too large", length)))?];

        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };

        let mut a = Tensor::create(&shape)?;
        let mut b = Tensor::create(&shape)?;
        a.random_fill_with(&mut rng)?;
        b.random_fill_with(&mut rng)?;

        let reference = if self.config.verify {
            let a = a.buffer().as_host_slice()?;
            let b = b.buffer().as_host_slice()?;
            Some(a.iter().zip(b).map(|(x, y)| x + y).collect())
        } else {
            None
        };

        info!(
            length,
            trials = self.config.trials,
            strategies = self.strategies.len(),
            "Workload generated"
        );

        Ok(Workload { a, b, reference })
    }

    fn aggregate(&self, failures: Vec<Option<String>>) -> Result<BenchmarkReport, TensorError> {
        let trials = self.config.trials;
        if trials == 0 {
            return Err(TensorError::NoTrials);
        }

        let results = self
            .strategies
            .iter()
            .zip(failures)
            .enumerate()
            .map(|(idx, (strategy, failure))| {
                let outcome = match failure {
                    Some(reason) => StrategyOutcome::Unavailable { reason },
                    None => {
                        let total: Duration = self
                            .samples
                            .iter()
                            .filter(|s| s.strategy == idx)
                            .map(|s| s.elapsed)
                            .sum();
                        StrategyOutcome::Average(Duration::from_secs_f64(
                            total.as_secs_f64() / trials as f64,
                        ))
                    }
                };

                if let StrategyOutcome::Average(avg) = &outcome {
                    info!(strategy = strategy.name(), average_secs = avg.as_secs_f64(), "Strategy averaged");
                }

                StrategyReport {
                    kind: strategy.kind(),
                    outcome,
                }
            })
            .collect();

        Ok(BenchmarkReport {
            length: self.config.length,
            trials,
            results,
        })
    }
}

fn verify_output(reference: &[f32], actual: &[f32]) -> Result<(), TensorError> {
    match first_mismatch(reference, actual, MAX_ULPS) {
        None => Ok(()),
        Some(index) => Err(TensorError::ResultMismatch {
            index,
            expected: reference.get(index).copied().unwrap_or(f32::NAN),
            actual: actual.get(index).copied().unwrap_or(f32::NAN),
        }),
    }
}
